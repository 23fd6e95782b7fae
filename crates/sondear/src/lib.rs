//! Sondear: Element Resolution and Wait Engine for UI Test Automation
//!
//! Sondear (Spanish: "to probe, to sound out") sits between test code and a
//! live automation session (a browser over WebDriver, an iOS or Android app
//! over Appium). Test code names elements by logical locators; Sondear
//! turns them into live handles, waits for them to reach a requested state,
//! classifies failures, and performs interactions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      SONDEAR Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Test code ──► Interactions ──► WaitEngine ──► Resolver         │
//! │                     │               │            │   │          │
//! │                     │               ▼            ▼   ▼          │
//! │                     │        FailureClassifier  ElementCache    │
//! │                     ▼                            │              │
//! │              InteractionStrategy                 ▼              │
//! │        (native / composed / script)      SessionRegistry        │
//! │                                          WEB │ IOS │ ANDROID    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything hangs off a [`TestContext`], one per run.
//!
//! ```ignore
//! use sondear::prelude::*;
//!
//! let ctx = TestContext::new(ResolverConfig::default())?;
//! ctx.register_session(session);
//!
//! let submit = Locator::web("submit", SelectorKind::Css, "button[type=submit]");
//! if ctx.is_element(ElementState::Clickable, &submit)? {
//!     ctx.interactions(NativeActions).click(&submit)?;
//! }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod actions;
mod cache;
mod catalog;
mod classify;
mod config;
mod context;
mod driver;
mod interaction;
mod locator;
mod resolver;
mod result;
mod state;

/// Subscriber setup for `tracing` output
pub mod logging;

/// Scriptable in-memory session for tests
///
/// Usable from integration tests and benches as well as unit tests.
pub mod mock;

/// Polling waits and per-state conditions
pub mod wait;

pub use actions::{ActionSequence, KeyStep, MouseButton, Origin, PointerKind, PointerStep};
pub use cache::ElementCache;
pub use catalog::LocatorCatalog;
pub use classify::{edge_probe, edge_probe_until, FailureClassifier, StepDown};
pub use config::{
    CacheHitPolicy, ResolverConfig, DEFAULT_EDGE_PROBE_ATTEMPTS, DEFAULT_MAX_RESOLVE_ATTEMPTS,
    DEFAULT_POLL_UNITS, DEFAULT_TIME_UNIT_MS, DEFAULT_WAIT_UNITS,
};
pub use context::TestContext;
pub use driver::{
    ElementHandle, Rect, ScriptArg, Session, SessionRegistry, SessionTimeouts, W3C_ELEMENT_KEY,
};
pub use interaction::{
    Action, ComposedActions, InteractionStrategy, Interactions, NativeActions, ScriptActions,
};
pub use locator::{Locator, Platform, Selector, SelectorKind, WireSelector};
pub use resolver::Resolver;
pub use result::{ElementFault, FaultKind, SondearError, SondearResult};
pub use state::ElementState;
pub use wait::{FluentWait, WaitEngine, WaitPool, WaitResult};

/// Common imports
pub mod prelude {
    pub use super::catalog::LocatorCatalog;
    pub use super::config::{CacheHitPolicy, ResolverConfig};
    pub use super::context::TestContext;
    pub use super::driver::{ElementHandle, Session, SessionTimeouts};
    pub use super::interaction::{
        Action, ComposedActions, InteractionStrategy, NativeActions, ScriptActions,
    };
    pub use super::locator::{Locator, Platform, SelectorKind};
    pub use super::result::{ElementFault, FaultKind, SondearError, SondearResult};
    pub use super::state::ElementState;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use super::mock::{MockElement, MockSession};
    use std::sync::Arc;

    #[test]
    fn test_prelude_end_to_end() {
        let ctx = TestContext::new(ResolverConfig::new().with_time_unit_ms(5)).unwrap();
        let session = Arc::new(MockSession::new(Platform::Web));
        session.insert(MockElement::new("button[type=submit]"));
        assert!(ctx.register_session(session.clone()));

        let submit = Locator::web("submit", SelectorKind::Css, "button[type=submit]");
        assert!(ctx.is_element(ElementState::Clickable, &submit).unwrap());
        ctx.interactions(NativeActions).click(&submit).unwrap();

        assert!(session.was_called("click"));
    }

    #[test]
    fn test_error_display() {
        let err = SondearError::SessionNotInitialized {
            platform: Platform::Ios,
        };
        assert_eq!(err.to_string(), "IOS session not yet initialised");
    }
}
