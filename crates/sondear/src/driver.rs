//! Session - Abstract Automation Driver Boundary
//!
//! Sondear never talks to WebDriver, XCUITest or UiAutomator2 itself. A live
//! automation session (browser, iOS app, Android app) plugs in through the
//! [`Session`] trait, and the [`SessionRegistry`] hands out at most one per
//! platform.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Resolver / WaitEngine / Interactions                             │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  SessionRegistry  ── session(platform) ──►  Arc<dyn Session>      │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  ┌───────────────┐  ┌───────────────┐  ┌───────────────┐          │
//! │  │ WEB           │  │ IOS           │  │ ANDROID       │          │
//! │  │ (WebDriver)   │  │ (XCUITest)    │  │ (UiAutomator2)│          │
//! │  └───────────────┘  └───────────────┘  └───────────────┘          │
//! └───────────────────────────────────────────────────────────────────┘
//! ```

use crate::actions::ActionSequence;
use crate::locator::{Platform, Selector};
use crate::result::{ElementFault, SondearError, SondearResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Key WebDriver uses to mark an element reference in JSON payloads
pub const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Opaque reference to a live element inside a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    id: String,
    platform: Platform,
}

impl ElementHandle {
    /// Wrap a session-assigned element id
    #[must_use]
    pub fn new(id: impl Into<String>, platform: Platform) -> Self {
        Self {
            id: id.into(),
            platform,
        }
    }

    /// Session-assigned element id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Platform of the owning session
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// W3C element reference object
    #[must_use]
    pub fn to_w3c(&self) -> serde_json::Value {
        serde_json::json!({ W3C_ELEMENT_KEY: self.id })
    }
}

/// Element rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a rectangle
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point, truncated to whole pixels
    #[must_use]
    pub fn center(&self) -> (i64, i64) {
        (
            (self.x + self.width / 2.0) as i64,
            (self.y + self.height / 2.0) as i64,
        )
    }
}

/// Argument passed to an injected script
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptArg {
    /// Element reference, seen by the script as a DOM node
    Element(ElementHandle),
    /// Plain JSON value
    Value(serde_json::Value),
}

impl ScriptArg {
    /// JSON form sent over the wire
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Element(handle) => handle.to_w3c(),
            Self::Value(value) => value.clone(),
        }
    }
}

/// Session-level timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionTimeouts {
    /// Page load timeout
    pub page_load: Option<Duration>,
    /// Implicit element-find wait
    pub implicit: Option<Duration>,
    /// Script execution timeout
    pub script: Option<Duration>,
}

impl SessionTimeouts {
    /// Create empty timeouts (leave session defaults untouched)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page load timeout
    #[must_use]
    pub const fn with_page_load(mut self, timeout: Duration) -> Self {
        self.page_load = Some(timeout);
        self
    }

    /// Set implicit wait
    #[must_use]
    pub const fn with_implicit(mut self, timeout: Duration) -> Self {
        self.implicit = Some(timeout);
        self
    }

    /// Set script timeout
    #[must_use]
    pub const fn with_script(mut self, timeout: Duration) -> Self {
        self.script = Some(timeout);
        self
    }

    /// W3C timeouts payload (milliseconds)
    #[must_use]
    pub fn to_w3c(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        if let Some(t) = self.page_load {
            body.insert("pageLoad".into(), (t.as_millis() as u64).into());
        }
        if let Some(t) = self.implicit {
            body.insert("implicit".into(), (t.as_millis() as u64).into());
        }
        if let Some(t) = self.script {
            body.insert("script".into(), (t.as_millis() as u64).into());
        }
        serde_json::Value::Object(body)
    }
}

/// A live automation session for one platform.
///
/// Every element-level command may fail with [`FaultKind::Stale`] when the
/// underlying node was replaced.
///
/// [`FaultKind::Stale`]: crate::result::FaultKind::Stale
pub trait Session: Send + Sync {
    /// Platform this session drives
    fn platform(&self) -> Platform;

    /// Find the first element matching `selector`, failing with `NotFound`
    fn find(&self, selector: &Selector) -> Result<ElementHandle, ElementFault>;

    /// Find every element matching `selector` (empty when none)
    fn find_all(&self, selector: &Selector) -> Result<Vec<ElementHandle>, ElementFault>;

    /// Cheap liveness check, e.g. reading the tag name
    fn probe(&self, element: &ElementHandle) -> Result<(), ElementFault>;

    /// Whether the element is displayed
    fn is_displayed(&self, element: &ElementHandle) -> Result<bool, ElementFault>;

    /// Whether the element is enabled
    fn is_enabled(&self, element: &ElementHandle) -> Result<bool, ElementFault>;

    /// Element rectangle
    fn rect(&self, element: &ElementHandle) -> Result<Rect, ElementFault>;

    /// Visible text
    fn text(&self, element: &ElementHandle) -> Result<String, ElementFault>;

    /// Native click
    fn click(&self, element: &ElementHandle) -> Result<(), ElementFault>;

    /// Clear an editable element
    fn clear(&self, element: &ElementHandle) -> Result<(), ElementFault>;

    /// Type into an element
    fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), ElementFault>;

    /// Perform a low-level input action sequence
    fn perform_actions(&self, actions: &ActionSequence) -> Result<(), ElementFault>;

    /// Execute a script (or a `mobile:` command on Appium sessions)
    fn execute_script(
        &self,
        script: &str,
        args: &[ScriptArg],
    ) -> Result<serde_json::Value, ElementFault>;

    /// Navigate to a URL
    fn navigate(&self, url: &str) -> Result<(), ElementFault>;

    /// Maximize the window
    fn maximize_window(&self) -> Result<(), ElementFault>;

    /// Apply session timeouts
    fn set_timeouts(&self, timeouts: &SessionTimeouts) -> Result<(), ElementFault>;

    /// End the session
    fn quit(&self) -> Result<(), ElementFault>;
}

/// Live sessions keyed by platform, at most one each.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Platform, Arc<dyn Session>>>,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("platforms", &self.platforms())
            .finish()
    }
}

impl SessionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `session` for its platform.
    ///
    /// Returns `false` and keeps the existing one when the platform already
    /// has a session.
    pub fn register(&self, session: Arc<dyn Session>) -> bool {
        let platform = session.platform();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if sessions.contains_key(&platform) {
            tracing::warn!(%platform, "session already initialised, keeping existing one");
            return false;
        }
        sessions.insert(platform, session);
        tracing::info!(%platform, "session initialised");
        true
    }

    /// Get the session for `platform`
    pub fn session(&self, platform: Platform) -> SondearResult<Arc<dyn Session>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&platform)
            .cloned()
            .ok_or(SondearError::SessionNotInitialized { platform })
    }

    /// Check whether `platform` has a session
    #[must_use]
    pub fn is_registered(&self, platform: Platform) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&platform)
    }

    /// Platforms with a live session
    #[must_use]
    pub fn platforms(&self) -> Vec<Platform> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        Platform::ALL
            .into_iter()
            .filter(|p| sessions.contains_key(p))
            .collect()
    }

    /// Quit and forget the session for `platform`.
    ///
    /// Quitting a platform that was never started is a no-op.
    pub fn quit(&self, platform: Platform) -> SondearResult<()> {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&platform);
        match removed {
            Some(session) => {
                tracing::debug!(%platform, "quitting session");
                session.quit()?;
                tracing::info!(%platform, "session quit");
                Ok(())
            }
            None => Ok(()),
        }
    }
}
