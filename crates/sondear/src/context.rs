//! Test Context
//!
//! One [`TestContext`] per test run owns every piece of shared state: the
//! configuration, the element cache, the session registry and the wait
//! pool. Everything else borrows from it, so parallel tests on separate
//! contexts never see each other's caches or sessions.
//!
//! ```ignore
//! let ctx = TestContext::new(ResolverConfig::default())?;
//! ctx.register_session(Arc::new(my_webdriver_session));
//! ctx.launch_url("https://example.com/login", true)?;
//!
//! let username = Locator::web("username", SelectorKind::Name, "username");
//! ctx.interactions(NativeActions).enter_text(&username, "alice", true)?;
//! ```

use crate::cache::ElementCache;
use crate::config::ResolverConfig;
use crate::driver::{ElementHandle, Session, SessionRegistry, SessionTimeouts};
use crate::interaction::{InteractionStrategy, Interactions};
use crate::locator::{Locator, Platform};
use crate::resolver::Resolver;
use crate::result::SondearResult;
use crate::state::ElementState;
use crate::wait::{WaitEngine, WaitPool};
use std::sync::Arc;
use std::time::Duration;

/// Shared state for one test run
#[derive(Debug, Default)]
pub struct TestContext {
    config: ResolverConfig,
    cache: ElementCache,
    sessions: SessionRegistry,
    waits: WaitPool,
}

impl TestContext {
    /// Create a context after validating `config`
    pub fn new(config: ResolverConfig) -> SondearResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Element cache
    #[must_use]
    pub const fn cache(&self) -> &ElementCache {
        &self.cache
    }

    /// Session registry
    #[must_use]
    pub const fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Wait pool
    #[must_use]
    pub const fn waits(&self) -> &WaitPool {
        &self.waits
    }

    /// Register a session for its platform; `false` if one already exists
    pub fn register_session(&self, session: Arc<dyn Session>) -> bool {
        self.sessions.register(session)
    }

    /// Session for `platform`
    pub fn session(&self, platform: Platform) -> SondearResult<Arc<dyn Session>> {
        self.sessions.session(platform)
    }

    /// Resolver over this context
    #[must_use]
    pub const fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.cache, &self.sessions, &self.config)
    }

    /// Wait engine over this context
    #[must_use]
    pub const fn wait_engine(&self) -> WaitEngine<'_> {
        WaitEngine::new(self.resolver(), &self.waits)
    }

    /// Resolve `locator` aiming for `state`
    pub fn resolve(&self, locator: &Locator, state: ElementState) -> SondearResult<ElementHandle> {
        self.resolver().resolve(locator, state)
    }

    /// Check `state` with the adaptive wait
    pub fn is_element(&self, state: ElementState, locator: &Locator) -> SondearResult<bool> {
        self.wait_engine().is_element(state, locator)
    }

    /// Check `state` within `timeout`
    pub fn is_element_within(
        &self,
        state: ElementState,
        locator: &Locator,
        timeout: Duration,
    ) -> SondearResult<bool> {
        self.wait_engine().is_element_within(state, locator, timeout)
    }

    /// Drop every cached element
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Interactions performed with `strategy`
    #[must_use]
    pub fn interactions<S: InteractionStrategy>(&self, strategy: S) -> Interactions<'_, S> {
        Interactions::new(self, strategy)
    }

    /// Navigate the web session to `url`, maximizing the window first if asked
    pub fn launch_url(&self, url: &str, maximize: bool) -> SondearResult<()> {
        let session = self.session(Platform::Web)?;
        if maximize {
            session.maximize_window()?;
        }
        session.navigate(url)?;
        tracing::info!(url, maximize, "launched url");
        Ok(())
    }

    /// Apply session timeouts on `platform`
    pub fn set_timeouts(&self, platform: Platform, timeouts: &SessionTimeouts) -> SondearResult<()> {
        self.session(platform)?.set_timeouts(timeouts)?;
        tracing::debug!(%platform, ?timeouts, "applied session timeouts");
        Ok(())
    }

    /// Quit `platform`'s session and drop its cached elements and waits
    pub fn quit(&self, platform: Platform) -> SondearResult<()> {
        self.cache.remove_platform(platform);
        self.waits.forget(platform);
        self.sessions.quit(platform)
    }

    /// Quit every session, returning the first failure after trying them all
    pub fn quit_all(&self) -> SondearResult<()> {
        let mut first_err = None;
        for platform in self.sessions.platforms() {
            if let Err(err) = self.quit(platform) {
                tracing::warn!(%platform, error = %err, "failed to quit session");
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
