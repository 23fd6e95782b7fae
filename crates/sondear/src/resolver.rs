//! Element resolution.
//!
//! Turns a [`Locator`] into a live [`ElementHandle`]: cache first, then a
//! fresh query, with the step-down classifier deciding after every fault
//! whether another attempt is worthwhile and the edge-probe granting one
//! last chance before giving up. The retry loop is bounded by both an
//! attempt budget and a wall-clock deadline.

use crate::cache::ElementCache;
use crate::classify::{edge_probe, FailureClassifier, StepDown};
use crate::config::{CacheHitPolicy, ResolverConfig};
use crate::driver::{ElementHandle, Session, SessionRegistry};
use crate::locator::{Locator, Platform};
use crate::result::{ElementFault, SondearError, SondearResult};
use crate::state::ElementState;
use crate::wait::deadline_after;
use std::sync::Arc;
use std::time::Instant;

/// Resolves locators against registered sessions
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    cache: &'a ElementCache,
    sessions: &'a SessionRegistry,
    config: &'a ResolverConfig,
}

impl<'a> Resolver<'a> {
    /// Create a resolver
    #[must_use]
    pub const fn new(
        cache: &'a ElementCache,
        sessions: &'a SessionRegistry,
        config: &'a ResolverConfig,
    ) -> Self {
        Self {
            cache,
            sessions,
            config,
        }
    }

    /// Session for `platform`
    pub fn session(&self, platform: Platform) -> SondearResult<Arc<dyn Session>> {
        self.sessions.session(platform)
    }

    /// Classifier sharing this resolver's cache
    #[must_use]
    pub const fn classifier(&self) -> FailureClassifier<'a> {
        FailureClassifier::new(self.cache)
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &'a ResolverConfig {
        self.config
    }

    /// Resolve `locator` to a live handle, aiming for `state`.
    ///
    /// # Errors
    ///
    /// [`SondearError::SessionNotInitialized`] when the locator's platform
    /// has no session, [`SondearError::UnresolvedElement`] when step-down
    /// and the edge-probe both gave up or the retry budget ran out.
    pub fn resolve(&self, locator: &Locator, state: ElementState) -> SondearResult<ElementHandle> {
        let session = self.session(locator.platform())?;
        let classifier = self.classifier();
        let deadline = deadline_after(self.config.resolve_deadline());
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let fault = match self.lookup(session.as_ref(), locator, state) {
                Ok(handle) => return Ok(handle),
                Err(fault) => fault,
            };

            let out_of_budget =
                attempts >= self.config.max_resolve_attempts || Instant::now() >= deadline;

            match classifier.classify(&fault, locator, state) {
                StepDown::Retry if !out_of_budget => {
                    if !fault.is_stale() {
                        std::thread::sleep(self.config.poll_interval());
                    }
                }
                StepDown::Stop if !out_of_budget => {
                    let found = edge_probe(
                        session.as_ref(),
                        locator,
                        self.config.edge_probe_attempts,
                        self.config.time_unit(),
                    );
                    if !found {
                        return Err(unresolved(locator, state, attempts, fault));
                    }
                }
                _ => {
                    tracing::error!(
                        locator = locator.name(),
                        %state,
                        attempts,
                        "resolve budget exhausted"
                    );
                    return Err(unresolved(locator, state, attempts, fault));
                }
            }
        }
    }

    /// One resolution attempt, with no retry.
    ///
    /// A cached handle is probed before reuse. A stale probe surfaces as the
    /// fault so the classifier evicts it; any other probe failure falls
    /// through to a fresh query.
    pub(crate) fn lookup(
        &self,
        session: &dyn Session,
        locator: &Locator,
        state: ElementState,
    ) -> Result<ElementHandle, ElementFault> {
        let name = locator.name();
        if let Some(cached) = self.cache.get(name) {
            match session.probe(&cached) {
                Ok(()) => match self.config.cache_hit_policy {
                    CacheHitPolicy::Trust => {
                        tracing::debug!(locator = name, "cache hit");
                        return Ok(cached);
                    }
                    CacheHitPolicy::Verify => {
                        if state_holds(session, &cached, state)? {
                            tracing::debug!(locator = name, %state, "cache hit verified");
                            return Ok(cached);
                        }
                        tracing::debug!(locator = name, %state, "cached element not in state, re-querying");
                    }
                },
                Err(fault) if fault.is_stale() => return Err(fault),
                Err(fault) => {
                    tracing::debug!(locator = name, %fault, "cached element probe failed, re-querying");
                }
            }
        }

        let handle = session.find(locator.selector())?;
        self.cache.put(name, handle.clone());
        tracing::info!(locator = name, selector = %locator.selector(), "element found");
        Ok(handle)
    }
}

fn state_holds(
    session: &dyn Session,
    element: &ElementHandle,
    state: ElementState,
) -> Result<bool, ElementFault> {
    Ok(match state {
        ElementState::Present | ElementState::Visible => session.is_displayed(element)?,
        ElementState::Enabled | ElementState::Clickable => {
            session.is_displayed(element)? && session.is_enabled(element)?
        }
        ElementState::Disabled => {
            !(session.is_displayed(element)? && session.is_enabled(element)?)
        }
        ElementState::NotPresent | ElementState::Invisible => true,
    })
}

fn unresolved(locator: &Locator, state: ElementState, attempts: u32, fault: ElementFault) -> SondearError {
    SondearError::UnresolvedElement {
        locator: locator.name().to_string(),
        state,
        attempts,
        last_fault: fault,
    }
}
