//! Wait Strategy Engine
//!
//! Answers "is this element in that state?" by polling a per-state predicate
//! until it holds or a timeout elapses.
//!
//! ## Wait flavors
//!
//! - **Adaptive**: one shared wait with the default timeout, built lazily and
//!   reused by every [`WaitEngine::is_element`] call.
//! - **Flexible**: a wait per platform and caller-chosen timeout, with a
//!   per-state list of faults that mean "not yet". Used by
//!   [`WaitEngine::is_element_within`].
//!
//! Neither flavor leaks session faults to the caller: a fault outside the
//! wait's ignore list goes to the step-down classifier, and the answer is
//! `true` or `false`. When the classifier stops on a missing element, an
//! edge-probe bounded by the remaining window gets one more look before the
//! answer becomes `false`. The only error is a missing session.

mod condition;
mod fluent;
mod pool;

pub use condition::{ignored_faults, ADAPTIVE_IGNORED};
pub use fluent::{deadline_after, FluentWait, WaitResult};
pub use pool::WaitPool;

use crate::classify::{edge_probe_until, StepDown};
use crate::locator::Locator;
use crate::resolver::Resolver;
use crate::result::{FaultKind, SondearResult};
use crate::state::ElementState;
use std::time::{Duration, Instant};

/// Verifies element states against live sessions
#[derive(Debug, Clone, Copy)]
pub struct WaitEngine<'a> {
    resolver: Resolver<'a>,
    pool: &'a WaitPool,
}

impl<'a> WaitEngine<'a> {
    /// Create an engine
    #[must_use]
    pub const fn new(resolver: Resolver<'a>, pool: &'a WaitPool) -> Self {
        Self { resolver, pool }
    }

    /// Check `state` using the shared adaptive wait
    pub fn is_element(&self, state: ElementState, locator: &Locator) -> SondearResult<bool> {
        let wait = self.pool.adaptive(self.resolver.config());
        self.verify(state, locator, &wait, ADAPTIVE_IGNORED)
    }

    /// Check `state` within `timeout` using a flexible wait
    pub fn is_element_within(
        &self,
        state: ElementState,
        locator: &Locator,
        timeout: Duration,
    ) -> SondearResult<bool> {
        let wait = self
            .pool
            .flexible(locator.platform(), timeout, self.resolver.config());
        self.verify(state, locator, &wait, ignored_faults(state))
    }

    fn verify(
        &self,
        state: ElementState,
        locator: &Locator,
        wait: &FluentWait,
        ignored: &[FaultKind],
    ) -> SondearResult<bool> {
        let session = self.resolver.session(locator.platform())?;
        let classifier = self.resolver.classifier();
        let deadline = deadline_after(wait.timeout());
        tracing::info!(locator = locator.name(), %state, "verifying element state");

        let verdict = loop {
            let outcome = wait.until_deadline(deadline, ignored, || {
                condition::evaluate(state, &self.resolver, session.as_ref(), locator, &classifier)
            });
            let fault = match outcome {
                Ok(result) => {
                    tracing::debug!(
                        locator = locator.name(),
                        polls = result.polls,
                        elapsed_ms = result.elapsed.as_millis() as u64,
                        "wait finished"
                    );
                    break result.value;
                }
                Err(fault) => fault,
            };
            let now = Instant::now();
            match classifier.classify(&fault, locator, state) {
                StepDown::Retry if now < deadline => {
                    std::thread::sleep(wait.poll_interval().min(deadline - now));
                }
                StepDown::Stop if now < deadline && fault.kind == FaultKind::NotFound => {
                    let config = self.resolver.config();
                    let found = edge_probe_until(
                        session.as_ref(),
                        locator,
                        config.edge_probe_attempts,
                        config.time_unit(),
                        deadline,
                    );
                    if !found {
                        break false;
                    }
                }
                _ => break false,
            }
        };

        tracing::info!(locator = locator.name(), %state, verdict, "verification done");
        Ok(verdict)
    }
}
