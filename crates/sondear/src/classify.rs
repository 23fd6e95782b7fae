//! Step-down: failure classification after a resolution or wait fault.
//!
//! Given the fault a session raised and the state the caller asked for, the
//! classifier answers one question: is that state still achievable, so that
//! trying again is worthwhile? Staleness gets special treatment: the cached
//! handle for the locator is evicted before the answer is returned, and no
//! other component evicts on staleness.
//!
//! When the answer is [`StepDown::Stop`], the caller gets one last chance
//! through [`edge_probe`]: a short bounded poll for the raw selector, which
//! absorbs a render that completes just after the query gave up. Waits use
//! [`edge_probe_until`] so the probe stays inside their window.

use crate::cache::ElementCache;
use crate::driver::Session;
use crate::locator::Locator;
use crate::result::{ElementFault, FaultKind};
use crate::state::ElementState;
use std::time::{Duration, Instant};

/// Step-down verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDown {
    /// The state may still be reached; try again
    Retry,
    /// The state is out of reach
    Stop,
}

impl StepDown {
    /// Check for retry
    #[must_use]
    pub const fn should_retry(&self) -> bool {
        matches!(self, Self::Retry)
    }
}

/// Maps faults to retry decisions and evicts stale cache entries
#[derive(Debug, Clone, Copy)]
pub struct FailureClassifier<'a> {
    cache: &'a ElementCache,
}

impl<'a> FailureClassifier<'a> {
    /// Create a classifier over `cache`
    #[must_use]
    pub const fn new(cache: &'a ElementCache) -> Self {
        Self { cache }
    }

    /// Decide without side effects.
    ///
    /// Timeouts always stop. Otherwise:
    ///
    /// | Desired state        | Stops on                              |
    /// |----------------------|---------------------------------------|
    /// | Present, Visible     | NotFound                              |
    /// | NotPresent, Invisible| never                                 |
    /// | Enabled, Clickable   | NotInteractable, ClickIntercepted     |
    /// | Disabled             | anything but InvalidInteractionState  |
    #[must_use]
    pub const fn decide(kind: FaultKind, state: ElementState) -> StepDown {
        if matches!(kind, FaultKind::Timeout) {
            return StepDown::Stop;
        }
        let stop = match state {
            ElementState::Present | ElementState::Visible => matches!(kind, FaultKind::NotFound),
            ElementState::NotPresent | ElementState::Invisible => false,
            ElementState::Enabled | ElementState::Clickable => {
                matches!(kind, FaultKind::NotInteractable | FaultKind::ClickIntercepted)
            }
            ElementState::Disabled => !matches!(kind, FaultKind::InvalidInteractionState),
        };
        if stop {
            StepDown::Stop
        } else {
            StepDown::Retry
        }
    }

    /// Classify `fault` for `locator`, evicting its cache entry on staleness
    pub fn classify(
        &self,
        fault: &ElementFault,
        locator: &Locator,
        state: ElementState,
    ) -> StepDown {
        self.evict_if_stale(fault, locator);
        let verdict = Self::decide(fault.kind, state);
        match verdict {
            StepDown::Retry => tracing::debug!(
                locator = locator.name(),
                %state,
                fault = %fault.kind,
                "stepping down: state still reachable, retrying"
            ),
            StepDown::Stop => tracing::warn!(
                locator = locator.name(),
                %state,
                fault = %fault,
                "stepping down: state unreachable"
            ),
        }
        verdict
    }

    /// Evict `locator` from the cache when `fault` is a staleness fault
    pub fn evict_if_stale(&self, fault: &ElementFault, locator: &Locator) -> bool {
        if fault.is_stale() && self.cache.remove(locator.name()).is_some() {
            tracing::info!(locator = locator.name(), "evicted stale element");
            return true;
        }
        false
    }
}

/// Poll once per `interval`, up to `attempts` times, for `locator`'s selector
/// to match anything at all.
pub fn edge_probe(
    session: &dyn Session,
    locator: &Locator,
    attempts: u32,
    interval: Duration,
) -> bool {
    probe_selector(session, locator, attempts, interval, None)
}

/// [`edge_probe`] that never sleeps past `deadline`.
///
/// Used by waits, whose answer is owed by the end of the caller's window.
pub fn edge_probe_until(
    session: &dyn Session,
    locator: &Locator,
    attempts: u32,
    interval: Duration,
    deadline: Instant,
) -> bool {
    probe_selector(session, locator, attempts, interval, Some(deadline))
}

fn probe_selector(
    session: &dyn Session,
    locator: &Locator,
    attempts: u32,
    interval: Duration,
    deadline: Option<Instant>,
) -> bool {
    tracing::warn!(
        locator = locator.name(),
        attempts,
        "edge-probe: giving the element extra time to appear"
    );
    for attempt in 1..=attempts {
        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    tracing::debug!(locator = locator.name(), attempt, "edge-probe reached deadline");
                    break;
                }
                interval.min(deadline - now)
            }
            None => interval,
        };
        std::thread::sleep(pause);
        match session.find_all(locator.selector()) {
            Ok(found) if !found.is_empty() => {
                tracing::info!(locator = locator.name(), attempt, "edge-probe found element");
                return true;
            }
            Ok(_) => {}
            Err(fault) => tracing::debug!(locator = locator.name(), %fault, "edge-probe query failed"),
        }
    }
    tracing::error!(locator = locator.name(), "edge-probe exhausted");
    false
}
