//! Fluent polling wait.

use crate::result::{ElementFault, FaultKind};
use std::time::{Duration, Instant};

/// Fallback horizon when a timeout cannot be added to the current instant
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// Instant `timeout` from now.
///
/// Timeouts too large to represent (such as `Duration::MAX`) saturate to a
/// horizon decades away instead of overflowing.
#[must_use]
pub fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Outcome of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult<T> {
    /// Value the condition produced
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the condition ran
    pub polls: u32,
}

// =============================================================================
// FLUENT WAIT
// =============================================================================

/// Polls a condition until it yields a value or the timeout elapses.
///
/// Faults whose kind is in the caller's ignore list are swallowed and the
/// poll continues; any other fault ends the wait immediately so the caller
/// can classify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FluentWait {
    timeout: Duration,
    poll_interval: Duration,
}

impl FluentWait {
    /// Create a wait
    #[must_use]
    pub const fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Total time budget
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Delay between polls
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Poll `condition` for up to [`Self::timeout`], starting now
    pub fn until<T, F>(&self, ignored: &[FaultKind], condition: F) -> Result<WaitResult<T>, ElementFault>
    where
        F: FnMut() -> Result<Option<T>, ElementFault>,
    {
        self.until_deadline(deadline_after(self.timeout), ignored, condition)
    }

    /// Poll `condition` until `deadline`.
    ///
    /// The condition always runs at least once and once more at the
    /// deadline. Sleeps never overshoot the deadline.
    pub fn until_deadline<T, F>(
        &self,
        deadline: Instant,
        ignored: &[FaultKind],
        mut condition: F,
    ) -> Result<WaitResult<T>, ElementFault>
    where
        F: FnMut() -> Result<Option<T>, ElementFault>,
    {
        let start = Instant::now();
        let mut polls = 0u32;
        let mut last_ignored: Option<ElementFault> = None;

        loop {
            polls += 1;
            match condition() {
                Ok(Some(value)) => {
                    return Ok(WaitResult {
                        value,
                        elapsed: start.elapsed(),
                        polls,
                    })
                }
                Ok(None) => {}
                Err(fault) if ignored.contains(&fault.kind) => {
                    tracing::trace!(fault = %fault, polls, "ignoring fault while polling");
                    last_ignored = Some(fault);
                }
                Err(fault) => return Err(fault),
            }

            let now = Instant::now();
            if now >= deadline {
                let elapsed = start.elapsed();
                let message = match last_ignored {
                    Some(fault) => format!(
                        "condition not met after {}ms ({polls} polls), last fault: {fault}",
                        elapsed.as_millis()
                    ),
                    None => format!(
                        "condition not met after {}ms ({polls} polls)",
                        elapsed.as_millis()
                    ),
                };
                return Err(ElementFault::timeout(message));
            }
            std::thread::sleep(self.poll_interval.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn quick() -> FluentWait {
        FluentWait::new(Duration::from_millis(50), Duration::from_millis(5))
    }

    #[test]
    fn test_immediate_success() {
        let result = quick().until(&[], || Ok(Some(7))).unwrap();
        assert_eq!(result.value, 7);
        assert_eq!(result.polls, 1);
    }

    #[test]
    fn test_polls_until_ready() {
        let calls = Cell::new(0);
        let result = quick()
            .until(&[], || {
                calls.set(calls.get() + 1);
                Ok((calls.get() >= 3).then_some("ready"))
            })
            .unwrap();
        assert_eq!(result.value, "ready");
        assert_eq!(result.polls, 3);
    }

    #[test]
    fn test_ignored_faults_keep_polling() {
        let calls = Cell::new(0);
        let result = quick()
            .until(&[FaultKind::NotFound], || {
                calls.set(calls.get() + 1);
                if calls.get() < 4 {
                    Err(ElementFault::not_found("not yet"))
                } else {
                    Ok(Some(()))
                }
            })
            .unwrap();
        assert_eq!(result.polls, 4);
    }

    #[test]
    fn test_foreign_fault_ends_wait() {
        let calls = Cell::new(0);
        let err = quick()
            .until::<(), _>(&[FaultKind::NotFound], || {
                calls.set(calls.get() + 1);
                Err(ElementFault::stale("detached"))
            })
            .unwrap_err();
        assert_eq!(err.kind, FaultKind::Stale);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_timeout_reports_last_fault() {
        let start = Instant::now();
        let err = FluentWait::new(Duration::from_millis(30), Duration::from_millis(10))
            .until::<(), _>(&[FaultKind::NotFound], || Err(ElementFault::not_found("missing")))
            .unwrap_err();
        assert_eq!(err.kind, FaultKind::Timeout);
        assert!(err.message.contains("missing"));
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_zero_timeout_runs_once() {
        let calls = Cell::new(0);
        let err = FluentWait::new(Duration::ZERO, Duration::from_millis(10))
            .until::<(), _>(&[], || {
                calls.set(calls.get() + 1);
                Ok(None)
            })
            .unwrap_err();
        assert_eq!(err.kind, FaultKind::Timeout);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_unbounded_timeout_saturates() {
        let deadline = deadline_after(Duration::MAX);
        assert!(deadline > Instant::now() + Duration::from_secs(60 * 60 * 24 * 365));

        let result = FluentWait::new(Duration::MAX, Duration::from_millis(1))
            .until(&[], || Ok(Some("ready")))
            .unwrap();
        assert_eq!(result.value, "ready");
    }
}
