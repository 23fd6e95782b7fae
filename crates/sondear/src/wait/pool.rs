//! Shared wait instances.

use super::fluent::FluentWait;
use crate::config::ResolverConfig;
use crate::locator::Platform;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

/// Builds each wait at most once.
///
/// The adaptive wait (default timeout, ignores only "not found") is shared
/// by every platform. Flexible waits are keyed by platform and timeout, so a
/// repeated custom duration reuses the wait built for it.
#[derive(Debug, Default)]
pub struct WaitPool {
    adaptive: OnceLock<Arc<FluentWait>>,
    flexible: Mutex<HashMap<(Platform, Duration), Arc<FluentWait>>>,
    built: AtomicUsize,
}

impl WaitPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared adaptive wait
    pub fn adaptive(&self, config: &ResolverConfig) -> Arc<FluentWait> {
        Arc::clone(self.adaptive.get_or_init(|| {
            self.built.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(timeout = ?config.default_timeout(), "built adaptive wait");
            Arc::new(FluentWait::new(config.default_timeout(), config.poll_interval()))
        }))
    }

    /// The flexible wait for `platform` with `timeout`
    pub fn flexible(
        &self,
        platform: Platform,
        timeout: Duration,
        config: &ResolverConfig,
    ) -> Arc<FluentWait> {
        let mut waits = self.flexible.lock().unwrap_or_else(PoisonError::into_inner);
        let wait = waits.entry((platform, timeout)).or_insert_with(|| {
            self.built.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(%platform, ?timeout, "built flexible wait");
            Arc::new(FluentWait::new(timeout, config.poll_interval()))
        });
        Arc::clone(wait)
    }

    /// Drop the flexible waits of `platform`
    pub fn forget(&self, platform: Platform) {
        self.flexible
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(p, _), _| *p != platform);
    }

    /// Number of waits constructed so far
    #[must_use]
    pub fn built(&self) -> usize {
        self.built.load(Ordering::Relaxed)
    }
}
