//! Per-state wait conditions.

use crate::classify::FailureClassifier;
use crate::driver::Session;
use crate::locator::Locator;
use crate::resolver::Resolver;
use crate::result::{ElementFault, FaultKind};
use crate::state::ElementState;

/// Faults a flexible wait for `state` swallows while polling
#[must_use]
pub const fn ignored_faults(state: ElementState) -> &'static [FaultKind] {
    match state {
        ElementState::Present => &[FaultKind::NotFound],
        ElementState::Visible => &[FaultKind::Stale],
        ElementState::Enabled | ElementState::Clickable | ElementState::Disabled => {
            &[FaultKind::NotInteractable]
        }
        ElementState::NotPresent | ElementState::Invisible => &[],
    }
}

/// Faults the shared adaptive wait swallows
pub const ADAPTIVE_IGNORED: &[FaultKind] = &[FaultKind::NotFound];

/// One poll of the predicate for `state`.
///
/// `Ok(Some(verdict))` ends the wait, `Ok(None)` polls again, and a fault
/// goes to the wait's ignore list. Stale faults evict the cache entry on
/// the way out.
pub(crate) fn evaluate(
    state: ElementState,
    resolver: &Resolver<'_>,
    session: &dyn Session,
    locator: &Locator,
    classifier: &FailureClassifier<'_>,
) -> Result<Option<bool>, ElementFault> {
    let observe = |fault: ElementFault| {
        classifier.evict_if_stale(&fault, locator);
        fault
    };
    let found = resolver.lookup(session, locator, state).map_err(observe);

    match state {
        ElementState::Present | ElementState::Visible => {
            let element = found?;
            let displayed = session.is_displayed(&element).map_err(observe)?;
            Ok(displayed.then_some(true))
        }
        ElementState::NotPresent => match found {
            Ok(_) => Ok(None),
            Err(fault) if gone(&fault) => Ok(Some(true)),
            Err(fault) => Err(fault),
        },
        ElementState::Invisible => match found {
            Ok(element) => match session.is_displayed(&element).map_err(observe) {
                Ok(true) => Ok(None),
                Ok(false) => Ok(Some(true)),
                Err(fault) if gone(&fault) => Ok(Some(true)),
                Err(fault) => Err(fault),
            },
            Err(fault) if gone(&fault) => Ok(Some(true)),
            Err(fault) => Err(fault),
        },
        ElementState::Enabled | ElementState::Clickable => {
            let element = found?;
            let ready = session.is_displayed(&element).map_err(observe)?
                && session.is_enabled(&element).map_err(observe)?;
            Ok(ready.then_some(true))
        }
        ElementState::Disabled => {
            let element = found?;
            let clickable = session.is_displayed(&element).map_err(observe)?
                && session.is_enabled(&element).map_err(observe)?;
            Ok(Some(!clickable))
        }
    }
}

fn gone(fault: &ElementFault) -> bool {
    matches!(fault.kind, FaultKind::NotFound | FaultKind::Stale)
}
