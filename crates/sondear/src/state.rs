//! Requested element states.

use serde::{Deserialize, Serialize};

/// The condition a caller wants an element to be in.
///
/// This is an intent, not a property read off the element: it selects which
/// predicate the wait engine polls and which faults the step-down classifier
/// treats as recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementState {
    /// Exists in the tree and is displayed
    Present,
    /// Gone from the tree, or its handle went stale
    NotPresent,
    /// Exists and reports visible
    Visible,
    /// Absent, stale, or not displayed
    Invisible,
    /// Displayed and enabled
    Enabled,
    /// Displayed and not enabled
    Disabled,
    /// Displayed and enabled, ready for a pointer action
    Clickable,
}

impl ElementState {
    /// Every state, in declaration order
    pub const ALL: [Self; 7] = [
        Self::Present,
        Self::NotPresent,
        Self::Visible,
        Self::Invisible,
        Self::Enabled,
        Self::Disabled,
        Self::Clickable,
    ];

    /// Get the state name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::NotPresent => "NotPresent",
            Self::Visible => "Visible",
            Self::Invisible => "Invisible",
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
            Self::Clickable => "Clickable",
        }
    }

    /// States satisfied by the element going away
    #[must_use]
    pub const fn expects_absence(&self) -> bool {
        matches!(self, Self::NotPresent | Self::Invisible)
    }

    /// States that need the element to accept input
    #[must_use]
    pub const fn expects_interactable(&self) -> bool {
        matches!(self, Self::Enabled | Self::Clickable)
    }
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
