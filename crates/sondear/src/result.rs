//! Result and error types for Sondear.
//!
//! Two layers of failure exist. [`ElementFault`] is what a live session
//! reports for a single command (element missing, stale, not interactable).
//! Faults are absorbed by the step-down classifier and rarely reach callers.
//! [`SondearError`] is what the public API returns.

use crate::interaction::Action;
use crate::locator::Platform;
use crate::state::ElementState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for Sondear operations
pub type SondearResult<T> = Result<T, SondearError>;

/// Kind of fault raised by a session command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultKind {
    /// No element matched the selector
    NotFound,
    /// The handle no longer refers to a live view node
    Stale,
    /// The element exists but cannot be interacted with
    NotInteractable,
    /// Another element would receive the click
    ClickIntercepted,
    /// The command is invalid for the element's current state
    InvalidInteractionState,
    /// A bounded wait ran out of time
    Timeout,
    /// Anything the session could not classify
    Other,
}

impl FaultKind {
    /// WebDriver error code for this kind
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "no such element",
            Self::Stale => "stale element reference",
            Self::NotInteractable => "element not interactable",
            Self::ClickIntercepted => "element click intercepted",
            Self::InvalidInteractionState => "invalid element state",
            Self::Timeout => "timeout",
            Self::Other => "unknown error",
        }
    }

    /// Map a WebDriver error code back to a kind
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "no such element" => Self::NotFound,
            "stale element reference" => Self::Stale,
            "element not interactable" => Self::NotInteractable,
            "element click intercepted" => Self::ClickIntercepted,
            "invalid element state" => Self::InvalidInteractionState,
            "timeout" | "script timeout" => Self::Timeout,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fault reported by a session command
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ElementFault {
    /// Fault classification
    pub kind: FaultKind,
    /// Session-provided detail
    pub message: String,
}

impl ElementFault {
    /// Create a fault of the given kind
    #[must_use]
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// No element matched
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FaultKind::NotFound, message)
    }

    /// Handle went stale
    #[must_use]
    pub fn stale(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Stale, message)
    }

    /// Element not interactable
    #[must_use]
    pub fn not_interactable(message: impl Into<String>) -> Self {
        Self::new(FaultKind::NotInteractable, message)
    }

    /// Wait ran out of time
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Timeout, message)
    }

    /// Check the fault kind
    #[must_use]
    pub fn is(&self, kind: FaultKind) -> bool {
        self.kind == kind
    }

    /// Check for staleness
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.is(FaultKind::Stale)
    }
}

/// Errors that can occur in Sondear
#[derive(Debug, Error)]
pub enum SondearError {
    /// No session was registered for the platform
    #[error("{platform} session not yet initialised")]
    SessionNotInitialized {
        /// Platform that was requested
        platform: Platform,
    },

    /// Resolution gave up after step-down and the edge-probe
    #[error("Unable to resolve '{locator}' as {state} after {attempts} attempt(s): {last_fault}")]
    UnresolvedElement {
        /// Logical locator name
        locator: String,
        /// Requested state
        state: ElementState,
        /// Attempts made
        attempts: u32,
        /// Last fault observed
        last_fault: ElementFault,
    },

    /// An interaction could not run against the element
    #[error("Cannot {action} '{locator}': {reason}")]
    InteractionFailed {
        /// Interaction attempted
        action: Action,
        /// Logical locator name
        locator: String,
        /// State-specific reason
        reason: String,
    },

    /// The chosen strategy cannot perform the action
    #[error("{strategy} strategy does not support {action} on {platform}")]
    UnsupportedAction {
        /// Strategy name
        strategy: &'static str,
        /// Interaction attempted
        action: Action,
        /// Target platform
        platform: Platform,
    },

    /// A session command failed outside of resolution
    #[error("Session command failed: {0}")]
    Session(#[from] ElementFault),

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Locator catalog problem
    #[error("Locator catalog error: {message}")]
    Catalog {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl SondearError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a catalog error
    #[must_use]
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create an interaction failure
    #[must_use]
    pub fn interaction(action: Action, locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InteractionFailed {
            action,
            locator: locator.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means the element could not be resolved
    #[must_use]
    pub const fn is_unresolved(&self) -> bool {
        matches!(self, Self::UnresolvedElement { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_kind_code_round_trip() {
        for kind in [
            FaultKind::NotFound,
            FaultKind::Stale,
            FaultKind::NotInteractable,
            FaultKind::ClickIntercepted,
            FaultKind::InvalidInteractionState,
            FaultKind::Timeout,
        ] {
            assert_eq!(FaultKind::from_code(kind.as_str()), kind);
        }
        assert_eq!(FaultKind::from_code("javascript error"), FaultKind::Other);
    }

    #[test]
    fn test_fault_display() {
        let fault = ElementFault::stale("node detached");
        assert_eq!(fault.to_string(), "stale element reference: node detached");
        assert!(fault.is_stale());
    }

    #[test]
    fn test_session_not_initialized_message() {
        let err = SondearError::SessionNotInitialized {
            platform: Platform::Ios,
        };
        assert_eq!(err.to_string(), "IOS session not yet initialised");
    }

    #[test]
    fn test_interaction_error_message() {
        let err = SondearError::interaction(Action::Click, "submit", "element is not interactable");
        assert_eq!(
            err.to_string(),
            "Cannot click 'submit': element is not interactable"
        );
        assert!(!err.is_unresolved());
    }

    #[test]
    fn test_fault_converts_into_error() {
        let err: SondearError = ElementFault::not_interactable("covered").into();
        assert!(matches!(err, SondearError::Session(_)));
    }
}
