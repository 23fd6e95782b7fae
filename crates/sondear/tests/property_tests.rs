//! Property-based tests for sondear.
//!
//! Uses proptest to check step-down decisions, selector lowering and
//! configuration handling over arbitrary inputs.

use proptest::prelude::*;
use sondear::prelude::*;
use sondear::{FailureClassifier, Selector, StepDown};

fn any_state() -> impl Strategy<Value = ElementState> {
    prop::sample::select(ElementState::ALL.to_vec())
}

fn any_fault() -> impl Strategy<Value = FaultKind> {
    prop_oneof![
        Just(FaultKind::NotFound),
        Just(FaultKind::Stale),
        Just(FaultKind::NotInteractable),
        Just(FaultKind::ClickIntercepted),
        Just(FaultKind::InvalidInteractionState),
        Just(FaultKind::Timeout),
        Just(FaultKind::Other),
    ]
}

fn any_kind() -> impl Strategy<Value = SelectorKind> {
    prop_oneof![
        Just(SelectorKind::XPath),
        Just(SelectorKind::Css),
        Just(SelectorKind::Name),
        Just(SelectorKind::Tag),
        Just(SelectorKind::Text),
        Just(SelectorKind::Chain),
        Just(SelectorKind::Predicate),
        Just(SelectorKind::Accessibility),
        Just(SelectorKind::Id),
    ]
}

// === Step-down Property Tests ===

proptest! {
    /// Timeouts are terminal whatever the requested state.
    #[test]
    fn prop_timeout_always_stops(state in any_state()) {
        prop_assert_eq!(FailureClassifier::decide(FaultKind::Timeout, state), StepDown::Stop);
    }

    /// Absence states never stop on anything but a timeout.
    #[test]
    fn prop_absence_states_retry(fault in any_fault()) {
        for state in [ElementState::NotPresent, ElementState::Invisible] {
            let expected = if fault == FaultKind::Timeout { StepDown::Stop } else { StepDown::Retry };
            prop_assert_eq!(FailureClassifier::decide(fault, state), expected);
        }
    }

    /// Staleness is always worth a retry unless the caller wants a disabled element.
    #[test]
    fn prop_stale_is_recoverable(state in any_state()) {
        let verdict = FailureClassifier::decide(FaultKind::Stale, state);
        prop_assert_eq!(verdict == StepDown::Retry, state != ElementState::Disabled);
    }
}

// === Selector Property Tests ===

proptest! {
    /// Web sessions get CSS for name/id lookups, quoting the value.
    #[test]
    fn prop_web_name_and_id_lower_to_css(value in "[a-zA-Z][a-zA-Z0-9_-]{0,15}") {
        let by_name = Selector::new(SelectorKind::Name, value.clone()).to_wire(Platform::Web);
        prop_assert_eq!(by_name.using.as_str(), "css selector");
        prop_assert_eq!(by_name.value, format!("*[name=\"{value}\"]"));

        let by_id = Selector::new(SelectorKind::Id, value.clone()).to_wire(Platform::Web);
        prop_assert_eq!(by_id.value, format!("*[id=\"{value}\"]"));
    }

    /// Mobile sessions receive the value untouched.
    #[test]
    fn prop_mobile_values_pass_through(kind in any_kind(), value in "[a-zA-Z0-9/*=' ]{1,20}") {
        for platform in [Platform::Ios, Platform::Android] {
            let wire = Selector::new(kind, value.clone()).to_wire(platform);
            prop_assert_eq!(wire.value, value.clone());
        }
    }

    /// Validation accepts exactly the kinds a platform supports.
    #[test]
    fn prop_validation_matches_support(kind in any_kind(), name in "[a-z]{1,10}") {
        for platform in Platform::ALL {
            let locator = Locator::new(platform, name.clone(), kind, "value");
            prop_assert_eq!(locator.validate().is_ok(), kind.supported_on(platform));
        }
    }
}

// === Configuration Property Tests ===

proptest! {
    /// Durations scale linearly with the time unit.
    #[test]
    fn prop_units_scale(unit in 1u64..2_000, timeout in 1u32..60, poll in 1u32..10) {
        let config = ResolverConfig::new()
            .with_time_unit_ms(unit)
            .with_default_timeout_units(timeout)
            .with_poll_interval_units(poll);
        prop_assert!(config.validate().is_ok());
        prop_assert_eq!(config.default_timeout().as_millis(), u128::from(unit) * u128::from(timeout));
        prop_assert_eq!(config.poll_interval().as_millis(), u128::from(unit) * u128::from(poll));
    }

    /// Config survives a JSON trip.
    #[test]
    fn prop_config_json_round_trip(unit in 1u64..5_000, attempts in 1u32..50, verify in any::<bool>()) {
        let policy = if verify { CacheHitPolicy::Verify } else { CacheHitPolicy::Trust };
        let config = ResolverConfig::new()
            .with_time_unit_ms(unit)
            .with_max_resolve_attempts(attempts)
            .with_cache_hit_policy(policy);
        let json = serde_json::to_string(&config).unwrap();
        prop_assert_eq!(ResolverConfig::from_json_str(&json).unwrap(), config);
    }
}
