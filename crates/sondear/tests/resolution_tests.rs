//! End-to-end resolution tests against the mock session.
//!
//! Time units are compressed to 10ms so the default waits (5 units) finish
//! quickly while keeping the same proportions as a real suite.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use sondear::mock::{MockElement, MockSession};
use sondear::prelude::*;
use sondear::{FailureClassifier, StepDown};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const UNIT_MS: u64 = 10;

fn units(n: u64) -> Duration {
    Duration::from_millis(UNIT_MS * n)
}

fn web_context() -> (TestContext, Arc<MockSession>) {
    let ctx = TestContext::new(ResolverConfig::new().with_time_unit_ms(UNIT_MS))
        .expect("valid config");
    let session = Arc::new(MockSession::new(Platform::Web));
    ctx.register_session(session.clone());
    (ctx, session)
}

fn login() -> Locator {
    Locator::web("login", SelectorKind::Css, "#login")
}

// ============================================================================
// Cache behaviour
// ============================================================================

#[test]
fn test_first_resolve_caches_exactly_one_entry() {
    let (ctx, session) = web_context();
    session.insert(MockElement::new("#login"));

    ctx.resolve(&login(), ElementState::Present).unwrap();

    assert_eq!(ctx.cache().len(), 1);
    assert!(ctx.cache().contains("login"));
}

#[test]
fn test_consecutive_resolves_share_one_query() {
    let (ctx, session) = web_context();
    session.insert(MockElement::new("#login"));

    let a = ctx.resolve(&login(), ElementState::Present).unwrap();
    let b = ctx.resolve(&login(), ElementState::Present).unwrap();

    assert_eq!(a, b);
    assert_eq!(session.find_count("#login"), 1);
}

#[test]
fn test_stale_entry_is_evicted_and_requeried() {
    let (ctx, session) = web_context();
    session.insert(MockElement::new("#login"));
    let stale = ctx.resolve(&login(), ElementState::Present).unwrap();

    session.make_stale("#login");
    let fresh = ctx.resolve(&login(), ElementState::Present).unwrap();

    assert_ne!(stale, fresh);
    assert_eq!(ctx.cache().get("login"), Some(fresh));
    assert_eq!(session.find_count("#login"), 2);
}

#[test]
fn test_clear_cache_always_requeries() {
    let (ctx, session) = web_context();
    session.insert(MockElement::new("#login"));

    for expected in 1..=3 {
        ctx.clear_cache();
        ctx.resolve(&login(), ElementState::Present).unwrap();
        assert_eq!(session.find_count("#login"), expected);
    }
}

// ============================================================================
// Waits
// ============================================================================

#[test]
fn test_present_is_false_on_timeout_never_an_error() {
    let (ctx, _session) = web_context();
    let start = Instant::now();

    let present = ctx.is_element(ElementState::Present, &login());

    assert!(matches!(present, Ok(false)));
    assert!(start.elapsed() >= units(5));
}

#[test]
fn test_late_element_within_window() {
    let (ctx, session) = web_context();
    session.insert(MockElement::new("#login").appear_after(units(4)));

    let present = ctx
        .is_element_within(ElementState::Present, &login(), units(5))
        .unwrap();

    assert!(present);
}

#[test]
fn test_hidden_element_is_not_present() {
    let (ctx, session) = web_context();
    session.insert(MockElement::new("#login").hidden());

    assert!(!ctx
        .is_element_within(ElementState::Present, &login(), units(2))
        .unwrap());
}

#[test]
fn test_disabled_negates_enabled_check() {
    let (ctx, session) = web_context();
    session.insert(MockElement::new("#login"));

    let enabled = ctx
        .is_element_within(ElementState::Clickable, &login(), units(2))
        .unwrap();
    let disabled = ctx
        .is_element_within(ElementState::Disabled, &login(), units(2))
        .unwrap();
    assert!(enabled);
    assert!(!disabled);

    session.set_enabled("#login", false);
    let disabled = ctx
        .is_element_within(ElementState::Disabled, &login(), units(2))
        .unwrap();
    assert!(disabled);
}

#[test]
fn test_late_visible_element_within_window() {
    let (ctx, session) = web_context();
    session.insert(MockElement::new("#login").appear_after(units(3)));

    let visible = ctx
        .is_element_within(ElementState::Visible, &login(), units(10))
        .unwrap();

    assert!(visible);
    assert!(ctx
        .is_element_within(ElementState::Clickable, &login(), units(2))
        .unwrap());
}

#[test]
fn test_hidden_disabled_snapshot_negates_clickable() {
    let (ctx, session) = web_context();
    session.insert(MockElement::new("#login").hidden().disabled());

    let clickable = ctx
        .is_element_within(ElementState::Clickable, &login(), units(2))
        .unwrap();
    let disabled = ctx
        .is_element_within(ElementState::Disabled, &login(), units(2))
        .unwrap();

    assert_eq!(disabled, !clickable);
}

#[test]
fn test_unbounded_window_answers_without_panicking() {
    let (ctx, session) = web_context();
    session.insert(MockElement::new("#login"));

    assert!(ctx
        .is_element_within(ElementState::Present, &login(), Duration::MAX)
        .unwrap());
}

#[test]
fn test_missing_session_surfaces_before_any_query() {
    let (ctx, session) = web_context();
    let menu = Locator::android("menu", SelectorKind::Id, "menu");

    let err = ctx.is_element(ElementState::Present, &menu).unwrap_err();

    assert!(matches!(
        err,
        SondearError::SessionNotInitialized {
            platform: Platform::Android
        }
    ));
    assert_eq!(session.call_count(), 0);
}

// ============================================================================
// Step-down and edge-probe
// ============================================================================

#[test]
fn test_not_interactable_clickable_stops() {
    assert_eq!(
        FailureClassifier::decide(FaultKind::NotInteractable, ElementState::Clickable),
        StepDown::Stop
    );
}

#[test]
fn test_edge_probe_runs_after_stop() {
    let (ctx, session) = web_context();

    let err = ctx.resolve(&login(), ElementState::Present).unwrap_err();

    assert!(err.is_unresolved());
    assert_eq!(
        session.find_all_count("#login"),
        sondear::DEFAULT_EDGE_PROBE_ATTEMPTS as usize
    );
}

#[test]
fn test_edge_probe_absorbs_late_render() {
    let (ctx, session) = web_context();
    session.insert(MockElement::new("#login").appear_after(units(2)));

    assert!(ctx.resolve(&login(), ElementState::Present).is_ok());
}

// ============================================================================
// Interactions
// ============================================================================

#[test]
fn test_enter_text_then_read_back() {
    let (ctx, session) = web_context();
    session.insert(MockElement::new("#login").with_text("Sign in"));
    let ui = ctx.interactions(NativeActions);

    ui.enter_text(&login(), "alice", true).unwrap();

    assert_eq!(session.typed_text("#login"), "alice");
    assert_eq!(ui.read_text(&login()).unwrap(), "Sign in");
}

#[test]
fn test_click_on_element_that_never_enables() {
    let (ctx, session) = web_context();
    session.insert(MockElement::new("#login").disabled());

    let err = ctx.interactions(ComposedActions).click(&login()).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Cannot click 'login': element is not interactable"
    );
    assert!(session.performed_actions().is_empty());
}

#[test]
fn test_click_waits_for_enable() {
    let (ctx, session) = web_context();
    session.insert(MockElement::new("#login").disabled());
    let toggler = {
        let session = session.clone();
        thread::spawn(move || {
            thread::sleep(units(2));
            session.set_enabled("#login", true);
        })
    };

    ctx.interactions(NativeActions).click(&login()).unwrap();
    toggler.join().unwrap();

    assert!(session.was_called("click"));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_parallel_resolves_share_cache() {
    let (ctx, session) = web_context();
    for i in 0..8 {
        session.insert(MockElement::new(format!("#item-{i}")));
    }
    let ctx = Arc::new(ctx);

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                let loc = Locator::web(format!("item-{i}"), SelectorKind::Css, format!("#item-{i}"));
                for _ in 0..10 {
                    ctx.resolve(&loc, ElementState::Present).unwrap();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    assert_eq!(ctx.cache().len(), 8);
    for i in 0..8 {
        assert_eq!(session.find_count(&format!("#item-{i}")), 1);
    }
}

// ============================================================================
// Catalog and config files
// ============================================================================

#[test]
fn test_catalog_and_config_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("sondear.yaml");
    std::fs::write(
        &config_path,
        "time_unit_ms: 10\ndefault_timeout_units: 3\ncache_hit_policy: verify\n",
    )
    .unwrap();
    let catalog_path = dir.path().join("locators.yaml");
    std::fs::write(
        &catalog_path,
        "login_page:\n  - platform: WEB\n    name: login\n    selector: { kind: CSS, value: \"#login\" }\n",
    )
    .unwrap();

    let ctx = TestContext::new(ResolverConfig::from_path(&config_path).unwrap()).unwrap();
    let catalog = LocatorCatalog::from_path(&catalog_path).unwrap();
    let session = Arc::new(MockSession::new(Platform::Web));
    session.insert(MockElement::new("#login"));
    ctx.register_session(session);

    let login = catalog.require("login").unwrap();
    assert_eq!(ctx.config().cache_hit_policy, CacheHitPolicy::Verify);
    assert!(ctx.is_element(ElementState::Visible, login).unwrap());
}
