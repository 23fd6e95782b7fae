//! Scripted in-memory session for tests.
//!
//! [`MockSession`] implements [`Session`] over a table of [`MockElement`]s
//! keyed by selector value. Elements can appear or vanish on a schedule,
//! be re-rendered (old handles go stale), be hidden or disabled, or have
//! faults injected. Every command is recorded so tests can assert on what
//! the engine actually asked the session to do.

use crate::actions::ActionSequence;
use crate::driver::{ElementHandle, Rect, ScriptArg, Session, SessionTimeouts};
use crate::locator::{Platform, Selector};
use crate::result::{ElementFault, FaultKind};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// An element the mock session can render
#[derive(Debug, Clone, PartialEq)]
pub struct MockElement {
    selector: String,
    displayed: bool,
    enabled: bool,
    text: String,
    rect: Rect,
    appear_after: Duration,
    vanish_after: Option<Duration>,
}

impl MockElement {
    /// A displayed, enabled element matched by `selector` value
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            displayed: true,
            enabled: true,
            text: String::new(),
            rect: Rect::new(0.0, 0.0, 100.0, 40.0),
            appear_after: Duration::ZERO,
            vanish_after: None,
        }
    }

    /// Not displayed
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Not enabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Visible text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Bounding rectangle
    #[must_use]
    pub const fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Render only once `delay` has passed since the session started
    #[must_use]
    pub const fn appear_after(mut self, delay: Duration) -> Self {
        self.appear_after = delay;
        self
    }

    /// Leave the tree once `delay` has passed since the session started
    #[must_use]
    pub const fn vanish_after(mut self, delay: Duration) -> Self {
        self.vanish_after = Some(delay);
        self
    }
}

#[derive(Debug)]
struct Entry {
    element: MockElement,
    live_id: Option<String>,
    removed: bool,
}

impl Entry {
    fn rendered(&self, elapsed: Duration) -> bool {
        !self.removed
            && elapsed >= self.element.appear_after
            && self.element.vanish_after.map_or(true, |at| elapsed < at)
    }
}

#[derive(Debug, Default)]
struct FaultPlan {
    once: VecDeque<FaultKind>,
    always: Option<FaultKind>,
}

impl FaultPlan {
    fn take(&mut self) -> Option<FaultKind> {
        self.once.pop_front().or(self.always)
    }
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<String, Entry>,
    live: HashMap<String, String>,
    faults: HashMap<String, FaultPlan>,
    history: Vec<String>,
    finds: HashMap<String, usize>,
    find_alls: HashMap<String, usize>,
    typed: HashMap<String, String>,
    actions: Vec<ActionSequence>,
    scripts: Vec<(String, Vec<serde_json::Value>)>,
    script_results: VecDeque<serde_json::Value>,
    current_url: Option<String>,
    timeouts: Option<SessionTimeouts>,
}

impl MockState {
    fn injected(&mut self, selector: &str) -> Result<(), ElementFault> {
        match self.faults.get_mut(selector).and_then(FaultPlan::take) {
            Some(kind) => Err(ElementFault::new(kind, format!("injected fault for '{selector}'"))),
            None => Ok(()),
        }
    }

    fn element(&mut self, handle: &ElementHandle, elapsed: Duration) -> Result<&MockElement, ElementFault> {
        let stale = || ElementFault::stale(format!("element {} is no longer attached", handle.id()));
        let selector = self.live.get(handle.id()).cloned().ok_or_else(stale)?;
        self.injected(&selector)?;
        let rendered = self
            .entries
            .get(&selector)
            .is_some_and(|entry| entry.rendered(elapsed));
        if !rendered {
            self.live.remove(handle.id());
            if let Some(entry) = self.entries.get_mut(&selector) {
                entry.live_id = None;
            }
            return Err(stale());
        }
        self.entries
            .get(&selector)
            .map(|entry| &entry.element)
            .ok_or_else(stale)
    }
}

/// In-memory [`Session`] with scripted elements and call recording
#[derive(Debug)]
pub struct MockSession {
    platform: Platform,
    started: Instant,
    state: Mutex<MockState>,
}

impl MockSession {
    /// Create a session for `platform` with an empty tree
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            started: Instant::now(),
            state: Mutex::new(MockState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: impl Into<String>) -> MutexGuard<'_, MockState> {
        let mut state = self.state();
        state.history.push(call.into());
        state
    }

    /// Add (or replace) an element
    pub fn insert(&self, element: MockElement) {
        let mut state = self.state();
        let selector = element.selector.clone();
        if let Some(old) = state.entries.remove(&selector) {
            if let Some(id) = old.live_id {
                state.live.remove(&id);
            }
        }
        state.entries.insert(
            selector,
            Entry {
                element,
                live_id: None,
                removed: false,
            },
        );
    }

    /// Remove the element from the tree; its handles go stale
    pub fn remove(&self, selector: &str) {
        let mut state = self.state();
        let id = state.entries.get_mut(selector).and_then(|entry| {
            entry.removed = true;
            entry.live_id.take()
        });
        if let Some(id) = id {
            state.live.remove(&id);
        }
    }

    /// Re-render the element: old handles go stale, the next find returns a
    /// new one
    pub fn make_stale(&self, selector: &str) {
        let mut state = self.state();
        let id = state
            .entries
            .get_mut(selector)
            .and_then(|entry| entry.live_id.take());
        if let Some(id) = id {
            state.live.remove(&id);
        }
    }

    /// Toggle the enabled flag
    pub fn set_enabled(&self, selector: &str, enabled: bool) {
        if let Some(entry) = self.state().entries.get_mut(selector) {
            entry.element.enabled = enabled;
        }
    }

    /// Toggle the displayed flag
    pub fn set_displayed(&self, selector: &str, displayed: bool) {
        if let Some(entry) = self.state().entries.get_mut(selector) {
            entry.element.displayed = displayed;
        }
    }

    /// Fail the next command touching `selector` with `kind`
    pub fn fail_next(&self, selector: &str, kind: FaultKind) {
        self.state()
            .faults
            .entry(selector.to_string())
            .or_default()
            .once
            .push_back(kind);
    }

    /// Fail every command touching `selector` with `kind`
    pub fn fail_always(&self, selector: &str, kind: FaultKind) {
        self.state()
            .faults
            .entry(selector.to_string())
            .or_default()
            .always = Some(kind);
    }

    /// Queue a value for the next `execute_script`
    pub fn push_script_result(&self, value: serde_json::Value) {
        self.state().script_results.push_back(value);
    }

    /// Number of `find` calls for `selector`
    #[must_use]
    pub fn find_count(&self, selector: &str) -> usize {
        self.state().finds.get(selector).copied().unwrap_or(0)
    }

    /// Number of `find_all` calls for `selector`
    #[must_use]
    pub fn find_all_count(&self, selector: &str) -> usize {
        self.state().find_alls.get(selector).copied().unwrap_or(0)
    }

    /// Text typed into `selector` since its last clear
    #[must_use]
    pub fn typed_text(&self, selector: &str) -> String {
        self.state().typed.get(selector).cloned().unwrap_or_default()
    }

    /// Action sequences performed so far
    #[must_use]
    pub fn performed_actions(&self) -> Vec<ActionSequence> {
        self.state().actions.clone()
    }

    /// Scripts executed so far, with JSON arguments
    #[must_use]
    pub fn executed_scripts(&self) -> Vec<(String, Vec<serde_json::Value>)> {
        self.state().scripts.clone()
    }

    /// Last URL navigated to
    #[must_use]
    pub fn current_url(&self) -> Option<String> {
        self.state().current_url.clone()
    }

    /// Last timeouts applied
    #[must_use]
    pub fn timeouts(&self) -> Option<SessionTimeouts> {
        self.state().timeouts
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Number of recorded calls
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state().history.len()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state().history.iter().any(|c| c.starts_with(method))
    }

    fn with_element<T>(
        &self,
        call: &str,
        handle: &ElementHandle,
        f: impl FnOnce(&MockElement) -> Result<T, ElementFault>,
    ) -> Result<T, ElementFault> {
        let elapsed = self.started.elapsed();
        let mut state = self.record(format!("{call}:{}", handle.id()));
        let element = state.element(handle, elapsed)?;
        f(element)
    }
}

impl Session for MockSession {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn find(&self, selector: &Selector) -> Result<ElementHandle, ElementFault> {
        let elapsed = self.started.elapsed();
        let mut state = self.record(format!("find:{}", selector.value));
        *state.finds.entry(selector.value.clone()).or_default() += 1;
        state.injected(&selector.value)?;

        let Some(entry) = state.entries.get_mut(&selector.value) else {
            return Err(ElementFault::not_found(format!("no element matches {selector}")));
        };
        if !entry.rendered(elapsed) {
            let dropped = entry.live_id.take();
            if let Some(id) = dropped {
                state.live.remove(&id);
            }
            return Err(ElementFault::not_found(format!("no element matches {selector}")));
        }
        let id = entry
            .live_id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone();
        state.live.insert(id.clone(), selector.value.clone());
        Ok(ElementHandle::new(id, self.platform))
    }

    fn find_all(&self, selector: &Selector) -> Result<Vec<ElementHandle>, ElementFault> {
        let elapsed = self.started.elapsed();
        let mut state = self.record(format!("find_all:{}", selector.value));
        *state.find_alls.entry(selector.value.clone()).or_default() += 1;
        let Some(entry) = state.entries.get_mut(&selector.value) else {
            return Ok(Vec::new());
        };
        if !entry.rendered(elapsed) {
            return Ok(Vec::new());
        }
        let id = entry
            .live_id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone();
        state.live.insert(id.clone(), selector.value.clone());
        Ok(vec![ElementHandle::new(id, self.platform)])
    }

    fn probe(&self, element: &ElementHandle) -> Result<(), ElementFault> {
        self.with_element("probe", element, |_| Ok(()))
    }

    fn is_displayed(&self, element: &ElementHandle) -> Result<bool, ElementFault> {
        self.with_element("is_displayed", element, |el| Ok(el.displayed))
    }

    fn is_enabled(&self, element: &ElementHandle) -> Result<bool, ElementFault> {
        self.with_element("is_enabled", element, |el| Ok(el.enabled))
    }

    fn rect(&self, element: &ElementHandle) -> Result<Rect, ElementFault> {
        self.with_element("rect", element, |el| Ok(el.rect))
    }

    fn text(&self, element: &ElementHandle) -> Result<String, ElementFault> {
        self.with_element("text", element, |el| Ok(el.text.clone()))
    }

    fn click(&self, element: &ElementHandle) -> Result<(), ElementFault> {
        self.with_element("click", element, |el| {
            if el.displayed {
                Ok(())
            } else {
                Err(ElementFault::not_interactable("element is not displayed"))
            }
        })
    }

    fn clear(&self, element: &ElementHandle) -> Result<(), ElementFault> {
        let selector = self.with_element("clear", element, |el| Ok(el.selector.clone()))?;
        self.state().typed.insert(selector, String::new());
        Ok(())
    }

    fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), ElementFault> {
        let selector = self.with_element("send_keys", element, |el| {
            if !el.displayed {
                return Err(ElementFault::not_interactable("element is not displayed"));
            }
            if !el.enabled {
                return Err(ElementFault::new(
                    FaultKind::InvalidInteractionState,
                    "element is disabled",
                ));
            }
            Ok(el.selector.clone())
        })?;
        self.state().typed.entry(selector).or_default().push_str(text);
        Ok(())
    }

    fn perform_actions(&self, actions: &ActionSequence) -> Result<(), ElementFault> {
        self.record("perform_actions").actions.push(actions.clone());
        Ok(())
    }

    fn execute_script(
        &self,
        script: &str,
        args: &[ScriptArg],
    ) -> Result<serde_json::Value, ElementFault> {
        let mut state = self.record(format!("execute_script:{script}"));
        state
            .scripts
            .push((script.to_string(), args.iter().map(ScriptArg::to_json).collect()));
        Ok(state
            .script_results
            .pop_front()
            .unwrap_or(serde_json::Value::Null))
    }

    fn navigate(&self, url: &str) -> Result<(), ElementFault> {
        self.record(format!("navigate:{url}")).current_url = Some(url.to_string());
        Ok(())
    }

    fn maximize_window(&self) -> Result<(), ElementFault> {
        self.record("maximize_window");
        Ok(())
    }

    fn set_timeouts(&self, timeouts: &SessionTimeouts) -> Result<(), ElementFault> {
        self.record("set_timeouts").timeouts = Some(*timeouts);
        Ok(())
    }

    fn quit(&self) -> Result<(), ElementFault> {
        self.record("quit");
        Ok(())
    }
}
