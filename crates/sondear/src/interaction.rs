//! User interactions.
//!
//! Every interaction runs the same two-phase protocol: verify the required
//! element state through the wait engine, then resolve the element and hand
//! it to an [`InteractionStrategy`]. A state that never materialises is
//! reported as [`SondearError::InteractionFailed`] with a state-specific
//! reason; the element is not touched.
//!
//! Three strategies are interchangeable:
//!
//! | Strategy            | Mechanism                         | Platforms |
//! |---------------------|-----------------------------------|-----------|
//! | [`NativeActions`]   | element commands                  | all       |
//! | [`ComposedActions`] | pointer/key action sequences      | all       |
//! | [`ScriptActions`]   | injected JavaScript, `mobile:` commands | Web; mobile touch-and-hold |

use crate::actions::ActionSequence;
use crate::context::TestContext;
use crate::driver::{ElementHandle, ScriptArg, Session};
use crate::locator::{Locator, Platform};
use crate::result::{SondearError, SondearResult};
use crate::state::ElementState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// ACTIONS
// =============================================================================

/// A user-level interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Type into an editable element
    EnterText,
    /// Primary click
    Click,
    /// Double click
    DoubleClick,
    /// Context click
    RightClick,
    /// Drag one element onto another
    DragAndDrop,
    /// Long press
    TouchAndHold,
    /// Read the element's text
    ReadText,
}

impl Action {
    /// State the element must reach before the action runs
    #[must_use]
    pub const fn required_state(self) -> ElementState {
        match self {
            Self::EnterText => ElementState::Enabled,
            Self::Click | Self::DoubleClick | Self::RightClick | Self::DragAndDrop => {
                ElementState::Clickable
            }
            Self::TouchAndHold | Self::ReadText => ElementState::Present,
        }
    }

    /// Human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnterText => "enter text",
            Self::Click => "click",
            Self::DoubleClick => "double click",
            Self::RightClick => "right click",
            Self::DragAndDrop => "drag and drop",
            Self::TouchAndHold => "touch and hold",
            Self::ReadText => "read text",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn unmet_reason(state: ElementState) -> &'static str {
    match state {
        ElementState::Enabled | ElementState::Clickable => "element is not interactable",
        ElementState::Present | ElementState::Visible => "element is not present",
        ElementState::Disabled => "element is not disabled",
        ElementState::NotPresent | ElementState::Invisible => "element is still displayed",
    }
}

// =============================================================================
// STRATEGIES
// =============================================================================

/// How an interaction is carried out once the element is resolved.
///
/// Every method defaults to [`SondearError::UnsupportedAction`]; a strategy
/// overrides the ones it can perform and reports them through
/// [`InteractionStrategy::supports`].
pub trait InteractionStrategy: Send + Sync + std::fmt::Debug {
    /// Strategy name used in errors and logs
    fn name(&self) -> &'static str;

    /// Whether `action` can run on `platform`
    fn supports(&self, action: Action, platform: Platform) -> bool;

    /// Type `text`, clearing the field first when `clear` is set
    fn enter_text(
        &self,
        session: &dyn Session,
        element: &ElementHandle,
        text: &str,
        clear: bool,
    ) -> SondearResult<()> {
        let _ = (session, text, clear);
        Err(self.unsupported(Action::EnterText, element.platform()))
    }

    /// Primary click
    fn click(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<()> {
        let _ = session;
        Err(self.unsupported(Action::Click, element.platform()))
    }

    /// Double click
    fn double_click(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<()> {
        let _ = session;
        Err(self.unsupported(Action::DoubleClick, element.platform()))
    }

    /// Context click
    fn right_click(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<()> {
        let _ = session;
        Err(self.unsupported(Action::RightClick, element.platform()))
    }

    /// Drag `source` onto `target`
    fn drag_and_drop(
        &self,
        session: &dyn Session,
        source: &ElementHandle,
        target: &ElementHandle,
    ) -> SondearResult<()> {
        let _ = (session, target);
        Err(self.unsupported(Action::DragAndDrop, source.platform()))
    }

    /// Press and hold for `duration`
    fn touch_and_hold(
        &self,
        session: &dyn Session,
        element: &ElementHandle,
        duration: Duration,
    ) -> SondearResult<()> {
        let _ = (session, duration);
        Err(self.unsupported(Action::TouchAndHold, element.platform()))
    }

    /// Read the element's text
    fn read_text(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<String> {
        let _ = session;
        Err(self.unsupported(Action::ReadText, element.platform()))
    }

    /// Error for an action this strategy cannot run
    fn unsupported(&self, action: Action, platform: Platform) -> SondearError {
        SondearError::UnsupportedAction {
            strategy: self.name(),
            action,
            platform,
        }
    }
}

impl<T: InteractionStrategy + ?Sized> InteractionStrategy for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn supports(&self, action: Action, platform: Platform) -> bool {
        (**self).supports(action, platform)
    }

    fn enter_text(
        &self,
        session: &dyn Session,
        element: &ElementHandle,
        text: &str,
        clear: bool,
    ) -> SondearResult<()> {
        (**self).enter_text(session, element, text, clear)
    }

    fn click(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<()> {
        (**self).click(session, element)
    }

    fn double_click(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<()> {
        (**self).double_click(session, element)
    }

    fn right_click(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<()> {
        (**self).right_click(session, element)
    }

    fn drag_and_drop(
        &self,
        session: &dyn Session,
        source: &ElementHandle,
        target: &ElementHandle,
    ) -> SondearResult<()> {
        (**self).drag_and_drop(session, source, target)
    }

    fn touch_and_hold(
        &self,
        session: &dyn Session,
        element: &ElementHandle,
        duration: Duration,
    ) -> SondearResult<()> {
        (**self).touch_and_hold(session, element, duration)
    }

    fn read_text(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<String> {
        (**self).read_text(session, element)
    }
}

/// Direct element commands
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeActions;

impl InteractionStrategy for NativeActions {
    fn name(&self) -> &'static str {
        "native"
    }

    fn supports(&self, action: Action, _platform: Platform) -> bool {
        matches!(action, Action::EnterText | Action::Click | Action::ReadText)
    }

    fn enter_text(
        &self,
        session: &dyn Session,
        element: &ElementHandle,
        text: &str,
        clear: bool,
    ) -> SondearResult<()> {
        if clear {
            session.clear(element)?;
        }
        session.send_keys(element, text)?;
        Ok(())
    }

    fn click(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<()> {
        Ok(session.click(element)?)
    }

    fn read_text(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<String> {
        Ok(session.text(element)?)
    }
}

/// Low-level pointer and key action sequences
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposedActions;

impl InteractionStrategy for ComposedActions {
    fn name(&self) -> &'static str {
        "composed"
    }

    fn supports(&self, _action: Action, _platform: Platform) -> bool {
        true
    }

    fn enter_text(
        &self,
        session: &dyn Session,
        element: &ElementHandle,
        text: &str,
        clear: bool,
    ) -> SondearResult<()> {
        if clear {
            session.clear(element)?;
        }
        session.perform_actions(&ActionSequence::send_keys(element, text))?;
        Ok(())
    }

    fn click(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<()> {
        Ok(session.perform_actions(&ActionSequence::click(element))?)
    }

    fn double_click(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<()> {
        Ok(session.perform_actions(&ActionSequence::double_click(element))?)
    }

    fn right_click(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<()> {
        Ok(session.perform_actions(&ActionSequence::context_click(element))?)
    }

    fn drag_and_drop(
        &self,
        session: &dyn Session,
        source: &ElementHandle,
        target: &ElementHandle,
    ) -> SondearResult<()> {
        Ok(session.perform_actions(&ActionSequence::drag_and_drop(source, target))?)
    }

    fn touch_and_hold(
        &self,
        session: &dyn Session,
        element: &ElementHandle,
        duration: Duration,
    ) -> SondearResult<()> {
        let (x, y) = session.rect(element)?.center();
        Ok(session.perform_actions(&ActionSequence::touch_and_hold(x, y, duration))?)
    }

    // Reading has no gesture form.
    fn read_text(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<String> {
        Ok(session.text(element)?)
    }
}

/// Injected JavaScript on Web, `mobile:` commands on Appium sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptActions;

impl ScriptActions {
    const SET_VALUE: &'static str = "arguments[0].value = arguments[1]; \
         arguments[0].dispatchEvent(new Event('input', { bubbles: true }));";
    const APPEND_VALUE: &'static str = "arguments[0].value += arguments[1]; \
         arguments[0].dispatchEvent(new Event('input', { bubbles: true }));";
    const CLICK: &'static str = "arguments[0].click();";
    const DOUBLE_CLICK: &'static str =
        "arguments[0].dispatchEvent(new MouseEvent('dblclick', { bubbles: true }));";
    const CONTEXT_MENU: &'static str =
        "arguments[0].dispatchEvent(new MouseEvent('contextmenu', { bubbles: true }));";
    const INNER_HTML: &'static str = "return arguments[0].innerHTML;";
    const TOUCH_AND_HOLD: &'static str = "mobile: touchAndHold";

    fn run(
        session: &dyn Session,
        script: &str,
        element: &ElementHandle,
        extra: Option<serde_json::Value>,
    ) -> SondearResult<serde_json::Value> {
        let mut args = vec![ScriptArg::Element(element.clone())];
        args.extend(extra.map(ScriptArg::Value));
        tracing::debug!(script, "executing interaction script");
        Ok(session.execute_script(script, &args)?)
    }
}

impl InteractionStrategy for ScriptActions {
    fn name(&self) -> &'static str {
        "script"
    }

    fn supports(&self, action: Action, platform: Platform) -> bool {
        match platform {
            Platform::Web => !matches!(action, Action::DragAndDrop | Action::TouchAndHold),
            Platform::Ios | Platform::Android => matches!(action, Action::TouchAndHold),
        }
    }

    fn enter_text(
        &self,
        session: &dyn Session,
        element: &ElementHandle,
        text: &str,
        clear: bool,
    ) -> SondearResult<()> {
        if !self.supports(Action::EnterText, element.platform()) {
            return Err(self.unsupported(Action::EnterText, element.platform()));
        }
        let script = if clear {
            Self::SET_VALUE
        } else {
            Self::APPEND_VALUE
        };
        Self::run(session, script, element, Some(text.into()))?;
        Ok(())
    }

    fn click(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<()> {
        if !self.supports(Action::Click, element.platform()) {
            return Err(self.unsupported(Action::Click, element.platform()));
        }
        Self::run(session, Self::CLICK, element, None)?;
        Ok(())
    }

    fn double_click(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<()> {
        if !self.supports(Action::DoubleClick, element.platform()) {
            return Err(self.unsupported(Action::DoubleClick, element.platform()));
        }
        Self::run(session, Self::DOUBLE_CLICK, element, None)?;
        Ok(())
    }

    fn right_click(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<()> {
        if !self.supports(Action::RightClick, element.platform()) {
            return Err(self.unsupported(Action::RightClick, element.platform()));
        }
        Self::run(session, Self::CONTEXT_MENU, element, None)?;
        Ok(())
    }

    fn touch_and_hold(
        &self,
        session: &dyn Session,
        element: &ElementHandle,
        duration: Duration,
    ) -> SondearResult<()> {
        if !self.supports(Action::TouchAndHold, element.platform()) {
            return Err(self.unsupported(Action::TouchAndHold, element.platform()));
        }
        let params = serde_json::json!({
            "elementId": element.id(),
            "duration": duration.as_secs_f64(),
        });
        session.execute_script(Self::TOUCH_AND_HOLD, &[ScriptArg::Value(params)])?;
        Ok(())
    }

    fn read_text(&self, session: &dyn Session, element: &ElementHandle) -> SondearResult<String> {
        if !self.supports(Action::ReadText, element.platform()) {
            return Err(self.unsupported(Action::ReadText, element.platform()));
        }
        match Self::run(session, Self::INNER_HTML, element, None)? {
            serde_json::Value::String(text) => Ok(text),
            serde_json::Value::Null => Ok(String::new()),
            other => Ok(other.to_string()),
        }
    }
}

// =============================================================================
// INTERACTIONS
// =============================================================================

/// Interactions bound to a context and a strategy
#[derive(Debug)]
pub struct Interactions<'a, S: InteractionStrategy> {
    ctx: &'a TestContext,
    strategy: S,
}

impl<'a, S: InteractionStrategy> Interactions<'a, S> {
    /// Bind `strategy` to `ctx`
    #[must_use]
    pub fn new(ctx: &'a TestContext, strategy: S) -> Self {
        Self { ctx, strategy }
    }

    /// Strategy in use
    #[must_use]
    pub const fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Type `text` into the element, optionally clearing it first
    pub fn enter_text(&self, locator: &Locator, text: &str, clear: bool) -> SondearResult<()> {
        let (session, element) = self.prepare(Action::EnterText, locator)?;
        self.strategy
            .enter_text(session.as_ref(), &element, text, clear)?;
        tracing::info!(locator = locator.name(), "entered text");
        Ok(())
    }

    /// Click the element
    pub fn click(&self, locator: &Locator) -> SondearResult<()> {
        let (session, element) = self.prepare(Action::Click, locator)?;
        self.strategy.click(session.as_ref(), &element)?;
        tracing::info!(locator = locator.name(), "clicked");
        Ok(())
    }

    /// Double click the element
    pub fn double_click(&self, locator: &Locator) -> SondearResult<()> {
        let (session, element) = self.prepare(Action::DoubleClick, locator)?;
        self.strategy.double_click(session.as_ref(), &element)?;
        tracing::info!(locator = locator.name(), "double clicked");
        Ok(())
    }

    /// Right click the element
    pub fn right_click(&self, locator: &Locator) -> SondearResult<()> {
        let (session, element) = self.prepare(Action::RightClick, locator)?;
        self.strategy.right_click(session.as_ref(), &element)?;
        tracing::info!(locator = locator.name(), "right clicked");
        Ok(())
    }

    /// Drag `source` onto `target`; both must be clickable
    ///
    /// Both locators must live on the same platform.
    pub fn drag_and_drop(&self, source: &Locator, target: &Locator) -> SondearResult<()> {
        if source.platform() != target.platform() {
            return Err(SondearError::interaction(
                Action::DragAndDrop,
                source.name(),
                format!(
                    "target '{}' is on {}, source is on {}",
                    target.name(),
                    target.platform(),
                    source.platform()
                ),
            ));
        }
        let (session, from) = self.prepare(Action::DragAndDrop, source)?;
        let (_, to) = self.prepare(Action::DragAndDrop, target)?;
        self.strategy.drag_and_drop(session.as_ref(), &from, &to)?;
        tracing::info!(
            source = source.name(),
            target = target.name(),
            "dragged and dropped"
        );
        Ok(())
    }

    /// Press and hold the element for `duration`
    pub fn touch_and_hold(&self, locator: &Locator, duration: Duration) -> SondearResult<()> {
        let (session, element) = self.prepare(Action::TouchAndHold, locator)?;
        self.strategy
            .touch_and_hold(session.as_ref(), &element, duration)?;
        tracing::info!(locator = locator.name(), ?duration, "touched and held");
        Ok(())
    }

    /// Read the element's text
    pub fn read_text(&self, locator: &Locator) -> SondearResult<String> {
        let (session, element) = self.prepare(Action::ReadText, locator)?;
        let text = self.strategy.read_text(session.as_ref(), &element)?;
        tracing::debug!(locator = locator.name(), len = text.len(), "read text");
        Ok(text)
    }

    fn prepare(
        &self,
        action: Action,
        locator: &Locator,
    ) -> SondearResult<(Arc<dyn Session>, ElementHandle)> {
        let platform = locator.platform();
        if !self.strategy.supports(action, platform) {
            return Err(self.strategy.unsupported(action, platform));
        }

        let state = action.required_state();
        if !self.ctx.is_element(state, locator)? {
            tracing::warn!(locator = locator.name(), %action, %state, "required state not reached");
            return Err(SondearError::interaction(
                action,
                locator.name(),
                unmet_reason(state),
            ));
        }

        let element = self.ctx.resolve(locator, state).map_err(|err| {
            if err.is_unresolved() {
                SondearError::interaction(
                    action,
                    locator.name(),
                    format!("element could not be resolved: {err}"),
                )
            } else {
                err
            }
        })?;
        let session = self.ctx.session(platform)?;
        Ok((session, element))
    }
}
