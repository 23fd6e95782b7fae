//! Low-level input action sequences.
//!
//! Builds W3C `POST /session/{id}/actions` payloads for gestures that have
//! no single native command: double click, context click, drag-and-drop,
//! touch-and-hold, and typing through the keyboard device.

use crate::driver::ElementHandle;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pointer device type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    /// Mouse pointer
    Mouse,
    /// Touch contact
    Touch,
}

/// Pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    /// Primary button
    Left,
    /// Secondary (context) button
    Right,
}

impl MouseButton {
    const fn code(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Right => 2,
        }
    }
}

/// Where a pointer move is measured from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Center of an element
    Element(ElementHandle),
    /// Top-left of the viewport
    Viewport,
}

/// One step of a pointer input source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerStep {
    /// Move the pointer
    Move {
        /// Reference point
        origin: Origin,
        /// Horizontal offset
        x: i64,
        /// Vertical offset
        y: i64,
    },
    /// Press a button
    Down(MouseButton),
    /// Release a button
    Up(MouseButton),
    /// Hold still
    Pause(Duration),
}

/// One step of a key input source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyStep {
    /// Press a key
    Down(char),
    /// Release a key
    Up(char),
}

/// A sequence of pointer and key steps performed together.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionSequence {
    pointer_kind: Option<PointerKind>,
    pointer: Vec<PointerStep>,
    keys: Vec<KeyStep>,
}

impl ActionSequence {
    /// Empty mouse sequence
    #[must_use]
    pub fn mouse() -> Self {
        Self {
            pointer_kind: Some(PointerKind::Mouse),
            ..Self::default()
        }
    }

    /// Empty touch sequence
    #[must_use]
    pub fn touch() -> Self {
        Self {
            pointer_kind: Some(PointerKind::Touch),
            ..Self::default()
        }
    }

    /// Move to the center of `element`
    #[must_use]
    pub fn move_to(mut self, element: &ElementHandle) -> Self {
        self.pointer.push(PointerStep::Move {
            origin: Origin::Element(element.clone()),
            x: 0,
            y: 0,
        });
        self
    }

    /// Move to a viewport point
    #[must_use]
    pub fn move_to_point(mut self, x: i64, y: i64) -> Self {
        self.pointer.push(PointerStep::Move {
            origin: Origin::Viewport,
            x,
            y,
        });
        self
    }

    /// Press `button`
    #[must_use]
    pub fn down(mut self, button: MouseButton) -> Self {
        self.pointer.push(PointerStep::Down(button));
        self
    }

    /// Release `button`
    #[must_use]
    pub fn up(mut self, button: MouseButton) -> Self {
        self.pointer.push(PointerStep::Up(button));
        self
    }

    /// Pause the pointer
    #[must_use]
    pub fn pause(mut self, duration: Duration) -> Self {
        self.pointer.push(PointerStep::Pause(duration));
        self
    }

    /// Type `text` on the keyboard device
    #[must_use]
    pub fn type_text(mut self, text: &str) -> Self {
        for c in text.chars() {
            self.keys.push(KeyStep::Down(c));
            self.keys.push(KeyStep::Up(c));
        }
        self
    }

    /// Left click on `element`
    #[must_use]
    pub fn click(element: &ElementHandle) -> Self {
        Self::mouse()
            .move_to(element)
            .down(MouseButton::Left)
            .up(MouseButton::Left)
    }

    /// Double click on `element`
    #[must_use]
    pub fn double_click(element: &ElementHandle) -> Self {
        Self::click(element)
            .down(MouseButton::Left)
            .up(MouseButton::Left)
    }

    /// Right click on `element`
    #[must_use]
    pub fn context_click(element: &ElementHandle) -> Self {
        Self::mouse()
            .move_to(element)
            .down(MouseButton::Right)
            .up(MouseButton::Right)
    }

    /// Press on `source`, move to `target`, release
    #[must_use]
    pub fn drag_and_drop(source: &ElementHandle, target: &ElementHandle) -> Self {
        Self::mouse()
            .move_to(source)
            .down(MouseButton::Left)
            .move_to(target)
            .up(MouseButton::Left)
    }

    /// Touch a viewport point and hold for `duration`
    #[must_use]
    pub fn touch_and_hold(x: i64, y: i64, duration: Duration) -> Self {
        Self::touch()
            .move_to_point(x, y)
            .down(MouseButton::Left)
            .pause(duration)
            .up(MouseButton::Left)
    }

    /// Click `element` then type `text`
    #[must_use]
    pub fn send_keys(element: &ElementHandle, text: &str) -> Self {
        Self::click(element).type_text(text)
    }

    /// Pointer steps
    #[must_use]
    pub fn pointer_steps(&self) -> &[PointerStep] {
        &self.pointer
    }

    /// Key steps
    #[must_use]
    pub fn key_steps(&self) -> &[KeyStep] {
        &self.keys
    }

    /// Check if nothing would be performed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pointer.is_empty() && self.keys.is_empty()
    }

    /// W3C actions payload
    #[must_use]
    pub fn to_w3c(&self) -> serde_json::Value {
        let mut sources = Vec::new();
        if !self.pointer.is_empty() {
            let kind = self.pointer_kind.unwrap_or(PointerKind::Mouse);
            let actions: Vec<_> = self.pointer.iter().map(pointer_step_json).collect();
            sources.push(serde_json::json!({
                "type": "pointer",
                "id": match kind {
                    PointerKind::Mouse => "mouse",
                    PointerKind::Touch => "finger",
                },
                "parameters": { "pointerType": kind },
                "actions": actions,
            }));
        }
        if !self.keys.is_empty() {
            let actions: Vec<_> = self
                .keys
                .iter()
                .map(|step| match step {
                    KeyStep::Down(c) => serde_json::json!({ "type": "keyDown", "value": c.to_string() }),
                    KeyStep::Up(c) => serde_json::json!({ "type": "keyUp", "value": c.to_string() }),
                })
                .collect();
            sources.push(serde_json::json!({
                "type": "key",
                "id": "keyboard",
                "actions": actions,
            }));
        }
        serde_json::json!({ "actions": sources })
    }
}

fn pointer_step_json(step: &PointerStep) -> serde_json::Value {
    match step {
        PointerStep::Move { origin, x, y } => {
            let origin = match origin {
                Origin::Element(handle) => handle.to_w3c(),
                Origin::Viewport => serde_json::Value::from("viewport"),
            };
            serde_json::json!({ "type": "pointerMove", "duration": 0, "origin": origin, "x": x, "y": y })
        }
        PointerStep::Down(button) => {
            serde_json::json!({ "type": "pointerDown", "button": button.code() })
        }
        PointerStep::Up(button) => serde_json::json!({ "type": "pointerUp", "button": button.code() }),
        PointerStep::Pause(duration) => {
            serde_json::json!({ "type": "pause", "duration": duration.as_millis() as u64 })
        }
    }
}
