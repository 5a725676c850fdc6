//! Input tracking for the fixed-step loop.
//!
//! Window callbacks record transitions into an ordered event queue and keep
//! the set of keys currently held. The simulation drains the queue once per
//! step through `take_frame()`, so a press and release landing in the same
//! frame are both seen, in order. Events stay queued across frames that run
//! zero simulation steps.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Escape,
    Space,
    F3,
    W,
    A,
    D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseBtn {
    Left,
    Right,
    Middle,
}

/// A discrete input transition. Mouse coordinates are screen units with the
/// origin at the bottom-left corner (y grows upward, like world space).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    MouseDown { button: MouseBtn, x: f64, y: f64 },
    MouseUp(MouseBtn),
}

/// Input sampled once at the top of a simulation step.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub events: Vec<InputEvent>,
    pub held: HashSet<Key>,
}

impl FrameInput {
    pub fn any_held(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.held.contains(k))
    }
}

pub struct InputState {
    held: HashSet<Key>,
    mouse_held: HashSet<MouseBtn>,
    events: Vec<InputEvent>,

    pub mouse_position: (f64, f64),
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            mouse_held: HashSet::new(),
            events: Vec::new(),
            mouse_position: (0.0, 0.0),
        }
    }

    /// Repeats of a key that is already down are dropped.
    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.events.push(InputEvent::KeyDown(key));
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.events.push(InputEvent::KeyUp(key));
        }
    }

    /// Press a mouse button at the last reported `mouse_position`.
    pub fn mouse_down(&mut self, btn: MouseBtn) {
        if self.mouse_held.insert(btn) {
            let (x, y) = self.mouse_position;
            self.events.push(InputEvent::MouseDown { button: btn, x, y });
        }
    }

    pub fn mouse_up(&mut self, btn: MouseBtn) {
        if self.mouse_held.remove(&btn) {
            self.events.push(InputEvent::MouseUp(btn));
        }
    }

    /// Drain queued events and copy the held set for one simulation step.
    pub fn take_frame(&mut self) -> FrameInput {
        FrameInput {
            events: std::mem::take(&mut self.events),
            held: self.held.clone(),
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
