//! Deadzone camera.
//!
//! The camera stays still while the player is inside the margin box and is
//! dragged along once the player crosses one of its four edges. Each edge has
//! its own margin. The published origin is always whole pixels.

use crate::collision::Aabb;
use crate::config::{ScreenConfig, ViewportConfig};

/// Bottom-left corner of the visible area in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub left: i32,
    pub bottom: i32,
}

impl Viewport {
    /// Map window coordinates (y-up) to world coordinates.
    pub fn to_world(&self, x: f32, y: f32) -> (f32, f32) {
        (x + self.left as f32, y + self.bottom as f32)
    }

    pub fn visible_rect(&self, width: f32, height: f32) -> VisibleRect {
        VisibleRect {
            left: self.left as f32,
            right: self.left as f32 + width,
            bottom: self.bottom as f32,
            top: self.bottom as f32 + height,
        }
    }
}

/// World rectangle handed to the renderer after a scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRect {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    margins: ViewportConfig,
    screen_w: f32,
    screen_h: f32,
    /// Map size in pixels, if the origin should stay inside it.
    world: Option<(f32, f32)>,
}

impl ViewportController {
    pub fn new(margins: &ViewportConfig, screen: &ScreenConfig, world: Option<(f32, f32)>) -> Self {
        Self {
            margins: *margins,
            screen_w: screen.width as f32,
            screen_h: screen.height as f32,
            world: if margins.clamp_to_map { world } else { None },
        }
    }

    pub fn screen_size(&self) -> (f32, f32) {
        (self.screen_w, self.screen_h)
    }

    /// Follow `player`. Returns the new visible rectangle when the origin moved.
    pub fn update(&self, view: &mut Viewport, player: &Aabb) -> Option<VisibleRect> {
        let m = &self.margins;
        let mut left = view.left as f32;
        let mut bottom = view.bottom as f32;
        let mut changed = false;

        let left_edge = left + m.margin_left;
        if player.left() < left_edge {
            left -= left_edge - player.left();
            changed = true;
        }

        let right_edge = left + self.screen_w - m.margin_right;
        if player.right() > right_edge {
            left += player.right() - right_edge;
            changed = true;
        }

        let top_edge = bottom + self.screen_h - m.margin_top;
        if player.top() > top_edge {
            bottom += player.top() - top_edge;
            changed = true;
        }

        let bottom_edge = bottom + m.margin_bottom;
        if player.bottom() < bottom_edge {
            bottom -= bottom_edge - player.bottom();
            changed = true;
        }

        if !changed {
            return None;
        }

        if let Some((world_w, world_h)) = self.world {
            left = left.min(world_w - self.screen_w).max(0.0);
            bottom = bottom.min(world_h - self.screen_h).max(0.0);
        }

        let moved = Viewport {
            left: left as i32,
            bottom: bottom as i32,
        };
        if moved == *view {
            return None;
        }
        *view = moved;
        Some(view.visible_rect(self.screen_w, self.screen_h))
    }
}
