//! The player sprite and its horizontal play area.

use crate::entity::{Entity, EntityKind};
use crate::walk::{Facing, WalkAnimation};

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Entity,
    pub facing: Facing,
    pub walk: WalkAnimation,
    boundary_left: f32,
    boundary_right: f32,
}

impl Player {
    /// `boundary_left` must lie strictly left of `boundary_right`.
    pub fn new(
        body: Entity,
        walk: WalkAnimation,
        boundary_left: f32,
        boundary_right: f32,
    ) -> Result<Self, String> {
        if boundary_left >= boundary_right {
            return Err(format!(
                "Player boundaries are inverted: left {boundary_left} >= right {boundary_right}"
            ));
        }
        debug_assert_eq!(body.kind, EntityKind::Player);
        let mut body = body;
        body.texture = walk.texture().to_string();
        Ok(Self {
            body,
            facing: Facing::Right,
            walk,
            boundary_left,
            boundary_right,
        })
    }

    pub fn boundary_left(&self) -> f32 {
        self.boundary_left
    }

    pub fn boundary_right(&self) -> f32 {
        self.boundary_right
    }

    pub fn at_boundary(&self) -> bool {
        self.body.left() <= self.boundary_left || self.body.right() >= self.boundary_right
    }

    /// Shove the player back inside after touching a boundary. Returns true
    /// if a boundary was hit. Velocity is left alone.
    pub fn clamp_to_boundaries(&mut self, push_back: f32) -> bool {
        if self.body.left() <= self.boundary_left {
            self.body.set_left(self.boundary_left + push_back);
            true
        } else if self.body.right() >= self.boundary_right {
            self.body.set_right(self.boundary_right - push_back);
            true
        } else {
            false
        }
    }

    pub fn update_animation(&mut self) {
        let body = &mut self.body;
        let texture = self
            .walk
            .update(body.center_x, body.change_x, body.change_y, self.facing);
        if texture != body.texture {
            body.texture = texture.to_string();
        }
    }
}
