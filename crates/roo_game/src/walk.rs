//! Distance-driven walking animation for the player.
//!
//! Unlike the time-based clips in `roo_core::animation`, walk frames advance
//! once the sprite has travelled `change_distance` horizontally, or right
//! away when it turns around. A sprite at rest shows the first frame of the
//! stand clip for its facing.

use std::sync::Arc;

use roo_core::animation::AnimationSet;

pub const STAND_LEFT: &str = "stand_left";
pub const STAND_RIGHT: &str = "stand_right";
pub const WALK_LEFT: &str = "walk_left";
pub const WALK_RIGHT: &str = "walk_right";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct WalkAnimation {
    set: Arc<AnimationSet>,
    change_distance: f32,
    last_change_x: f32,
    shown_facing: Facing,
    frame_index: usize,
    texture: String,
}

impl WalkAnimation {
    /// Fails unless the set has all four stand/walk clips.
    pub fn from_set(set: Arc<AnimationSet>, change_distance: f32) -> Result<Self, String> {
        for name in [STAND_LEFT, STAND_RIGHT, WALK_LEFT, WALK_RIGHT] {
            set.require(name)?;
        }
        let texture = set.require(STAND_RIGHT)?.texture_at(0).to_string();
        Ok(Self {
            set,
            change_distance,
            last_change_x: 0.0,
            shown_facing: Facing::Right,
            frame_index: 0,
            texture,
        })
    }

    pub fn texture(&self) -> &str {
        &self.texture
    }

    /// Pick the texture for this frame. `facing` is the direction the player
    /// last asked to move in.
    pub fn update(&mut self, center_x: f32, change_x: f32, change_y: f32, facing: Facing) -> &str {
        let turned = change_y == 0.0 && change_x != 0.0 && facing != self.shown_facing;
        if turned {
            self.shown_facing = facing;
        }

        if change_x == 0.0 && change_y == 0.0 {
            let stand = match self.shown_facing {
                Facing::Left => STAND_LEFT,
                Facing::Right => STAND_RIGHT,
            };
            if let Some(clip) = self.set.clip(stand) {
                self.texture = clip.texture_at(0).to_string();
            }
        } else if turned || (center_x - self.last_change_x).abs() >= self.change_distance {
            self.last_change_x = center_x;
            let walk = match self.shown_facing {
                Facing::Left => WALK_LEFT,
                Facing::Right => WALK_RIGHT,
            };
            if let Some(clip) = self.set.clip(walk) {
                self.frame_index += 1;
                if self.frame_index >= clip.frames.len() {
                    self.frame_index = 0;
                }
                self.texture = clip.texture_at(self.frame_index).to_string();
            }
        }
        &self.texture
    }
}
