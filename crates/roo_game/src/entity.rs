//! Sprites and sprite lists.
//!
//! Every actor in the game is an `Entity`: a centre, half extents, a velocity,
//! an optional spin, a texture key and an `alive` flag. Killing an entity only
//! clears the flag; `EntityList::sweep_dead` removes it at the end of the frame.

use std::sync::Arc;

use roo_core::animation::{AnimationSet, AnimationState};

use crate::collision::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Background,
    Wall,
    Platform,
    Npc,
    Coin,
    Ice,
    Laser,
    Player,
}

impl EntityKind {
    /// Tile-map layer a kind is read from, if any.
    pub fn layer_name(self) -> Option<&'static str> {
        match self {
            Self::Background => Some("Background"),
            Self::Wall => Some("Walls"),
            Self::Platform => Some("Platforms"),
            Self::Npc => Some("NPC"),
            Self::Coin => Some("Coins"),
            Self::Ice => Some("Ice"),
            Self::Laser | Self::Player => None,
        }
    }
}

/// A frame animation bound to one entity.
#[derive(Debug, Clone)]
pub struct EntityAnimation {
    set: Arc<AnimationSet>,
    state: AnimationState,
}

impl EntityAnimation {
    pub fn new(set: Arc<AnimationSet>, clip_name: &str) -> Self {
        Self {
            set,
            state: AnimationState::new(clip_name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub kind: EntityKind,
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
    pub change_x: f32,
    pub change_y: f32,
    /// Degrees, counter-clockwise.
    pub angle: f32,
    pub change_angle: f32,
    pub texture: String,
    pub animation: Option<EntityAnimation>,
    alive: bool,
}

impl Entity {
    pub fn new(
        kind: EntityKind,
        center_x: f32,
        center_y: f32,
        half_w: f32,
        half_h: f32,
        texture: &str,
    ) -> Self {
        Self {
            kind,
            center_x,
            center_y,
            half_w,
            half_h,
            change_x: 0.0,
            change_y: 0.0,
            angle: 0.0,
            change_angle: 0.0,
            texture: texture.to_string(),
            animation: None,
            alive: true,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb {
            center_x: self.center_x,
            center_y: self.center_y,
            half_w: self.half_w,
            half_h: self.half_h,
        }
    }

    pub fn left(&self) -> f32 {
        self.center_x - self.half_w
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.half_w
    }

    pub fn bottom(&self) -> f32 {
        self.center_y - self.half_h
    }

    pub fn top(&self) -> f32 {
        self.center_y + self.half_h
    }

    pub fn set_left(&mut self, left: f32) {
        self.center_x = left + self.half_w;
    }

    pub fn set_right(&mut self, right: f32) {
        self.center_x = right - self.half_w;
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.center_y = bottom + self.half_h;
    }

    pub fn set_top(&mut self, top: f32) {
        self.center_y = top - self.half_h;
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Move by the current velocity and apply spin.
    pub fn advance(&mut self) {
        self.center_x += self.change_x;
        self.center_y += self.change_y;
        self.angle += self.change_angle;
    }

    pub fn tick_animation(&mut self, dt_us: u64) {
        let Some(anim) = self.animation.as_mut() else {
            return;
        };
        match anim.set.clip(&anim.state.clip_name) {
            Some(clip) => {
                let texture = anim.state.tick(dt_us, clip);
                if texture != self.texture {
                    self.texture = texture.to_string();
                }
            }
            None => log::warn!(
                "{:?} references unknown animation clip '{}' in set '{}'",
                self.kind,
                anim.state.clip_name,
                anim.set.set_id
            ),
        }
    }
}

/// Ordered sprites of one kind.
#[derive(Debug, Clone)]
pub struct EntityList {
    kind: EntityKind,
    entities: Vec<Entity>,
}

impl EntityList {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            entities: Vec::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn push(&mut self, entity: Entity) {
        debug_assert_eq!(entity.kind, self.kind, "entity pushed into wrong list");
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.entities.iter().filter(|e| e.is_alive()).count()
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entity> {
        self.entities.iter_mut()
    }

    /// Mark the entity at `index` dead. Returns false if it already was.
    pub fn kill(&mut self, index: usize) -> bool {
        match self.entities.get_mut(index) {
            Some(e) if e.is_alive() => {
                e.kill();
                true
            }
            _ => false,
        }
    }

    /// Drop dead entities, keeping the order of the survivors.
    pub fn sweep_dead(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(Entity::is_alive);
        before - self.entities.len()
    }
}
