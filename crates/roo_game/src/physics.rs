//! Gravity, platform contact and jump gating for the player.
//!
//! One call to `update` is one fixed step. Vertical motion is integrated and
//! resolved against the platform list first, then horizontal motion is applied
//! without any platform collision. The grounded flag is recomputed at the end
//! of every step with a 1-unit downward probe.

use crate::collision::collide_with_list;
use crate::config::PhysicsConfig;
use crate::entity::{Entity, EntityList};

/// Tolerance for deciding which side of a platform the player came from.
const CONTACT_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone)]
pub struct PlatformerPhysics {
    gravity: f32,
    max_fall_speed: Option<f32>,
    grounded: bool,
}

impl PlatformerPhysics {
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            gravity: config.gravity,
            max_fall_speed: config.max_fall_speed,
            grounded: false,
        }
    }

    pub fn can_jump(&self) -> bool {
        self.grounded
    }

    /// Launch upward if standing on a platform. The flag stays clear until
    /// the next landing.
    pub fn jump(&mut self, body: &mut Entity, speed: f32) -> bool {
        if !self.grounded {
            return false;
        }
        body.change_y = speed;
        self.grounded = false;
        true
    }

    /// Recompute the grounded flag without moving anything.
    pub fn settle(&mut self, body: &Entity, platforms: &EntityList) {
        self.grounded = Self::supported(body, platforms);
    }

    pub fn update(&mut self, body: &mut Entity, platforms: &EntityList) {
        body.change_y -= self.gravity;
        if let Some(max) = self.max_fall_speed {
            body.change_y = body.change_y.max(-max);
        }

        let prev_bottom = body.bottom();
        let prev_top = body.top();
        body.center_y += body.change_y;

        let hits = collide_with_list(&body.aabb(), platforms);
        if body.change_y < 0.0 {
            let landing = hits
                .iter()
                .filter_map(|&i| platforms.get(i))
                .map(Entity::top)
                .filter(|top| *top <= prev_bottom + CONTACT_EPSILON)
                .fold(None, |best: Option<f32>, top| Some(best.map_or(top, |b| b.max(top))));
            if let Some(top) = landing {
                body.set_bottom(top);
                body.change_y = 0.0;
            }
        } else if body.change_y > 0.0 {
            let ceiling = hits
                .iter()
                .filter_map(|&i| platforms.get(i))
                .map(Entity::bottom)
                .filter(|bottom| *bottom >= prev_top - CONTACT_EPSILON)
                .fold(None, |best: Option<f32>, b| Some(best.map_or(b, |x| x.min(b))));
            if let Some(bottom) = ceiling {
                body.set_top(bottom);
                body.change_y = 0.0;
            }
        }

        body.center_x += body.change_x;

        self.grounded = body.change_y <= 0.0 && Self::supported(body, platforms);
    }

    fn supported(body: &Entity, platforms: &EntityList) -> bool {
        !collide_with_list(&body.aabb().translated(0.0, -1.0), platforms).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    fn floor(tiles: usize) -> EntityList {
        let mut list = EntityList::new(EntityKind::Platform);
        for i in 0..tiles {
            list.push(Entity::new(
                EntityKind::Platform,
                32.0 + 64.0 * i as f32,
                32.0,
                32.0,
                32.0,
                "ground.png",
            ));
        }
        list
    }

    fn body_at(x: f32, bottom: f32) -> Entity {
        Entity::new(EntityKind::Player, x, bottom + 40.0, 24.0, 40.0, "rock.png")
    }

    fn physics() -> PlatformerPhysics {
        PlatformerPhysics::new(&PhysicsConfig::default())
    }

    #[test]
    fn falling_body_lands_on_platform_top() {
        let platforms = floor(4);
        let mut body = body_at(100.0, 200.0);
        let mut engine = physics();

        for _ in 0..60 {
            engine.update(&mut body, &platforms);
        }
        assert_eq!(body.bottom(), 64.0);
        assert_eq!(body.change_y, 0.0);
        assert!(engine.can_jump());
    }

    #[test]
    fn resting_body_stays_put() {
        let platforms = floor(4);
        let mut body = body_at(100.0, 64.0);
        let mut engine = physics();
        engine.settle(&body, &platforms);
        assert!(engine.can_jump());

        for _ in 0..10 {
            engine.update(&mut body, &platforms);
            assert_eq!(body.bottom(), 64.0);
            assert!(engine.can_jump());
        }
    }

    #[test]
    fn jump_clears_grounded_until_landing() {
        let platforms = floor(4);
        for gravity in [0.5, 1.0, 2.0] {
            for jump_speed in [4.0, 16.0, 30.0] {
                let mut body = body_at(100.0, 64.0);
                let mut engine = PlatformerPhysics::new(&PhysicsConfig {
                    gravity,
                    jump_speed,
                    ..PhysicsConfig::default()
                });
                engine.settle(&body, &platforms);
                assert!(engine.can_jump(), "g={gravity} j={jump_speed}");

                assert!(engine.jump(&mut body, jump_speed));
                assert_eq!(body.change_y, jump_speed);
                assert!(!engine.can_jump());
                assert!(!engine.jump(&mut body, jump_speed), "no double jump");

                engine.update(&mut body, &platforms);
                assert!(!engine.can_jump(), "g={gravity} j={jump_speed}");
                assert!(body.bottom() > 64.0);

                let mut steps = 0;
                while !engine.can_jump() && steps < 1000 {
                    engine.update(&mut body, &platforms);
                    steps += 1;
                }
                assert!(engine.can_jump(), "g={gravity} j={jump_speed} never landed");
                assert_eq!(body.bottom(), 64.0);
            }
        }
    }

    #[test]
    fn airborne_body_cannot_jump() {
        let platforms = floor(4);
        let mut body = body_at(100.0, 300.0);
        let mut engine = physics();
        engine.settle(&body, &platforms);
        assert!(!engine.jump(&mut body, 16.0));
        assert_eq!(body.change_y, 0.0);
    }

    #[test]
    fn fall_speed_is_clamped() {
        let platforms = EntityList::new(EntityKind::Platform);
        let mut body = body_at(100.0, 10_000.0);
        let mut engine = physics();
        for _ in 0..100 {
            engine.update(&mut body, &platforms);
        }
        assert_eq!(body.change_y, -24.0);
    }

    #[test]
    fn unbounded_fall_when_clamp_disabled() {
        let platforms = EntityList::new(EntityKind::Platform);
        let mut body = body_at(100.0, 10_000.0);
        let mut engine = PlatformerPhysics::new(&PhysicsConfig {
            max_fall_speed: None,
            ..PhysicsConfig::default()
        });
        for _ in 0..30 {
            engine.update(&mut body, &platforms);
        }
        assert_eq!(body.change_y, -30.0);
    }

    #[test]
    fn upward_motion_stops_under_ceiling() {
        let mut platforms = floor(1);
        platforms.push(Entity::new(EntityKind::Platform, 100.0, 232.0, 32.0, 32.0, "ceil.png"));
        let mut body = body_at(100.0, 100.0);
        body.change_y = 30.0;
        let mut engine = physics();

        engine.update(&mut body, &platforms);
        // Ceiling bottom is at 200: top of the body snaps there.
        assert_eq!(body.top(), 200.0);
        assert_eq!(body.change_y, 0.0);
    }

    #[test]
    fn horizontal_motion_ignores_platforms() {
        let platforms = floor(4);
        let mut body = body_at(100.0, 64.0);
        body.change_x = 4.0;
        let mut engine = physics();
        engine.settle(&body, &platforms);
        engine.update(&mut body, &platforms);
        assert_eq!(body.center_x, 104.0);
        assert_eq!(body.bottom(), 64.0);
    }
}
