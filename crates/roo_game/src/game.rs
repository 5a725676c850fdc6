//! The game itself: one value owning every sprite list, the player, the
//! physics engine, the camera and the state machine.
//!
//! `step` runs one fixed simulation step from a drained input snapshot.
//! `draw` is read-only and describes the frame as a `DrawList`.

use std::sync::Arc;

use roo_core::animation::AnimationSet;
use roo_core::input::{FrameInput, InputEvent, Key, MouseBtn};

use crate::audio::{AudioCommand, AudioDevice, Sfx};
use crate::collision::{collide_with_list, collides_with_any};
use crate::config::GameConfig;
use crate::entity::{Entity, EntityAnimation, EntityKind, EntityList};
use crate::level::TileMap;
use crate::physics::PlatformerPhysics;
use crate::player::Player;
use crate::render::{DrawCommand, DrawList, Overlay};
use crate::state::{GameState, StateMachine};
use crate::viewport::{Viewport, ViewportController, VisibleRect};
use crate::walk::{Facing, WalkAnimation};

pub const PULSE_CLIP: &str = "pulse";

const JUMP_KEYS: [Key; 3] = [Key::W, Key::Space, Key::Up];
const LEFT_KEYS: [Key; 2] = [Key::A, Key::Left];
const RIGHT_KEYS: [Key; 2] = [Key::D, Key::Right];

const PAUSE_MASK_SIZE: (f32, f32) = (530.0, 292.0);
const DEFAULT_BACKGROUND: [u8; 3] = [0, 0, 0];

/// Animation sets the game needs beyond the tile map.
#[derive(Debug, Clone)]
pub struct GameAnimations {
    pub player: Arc<AnimationSet>,
    pub laser: Arc<AnimationSet>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub coins: u32,
    pub trees_saved: u32,
}

pub struct Game {
    config: GameConfig,
    background: EntityList,
    walls: EntityList,
    platforms: EntityList,
    npcs: EntityList,
    coins: EntityList,
    ice: EntityList,
    lasers: EntityList,
    player: Player,
    physics: PlatformerPhysics,
    viewport: Viewport,
    camera: ViewportController,
    state: StateMachine,
    score: Score,
    laser_set: Arc<AnimationSet>,
    background_color: [u8; 3],
    world_size: (f32, f32),
    frame_count: u64,
    fps_message: Option<String>,
}

impl Game {
    pub fn setup(
        config: GameConfig,
        map: &TileMap,
        animations: GameAnimations,
    ) -> Result<Self, String> {
        let scale = config.sprite_scaling;
        animations.laser.require(PULSE_CLIP)?;

        let background = build_list(map, EntityKind::Background, scale);
        let walls = build_list(map, EntityKind::Wall, scale);
        let platforms = build_list(map, EntityKind::Platform, scale);
        let npcs = build_list(map, EntityKind::Npc, scale);
        let mut coins = build_list(map, EntityKind::Coin, scale);
        let ice = build_list(map, EntityKind::Ice, scale);
        for coin in coins.iter_mut() {
            coin.angle = 0.0;
            coin.change_angle = config.coin_spin;
        }

        let world_size = (map.width_px() * scale, map.height_px() * scale);
        let pc = &config.player;
        let walk = WalkAnimation::from_set(animations.player, pc.texture_change_distance)?;
        let body = Entity::new(
            EntityKind::Player,
            pc.start_x,
            pc.start_y,
            pc.half_width,
            pc.half_height,
            "",
        );
        let player = Player::new(
            body,
            walk,
            pc.boundary_inset,
            world_size.0 - pc.boundary_inset,
        )
        .map_err(|e| format!("Level '{}' is too narrow: {e}", map.level_id))?;

        let mut physics = PlatformerPhysics::new(&config.physics);
        physics.settle(&player.body, &platforms);

        let camera = ViewportController::new(&config.viewport, &config.screen, Some(world_size));

        log::info!(
            "Level '{}' ready: {}x{} px, {} platforms, {} walls, {} coins, {} ice",
            map.level_id,
            world_size.0,
            world_size.1,
            platforms.len(),
            walls.len(),
            coins.len(),
            ice.len()
        );

        Ok(Self {
            background,
            walls,
            platforms,
            npcs,
            coins,
            ice,
            lasers: EntityList::new(EntityKind::Laser),
            player,
            physics,
            viewport: Viewport::default(),
            camera,
            state: StateMachine::new(),
            score: Score::default(),
            laser_set: animations.laser,
            background_color: map.background_color.unwrap_or(DEFAULT_BACKGROUND),
            world_size,
            frame_count: 0,
            fps_message: None,
            config,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state.state()
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn world_size(&self) -> (f32, f32) {
        self.world_size
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn fps_message(&self) -> Option<&str> {
        self.fps_message.as_deref()
    }

    pub fn can_jump(&self) -> bool {
        self.physics.can_jump()
    }

    /// Sprite list for `kind`. The player is not stored in a list.
    pub fn layer(&self, kind: EntityKind) -> Option<&EntityList> {
        match kind {
            EntityKind::Background => Some(&self.background),
            EntityKind::Wall => Some(&self.walls),
            EntityKind::Platform => Some(&self.platforms),
            EntityKind::Npc => Some(&self.npcs),
            EntityKind::Coin => Some(&self.coins),
            EntityKind::Ice => Some(&self.ice),
            EntityKind::Laser => Some(&self.lasers),
            EntityKind::Player => None,
        }
    }

    /// Live entities drawn by a `Layer` command, in list order.
    pub fn layer_entities(&self, kind: EntityKind) -> Vec<&Entity> {
        match self.layer(kind) {
            Some(list) => list.iter().filter(|e| e.is_alive()).collect(),
            None => vec![&self.player.body],
        }
    }

    /// Run one fixed step. Returns the new visible rectangle if the camera
    /// scrolled.
    pub fn step(&mut self, input: &FrameInput, audio: &mut dyn AudioDevice) -> Option<VisibleRect> {
        for event in &input.events {
            self.handle_event(event, input, audio);
        }

        self.state.update_music(audio);
        if self.state.state().is_playing() {
            self.simulate(audio);
        }

        self.camera.update(&mut self.viewport, &self.player.body.aabb())
    }

    /// Count a rendered frame and refresh the FPS line when due.
    pub fn note_rendered_frame(&mut self, fps: f32) {
        self.frame_count += 1;
        if self.frame_count % self.config.fps_refresh_frames == 0 {
            self.fps_message = Some(format!("FPS: {fps:5.0}"));
        }
    }

    pub fn draw(&self) -> DrawList {
        let (screen_w, screen_h) = self.camera.screen_size();
        let visible = self.viewport.visible_rect(screen_w, screen_h);
        let view_left = visible.left;
        let view_bottom = visible.bottom;
        let center_x = view_left + screen_w / 2.0;
        let center_y = view_bottom + screen_h / 2.0;
        let mut commands = Vec::new();

        match self.state.state() {
            GameState::Paused(_) => {
                for kind in [
                    EntityKind::Background,
                    EntityKind::Wall,
                    EntityKind::Platform,
                    EntityKind::Ice,
                    EntityKind::Coin,
                ] {
                    commands.push(DrawCommand::Layer(kind));
                }
                commands.push(DrawCommand::Texture {
                    overlay: Overlay::PauseMask,
                    center_x,
                    center_y,
                    width: PAUSE_MASK_SIZE.0,
                    height: PAUSE_MASK_SIZE.1,
                });
            }
            GameState::Playing | GameState::GameOver => {
                for kind in [
                    EntityKind::Background,
                    EntityKind::Wall,
                    EntityKind::Platform,
                    EntityKind::Ice,
                    EntityKind::Coin,
                    EntityKind::Npc,
                    EntityKind::Player,
                    EntityKind::Laser,
                ] {
                    commands.push(DrawCommand::Layer(kind));
                }
            }
        }

        commands.push(DrawCommand::Texture {
            overlay: Overlay::MenuMask,
            center_x,
            center_y,
            width: screen_w,
            height: screen_h,
        });

        if let Some(fps) = &self.fps_message {
            commands.push(text(fps.clone(), view_left + 10.0, view_bottom + 40.0, 14.0));
        }
        commands.push(text(
            format!("Coins: {}", self.score.coins),
            view_left + 400.0,
            view_bottom + 675.0,
            16.0,
        ));
        commands.push(text(
            format!("Trees Saved: {}", self.score.trees_saved),
            view_left + 500.0,
            view_bottom + 675.0,
            16.0,
        ));
        if self.state.state().is_game_over() {
            commands.push(text(
                "Game Over".to_string(),
                view_left + 200.0,
                view_bottom + 200.0,
                30.0,
            ));
        }

        DrawList {
            background_color: self.background_color,
            visible,
            commands,
        }
    }

    fn handle_event(&mut self, event: &InputEvent, input: &FrameInput, audio: &mut dyn AudioDevice) {
        match *event {
            InputEvent::KeyDown(key) => {
                if key == Key::Escape {
                    self.state.toggle_pause(audio);
                }
                if !self.state.state().is_playing() {
                    return;
                }
                let speed = self.config.physics.movement_speed;
                let body = &mut self.player.body;
                if JUMP_KEYS.contains(&key) {
                    if self.physics.jump(body, self.config.physics.jump_speed) {
                        audio.submit(AudioCommand::PlaySound(Sfx::Jump));
                    }
                } else if LEFT_KEYS.contains(&key) {
                    body.change_x = -speed;
                    self.player.facing = Facing::Left;
                } else if RIGHT_KEYS.contains(&key) {
                    body.change_x = speed;
                    self.player.facing = Facing::Right;
                }
                if self.player.at_boundary() {
                    self.player.body.change_x = 0.0;
                }
            }
            InputEvent::KeyUp(key) => {
                if LEFT_KEYS.contains(&key) || RIGHT_KEYS.contains(&key) {
                    self.follow_held_direction(input);
                } else if JUMP_KEYS.contains(&key) && self.player.body.change_y > 0.0 {
                    self.player.body.change_y = 0.0;
                }
            }
            InputEvent::MouseDown {
                button: MouseBtn::Left,
                x,
                y,
            } => {
                if self.state.state().is_playing() {
                    self.fire_laser(x as f32, y as f32, audio);
                }
            }
            InputEvent::MouseDown { .. } | InputEvent::MouseUp(_) => {}
        }
    }

    fn follow_held_direction(&mut self, input: &FrameInput) {
        let speed = self.config.physics.movement_speed;
        if input.any_held(&LEFT_KEYS) {
            self.player.body.change_x = -speed;
            self.player.facing = Facing::Left;
        } else if input.any_held(&RIGHT_KEYS) {
            self.player.body.change_x = speed;
            self.player.facing = Facing::Right;
        } else {
            self.player.body.change_x = 0.0;
        }
    }

    /// Spawn a laser at the player aimed at a window position.
    fn fire_laser(&mut self, screen_x: f32, screen_y: f32, audio: &mut dyn AudioDevice) {
        audio.submit(AudioCommand::PlaySound(Sfx::Gun));

        let (dest_x, dest_y) = self.viewport.to_world(screen_x, screen_y);
        let start_x = self.player.body.center_x;
        let start_y = self.player.body.center_y;
        let heading = (dest_y - start_y).atan2(dest_x - start_x);

        let lc = &self.config.laser;
        let first_frame = self
            .laser_set
            .clip(PULSE_CLIP)
            .map(|clip| clip.texture_at(0))
            .unwrap_or_default();
        let mut laser = Entity::new(
            EntityKind::Laser,
            start_x,
            start_y,
            lc.half_width,
            lc.half_height,
            first_frame,
        );
        laser.angle = heading.to_degrees();
        laser.change_x = heading.cos() * lc.speed;
        laser.change_y = heading.sin() * lc.speed;
        laser.animation = Some(EntityAnimation::new(Arc::clone(&self.laser_set), PULSE_CLIP));
        self.lasers.push(laser);
    }

    fn simulate(&mut self, audio: &mut dyn AudioDevice) {
        self.physics.update(&mut self.player.body, &self.platforms);

        for laser in self.lasers.iter_mut().filter(|l| l.is_alive()) {
            laser.advance();
            laser.tick_animation(self.config.step_us);
        }
        for coin in self.coins.iter_mut() {
            coin.advance();
        }
        self.player.update_animation();

        for index in collide_with_list(&self.player.body.aabb(), &self.coins) {
            self.coins.kill(index);
            audio.submit(AudioCommand::PlaySound(Sfx::CollectCoin));
            self.score.coins += 1;
        }

        self.resolve_lasers(audio);

        if self.player.clamp_to_boundaries(self.config.player.wall_push_back) {
            audio.submit(AudioCommand::PlaySound(Sfx::WallHit));
        }

        if self.player.body.top() < 0.0 {
            self.state.enter_game_over(audio);
        }

        self.coins.sweep_dead();
        self.ice.sweep_dead();
        self.lasers.sweep_dead();
    }

    fn resolve_lasers(&mut self, audio: &mut dyn AudioDevice) {
        let (screen_w, screen_h) = self.camera.screen_size();
        let view_left = self.viewport.left as f32;
        let view_bottom = self.viewport.bottom as f32;

        for index in 0..self.lasers.len() {
            let Some(laser) = self.lasers.get(index) else {
                continue;
            };
            if !laser.is_alive() {
                continue;
            }
            let bounds = laser.aabb();

            for ice in collide_with_list(&bounds, &self.ice) {
                self.lasers.kill(index);
                self.ice.kill(ice);
                audio.submit(AudioCommand::PlaySound(Sfx::IceHit));
                self.score.trees_saved += 1;
            }
            if collides_with_any(&bounds, &self.platforms) || collides_with_any(&bounds, &self.walls) {
                self.lasers.kill(index);
            }

            let off_screen = bounds.bottom() > view_bottom + screen_h
                || bounds.bottom() < view_bottom
                || bounds.left() > view_left + screen_w
                || bounds.left() < view_left;
            if off_screen {
                self.lasers.kill(index);
            }
        }
    }
}

fn text(text: String, x: f32, y: f32, size: f32) -> DrawCommand {
    DrawCommand::Text { text, x, y, size }
}

fn build_list(map: &TileMap, kind: EntityKind, scale: f32) -> EntityList {
    let mut list = EntityList::new(kind);
    let Some(name) = kind.layer_name() else {
        return list;
    };
    let Some(layer) = map.layer(name) else {
        log::warn!("Level '{}' has no '{}' layer", map.level_id, name);
        return list;
    };
    let half = map.tile_size * scale / 2.0;
    for cell in layer.cells() {
        list.push(Entity::new(
            kind,
            cell.center_x * scale,
            cell.center_y * scale,
            half,
            half,
            &cell.texture,
        ));
    }
    list
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::audio::{MusicChannel, Track};
    use crate::level::parse_level;
    use crate::level::tests::SMALL_LEVEL;
    use crate::walk::tests::ROCK_SET;
    use roo_core::animation::parse_animation_set;
    use std::collections::HashSet;

    pub(crate) const LASER_SET: &str = r#"
    {
      "version": "0.1",
      "set_id": "laser",
      "clips": {
        "pulse": { "looping": true, "frames": [
          { "texture": "images/laser1t.png", "duration_ms": 50 },
          { "texture": "images/laser2t.png", "duration_ms": 50 }
        ] }
      }
    }
    "#;

    pub(crate) fn animations() -> GameAnimations {
        GameAnimations {
            player: Arc::new(parse_animation_set(ROCK_SET, "rock").expect("rock set")),
            laser: Arc::new(parse_animation_set(LASER_SET, "laser").expect("laser set")),
        }
    }

    /// A map with one row of ground along the bottom. Tiles are 64px once
    /// scaled, so the ground top sits at y = 64.
    pub(crate) fn floor_level(width: usize, height: usize) -> TileMap {
        let mut rows = vec![".".repeat(width); height];
        rows[height - 1] = "#".repeat(width);
        let raw = serde_json::json!({
            "version": "0.1",
            "level_id": "floor",
            "tile_size": 128,
            "width": width,
            "height": height,
            "legend": { "#": "images/ground.png" },
            "layers": [ { "name": "Platforms", "rows": rows } ]
        })
        .to_string();
        parse_level(&raw, "inline").expect("valid level")
    }

    /// 2560x768 world, player resting on the ground at x = 600.
    pub(crate) fn game_on_floor() -> Game {
        let mut game =
            Game::setup(GameConfig::default(), &floor_level(40, 12), animations()).expect("setup");
        place_player(&mut game, 600.0, 64.0);
        game
    }

    pub(crate) fn place_player(game: &mut Game, x: f32, bottom: f32) {
        let body = &mut game.player.body;
        body.center_x = x;
        body.set_bottom(bottom);
        body.change_x = 0.0;
        body.change_y = 0.0;
        game.physics.settle(&game.player.body, &game.platforms);
    }

    impl Game {
        pub(crate) fn replace_layer(&mut self, list: EntityList) {
            match list.kind() {
                EntityKind::Background => self.background = list,
                EntityKind::Wall => self.walls = list,
                EntityKind::Platform => self.platforms = list,
                EntityKind::Npc => self.npcs = list,
                EntityKind::Coin => self.coins = list,
                EntityKind::Ice => self.ice = list,
                EntityKind::Laser => self.lasers = list,
                EntityKind::Player => {}
            }
        }
    }

    pub(crate) fn frame(events: Vec<InputEvent>, held: &[Key]) -> FrameInput {
        FrameInput {
            events,
            held: held.iter().copied().collect::<HashSet<_>>(),
        }
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn channel() -> MusicChannel {
        MusicChannel::new(crate::config::AudioConfig::default())
    }

    fn entity(kind: EntityKind, x: f32, y: f32) -> Entity {
        Entity::new(kind, x, y, 32.0, 32.0, "tile.png")
    }

    #[test]
    fn setup_builds_scaled_lists_from_layers() {
        let map = parse_level(SMALL_LEVEL, "small").expect("valid level");
        let game = Game::setup(GameConfig::default(), &map, animations()).expect("setup");

        let coins = game.layer(EntityKind::Coin).expect("coin list");
        assert_eq!(coins.len(), 1);
        let coin = coins.get(0).expect("coin");
        assert_eq!((coin.center_x, coin.center_y), (160.0, 96.0));
        assert_eq!((coin.half_w, coin.change_angle), (32.0, 5.0));

        assert_eq!(game.layer(EntityKind::Platform).map(EntityList::len), Some(6));
        assert!(game.layer(EntityKind::Ice).is_some_and(EntityList::is_empty));
        assert!(game.layer(EntityKind::Player).is_none());
        assert_eq!(game.world_size(), (384.0, 192.0));
        assert_eq!(game.player().boundary_right(), 256.0);
        assert_eq!(game.draw().background_color, [160, 200, 255]);
        assert_eq!(game.score(), Score::default());
        assert!(game.state().is_playing());
    }

    #[test]
    fn setup_rejects_map_narrower_than_boundaries() {
        let err = Game::setup(GameConfig::default(), &floor_level(4, 3), animations())
            .err()
            .expect("too narrow");
        assert!(err.contains("too narrow"));
    }

    #[test]
    fn setup_requires_laser_pulse_clip() {
        let mut anims = animations();
        anims.laser = Arc::new(
            parse_animation_set(&LASER_SET.replace("pulse", "blink"), "laser").expect("set"),
        );
        let err = Game::setup(GameConfig::default(), &floor_level(40, 12), anims)
            .err()
            .expect("missing clip");
        assert!(err.contains("pulse"));
    }

    #[test]
    fn walking_follows_held_keys() {
        let mut game = game_on_floor();
        let mut audio = channel();

        game.step(&frame(vec![InputEvent::KeyDown(Key::D)], &[Key::D]), &mut audio);
        assert_eq!(game.player().body.center_x, 604.0);
        assert_eq!(game.player().facing, Facing::Right);

        game.step(
            &frame(vec![InputEvent::KeyDown(Key::A)], &[Key::A, Key::D]),
            &mut audio,
        );
        assert_eq!(game.player().body.change_x, -4.0);
        assert_eq!(game.player().facing, Facing::Left);

        game.step(&frame(vec![InputEvent::KeyUp(Key::A)], &[Key::D]), &mut audio);
        assert_eq!(game.player().body.change_x, 4.0);

        game.step(&frame(vec![InputEvent::KeyUp(Key::D)], &[]), &mut audio);
        assert_eq!(game.player().body.change_x, 0.0);
        assert_eq!(game.player().body.bottom(), 64.0);
    }

    #[test]
    fn jump_only_from_ground() {
        let mut game = game_on_floor();
        let mut audio = channel();
        assert!(game.can_jump());

        game.step(&frame(vec![InputEvent::KeyDown(Key::W)], &[Key::W]), &mut audio);
        assert_eq!(game.player().body.change_y, 15.0);
        assert_eq!(game.player().body.bottom(), 79.0);
        assert!(!game.can_jump());
        assert_eq!(audio.take_sound_effects(), vec![Sfx::Jump]);

        game.step(&frame(vec![InputEvent::KeyUp(Key::W)], &[]), &mut audio);
        assert_eq!(game.player().body.change_y, -1.0);

        game.step(&frame(vec![InputEvent::KeyDown(Key::Space)], &[Key::Space]), &mut audio);
        assert!(audio.take_sound_effects().is_empty(), "no jump mid-air");

        for _ in 0..30 {
            game.step(&idle(), &mut audio);
        }
        assert!(game.can_jump());
        assert_eq!(game.player().body.bottom(), 64.0);
    }

    #[test]
    fn boundary_push_back_plays_wall_hit_once() {
        let mut game = game_on_floor();
        let mut audio = channel();
        place_player(&mut game, 154.0, 64.0);

        game.step(&frame(vec![InputEvent::KeyDown(Key::A)], &[Key::A]), &mut audio);
        assert_eq!(game.player().body.left(), 144.0);
        assert_eq!(game.player().body.change_x, -4.0);
        assert_eq!(audio.take_sound_effects(), vec![Sfx::WallHit]);

        game.step(&frame(vec![], &[Key::A]), &mut audio);
        assert_eq!(game.player().body.left(), 140.0);
        assert!(audio.take_sound_effects().is_empty());
    }

    #[test]
    fn movement_key_at_boundary_stops_player() {
        let mut game = game_on_floor();
        let mut audio = channel();
        place_player(&mut game, 152.0, 64.0);

        game.step(&frame(vec![InputEvent::KeyDown(Key::A)], &[Key::A]), &mut audio);
        assert_eq!(game.player().body.change_x, 0.0);
        assert_eq!(game.player().body.left(), 144.0);
    }

    #[test]
    fn step_reports_visible_rect_only_when_scrolled() {
        let mut game = game_on_floor();
        let mut audio = channel();
        // Resting below the bottom margin, but the map clamp holds the origin.
        assert_eq!(game.step(&idle(), &mut audio), None);
        assert_eq!(game.viewport(), Viewport::default());

        // Right edge 1024 against a deadzone edge of 1200 - 512 = 688.
        place_player(&mut game, 1000.0, 64.0);
        let rect = game.step(&idle(), &mut audio).expect("scrolled right");
        assert_eq!(game.viewport(), Viewport { left: 336, bottom: 0 });
        assert_eq!(rect, game.draw().visible);
        assert_eq!(game.step(&idle(), &mut audio), None);
    }

    #[test]
    fn laser_heads_toward_mouse_in_world_space() {
        let mut game = game_on_floor();
        let mut audio = channel();
        game.viewport = Viewport { left: 100, bottom: 0 };
        // Player centre is (600, 104); the target is (900, 504) in world space.
        let click = InputEvent::MouseDown {
            button: MouseBtn::Left,
            x: 800.0,
            y: 504.0,
        };
        game.step(&frame(vec![click], &[]), &mut audio);

        let lasers = game.layer(EntityKind::Laser).expect("laser list");
        assert_eq!(lasers.len(), 1);
        let laser = lasers.get(0).expect("laser");
        assert!((laser.change_x - 12.0).abs() < 1e-4);
        assert!((laser.change_y - 16.0).abs() < 1e-4);
        assert!((laser.angle - 53.130_1).abs() < 1e-3);
        assert!((laser.center_x - 612.0).abs() < 1e-3);
        assert!((laser.center_y - 120.0).abs() < 1e-3);
        assert_eq!(audio.take_sound_effects(), vec![Sfx::Gun]);
    }

    #[test]
    fn laser_fired_level_with_player_flies_flat() {
        let mut game = game_on_floor();
        let mut audio = channel();
        game.viewport = Viewport { left: 100, bottom: 0 };
        // Player centre is (600, 104); aim at (900, 104) in world space.
        let click = InputEvent::MouseDown {
            button: MouseBtn::Left,
            x: 800.0,
            y: 104.0,
        };
        game.step(&frame(vec![click], &[]), &mut audio);

        let speed = game.config().laser.speed;
        let lasers = game.layer(EntityKind::Laser).expect("laser list");
        let laser = lasers.get(0).expect("laser");
        assert_eq!(laser.angle, 0.0);
        assert_eq!(laser.change_x, speed);
        assert_eq!(laser.change_y, 0.0);
        assert_eq!((laser.center_x, laser.center_y), (600.0 + speed, 104.0));
    }

    #[test]
    fn laser_through_ice_and_wall_scores_each_ice_once() {
        let mut game = game_on_floor();
        let mut audio = channel();
        let mut laser = Entity::new(EntityKind::Laser, 700.0, 300.0, 8.0, 8.0, "laser.png");
        laser.change_x = 20.0;
        game.lasers.push(laser);
        game.ice.push(entity(EntityKind::Ice, 730.0, 300.0));
        game.ice.push(entity(EntityKind::Ice, 700.0, 310.0));
        game.ice.push(entity(EntityKind::Ice, 2000.0, 300.0));
        game.walls.push(entity(EntityKind::Wall, 740.0, 300.0));

        game.step(&idle(), &mut audio);

        assert_eq!(game.score().trees_saved, 2);
        assert_eq!(
            audio.take_sound_effects(),
            vec![Sfx::IceHit, Sfx::IceHit]
        );
        assert!(game.layer(EntityKind::Laser).is_some_and(EntityList::is_empty));
        assert_eq!(game.layer(EntityKind::Ice).map(EntityList::len), Some(1));
    }

    #[test]
    fn laser_leaving_view_is_culled() {
        let mut game = game_on_floor();
        let mut audio = channel();
        let mut laser = Entity::new(EntityKind::Laser, 1190.0, 300.0, 8.0, 8.0, "laser.png");
        laser.change_x = 20.0;
        game.lasers.push(laser);

        game.step(&idle(), &mut audio);
        assert!(game.layer(EntityKind::Laser).is_some_and(EntityList::is_empty));
    }

    #[test]
    fn coins_are_collected_once() {
        let mut game = game_on_floor();
        let mut audio = channel();
        game.coins.push(entity(EntityKind::Coin, 610.0, 110.0));
        game.coins.push(entity(EntityKind::Coin, 1500.0, 110.0));

        game.step(&idle(), &mut audio);
        assert_eq!(game.score().coins, 1);
        assert_eq!(audio.take_sound_effects(), vec![Sfx::CollectCoin]);
        assert_eq!(game.layer(EntityKind::Coin).map(EntityList::len), Some(1));

        for _ in 0..10 {
            game.step(&idle(), &mut audio);
            assert_eq!(game.score().coins, 1);
        }
    }

    #[test]
    fn coins_spin_every_step() {
        let mut game = game_on_floor();
        let mut audio = channel();
        let mut coin = entity(EntityKind::Coin, 1500.0, 110.0);
        coin.change_angle = 5.0;
        game.coins.push(coin);

        game.step(&idle(), &mut audio);
        game.step(&idle(), &mut audio);
        let angle = game.layer(EntityKind::Coin).and_then(|l| l.get(0)).map(|c| c.angle);
        assert_eq!(angle, Some(10.0));
    }

    #[test]
    fn paused_game_freezes_and_double_toggle_restores_music() {
        let mut game = game_on_floor();
        let mut audio = channel();
        game.step(&idle(), &mut audio);
        audio.advance(20.0);
        place_player(&mut game, 600.0, 300.0);

        game.step(&frame(vec![InputEvent::KeyDown(Key::Escape)], &[Key::Escape]), &mut audio);
        assert!(game.state().is_paused());
        assert_eq!(audio.current_track(), Some(Track::Pause));
        assert_eq!(game.player().body.bottom(), 300.0);

        let click = InputEvent::MouseDown {
            button: MouseBtn::Left,
            x: 10.0,
            y: 10.0,
        };
        game.step(
            &frame(vec![InputEvent::KeyUp(Key::Escape), click], &[]),
            &mut audio,
        );
        assert_eq!(game.player().body.bottom(), 300.0);
        assert!(game.layer(EntityKind::Laser).is_some_and(EntityList::is_empty));

        let list = game.draw();
        assert!(list.has_overlay(Overlay::PauseMask));
        assert!(!list.layers().any(|k| k == EntityKind::Player));

        game.step(&frame(vec![InputEvent::KeyDown(Key::Escape)], &[Key::Escape]), &mut audio);
        assert!(game.state().is_playing());
        assert_eq!(audio.current_track(), Some(Track::Level));
        assert_eq!(audio.position(), 20.0);
        assert!(audio.is_playing());
    }

    #[test]
    fn falling_out_of_world_ends_game() {
        let mut game = game_on_floor();
        let mut audio = channel();
        game.platforms = EntityList::new(EntityKind::Platform);
        place_player(&mut game, 600.0, 10.0);

        let mut steps = 0;
        while !game.state().is_game_over() && steps < 100 {
            game.step(&idle(), &mut audio);
            steps += 1;
        }
        assert!(game.state().is_game_over());
        assert!(game.player().body.top() < 0.0);
        assert_eq!(audio.current_track(), Some(Track::GameOver));

        let frozen = game.player().body.center_y;
        game.step(&frame(vec![InputEvent::KeyDown(Key::Escape)], &[Key::Escape]), &mut audio);
        assert!(game.state().is_game_over());
        assert_eq!(game.player().body.center_y, frozen);

        let list = game.draw();
        assert!(list.texts().any(|t| t == "Game Over"));
        assert!(list.layers().any(|k| k == EntityKind::Player));
    }

    #[test]
    fn draw_list_in_playing_state() {
        let mut game = game_on_floor();
        let list = game.draw();
        let layers: Vec<EntityKind> = list.layers().collect();
        assert_eq!(
            layers,
            vec![
                EntityKind::Background,
                EntityKind::Wall,
                EntityKind::Platform,
                EntityKind::Ice,
                EntityKind::Coin,
                EntityKind::Npc,
                EntityKind::Player,
                EntityKind::Laser,
            ]
        );
        assert!(list.has_overlay(Overlay::MenuMask));
        assert!(!list.has_overlay(Overlay::PauseMask));
        let texts: Vec<&str> = list.texts().collect();
        assert_eq!(texts, vec!["Coins: 0", "Trees Saved: 0"]);

        for _ in 0..60 {
            game.note_rendered_frame(59.6);
        }
        assert_eq!(game.fps_message(), Some("FPS:    60"));
        assert_eq!(game.draw().texts().next(), Some("FPS:    60"));
    }

    #[test]
    fn first_step_starts_level_music() {
        let mut game = game_on_floor();
        let mut audio = channel();
        game.step(&idle(), &mut audio);
        assert_eq!(audio.current_track(), Some(Track::Level));
        assert!(audio.is_playing());
    }
}
