//! Tunable game constants.
//!
//! `GameConfig::default()` reproduces the shipped game. A JSON file may
//! override any subset of fields; everything else keeps its default.

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen: ScreenConfig,
    pub viewport: ViewportConfig,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub laser: LaserConfig,
    pub audio: AudioConfig,
    pub assets: AssetConfig,
    /// Scale applied to tile-map coordinates and tile sizes.
    pub sprite_scaling: f32,
    /// Degrees per frame added to each coin's angle.
    pub coin_spin: f32,
    /// Length of one simulation frame, used to tick frame animations.
    pub step_us: u64,
    /// The FPS line is refreshed once every this many rendered frames.
    pub fps_refresh_frames: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    /// Keep the visible rectangle inside the map.
    pub clamp_to_map: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub movement_speed: f32,
    pub jump_speed: f32,
    pub gravity: f32,
    /// Terminal falling speed. `None` leaves falls unbounded.
    pub max_fall_speed: Option<f32>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub start_x: f32,
    pub start_y: f32,
    pub half_width: f32,
    pub half_height: f32,
    /// Distance from each map edge to the player's horizontal boundary.
    pub boundary_inset: f32,
    /// How far the player is shoved back inside after touching a boundary.
    pub wall_push_back: f32,
    /// Horizontal distance walked before the next walk frame is shown.
    pub texture_change_distance: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LaserConfig {
    pub speed: f32,
    pub half_width: f32,
    pub half_height: f32,
}

/// Track lengths in seconds, used by the software music channel.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub level_track_secs: f64,
    pub pause_track_secs: f64,
    pub game_over_track_secs: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub level: String,
    pub player_animations: String,
    pub laser_animations: String,
    pub menu_mask: String,
    pub pause_mask: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen: ScreenConfig::default(),
            viewport: ViewportConfig::default(),
            physics: PhysicsConfig::default(),
            player: PlayerConfig::default(),
            laser: LaserConfig::default(),
            audio: AudioConfig::default(),
            assets: AssetConfig::default(),
            sprite_scaling: 0.5,
            coin_spin: 5.0,
            step_us: 16_667,
            fps_refresh_frames: 60,
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            title: "ROCK & R.O.O.".to_string(),
            width: 1200,
            height: 720,
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            margin_left: 512.0,
            margin_right: 512.0,
            margin_top: 256.0,
            margin_bottom: 256.0,
            clamp_to_map: true,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            movement_speed: 4.0,
            jump_speed: 16.0,
            gravity: 1.0,
            max_fall_speed: Some(24.0),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_x: 384.0,
            start_y: 768.0,
            half_width: 24.0,
            half_height: 40.0,
            boundary_inset: 128.0,
            wall_push_back: 16.0,
            texture_change_distance: 20.0,
        }
    }
}

impl Default for LaserConfig {
    fn default() -> Self {
        Self {
            speed: 20.0,
            half_width: 8.0,
            half_height: 8.0,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            level_track_secs: 96.0,
            pause_track_secs: 12.0,
            game_over_track_secs: 6.0,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            level: "assets/levels/nla_test_level.json".to_string(),
            player_animations: "assets/animations/rock.json".to_string(),
            laser_animations: "assets/animations/laser.json".to_string(),
            menu_mask: "images/background_mask3.png".to_string(),
            pause_mask: "images/paused_mask.png".to_string(),
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    parse_config(&raw, &path.display().to_string())
}

pub fn parse_config(raw: &str, origin: &str) -> Result<GameConfig, String> {
    let config: GameConfig = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse config JSON {origin}: {e}"))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    let screen = &config.screen;
    if screen.width == 0 || screen.height == 0 {
        return Err("Config validation failed: screen size must be > 0".to_string());
    }
    let vp = &config.viewport;
    let margins = [vp.margin_left, vp.margin_right, vp.margin_top, vp.margin_bottom];
    if margins.iter().any(|m| *m < 0.0) {
        return Err("Config validation failed: viewport margins must be >= 0".to_string());
    }
    if vp.margin_left + vp.margin_right >= screen.width as f32 {
        return Err(format!(
            "Config validation failed: horizontal margins ({} + {}) leave no room on a {}px screen",
            vp.margin_left, vp.margin_right, screen.width
        ));
    }
    if vp.margin_top + vp.margin_bottom >= screen.height as f32 {
        return Err(format!(
            "Config validation failed: vertical margins ({} + {}) leave no room on a {}px screen",
            vp.margin_top, vp.margin_bottom, screen.height
        ));
    }
    let physics = &config.physics;
    if physics.movement_speed <= 0.0 || physics.jump_speed <= 0.0 {
        return Err("Config validation failed: movement and jump speed must be > 0".to_string());
    }
    if physics.gravity < 0.0 {
        return Err("Config validation failed: gravity must be >= 0".to_string());
    }
    if matches!(physics.max_fall_speed, Some(v) if v <= 0.0) {
        return Err("Config validation failed: max_fall_speed must be > 0".to_string());
    }
    let player = &config.player;
    if player.half_width <= 0.0 || player.half_height <= 0.0 {
        return Err("Config validation failed: player extents must be > 0".to_string());
    }
    if config.laser.speed <= 0.0 {
        return Err("Config validation failed: laser speed must be > 0".to_string());
    }
    if config.sprite_scaling <= 0.0 {
        return Err("Config validation failed: sprite_scaling must be > 0".to_string());
    }
    if config.step_us == 0 || config.fps_refresh_frames == 0 {
        return Err(
            "Config validation failed: step_us and fps_refresh_frames must be > 0".to_string(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "roo_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn defaults_match_shipped_game() {
        let config = GameConfig::default();
        assert_eq!(config.screen.width, 1200);
        assert_eq!(config.screen.height, 720);
        assert_eq!(config.viewport.margin_left, 512.0);
        assert_eq!(config.viewport.margin_top, 256.0);
        assert_eq!(config.physics.jump_speed, 16.0);
        assert_eq!(config.laser.speed, 20.0);
        assert_eq!(config.player.wall_push_back, 16.0);
        validate_config(&config).expect("defaults are valid");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = parse_config(
            r#"{ "physics": { "gravity": 0.5 }, "viewport": { "clamp_to_map": false } }"#,
            "inline",
        )
        .expect("should parse");
        assert_eq!(config.physics.gravity, 0.5);
        assert_eq!(config.physics.jump_speed, 16.0);
        assert!(!config.viewport.clamp_to_map);
        assert_eq!(config.viewport.margin_right, 512.0);
    }

    #[test]
    fn null_max_fall_speed_disables_clamp() {
        let config = parse_config(r#"{ "physics": { "max_fall_speed": null } }"#, "inline")
            .expect("should parse");
        assert!(config.physics.max_fall_speed.is_none());
    }

    #[test]
    fn rejects_margins_wider_than_screen() {
        let err = parse_config(
            r#"{ "viewport": { "margin_left": 700, "margin_right": 600 } }"#,
            "inline",
        )
        .expect_err("margins should be rejected");
        assert!(err.contains("horizontal margins"));
    }

    #[test]
    fn rejects_non_positive_jump() {
        let err = parse_config(r#"{ "physics": { "jump_speed": 0 } }"#, "inline")
            .expect_err("zero jump should be rejected");
        assert!(err.contains("jump speed"));
    }

    #[test]
    fn load_config_from_path_reads_file() {
        let path = temp_file_path("valid");
        fs::write(&path, r#"{ "laser": { "speed": 30 } }"#).expect("write temp file");
        let config = load_config_from_path(&path).expect("should load");
        assert_eq!(config.laser.speed, 30.0);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_config_reports_missing_file() {
        let path = temp_file_path("missing");
        let err = load_config_from_path(&path).expect_err("missing file");
        assert!(err.contains("Failed to read config"));
    }
}
