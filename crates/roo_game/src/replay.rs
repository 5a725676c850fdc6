use crate::audio::AudioDevice;
use crate::game::Game;
use roo_core::input::{InputState, Key, MouseBtn};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Scripted input, one entry per group of identical simulation steps.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub press: Vec<String>,
    #[serde(default)]
    pub release: Vec<String>,
    /// Left click at window coordinates (y-up).
    #[serde(default)]
    pub click: Option<[f64; 2]>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

/// Summary of a replay run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayOutcome {
    pub steps: u64,
    pub coins: u32,
    pub trees_saved: u32,
    pub player_x: f32,
    pub player_y: f32,
}

impl ReplaySequence {
    /// Feed every frame through an `InputState` and step the game. Inputs
    /// are applied before the first step of their frame, then the frame is
    /// held for `repeat` steps.
    pub fn run(&self, game: &mut Game, audio: &mut dyn AudioDevice) -> Result<ReplayOutcome, String> {
        self.run_with(game, audio, |_| {})
    }

    /// Like `run`, calling `after_step` once the game has finished each step.
    pub fn run_with(
        &self,
        game: &mut Game,
        audio: &mut dyn AudioDevice,
        mut after_step: impl FnMut(&Game),
    ) -> Result<ReplayOutcome, String> {
        let mut input = InputState::new();
        let mut steps = 0u64;
        for frame in &self.frames {
            for name in &frame.release {
                input.key_up(parse_key(name)?);
            }
            for name in &frame.press {
                input.key_down(parse_key(name)?);
            }
            if let Some([x, y]) = frame.click {
                input.mouse_position = (x, y);
                input.mouse_down(MouseBtn::Left);
                input.mouse_up(MouseBtn::Left);
            }
            for _ in 0..frame.repeat.max(1) {
                let snapshot = input.take_frame();
                game.step(&snapshot, audio);
                after_step(game);
                steps += 1;
            }
        }

        let score = game.score();
        let body = &game.player().body;
        Ok(ReplayOutcome {
            steps,
            coins: score.coins,
            trees_saved: score.trees_saved,
            player_x: body.center_x,
            player_y: body.center_y,
        })
    }
}

pub fn parse_key(name: &str) -> Result<Key, String> {
    match name {
        "Left" => Ok(Key::Left),
        "Right" => Ok(Key::Right),
        "Up" => Ok(Key::Up),
        "Escape" => Ok(Key::Escape),
        "Space" => Ok(Key::Space),
        "F3" => Ok(Key::F3),
        "W" => Ok(Key::W),
        "A" => Ok(Key::A),
        "D" => Ok(Key::D),
        other => Err(format!("Unknown key '{other}'")),
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_replay(&raw, &path.display().to_string())
}

pub fn parse_replay(raw: &str, origin: &str) -> Result<ReplaySequence, String> {
    let replay: ReplaySequence = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse replay JSON {origin}: {e}"))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    for (i, frame) in replay.frames.iter().enumerate() {
        for name in frame.press.iter().chain(&frame.release) {
            parse_key(name).map_err(|e| format!("Replay validation failed: frame {i}: {e}"))?;
        }
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}
