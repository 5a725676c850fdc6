//! Playing / Paused / GameOver and the music that goes with each.

use crate::audio::{AudioCommand, AudioDevice, Track};

/// Where the level music was when the game was paused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MusicSnapshot {
    pub track: Option<Track>,
    pub offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PauseStage {
    /// Paused, but the music has not been swapped yet.
    JustPaused,
    SteadyPaused(MusicSnapshot),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameState {
    Playing,
    Paused(PauseStage),
    GameOver,
}

impl GameState {
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused(_))
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, Self::GameOver)
    }

    /// Track that should be looping while in this state.
    pub fn music(&self) -> Track {
        match self {
            Self::Playing => Track::Level,
            Self::Paused(_) => Track::Pause,
            Self::GameOver => Track::GameOver,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Paused(_) => "paused",
            Self::GameOver => "game over",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StateMachine {
    state: GameState,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: GameState::Playing,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Escape key. Ignored once the game is over.
    pub fn toggle_pause(&mut self, audio: &mut dyn AudioDevice) {
        match self.state {
            GameState::Playing => {
                log::info!("Game paused");
                self.state = GameState::Paused(PauseStage::JustPaused);
                self.settle_pause(audio);
            }
            GameState::Paused(stage) => {
                log::info!("Game resumed");
                self.state = GameState::Playing;
                match stage {
                    PauseStage::SteadyPaused(snapshot) => {
                        switch_to(audio, snapshot.track.unwrap_or(Track::Level));
                        audio.submit(AudioCommand::Seek(snapshot.offset));
                        audio.submit(AudioCommand::Play);
                    }
                    PauseStage::JustPaused => audio.submit(AudioCommand::Play),
                }
            }
            GameState::GameOver => {}
        }
    }

    pub fn enter_game_over(&mut self, audio: &mut dyn AudioDevice) {
        if self.state.is_game_over() {
            return;
        }
        log::info!("Game over");
        self.state = GameState::GameOver;
        switch_to(audio, Track::GameOver);
    }

    /// Per-frame music upkeep: restart the state's track when the channel
    /// has run dry, and finish a pause that has not swapped music yet.
    pub fn update_music(&mut self, audio: &mut dyn AudioDevice) {
        if self.state == GameState::Paused(PauseStage::JustPaused) {
            self.settle_pause(audio);
            return;
        }
        if !audio.is_playing() {
            audio.submit(AudioCommand::Queue(self.state.music()));
            audio.submit(AudioCommand::Play);
        }
    }

    fn settle_pause(&mut self, audio: &mut dyn AudioDevice) {
        audio.submit(AudioCommand::Pause);
        let snapshot = MusicSnapshot {
            track: audio.current_track(),
            offset: audio.position(),
        };
        switch_to(audio, Track::Pause);
        self.state = GameState::Paused(PauseStage::SteadyPaused(snapshot));
    }
}

/// Queue `track`, skip to it if something else is loaded, and play.
fn switch_to(audio: &mut dyn AudioDevice, track: Track) {
    let had_track = audio.current_track().is_some();
    audio.submit(AudioCommand::Queue(track));
    if had_track {
        audio.submit(AudioCommand::NextSource);
    }
    audio.submit(AudioCommand::Play);
}
