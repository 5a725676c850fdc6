//! Audio seam between the simulation and whatever plays sound.
//!
//! The game never blocks on audio. It submits fire-and-forget commands and
//! polls three facts about the music channel: is it playing, which track is
//! loaded, and how far into it playback is.
//!
//! `MusicChannel` is a software model of a queued music player. A track that
//! reaches its end hands over to the next queued track, or stops the channel
//! when the queue is empty.

use std::collections::VecDeque;

use crate::config::AudioConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    Level,
    Pause,
    GameOver,
}

impl Track {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Level => "sounds/music.wav",
            Self::Pause => "sounds/paused.wav",
            Self::GameOver => "sounds/gameover1.wav",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sfx {
    CollectCoin,
    Jump,
    WallHit,
    IceHit,
    Gun,
}

impl Sfx {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::CollectCoin => "sounds/coin1.wav",
            Self::Jump => "sounds/jump1.wav",
            Self::WallHit => "sounds/hit4.wav",
            Self::IceHit => "sounds/hit2.wav",
            Self::Gun => "sounds/laser1.wav",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCommand {
    PlaySound(Sfx),
    /// Append a track. If nothing is loaded it becomes the current track.
    Queue(Track),
    /// Drop the current track and load the next queued one, if any.
    NextSource,
    Play,
    Pause,
    /// Jump to an offset in seconds within the current track.
    Seek(f64),
}

pub trait AudioDevice {
    fn submit(&mut self, command: AudioCommand);
    fn is_playing(&self) -> bool;
    /// Playback offset into the current track, in seconds.
    fn position(&self) -> f64;
    fn current_track(&self) -> Option<Track>;
}

#[derive(Debug, Clone)]
pub struct MusicChannel {
    durations: AudioConfig,
    current: Option<Track>,
    queue: VecDeque<Track>,
    position: f64,
    playing: bool,
    sound_effects: Vec<Sfx>,
    history: Vec<AudioCommand>,
}

impl MusicChannel {
    pub fn new(durations: AudioConfig) -> Self {
        Self {
            durations,
            current: None,
            queue: VecDeque::new(),
            position: 0.0,
            playing: false,
            sound_effects: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn duration(&self, track: Track) -> f64 {
        match track {
            Track::Level => self.durations.level_track_secs,
            Track::Pause => self.durations.pause_track_secs,
            Track::GameOver => self.durations.game_over_track_secs,
        }
    }

    /// Move playback forward by `dt` seconds of wall time.
    pub fn advance(&mut self, dt: f64) {
        if !self.playing {
            return;
        }
        self.position += dt;
        while let Some(track) = self.current {
            let length = self.duration(track);
            if self.position < length {
                break;
            }
            self.position -= length;
            self.current = self.queue.pop_front();
            if self.current.is_none() {
                self.position = 0.0;
                self.playing = false;
                log::debug!("Music channel drained after {:?}", track);
            }
        }
    }

    /// Sound effects submitted since the last call.
    pub fn take_sound_effects(&mut self) -> Vec<Sfx> {
        std::mem::take(&mut self.sound_effects)
    }

    /// Every command ever submitted, in order.
    pub fn history(&self) -> &[AudioCommand] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl AudioDevice for MusicChannel {
    fn submit(&mut self, command: AudioCommand) {
        self.history.push(command);
        match command {
            AudioCommand::PlaySound(sfx) => self.sound_effects.push(sfx),
            AudioCommand::Queue(track) => {
                if self.current.is_none() {
                    self.current = Some(track);
                    self.position = 0.0;
                } else {
                    self.queue.push_back(track);
                }
            }
            AudioCommand::NextSource => {
                self.current = self.queue.pop_front();
                self.position = 0.0;
                if self.current.is_none() {
                    self.playing = false;
                }
            }
            AudioCommand::Play => self.playing = self.current.is_some(),
            AudioCommand::Pause => self.playing = false,
            AudioCommand::Seek(offset) => {
                if let Some(track) = self.current {
                    self.position = offset.clamp(0.0, self.duration(track));
                }
            }
        }
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn current_track(&self) -> Option<Track> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> MusicChannel {
        MusicChannel::new(AudioConfig {
            level_track_secs: 10.0,
            pause_track_secs: 4.0,
            game_over_track_secs: 2.0,
        })
    }

    #[test]
    fn queue_on_empty_channel_loads_track() {
        let mut ch = channel();
        ch.submit(AudioCommand::Queue(Track::Level));
        assert_eq!(ch.current_track(), Some(Track::Level));
        assert!(!ch.is_playing());
        ch.submit(AudioCommand::Play);
        assert!(ch.is_playing());
    }

    #[test]
    fn play_without_track_stays_silent() {
        let mut ch = channel();
        ch.submit(AudioCommand::Play);
        assert!(!ch.is_playing());
    }

    #[test]
    fn next_source_skips_to_queued_track() {
        let mut ch = channel();
        ch.submit(AudioCommand::Queue(Track::Level));
        ch.submit(AudioCommand::Play);
        ch.advance(3.0);
        ch.submit(AudioCommand::Queue(Track::Pause));
        assert_eq!(ch.current_track(), Some(Track::Level));
        ch.submit(AudioCommand::NextSource);
        assert_eq!(ch.current_track(), Some(Track::Pause));
        assert_eq!(ch.position(), 0.0);
        assert!(ch.is_playing());
    }

    #[test]
    fn track_end_stops_empty_channel() {
        let mut ch = channel();
        ch.submit(AudioCommand::Queue(Track::GameOver));
        ch.submit(AudioCommand::Play);
        ch.advance(1.5);
        assert!(ch.is_playing());
        ch.advance(1.0);
        assert!(!ch.is_playing());
        assert_eq!(ch.current_track(), None);
    }

    #[test]
    fn track_end_rolls_into_queue() {
        let mut ch = channel();
        ch.submit(AudioCommand::Queue(Track::GameOver));
        ch.submit(AudioCommand::Queue(Track::Pause));
        ch.submit(AudioCommand::Play);
        ch.advance(2.5);
        assert_eq!(ch.current_track(), Some(Track::Pause));
        assert_eq!(ch.position(), 0.5);
        assert!(ch.is_playing());
    }

    #[test]
    fn paused_channel_keeps_position() {
        let mut ch = channel();
        ch.submit(AudioCommand::Queue(Track::Level));
        ch.submit(AudioCommand::Play);
        ch.advance(2.0);
        ch.submit(AudioCommand::Pause);
        ch.advance(5.0);
        assert_eq!(ch.position(), 2.0);
        ch.submit(AudioCommand::Seek(7.5));
        assert_eq!(ch.position(), 7.5);
        ch.submit(AudioCommand::Seek(99.0));
        assert_eq!(ch.position(), 10.0);
    }

    #[test]
    fn sound_effects_are_drained() {
        let mut ch = channel();
        ch.submit(AudioCommand::PlaySound(Sfx::Jump));
        ch.submit(AudioCommand::PlaySound(Sfx::Gun));
        assert_eq!(ch.take_sound_effects(), vec![Sfx::Jump, Sfx::Gun]);
        assert!(ch.take_sound_effects().is_empty());
        assert_eq!(ch.history().len(), 2);
    }
}
