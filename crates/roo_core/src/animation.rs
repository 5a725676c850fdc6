//! Frame-based sprite animation types and deterministic tick logic.
//!
//! An `AnimationSet` is a typed table of named clips built once from a JSON
//! manifest. Entities hold it behind an `Arc` and never mutate it; per-entity
//! progress lives in `AnimationState`.
//!
//! All timing uses integer microseconds so advancement is exact under the
//! fixed-timestep model. The manifest stores `duration_ms`; loading converts it.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A single frame in an animation clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    pub texture: String,
    pub duration_us: u64,
}

/// A named sequence of frames that can loop or play once.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub frames: Vec<AnimationFrame>,
    pub looping: bool,
}

impl AnimationClip {
    /// Total duration of one full cycle in microseconds.
    pub fn total_duration_us(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_us).sum()
    }

    pub fn texture_at(&self, frame_index: usize) -> &str {
        self.frames
            .get(frame_index)
            .or_else(|| self.frames.last())
            .map(|f| f.texture.as_str())
            .unwrap_or("")
    }
}

/// Immutable table of clips, keyed by clip name.
#[derive(Debug, Clone)]
pub struct AnimationSet {
    pub set_id: String,
    clips: HashMap<String, AnimationClip>,
}

impl AnimationSet {
    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.get(name)
    }

    /// Like `clip`, but a missing clip is an error naming the set.
    pub fn require(&self, name: &str) -> Result<&AnimationClip, String> {
        self.clips.get(name).ok_or_else(|| {
            format!(
                "Animation set '{}' has no clip named '{}'",
                self.set_id, name
            )
        })
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(String::as_str)
    }

    /// Every texture referenced by any clip, deduplicated and sorted.
    pub fn textures(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .clips
            .values()
            .flat_map(|c| c.frames.iter().map(|f| f.texture.as_str()))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Runtime state for one active animation instance.
#[derive(Debug, Clone)]
pub struct AnimationState {
    pub clip_name: String,
    pub frame_index: usize,
    pub elapsed_us: u64,
    pub finished: bool,
}

impl AnimationState {
    pub fn new(clip_name: &str) -> Self {
        Self {
            clip_name: clip_name.to_string(),
            frame_index: 0,
            elapsed_us: 0,
            finished: false,
        }
    }

    /// Advance the animation by `dt_us` microseconds. Returns the current
    /// frame's texture.
    pub fn tick<'a>(&mut self, dt_us: u64, clip: &'a AnimationClip) -> &'a str {
        if clip.frames.is_empty() || self.finished {
            return clip.texture_at(self.frame_index);
        }

        self.elapsed_us += dt_us;

        loop {
            let current_frame = &clip.frames[self.frame_index];
            if self.elapsed_us < current_frame.duration_us {
                break;
            }

            self.elapsed_us -= current_frame.duration_us;
            self.frame_index += 1;

            if self.frame_index >= clip.frames.len() {
                if clip.looping {
                    self.frame_index = 0;
                } else {
                    self.frame_index = clip.frames.len() - 1;
                    self.elapsed_us = 0;
                    self.finished = true;
                    break;
                }
            }
        }

        &clip.frames[self.frame_index].texture
    }
}

// --- JSON manifest types (private) ---

#[derive(Debug, Deserialize)]
struct AnimationManifestJson {
    version: String,
    set_id: String,
    clips: HashMap<String, AnimationClipJson>,
}

#[derive(Debug, Deserialize)]
struct AnimationClipJson {
    frames: Vec<AnimationFrameJson>,
    #[serde(default)]
    looping: bool,
}

#[derive(Debug, Deserialize)]
struct AnimationFrameJson {
    texture: String,
    duration_ms: u64,
}

/// Load an animation manifest from disk.
pub fn load_animation_set(path: &Path) -> Result<AnimationSet, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read animation manifest {}: {e}", path.display()))?;
    parse_animation_set(&raw, &path.display().to_string())
}

/// Parse an animation manifest. `origin` only labels error messages.
pub fn parse_animation_set(raw: &str, origin: &str) -> Result<AnimationSet, String> {
    let json: AnimationManifestJson = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse animation manifest {origin}: {e}"))?;
    validate_manifest(&json)?;

    let clips = json
        .clips
        .into_iter()
        .map(|(name, clip_json)| {
            let frames = clip_json
                .frames
                .into_iter()
                .map(|f| AnimationFrame {
                    texture: f.texture,
                    duration_us: f.duration_ms * 1000,
                })
                .collect();
            (
                name,
                AnimationClip {
                    frames,
                    looping: clip_json.looping,
                },
            )
        })
        .collect();

    Ok(AnimationSet {
        set_id: json.set_id,
        clips,
    })
}

fn validate_manifest(json: &AnimationManifestJson) -> Result<(), String> {
    if json.version != "0.1" {
        return Err(format!(
            "Animation validation failed: unsupported version '{}'",
            json.version
        ));
    }
    if json.set_id.is_empty() {
        return Err("Animation validation failed: set_id is empty".to_string());
    }
    for (name, clip) in &json.clips {
        if clip.frames.is_empty() {
            return Err(format!(
                "Animation validation failed: clip '{}' has no frames",
                name
            ));
        }
        for (i, frame) in clip.frames.iter().enumerate() {
            if frame.texture.is_empty() {
                return Err(format!(
                    "Animation validation failed: clip '{}' frame {} has empty texture",
                    name, i
                ));
            }
            if frame.duration_ms == 0 {
                return Err(format!(
                    "Animation validation failed: clip '{}' frame {} has zero duration",
                    name, i
                ));
            }
        }
    }
    Ok(())
}
