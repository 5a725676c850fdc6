//! Tile map: the read-only grid the game builds its sprite lists from.
//!
//! Levels are stored as JSON with one character per cell. Each layer lists its
//! rows top to bottom; a shared legend maps characters to tile textures and `.`
//! marks an empty cell. Once parsed the map is never mutated.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

pub const EMPTY_CELL: char = '.';

#[derive(Debug, Deserialize, Clone)]
struct LevelFile {
    version: String,
    level_id: String,
    tile_size: f32,
    width: usize,
    height: usize,
    #[serde(default)]
    background_color: Option<[u8; 3]>,
    legend: HashMap<char, String>,
    layers: Vec<LevelLayer>,
}

#[derive(Debug, Deserialize, Clone)]
struct LevelLayer {
    name: String,
    rows: Vec<String>,
}

/// One occupied cell. Centres are in unscaled tile-pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct TileCell {
    pub texture: String,
    pub center_x: f32,
    pub center_y: f32,
}

/// Rows bottom-up, each a row of optional cells.
#[derive(Debug, Clone)]
pub struct TileLayer {
    rows: Vec<Vec<Option<TileCell>>>,
}

impl TileLayer {
    pub fn rows(&self) -> &[Vec<Option<TileCell>>] {
        &self.rows
    }

    pub fn cells(&self) -> impl Iterator<Item = &TileCell> {
        self.rows.iter().flatten().flatten()
    }
}

#[derive(Debug, Clone)]
pub struct TileMap {
    pub level_id: String,
    pub tile_size: f32,
    pub width: usize,
    pub height: usize,
    pub background_color: Option<[u8; 3]>,
    layers: HashMap<String, TileLayer>,
}

impl TileMap {
    pub fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.get(name)
    }

    pub fn width_px(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    pub fn height_px(&self) -> f32 {
        self.height as f32 * self.tile_size
    }
}

pub fn load_level_from_path(path: &Path) -> Result<TileMap, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read level {}: {e}", path.display()))?;
    parse_level(&raw, &path.display().to_string())
}

pub fn parse_level(raw: &str, origin: &str) -> Result<TileMap, String> {
    let file: LevelFile = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse level JSON {origin}: {e}"))?;
    validate_level(&file)?;
    Ok(build_tile_map(file))
}

fn validate_level(file: &LevelFile) -> Result<(), String> {
    if file.version != "0.1" {
        return Err(format!(
            "Level validation failed: unsupported version '{}'",
            file.version
        ));
    }
    if file.tile_size <= 0.0 {
        return Err("Level validation failed: tile_size must be > 0".to_string());
    }
    if file.width == 0 || file.height == 0 {
        return Err("Level validation failed: width and height must be > 0".to_string());
    }
    if file.legend.contains_key(&EMPTY_CELL) {
        return Err(format!(
            "Level validation failed: '{EMPTY_CELL}' is reserved for empty cells"
        ));
    }

    let mut names = HashSet::new();
    for layer in &file.layers {
        if !names.insert(layer.name.as_str()) {
            return Err(format!(
                "Level validation failed: duplicate layer '{}'",
                layer.name
            ));
        }
        if layer.rows.len() != file.height {
            return Err(format!(
                "Level validation failed: layer '{}' has {} rows, expected {}",
                layer.name,
                layer.rows.len(),
                file.height
            ));
        }
        for (row_index, row) in layer.rows.iter().enumerate() {
            let len = row.chars().count();
            if len != file.width {
                return Err(format!(
                    "Level validation failed: layer '{}' row {} has {} cells, expected {}",
                    layer.name, row_index, len, file.width
                ));
            }
            if let Some(c) = row
                .chars()
                .find(|c| *c != EMPTY_CELL && !file.legend.contains_key(c))
            {
                return Err(format!(
                    "Level validation failed: layer '{}' row {} uses '{}' which is not in the legend",
                    layer.name, row_index, c
                ));
            }
        }
    }
    Ok(())
}

fn build_tile_map(file: LevelFile) -> TileMap {
    let tile = file.tile_size;
    let mut layers = HashMap::new();
    for layer in file.layers {
        let rows = layer
            .rows
            .iter()
            .rev()
            .enumerate()
            .map(|(y, row)| {
                row.chars()
                    .enumerate()
                    .map(|(x, c)| {
                        file.legend.get(&c).map(|texture| TileCell {
                            texture: texture.clone(),
                            center_x: (x as f32 + 0.5) * tile,
                            center_y: (y as f32 + 0.5) * tile,
                        })
                    })
                    .collect()
            })
            .collect();
        layers.insert(layer.name, TileLayer { rows });
    }

    if layers.is_empty() {
        log::warn!("Level '{}' has no layers", file.level_id);
    }

    TileMap {
        level_id: file.level_id,
        tile_size: tile,
        width: file.width,
        height: file.height,
        background_color: file.background_color,
        layers,
    }
}
