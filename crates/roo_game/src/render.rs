//! Draw commands produced by the simulation each frame.
//!
//! Commands are in world coordinates and ordered back to front. The binary
//! turns `Layer` and `Texture` into sprite quads and routes `Text` to the HUD.

use crate::entity::EntityKind;
use crate::viewport::VisibleRect;

/// Textures drawn on top of the world that are not entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overlay {
    MenuMask,
    PauseMask,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Every live entity of this kind, in list order.
    Layer(EntityKind),
    Texture {
        overlay: Overlay,
        center_x: f32,
        center_y: f32,
        width: f32,
        height: f32,
    },
    /// `x`/`y` is the text's bottom-left corner.
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawList {
    pub background_color: [u8; 3],
    pub visible: VisibleRect,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn layers(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Layer(kind) => Some(*kind),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_overlay(&self, overlay: Overlay) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Texture { overlay: o, .. } if *o == overlay))
    }
}
