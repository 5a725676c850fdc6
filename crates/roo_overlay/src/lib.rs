pub mod overlay;

pub use overlay::{GameOverlay, HudText, OverlayStats};
