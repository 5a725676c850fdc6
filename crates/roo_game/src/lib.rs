pub mod audio;
pub mod collision;
pub mod config;
pub mod entity;
pub mod game;
pub mod level;
pub mod physics;
pub mod player;
pub mod render;
pub mod replay;
pub mod state;
pub mod viewport;
pub mod walk;
