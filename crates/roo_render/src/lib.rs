//! GPU side of the game: device setup, an orthographic 2D camera, and a
//! textured sprite pipeline fed by a CPU-built quad mesh.

pub mod camera;
pub mod gpu_context;
pub mod sprite_pipeline;
pub mod texture;
pub mod vertex;

pub use camera::{Camera2D, CameraUniform};
pub use gpu_context::GpuContext;
pub use sprite_pipeline::SpritePipeline;
pub use texture::Texture;
pub use vertex::{quad_corners, quad_indices, SpriteVertex};
