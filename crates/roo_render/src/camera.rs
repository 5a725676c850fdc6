use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Orthographic camera anchored at the bottom-left corner of the view.
///
/// `size` is in world units and independent of the window's pixel size, so
/// the game always shows the same slice of the world.
pub struct Camera2D {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Camera2D {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::ZERO,
            size: Vec2::new(width, height),
        }
    }

    pub fn set_origin(&mut self, left: f32, bottom: f32) {
        self.origin = Vec2::new(left, bottom);
    }

    pub fn build_uniform(&self) -> CameraUniform {
        let proj = Mat4::orthographic_rh(
            self.origin.x,
            self.origin.x + self.size.x,
            self.origin.y,
            self.origin.y + self.size.y,
            -1.0,
            1.0,
        );

        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn project(camera: &Camera2D, x: f32, y: f32) -> Vec2 {
        let m = Mat4::from_cols_array_2d(&camera.build_uniform().view_proj);
        let clip = m * Vec4::new(x, y, 0.0, 1.0);
        Vec2::new(clip.x, clip.y)
    }

    #[test]
    fn origin_maps_to_bottom_left_of_clip_space() {
        let mut camera = Camera2D::new(1200.0, 720.0);
        camera.set_origin(100.0, 50.0);

        let bl = project(&camera, 100.0, 50.0);
        let tr = project(&camera, 1300.0, 770.0);
        assert!((bl - Vec2::new(-1.0, -1.0)).length() < 1e-5);
        assert!((tr - Vec2::new(1.0, 1.0)).length() < 1e-5);
    }
}
