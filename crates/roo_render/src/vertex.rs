#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

impl SpriteVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Corners of a quad rotated `angle_deg` counter-clockwise about its centre,
/// in the order bottom-left, bottom-right, top-right, top-left.
pub fn quad_corners(
    center: [f32; 2],
    half_w: f32,
    half_h: f32,
    angle_deg: f32,
) -> [[f32; 2]; 4] {
    let local = [
        [-half_w, -half_h],
        [half_w, -half_h],
        [half_w, half_h],
        [-half_w, half_h],
    ];
    if angle_deg == 0.0 {
        return local.map(|[x, y]| [center[0] + x, center[1] + y]);
    }
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    local.map(|[x, y]| [center[0] + x * cos - y * sin, center[1] + x * sin + y * cos])
}

/// Six indices drawing the quad whose first vertex is `base`.
pub fn quad_indices(base: u32) -> [u32; 6] {
    [base, base + 1, base + 2, base, base + 2, base + 3]
}
