//! ROCK & R.O.O. -- window, render loop and entry point.
//!
//! winit drives the event loop through `ApplicationHandler`. Each redraw:
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed the accumulator
//!   2. `while should_step()` -- drain input and run one `Game::step`
//!   3. advance the music channel by the real frame time
//!   4. turn the game's `DrawList` into a sprite mesh plus HUD text
//!   5. draw the sprites, composite the egui layer
//!
//! The camera uniform is only rewritten when a step reports a scroll.
//!
//! Setting `ROO_REPLAY` to a replay file runs the game headless instead and
//! logs the final score.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use roo_core::animation::load_animation_set;
use roo_core::input::{InputState, Key, MouseBtn};
use roo_core::time::TimeState;
use roo_game::audio::MusicChannel;
use roo_game::config::{load_config_from_path, GameConfig};
use roo_game::entity::EntityKind;
use roo_game::game::{Game, GameAnimations};
use roo_game::level::{load_level_from_path, TileMap};
use roo_game::render::{DrawCommand, DrawList, Overlay};
use roo_game::replay::load_replay_from_path;
use roo_overlay::{GameOverlay, HudText, OverlayStats};
use roo_platform::PlatformConfig;
use roo_render::{
    quad_corners, quad_indices, Camera2D, GpuContext, SpritePipeline, SpriteVertex, Texture,
};

const ASSET_ROOT: &str = "assets";
const DEFAULT_CONFIG_PATH: &str = "assets/config/game.json";
/// 1x1 white texture, tinted per kind when an entity's image is missing.
const SOLID_TEXTURE: &str = "__solid";

/// A contiguous run of indices that share the same texture binding.
#[derive(Debug, Clone)]
struct DrawCall {
    texture_key: Arc<str>,
    index_start: u32,
    index_count: u32,
}

struct QuadSpec<'a> {
    texture_key: &'a str,
    center_x: f32,
    center_y: f32,
    half_w: f32,
    half_h: f32,
    angle: f32,
    color: [f32; 4],
}

struct GpuSpriteTexture {
    _texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// Everything that lives only while the window exists.
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    camera: Camera2D,
    sprite_pipeline: SpritePipeline,
    overlay: GameOverlay,

    game: Game,
    music: MusicChannel,
    textures: HashMap<Arc<str>, GpuSpriteTexture>,
    mask_keys: HashMap<Overlay, Arc<str>>,

    // The mesh is rebuilt on the CPU every frame and streamed into these
    // buffers. Buffers grow (power-of-two) but never shrink.
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    /// Set when a step scrolled the viewport and the uniform is stale.
    camera_dirty: bool,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
    draw_calls: Vec<DrawCall>,
    sprite_count: usize,
    hud: Vec<HudText>,
}

impl EngineState {
    fn new(window: Arc<Window>, session: Session) -> Self {
        let Session {
            game,
            texture_keys,
        } = session;
        let config = game.config().clone();
        let screen = (config.screen.width as f32, config.screen.height as f32);

        let gpu = GpuContext::new(window.clone(), true);
        let time = TimeState::with_step(config.step_us as f64 / 1_000_000.0);
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let overlay = GameOverlay::new(&gpu.device, gpu.surface_format, &window, screen);

        let mut textures = HashMap::new();
        let solid = Texture::from_rgba8(&gpu.device, &gpu.queue, &[255; 4], 1, 1, SOLID_TEXTURE);
        let bind_group = sprite_pipeline.create_texture_bind_group(&gpu.device, &solid);
        textures.insert(
            Arc::from(SOLID_TEXTURE),
            GpuSpriteTexture {
                _texture: solid,
                bind_group,
            },
        );
        let mut missing = 0usize;
        for key in &texture_keys {
            match load_texture_asset(&gpu.device, &gpu.queue, &sprite_pipeline, key) {
                Ok(texture) => {
                    textures.insert(Arc::from(key.as_str()), texture);
                }
                Err(err) => {
                    log::warn!("{err}. Drawing a solid fallback instead.");
                    missing += 1;
                }
            }
        }
        log::info!(
            "Loaded {} of {} textures",
            texture_keys.len() - missing,
            texture_keys.len()
        );

        let mask_keys = HashMap::from([
            (Overlay::MenuMask, Arc::from(config.assets.menu_mask.as_str())),
            (Overlay::PauseMask, Arc::from(config.assets.pause_mask.as_str())),
        ]);

        let mut camera = Camera2D::new(screen.0, screen.1);
        let visible = game.draw().visible;
        camera.set_origin(visible.left, visible.bottom);
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let vertex_buffer = create_vertex_buffer(&gpu.device, 1);
        let index_buffer = create_index_buffer(&gpu.device, 1);

        Self {
            window,
            gpu,
            time,
            input: InputState::new(),
            camera,
            sprite_pipeline,
            overlay,
            music: MusicChannel::new(config.audio),
            game,
            textures,
            mask_keys,
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            camera_dirty: false,
            mesh_vertex_capacity: 0,
            mesh_index_capacity: 0,
            draw_calls: Vec::new(),
            sprite_count: 0,
            hud: Vec::new(),
        }
    }

    /// Cursor position in game screen units, origin bottom-left.
    fn cursor_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        let (win_w, win_h) = (self.gpu.size.0.max(1) as f64, self.gpu.size.1.max(1) as f64);
        let screen = &self.game.config().screen;
        (
            x * screen.width as f64 / win_w,
            (win_h - y) * screen.height as f64 / win_h,
        )
    }

    fn run_steps(&mut self) {
        while self.time.should_step() {
            let frame = self.input.take_frame();
            if let Some(visible) = self.game.step(&frame, &mut self.music) {
                self.camera.set_origin(visible.left, visible.bottom);
                self.camera_dirty = true;
            }
        }
        if self.camera_dirty {
            self.gpu.queue.write_buffer(
                &self.camera_buffer,
                0,
                bytemuck::cast_slice(&[self.camera.build_uniform()]),
            );
            self.camera_dirty = false;
        }
        self.music.advance(self.time.real_dt);
        for sfx in self.music.take_sound_effects() {
            log::debug!("Sound effect: {}", sfx.file_name());
        }
        self.music.clear_history();
        self.game.note_rendered_frame(self.time.smoothed_fps as f32);
    }

    fn build_frame(&mut self, draw: &DrawList) -> (Vec<SpriteVertex>, Vec<u32>) {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        let mut draw_calls = Vec::new();
        let mut hud = Vec::new();
        let mut sprite_count = 0usize;

        for command in &draw.commands {
            match command {
                DrawCommand::Layer(kind) => {
                    for entity in self.game.layer_entities(*kind) {
                        let loaded = self.textures.contains_key(entity.texture.as_str());
                        let (texture_key, color) = if loaded {
                            (entity.texture.as_str(), [1.0; 4])
                        } else {
                            (SOLID_TEXTURE, fallback_color(*kind))
                        };
                        add_quad(
                            &mut vertices,
                            &mut indices,
                            &mut draw_calls,
                            QuadSpec {
                                texture_key,
                                center_x: entity.center_x,
                                center_y: entity.center_y,
                                half_w: entity.half_w,
                                half_h: entity.half_h,
                                angle: entity.angle,
                                color,
                            },
                        );
                        sprite_count += 1;
                    }
                }
                DrawCommand::Texture {
                    overlay,
                    center_x,
                    center_y,
                    width,
                    height,
                } => {
                    let Some(key) = self.mask_keys.get(overlay) else {
                        continue;
                    };
                    if !self.textures.contains_key(key) {
                        continue;
                    }
                    add_quad(
                        &mut vertices,
                        &mut indices,
                        &mut draw_calls,
                        QuadSpec {
                            texture_key: key,
                            center_x: *center_x,
                            center_y: *center_y,
                            half_w: width * 0.5,
                            half_h: height * 0.5,
                            angle: 0.0,
                            color: [1.0; 4],
                        },
                    );
                    sprite_count += 1;
                }
                DrawCommand::Text { text, x, y, size } => hud.push(HudText {
                    text: text.clone(),
                    x: x - draw.visible.left,
                    y: y - draw.visible.bottom,
                    size: *size,
                }),
            }
        }

        self.draw_calls = draw_calls;
        self.sprite_count = sprite_count;
        self.hud = hud;
        (vertices, indices)
    }

    fn upload_mesh(&mut self, vertices: &[SpriteVertex], indices: &[u32]) {
        self.ensure_mesh_capacity(vertices.len(), indices.len());
        if !vertices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
            self.gpu
                .queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(indices));
        }
    }

    fn overlay_stats(&self) -> OverlayStats {
        let score = self.game.score();
        let body = &self.game.player().body;
        OverlayStats {
            draw_calls: self.draw_calls.len() as u32,
            texture_binds: count_texture_binds(&self.draw_calls) as u32,
            sprite_count: self.sprite_count as u32,
            state_label: self.game.state().label().to_string(),
            coins: score.coins,
            trees_saved: score.trees_saved,
            player_position: (body.center_x, body.center_y),
        }
    }

    fn render(&mut self) {
        let draw = self.game.draw();
        let (vertices, indices) = self.build_frame(&draw);
        self.upload_mesh(&vertices, &indices);

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let stats = self.overlay_stats();
        let (egui_primitives, egui_textures_delta) =
            self.overlay
                .prepare(&self.window, &self.time, &self.hud, Some(&stats));
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut last_bound_texture_key: Option<&Arc<str>> = None;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(draw.background_color)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            render_pass.set_pipeline(&self.sprite_pipeline.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

            for call in &self.draw_calls {
                let Some(texture) = self.textures.get(&call.texture_key) else {
                    continue;
                };
                if last_bound_texture_key.is_none_or(|last| **last != *call.texture_key) {
                    render_pass.set_bind_group(1, &texture.bind_group, &[]);
                    last_bound_texture_key = Some(&call.texture_key);
                }
                render_pass.draw_indexed(
                    call.index_start..(call.index_start + call.index_count),
                    0,
                    0..1,
                );
            }
        }

        self.overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }
}

/// A loaded game waiting for its window.
struct Session {
    game: Game,
    texture_keys: Vec<String>,
}

struct App {
    platform: PlatformConfig,
    pending: Option<Session>,
    state: Option<EngineState>,
}

impl App {
    fn new(session: Session) -> Self {
        let screen = &session.game.config().screen;
        Self {
            platform: PlatformConfig::new(screen.title.clone(), screen.width, screen.height),
            pending: Some(session),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some(session) = self.pending.take() else {
            return;
        };
        let window = roo_platform::create_window(event_loop, &self.platform);
        self.state = Some(EngineState::new(window, session));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state.overlay.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let (w, h) = (physical_size.width, physical_size.height);
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                let PhysicalKey::Code(key_code) = event.physical_key else {
                    return;
                };
                let Some(key) = map_key(key_code) else {
                    return;
                };
                match (key, event.state) {
                    (Key::F3, ElementState::Pressed) if !event.repeat => {
                        state.overlay.toggle_debug();
                    }
                    (Key::F3, _) => {}
                    (_, ElementState::Pressed) => state.input.key_down(key),
                    (_, ElementState::Released) => state.input.key_up(key),
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.input.mouse_position = state.cursor_to_screen(position.x, position.y);
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } if !egui_consumed => {
                if let Some(btn) = map_mouse_button(button) {
                    match button_state {
                        ElementState::Pressed => state.input.mouse_down(btn),
                        ElementState::Released => state.input.mouse_up(btn),
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                state.time.begin_frame();
                state.run_steps();
                state.render();
            }

            _ => {}
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn add_quad(
    vertices: &mut Vec<SpriteVertex>,
    indices: &mut Vec<u32>,
    draw_calls: &mut Vec<DrawCall>,
    spec: QuadSpec<'_>,
) {
    const UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    let corners = quad_corners(
        [spec.center_x, spec.center_y],
        spec.half_w,
        spec.half_h,
        spec.angle,
    );
    let base_index = vertices.len() as u32;
    for (position, tex_coords) in corners.into_iter().zip(UVS) {
        vertices.push(SpriteVertex {
            position,
            tex_coords,
            color: spec.color,
        });
    }

    let draw_start = indices.len() as u32;
    indices.extend_from_slice(&quad_indices(base_index));
    push_draw_call(draw_calls, Arc::from(spec.texture_key), draw_start, 6);
}

/// Append a draw call, merging with the previous one when the texture matches
/// and indices are contiguous.
fn push_draw_call(
    draw_calls: &mut Vec<DrawCall>,
    texture_key: Arc<str>,
    index_start: u32,
    index_count: u32,
) {
    if let Some(last) = draw_calls.last_mut() {
        let contiguous = last.index_start + last.index_count == index_start;
        if *last.texture_key == *texture_key && contiguous {
            last.index_count += index_count;
            return;
        }
    }
    draw_calls.push(DrawCall {
        texture_key,
        index_start,
        index_count,
    });
}

fn count_texture_binds(draw_calls: &[DrawCall]) -> usize {
    let mut binds = 0usize;
    let mut current: Option<&str> = None;
    for draw in draw_calls {
        let key: &str = &draw.texture_key;
        if current != Some(key) {
            current = Some(key);
            binds += 1;
        }
    }
    binds
}

fn load_texture_asset(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    pipeline: &SpritePipeline,
    key: &str,
) -> Result<GpuSpriteTexture, String> {
    let path = Path::new(ASSET_ROOT).join(key);
    let bytes = std::fs::read(&path)
        .map_err(|e| format!("Failed to read texture '{}': {e}", path.display()))?;
    let texture = Texture::from_bytes(device, queue, &bytes, key)?;
    let bind_group = pipeline.create_texture_bind_group(device, &texture);
    Ok(GpuSpriteTexture {
        _texture: texture,
        bind_group,
    })
}

/// Stand-in tint for an entity whose image failed to load.
fn fallback_color(kind: EntityKind) -> [f32; 4] {
    match kind {
        EntityKind::Background => [0.55, 0.75, 0.95, 1.0],
        EntityKind::Wall => [0.35, 0.30, 0.28, 1.0],
        EntityKind::Platform => [0.45, 0.35, 0.25, 1.0],
        EntityKind::Npc => [0.30, 0.70, 0.35, 1.0],
        EntityKind::Coin => [0.95, 0.80, 0.15, 1.0],
        EntityKind::Ice => [0.70, 0.90, 1.00, 1.0],
        EntityKind::Laser => [1.00, 0.20, 0.20, 1.0],
        EntityKind::Player => [0.50, 0.50, 0.55, 1.0],
    }
}

/// The surface is sRGB, so the clear colour is given in linear space.
fn clear_color([r, g, b]: [u8; 3]) -> wgpu::Color {
    fn linear(c: u8) -> f64 {
        let c = c as f64 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }
    wgpu::Color {
        r: linear(r),
        g: linear(g),
        b: linear(b),
        a: 1.0,
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Space => Some(Key::Space),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyD => Some(Key::D),
        _ => None,
    }
}

fn map_mouse_button(button: MouseButton) -> Option<MouseBtn> {
    match button {
        MouseButton::Left => Some(MouseBtn::Left),
        MouseButton::Right => Some(MouseBtn::Right),
        MouseButton::Middle => Some(MouseBtn::Middle),
        _ => None,
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn load_config() -> GameConfig {
    let (path, required) = match env_path("ROO_CONFIG") {
        Some(path) => (path, true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };
    if !required && !path.exists() {
        log::info!("No config at '{}', using defaults", path.display());
        return GameConfig::default();
    }
    let config = load_config_from_path(&path)
        .unwrap_or_else(|err| panic!("Failed to load config '{}': {}", path.display(), err));
    log::info!("Loaded config '{}'", path.display());
    config
}

/// Every image the level and animations can show, plus the overlay masks.
fn collect_texture_keys(
    map: &TileMap,
    animations: &GameAnimations,
    config: &GameConfig,
) -> Vec<String> {
    let mut keys = BTreeSet::new();
    let kinds = [
        EntityKind::Background,
        EntityKind::Wall,
        EntityKind::Platform,
        EntityKind::Npc,
        EntityKind::Coin,
        EntityKind::Ice,
    ];
    for name in kinds.iter().filter_map(|k| k.layer_name()) {
        if let Some(layer) = map.layer(name) {
            keys.extend(layer.cells().map(|c| c.texture.clone()));
        }
    }
    for set in [&animations.player, &animations.laser] {
        keys.extend(set.textures().into_iter().map(str::to_string));
    }
    keys.insert(config.assets.menu_mask.clone());
    keys.insert(config.assets.pause_mask.clone());
    keys.into_iter().collect()
}

fn load_session() -> Session {
    let mut config = load_config();
    if let Some(level) = env_path("ROO_LEVEL") {
        config.assets.level = level.display().to_string();
    }

    let level_path = PathBuf::from(&config.assets.level);
    let map = load_level_from_path(&level_path).unwrap_or_else(|err| {
        panic!("Failed to load level '{}': {}", level_path.display(), err);
    });
    let load_set = |path: &str| {
        load_animation_set(Path::new(path))
            .map(Arc::new)
            .unwrap_or_else(|err| panic!("Failed to load animations '{}': {}", path, err))
    };
    let animations = GameAnimations {
        player: load_set(&config.assets.player_animations),
        laser: load_set(&config.assets.laser_animations),
    };

    let texture_keys = collect_texture_keys(&map, &animations, &config);
    let game = Game::setup(config, &map, animations)
        .unwrap_or_else(|err| panic!("Failed to set up level: {}", err));
    Session {
        game,
        texture_keys,
    }
}

fn run_replay(path: &Path, mut game: Game) {
    let replay = load_replay_from_path(path)
        .unwrap_or_else(|err| panic!("Failed to load replay '{}': {}", path.display(), err));
    let mut music = MusicChannel::new(game.config().audio);
    let outcome = replay
        .run(&mut game, &mut music)
        .unwrap_or_else(|err| panic!("Replay '{}' failed: {}", path.display(), err));
    log::info!(
        "Replay '{}' finished after {} steps in state {}: coins {}, trees saved {}, player at ({:.1}, {:.1})",
        path.display(),
        outcome.steps,
        game.state().label(),
        outcome.coins,
        outcome.trees_saved,
        outcome.player_x,
        outcome.player_y
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("ROCK & R.O.O. starting...");
    let session = load_session();

    if let Some(replay_path) = env_path("ROO_REPLAY") {
        run_replay(&replay_path, session.game);
        return;
    }

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(session);
    event_loop.run_app(&mut app).expect("Event loop error");
}
