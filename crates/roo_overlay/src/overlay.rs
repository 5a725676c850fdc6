//! egui layer drawn after the sprite pass.
//!
//! It carries two things: HUD text, which the game always shows, and a debug
//! panel toggled with F3. Rendering is split into phases because
//! `egui_wgpu::Renderer::render()` wants a `RenderPass<'static>` while the
//! upload step borrows the encoder:
//!
//!   1. `prepare()` -- lay out the frame, produce tessellated primitives
//!   2. `upload()`  -- push textures and buffers (borrows encoder mutably)
//!   3. `paint()`   -- draw into a pass opened with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui dropped this frame

use roo_core::time::TimeState;
use winit::window::Window;

/// Text in game screen units: origin bottom-left, y up, `x`/`y` marking the
/// text's bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct HudText {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub draw_calls: u32,
    pub texture_binds: u32,
    pub sprite_count: u32,
    pub state_label: String,
    pub coins: u32,
    pub trees_saved: u32,
    pub player_position: (f32, f32),
}

pub struct GameOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub debug_visible: bool,
    /// Size of the game screen that HUD coordinates refer to.
    screen_size: (f32, f32),
}

impl GameOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
        screen_size: (f32, f32),
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            debug_visible: false,
            screen_size,
        }
    }

    /// Returns true when egui consumed the event.
    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_winit_state.on_window_event(window, event).consumed
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
        log::info!(
            "Debug panel: {}",
            if self.debug_visible { "ON" } else { "OFF" }
        );
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        time: &TimeState,
        hud: &[HudText],
        stats: Option<&OverlayStats>,
    ) -> (Vec<egui::ClippedPrimitive>, egui::TexturesDelta) {
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let screen_size = self.screen_size;
        let debug_visible = self.debug_visible;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            paint_hud(ctx, screen_size, hud);

            if !debug_visible {
                return;
            }
            egui::Window::new("Debug")
                .default_pos([10.0, 60.0])
                .show(ctx, |ui| {
                    ui.label(format!("FPS: {:.1}", time.smoothed_fps));
                    ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
                    ui.label(format!("Steps this frame: {}", time.steps_this_frame));
                    ui.label(format!("Total steps: {}", time.fixed_step_count));
                    if let Some(stats) = stats {
                        ui.separator();
                        ui.label(format!("State: {}", stats.state_label));
                        ui.label(format!(
                            "Player: ({:.1}, {:.1})",
                            stats.player_position.0, stats.player_position.1
                        ));
                        ui.label(format!(
                            "Coins: {}  Trees: {}",
                            stats.coins, stats.trees_saved
                        ));
                        ui.separator();
                        ui.label(format!("Sprites: {}", stats.sprite_count));
                        ui.label(format!("Draw calls: {}", stats.draw_calls));
                        ui.label(format!("Texture binds: {}", stats.texture_binds));
                    }
                });
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn paint_hud(ctx: &egui::Context, screen_size: (f32, f32), hud: &[HudText]) {
    if hud.is_empty() {
        return;
    }
    let rect = ctx.screen_rect();
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("roo_hud"),
    ));
    for item in hud {
        let (pos, scale) = hud_to_points(item, screen_size, rect);
        painter.text(
            pos,
            egui::Align2::LEFT_BOTTOM,
            &item.text,
            egui::FontId::proportional(item.size * scale),
            egui::Color32::BLACK,
        );
    }
}

/// Map a HUD anchor from game screen units to egui points and return the
/// vertical scale for the font.
fn hud_to_points(item: &HudText, screen_size: (f32, f32), rect: egui::Rect) -> (egui::Pos2, f32) {
    let sx = rect.width() / screen_size.0;
    let sy = rect.height() / screen_size.1;
    let pos = egui::pos2(rect.left() + item.x * sx, rect.bottom() - item.y * sy);
    (pos, sy)
}
