use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use room_wave::config::{CELL_SCALE, STEPS_PER_FRAME};
use room_wave::simulation::{Engine, RoomDefinition};

use crate::gpu::{FieldBuffers, FieldRenderer, GpuContext};

/// The viewer: owns the engine, drives it at a fixed number of ticks per
/// frame, and forwards mouse and keyboard input to it. All simulation
/// semantics live in the engine; this is presentation glue.
pub struct App {
    engine: Engine,
    room_path: Option<PathBuf>,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    buffers: Option<FieldBuffers>,
    renderer: Option<FieldRenderer>,
    cursor: Option<PhysicalPosition<f64>>,
    maps_dirty: bool,
    ticks: TickCounter,
}

impl App {
    pub fn new(engine: Engine, room_path: Option<PathBuf>) -> Self {
        Self {
            engine,
            room_path,
            window: None,
            gpu: None,
            buffers: None,
            renderer: None,
            cursor: None,
            maps_dirty: true,
            ticks: TickCounter::new(),
        }
    }

    fn render(&mut self) {
        let gpu = self.gpu.as_ref().unwrap();
        let buffers = self.buffers.as_mut().unwrap();
        let renderer = self.renderer.as_ref().unwrap();

        for _ in 0..STEPS_PER_FRAME {
            self.engine.step();
        }
        if self.engine.is_running() {
            self.ticks.add(STEPS_PER_FRAME);
        }

        if self.maps_dirty {
            buffers.upload_cells(&gpu.queue, self.engine.obstacles(), self.engine.materials());
            self.maps_dirty = false;
        }
        buffers.upload_pressure(&gpu.queue, self.engine.pressure_field());

        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        let bind_group = renderer.create_bind_group(
            &gpu.device,
            &buffers.pressure_buffer,
            &buffers.cell_buffer,
            &buffers.view_params_buffer,
        );
        renderer.draw(&mut encoder, &view, &bind_group);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(rate) = self.ticks.tick() {
            self.update_title(rate);
        }
    }

    fn update_title(&self, ticks_per_second: f64) {
        if let Some(window) = &self.window {
            let mode = if self.engine.is_realism_mode() {
                "Realism"
            } else {
                "Ideal"
            };
            let state = if self.engine.is_running() {
                format!("{ticks_per_second:.0} ticks/s")
            } else {
                "paused".to_string()
            };
            let sources = if self.engine.is_dual_mode() {
                " [Dual]"
            } else {
                ""
            };
            window.set_title(&format!("Room Wave - {mode} mode{sources} - {state}"));
        }
    }

    /// Map the last-seen cursor position to a grid cell.
    fn cursor_cell(&self) -> Option<(i32, i32)> {
        let cursor = self.cursor?;
        let window = self.window.as_ref()?;
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return None;
        }
        let x = cursor.x / size.width as f64 * self.engine.width() as f64;
        let y = cursor.y / size.height as f64 * self.engine.height() as f64;
        Some((x as i32, y as i32))
    }

    fn reload_room(&mut self) {
        let Some(path) = &self.room_path else {
            log::warn!("No room file to reload; pass one on the command line");
            return;
        };
        match RoomDefinition::from_file(path) {
            Ok(room) => {
                self.engine.load_room(&room);
                self.maps_dirty = true;
                log::info!(
                    "Reloaded room {} ({}x{})",
                    path.display(),
                    room.width(),
                    room.height()
                );
            }
            Err(err) => log::error!("Failed to reload room {}: {err}", path.display()),
        }
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        match key_code {
            KeyCode::Space => {
                if self.engine.is_running() {
                    self.engine.stop();
                } else {
                    self.engine.start();
                }
                self.update_title(0.0);
            }
            KeyCode::KeyM => {
                let realism = !self.engine.is_realism_mode();
                self.engine.set_realism_mode(realism);
                log::info!(
                    "Switched to {} mode",
                    if realism { "realism" } else { "ideal" }
                );
            }
            KeyCode::KeyD => {
                let dual = !self.engine.is_dual_mode();
                self.engine.set_dual_mode(dual);
                log::info!("Dual-source mode: {}", if dual { "ON" } else { "OFF" });
            }
            KeyCode::KeyC => {
                self.engine.clear();
                log::info!("Cleared pressure field");
            }
            KeyCode::KeyR => self.reload_room(),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = (self.engine.width() as u32, self.engine.height() as u32);
        log::info!("Room Wave starting, grid {}x{}", width, height);

        let window_attrs = Window::default_attributes()
            .with_title("Room Wave")
            .with_inner_size(winit::dpi::LogicalSize::new(
                width * CELL_SCALE,
                height * CELL_SCALE,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        let gpu = pollster::block_on(GpuContext::new(window.clone()));
        let buffers = FieldBuffers::new(&gpu.device, width, height);
        let renderer = FieldRenderer::new(&gpu.device, gpu.format());

        log::info!("Controls:");
        log::info!("  Click: place a sound source");
        log::info!("  Space: pause/resume  M: ideal/realism  D: dual sources");
        log::info!("  C: clear waves  R: reload room  Escape: quit");

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.buffers = Some(buffers);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(position);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if let Some((x, y)) = self.cursor_cell() {
                    self.engine.set_source_position(x, y);
                    log::info!("Source placed at ({x}, {y})");
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Counts engine ticks and reports the rate once a second.
struct TickCounter {
    last_update: Instant,
    ticks: u32,
}

impl TickCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            ticks: 0,
        }
    }

    fn add(&mut self, ticks: u32) {
        self.ticks += ticks;
    }

    fn tick(&mut self) -> Option<f64> {
        let elapsed = self.last_update.elapsed();
        if elapsed.as_secs_f64() >= 1.0 {
            let rate = self.ticks as f64 / elapsed.as_secs_f64();
            self.ticks = 0;
            self.last_update = Instant::now();
            Some(rate)
        } else {
            None
        }
    }
}
