use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use glam::Mat4;
use glow::HasContext;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;

use crate::abs::*;
use crate::camera::FlyCamera;
use crate::config::Config;
use crate::error::Result;
use crate::input::InputState;

mod abs;
mod camera;
mod config;
mod error;
mod input;
mod logging;
mod obj;

/// Size and cell count of the texture drawn when none is configured.
const FALLBACK_TEXTURE_SIZE: u32 = 256;
const FALLBACK_TEXTURE_CELLS: u32 = 8;

fn main() {
    let (config, config_path) = match Config::discover(std::env::args().skip(1)) {
        Ok(found) => found,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(-1);
        }
    };

    if let Err(e) = logging::init(&config.log_level, config.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(-1);
    }

    log::info!(target: "main", "Hello! Startup. meshfly v{}", env!("CARGO_PKG_VERSION"));
    match config_path {
        Some(path) => log::info!(target: "main", "Using configuration {}", path.display()),
        None => log::info!(target: "main", "No configuration file, using defaults"),
    }

    if let Err(e) = run(&config) {
        log::error!(target: "main", "{e}");
        log::logger().flush();
        std::process::exit(-1);
    }

    log::info!(target: "main", "Goodbye.");
}

fn run(config: &Config) -> Result<()> {
    let mut app = App::new(&config.window)?;

    unsafe {
        let [r, g, b, a] = config.window.clear_color;
        app.gl.clear_color(r, g, b, a);
        app.gl.enable(glow::DEPTH_TEST);
        app.gl.depth_func(glow::LESS);
        app.gl.enable(glow::CULL_FACE);
        app.gl.cull_face(glow::BACK);
        app.gl.front_face(glow::CCW);
        if config.window.samples > 0 {
            app.gl.enable(glow::MULTISAMPLE);
        }
    }

    let program = ShaderProgram::from_files(
        &app.gl,
        &config.assets.vertex_shader,
        &config.assets.fragment_shader,
    )?;
    let mvp_location = program.uniform_location("MVP");
    let sampler_location = program.uniform_location("texture_sampler");

    let object = obj::load_obj(&config.assets.object)?;
    let mesh = GpuMesh::new(&app.gl, &object)?;
    let texture = load_texture(&app.gl, config.assets.texture.as_deref())?;

    let (width, height) = app.drawable_size();
    unsafe {
        app.gl.viewport(0, 0, width as i32, height as i32);
    }
    let mut camera = FlyCamera::from_config(&config.camera, width as f32 / height.max(1) as f32);

    let mut input = InputState::default();
    let mut grabbed = true;
    app.set_mouse_grab(grabbed);

    let mut stats = FrameStats::new(config.stats_interval);
    let mut last_frame_time = Instant::now();

    log::info!(
        target: "main",
        "Entering render loop: {} vertices. WASD/arrows move, Space/LShift rise/sink, Tab releases the mouse, click grabs it, Esc quits",
        mesh.vertex_count()
    );

    'running: loop {
        let now = Instant::now();
        let dt = now.duration_since(last_frame_time).as_secs_f32().min(0.25);
        last_frame_time = now;

        input.begin_frame();
        let events: Vec<Event> = app.event_pump.poll_iter().collect();
        for event in &events {
            input.handle_event(event);
            match event {
                Event::Quit { .. } => break 'running,
                Event::Window {
                    win_event: WindowEvent::SizeChanged(..),
                    ..
                } => {
                    let (width, height) = app.drawable_size();
                    unsafe {
                        app.gl.viewport(0, 0, width as i32, height as i32);
                    }
                    camera.set_aspect(width, height);
                    log::debug!(target: "main", "Resized to {width}x{height}");
                }
                _ => {}
            }
        }

        if input.was_pressed(Keycode::Escape) {
            log::info!(target: "main", "Escape pressed");
            break 'running;
        }
        if input.was_pressed(Keycode::Tab) {
            grabbed = !grabbed;
            app.set_mouse_grab(grabbed);
        } else if !grabbed && input.was_clicked(MouseButton::Left) {
            grabbed = true;
            app.set_mouse_grab(grabbed);
        }

        camera.update(&input, dt, grabbed);

        unsafe {
            app.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
        program.use_program();
        program.set_uniform_at(mvp_location.as_ref(), camera.mvp(Mat4::IDENTITY));
        texture.bind_to_unit(0);
        program.set_uniform_at(sampler_location.as_ref(), 0);
        mesh.draw();

        app.swap();

        if let Some((frames, ms_per_frame)) = stats.tick(dt) {
            log::debug!(
                target: "main",
                "{frames} frames, {ms_per_frame:.3} ms/frame, camera at {:.2}",
                camera.position
            );
        }
    }

    app.set_mouse_grab(false);
    Ok(())
}

/// Loads the configured texture; any failure falls back to a checkerboard.
fn load_texture(gl: &Arc<glow::Context>, path: Option<&Path>) -> Result<Texture> {
    if let Some(path) = path {
        match Texture::from_path(gl, path) {
            Ok(texture) => return Ok(texture),
            Err(e) => log::warn!(target: "main", "{e}; using a checkerboard instead"),
        }
    }
    Texture::checkerboard(gl, FALLBACK_TEXTURE_SIZE, FALLBACK_TEXTURE_CELLS)
}

/// Counts frames and reports an average every `interval` seconds.
struct FrameStats {
    interval: f32,
    elapsed: f32,
    frames: u32,
}

impl FrameStats {
    fn new(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
            frames: 0,
        }
    }

    /// Returns `(frames, milliseconds per frame)` when an interval has passed.
    fn tick(&mut self, dt: f32) -> Option<(u32, f32)> {
        if self.interval <= 0.0 {
            return None;
        }
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return None;
        }
        let report = (self.frames, self.elapsed * 1000.0 / self.frames as f32);
        self.frames = 0;
        self.elapsed = 0.0;
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_stats_report_once_per_interval() {
        let mut stats = FrameStats::new(1.0);
        for _ in 0..3 {
            assert_eq!(stats.tick(0.25), None);
        }
        let (frames, ms) = stats.tick(0.25).unwrap();
        assert_eq!(frames, 4);
        assert!((ms - 250.0).abs() < 1e-3);
        assert_eq!(stats.tick(0.25), None);
    }

    #[test]
    fn test_frame_stats_disabled() {
        let mut stats = FrameStats::new(0.0);
        assert_eq!(stats.tick(10.0), None);
    }
}
