//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application.

use std::sync::Arc;

use crate::config::WindowConfig;
use crate::error::{Error, Result};

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
///
/// Field order matters: GL objects owned elsewhere must be dropped before this
/// struct, and the GL context is dropped before `window`.
pub struct App {
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
    pub _gl_context: sdl2::video::GLContext,
    pub window: sdl2::video::Window,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub sdl: sdl2::Sdl,
}

impl App {
    /// Creates the window and an OpenGL 3.3 core context for it.
    pub fn new(config: &WindowConfig) -> Result<Self> {
        let sdl = sdl2::init().map_err(Error::Platform)?;
        let video_subsystem = sdl.video().map_err(Error::Platform)?;

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        gl_attr.set_context_flags().forward_compatible().set();
        if config.samples > 0 {
            gl_attr.set_multisample_buffers(1);
            gl_attr.set_multisample_samples(config.samples);
        }
        gl_attr.set_depth_size(24);

        let window = video_subsystem
            .window(&config.title, config.width, config.height)
            .opengl()
            .resizable()
            .position_centered()
            .build()
            .map_err(|e| Error::Platform(e.to_string()))?;

        let gl_context = window.gl_create_context().map_err(Error::Platform)?;
        window
            .gl_make_current(&gl_context)
            .map_err(Error::Platform)?;

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(Error::Platform)?;

        log::info!(
            target: "main",
            "Window \"{}\" created: {}x{}, OpenGL {:?}",
            config.title,
            config.width,
            config.height,
            gl_attr.context_version()
        );

        let app = Self {
            gl: Arc::new(gl),
            event_pump,
            _gl_context: gl_context,
            window,
            video_subsystem,
            sdl,
        };
        app.set_vsync(config.vsync);
        Ok(app)
    }

    /// Turns vertical sync on or off. Failure is only logged, the driver may refuse.
    pub fn set_vsync(&self, enabled: bool) {
        let interval = if enabled {
            sdl2::video::SwapInterval::VSync
        } else {
            sdl2::video::SwapInterval::Immediate
        };
        if let Err(e) = self.video_subsystem.gl_set_swap_interval(interval) {
            log::warn!(target: "main", "Could not set swap interval: {e}");
        }
    }

    /// Captures the mouse for relative motion, or releases it.
    pub fn set_mouse_grab(&mut self, grabbed: bool) {
        self.sdl.mouse().set_relative_mouse_mode(grabbed);
        self.window.set_grab(grabbed);
    }

    /// Current drawable size in pixels.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }

    pub fn swap(&self) {
        self.window.gl_swap_window();
    }
}
