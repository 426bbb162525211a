//! Free-fly camera.
//!
//! Orientation is kept as two Euler angles (yaw around world Y, pitch above
//! the horizon) that mouse motion adds to; keys move the position along the
//! resulting axes, integrated with the frame time.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Vec2, Vec3};
use sdl2::keyboard::Keycode;

use crate::config::CameraConfig;
use crate::input::InputState;

/// Keeps the view from flipping over at the poles.
const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;
const MIN_FOV_DEGREES: f32 = 20.0;
const MAX_FOV_DEGREES: f32 = 90.0;
/// Degrees of field of view per wheel notch.
const ZOOM_STEP_DEGREES: f32 = 2.0;

/// Directions to move in during one update.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Movement {
    pub fn from_input(input: &InputState) -> Self {
        Self {
            forward: input.any_down(&[Keycode::W, Keycode::Up]),
            back: input.any_down(&[Keycode::S, Keycode::Down]),
            left: input.any_down(&[Keycode::A, Keycode::Left]),
            right: input.any_down(&[Keycode::D, Keycode::Right]),
            up: input.is_down(Keycode::Space),
            down: input.is_down(Keycode::LShift),
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlyCamera {
    pub position: Vec3,
    /// Radians; 0 looks down +Z, PI looks down -Z.
    pub yaw: f32,
    /// Radians above the horizon.
    pub pitch: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub speed: f32,
    pub mouse_speed: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            yaw: PI,
            pitch: 0.0,
            fov: 45f32.to_radians(),
            speed: 3.0,
            mouse_speed: 0.005,
            aspect: 4.0 / 3.0,
            z_near: 0.1,
            z_far: 100.0,
        }
    }
}

impl FlyCamera {
    /// Builds a camera at `config.position` facing `config.look_at`.
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            position: Vec3::from(config.position),
            fov: config
                .fov_degrees
                .clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES)
                .to_radians(),
            speed: config.speed,
            mouse_speed: config.mouse_speed,
            aspect,
            z_near: config.z_near,
            z_far: config.z_far,
            ..Self::default()
        };
        camera.look_at(Vec3::from(config.look_at));
        camera
    }

    /// Points the camera at `target`. A target at the camera position keeps the old angles.
    pub fn look_at(&mut self, target: Vec3) {
        let Some(dir) = (target - self.position).try_normalize() else {
            return;
        };
        self.pitch = dir.y.asin().clamp(-MAX_PITCH, MAX_PITCH);
        self.yaw = dir.x.atan2(dir.z);
    }

    pub fn direction(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        )
    }

    pub fn right(&self) -> Vec3 {
        Vec3::new((self.yaw - FRAC_PI_2).sin(), 0.0, (self.yaw - FRAC_PI_2).cos())
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.direction())
    }

    /// Applies a mouse delta in pixels. Moving right turns right, moving down looks down.
    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw = (self.yaw - self.mouse_speed * delta.x).rem_euclid(2.0 * PI);
        self.pitch = (self.pitch - self.mouse_speed * delta.y).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Moves along the view axes for `dt` seconds.
    pub fn translate(&mut self, movement: Movement, dt: f32) {
        let step = dt * self.speed;
        let mut offset = Vec3::ZERO;
        if movement.forward {
            offset += self.direction();
        }
        if movement.back {
            offset -= self.direction();
        }
        if movement.right {
            offset += self.right();
        }
        if movement.left {
            offset -= self.right();
        }
        if movement.up {
            offset += Vec3::Y;
        }
        if movement.down {
            offset -= Vec3::Y;
        }
        self.position += offset * step;
    }

    /// Narrows the field of view for positive scroll, widens it for negative.
    pub fn zoom(&mut self, scroll: f32) {
        let degrees = (self.fov.to_degrees() - scroll * ZOOM_STEP_DEGREES)
            .clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES);
        self.fov = degrees.to_radians();
    }

    /// Integrates one frame of input. Mouse look only applies while the cursor is grabbed.
    pub fn update(&mut self, input: &InputState, dt: f32, mouse_look: bool) {
        if mouse_look {
            self.rotate(input.mouse.delta);
        }
        if input.mouse.scroll_delta.y != 0.0 {
            self.zoom(input.mouse.scroll_delta.y);
        }
        let movement = Movement::from_input(input);
        if !movement.is_idle() {
            self.translate(movement, dt);
        }
    }

    /// Adapts the projection to a new window size. Minimized windows are ignored.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.direction(), self.up())
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect, self.z_near, self.z_far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// The transform for a model placed with `model`.
    pub fn mvp(&self, model: Mat4) -> Mat4 {
        self.view_projection() * model
    }
}
