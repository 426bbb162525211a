use std::collections::HashSet;

use glam::Vec2;
use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
    mouse::MouseButton,
};

/// The current state of the keyboard.
#[derive(Debug, Default)]
pub struct KeyboardState {
    pub down: HashSet<Keycode>,
    pub pressed: HashSet<Keycode>,
}

/// The current state of the mouse.
#[derive(Debug, Default)]
pub struct MouseState {
    pub position: Vec2,
    pub delta: Vec2,
    pub scroll_delta: Vec2,
    pub pressed: HashSet<MouseButton>,
}

/// Keyboard and mouse state accumulated over one frame.
#[derive(Debug, Default)]
pub struct InputState {
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
}

impl InputState {
    /// Forgets everything that only lasts one frame. Held keys stay down.
    pub fn begin_frame(&mut self) {
        self.mouse.delta = Vec2::ZERO;
        self.mouse.scroll_delta = Vec2::ZERO;
        self.mouse.pressed.clear();
        self.keyboard.pressed.clear();
    }

    /// Folds one SDL event into the state.
    pub fn handle_event(&mut self, event: &Event) {
        match *event {
            Event::KeyDown {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => self.key_down(keycode),
            Event::KeyUp {
                keycode: Some(keycode),
                ..
            } => self.key_up(keycode),
            Event::MouseMotion {
                x, y, xrel, yrel, ..
            } => self.mouse_moved(
                Vec2::new(x as f32, y as f32),
                Vec2::new(xrel as f32, yrel as f32),
            ),
            Event::MouseWheel { x, y, .. } => {
                self.mouse.scroll_delta += Vec2::new(x as f32, y as f32);
            }
            Event::MouseButtonDown { mouse_btn, .. } => {
                self.mouse.pressed.insert(mouse_btn);
            }
            // Focus loss would otherwise leave keys stuck down.
            Event::Window {
                win_event: WindowEvent::FocusLost,
                ..
            } => self.keyboard.down.clear(),
            _ => {}
        }
    }

    pub fn key_down(&mut self, keycode: Keycode) {
        if self.keyboard.down.insert(keycode) {
            self.keyboard.pressed.insert(keycode);
        }
    }

    pub fn key_up(&mut self, keycode: Keycode) {
        self.keyboard.down.remove(&keycode);
    }

    /// Several motion events may arrive in one frame; their deltas add up.
    pub fn mouse_moved(&mut self, position: Vec2, delta: Vec2) {
        self.mouse.position = position;
        self.mouse.delta += delta;
    }

    pub fn is_down(&self, keycode: Keycode) -> bool {
        self.keyboard.down.contains(&keycode)
    }

    pub fn any_down(&self, keycodes: &[Keycode]) -> bool {
        keycodes.iter().any(|k| self.is_down(*k))
    }

    pub fn was_pressed(&self, keycode: Keycode) -> bool {
        self.keyboard.pressed.contains(&keycode)
    }

    pub fn was_clicked(&self, button: MouseButton) -> bool {
        self.mouse.pressed.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use sdl2::keyboard::Mod;
    use sdl2::mouse::MouseWheelDirection;

    use super::*;

    fn key_down(keycode: Keycode, repeat: bool) -> Event {
        Event::KeyDown {
            timestamp: 0,
            window_id: 1,
            keycode: Some(keycode),
            scancode: None,
            keymod: Mod::NOMOD,
            repeat,
        }
    }

    fn key_up(keycode: Keycode) -> Event {
        Event::KeyUp {
            timestamp: 0,
            window_id: 1,
            keycode: Some(keycode),
            scancode: None,
            keymod: Mod::NOMOD,
            repeat: false,
        }
    }

    fn motion(x: i32, y: i32, xrel: i32, yrel: i32) -> Event {
        Event::MouseMotion {
            timestamp: 0,
            window_id: 1,
            which: 0,
            mousestate: sdl2::mouse::MouseState::from_sdl_state(0),
            x,
            y,
            xrel,
            yrel,
        }
    }

    fn wheel(y: i32) -> Event {
        Event::MouseWheel {
            timestamp: 0,
            window_id: 1,
            which: 0,
            x: 0,
            y,
            direction: MouseWheelDirection::Normal,
            precise_x: 0.0,
            precise_y: y as f32,
            mouse_x: 0,
            mouse_y: 0,
        }
    }

    fn button_down(mouse_btn: MouseButton) -> Event {
        Event::MouseButtonDown {
            timestamp: 0,
            window_id: 1,
            which: 0,
            mouse_btn,
            clicks: 1,
            x: 0,
            y: 0,
        }
    }

    #[test]
    fn test_pressed_lasts_one_frame() {
        let mut input = InputState::default();
        input.handle_event(&key_down(Keycode::W, false));
        assert!(input.is_down(Keycode::W));
        assert!(input.was_pressed(Keycode::W));

        input.begin_frame();
        assert!(input.is_down(Keycode::W));
        assert!(!input.was_pressed(Keycode::W));

        input.handle_event(&key_up(Keycode::W));
        assert!(!input.is_down(Keycode::W));
    }

    #[test]
    fn test_key_repeats_are_ignored() {
        let mut input = InputState::default();
        input.handle_event(&key_down(Keycode::Tab, false));
        input.begin_frame();

        input.handle_event(&key_down(Keycode::Tab, true));
        assert!(!input.was_pressed(Keycode::Tab));
        assert!(input.is_down(Keycode::Tab));

        // A repeat without a preceding press does not count either.
        input.handle_event(&key_down(Keycode::Escape, true));
        assert!(!input.is_down(Keycode::Escape));
        assert!(!input.was_pressed(Keycode::Escape));
    }

    #[test]
    fn test_focus_lost_releases_held_keys() {
        let mut input = InputState::default();
        input.handle_event(&key_down(Keycode::W, false));
        input.handle_event(&key_down(Keycode::LShift, false));
        input.handle_event(&Event::Window {
            timestamp: 0,
            window_id: 1,
            win_event: WindowEvent::FocusLost,
        });
        assert!(!input.any_down(&[Keycode::W, Keycode::LShift]));
    }

    #[test]
    fn test_mouse_deltas_accumulate_until_next_frame() {
        let mut input = InputState::default();
        input.handle_event(&motion(10, 10, 3, -1));
        input.handle_event(&motion(12, 9, 2, -1));
        assert_eq!(input.mouse.delta, Vec2::new(5.0, -2.0));
        assert_eq!(input.mouse.position, Vec2::new(12.0, 9.0));

        input.begin_frame();
        assert_eq!(input.mouse.delta, Vec2::ZERO);
        assert_eq!(input.mouse.position, Vec2::new(12.0, 9.0));
    }

    #[test]
    fn test_wheel_accumulates_until_next_frame() {
        let mut input = InputState::default();
        input.handle_event(&wheel(1));
        input.handle_event(&wheel(2));
        assert_eq!(input.mouse.scroll_delta, Vec2::new(0.0, 3.0));

        input.begin_frame();
        assert_eq!(input.mouse.scroll_delta, Vec2::ZERO);
    }

    #[test]
    fn test_clicks_last_one_frame() {
        let mut input = InputState::default();
        input.handle_event(&button_down(MouseButton::Left));
        assert!(input.was_clicked(MouseButton::Left));
        assert!(!input.was_clicked(MouseButton::Right));

        input.begin_frame();
        assert!(!input.was_clicked(MouseButton::Left));
    }

    #[test]
    fn test_any_down() {
        let mut input = InputState::default();
        input.key_down(Keycode::Up);
        assert!(input.any_down(&[Keycode::W, Keycode::Up]));
        assert!(!input.any_down(&[Keycode::S, Keycode::Down]));
    }

    #[test]
    fn test_quit_event_is_ignored() {
        let mut input = InputState::default();
        input.key_down(Keycode::A);
        input.handle_event(&Event::Quit { timestamp: 0 });
        assert!(input.is_down(Keycode::A));
    }
}
