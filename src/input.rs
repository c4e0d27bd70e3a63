//! Input capture and consumption.
//!
//! winit callbacks only translate their events into [`InputEvent`]s and push
//! them onto an [`InputQueue`]. The frame loop drains the queue once per
//! iteration and feeds every event through [`InputState::handle`], which keeps
//! track of held keys and applies mouse look and zoom to the camera. Held keys
//! turn into camera moves through [`InputState::apply_held_keys`].

use std::collections::{HashSet, VecDeque};

use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::camera::{Camera, CameraDirection};

/// Pixels of touchpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Key { code: KeyCode, pressed: bool },
    MouseMotion { dx: f64, dy: f64 },
    Scroll { lines: f32 },
    Resized { width: u32, height: u32 },
    Focused(bool),
    CloseRequested,
}

impl InputEvent {
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => Some(InputEvent::Key {
                code: *code,
                pressed: *state == ElementState::Pressed,
            }),
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
                };
                Some(InputEvent::Scroll { lines })
            }
            WindowEvent::Resized(size) => Some(InputEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::Focused(focused) => Some(InputEvent::Focused(*focused)),
            WindowEvent::CloseRequested => Some(InputEvent::CloseRequested),
            _ => None,
        }
    }

    pub fn from_device_event(event: &DeviceEvent) -> Option<Self> {
        match event {
            DeviceEvent::MouseMotion { delta: (dx, dy) } => Some(InputEvent::MouseMotion { dx: *dx, dy: *dy }),
            _ => None,
        }
    }
}

/// FIFO of captured events waiting for the next frame.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every queued event in arrival order, leaving the queue empty.
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }
}

/// Requests for the window that come out of input handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowRequest {
    Close,
    ToggleFullscreen,
    Resize { width: u32, height: u32 },
    /// Focus came back; take the cursor again.
    GrabCursor,
}

const MOVE_BINDINGS: [(KeyCode, CameraDirection); 8] = [
    (KeyCode::KeyW, CameraDirection::Forward),
    (KeyCode::KeyS, CameraDirection::Backward),
    (KeyCode::KeyA, CameraDirection::Left),
    (KeyCode::KeyD, CameraDirection::Right),
    (KeyCode::KeyQ, CameraDirection::Up),
    (KeyCode::KeyE, CameraDirection::Down),
    (KeyCode::KeyC, CameraDirection::Clockwise),
    (KeyCode::KeyZ, CameraDirection::Anticlockwise),
];

const FAST_KEY: KeyCode = KeyCode::ShiftLeft;

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<KeyCode>,
    // Releases are not delivered while another window has focus.
    unfocused: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains(&code)
    }

    /// Consume one event. Mouse motion and scrolling act on the camera right away,
    /// key presses are remembered for [`apply_held_keys`](Self::apply_held_keys).
    pub fn handle(&mut self, event: InputEvent, camera: &mut Camera) -> Option<WindowRequest> {
        match event {
            InputEvent::Key { code, pressed: true } => {
                // Repeats arrive as further presses of a key we already hold.
                let first_press = self.held.insert(code);
                match code {
                    KeyCode::Escape => Some(WindowRequest::Close),
                    KeyCode::F11 if first_press => Some(WindowRequest::ToggleFullscreen),
                    KeyCode::KeyR if first_press => {
                        camera.reset_up();
                        None
                    }
                    _ => None,
                }
            }
            InputEvent::Key { code, pressed: false } => {
                self.held.remove(&code);
                None
            }
            InputEvent::MouseMotion { .. } if self.unfocused => None,
            InputEvent::MouseMotion { dx, dy } => {
                // Screen y grows downwards, pitch grows upwards.
                camera.rotate(dx as f32, -dy as f32);
                None
            }
            InputEvent::Scroll { lines } => {
                camera.zoom(lines);
                None
            }
            InputEvent::Resized { width, height } => Some(WindowRequest::Resize { width, height }),
            InputEvent::Focused(false) => {
                self.unfocused = true;
                self.held.clear();
                None
            }
            InputEvent::Focused(true) => {
                self.unfocused = false;
                Some(WindowRequest::GrabCursor)
            }
            InputEvent::CloseRequested => Some(WindowRequest::Close),
        }
    }

    pub fn apply_held_keys(&self, camera: &mut Camera, dt: f32) {
        let fast = self.is_held(FAST_KEY);
        MOVE_BINDINGS
            .iter()
            .filter(|(code, _)| self.is_held(*code))
            .for_each(|(_, direction)| camera.move_in(*direction, dt, fast));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Point3, Vector3};

    fn press(code: KeyCode) -> InputEvent {
        InputEvent::Key { code, pressed: true }
    }

    fn release(code: KeyCode) -> InputEvent {
        InputEvent::Key { code, pressed: false }
    }

    #[test]
    fn queue_drains_in_arrival_order_once() {
        let mut queue = InputQueue::new();
        queue.push(press(KeyCode::KeyW));
        queue.push(InputEvent::Scroll { lines: 1.0 });
        queue.push(release(KeyCode::KeyW));
        assert_eq!(queue.len(), 3);

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(
            drained,
            vec![press(KeyCode::KeyW), InputEvent::Scroll { lines: 1.0 }, release(KeyCode::KeyW)]
        );
        assert!(queue.is_empty());
        assert_eq!(queue.drain().count(), 0);
    }

    #[test]
    fn held_keys_move_the_camera_until_released() {
        let mut state = InputState::new();
        let mut camera = Camera::default();

        state.handle(press(KeyCode::KeyW), &mut camera);
        state.apply_held_keys(&mut camera, 1.0);
        assert!((camera.position - Point3::new(0.0, 0.0, -2.5)).magnitude() < 1e-4);

        state.handle(release(KeyCode::KeyW), &mut camera);
        state.apply_held_keys(&mut camera, 1.0);
        assert!((camera.position - Point3::new(0.0, 0.0, -2.5)).magnitude() < 1e-4);
    }

    #[test]
    fn shift_makes_moves_fast() {
        let mut state = InputState::new();
        let mut camera = Camera::default();
        state.handle(press(KeyCode::ShiftLeft), &mut camera);
        state.handle(press(KeyCode::KeyQ), &mut camera);
        state.apply_held_keys(&mut camera, 0.1);
        assert!((camera.position.y - 1.25).abs() < 1e-4);
    }

    #[test]
    fn mouse_motion_turns_and_scroll_zooms() {
        let mut state = InputState::new();
        let mut camera = Camera::default();

        state.handle(InputEvent::MouseMotion { dx: 50.0, dy: -20.0 }, &mut camera);
        assert!((camera.yaw() - (-90.0 + 5.0)).abs() < 1e-4);
        assert!((camera.pitch() - 2.0).abs() < 1e-4);

        state.handle(InputEvent::Scroll { lines: 10.0 }, &mut camera);
        assert_eq!(camera.fov(), 80.0);
    }

    #[test]
    fn window_requests() {
        let mut state = InputState::new();
        let mut camera = Camera::default();
        assert_eq!(state.handle(press(KeyCode::Escape), &mut camera), Some(WindowRequest::Close));
        assert_eq!(state.handle(InputEvent::CloseRequested, &mut camera), Some(WindowRequest::Close));
        assert_eq!(
            state.handle(press(KeyCode::F11), &mut camera),
            Some(WindowRequest::ToggleFullscreen)
        );
        // A key repeat must not toggle a second time.
        assert_eq!(state.handle(press(KeyCode::F11), &mut camera), None);
        assert_eq!(
            state.handle(InputEvent::Resized { width: 640, height: 480 }, &mut camera),
            Some(WindowRequest::Resize { width: 640, height: 480 })
        );
    }

    #[test]
    fn losing_focus_releases_keys_and_ignores_motion() {
        let mut state = InputState::new();
        let mut camera = Camera::default();
        state.handle(press(KeyCode::KeyW), &mut camera);
        state.handle(InputEvent::Focused(false), &mut camera);
        assert!(!state.is_held(KeyCode::KeyW));

        state.apply_held_keys(&mut camera, 1.0);
        state.handle(InputEvent::MouseMotion { dx: 50.0, dy: 0.0 }, &mut camera);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(camera.yaw(), -90.0);

        assert_eq!(
            state.handle(InputEvent::Focused(true), &mut camera),
            Some(WindowRequest::GrabCursor)
        );
        state.handle(InputEvent::MouseMotion { dx: 50.0, dy: 0.0 }, &mut camera);
        assert!((camera.yaw() - (-85.0)).abs() < 1e-4);
    }

    #[test]
    fn reset_key_levels_the_camera() {
        let mut state = InputState::new();
        let mut camera = Camera::default();
        state.handle(press(KeyCode::KeyC), &mut camera);
        for _ in 0..10 {
            state.apply_held_keys(&mut camera, 0.016);
        }
        assert!(camera.roll() > 1.9);
        state.handle(press(KeyCode::KeyR), &mut camera);
        assert_eq!(camera.roll(), 0.0);
        assert!((camera.up() - Vector3::unit_y()).magnitude() < 1e-4);
    }
}
