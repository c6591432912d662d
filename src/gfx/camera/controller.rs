//! winit input wiring for the orbit camera
//!
//! Raw mouse deltas drive the orbit operations: drag orbits, shift-drag
//! pans, and the wheel zooms. The controller only mutates the camera and
//! requests a redraw; rendering stays with the frame loop.

use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use super::orbit;
use crate::gfx::scene::Camera;

/// What a mouse drag currently does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Orbit,
    Pan,
}

pub struct CameraController {
    pub orbit_sensitivity: f32,
    pub zoom_sensitivity: f32,
    pub pan_sensitivity: f32,
    shift_down: bool,
    dragging: bool,
}

impl CameraController {
    pub fn new(orbit_sensitivity: f32, zoom_sensitivity: f32) -> Self {
        Self {
            orbit_sensitivity,
            zoom_sensitivity,
            pan_sensitivity: 0.01,
            shift_down: false,
            dragging: false,
        }
    }

    fn drag_mode(&self) -> DragMode {
        if self.shift_down {
            DragMode::Pan
        } else {
            DragMode::Orbit
        }
    }

    pub fn handle_device_event(
        &mut self,
        event: &DeviceEvent,
        window: &Window,
        camera: &mut Camera,
    ) {
        match event {
            // Left mouse button starts and ends a drag.
            DeviceEvent::Button { button: 0, state } => {
                self.dragging = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                self.scroll(scroll_lines(delta), window, camera);
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.dragging {
                    self.drag(*delta, window, camera);
                }
            }
            _ => (),
        }
    }

    pub fn handle_key_event(&mut self, event: &KeyEvent) {
        if let KeyEvent {
            physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
            state,
            ..
        } = event
        {
            self.shift_down = *state == ElementState::Pressed;
        }
    }

    fn scroll(&self, lines: f32, window: &Window, camera: &mut Camera) {
        orbit::zoom(camera, 1.0 - lines * self.zoom_sensitivity);
        window.request_redraw();
    }

    fn drag(&self, (dx, dy): (f64, f64), window: &Window, camera: &mut Camera) {
        match self.drag_mode() {
            DragMode::Pan => orbit::pan(
                camera,
                -dx as f32 * self.pan_sensitivity,
                dy as f32 * self.pan_sensitivity,
            ),
            DragMode::Orbit => orbit::orbit(
                camera,
                -dx as f32 * self.orbit_sensitivity,
                dy as f32 * self.orbit_sensitivity,
            ),
        }
        window.request_redraw();
    }

    pub fn is_panning(&self) -> bool {
        self.dragging && self.shift_down
    }

    pub fn set_pan_sensitivity(&mut self, sensitivity: f32) {
        self.pan_sensitivity = sensitivity;
    }
}

/// Normalizes wheel input: line scrolls pass through, pixel scrolls are
/// taken as-is in window pixels.
fn scroll_lines(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, lines) => *lines,
        MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32,
    }
}
