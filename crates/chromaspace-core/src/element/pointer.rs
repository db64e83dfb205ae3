//! Host input events, already converted to canvas-local coordinates.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Leave,
}

/// Canvas bounds in client coordinates (top-left origin, y down).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl CanvasRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Canvas-local position, bottom-left origin.
    pub position: Vec2,
    /// Motion since the previous event, y up.
    pub movement: Vec2,
    /// Pressed-button bitmask; bit 0 is the primary button.
    pub buttons: u32,
}

impl PointerEvent {
    pub const PRIMARY: u32 = 1;

    pub fn new(kind: PointerKind, position: Vec2, movement: Vec2, buttons: u32) -> Self {
        Self {
            kind,
            position,
            movement,
            buttons,
        }
    }

    /// Build from client coordinates, flipping y so the canvas bottom is 0.
    pub fn from_client(
        kind: PointerKind,
        client: Vec2,
        rect: CanvasRect,
        client_movement: Vec2,
        buttons: u32,
    ) -> Self {
        Self {
            kind,
            position: Vec2::new(client.x - rect.left, rect.bottom() - client.y),
            movement: Vec2::new(client_movement.x, -client_movement.y),
            buttons,
        }
    }

    pub fn primary_held(&self) -> bool {
        self.buttons & Self::PRIMARY != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelEvent {
    pub delta_y: f32,
}
