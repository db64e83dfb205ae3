//! Interactive elements: the Space and Axis widgets, and the seams they
//! are rendered and picked through.

pub mod axis;
pub mod cursor;
pub mod frame;
pub mod hub;
pub mod pick;
pub mod pointer;
pub mod space;

pub use cursor::{CursorInstance, CursorPool, CursorSpec, cursor_fade};
pub use frame::{AxisFrame, SliceGeometry, SpaceFrame};
pub use pick::{NoPick, PickPipeline, decode_pick_texel};
pub use pointer::{CanvasRect, PointerEvent, PointerKind, WheelEvent};

use glam::Vec3;

use crate::color::{ColorChange, ColorState, ColorUpdate};
use crate::embedding::Embedding;

/// A widget that shares the color state with its siblings.
pub trait ColorElement {
    /// Apply an update. Returns false when it was debounced.
    fn set(&mut self, update: ColorUpdate) -> bool;

    /// Copy of the current color state.
    fn state(&self) -> ColorState;

    /// Reset the live color to the saved one and notify.
    fn restore(&mut self);

    /// Recompute anything derived from the input position.
    fn on_input_change(&mut self, pos: Vec3);

    /// Changes produced since the last drain, oldest first.
    fn drain_changes(&mut self) -> Vec<ColorChange>;
}

/// Draws frames of type `F`.
pub trait FrameRenderer<F> {
    fn draw(&mut self, frame: &F);

    /// The layout or shading changed; rebuild programs for them.
    fn embedding_changed(&mut self, _layout: &dyn Embedding, _shading: &dyn Embedding) {}
}

/// Renderer that draws nothing, for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl<F> FrameRenderer<F> for NullRenderer {
    fn draw(&mut self, _frame: &F) {}
}
