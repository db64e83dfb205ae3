//! The Axis widget: a strip that edits a single channel.
//!
//! No GPU picking here, the pointer position along the strip is the value.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};
use tracing::trace;

use super::cursor::{CursorInstance, CursorPool, CursorSpec};
use super::frame::{AxisFrame, strip_projection};
use super::pointer::{PointerEvent, PointerKind};
use super::{ColorElement, FrameRenderer};
use crate::color::{ChangeQueue, ColorChange, ColorState, ColorUpdate};
use crate::config::PickerConfig;
use crate::embedding::{Cartesian, Embedding};
use crate::error::{ChromaError, Result};
use crate::geometry::axis::Axis;
use crate::geometry::vec::{NEAR_EPSILON, near};

/// Cursor diameter as a fraction of the strip's thickness.
const CURSOR_FILL: f32 = 0.8;

pub struct AxisWidget<R> {
    axis: Axis,
    color: Vec3,
    saved_color: Vec3,
    shading: Arc<dyn Embedding>,
    renderer: R,
    embed_matrix: Mat4,
    cursors: CursorPool,
    changes: ChangeQueue,
    width: u32,
    height: u32,
    frame: AxisFrame,
}

impl<R: FrameRenderer<AxisFrame>> AxisWidget<R> {
    pub fn new(
        config: &PickerConfig,
        axis: Axis,
        mut renderer: R,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        config.validate()?;
        if width == 0 || height == 0 {
            return Err(ChromaError::Config(format!(
                "viewport must be non-empty, got {width}x{height}"
            )));
        }
        let shading = config.color_space.shading();
        renderer.embedding_changed(&Cartesian, shading.as_ref());

        let color = config.initial_color();
        let embed_matrix = axis.strip_matrix(color);
        let mut widget = Self {
            axis,
            color,
            saved_color: color,
            shading: shading.clone(),
            renderer,
            embed_matrix,
            cursors: CursorPool::new(Vec3::ONE),
            changes: ChangeQueue::default(),
            width,
            height,
            frame: AxisFrame {
                width,
                height,
                axis,
                view_proj: strip_projection(),
                embed_matrix,
                shading,
                cursors: Vec::new(),
            },
        };
        widget.cursors.rescale(widget.cursor_scale(1.0));
        widget.cursors.follow(axis.strip_cursor(color));
        widget.refresh_frame(None);
        Ok(widget)
    }

    /// Build from a raw channel index; anything outside 0..=2 is rejected.
    pub fn from_index(
        config: &PickerConfig,
        index: u8,
        renderer: R,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let axis = Axis::try_from(index)?;
        Self::new(config, axis, renderer, width, height)
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn saved_color(&self) -> Vec3 {
        self.saved_color
    }

    pub fn embed_matrix(&self) -> Mat4 {
        self.embed_matrix
    }

    pub fn frame(&self) -> &AxisFrame {
        &self.frame
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn set_shading(&mut self, shading: Arc<dyn Embedding>) {
        self.renderer.embedding_changed(&Cartesian, shading.as_ref());
        self.shading = shading;
        self.refresh_frame(None);
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(ChromaError::Config(format!(
                "viewport must be non-empty, got {width}x{height}"
            )));
        }
        self.width = width;
        self.height = height;
        self.cursors.rescale(self.cursor_scale(1.0));
        self.refresh_frame(None);
        Ok(())
    }

    /// Sphere scale in strip units, round on screen.
    fn cursor_scale(&self, size: f32) -> Vec3 {
        let (w, h) = (self.width as f32, self.height as f32);
        let radius = 0.5 * CURSOR_FILL * w.min(h) * size;
        Vec3::new(radius / w, radius / h, radius / h)
    }

    /// Saved color is taken first; the live color is debounced.
    pub fn set(&mut self, update: ColorUpdate) -> bool {
        if let Some(saved) = update.saved_color {
            self.saved_color = saved;
        }
        if near(update.color, self.color, NEAR_EPSILON) {
            return false;
        }
        self.color = update.color;
        self.on_input_change(update.color);
        true
    }

    /// The current color with this strip's channel read from `(x, y)`.
    pub fn pick(&self, x: f32, y: f32) -> Vec3 {
        let size = Vec2::new(self.width as f32, self.height as f32);
        let value = self.axis.strip_value(Vec2::new(x, y), size);
        self.axis.with_component(self.color, value)
    }

    /// Pressing (or dragging with the button held) commits; hovering
    /// previews; leaving restores.
    pub fn mouse_select(&mut self, event: &PointerEvent) {
        if event.kind == PointerKind::Leave {
            self.restore();
            return;
        }
        let picked = self.pick(event.position.x, event.position.y);
        let committed = event.primary_held();
        trace!(axis = %self.axis, ?picked, committed, "axis select");
        let update = if committed {
            ColorUpdate::committed(picked)
        } else {
            ColorUpdate::live(picked)
        };
        self.set(update);
        self.notify(committed);
    }

    pub fn render(&mut self, cursors: Option<&[CursorSpec]>) -> &AxisFrame {
        self.refresh_frame(cursors);
        self.renderer.draw(&self.frame);
        &self.frame
    }

    fn refresh_frame(&mut self, cursors: Option<&[CursorSpec]>) {
        match cursors {
            Some(specs) => {
                let axis = self.axis;
                let unit = self.cursor_scale(1.0);
                self.cursors.sync(specs, |spec| CursorInstance {
                    position: axis.strip_cursor(spec.pos),
                    scale: unit * spec.size_or_default(),
                    rgb: spec.rgb(),
                    opacity: spec.opacity.unwrap_or(1.0),
                });
            }
            None => self.cursors.follow(self.axis.strip_cursor(self.color)),
        }
        self.frame = AxisFrame {
            width: self.width,
            height: self.height,
            axis: self.axis,
            view_proj: strip_projection(),
            embed_matrix: self.embed_matrix,
            shading: self.shading.clone(),
            cursors: self.cursors.instances().to_vec(),
        };
    }

    fn notify(&mut self, committed: bool) {
        self.changes.push(ColorChange {
            state: self.state(),
            committed,
        });
    }
}

impl<R: FrameRenderer<AxisFrame>> ColorElement for AxisWidget<R> {
    fn set(&mut self, update: ColorUpdate) -> bool {
        AxisWidget::set(self, update)
    }

    fn state(&self) -> ColorState {
        ColorState {
            color: self.color,
            saved_color: Some(self.saved_color),
        }
    }

    fn restore(&mut self) {
        self.set(ColorUpdate::live(self.saved_color));
        self.notify(false);
    }

    fn on_input_change(&mut self, pos: Vec3) {
        self.embed_matrix = self.axis.strip_matrix(pos);
        self.cursors.follow(self.axis.strip_cursor(pos));
    }

    fn drain_changes(&mut self) -> Vec<ColorChange> {
        self.changes.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::NullRenderer;

    const EPSILON: f32 = 1e-6;

    fn strip(axis: Axis) -> AxisWidget<NullRenderer> {
        AxisWidget::new(&PickerConfig::default(), axis, NullRenderer, 200, 20).unwrap()
    }

    fn at(kind: PointerKind, x: f32, y: f32, buttons: u32) -> PointerEvent {
        PointerEvent::new(kind, Vec2::new(x, y), Vec2::ZERO, buttons)
    }

    #[test]
    fn test_unknown_axis_index_fails_construction() {
        let result = AxisWidget::from_index(&PickerConfig::default(), 3, NullRenderer, 100, 10);
        assert!(matches!(result, Err(ChromaError::UnknownAxis(_))));
        let result = AxisWidget::from_index(&PickerConfig::default(), 1, NullRenderer, 0, 10);
        assert!(matches!(result, Err(ChromaError::Config(_))));
    }

    #[test]
    fn test_pick_replaces_one_channel() {
        let x = strip(Axis::X);
        let picked = x.pick(50.0, 19.0);
        assert!((picked - Vec3::new(0.25, 0.5, 0.5)).length() < EPSILON, "{picked:?}");

        let y = AxisWidget::new(&PickerConfig::default(), Axis::Y, NullRenderer, 20, 200).unwrap();
        // Y grows upward from the bottom edge.
        let picked = y.pick(3.0, 150.0);
        assert!((picked - Vec3::new(0.5, 0.75, 0.5)).length() < EPSILON, "{picked:?}");

        let z = strip(Axis::Z);
        assert_eq!(z.pick(-40.0, 0.0).z, 0.0);
        assert_eq!(z.pick(400.0, 0.0).z, 1.0);
    }

    #[test]
    fn test_hover_previews_and_press_commits() {
        let mut x = strip(Axis::X);
        x.mouse_select(&at(PointerKind::Move, 180.0, 10.0, 0));
        let changes = x.drain_changes();
        assert_eq!(changes.len(), 1);
        assert!(!changes[0].committed);
        assert!((x.color().x - 0.9).abs() < EPSILON);
        assert_eq!(x.saved_color(), Vec3::splat(0.5));

        x.mouse_select(&at(PointerKind::Down, 20.0, 10.0, 1));
        let changes = x.drain_changes();
        assert_eq!(changes.len(), 1);
        assert!(changes[0].committed);
        assert!((x.saved_color().x - 0.1).abs() < EPSILON);
        assert_eq!(changes[0].state.saved_color, Some(x.color()));
    }

    #[test]
    fn test_leave_restores_and_notifies() {
        let mut x = strip(Axis::X);
        x.mouse_select(&at(PointerKind::Move, 0.0, 10.0, 0));
        assert_eq!(x.color().x, 0.0);
        x.drain_changes();

        x.mouse_select(&at(PointerKind::Leave, 0.0, 10.0, 0));
        assert_eq!(x.color(), Vec3::splat(0.5));
        let changes = x.drain_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].state.color, Vec3::splat(0.5));
    }

    #[test]
    fn test_input_change_updates_strip_matrix() {
        let mut z = strip(Axis::Z);
        z.set(ColorUpdate::live(Vec3::new(0.1, 0.2, 0.3)));
        let mid = z.embed_matrix().transform_point3(Vec3::new(0.6, 0.5, 0.0));
        assert!((mid - Vec3::new(0.1, 0.2, 0.6)).length() < EPSILON, "{mid:?}");

        // Saved color updates even when the live color is unchanged.
        assert!(!z.set(ColorUpdate::committed(Vec3::new(0.1, 0.2, 0.3))));
        assert_eq!(z.saved_color(), Vec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_cursors_sit_on_strip_and_stay_round() {
        let mut x = strip(Axis::X);
        let frame = x.render(Some(&[CursorSpec::at(Vec3::new(0.3, 0.9, 0.9))]));
        assert_eq!(frame.cursors.len(), 1);
        let cursor = frame.cursors[0];
        assert_eq!(cursor.position, Vec3::new(0.3, 0.5, 0.0));
        // Same pixel radius along both screen axes.
        assert!((cursor.scale.x * 200.0 - cursor.scale.y * 20.0).abs() < 1e-4);
    }
}
