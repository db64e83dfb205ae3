//! The Space widget: a color volume the user orbits and picks from.
//!
//! Every pointer event is resolved through the [`PickPipeline`] against the
//! last rendered [`SpaceFrame`]. A hit becomes the live color, a miss falls
//! back to the saved color, and a press released in place commits.

use std::f32::consts::FRAC_PI_4;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::cursor::{CURSOR_RADIUS, CursorInstance, CursorPool, CursorSpec, cursor_fade};
use super::frame::{SliceGeometry, SpaceFrame};
use super::pick::PickPipeline;
use super::pointer::{PointerEvent, PointerKind, WheelEvent};
use super::{ColorElement, FrameRenderer};
use crate::color::{ChangeQueue, ColorChange, ColorState, ColorUpdate};
use crate::config::PickerConfig;
use crate::embedding::Embedding;
use crate::error::{ChromaError, Result};
use crate::geometry::axis::Axis;
use crate::geometry::vec::{NEAR_EPSILON, near};
use crate::motion::camera::CameraController;
use crate::motion::spring::Spring;

const FOV_Y: f32 = FRAC_PI_4;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// Which color component the visible cross-section follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slicing {
    /// Cut at the color's Y component.
    #[default]
    Horizontal,
    /// Cut at the color's X component.
    Vertical,
}

impl Slicing {
    pub const fn tracked_axis(self) -> Axis {
        match self {
            Self::Horizontal => Axis::Y,
            Self::Vertical => Axis::X,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

impl FromStr for Slicing {
    type Err = ChromaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            _ => Err(ChromaError::UnknownSlicing(s.to_string())),
        }
    }
}

impl fmt::Display for Slicing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Animated parameters of the Space widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpringKey {
    Theta,
    Phi,
    SliceX,
    SliceY,
}

/// Distance between a cursor component and the slice, wrapping for
/// angular components.
fn slice_delta(component: f32, slice: f32, angular: bool) -> f32 {
    let d = (component - slice).abs();
    if angular {
        let d = d.rem_euclid(1.0);
        d.min(1.0 - d)
    } else {
        d
    }
}

fn viewport_check(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ChromaError::Config(format!(
            "viewport must be non-empty, got {width}x{height}"
        )));
    }
    Ok(())
}

pub struct SpaceWidget<P, R> {
    color: Vec3,
    saved_color: Vec3,
    camera: CameraController,
    spring: Spring<SpringKey>,
    picker: P,
    renderer: R,
    layout: Arc<dyn Embedding>,
    shading: Arc<dyn Embedding>,
    cursors: CursorPool,
    slicing: Slicing,
    changes: ChangeQueue,
    click_threshold: f32,
    press: Option<Vec2>,
    width: u32,
    height: u32,
    frame: SpaceFrame,
}

impl<P, R> SpaceWidget<P, R>
where
    P: PickPipeline,
    R: FrameRenderer<SpaceFrame>,
{
    pub fn new(
        config: &PickerConfig,
        mut picker: P,
        mut renderer: R,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        config.validate()?;
        viewport_check(width, height)?;

        let layout = config.layout.embedding();
        let shading = config.color_space.shading();
        picker.embedding_changed(layout.as_ref());
        renderer.embedding_changed(layout.as_ref(), shading.as_ref());

        let mut camera = CameraController::new(&config.camera);
        camera.set_center(layout.center());
        let spring = Spring::new(
            [
                (SpringKey::Theta, camera.theta),
                (SpringKey::Phi, camera.phi),
                (SpringKey::SliceX, 1.0),
                (SpringKey::SliceY, 1.0),
            ],
            config.spring,
        );
        let color = config.initial_color();
        let pose = camera.update();

        let mut widget = Self {
            color,
            saved_color: color,
            camera,
            spring,
            picker,
            renderer,
            frame: SpaceFrame {
                width,
                height,
                pose,
                view_proj: Mat4::IDENTITY,
                slice: SliceGeometry::FULL,
                layout: layout.clone(),
                shading: shading.clone(),
                cursors: Vec::new(),
            },
            layout,
            shading,
            cursors: CursorPool::new(Vec3::splat(CURSOR_RADIUS)),
            slicing: config.slicing,
            changes: ChangeQueue::default(),
            click_threshold: config.click_threshold,
            press: None,
            width,
            height,
        };

        // Start already sliced so the first pick sees the final geometry.
        widget.update_slice();
        for key in [SpringKey::SliceX, SpringKey::SliceY] {
            if let Some(target) = widget.spring.target(key) {
                widget.spring.set(key, target, true);
            }
        }
        widget.cursors.follow(widget.layout.embed(color));
        widget.refresh_frame(None);
        Ok(widget)
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn saved_color(&self) -> Vec3 {
        self.saved_color
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn spring_value(&self, key: SpringKey) -> f32 {
        self.spring.get(key)
    }

    pub fn spring_target(&self, key: SpringKey) -> Option<f32> {
        self.spring.target(key)
    }

    pub fn slicing(&self) -> Slicing {
        self.slicing
    }

    /// The frame the next pick is resolved against.
    pub fn frame(&self) -> &SpaceFrame {
        &self.frame
    }

    pub fn layout(&self) -> &Arc<dyn Embedding> {
        &self.layout
    }

    pub fn shading(&self) -> &Arc<dyn Embedding> {
        &self.shading
    }

    pub fn picker(&self) -> &P {
        &self.picker
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Apply an update; returns false when `color` is within 1e-6 of the
    /// current color. A provided saved color is taken even then.
    pub fn set(&mut self, update: ColorUpdate) -> bool {
        if let Some(saved) = update.saved_color {
            self.saved_color = saved;
        }
        if near(update.color, self.color, NEAR_EPSILON) {
            return false;
        }
        self.color = update.color;
        self.on_input_change(update.color);
        if !update.me {
            self.update_slice();
        }
        true
    }

    /// Retarget the slice springs at the tracked component of the color.
    pub fn update_slice(&mut self) {
        let (x, y) = match self.slicing {
            Slicing::Horizontal => (1.0, self.color.y),
            Slicing::Vertical => (self.color.x, 1.0),
        };
        debug!(slicing = %self.slicing, x, y, "slice retargeted");
        self.spring.set(SpringKey::SliceX, x, false);
        self.spring.set(SpringKey::SliceY, y, false);
    }

    pub fn set_slicing(&mut self, slicing: Slicing) {
        self.slicing = slicing;
        self.update_slice();
    }

    /// Swap the volume's layout. The camera recenters on it.
    pub fn set_embedding(&mut self, layout: Arc<dyn Embedding>) {
        self.camera.set_center(layout.center());
        self.layout = layout;
        self.embedding_changed();
    }

    /// Swap how coordinates are shaded.
    pub fn set_shading(&mut self, shading: Arc<dyn Embedding>) {
        self.shading = shading;
        self.embedding_changed();
    }

    fn embedding_changed(&mut self) {
        debug!(layout = self.layout.name(), shading = self.shading.name(), "embedding changed");
        self.picker.embedding_changed(self.layout.as_ref());
        self.renderer
            .embedding_changed(self.layout.as_ref(), self.shading.as_ref());
        self.cursors.follow(self.layout.embed(self.color));
        self.refresh_frame(None);
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        viewport_check(width, height)?;
        self.width = width;
        self.height = height;
        self.refresh_frame(None);
        Ok(())
    }

    /// Advance the springs by wall-clock time and draw.
    pub fn render(&mut self, cursors: Option<&[CursorSpec]>) -> &SpaceFrame {
        self.spring.update();
        self.draw(cursors)
    }

    /// Advance the springs by `dt` seconds and draw.
    pub fn render_step(&mut self, cursors: Option<&[CursorSpec]>, dt: f32) -> &SpaceFrame {
        self.spring.advance(dt);
        self.draw(cursors)
    }

    fn draw(&mut self, cursors: Option<&[CursorSpec]>) -> &SpaceFrame {
        self.refresh_frame(cursors);
        self.renderer.draw(&self.frame);
        &self.frame
    }

    fn refresh_frame(&mut self, cursors: Option<&[CursorSpec]>) {
        let pose = self
            .camera
            .pose(self.spring.get(SpringKey::Theta), self.spring.get(SpringKey::Phi));
        let slice = SliceGeometry::new(Vec3::new(
            self.spring.get(SpringKey::SliceX),
            self.spring.get(SpringKey::SliceY),
            1.0,
        ));
        self.place_cursors(cursors, slice);

        let aspect = self.width as f32 / self.height as f32;
        let projection = Mat4::perspective_rh(FOV_Y, aspect, Z_NEAR, Z_FAR);
        self.frame = SpaceFrame {
            width: self.width,
            height: self.height,
            pose,
            view_proj: projection * pose.view_matrix(),
            slice,
            layout: self.layout.clone(),
            shading: self.shading.clone(),
            cursors: self.cursors.instances().to_vec(),
        };
    }

    fn place_cursors(&mut self, cursors: Option<&[CursorSpec]>, slice: SliceGeometry) {
        let layout = self.layout.clone();
        match cursors {
            Some(specs) => {
                let tracked = self.slicing.tracked_axis();
                let slice_value = tracked.component(slice.extent);
                let angular = layout.angular_axis() == Some(tracked);
                self.cursors.sync(specs, |spec| {
                    let opacity = spec.opacity.unwrap_or_else(|| {
                        cursor_fade(slice_delta(tracked.component(spec.pos), slice_value, angular))
                    });
                    CursorInstance {
                        position: layout.embed(spec.pos),
                        scale: Vec3::splat(CURSOR_RADIUS * spec.size_or_default()),
                        rgb: spec.rgb(),
                        opacity,
                    }
                });
            }
            None => self.cursors.follow(layout.embed(self.color)),
        }
    }

    /// Handle a pointer event on the canvas.
    pub fn mouse_select(&mut self, event: &PointerEvent) {
        if event.kind == PointerKind::Leave {
            self.press = None;
            self.restore();
            return;
        }
        if event.kind == PointerKind::Down {
            self.press = Some(event.position);
        }
        if event.kind == PointerKind::Move && event.primary_held() {
            self.camera.on_move(event.movement.extend(0.0));
            self.spring.set(SpringKey::Theta, self.camera.theta, true);
            self.spring.set(SpringKey::Phi, self.camera.phi, true);
        }

        let (x, y) = (event.position.x, event.position.y);
        match self.picker.pick(&self.frame, x, y) {
            Some(picked) => {
                trace!(x, y, ?picked, "pick hit");
                self.set(ColorUpdate::live(picked).from_self());
            }
            None => {
                debug!(x, y, "pick miss, falling back to saved color");
                self.set(ColorUpdate::live(self.saved_color).from_self());
            }
        }

        match event.kind {
            PointerKind::Move => self.notify(false),
            PointerKind::Up => {
                let press = self.press.take();
                let click =
                    press.is_some_and(|p| p.distance(event.position) <= self.click_threshold);
                if click {
                    self.saved_color = self.color;
                }
                self.notify(click);
            }
            PointerKind::Down | PointerKind::Leave => {}
        }
    }

    /// Zoom the camera.
    pub fn on_wheel(&mut self, event: &WheelEvent) {
        self.camera.on_move(Vec3::new(0.0, 0.0, event.delta_y));
    }

    fn notify(&mut self, committed: bool) {
        self.changes.push(ColorChange {
            state: self.state(),
            committed,
        });
    }
}

impl<P, R> ColorElement for SpaceWidget<P, R>
where
    P: PickPipeline,
    R: FrameRenderer<SpaceFrame>,
{
    fn set(&mut self, update: ColorUpdate) -> bool {
        SpaceWidget::set(self, update)
    }

    fn state(&self) -> ColorState {
        ColorState {
            color: self.color,
            saved_color: Some(self.saved_color),
        }
    }

    fn restore(&mut self) {
        self.color = self.saved_color;
        self.on_input_change(self.saved_color);
        self.notify(false);
    }

    fn on_input_change(&mut self, pos: Vec3) {
        self.cursors.follow(self.layout.embed(pos));
    }

    fn drain_changes(&mut self) -> Vec<ColorChange> {
        self.changes.drain()
    }
}
