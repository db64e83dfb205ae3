//! Orbit camera with sticky detents.
//!
//! Vertical drags change `theta` (latitude), horizontal drags `phi`
//! (azimuth), the wheel changes `radius`. Configured detents hold `theta` at
//! canonical angles until enough purely vertical motion has accumulated in
//! `stick` to break free.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::time::Instant;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::vec::{spherical_to_cartesian, wrap_angle};

const THETA_MIN: f32 = -FRAC_PI_2;
const THETA_MAX: f32 = 3.0 * FRAC_PI_2;
const ANGLE_PER_PIXEL: f32 = 0.01;
const RADIUS_PER_WHEEL: f32 = 0.04;
const MIN_RADIUS: f32 = 0.1;
const MAX_DT: f32 = 0.1;
/// Angular tolerance for "theta sits on a detent".
const DETENT_EPSILON: f32 = 1e-6;

/// A preferred latitude and how much vertical drag it takes to leave it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detent {
    pub angle: f32,
    #[serde(default = "Detent::default_threshold")]
    pub threshold: f32,
}

impl Detent {
    pub const DEFAULT_THRESHOLD: f32 = 40.0;

    pub const fn new(angle: f32) -> Self {
        Self {
            angle,
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }

    fn default_threshold() -> f32 {
        Self::DEFAULT_THRESHOLD
    }
}

/// Initial orbit and the detent list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub theta: f32,
    pub phi: f32,
    pub radius: f32,
    pub detents: Vec<Detent>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            theta: FRAC_PI_4,
            phi: 0.0,
            radius: 3.0,
            // Equator, top pole, and the far side of the equator.
            detents: vec![Detent::new(0.0), Detent::new(FRAC_PI_2), Detent::new(PI)],
        }
    }
}

/// Where the camera is and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub up: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, self.up)
    }
}

#[derive(Debug, Clone)]
pub struct CameraController {
    pub theta: f32,
    pub phi: f32,
    pub radius: f32,
    pub stick: f32,
    pub magnet: Option<Detent>,
    pub look_at: Vec3,
    detents: Vec<Detent>,
    last: Instant,
}

impl CameraController {
    pub fn new(config: &CameraConfig) -> Self {
        let mut detents = config.detents.clone();
        detents.sort_by(|a, b| a.angle.total_cmp(&b.angle));
        Self {
            theta: config.theta.clamp(THETA_MIN, THETA_MAX),
            phi: wrap_angle(config.phi),
            radius: config.radius.max(MIN_RADIUS),
            stick: 0.0,
            magnet: None,
            look_at: Vec3::ZERO,
            detents,
            last: Instant::now(),
        }
    }

    pub fn detents(&self) -> &[Detent] {
        &self.detents
    }

    /// Horizontal center the camera orbits around; only x and z are used.
    pub fn set_center(&mut self, center: Vec3) {
        self.look_at.x = center.x;
        self.look_at.z = center.z;
    }

    /// Apply a relative motion, using wall-clock time for the stick decay.
    pub fn on_move(&mut self, delta: Vec3) {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        self.on_move_with_dt(delta, dt);
    }

    /// Apply a relative motion `(dx, dy, dz)` with an explicit time step.
    pub fn on_move_with_dt(&mut self, delta: Vec3, dt: f32) {
        let dt = dt.clamp(0.0, MAX_DT);
        let new_theta = (self.theta + delta.y * ANGLE_PER_PIXEL).clamp(THETA_MIN, THETA_MAX);

        if let Some(detent) = self.crossing(new_theta) {
            if self.magnet != Some(detent) {
                tracing::trace!(angle = detent.angle, "camera caught by detent");
            }
            self.magnet = Some(detent);
        }

        if self.magnet.is_some() || self.stick != 0.0 {
            let vertical = (delta.y.abs() - delta.x.abs()).max(0.0);
            self.stick += vertical - self.stick * dt;
            if let Some(magnet) = self.magnet {
                self.theta = magnet.angle;
            }
        } else {
            self.theta = new_theta;
        }

        let threshold = self
            .magnet
            .map_or(Detent::DEFAULT_THRESHOLD, |m| m.threshold);
        if self.stick.abs() >= threshold {
            tracing::trace!(stick = self.stick, "camera released from detent");
            self.stick = 0.0;
            self.theta = new_theta;
            self.magnet = None;
        }

        self.phi = wrap_angle(self.phi + delta.x * ANGLE_PER_PIXEL);
        self.radius = (self.radius + delta.z * RADIUS_PER_WHEEL).max(MIN_RADIUS);
    }

    /// A stop strictly between `theta` and `new_theta`, else one sitting on
    /// `theta`.
    fn crossing(&self, new_theta: f32) -> Option<Detent> {
        let (lo, hi) = if self.theta <= new_theta {
            (self.theta, new_theta)
        } else {
            (new_theta, self.theta)
        };
        self.detents
            .iter()
            .find(|d| d.angle > lo && d.angle < hi)
            .or_else(|| {
                self.detents
                    .iter()
                    .find(|d| (d.angle - self.theta).abs() < DETENT_EPSILON)
            })
            .copied()
    }

    /// Pose for the controller's own angles.
    pub fn update(&mut self) -> CameraPose {
        self.pose(self.theta, self.phi)
    }

    /// Pose for explicit (typically spring-smoothed) angles.
    ///
    /// Also raises `look_at.y` toward the pole being approached.
    pub fn pose(&mut self, theta: f32, phi: f32) -> CameraPose {
        let radius = self.radius + theta.cos().powi(2) * 0.5;
        self.look_at.y = (theta.sin() + 1.0) / 2.0;
        let up = spherical_to_cartesian(theta + FRAC_PI_2, phi, 1.0).normalize_or_zero();
        CameraPose {
            position: spherical_to_cartesian(theta, phi, radius) + self.look_at,
            up,
            look_at: self.look_at,
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}
