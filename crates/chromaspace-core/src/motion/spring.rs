//! Damped spring integration for animated scalar parameters.
//!
//! Every key is an independent second-order system pulled toward its
//! target. Stiffness and damping are configured on a 0..1 scale:
//!
//! ```text
//!   k = exp(6·stiffness + 2)
//!   c = 2·damping·√k            (damping = 1 is critical)
//!
//!   force     = (target − value)·k
//!   velocity += (force − velocity·c)·dt
//!   value    += velocity·dt
//! ```
//!
//! Once both velocity and force drop below `precision` the key snaps onto
//! its target and stops.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Longest step a single `update` integrates, in seconds.
pub const MAX_STEP: f32 = 0.1;

/// Spring tuning on the 0..1 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub precision: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 0.4,
            damping: 0.8,
            precision: 0.01,
        }
    }
}

/// Current state of one animated key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringValue {
    pub value: f32,
    pub target: f32,
    pub velocity: f32,
}

impl SpringValue {
    fn at_rest(value: f32) -> Self {
        Self {
            value,
            target: value,
            velocity: 0.0,
        }
    }
}

/// A set of named springs advanced together.
#[derive(Debug, Clone)]
pub struct Spring<K> {
    values: HashMap<K, SpringValue>,
    stiffness: f32,
    damping: f32,
    damping_ratio: f32,
    precision: f32,
    last: Instant,
}

fn stiffness_from(s: f32) -> f32 {
    (s * 6.0 + 2.0).exp()
}

impl<K: Copy + Eq + Hash> Spring<K> {
    /// Create springs at rest on the given initial values.
    pub fn new(initial: impl IntoIterator<Item = (K, f32)>, config: SpringConfig) -> Self {
        let stiffness = stiffness_from(config.stiffness);
        Self {
            values: initial
                .into_iter()
                .map(|(key, value)| (key, SpringValue::at_rest(value)))
                .collect(),
            stiffness,
            damping: config.damping * 2.0 * stiffness.sqrt(),
            damping_ratio: config.damping,
            precision: config.precision,
            last: Instant::now(),
        }
    }

    /// Current interpolated value, or 0 for a key that was never set.
    pub fn get(&self, key: K) -> f32 {
        self.values.get(&key).map_or(0.0, |v| v.value)
    }

    pub fn state(&self, key: K) -> Option<SpringValue> {
        self.values.get(&key).copied()
    }

    pub fn target(&self, key: K) -> Option<f32> {
        self.values.get(&key).map(|v| v.target)
    }

    /// Retarget `key`. With `force`, the value jumps there and stops.
    ///
    /// Unknown keys start at rest on the target.
    pub fn set(&mut self, key: K, target: f32, force: bool) {
        let entry = self
            .values
            .entry(key)
            .or_insert_with(|| SpringValue::at_rest(target));
        entry.target = target;
        if force {
            entry.value = target;
            entry.velocity = 0.0;
        }
    }

    /// True when no key is moving.
    pub fn is_settled(&self) -> bool {
        self.values
            .values()
            .all(|v| v.velocity == 0.0 && v.value == v.target)
    }

    /// Advance by the wall-clock time since the previous `update`.
    pub fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        self.advance(dt);
    }

    /// Advance every key by `dt` seconds, clamped to [`MAX_STEP`].
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_STEP);
        if dt == 0.0 {
            return;
        }
        for v in self.values.values_mut() {
            let force = (v.target - v.value) * self.stiffness;
            let acceleration = force - v.velocity * self.damping;
            v.velocity += acceleration * dt;
            v.value += v.velocity * dt;
            if v.velocity.abs() < self.precision && force.abs() < self.precision {
                v.velocity = 0.0;
                v.value = v.target;
            }
        }
    }

    /// Retune stiffness (0..1 scale). Damping keeps its ratio.
    pub fn set_stiffness(&mut self, stiffness: f32) {
        self.stiffness = stiffness_from(stiffness);
        self.damping = self.damping_ratio * 2.0 * self.stiffness.sqrt();
    }

    /// Retune damping (0..1 scale, 1 = critical).
    pub fn set_damping(&mut self, damping: f32) {
        self.damping_ratio = damping;
        self.damping = damping * 2.0 * self.stiffness.sqrt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Key {
        A,
        B,
    }

    #[test]
    fn test_converges_to_constant_target() {
        let config = SpringConfig::default();
        let mut spring = Spring::new([(Key::A, 0.0)], config);
        spring.set(Key::A, 1.0, false);

        let mut steps = 0;
        while spring.state(Key::A).unwrap().velocity != 0.0 || spring.get(Key::A) != 1.0 {
            spring.advance(DT);
            steps += 1;
            assert!(steps < 10_000, "spring did not settle");
        }
        assert!(steps > 1, "spring should animate, not jump");

        // Once settled it stays settled.
        for _ in 0..120 {
            spring.advance(DT);
            let state = spring.state(Key::A).unwrap();
            assert_eq!(state.velocity, 0.0);
            assert!((state.value - 1.0).abs() <= config.precision);
        }
    }

    #[test]
    fn test_force_set_snaps_immediately() {
        let mut spring = Spring::new([(Key::A, 0.0)], SpringConfig::default());
        spring.set(Key::A, 0.75, true);
        let state = spring.state(Key::A).unwrap();
        assert_eq!(state.value, 0.75);
        assert_eq!(state.velocity, 0.0);
        assert!(spring.is_settled());
    }

    #[test]
    fn test_keys_are_independent() {
        let mut spring = Spring::new([(Key::A, 0.0), (Key::B, 0.5)], SpringConfig::default());
        spring.set(Key::A, 1.0, false);
        for _ in 0..10 {
            spring.advance(DT);
        }
        assert!(spring.get(Key::A) > 0.0);
        assert_eq!(spring.get(Key::B), 0.5);
    }

    #[test]
    fn test_step_is_clamped_after_long_pause() {
        let mut a = Spring::new([(Key::A, 0.0)], SpringConfig::default());
        let mut b = a.clone();
        a.set(Key::A, 1.0, false);
        b.set(Key::A, 1.0, false);
        a.advance(30.0);
        b.advance(MAX_STEP);
        assert_eq!(a.get(Key::A), b.get(Key::A));
        assert!(a.get(Key::A).is_finite());
    }

    #[test]
    fn test_retuning_keeps_damping_ratio_and_converges() {
        let config = SpringConfig::default();
        let mut spring = Spring::new([(Key::A, 0.0)], config);

        spring.set_stiffness(0.8);
        let k = (6.0_f32 * 0.8 + 2.0).exp();
        assert!((spring.stiffness - k).abs() < 1e-3 * k);
        let expected = config.damping * 2.0 * k.sqrt();
        assert!((spring.damping - expected).abs() < 1e-4, "damping {}", spring.damping);

        spring.set_damping(1.0);
        assert!((spring.damping - 2.0 * k.sqrt()).abs() < 1e-4);
        // Stiffening afterwards keeps the new ratio.
        spring.set_stiffness(0.5);
        let k = (6.0_f32 * 0.5 + 2.0).exp();
        assert!((spring.damping - 2.0 * k.sqrt()).abs() < 1e-4);

        spring.set(Key::A, 1.0, false);
        let mut steps = 0;
        while !spring.is_settled() {
            spring.advance(DT);
            steps += 1;
            assert!(steps < 10_000, "retuned spring did not settle");
        }
        assert_eq!(spring.get(Key::A), 1.0);
    }

    #[test]
    fn test_unknown_key_starts_at_target() {
        let mut spring: Spring<Key> = Spring::new([], SpringConfig::default());
        assert_eq!(spring.get(Key::B), 0.0);
        spring.set(Key::B, 0.3, false);
        assert_eq!(spring.get(Key::B), 0.3);
    }
}
