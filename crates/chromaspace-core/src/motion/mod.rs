//! Motion: the spring integrator and the orbit camera controller.

pub mod camera;
pub mod spring;
