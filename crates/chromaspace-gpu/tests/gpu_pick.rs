//! GPU integration tests. Require a real wgpu adapter and are skipped
//! without one.
//!
//! Run with: `cargo test -p chromaspace-gpu`

use std::sync::{Arc, Mutex, OnceLock};

use chromaspace_core::element::pointer::{PointerEvent, PointerKind};
use chromaspace_core::element::{FrameRenderer, NoPick, NullRenderer, SpaceFrame};
use chromaspace_core::embedding::OkhslShading;
use chromaspace_core::{
    Axis, AxisWidget, ColorElement, PickPipeline, PickerConfig, SpaceLayout, SpaceWidget,
};
use chromaspace_gpu::{GpuContext, GpuPicker, GpuSceneRenderer};
use glam::{Vec2, Vec3};

/// Create a test context, or `None` when no adapter is available.
fn create_test_context() -> Option<GpuContext> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        ..Default::default()
    }))
    .ok()?;

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("chromaspace_test_device"),
        required_features: chromaspace_gpu::required_features(),
        required_limits: adapter.limits(),
        ..Default::default()
    }))
    .expect("Failed to create test device");

    Some(GpuContext::new(Arc::new(device), Arc::new(queue)))
}

fn gpu_test_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

macro_rules! require_gpu {
    () => {
        match create_test_context() {
            Some(context) => context,
            None => {
                eprintln!("no GPU adapter, skipping");
                return;
            }
        }
    };
}

fn unit_cube_contains(v: Vec3) -> bool {
    v.cmpge(Vec3::ZERO).all() && v.cmple(Vec3::ONE).all()
}

#[test]
fn test_gpu_pick_hits_volume_center_and_misses_corner() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let context = require_gpu!();
    let config = PickerConfig::default();
    let space = SpaceWidget::new(&config, NoPick, NullRenderer, 96, 96).unwrap();
    let frame = space.frame().clone();
    let mut picker = GpuPicker::new(context);

    let hit = picker.try_pick(&frame, 48.0, 48.0).unwrap();
    let hit = hit.expect("center of the viewport should hit the volume");
    assert!(unit_cube_contains(hit), "{hit:?}");
    // Horizontal slicing at the initial gray keeps the lower half.
    assert!(hit.y <= 0.5 + 1e-3, "{hit:?}");

    assert_eq!(picker.try_pick(&frame, 0.0, 0.0).unwrap(), None);
    assert_eq!(picker.try_pick(&frame, 95.0, 95.0).unwrap(), None);
    // Outside the viewport is a miss, not an error.
    assert_eq!(picker.try_pick(&frame, 200.0, 10.0).unwrap(), None);
    assert_eq!(picker.pipeline_count(), 1);
}

#[test]
fn test_gpu_pick_cylinder_wraps_turn() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let context = require_gpu!();
    let config = PickerConfig {
        layout: SpaceLayout::Cylinder,
        ..PickerConfig::default()
    };
    let space = SpaceWidget::new(&config, NoPick, NullRenderer, 96, 96).unwrap();
    let mut picker = GpuPicker::new(context);
    let frame = space.frame().clone();

    let hit = picker.pick(&frame, 48.0, 40.0).expect("cylinder should be hit");
    assert!((0.0..1.0).contains(&hit.x), "{hit:?}");
    assert!(unit_cube_contains(hit), "{hit:?}");
}

#[test]
fn test_gpu_click_commits_picked_color() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let context = require_gpu!();
    let config = PickerConfig::default();
    let mut space = SpaceWidget::new(
        &config,
        GpuPicker::new(context.clone()),
        GpuSceneRenderer::new(context),
        96,
        96,
    )
    .unwrap();
    space.render(None);

    let at = |kind, buttons| PointerEvent::new(kind, Vec2::splat(48.0), Vec2::ZERO, buttons);
    space.mouse_select(&at(PointerKind::Down, 1));
    space.mouse_select(&at(PointerKind::Up, 0));
    let changes = space.drain_changes();
    let committed: Vec<_> = changes.iter().filter(|c| c.committed).collect();
    assert_eq!(committed.len(), 1);
    assert_eq!(committed[0].state.saved_color, Some(space.color()));
    assert!(unit_cube_contains(space.color()));
}

#[test]
fn test_gpu_scene_draws_volume_and_clears_background() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let context = require_gpu!();
    let config = PickerConfig::default();
    let mut space =
        SpaceWidget::new(&config, NoPick, GpuSceneRenderer::new(context), 64, 64).unwrap();
    space.render(None);

    let renderer = space.renderer();
    assert_eq!(renderer.frame_count(), 1);
    let pixels = renderer.read_target().unwrap();
    assert_eq!((pixels.width, pixels.height), (64, 64));
    assert_eq!(pixels.at_canvas(32, 28).map(|p| p[3]), Some(255));
    assert_eq!(pixels.at_canvas(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn test_gpu_strip_shades_along_its_channel() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let context = require_gpu!();
    let config = PickerConfig::default();
    let mut strip =
        AxisWidget::new(&config, Axis::X, GpuSceneRenderer::new(context), 128, 16).unwrap();
    strip.render(Some(&[]));

    let pixels = strip.renderer().read_target().unwrap();
    let left = pixels.at_canvas(2, 8).unwrap();
    let right = pixels.at_canvas(125, 8).unwrap();
    // Red grows left to right; green and blue stay at the mid gray.
    assert!(left[0] < 16, "{left:?}");
    assert!(right[0] > 240, "{right:?}");
    assert!((i32::from(left[1]) - 128).abs() <= 2, "{left:?}");
    assert_eq!(right[3], 255);
}

#[test]
fn test_gpu_renderer_survives_embedding_change() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let context = require_gpu!();
    let config = PickerConfig::default();
    let mut space = SpaceWidget::new(
        &config,
        GpuPicker::new(context.clone()),
        GpuSceneRenderer::new(context),
        64,
        64,
    )
    .unwrap();
    space.render(None);
    space.set_embedding(SpaceLayout::Cylinder.embedding());
    space.render(None);
    assert_eq!(space.renderer().frame_count(), 2);
    let pixels = space.renderer().read_target().unwrap();
    assert_eq!(pixels.at_canvas(0, 0), Some([0, 0, 0, 0]));
    // Drawing through the trait directly reuses the rebuilt pipelines.
    let frame = space.frame().clone();
    FrameRenderer::<SpaceFrame>::draw(space.renderer_mut(), &frame);
    assert_eq!(space.renderer().frame_count(), 3);
}

#[test]
fn test_gpu_oklab_layout_with_okhsl_shading() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let context = require_gpu!();
    let config = PickerConfig {
        layout: SpaceLayout::Oklab,
        ..PickerConfig::default()
    };
    let mut picker = GpuPicker::new(context.clone());
    let mut space =
        SpaceWidget::new(&config, NoPick, GpuSceneRenderer::new(context), 64, 64).unwrap();
    space.set_shading(Arc::new(OkhslShading));
    space.render(None);

    let pixels = space.renderer().read_target().unwrap();
    assert_eq!(pixels.at_canvas(0, 0), Some([0, 0, 0, 0]));
    let frame = space.frame().clone();
    if let Some(hit) = picker.pick(&frame, 32.0, 32.0) {
        assert!(unit_cube_contains(hit), "{hit:?}");
    }
}
