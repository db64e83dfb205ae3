//! Keeps a group of elements on the same color.

use tracing::trace;

use super::ColorElement;
use crate::color::{ColorChange, ColorState, ColorUpdate};

/// Owns the authoritative color state for a group of elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorHub {
    state: ColorState,
}

impl ColorHub {
    pub fn new(state: ColorState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> ColorState {
        self.state
    }

    /// Drain every element's changes and forward each one to the others.
    ///
    /// Only committed changes carry a saved color; live ones leave the
    /// receivers' saved colors alone. Returns the changes in the order they
    /// were applied, for outside listeners.
    pub fn pump(&mut self, elements: &mut [&mut dyn ColorElement]) -> Vec<ColorChange> {
        let mut applied = Vec::new();
        for source in 0..elements.len() {
            for change in elements[source].drain_changes() {
                let update = self.absorb(change);
                for (i, element) in elements.iter_mut().enumerate() {
                    if i != source {
                        let changed = element.set(update);
                        trace!(source, target = i, changed, "forwarded color change");
                    }
                }
                applied.push(change);
            }
        }
        applied
    }

    fn absorb(&mut self, change: ColorChange) -> ColorUpdate {
        self.state.color = change.state.color;
        if change.committed {
            self.state.saved_color = change.state.saved_color;
            ColorUpdate::from_state(change.state)
        } else {
            ColorUpdate::live(change.state.color)
        }
    }

    /// Push a color set from outside the group to every element.
    pub fn broadcast(&mut self, state: ColorState, elements: &mut [&mut dyn ColorElement]) {
        self.state = state;
        let update = ColorUpdate::from_state(state);
        for element in elements.iter_mut() {
            element.set(update);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;
    use crate::config::PickerConfig;
    use crate::element::axis::AxisWidget;
    use crate::element::frame::SpaceFrame;
    use crate::element::pick::PickPipeline;
    use crate::element::pointer::{PointerEvent, PointerKind};
    use crate::element::NullRenderer;
    use crate::element::space::SpaceWidget;
    use crate::geometry::axis::Axis;

    struct FixedPicker(Vec3);

    impl PickPipeline for FixedPicker {
        fn pick(&mut self, _frame: &SpaceFrame, _x: f32, _y: f32) -> Option<Vec3> {
            Some(self.0)
        }
    }

    fn at(kind: PointerKind, x: f32, y: f32, buttons: u32) -> PointerEvent {
        PointerEvent::new(kind, Vec2::new(x, y), Vec2::ZERO, buttons)
    }

    #[test]
    fn test_changes_propagate_between_elements() {
        let config = PickerConfig::default();
        let picked = Vec3::new(0.2, 0.7, 0.4);
        let mut space =
            SpaceWidget::new(&config, FixedPicker(picked), NullRenderer, 100, 100).unwrap();
        let mut strip = AxisWidget::new(&config, Axis::X, NullRenderer, 100, 10).unwrap();
        let mut hub = ColorHub::new(ColorState::new(config.initial_color()));

        // A click on the space commits into the strip.
        space.mouse_select(&at(PointerKind::Down, 5.0, 5.0, 1));
        space.mouse_select(&at(PointerKind::Up, 5.0, 5.0, 0));
        let applied = hub.pump(&mut [&mut space as &mut dyn ColorElement, &mut strip]);
        assert_eq!(applied.len(), 1);
        assert!(applied[0].committed);
        assert_eq!(strip.color(), picked);
        assert_eq!(strip.saved_color(), picked);
        assert_eq!(hub.state().saved_color, Some(picked));

        // Hovering the strip previews in the space without committing.
        strip.mouse_select(&at(PointerKind::Move, 90.0, 5.0, 0));
        let applied = hub.pump(&mut [&mut space as &mut dyn ColorElement, &mut strip]);
        assert_eq!(applied.len(), 1);
        assert!((space.color().x - 0.9).abs() < 1e-6);
        assert_eq!(space.saved_color(), picked);

        // Forwarded updates do not echo back.
        let applied = hub.pump(&mut [&mut space as &mut dyn ColorElement, &mut strip]);
        assert!(applied.is_empty());
    }

    #[test]
    fn test_live_changes_keep_receivers_saved_color() {
        let config = PickerConfig::default();
        let initial = config.initial_color();
        let mut x = AxisWidget::new(&config, Axis::X, NullRenderer, 100, 10).unwrap();
        let mut z = AxisWidget::new(&config, Axis::Z, NullRenderer, 100, 10).unwrap();
        let mut hub = ColorHub::new(ColorState::new(initial));

        // The strips disagree on the saved color before the hover.
        let elsewhere = Vec3::new(0.9, 0.1, 0.1);
        x.set(ColorUpdate::committed(elsewhere));
        assert_eq!(z.saved_color(), initial);

        x.mouse_select(&at(PointerKind::Move, 20.0, 5.0, 0));
        let applied = hub.pump(&mut [&mut x as &mut dyn ColorElement, &mut z]);
        assert_eq!(applied.len(), 1);
        assert!(!applied[0].committed);
        assert!((z.color().x - 0.2).abs() < 1e-6);
        assert_eq!(z.saved_color(), initial);
        assert_eq!(hub.state().saved_color, Some(initial));

        // A press carries the saved color along.
        x.mouse_select(&at(PointerKind::Down, 30.0, 5.0, 1));
        hub.pump(&mut [&mut x as &mut dyn ColorElement, &mut z]);
        assert_eq!(z.saved_color(), x.saved_color());
        assert_eq!(hub.state().saved_color, Some(x.saved_color()));
    }

    #[test]
    fn test_broadcast_reaches_every_element() {
        let config = PickerConfig::default();
        let mut a = AxisWidget::new(&config, Axis::Y, NullRenderer, 10, 100).unwrap();
        let mut b = AxisWidget::new(&config, Axis::Z, NullRenderer, 100, 10).unwrap();
        let mut hub = ColorHub::default();
        let state = ColorState::new(Vec3::new(0.1, 0.2, 0.3));
        hub.broadcast(state, &mut [&mut a as &mut dyn ColorElement, &mut b]);
        assert_eq!(a.color(), state.color);
        assert_eq!(b.saved_color(), state.color);
        assert_eq!(hub.state(), state);
    }
}
