use std::collections::VecDeque;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The live color and the last committed one.
///
/// Both are plain values: copies handed out never alias the widget's own.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorState {
    pub color: Vec3,
    pub saved_color: Option<Vec3>,
}

impl ColorState {
    pub fn new(color: Vec3) -> Self {
        Self {
            color,
            saved_color: Some(color),
        }
    }

    /// Committed color, or the live one when nothing was committed yet.
    pub fn saved_or_current(&self) -> Vec3 {
        self.saved_color.unwrap_or(self.color)
    }
}

/// Input to a widget's `set`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorUpdate {
    pub color: Vec3,
    pub saved_color: Option<Vec3>,
    /// The update came from the receiving widget's own pick.
    pub me: bool,
}

impl ColorUpdate {
    /// A transient color from elsewhere; the saved color is left alone.
    pub fn live(color: Vec3) -> Self {
        Self {
            color,
            saved_color: None,
            me: false,
        }
    }

    /// A color that is also the new saved color.
    pub fn committed(color: Vec3) -> Self {
        Self {
            color,
            saved_color: Some(color),
            me: false,
        }
    }

    pub fn from_state(state: ColorState) -> Self {
        Self {
            color: state.color,
            saved_color: state.saved_color,
            me: false,
        }
    }

    pub fn from_self(mut self) -> Self {
        self.me = true;
        self
    }
}

/// One notification leaving a widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorChange {
    pub state: ColorState,
    /// A click or press committed `state.color` as the saved color.
    pub committed: bool,
}

/// Outgoing changes, drained by whoever hosts the widget.
#[derive(Debug, Default)]
pub struct ChangeQueue {
    pending: VecDeque<ColorChange>,
}

impl ChangeQueue {
    pub fn push(&mut self, change: ColorChange) {
        tracing::trace!(committed = change.committed, color = ?change.state.color, "color change");
        self.pending.push_back(change);
    }

    pub fn drain(&mut self) -> Vec<ColorChange> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_copies_are_isolated() {
        let state = ColorState::new(Vec3::splat(0.5));
        let mut change = ColorChange {
            state,
            committed: false,
        };
        change.state.color.x = 0.9;
        if let Some(saved) = change.state.saved_color.as_mut() {
            saved.y = 0.1;
        }
        assert_eq!(state.color, Vec3::splat(0.5));
        assert_eq!(state.saved_color, Some(Vec3::splat(0.5)));
        // The copy's live and saved colors are independent too.
        assert_eq!(change.state.saved_color.map(|s| s.x), Some(0.5));
    }

    #[test]
    fn test_queue_drains_in_order() {
        let mut queue = ChangeQueue::default();
        for x in [0.1, 0.2, 0.3] {
            queue.push(ColorChange {
                state: ColorState::new(Vec3::splat(x)),
                committed: x > 0.25,
            });
        }
        assert_eq!(queue.len(), 3);
        let drained = queue.drain();
        assert!(queue.is_empty());
        let xs: Vec<f32> = drained.iter().map(|c| c.state.color.x).collect();
        assert_eq!(xs, vec![0.1, 0.2, 0.3]);
        assert!(drained[2].committed && !drained[0].committed);
    }

    #[test]
    fn test_saved_or_current() {
        let mut state = ColorState::new(Vec3::ZERO);
        state.color = Vec3::ONE;
        assert_eq!(state.saved_or_current(), Vec3::ZERO);
        state.saved_color = None;
        assert_eq!(state.saved_or_current(), Vec3::ONE);
    }
}
