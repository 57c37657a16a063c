//! Interaction tracking
//!
//! Converts global pointer positions into normalized coordinates in roughly
//! `[-1, 1]`, with +Y pointing up. The state is written only by the pointer
//! listener and read by the animation driver once per frame.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::events::{EventListener, HostEvent};
use crate::render::SurfaceSize;

/// Normalized pointer coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionState {
    /// Horizontal position, -1 at the left edge, +1 at the right edge
    pub x: f32,
    /// Vertical position, +1 at the top edge, -1 at the bottom edge
    pub y: f32,
}

/// Shared handle to the session's interaction state
///
/// Cloning yields another handle to the same state. The reference size is the
/// container size at mount time; pointer positions are normalized against it
/// for the whole session, matching where the pointer sits on the mounted page.
#[derive(Debug, Clone)]
pub struct InteractionTracker {
    state: Rc<Cell<InteractionState>>,
    reference: Rc<Cell<SurfaceSize>>,
}

impl InteractionTracker {
    /// Create a tracker normalizing against `reference`
    pub fn new(reference: SurfaceSize) -> Self {
        Self {
            state: Rc::new(Cell::new(InteractionState::default())),
            reference: Rc::new(Cell::new(reference)),
        }
    }

    /// Most recently applied pointer state
    pub fn current(&self) -> InteractionState {
        self.state.get()
    }

    /// Size pointer coordinates are normalized against
    pub fn reference(&self) -> SurfaceSize {
        self.reference.get()
    }

    /// Adopt `size` as the reference if the mount-time size was degenerate
    pub(crate) fn adopt_reference_if_degenerate(&self, size: SurfaceSize) {
        if self.reference.get().is_degenerate() && !size.is_degenerate() {
            log::debug!("Pointer reference size adopted: {}x{}", size.width, size.height);
            self.reference.set(size);
        }
    }

    /// Apply a screen-space pointer position
    ///
    /// Ignored while the reference size is degenerate, since there is no
    /// meaningful normalization yet.
    pub fn handle_pointer_move(&self, client_x: f64, client_y: f64) {
        let reference = self.reference.get();
        if reference.is_degenerate() {
            return;
        }

        let x = (client_x / f64::from(reference.width)) * 2.0 - 1.0;
        let y = -(client_y / f64::from(reference.height)) * 2.0 + 1.0;
        self.state.set(InteractionState { x: x as f32, y: y as f32 });
        log::trace!("Pointer normalized to ({:.3}, {:.3})", x, y);
    }

    /// Handle that does not keep the state alive
    pub(crate) fn downgrade(&self) -> WeakTracker {
        WeakTracker {
            state: Rc::downgrade(&self.state),
            reference: Rc::downgrade(&self.reference),
        }
    }

    /// Listener to register for `HostEventKind::PointerMove`
    ///
    /// The listener holds a weak handle; once every tracker is dropped it
    /// ignores further events.
    pub fn listener(&self) -> PointerListener {
        PointerListener { tracker: self.downgrade() }
    }
}

/// Non-owning handle to an `InteractionTracker`
#[derive(Debug, Clone)]
pub(crate) struct WeakTracker {
    state: Weak<Cell<InteractionState>>,
    reference: Weak<Cell<SurfaceSize>>,
}

impl WeakTracker {
    /// The tracker, if any strong handle is still alive
    pub(crate) fn upgrade(&self) -> Option<InteractionTracker> {
        Some(InteractionTracker {
            state: self.state.upgrade()?,
            reference: self.reference.upgrade()?,
        })
    }
}

/// Pointer-move listener writing into an `InteractionTracker`
pub struct PointerListener {
    tracker: WeakTracker,
}

impl EventListener for PointerListener {
    fn on_event(&mut self, event: &HostEvent) -> bool {
        if let HostEvent::PointerMove { client_x, client_y } = *event {
            if let Some(tracker) = self.tracker.upgrade() {
                tracker.handle_pointer_move(client_x, client_y);
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_corners_normalize_with_y_up() {
        let tracker = InteractionTracker::new(SurfaceSize::new(800, 600));

        tracker.handle_pointer_move(0.0, 0.0);
        assert_eq!(tracker.current(), InteractionState { x: -1.0, y: 1.0 });

        tracker.handle_pointer_move(800.0, 600.0);
        assert_eq!(tracker.current(), InteractionState { x: 1.0, y: -1.0 });

        tracker.handle_pointer_move(600.0, 450.0);
        assert_relative_eq!(tracker.current().x, 0.5);
        assert_relative_eq!(tracker.current().y, -0.5);
    }

    #[test]
    fn test_clones_share_state() {
        let tracker = InteractionTracker::new(SurfaceSize::new(100, 100));
        let mut listener = tracker.listener();
        listener.on_event(&HostEvent::PointerMove { client_x: 100.0, client_y: 0.0 });
        assert_eq!(tracker.current(), InteractionState { x: 1.0, y: 1.0 });
    }

    #[test]
    fn test_degenerate_reference_ignores_pointer_until_adopted() {
        let tracker = InteractionTracker::new(SurfaceSize::new(0, 600));
        tracker.handle_pointer_move(10.0, 10.0);
        assert_eq!(tracker.current(), InteractionState::default());

        tracker.adopt_reference_if_degenerate(SurfaceSize::new(200, 200));
        tracker.handle_pointer_move(200.0, 200.0);
        assert_eq!(tracker.current(), InteractionState { x: 1.0, y: -1.0 });

        tracker.adopt_reference_if_degenerate(SurfaceSize::new(50, 50));
        assert_eq!(tracker.reference(), SurfaceSize::new(200, 200));
    }

    #[test]
    fn test_listener_outlived_by_nothing_is_inert() {
        let tracker = InteractionTracker::new(SurfaceSize::new(100, 100));
        let mut listener = tracker.listener();
        let weak = tracker.downgrade();
        drop(tracker);

        assert!(weak.upgrade().is_none());
        let event = HostEvent::PointerMove { client_x: 50.0, client_y: 50.0 };
        assert!(!listener.on_event(&event));
    }
}
