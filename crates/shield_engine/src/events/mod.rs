//! Host event dispatch
//!
//! The host owns one `EventDispatcher` and feeds it pointer-move and resize
//! notifications. Components register listeners for the kinds they care about
//! and must unregister them on teardown.
//!
//! - Registration system (only interested listeners are notified)
//! - Listener returns bool (true = consumed, stops forwarding)
//! - Queuing support (immediate + deferred delivery)

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle returned by `EventDispatcher::register`
    pub struct ListenerId;
}

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEventKind {
    /// Global pointer movement
    PointerMove,
    /// Container or window resize
    Resize,
}

/// Notification delivered by the host environment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Pointer moved to screen-space coordinates
    PointerMove {
        /// Horizontal position in pixels
        client_x: f64,
        /// Vertical position in pixels
        client_y: f64,
    },
    /// The container may have changed size; listeners re-query it
    Resize,
}

impl HostEvent {
    /// Kind used to route this event
    pub fn kind(&self) -> HostEventKind {
        match self {
            Self::PointerMove { .. } => HostEventKind::PointerMove,
            Self::Resize => HostEventKind::Resize,
        }
    }
}

/// Event listener trait
///
/// Returns true if the event was consumed (stops forwarding),
/// false to allow forwarding to other listeners.
pub trait EventListener {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &HostEvent) -> bool;
}

/// Listener registry with immediate and queued delivery
pub struct EventDispatcher {
    listeners: SlotMap<ListenerId, (HostEventKind, Box<dyn EventListener>)>,
    order: HashMap<HostEventKind, Vec<ListenerId>>,
    queue: Vec<HostEvent>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher
    pub fn new() -> Self {
        Self {
            listeners: SlotMap::with_key(),
            order: HashMap::new(),
            queue: Vec::new(),
        }
    }

    /// Register a listener for a specific event kind
    pub fn register(&mut self, kind: HostEventKind, listener: Box<dyn EventListener>) -> ListenerId {
        let id = self.listeners.insert((kind, listener));
        self.order.entry(kind).or_default().push(id);
        log::debug!("Registered {:?} listener {:?}", kind, id);
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let Some((kind, _)) = self.listeners.remove(id) else {
            return false;
        };
        if let Some(ids) = self.order.get_mut(&kind) {
            ids.retain(|existing| *existing != id);
        }
        log::debug!("Unregistered {:?} listener {:?}", kind, id);
        true
    }

    /// Whether a listener id is still registered
    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(id)
    }

    /// Number of listeners registered for a kind
    pub fn listener_count(&self, kind: HostEventKind) -> usize {
        self.order.get(&kind).map_or(0, Vec::len)
    }

    /// Queue an event for the next `dispatch_queued` call
    pub fn emit(&mut self, event: HostEvent) {
        self.queue.push(event);
    }

    /// Deliver an event immediately, in registration order
    ///
    /// Returns true if a listener consumed the event.
    pub fn dispatch(&mut self, event: &HostEvent) -> bool {
        let Some(ids) = self.order.get(&event.kind()) else {
            return false;
        };

        for id in ids.clone() {
            if let Some((_, listener)) = self.listeners.get_mut(id) {
                if listener.on_event(event) {
                    return true;
                }
            }
        }
        false
    }

    /// Deliver all queued events in emission order; returns how many were delivered
    pub fn dispatch_queued(&mut self) -> usize {
        let events = std::mem::take(&mut self.queue);
        for event in &events {
            self.dispatch(event);
        }
        events.len()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
