//! Frame scheduling
//!
//! The host environment decides when frames happen. The driver only asks for
//! "the next frame" and may take the request back.

/// Handle for one pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequestId(u64);

impl FrameRequestId {
    /// Raw id value
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Host-side per-frame callback registry
pub trait FrameScheduler {
    /// Ask for a callback on the next frame
    fn request_frame(&mut self) -> FrameRequestId;

    /// Withdraw a pending request; unknown or already served ids are ignored
    fn cancel_frame(&mut self, id: FrameRequestId);
}

/// Simple queue-backed scheduler for hosts that drive frames themselves
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: Vec<FrameRequestId>,
}

impl FrameQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a frame: take every request made before this call
    ///
    /// Requests made while the returned frames run wait for the next tick.
    pub fn tick(&mut self) -> Vec<FrameRequestId> {
        std::mem::take(&mut self.pending)
    }

    /// Number of requests waiting for a tick
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether `id` is still waiting
    pub fn is_pending(&self, id: FrameRequestId) -> bool {
        self.pending.contains(&id)
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameRequestId {
        let id = FrameRequestId(self.next_id);
        self.next_id += 1;
        self.pending.push(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        self.pending.retain(|pending| *pending != id);
    }
}
