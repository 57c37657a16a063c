//! # Animation
//!
//! The frame loop: a host-owned `FrameScheduler` delivers frame callbacks and
//! the `AnimationDriver` does one frame of work per callback, rescheduling
//! itself while the session's running flag is set.
//!
//! ```text
//! Idle --start--> Running --run_frame--> Running
//!                    |
//!                    +--stop / draw error--> Stopped
//! ```

mod driver;
mod scheduler;

pub use driver::{AnimationDriver, DriverState, FrameOutcome, RunFlag};
pub use scheduler::{FrameQueue, FrameRequestId, FrameScheduler};
