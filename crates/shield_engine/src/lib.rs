//! # Shield Engine
//!
//! Real-time background visualization: a slowly rotating icosphere "shield",
//! a counter-rotating wireframe shell and a field of drifting particles,
//! rendered into a host-provided container region.
//!
//! ## Features
//!
//! - **Scene Graph**: camera, lights, shield, wireframe and particle field built once per mount
//! - **Particle Simulation**: fixed-size, boundary-reflecting random walk
//! - **Animation Driver**: cancelable, frame-driven loop with an explicit running flag
//! - **Software Surface**: CPU rasterizer with depth buffer, fog and PNG export
//! - **Configuration**: TOML/RON loadable settings with validation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use shield_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let container = Rc::new(FixedContainer::new(800, 600));
//!     let mut events = EventDispatcher::new();
//!     let mut frames = FrameQueue::new();
//!
//!     let mut visualization = Visualization::mount(
//!         container,
//!         SoftwareBackend::new(),
//!         VisualizationConfig::default(),
//!         &mut events,
//!         &mut frames,
//!     )?;
//!
//!     for _ in 0..60 {
//!         events.dispatch_queued();
//!         for request in frames.tick() {
//!             visualization.run_frame(request, &mut frames)?;
//!         }
//!     }
//!
//!     visualization.teardown(&mut events, &mut frames);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod settings;
pub mod events;
pub mod input;
pub mod sim;
pub mod render;
pub mod scene;
pub mod animation;
pub mod lifecycle;

mod error;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{VisualizationError, VisualizationResult};

/// Common imports for host applications
pub mod prelude {
    pub use crate::{
        VisualizationError, VisualizationResult,
        animation::{DriverState, FrameOutcome, FrameQueue, FrameRequestId, FrameScheduler},
        config::{Config, ConfigError},
        events::{EventDispatcher, HostEvent, HostEventKind},
        foundation::{
            math::{Vec3, Mat4},
            time::Timer,
        },
        input::InteractionState,
        lifecycle::{FixedContainer, HostContainer, Visualization},
        render::{RenderBackend, RenderError, SoftwareBackend, SurfaceSize},
        settings::VisualizationConfig,
    };
}
