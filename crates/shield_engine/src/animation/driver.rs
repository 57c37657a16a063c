//! Animation driver state machine

use std::cell::Cell;
use std::rc::Rc;

use crate::input::InteractionState;
use crate::render::{RenderResult, RenderSurface};
use crate::scene::SceneGraph;

use super::scheduler::{FrameRequestId, FrameScheduler};

/// Driver lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Created, no frame requested yet
    Idle,
    /// A frame request is outstanding
    Running,
    /// No further frames will be requested
    Stopped,
}

/// What a frame callback did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Scene advanced and drawn
    Rendered,
    /// Surface not drawable yet; nothing advanced, next frame requested
    Deferred,
    /// Stale request or stopped driver; nothing happened
    Ignored,
}

/// Shared session running flag
///
/// Owned by the lifecycle controller and checked by the driver before doing
/// frame work and before rescheduling.
#[derive(Debug, Clone, Default)]
pub struct RunFlag(Rc<Cell<bool>>);

impl RunFlag {
    /// New cleared flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the session running
    pub fn set(&self) {
        self.0.set(true);
    }

    /// Mark the session stopped
    pub fn clear(&self) {
        self.0.set(false);
    }

    /// Whether the session is running
    pub fn is_set(&self) -> bool {
        self.0.get()
    }
}

/// Per-frame loop for one session
#[derive(Debug)]
pub struct AnimationDriver {
    state: DriverState,
    pending: Option<FrameRequestId>,
    frames_completed: u64,
    running: RunFlag,
}

impl AnimationDriver {
    /// Create an idle driver bound to `running`
    pub fn new(running: RunFlag) -> Self {
        Self {
            state: DriverState::Idle,
            pending: None,
            frames_completed: 0,
            running,
        }
    }

    /// Current state
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Outstanding frame request, if any
    pub fn pending_request(&self) -> Option<FrameRequestId> {
        self.pending
    }

    /// Frames that were drawn
    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    /// Idle -> Running: request the first frame
    ///
    /// Does nothing unless the driver is idle and the running flag is set.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.state != DriverState::Idle {
            log::warn!("Animation driver already started (state {:?})", self.state);
            return;
        }
        if !self.running.is_set() {
            log::warn!("Animation driver not started: session is not running");
            return;
        }
        let id = scheduler.request_frame();
        self.pending = Some(id);
        self.state = DriverState::Running;
        log::debug!("Animation driver started, first frame {:?}", id);
    }

    /// Any state -> Stopped, withdrawing the outstanding request
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let Some(id) = self.pending.take() {
            scheduler.cancel_frame(id);
            log::debug!("Cancelled frame request {:?}", id);
        }
        if self.state != DriverState::Stopped {
            log::info!("Animation driver stopped after {} frames", self.frames_completed);
        }
        self.state = DriverState::Stopped;
    }

    /// Handle one frame callback
    ///
    /// Work order: mesh animation from `interaction`, particle step, draw.
    /// The next frame is requested afterwards only if the running flag is
    /// still set. A draw failure stops the driver and is returned.
    pub fn run_frame(
        &mut self,
        request: FrameRequestId,
        scene: &mut SceneGraph,
        surface: &mut RenderSurface,
        interaction: InteractionState,
        scheduler: &mut dyn FrameScheduler,
    ) -> RenderResult<FrameOutcome> {
        if self.state != DriverState::Running || self.pending != Some(request) {
            log::debug!("Ignoring frame request {:?} (state {:?})", request, self.state);
            return Ok(FrameOutcome::Ignored);
        }
        self.pending = None;

        if !self.running.is_set() {
            self.state = DriverState::Stopped;
            return Ok(FrameOutcome::Ignored);
        }

        let outcome = if surface.is_drawable() {
            scene.animate_meshes(interaction);
            scene.particles_mut().step();
            if let Err(err) = surface.draw(scene) {
                log::error!("Frame {} failed to draw: {}", self.frames_completed + 1, err);
                self.running.clear();
                self.state = DriverState::Stopped;
                return Err(err);
            }
            self.frames_completed += 1;
            log::trace!("Frame {} rendered", self.frames_completed);
            FrameOutcome::Rendered
        } else {
            log::trace!("Frame deferred: surface not drawable");
            FrameOutcome::Deferred
        };

        if self.running.is_set() {
            self.pending = Some(scheduler.request_frame());
        } else {
            self.state = DriverState::Stopped;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::FrameQueue;
    use crate::render::{RenderError, SurfaceSize};
    use crate::settings::VisualizationConfig;
    use crate::test_support::CountingBackend;

    struct Harness {
        driver: AnimationDriver,
        running: RunFlag,
        scene: SceneGraph,
        surface: RenderSurface,
        frames: FrameQueue,
    }

    fn harness(size: SurfaceSize) -> (Harness, crate::test_support::BackendProbe) {
        let (backend, probe) = CountingBackend::new();
        let config = VisualizationConfig::default().with_seed(2).with_particle_count(4);
        let running = RunFlag::new();
        running.set();
        let harness = Harness {
            driver: AnimationDriver::new(running.clone()),
            running,
            scene: SceneGraph::new(&config, size),
            surface: RenderSurface::attach(Box::new(backend), size).unwrap(),
            frames: FrameQueue::new(),
        };
        (harness, probe)
    }

    impl Harness {
        fn tick(&mut self) -> Vec<FrameOutcome> {
            self.frames
                .tick()
                .into_iter()
                .map(|request| {
                    self.driver
                        .run_frame(request, &mut self.scene, &mut self.surface, InteractionState::default(), &mut self.frames)
                        .unwrap()
                })
                .collect()
        }
    }

    #[test]
    fn test_start_then_one_frame_per_tick() {
        let (mut h, probe) = harness(SurfaceSize::new(8, 8));
        assert_eq!(h.driver.state(), DriverState::Idle);

        h.driver.start(&mut h.frames);
        assert_eq!(h.driver.state(), DriverState::Running);

        for _ in 0..3 {
            assert_eq!(h.tick(), vec![FrameOutcome::Rendered]);
        }
        assert_eq!(h.driver.frames_completed(), 3);
        assert_eq!(probe.draws(), 3);
        assert_eq!(h.frames.pending_count(), 1);
    }

    #[test]
    fn test_start_requires_running_flag() {
        let (mut h, _probe) = harness(SurfaceSize::new(8, 8));
        h.running.clear();
        h.driver.start(&mut h.frames);
        assert_eq!(h.driver.state(), DriverState::Idle);
        assert_eq!(h.frames.pending_count(), 0);
    }

    #[test]
    fn test_stop_cancels_pending_request() {
        let (mut h, probe) = harness(SurfaceSize::new(8, 8));
        h.driver.start(&mut h.frames);
        h.tick();

        h.running.clear();
        h.driver.stop(&mut h.frames);
        assert_eq!(h.driver.state(), DriverState::Stopped);
        assert_eq!(h.frames.pending_count(), 0);
        assert!(h.tick().is_empty());
        assert_eq!(probe.draws(), 1);
    }

    #[test]
    fn test_cleared_flag_prevents_work_and_reschedule() {
        let (mut h, probe) = harness(SurfaceSize::new(8, 8));
        h.driver.start(&mut h.frames);
        h.running.clear();

        assert_eq!(h.tick(), vec![FrameOutcome::Ignored]);
        assert_eq!(h.driver.state(), DriverState::Stopped);
        assert_eq!(h.frames.pending_count(), 0);
        assert_eq!(probe.draws(), 0);
    }

    #[test]
    fn test_stale_request_is_ignored() {
        let (mut h, _probe) = harness(SurfaceSize::new(8, 8));
        h.driver.start(&mut h.frames);
        let first = h.frames.tick()[0];
        h.driver
            .run_frame(first, &mut h.scene, &mut h.surface, InteractionState::default(), &mut h.frames)
            .unwrap();

        let replay = h
            .driver
            .run_frame(first, &mut h.scene, &mut h.surface, InteractionState::default(), &mut h.frames)
            .unwrap();
        assert_eq!(replay, FrameOutcome::Ignored);
        assert_eq!(h.driver.frames_completed(), 1);
        assert_eq!(h.frames.pending_count(), 1);
    }

    #[test]
    fn test_degenerate_surface_defers_without_advancing() {
        let (mut h, probe) = harness(SurfaceSize::new(0, 8));
        h.driver.start(&mut h.frames);

        assert_eq!(h.tick(), vec![FrameOutcome::Deferred]);
        assert_eq!(h.scene.shield().transform.rotation.x, 0.0);
        assert_eq!(probe.draws(), 0);
        assert_eq!(h.frames.pending_count(), 1);
    }

    #[test]
    fn test_draw_failure_stops_driver() {
        let (mut h, probe) = harness(SurfaceSize::new(8, 8));
        probe.fail_draws();
        h.driver.start(&mut h.frames);

        let request = h.frames.tick()[0];
        let result = h
            .driver
            .run_frame(request, &mut h.scene, &mut h.surface, InteractionState::default(), &mut h.frames);
        assert!(matches!(result, Err(RenderError::Backend(_))));
        assert_eq!(h.driver.state(), DriverState::Stopped);
        assert!(!h.running.is_set());
        assert_eq!(h.frames.pending_count(), 0);
    }
}
