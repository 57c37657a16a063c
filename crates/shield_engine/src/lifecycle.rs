//! # Lifecycle Controller
//!
//! `Visualization::mount` builds a session inside a host container:
//!
//! 1. Validate settings and attach the backend at the container size
//! 2. Build the scene graph and the interaction tracker
//! 3. Register the pointer-move and resize listeners
//! 4. Set the running flag and start the animation driver
//!
//! `teardown` undoes it: clear the running flag, unregister both listeners,
//! stop the driver (cancelling its pending frame) and release the surface.
//! Nothing owned by the session can be reached from a listener afterwards.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::animation::{AnimationDriver, DriverState, FrameOutcome, FrameRequestId, FrameScheduler, RunFlag};
use crate::events::{EventDispatcher, EventListener, HostEvent, HostEventKind, ListenerId};
use crate::foundation::math::Transform;
use crate::input::{InteractionState, InteractionTracker, WeakTracker};
use crate::render::{RenderBackend, RenderSurface, SurfaceSize};
use crate::scene::SceneGraph;
use crate::settings::VisualizationConfig;
use crate::{VisualizationError, VisualizationResult};

/// The host region a visualization mounts into
pub trait HostContainer {
    /// Current client size in device pixels; may be zero while hidden
    fn client_size(&self) -> SurfaceSize;
}

/// Container with a size set by the host
#[derive(Debug)]
pub struct FixedContainer {
    size: Cell<SurfaceSize>,
}

impl FixedContainer {
    /// Create a container of `width` x `height`
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Cell::new(SurfaceSize::new(width, height)),
        }
    }

    /// Change the size; listeners see it on the next resize event
    pub fn set_size(&self, width: u32, height: u32) {
        self.size.set(SurfaceSize::new(width, height));
    }
}

impl HostContainer for FixedContainer {
    fn client_size(&self) -> SurfaceSize {
        self.size.get()
    }
}

struct Session {
    scene: SceneGraph,
    surface: RenderSurface,
    driver: AnimationDriver,
}

/// Re-measures the container and resizes the surface and camera
struct ResizeListener {
    session: Weak<RefCell<Session>>,
    container: Rc<dyn HostContainer>,
    tracker: WeakTracker,
}

impl EventListener for ResizeListener {
    fn on_event(&mut self, event: &HostEvent) -> bool {
        if *event != HostEvent::Resize {
            return false;
        }
        let Some(shared) = self.session.upgrade() else {
            return false;
        };
        let Ok(mut guard) = shared.try_borrow_mut() else {
            log::warn!("Resize ignored: session busy");
            return false;
        };
        let session = &mut *guard;

        // A zero axis keeps its previous value.
        let previous = session.surface.size();
        let measured = self.container.client_size();
        let size = SurfaceSize::new(
            if measured.width == 0 { previous.width } else { measured.width },
            if measured.height == 0 { previous.height } else { measured.height },
        );

        match session.surface.resize(size, session.scene.camera_mut()) {
            Ok(true) => {
                if let Some(tracker) = self.tracker.upgrade() {
                    tracker.adopt_reference_if_degenerate(size);
                }
            }
            Ok(false) => {}
            Err(err) => log::error!("Resize to {}x{} failed: {}", size.width, size.height, err),
        }
        false
    }
}

/// A mounted visualization session
///
/// Call `teardown` to unregister the listeners and cancel the pending frame.
/// Dropping without it releases the surface, but the listeners stay in the
/// host's dispatcher as inert entries and the last frame request stays queued
/// until the host discards them.
pub struct Visualization {
    session: Option<Rc<RefCell<Session>>>,
    interaction: InteractionTracker,
    running: RunFlag,
    listeners: Vec<ListenerId>,
}

impl Visualization {
    /// Mount into `container` and request the first frame
    ///
    /// Fails without registering anything or requesting a frame when the
    /// settings are invalid or the backend cannot attach. A zero-sized
    /// container is not an error: frames are deferred until a resize reports
    /// a usable size.
    pub fn mount<B: RenderBackend + 'static>(
        container: Rc<dyn HostContainer>,
        backend: B,
        config: VisualizationConfig,
        events: &mut EventDispatcher,
        scheduler: &mut dyn FrameScheduler,
    ) -> VisualizationResult<Self> {
        config.validate()?;

        let size = container.client_size();
        let backend_name = backend.name();
        let surface = RenderSurface::attach(Box::new(backend), size).map_err(|err| {
            log::error!("Visualization not started: {}", err);
            err
        })?;

        let scene = SceneGraph::new(&config, size);
        let interaction = InteractionTracker::new(size);
        let running = RunFlag::new();
        let driver = AnimationDriver::new(running.clone());
        let session = Rc::new(RefCell::new(Session { scene, surface, driver }));

        let pointer = events.register(HostEventKind::PointerMove, Box::new(interaction.listener()));
        let resize = events.register(
            HostEventKind::Resize,
            Box::new(ResizeListener {
                session: Rc::downgrade(&session),
                container,
                tracker: interaction.downgrade(),
            }),
        );

        running.set();
        session.borrow_mut().driver.start(scheduler);

        log::info!("Visualization mounted at {}x{} on {} backend", size.width, size.height, backend_name);
        Ok(Self {
            session: Some(session),
            interaction,
            running,
            listeners: vec![pointer, resize],
        })
    }

    /// Handle a frame callback from the scheduler
    ///
    /// Requests that are stale, or arrive after teardown, are ignored.
    pub fn run_frame(&mut self, request: FrameRequestId, scheduler: &mut dyn FrameScheduler) -> VisualizationResult<FrameOutcome> {
        let Some(shared) = &self.session else {
            return Ok(FrameOutcome::Ignored);
        };
        let Ok(mut guard) = shared.try_borrow_mut() else {
            log::warn!("Frame {:?} skipped: session busy", request);
            return Ok(FrameOutcome::Ignored);
        };
        let session = &mut *guard;

        let outcome = session.driver.run_frame(
            request,
            &mut session.scene,
            &mut session.surface,
            self.interaction.current(),
            scheduler,
        )?;
        Ok(outcome)
    }

    /// Stop the loop, unregister listeners and release the surface
    ///
    /// Safe to call more than once.
    pub fn teardown(&mut self, events: &mut EventDispatcher, scheduler: &mut dyn FrameScheduler) {
        self.running.clear();

        for id in self.listeners.drain(..) {
            events.unregister(id);
        }

        let Some(shared) = self.session.take() else {
            return;
        };
        if let Ok(mut session) = shared.try_borrow_mut() {
            session.driver.stop(scheduler);
            session.surface.release();
        } else {
            log::warn!("Teardown while session busy; surface released when the session drops");
        }
        log::info!("Visualization torn down");
    }

    /// Whether the session is mounted and its loop may still run
    pub fn is_running(&self) -> bool {
        self.running.is_set() && self.session.is_some()
    }

    /// Driver state; `Stopped` once torn down
    pub fn state(&self) -> DriverState {
        self.with_session(|s| s.driver.state()).unwrap_or(DriverState::Stopped)
    }

    /// Frames drawn so far
    pub fn frames_completed(&self) -> u64 {
        self.with_session(|s| s.driver.frames_completed()).unwrap_or(0)
    }

    /// Latest normalized pointer state
    pub fn interaction(&self) -> InteractionState {
        self.interaction.current()
    }

    /// Current surface size
    pub fn surface_size(&self) -> VisualizationResult<SurfaceSize> {
        self.with_session(|s| s.surface.size())
    }

    /// Current camera aspect ratio
    pub fn camera_aspect(&self) -> VisualizationResult<f32> {
        self.with_scene(|scene| scene.camera().aspect)
    }

    /// Current shield transform
    pub fn shield_transform(&self) -> VisualizationResult<Transform> {
        self.with_scene(|scene| scene.shield().transform)
    }

    /// Current wireframe transform
    pub fn wireframe_transform(&self) -> VisualizationResult<Transform> {
        self.with_scene(|scene| scene.wireframe().transform)
    }

    /// Read access to the scene
    pub fn with_scene<R>(&self, f: impl FnOnce(&SceneGraph) -> R) -> VisualizationResult<R> {
        self.with_session(|s| f(&s.scene))
    }

    /// Read access to the backend, e.g. to capture the last frame
    pub fn with_backend<R>(&self, f: impl FnOnce(&dyn RenderBackend) -> R) -> VisualizationResult<R> {
        self.with_session(|s| f(s.surface.backend()))
    }

    fn with_session<R>(&self, f: impl FnOnce(&Session) -> R) -> VisualizationResult<R> {
        let shared = self.session.as_ref().ok_or(VisualizationError::NotRunning)?;
        let session = shared.try_borrow().map_err(|_| VisualizationError::NotRunning)?;
        Ok(f(&session))
    }
}

impl Drop for Visualization {
    fn drop(&mut self) {
        if self.session.take().is_some() {
            self.running.clear();
            log::warn!("Visualization dropped without teardown; inert listeners and frame request left with the host");
        }
    }
}
