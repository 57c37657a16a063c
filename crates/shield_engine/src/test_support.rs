//! Backends for unit tests

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::render::{RenderBackend, RenderError, RenderResult, SurfaceSize};
use crate::scene::SceneGraph;

#[derive(Debug, Default)]
struct ProbeState {
    attached: Option<SurfaceSize>,
    resizes: Vec<SurfaceSize>,
    draws: usize,
    releases: usize,
    fail_draws: bool,
    last_shield_position: Option<[f32; 3]>,
}

/// Records every backend call; read through its `BackendProbe`
pub struct CountingBackend {
    state: Rc<RefCell<ProbeState>>,
    attached: bool,
}

/// Test-side view of a `CountingBackend`
#[derive(Clone)]
pub struct BackendProbe {
    state: Rc<RefCell<ProbeState>>,
}

impl CountingBackend {
    pub fn new() -> (Self, BackendProbe) {
        let state = Rc::new(RefCell::new(ProbeState::default()));
        (
            Self { state: Rc::clone(&state), attached: false },
            BackendProbe { state },
        )
    }
}

impl BackendProbe {
    pub fn attached_size(&self) -> Option<SurfaceSize> {
        self.state.borrow().attached
    }

    pub fn resizes(&self) -> Vec<SurfaceSize> {
        self.state.borrow().resizes.clone()
    }

    pub fn draws(&self) -> usize {
        self.state.borrow().draws
    }

    pub fn releases(&self) -> usize {
        self.state.borrow().releases
    }

    pub fn last_shield_position(&self) -> Option<[f32; 3]> {
        self.state.borrow().last_shield_position
    }

    pub fn fail_draws(&self) {
        self.state.borrow_mut().fail_draws = true;
    }
}

impl RenderBackend for CountingBackend {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn attach(&mut self, size: SurfaceSize) -> RenderResult<()> {
        self.state.borrow_mut().attached = Some(size);
        self.attached = true;
        Ok(())
    }

    fn resize(&mut self, size: SurfaceSize) -> RenderResult<()> {
        self.state.borrow_mut().resizes.push(size);
        Ok(())
    }

    fn draw(&mut self, scene: &SceneGraph) -> RenderResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_draws {
            return Err(RenderError::Backend("injected draw failure".to_string()));
        }
        state.draws += 1;
        state.last_shield_position = Some(scene.shield().transform.position.into());
        Ok(())
    }

    fn release(&mut self) {
        self.state.borrow_mut().releases += 1;
        self.attached = false;
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Backend whose context can never be acquired
pub struct FailingBackend;

impl RenderBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn attach(&mut self, _size: SurfaceSize) -> RenderResult<()> {
        Err(RenderError::ContextUnavailable("no drawing context in this environment".to_string()))
    }

    fn resize(&mut self, _size: SurfaceSize) -> RenderResult<()> {
        Err(RenderError::Released)
    }

    fn draw(&mut self, _scene: &SceneGraph) -> RenderResult<()> {
        Err(RenderError::Released)
    }

    fn release(&mut self) {}

    fn is_attached(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
