//! Rendering library seam.
//!
//! The coordinator never talks to a window system directly. It asks a [`BackendFactory`]
//! for a [`RenderBackend`] on its own thread, initializes it once, and then drives it one
//! event at a time. [`HeadlessBackend`] is the software implementation used by the binary
//! and the tests.

use crate::error::{Result, ViewerError};
use crate::render::actor::{Actor, Rgb};
use nalgebra::UnitQuaternion;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One-time scene parameters handed to the backend while starting.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSetup {
    pub background: Rgb,
    pub actor_count: usize,
}

/// Result of servicing a single interaction event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Continue,
    /// The interactor has finished (window or headset session closed)
    Done,
}

/// Window, renderer, camera and interactor of one render session.
///
/// Implementations are created and used on the coordinator thread only, so they need not
/// be `Send`.
pub trait RenderBackend {
    /// Acquire window, camera and interactor and set the background.
    fn initialize(&mut self, setup: &SceneSetup) -> Result<()>;

    /// Register an actor with the renderer before the loop starts.
    fn add_actor(&mut self, actor: &Actor) -> Result<()>;

    /// Service one pending interaction event and render a frame of `actors`.
    ///
    /// May block briefly waiting for input; must not run a full event loop.
    fn service_event(&mut self, actors: &[Actor]) -> Result<EventOutcome>;

    /// Release everything acquired by `initialize`. Called exactly once per session,
    /// also after a failed `initialize`.
    fn release(&mut self);
}

/// Creates backends on the coordinator thread.
pub trait BackendFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn RenderBackend>>;
}

impl<F> BackendFactory for F
where
    F: Fn() -> Result<Box<dyn RenderBackend>> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn RenderBackend>> {
        self()
    }
}

/// Counters published by headless sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendStats {
    pub contexts_acquired: u64,
    pub contexts_released: u64,
    pub actors_registered: u64,
    pub frames: u64,
    pub background: Option<Rgb>,
    /// Orientation of each actor in the most recent frame
    pub last_frame: Vec<UnitQuaternion<f64>>,
    /// Number of visible actors in the most recent frame
    pub last_frame_visible: usize,
}

impl BackendStats {
    /// True while a session holds a render context
    pub fn is_live(&self) -> bool {
        self.contexts_acquired > self.contexts_released
    }
}

#[derive(Debug, Default)]
struct ProbeInner {
    stats: Mutex<BackendStats>,
    fail_init: Mutex<Option<String>>,
    close: AtomicBool,
}

/// Control-thread view of headless sessions: stats, injected failures and window close.
#[derive(Debug, Clone, Default)]
pub struct HeadlessProbe {
    inner: Arc<ProbeInner>,
}

impl HeadlessProbe {
    pub fn stats(&self) -> BackendStats {
        self.inner.stats.lock().clone()
    }

    /// Make the next `initialize` fail with `message`.
    pub fn fail_next_init(&self, message: impl Into<String>) {
        *self.inner.fail_init.lock() = Some(message.into());
    }

    /// Simulate the user closing the render window.
    pub fn close_window(&self) {
        self.inner.close.store(true, Ordering::SeqCst);
    }
}

/// Builds [`HeadlessBackend`]s that report into a shared [`HeadlessProbe`].
#[derive(Debug, Clone)]
pub struct HeadlessFactory {
    poll: Duration,
    probe: HeadlessProbe,
}

impl HeadlessFactory {
    pub fn new(poll: Duration) -> Self {
        Self {
            poll,
            probe: HeadlessProbe::default(),
        }
    }

    pub fn probe(&self) -> HeadlessProbe {
        self.probe.clone()
    }
}

impl BackendFactory for HeadlessFactory {
    fn create(&self) -> Result<Box<dyn RenderBackend>> {
        Ok(Box::new(HeadlessBackend {
            poll: self.poll,
            probe: self.probe.clone(),
            acquired: false,
        }))
    }
}

/// Software render session: waits `poll` per event and records each frame.
pub struct HeadlessBackend {
    poll: Duration,
    probe: HeadlessProbe,
    acquired: bool,
}

impl RenderBackend for HeadlessBackend {
    fn initialize(&mut self, setup: &SceneSetup) -> Result<()> {
        if let Some(message) = self.probe.inner.fail_init.lock().take() {
            return Err(ViewerError::initialization(message));
        }

        self.probe.inner.close.store(false, Ordering::SeqCst);
        let mut stats = self.probe.inner.stats.lock();
        stats.contexts_acquired += 1;
        stats.background = Some(setup.background);
        self.acquired = true;
        log::debug!(
            "headless context acquired for {} actors, background {}",
            setup.actor_count,
            setup.background
        );
        Ok(())
    }

    fn add_actor(&mut self, _actor: &Actor) -> Result<()> {
        self.probe.inner.stats.lock().actors_registered += 1;
        Ok(())
    }

    fn service_event(&mut self, actors: &[Actor]) -> Result<EventOutcome> {
        if !self.acquired {
            return Err(ViewerError::other("no render context"));
        }

        std::thread::sleep(self.poll);
        if self.probe.inner.close.swap(false, Ordering::SeqCst) {
            return Ok(EventOutcome::Done);
        }

        let mut stats = self.probe.inner.stats.lock();
        stats.frames += 1;
        stats.last_frame = actors.iter().map(Actor::orientation).collect();
        stats.last_frame_visible = actors.iter().filter(|a| a.display().visible).count();
        Ok(EventOutcome::Continue)
    }

    fn release(&mut self) {
        if self.acquired {
            self.acquired = false;
            self.probe.inner.stats.lock().contexts_released += 1;
        }
    }
}
