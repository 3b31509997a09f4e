//! The render coordinator: a dedicated thread owning the VR render loop.
//!
//! ```text
//! Idle --start()--> Starting --ready--> Running --Stop / window closed--> Stopping --> Idle
//!   ^                  |
//!   +---init failed----+
//! ```
//!
//! The control thread stages actors while Idle, calls [`RenderCoordinator::start`] and then
//! only talks to the running loop through [`RenderCoordinator::issue_command`]. The actor
//! snapshot handed to the thread is private to it; later colour or visibility edits reach
//! it through the actors' shared property bags.

use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::render::actor::Actor;
use crate::render::backend::BackendFactory;
use crate::render::protocol::{Command, CommandState};
use crate::render::service::{LoopStatus, RenderLoop};
use crate::scene::NodeId;
use parking_lot::Mutex;
use std::fmt;
use std::sync::mpsc::sync_channel;
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Starting,
    Running,
    Stopping,
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoordinatorState::Idle => "Idle",
            CoordinatorState::Starting => "Starting",
            CoordinatorState::Running => "Running",
            CoordinatorState::Stopping => "Stopping",
        };
        f.write_str(name)
    }
}

/// Lifecycle notifications sent back to the control thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    Started,
    /// The loop ended; `ticks` animation steps were applied during the session
    Stopped { ticks: u64 },
    /// The loop ended on a backend error
    Failed(String),
}

/// A drawable staged for the VR view, tagged with the scene node that produced it.
#[derive(Debug, Clone)]
pub struct RenderableRef {
    pub node: NodeId,
    pub actor: Actor,
}

impl RenderableRef {
    pub fn new(node: NodeId, actor: Actor) -> Self {
        Self { node, actor }
    }
}

/// Resets the shared state to Idle when the render thread exits, panics included.
struct IdleOnExit(Arc<Mutex<CoordinatorState>>);

impl Drop for IdleOnExit {
    fn drop(&mut self) {
        *self.0.lock() = CoordinatorState::Idle;
    }
}

type WorkerHandle = JoinHandle<Result<u64>>;

pub struct RenderCoordinator {
    config: ViewerConfig,
    factory: Arc<dyn BackendFactory>,
    commands: Arc<CommandState>,
    state: Arc<Mutex<CoordinatorState>>,
    staged: Vec<RenderableRef>,
    worker: Option<WorkerHandle>,
    events: Option<UnboundedSender<CoordinatorEvent>>,
}

impl RenderCoordinator {
    pub fn new(config: ViewerConfig, factory: Arc<dyn BackendFactory>) -> Self {
        Self {
            config,
            factory,
            commands: Arc::new(CommandState::new()),
            state: Arc::new(Mutex::new(CoordinatorState::Idle)),
            staged: Vec::new(),
            worker: None,
            events: None,
        }
    }

    /// Deliver lifecycle events to `tx` from the render thread.
    pub fn with_events(mut self, tx: UnboundedSender<CoordinatorEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn state(&self) -> CoordinatorState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == CoordinatorState::Running
    }

    pub fn staged(&self) -> &[RenderableRef] {
        &self.staged
    }

    /// Stage an actor for the next session, applying the configured initial placement.
    ///
    /// Only accepted while Idle; a live scene may not be mutated from this thread.
    pub fn stage(&mut self, mut renderable: RenderableRef) -> Result<()> {
        self.ensure_idle("cannot stage actors into a live scene")?;
        renderable.actor.apply_placement(&self.config.placement);
        self.staged.push(renderable);
        Ok(())
    }

    /// Drop all staged actors. Only accepted while Idle.
    pub fn clear_staged(&mut self) -> Result<()> {
        self.ensure_idle("cannot clear actors of a live scene")?;
        self.staged.clear();
        Ok(())
    }

    /// Spawn the render thread and wait until its scene is initialized.
    ///
    /// Returns once the loop is Running; the loop itself runs on the new thread. If the
    /// backend cannot be initialized the coordinator is back in Idle when this returns.
    pub fn start(&mut self) -> Result<()> {
        self.reap_finished();
        {
            let mut state = self.state.lock();
            if *state != CoordinatorState::Idle {
                return Err(ViewerError::AlreadyRunning);
            }
            *state = CoordinatorState::Starting;
        }
        self.commands.reset();
        log::info!("starting render coordinator with {} actors", self.staged.len());

        let (ready_tx, ready_rx) = sync_channel::<Result<()>>(1);
        let actors: Vec<Actor> = self.staged.iter().map(|r| r.actor.clone()).collect();
        let factory = Arc::clone(&self.factory);
        let commands = Arc::clone(&self.commands);
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let config = self.config.clone();

        let spawned = std::thread::Builder::new()
            .name("render-coordinator".to_string())
            .spawn(move || -> Result<u64> {
                let _idle = IdleOnExit(Arc::clone(&state));

                let mut render = match factory
                    .create()
                    .and_then(|backend| RenderLoop::start(backend, actors, commands, &config))
                {
                    Ok(render) => render,
                    Err(err) => {
                        let message = err.to_string();
                        let _ = ready_tx.send(Err(err));
                        return Err(ViewerError::initialization(message));
                    }
                };

                *state.lock() = CoordinatorState::Running;
                let _ = ready_tx.send(Ok(()));
                notify(&events, CoordinatorEvent::Started);

                let outcome = render.run();
                *state.lock() = CoordinatorState::Stopping;
                let ticks = render.shutdown();

                match outcome {
                    Ok(status) => {
                        log::info!("render loop ended ({:?}) after {} ticks", status, ticks);
                        if status == LoopStatus::InteractorDone {
                            log::debug!("interactor closed the session");
                        }
                        notify(&events, CoordinatorEvent::Stopped { ticks });
                        Ok(ticks)
                    }
                    Err(err) => {
                        log::error!("render loop failed: {}", err);
                        notify(&events, CoordinatorEvent::Failed(err.to_string()));
                        Err(err)
                    }
                }
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                *self.state.lock() = CoordinatorState::Idle;
                return Err(ViewerError::initialization(format!(
                    "failed to spawn render thread: {}",
                    e
                )));
            }
        };

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.worker = Some(handle);
                Ok(())
            }
            Ok(Err(err)) => {
                log::warn!("render coordinator failed to start: {}", err);
                let _ = handle.join();
                Err(err)
            }
            Err(_) => {
                let _ = handle.join();
                Err(ViewerError::initialization(
                    "render thread exited during startup",
                ))
            }
        }
    }

    /// Update the shared command state. Never blocks. While Idle the value is stored and
    /// cleared by the next `start`.
    pub fn issue_command(&self, command: Command) {
        log::debug!("issue {:?} while {}", command, self.state());
        self.commands.issue(command);
    }

    /// Request termination and wait for the render thread to finish.
    ///
    /// Returns the number of ticks applied in the session (0 if nothing was running).
    pub fn stop(&mut self) -> Result<u64> {
        self.issue_command(Command::Stop);
        self.join()
    }

    /// Wait for the render thread without requesting termination.
    pub fn join(&mut self) -> Result<u64> {
        match self.worker.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ViewerError::coordinator("render thread panicked"))?,
            None => Ok(0),
        }
    }

    /// Join a session that ended on its own (window closed or backend error).
    fn reap_finished(&mut self) {
        if self.worker.is_some() && self.state() == CoordinatorState::Idle {
            if let Err(err) = self.join() {
                log::warn!("previous render session ended with error: {}", err);
            }
        }
    }

    fn ensure_idle(&self, message: &str) -> Result<()> {
        let state = self.state();
        if state == CoordinatorState::Idle {
            Ok(())
        } else {
            log::warn!("{} (coordinator is {})", message, state);
            Err(ViewerError::concurrency_misuse(state, message))
        }
    }
}

impl Drop for RenderCoordinator {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.stop();
        }
    }
}

fn notify(events: &Option<UnboundedSender<CoordinatorEvent>>, event: CoordinatorEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}
