//! The render loop run on the coordinator thread.
//!
//! Each iteration services one interaction event, then applies the queued rotation rates
//! to every actor if at least one tick interval has passed. Animation cost therefore never
//! delays event servicing by more than one tick's work.

use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::render::actor::{Actor, Rgb};
use crate::render::backend::{EventOutcome, RenderBackend, SceneSetup};
use crate::render::protocol::{CommandState, RotationRates};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a loop iteration ended the session, if it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    Continue,
    /// A `Stop` command was observed at the top of the iteration
    StopRequested,
    /// The backend's interactor finished on its own
    InteractorDone,
}

/// Apply one tick of rotation to all actors: X for every actor, then Y, then Z.
pub fn apply_rates(actors: &mut [Actor], rates: RotationRates) {
    if rates.x != 0.0 {
        actors.iter_mut().for_each(|a| a.rotate_x(rates.x));
    }
    if rates.y != 0.0 {
        actors.iter_mut().for_each(|a| a.rotate_y(rates.y));
    }
    if rates.z != 0.0 {
        actors.iter_mut().for_each(|a| a.rotate_z(rates.z));
    }
}

pub struct RenderLoop {
    backend: Box<dyn RenderBackend>,
    actors: Vec<Actor>,
    commands: Arc<CommandState>,
    tick_interval: Duration,
    last_tick: Instant,
    ticks: u64,
}

impl RenderLoop {
    /// Starting phase: initialize the backend and register every actor.
    ///
    /// On failure the backend is released before the error is returned, so nothing is
    /// left half-acquired.
    pub fn start(
        mut backend: Box<dyn RenderBackend>,
        actors: Vec<Actor>,
        commands: Arc<CommandState>,
        config: &ViewerConfig,
    ) -> Result<Self> {
        let setup = SceneSetup {
            background: Rgb::from(config.background),
            actor_count: actors.len(),
        };

        let prepared = backend
            .initialize(&setup)
            .and_then(|()| actors.iter().try_for_each(|a| backend.add_actor(a)));
        if let Err(err) = prepared {
            backend.release();
            return Err(match err {
                ViewerError::Initialization { .. } => err,
                other => ViewerError::initialization(other.to_string()),
            });
        }

        Ok(Self {
            backend,
            actors,
            commands,
            tick_interval: config.tick_interval(),
            last_tick: Instant::now(),
            ticks: 0,
        })
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// One loop iteration.
    pub fn step(&mut self) -> Result<LoopStatus> {
        if self.commands.stop_requested() {
            return Ok(LoopStatus::StopRequested);
        }

        match self.backend.service_event(&self.actors)? {
            EventOutcome::Done => Ok(LoopStatus::InteractorDone),
            EventOutcome::Continue => {
                self.maybe_tick(Instant::now());
                Ok(LoopStatus::Continue)
            }
        }
    }

    /// Run until stopped or the interactor finishes; returns the reason.
    pub fn run(&mut self) -> Result<LoopStatus> {
        loop {
            match self.step()? {
                LoopStatus::Continue => continue,
                done => return Ok(done),
            }
        }
    }

    /// Apply the current rates if a full tick interval has elapsed since the last tick.
    pub fn maybe_tick(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_tick) < self.tick_interval {
            return false;
        }

        let rates = self.commands.rates();
        apply_rates(&mut self.actors, rates);
        log::trace!("tick {} applied {:?}", self.ticks, rates);
        self.last_tick = now;
        self.ticks += 1;
        true
    }

    /// Stopping phase: release the render context and drop the actor snapshot.
    pub fn shutdown(mut self) -> u64 {
        self.backend.release();
        self.actors.clear();
        self.ticks
    }

    #[cfg(test)]
    fn rewind_last_tick(&mut self, at: Instant) {
        self.last_tick = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Mesh, Triangle};
    use crate::render::backend::tests::MockBackend;
    use crate::render::protocol::Command;
    use nalgebra::{Point3, Vector3};
    use parking_lot::Mutex;

    fn actor() -> Actor {
        let mut mesh = Mesh::default();
        mesh.push(Triangle::new(
            Vector3::z(),
            [Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
        ));
        Actor::new(Arc::new(mesh))
    }

    fn degrees(actor: &Actor) -> f64 {
        actor.orientation().angle().to_degrees()
    }

    fn start_loop(backend: MockBackend, commands: Arc<CommandState>) -> RenderLoop {
        RenderLoop::start(
            Box::new(backend),
            vec![actor(), actor()],
            commands,
            &ViewerConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn repeated_command_applies_one_rotation_per_tick() {
        let commands = Arc::new(CommandState::new());
        let mut render = start_loop(MockBackend::default(), Arc::clone(&commands));
        let t0 = Instant::now();
        render.rewind_last_tick(t0);

        commands.issue(Command::RotateX(5.0));
        commands.issue(Command::RotateX(5.0));

        assert!(!render.maybe_tick(t0 + Duration::from_millis(5)));
        assert!(render.actors().iter().all(|a| degrees(a) == 0.0));

        assert!(render.maybe_tick(t0 + Duration::from_millis(21)));
        for a in render.actors() {
            assert!((degrees(a) - 5.0).abs() < 1e-9);
        }

        // the next tick is gated on the new timestamp
        assert!(!render.maybe_tick(t0 + Duration::from_millis(30)));
        assert_eq!(render.ticks(), 1);
    }

    #[test]
    fn stop_is_seen_before_servicing_events() {
        let commands = Arc::new(CommandState::new());
        let events = Arc::new(Mutex::new(0));
        let backend = MockBackend {
            events: Arc::clone(&events),
            ..MockBackend::default()
        };
        let mut render = start_loop(backend, Arc::clone(&commands));

        assert_eq!(render.step().unwrap(), LoopStatus::Continue);
        commands.issue(Command::Stop);
        assert_eq!(render.run().unwrap(), LoopStatus::StopRequested);
        assert_eq!(*events.lock(), 1);
    }

    #[test]
    fn interactor_done_ends_run() {
        let released = Arc::new(Mutex::new(0));
        let backend = MockBackend {
            outcomes: [EventOutcome::Continue, EventOutcome::Continue, EventOutcome::Done]
                .into_iter()
                .collect(),
            released: Arc::clone(&released),
            ..MockBackend::default()
        };
        let mut render = start_loop(backend, Arc::new(CommandState::new()));

        assert_eq!(render.run().unwrap(), LoopStatus::InteractorDone);
        render.shutdown();
        assert_eq!(*released.lock(), 1);
    }

    #[test]
    fn failed_initialize_releases_backend() {
        let released = Arc::new(Mutex::new(0));
        let backend = MockBackend {
            fail_init: true,
            released: Arc::clone(&released),
            ..MockBackend::default()
        };

        let result = RenderLoop::start(
            Box::new(backend),
            vec![actor()],
            Arc::new(CommandState::new()),
            &ViewerConfig::default(),
        );
        assert!(matches!(result, Err(ViewerError::Initialization { .. })));
        assert_eq!(*released.lock(), 1);
    }

    #[test]
    fn rates_apply_per_axis_in_order() {
        let mut actors = vec![actor()];
        apply_rates(
            &mut actors,
            RotationRates {
                x: 90.0,
                y: 0.0,
                z: 90.0,
            },
        );

        // X then Z about the actor's own axes
        let expected = nalgebra::UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 90f64.to_radians())
            * nalgebra::UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 90f64.to_radians());
        assert!(actors[0].orientation().angle_to(&expected) < 1e-6);
    }
}
