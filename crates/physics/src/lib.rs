use cgmath::Vector2;
use instant::Instant;
use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;

mod body;
mod collision;
mod config;
mod drag;
mod gravity;
mod scenario;

pub use body::{Body, BodyKind, PLANET_PALETTE, SUN_COLOR};
pub use collision::{resolve_bodies, resolve_walls, Wall};
pub use config::{ConfigError, SimulationConfig, DEFAULT_MIN_DISTANCE, PLANETS_ENV, SEED_ENV};
pub use drag::MouseDrag;
pub use gravity::{ForceAccumulator, Gravity};
pub use scenario::{walls_around, Scenario, Viewport};

pub const PHYSICS_DELTA_TIME: Duration = Duration::from_micros(16_667);
pub const PHYSICS_MAX_BEHIND_TIME: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug)]
pub struct PhysicsResult {
    pub elapsed_real: Duration,
    pub elapsed_physics_ticks: u64,
}

/// Owns every body, wall and per-tick hook of one running simulation.
pub struct Simulation {
    config: SimulationConfig,
    viewport: Viewport,
    bodies: Vec<Body>,
    walls: Vec<Wall>,
    forces: Vec<Box<dyn ForceAccumulator>>,
    drag: MouseDrag,
    timestamp: Instant,
    tick: u64,
}

impl Simulation {
    pub fn new(config: SimulationConfig, viewport: Viewport) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let Scenario { bodies, .. } = Scenario::generate(&config, viewport, &mut rng);
        log::info!(
            "Spawned {} planets and a sun in a {}x{} viewport",
            config.planets,
            viewport.width,
            viewport.height
        );
        Self::with_bodies(config, viewport, bodies)
    }

    pub fn with_bodies(
        config: SimulationConfig,
        viewport: Viewport,
        bodies: Vec<Body>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let viewport = Viewport::new(viewport.width, viewport.height)?;
        for (index, body) in bodies.iter().enumerate() {
            body.validate()
                .map_err(|reason| ConfigError::InvalidBody { index, reason })?;
        }
        let gravity = Gravity::new(config.gravity_scale, config.min_distance);
        Ok(Self {
            walls: walls_around(viewport, config.wall_thickness, config.wall_restitution).to_vec(),
            drag: MouseDrag::new(config.drag_stiffness),
            forces: vec![Box::new(gravity)],
            config,
            viewport,
            bodies,
            timestamp: Instant::now(),
            tick: 0,
        })
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
    pub fn tick(&self) -> u64 {
        self.tick
    }
    pub fn drag(&self) -> &MouseDrag {
        &self.drag
    }

    /// Registers another hook, run after the ones already present.
    pub fn add_force(&mut self, force: impl ForceAccumulator + 'static) {
        self.forces.push(Box::new(force));
    }

    pub fn step(&mut self) {
        for force in &self.forces {
            force.accumulate(&mut self.bodies);
        }
        self.drag.apply(&mut self.bodies);
        let dt_ms = PHYSICS_DELTA_TIME.as_secs_f32() * 1000.0;
        self.bodies.iter_mut().for_each(|body| body.integrate(dt_ms));
        resolve_bodies(&mut self.bodies);
        resolve_walls(&mut self.bodies, &self.walls);
        debug_assert!(self.bodies.iter().all(Body::is_finite));
        self.tick += 1;
    }

    /// Steps until less than one tick remains before `target`.
    pub fn advance_to(&mut self, target: Instant) -> PhysicsResult {
        let before = Instant::now();
        let mut elapsed_physics_ticks = 0;
        loop {
            let lag = target.checked_duration_since(self.timestamp);
            match lag {
                lag if lag < Some(PHYSICS_DELTA_TIME) => break,
                lag if lag > Some(PHYSICS_MAX_BEHIND_TIME) => {
                    let new_timestamp = target - PHYSICS_DELTA_TIME;
                    log::error!(
                        "Physics computation far behind, dropping {}ms",
                        (new_timestamp - self.timestamp).as_millis()
                    );
                    self.timestamp = new_timestamp;
                }
                _ => {}
            }
            self.step();
            self.timestamp += PHYSICS_DELTA_TIME;
            elapsed_physics_ticks += 1;
        }
        PhysicsResult {
            elapsed_real: Instant::now() - before,
            elapsed_physics_ticks,
        }
    }

    /// Moves the walls to the new viewport edges, first pulling any body the
    /// new edges would cut back inside. Velocities are kept.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), ConfigError> {
        let viewport = Viewport::new(viewport.width, viewport.height)?;
        self.viewport = viewport;
        if self.walls.is_empty() {
            return Ok(());
        }
        let mut moved = 0;
        for body in &mut self.bodies {
            let pos = viewport.confine(body.pos, body.radius);
            if pos != body.pos {
                body.pos = pos;
                moved += 1;
            }
        }
        if moved > 0 {
            log::debug!(
                "Moved {moved} bodies inside the {}x{} viewport",
                viewport.width,
                viewport.height
            );
        }
        self.walls = walls_around(
            viewport,
            self.config.wall_thickness,
            self.config.wall_restitution,
        )
        .to_vec();
        Ok(())
    }

    pub fn grab(&mut self, point: Vector2<f32>) -> Option<usize> {
        let grabbed = self.drag.grab(&self.bodies, point);
        if let Some(index) = grabbed {
            log::debug!("Grabbed body {index} ({:?})", self.bodies[index].kind);
        }
        grabbed
    }
    pub fn move_pointer(&mut self, point: Vector2<f32>) {
        self.drag.move_to(point);
    }
    pub fn release(&mut self) {
        self.drag.release();
    }

    /// Tears the simulation down. Later steps do nothing.
    pub fn clear(&mut self) {
        log::info!(
            "Clearing simulation after {} ticks ({} bodies)",
            self.tick,
            self.bodies.len()
        );
        self.drag.release();
        self.bodies.clear();
        self.walls.clear();
        self.forces.clear();
    }
}
