use approx::assert_relative_eq;
use cgmath::{prelude::*, Vector2};
use instant::Instant;
use physics::{
    Body, BodyKind, ConfigError, ForceAccumulator, Simulation, SimulationConfig, Viewport,
    PHYSICS_DELTA_TIME,
};

fn viewport() -> Viewport {
    Viewport::new(800.0, 600.0).unwrap()
}

fn planet(x: f32, y: f32) -> Body {
    Body::new(BodyKind::Planet, Vector2::new(x, y), 5.0, 10.0).with_restitution(1.0)
}

fn simulation(bodies: Vec<Body>) -> Simulation {
    Simulation::with_bodies(SimulationConfig::default(), viewport(), bodies).unwrap()
}

fn dt_ms() -> f32 {
    PHYSICS_DELTA_TIME.as_secs_f32() * 1000.0
}

struct Push(Vector2<f32>);

impl ForceAccumulator for Push {
    fn accumulate(&self, bodies: &mut [Body]) {
        bodies.iter_mut().for_each(|b| b.force += self.0);
    }
}

#[test]
fn gravity_pulls_bodies_together_and_conserves_momentum() {
    let mut sim = simulation(vec![planet(300.0, 300.0), planet(500.0, 300.0)]);
    sim.step();
    let [a, b] = [sim.bodies()[0], sim.bodies()[1]];
    assert!(a.vel.x > 0.0);
    assert!(b.vel.x < 0.0);
    assert_relative_eq!(a.vel.x, -b.vel.x, epsilon = 1e-9);
    assert_eq!(a.force, Vector2::zero());
    assert_eq!(b.force, Vector2::zero());

    let expected = 0.001 * 5.0 * 5.0 / 200.0_f32.powi(2) / 5.0 * dt_ms().powi(2);
    assert_relative_eq!(a.vel.x, expected, max_relative = 1e-4);
}

#[test]
fn extra_hooks_run_after_gravity() {
    let mut sim = simulation(vec![planet(400.0, 300.0)]);
    sim.add_force(Push(Vector2::new(0.0, 0.01)));
    sim.step();
    let body = sim.bodies()[0];
    assert_relative_eq!(body.vel.y, 0.01 / 5.0 * dt_ms().powi(2), max_relative = 1e-5);
    assert_relative_eq!(body.pos.y, 300.0 + body.vel.y, max_relative = 1e-6);
    assert_eq!(body.vel.x, 0.0);
}

#[test]
fn coincident_bodies_never_go_non_finite() {
    let mut sim = simulation(vec![planet(400.0, 300.0), planet(400.0, 300.0)]);
    sim.step();
    let [a, b] = [sim.bodies()[0], sim.bodies()[1]];
    assert_relative_eq!(b.pos.x - a.pos.x, 20.0, epsilon = 1e-4);
    for _ in 0..120 {
        sim.step();
    }
    assert!(sim.bodies().iter().all(Body::is_finite));
}

#[test]
fn default_scene_runs_for_a_while() {
    let config = SimulationConfig {
        seed: Some(1234),
        ..Default::default()
    };
    let mut sim = Simulation::new(config, viewport()).unwrap();
    assert_eq!(sim.bodies().len(), 5);
    assert_eq!(sim.bodies()[4].kind, BodyKind::Sun);
    for _ in 0..600 {
        sim.step();
    }
    assert_eq!(sim.tick(), 600);
    assert!(sim.bodies().iter().all(Body::is_finite));
}

#[test]
fn bounces_off_the_right_wall() {
    let mut sim = simulation(vec![planet(785.0, 300.0).with_vel(Vector2::new(10.0, 0.0))]);
    sim.step();
    let body = sim.bodies()[0];
    assert_relative_eq!(body.vel.x, -10.0);
    assert!(body.pos.x <= 790.0);
}

#[test]
fn dragging_follows_the_pointer() {
    let mut sim = simulation(vec![planet(100.0, 100.0)]);
    assert_eq!(sim.grab(Vector2::new(105.0, 100.0)), Some(0));
    sim.move_pointer(Vector2::new(300.0, 100.0));
    for _ in 0..30 {
        sim.step();
    }
    assert_relative_eq!(sim.bodies()[0].pos.x, 300.0, epsilon = 0.5);

    sim.release();
    assert_eq!(sim.drag().grabbed(), None);
    assert_eq!(sim.grab(Vector2::new(700.0, 500.0)), None);
}

#[test]
fn advance_to_runs_whole_ticks() {
    let mut sim = simulation(vec![planet(100.0, 100.0)]);
    let target = Instant::now() + PHYSICS_DELTA_TIME * 3 + PHYSICS_DELTA_TIME / 2;
    let result = sim.advance_to(target);
    assert_eq!(result.elapsed_physics_ticks, 3);
    assert_eq!(sim.tick(), 3);

    assert_eq!(sim.advance_to(target).elapsed_physics_ticks, 0);
}

#[test]
fn advance_to_drops_backlog_when_far_behind() {
    let mut sim = simulation(vec![planet(100.0, 100.0)]);
    let result = sim.advance_to(Instant::now() + std::time::Duration::from_secs(5));
    assert_eq!(result.elapsed_physics_ticks, 1);
}

fn assert_inside(sim: &Simulation) {
    let Viewport { width, height } = sim.viewport();
    for body in sim.bodies() {
        assert!(
            (0.0..=width).contains(&body.pos.x) && (0.0..=height).contains(&body.pos.y),
            "body left the {width}x{height} viewport at {:?}",
            body.pos
        );
    }
}

#[test]
fn resize_moves_walls() {
    let mut sim = simulation(vec![]);
    sim.resize(Viewport::new(1000.0, 400.0).unwrap()).unwrap();
    assert_eq!(sim.viewport().width, 1000.0);
    assert_eq!(sim.walls()[1].min.y, 400.0);
    assert_eq!(sim.walls()[3].min.x, 1000.0);
}

#[test]
fn shrinking_pulls_bodies_back_inside() {
    let mut sim = simulation(vec![
        planet(700.0, 500.0).with_vel(Vector2::new(2.0, 1.0)),
        planet(100.0, 100.0),
    ]);
    sim.resize(Viewport::new(400.0, 300.0).unwrap()).unwrap();
    assert_eq!(sim.bodies()[0].pos, Vector2::new(390.0, 290.0));
    assert_eq!(sim.bodies()[0].vel, Vector2::new(2.0, 1.0));
    assert_eq!(sim.bodies()[1].pos, Vector2::new(100.0, 100.0));
    for _ in 0..600 {
        sim.step();
        assert_inside(&sim);
    }
}

#[test]
fn bodies_stay_bounded_after_collapsing_the_viewport() {
    let mut sim = simulation(vec![planet(400.0, 300.0).with_vel(Vector2::new(3.0, 0.0))]);
    sim.resize(Viewport::from((0, 0))).unwrap();
    for _ in 0..200 {
        sim.step();
    }
    sim.resize(viewport()).unwrap();
    assert_inside(&sim);
    for _ in 0..600 {
        sim.step();
        assert_inside(&sim);
    }
    assert!(sim.bodies().iter().all(Body::is_finite));
}

#[test]
fn invalid_resize_keeps_the_old_walls() {
    let mut sim = simulation(vec![planet(400.0, 300.0)]);
    let walls = sim.walls().to_vec();
    let result = sim.resize(Viewport {
        width: f32::NAN,
        height: 600.0,
    });
    assert!(matches!(result, Err(ConfigError::EmptyViewport { .. })));
    assert_eq!(sim.walls(), &walls[..]);
    assert_eq!(sim.viewport(), viewport());
}

#[test]
fn degenerate_bodies_are_rejected() {
    let sun = Body::new(BodyKind::Sun, Vector2::new(400.0, 300.0), 1000.0, 20.0);
    for mass in [0.0, -5.0, f32::NAN] {
        let result = Simulation::with_bodies(
            SimulationConfig::default(),
            viewport(),
            vec![Body { mass, ..planet(100.0, 100.0) }, sun],
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidBody { index: 0, .. })
        ));
    }
    let result = Simulation::with_bodies(
        SimulationConfig::default(),
        viewport(),
        vec![sun, planet(100.0, 100.0).with_vel(Vector2::new(f32::INFINITY, 0.0))],
    );
    assert!(matches!(
        result,
        Err(ConfigError::InvalidBody { index: 1, .. })
    ));
}

#[test]
fn clear_discards_everything() {
    let mut sim = Simulation::new(SimulationConfig::default(), viewport()).unwrap();
    sim.grab(viewport().center());
    sim.clear();
    assert!(sim.bodies().is_empty());
    assert!(sim.walls().is_empty());
    assert_eq!(sim.drag().grabbed(), None);
    sim.step();
    sim.resize(viewport()).unwrap();
    assert!(sim.walls().is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let config = SimulationConfig {
        planet_mass: -1.0,
        ..Default::default()
    };
    assert!(Simulation::new(config, viewport()).is_err());
    assert!(Simulation::with_bodies(
        SimulationConfig::default(),
        Viewport {
            width: 0.0,
            height: 10.0
        },
        vec![]
    )
    .is_err());
}
