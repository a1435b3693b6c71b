use crate::{
    body::{Body, BodyKind, PLANET_PALETTE},
    collision::Wall,
    config::{ConfigError, SimulationConfig},
};
use cgmath::Vector2;
use rand::{seq::SliceRandom, Rng};
use rand_distr::{Distribution, Uniform};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Result<Self, ConfigError> {
        if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
            Ok(Self { width, height })
        } else {
            Err(ConfigError::EmptyViewport { width, height })
        }
    }
    pub fn center(&self) -> Vector2<f32> {
        Vector2::new(self.width / 2.0, self.height / 2.0)
    }
    /// Nearest position at which a disc of `radius` lies fully inside.
    /// Discs wider than the viewport are centered on that axis.
    pub fn confine(&self, pos: Vector2<f32>, radius: f32) -> Vector2<f32> {
        let axis = |value: f32, extent: f32| {
            if extent >= 2.0 * radius {
                value.clamp(radius, extent - radius)
            } else {
                extent / 2.0
            }
        };
        Vector2::new(axis(pos.x, self.width), axis(pos.y, self.height))
    }
}

impl From<(u32, u32)> for Viewport {
    fn from((width, height): (u32, u32)) -> Self {
        Self {
            width: width.max(1) as f32,
            height: height.max(1) as f32,
        }
    }
}

pub struct Scenario {
    /// Planets first, the sun last
    pub bodies: Vec<Body>,
    pub walls: [Wall; 4],
}

impl Scenario {
    pub fn generate(config: &SimulationConfig, viewport: Viewport, rng: &mut impl Rng) -> Self {
        let margin = config.spawn_margin.min(viewport.width / 2.0).min(viewport.height / 2.0);
        let xs = span(margin, viewport.width - margin);
        let ys = span(margin, viewport.height - margin);
        let vs = span(-config.velocity_factor, config.velocity_factor);

        let mut bodies: Vec<Body> = (0..config.planets)
            .map(|_| {
                let pos = Vector2::new(xs.sample(rng), ys.sample(rng));
                let vel = Vector2::new(vs.sample(rng), vs.sample(rng));
                Body::new(BodyKind::Planet, pos, config.planet_mass, config.planet_radius)
                    .with_vel(vel)
                    .with_restitution(config.planet_restitution)
                    .with_color(*PLANET_PALETTE.choose(rng).unwrap_or(&PLANET_PALETTE[0]))
            })
            .collect();
        bodies.push(
            Body::new(
                BodyKind::Sun,
                viewport.center(),
                config.sun_mass,
                config.sun_radius,
            )
            .with_restitution(config.sun_restitution),
        );

        Self {
            bodies,
            walls: walls_around(viewport, config.wall_thickness, config.wall_restitution),
        }
    }
}

/// Top, bottom, left and right walls, each lying just outside the viewport.
pub fn walls_around(viewport: Viewport, thickness: f32, restitution: f32) -> [Wall; 4] {
    let Viewport { width, height } = viewport;
    [
        Wall::from_center(
            Vector2::new(width / 2.0, -thickness / 2.0),
            Vector2::new(width, thickness),
            restitution,
        ),
        Wall::from_center(
            Vector2::new(width / 2.0, height + thickness / 2.0),
            Vector2::new(width, thickness),
            restitution,
        ),
        Wall::from_center(
            Vector2::new(-thickness / 2.0, height / 2.0),
            Vector2::new(thickness, height),
            restitution,
        ),
        Wall::from_center(
            Vector2::new(width + thickness / 2.0, height / 2.0),
            Vector2::new(thickness, height),
            restitution,
        ),
    ]
}

// `Uniform::new` panics on an empty range
fn span(low: f32, high: f32) -> Uniform<f32> {
    if low < high {
        Uniform::new(low, high)
    } else {
        Uniform::new_inclusive(low, low)
    }
}
