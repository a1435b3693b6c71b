use cgmath::{prelude::*, Vector2};

pub const SUN_COLOR: u32 = 0xffff00ff;
/// Planet fill colors, picked at random per planet. Packed as `0xRRGGBBAA`.
pub const PLANET_PALETTE: [u32; 6] = [
    0x556270ff, 0x4ecdc4ff, 0xc7f464ff, 0xff6b6bff, 0xc44d58ff, 0xf4a259ff,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Planet,
    Sun,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Body {
    pub pos: Vector2<f32>,
    /// Pixels per tick
    pub vel: Vector2<f32>,
    /// Sum of forces applied since the last integration
    pub force: Vector2<f32>,
    pub mass: f32,
    pub radius: f32,
    pub restitution: f32,
    pub kind: BodyKind,
    pub color: u32,
}

impl Body {
    pub fn new(kind: BodyKind, pos: Vector2<f32>, mass: f32, radius: f32) -> Self {
        Self {
            pos,
            vel: Vector2::zero(),
            force: Vector2::zero(),
            mass,
            radius,
            restitution: 0.0,
            kind,
            color: match kind {
                BodyKind::Planet => PLANET_PALETTE[0],
                BodyKind::Sun => SUN_COLOR,
            },
        }
    }
    pub fn with_vel(self, vel: Vector2<f32>) -> Self {
        Self { vel, ..self }
    }
    pub fn with_restitution(self, restitution: f32) -> Self {
        Self {
            restitution,
            ..self
        }
    }
    pub fn with_color(self, color: u32) -> Self {
        Self { color, ..self }
    }
    pub fn inv_mass(&self) -> f32 {
        1.0 / self.mass
    }
    pub fn contains(&self, point: Vector2<f32>) -> bool {
        (point - self.pos).magnitude2() <= self.radius.powi(2)
    }
    pub fn is_finite(&self) -> bool {
        self.pos.x.is_finite()
            && self.pos.y.is_finite()
            && self.vel.x.is_finite()
            && self.vel.y.is_finite()
            && self.force.x.is_finite()
            && self.force.y.is_finite()
    }
    /// Checks what the integrator and collision response divide by or scale with.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.mass > 0.0 && self.mass.is_finite()) {
            Err("mass must be positive and finite")
        } else if !(self.radius > 0.0 && self.radius.is_finite()) {
            Err("radius must be positive and finite")
        } else if !(0.0..=1.0).contains(&self.restitution) {
            Err("restitution must lie in [0, 1]")
        } else if !self.is_finite() {
            Err("position, velocity and force must be finite")
        } else {
            Ok(())
        }
    }
    /// Applies the accumulated force over `dt_ms` and clears it.
    ///
    /// Time is scaled the way the velocity is stored: a force `f` changes the
    /// velocity by `f / mass * dt²` per tick, with `dt` in milliseconds.
    pub(crate) fn integrate(&mut self, dt_ms: f32) {
        self.vel += self.force * (self.inv_mass() * dt_ms * dt_ms);
        self.pos += self.vel;
        self.force = Vector2::zero();
    }
}
