use crate::body::Body;
use cgmath::{prelude::*, Vector2};

/// Static axis-aligned rectangle with infinite mass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Wall {
    pub min: Vector2<f32>,
    pub max: Vector2<f32>,
    pub restitution: f32,
}

impl Wall {
    pub fn from_center(center: Vector2<f32>, size: Vector2<f32>, restitution: f32) -> Self {
        Self {
            min: center - size / 2.0,
            max: center + size / 2.0,
            restitution,
        }
    }
    pub fn center(&self) -> Vector2<f32> {
        (self.min + self.max) / 2.0
    }
    pub fn size(&self) -> Vector2<f32> {
        self.max - self.min
    }
}

/// Resolves every overlapping pair once. Returns the number of contacts.
pub fn resolve_bodies(bodies: &mut [Body]) -> usize {
    let mut contacts = 0;
    for j in 1..bodies.len() {
        let (left, right) = bodies.split_at_mut(j);
        let b = &mut right[0];
        for a in left.iter_mut() {
            if resolve_pair(a, b) {
                contacts += 1;
            }
        }
    }
    contacts
}

pub fn resolve_walls(bodies: &mut [Body], walls: &[Wall]) -> usize {
    let mut contacts = 0;
    for body in bodies.iter_mut() {
        for wall in walls {
            if resolve_wall(body, wall) {
                contacts += 1;
            }
        }
    }
    contacts
}

fn resolve_pair(a: &mut Body, b: &mut Body) -> bool {
    let rel_pos = b.pos - a.pos;
    let distance2 = rel_pos.magnitude2();
    let reach = a.radius + b.radius;
    if distance2 >= reach.powi(2) {
        return false;
    }
    let (normal, distance) = if distance2 > 0.0 {
        let distance = distance2.sqrt();
        (rel_pos / distance, distance)
    } else {
        // Coincident centers have no contact normal, split along x
        (Vector2::unit_x(), 0.0)
    };
    let inv_mass_sum = a.inv_mass() + b.inv_mass();

    // Push apart, the lighter body moving further
    let overlap = reach - distance;
    a.pos -= normal * (overlap * a.inv_mass() / inv_mass_sum);
    b.pos += normal * (overlap * b.inv_mass() / inv_mass_sum);

    let approach = (a.vel - b.vel).dot(normal);
    if approach <= 0.0 {
        // Already separating
        return true;
    }
    let restitution = a.restitution.max(b.restitution);
    let impulse = (1.0 + restitution) * approach / inv_mass_sum;
    a.vel -= normal * (impulse * a.inv_mass());
    b.vel += normal * (impulse * b.inv_mass());
    true
}

fn resolve_wall(body: &mut Body, wall: &Wall) -> bool {
    let closest = Vector2::new(
        body.pos.x.clamp(wall.min.x, wall.max.x),
        body.pos.y.clamp(wall.min.y, wall.max.y),
    );
    let rel_pos = body.pos - closest;
    let distance2 = rel_pos.magnitude2();
    if distance2 >= body.radius.powi(2) {
        return false;
    }
    let (normal, depth) = if distance2 > 0.0 {
        let distance = distance2.sqrt();
        (rel_pos / distance, body.radius - distance)
    } else {
        // Center is inside the wall, leave through the nearest face
        let exits = [
            (Vector2::new(-1.0, 0.0), body.pos.x - wall.min.x),
            (Vector2::new(1.0, 0.0), wall.max.x - body.pos.x),
            (Vector2::new(0.0, -1.0), body.pos.y - wall.min.y),
            (Vector2::new(0.0, 1.0), wall.max.y - body.pos.y),
        ];
        let (normal, inside) = exits
            .into_iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((Vector2::unit_y(), 0.0));
        (normal, inside + body.radius)
    };
    body.pos += normal * depth;

    let normal_vel = body.vel.dot(normal);
    if normal_vel < 0.0 {
        let restitution = body.restitution.max(wall.restitution);
        body.vel -= normal * ((1.0 + restitution) * normal_vel);
    }
    true
}
