use crate::body::Body;
use cgmath::{prelude::*, Vector2};

/// Per-tick hook run before integration. Implementations add into
/// [`Body::force`] and never touch velocity or position.
pub trait ForceAccumulator {
    fn accumulate(&self, bodies: &mut [Body]);
}

/// Pairwise Newtonian attraction, `scale * m_a * m_b / r²` along the line
/// between the two centers.
///
/// Distances below `min_distance` are clamped to it when computing the
/// magnitude. Two bodies at exactly the same position attract each other with
/// zero force, since the direction is undefined.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Gravity {
    pub scale: f32,
    pub min_distance: f32,
}

impl Gravity {
    pub fn new(scale: f32, min_distance: f32) -> Self {
        Self {
            scale,
            min_distance,
        }
    }

    /// Force exerted on `a` by `b`.
    pub fn pair_force(&self, a: &Body, b: &Body) -> Vector2<f32> {
        let rel_pos = b.pos - a.pos;
        let distance = rel_pos.magnitude();
        if !(distance > 0.0 && distance.is_finite()) {
            return Vector2::zero();
        }
        let rel_pos_norm = rel_pos / distance;
        let clamped = distance.max(self.min_distance);
        let force = self.scale * a.mass * b.mass / clamped.powi(2) * rel_pos_norm;
        if force.x.is_finite() && force.y.is_finite() {
            force
        } else {
            Vector2::zero()
        }
    }

    /// Net gravitational force on every body, in the order of `bodies`.
    pub fn net_forces(&self, bodies: &[Body]) -> Vec<Vector2<f32>> {
        let mut forces = vec![Vector2::zero(); bodies.len()];
        for (i, a) in bodies.iter().enumerate() {
            for (j, b) in bodies.iter().enumerate().skip(i + 1) {
                let force = self.pair_force(a, b);
                forces[i] += force;
                forces[j] -= force;
            }
        }
        forces
    }
}

impl ForceAccumulator for Gravity {
    fn accumulate(&self, bodies: &mut [Body]) {
        let forces = self.net_forces(bodies);
        bodies
            .iter_mut()
            .zip(forces)
            .for_each(|(body, force)| body.force += force);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyKind;
    use approx::assert_relative_eq;

    fn body(x: f32, y: f32, mass: f32) -> Body {
        Body::new(BodyKind::Planet, Vector2::new(x, y), mass, 1.0)
    }

    fn unit_gravity() -> Gravity {
        Gravity::new(1.0, 1e-3)
    }

    #[test]
    fn two_bodies_attract_each_other() {
        let forces = unit_gravity().net_forces(&[body(0.0, 0.0, 10.0), body(10.0, 0.0, 10.0)]);
        assert_relative_eq!(forces[0].x, 1.0);
        assert_relative_eq!(forces[0].y, 0.0);
        assert_relative_eq!(forces[1].x, -1.0);
        assert_relative_eq!(forces[1].y, 0.0);
    }

    #[test]
    fn magnitude_scales_with_masses_and_inverse_square() {
        let gravity = Gravity::new(0.001, 1e-3);
        let a = body(3.0, 4.0, 5.0);
        let b = body(6.0, 8.0, 1000.0);
        let force = gravity.pair_force(&a, &b);
        assert_relative_eq!(force.magnitude(), 0.001 * 5.0 * 1000.0 / 25.0, epsilon = 1e-6);
        assert_relative_eq!(force.normalize().x, 0.6, epsilon = 1e-6);
        assert_relative_eq!(force.normalize().y, 0.8, epsilon = 1e-6);
        assert_relative_eq!(
            gravity.pair_force(&b, &a).magnitude(),
            force.magnitude(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn three_bodies_superpose() {
        let bodies = [body(0.0, 0.0, 1.0), body(10.0, 0.0, 1.0), body(0.0, 10.0, 1.0)];
        let forces = unit_gravity().net_forces(&bodies);
        assert_relative_eq!(forces[0].x, 0.01, epsilon = 1e-7);
        assert_relative_eq!(forces[0].y, 0.01, epsilon = 1e-7);
    }

    #[test]
    fn net_force_matches_ordered_pair_sum() {
        let gravity = Gravity::new(0.01, 1e-3);
        let bodies = [
            body(12.0, -3.0, 5.0),
            body(-40.0, 7.5, 5.0),
            body(100.0, 250.0, 1000.0),
            body(33.0, 33.0, 2.5),
            body(-8.0, -90.0, 7.0),
        ];
        let forces = gravity.net_forces(&bodies);
        for (i, a) in bodies.iter().enumerate() {
            let expected: Vector2<f32> = bodies
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, b)| gravity.pair_force(a, b))
                .sum();
            assert_relative_eq!(forces[i].x, expected.x, epsilon = 1e-5);
            assert_relative_eq!(forces[i].y, expected.y, epsilon = 1e-5);
        }
    }

    #[test]
    fn empty_and_single_collections_are_no_ops() {
        let mut none: [Body; 0] = [];
        unit_gravity().accumulate(&mut none);

        let mut one = [body(1.0, 2.0, 3.0)];
        unit_gravity().accumulate(&mut one);
        assert_eq!(one[0].force, Vector2::zero());
    }

    #[test]
    fn coincident_bodies_stay_finite() {
        let mut bodies = [body(5.0, 5.0, 10.0), body(5.0, 5.0, 10.0), body(5.0, 5.0001, 1.0)];
        unit_gravity().accumulate(&mut bodies);
        for b in &bodies {
            assert!(b.force.x.is_finite() && b.force.y.is_finite());
        }
        assert_eq!(unit_gravity().pair_force(&bodies[0], &bodies[1]), Vector2::zero());
    }

    #[test]
    fn close_pairs_are_clamped() {
        let gravity = Gravity::new(1.0, 1.0);
        let force = gravity.pair_force(&body(0.0, 0.0, 2.0), &body(0.25, 0.0, 3.0));
        assert_relative_eq!(force.x, 6.0);
        assert_relative_eq!(force.y, 0.0);
    }

    #[test]
    fn repeated_computation_is_identical() {
        let bodies = [body(0.0, 0.0, 1.0), body(7.0, 1.0, 2.0), body(-3.0, 9.0, 4.0)];
        let gravity = unit_gravity();
        assert_eq!(gravity.net_forces(&bodies), gravity.net_forces(&bodies));
    }

    #[test]
    fn accumulate_adds_to_existing_force() {
        let mut bodies = [body(0.0, 0.0, 10.0), body(10.0, 0.0, 10.0)];
        bodies[0].force = Vector2::new(0.0, 2.0);
        unit_gravity().accumulate(&mut bodies);
        assert_relative_eq!(bodies[0].force.x, 1.0);
        assert_relative_eq!(bodies[0].force.y, 2.0);
        assert_relative_eq!(bodies[1].vel.x, 0.0);
        assert_relative_eq!(bodies[1].pos.x, 10.0);
    }
}
