use crate::body::Body;
use cgmath::Vector2;

/// Spring constraint between the pointer and a grabbed body.
#[derive(Clone, Debug, PartialEq)]
pub struct MouseDrag {
    stiffness: f32,
    pointer: Vector2<f32>,
    grabbed: Option<usize>,
}

impl MouseDrag {
    pub fn new(stiffness: f32) -> Self {
        Self {
            stiffness,
            pointer: Vector2::new(0.0, 0.0),
            grabbed: None,
        }
    }

    pub fn grabbed(&self) -> Option<usize> {
        self.grabbed
    }

    pub fn pointer(&self) -> Vector2<f32> {
        self.pointer
    }

    /// Grabs the topmost (last drawn) body under `point`.
    pub fn grab(&mut self, bodies: &[Body], point: Vector2<f32>) -> Option<usize> {
        self.pointer = point;
        self.grabbed = bodies.iter().rposition(|body| body.contains(point));
        self.grabbed
    }

    pub fn move_to(&mut self, point: Vector2<f32>) {
        self.pointer = point;
    }

    pub fn release(&mut self) -> Option<usize> {
        self.grabbed.take()
    }

    /// Sets the grabbed body's velocity to close `stiffness` of its gap to the
    /// pointer during the next integration. Releasing keeps that velocity, so
    /// bodies can be thrown.
    pub fn apply(&self, bodies: &mut [Body]) {
        if let Some(body) = self.grabbed.and_then(|index| bodies.get_mut(index)) {
            body.vel = (self.pointer - body.pos) * self.stiffness;
        }
    }
}
