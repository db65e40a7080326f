use crate::Pos;

pub mod bounding_box;
pub mod triangle;

pub use bounding_box::BoundingBox;

/// Three world-space points. Meshes are treated as an unordered soup of
/// these, no shared topology is required.
pub type Triangle = [Pos; 3];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Pos,
    pub direction: Pos,
}

/// A ray surface intersection in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub position: Pos,
    /// World-space distance from the ray origin.
    pub distance: f64,
    pub face: usize,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    pub fn new(origin: Pos, direction: Pos) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn at(&self, t: f64) -> Pos {
        self.origin + self.direction * t
    }
}
