//! Infinite cutting planes.
//!
//! A [`Plane`] is the set of points `p` where `normal · p - offset == 0`. The
//! normal is renormalized on every mutation so it always has unit length, and
//! updates that would leave it zero or non-finite are rejected.

use std::fmt;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector2};
use tracing::{debug, warn};

use crate::{
    error::{Result, SectionError},
    Pos,
};

/// Points closer together than this are treated as coincident.
const COINCIDENT_EPSILON: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    normal: Pos,
    offset: f64,
}

/// Inputs to [`Plane::from_two_points`] besides the points themselves.
#[derive(Clone, Copy, Debug)]
pub struct Derivation {
    /// Direction the camera is looking in, any length. Zero when there is no
    /// usable view direction.
    pub view_direction: Pos,
    /// Used in place of the view direction when the picked points line up
    /// with it.
    pub world_up: Pos,
    /// Minimum length of the cross product before falling back to
    /// `world_up`.
    pub parallel_threshold: f64,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn unit(&self) -> Pos {
        match self {
            Axis::X => Pos::x(),
            Axis::Y => Pos::y(),
            Axis::Z => Pos::z(),
        }
    }
}

impl Plane {
    /// Creates a plane from any non-zero normal. The normal is normalized.
    /// Returns `None` for a zero or non-finite normal.
    pub fn new(normal: Pos, offset: f64) -> Option<Self> {
        Some(Self {
            normal: unit_vector(normal)?,
            offset,
        })
    }

    pub fn from_axis(axis: Axis) -> Self {
        Self {
            normal: axis.unit(),
            offset: 0.0,
        }
    }

    /// Derives the plane passing through the midpoint of `p1` and `p2` that
    /// contains the direction from `p1` to `p2`.
    ///
    /// The normal is perpendicular to both that direction and the view
    /// direction, so the cut is seen edge on. When the points line up with the
    /// view direction, `world_up` is used instead.
    pub fn from_two_points(p1: Pos, p2: Pos, derivation: &Derivation) -> Result<Self> {
        let direction = p2 - p1;
        if direction.norm() <= COINCIDENT_EPSILON {
            return Err(SectionError::degenerate("picked points are coincident"));
        }
        let direction = direction.normalize();
        // A missing view direction falls through to world up
        let view = unit_vector(derivation.view_direction).unwrap_or_else(Pos::zeros);
        let too_short = |x: &Pos| {
            let norm = x.norm();
            !norm.is_finite() || norm < derivation.parallel_threshold
        };

        let mut cross = direction.cross(&view);
        if too_short(&cross) {
            debug!("Points are parallel to the view direction, using world up");
            cross = direction.cross(&derivation.world_up);
        }

        if too_short(&cross) {
            warn!("Points are parallel to both the view direction and world up");
            return Err(SectionError::degenerate(
                "direction is parallel to the view direction and world up",
            ));
        }

        let normal = cross.normalize();
        let midpoint = (p1 + p2) / 2.0;
        Ok(Self {
            normal,
            offset: normal.dot(&midpoint),
        })
    }

    pub fn normal(&self) -> Pos {
        self.normal
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Snaps the plane to an axis through the origin.
    pub fn set_axis(&mut self, axis: Axis) {
        self.normal = axis.unit();
        self.offset = 0.0;
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    /// Returns false and keeps the current normal if `normal` is zero or
    /// non-finite.
    pub fn set_normal(&mut self, normal: Pos) -> bool {
        match unit_vector(normal) {
            Some(normal) => {
                self.normal = normal;
                true
            }
            None => false,
        }
    }

    /// Positive on the side the normal points to.
    pub fn signed_distance(&self, point: &Pos) -> f64 {
        self.normal.dot(point) - self.offset
    }

    pub fn project(&self, point: &Pos) -> Pos {
        point - self.normal * self.signed_distance(point)
    }

    /// Point on the plane closest to the world origin.
    pub fn origin(&self) -> Pos {
        self.normal * self.offset
    }

    /// Two orthonormal axes spanning the plane, with `u × v = normal`.
    pub fn basis(&self) -> (Pos, Pos) {
        // Pick whichever world axis is least aligned with the normal
        let helper = match self.normal.iamin() {
            0 => Pos::x(),
            1 => Pos::y(),
            _ => Pos::z(),
        };

        let u = helper.cross(&self.normal).normalize();
        let v = self.normal.cross(&u);
        (u, v)
    }

    /// Coordinates of a point within the plane, measured from
    /// [`Plane::origin`] along the axes of [`Plane::basis`]. Whatever lies off
    /// the plane is dropped.
    pub fn to_plane_coords(&self, point: &Pos) -> Vector2<f64> {
        let (u, v) = self.basis();
        let local = point - self.origin();
        Vector2::new(local.dot(&u), local.dot(&v))
    }

    /// Placement for a flat overlay quad modeled in the XY plane: rotates +Z
    /// onto the normal and moves it to [`Plane::origin`].
    pub fn overlay_transform(&self) -> Isometry3<f64> {
        let rotation = UnitQuaternion::rotation_between(&Pos::z(), &self.normal)
            .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Pos::x_axis(), std::f64::consts::PI));
        Isometry3::from_parts(Translation3::from(self.origin()), rotation)
    }
}

fn unit_vector(vector: Pos) -> Option<Pos> {
    vector
        .try_normalize(COINCIDENT_EPSILON)
        .filter(|x| x.iter().all(|c| c.is_finite()))
}

impl Default for Plane {
    fn default() -> Self {
        Self::from_axis(Axis::Y)
    }
}

impl Default for Derivation {
    fn default() -> Self {
        Self {
            view_direction: -Pos::z(),
            world_up: Pos::y(),
            parallel_threshold: 0.1,
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.normal;
        write!(
            f,
            "({:.4}, {:.4}, {:.4}) · p = {:.4}",
            n.x, n.y, n.z, self.offset
        )
    }
}
