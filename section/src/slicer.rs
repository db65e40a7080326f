//! Plane / mesh intersection.
//!
//! Slicing is a single linear pass over a triangle soup with no acceleration
//! structure. Large meshes re-sliced every frame should go through
//! [`SliceCache`], which only recomputes when the plane or the mesh set
//! changes.

use nalgebra::Vector2;
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::{
    geometry::{triangle::plane_triangle_intersection, BoundingBox, Triangle},
    mesh_set::MeshSet,
    plane::Plane,
    Pos,
};

/// One cut through a triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub a: Pos,
    pub b: Pos,
}

/// The unordered set of segments produced by cutting some triangles with a
/// plane.
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    plane: Plane,
    segments: Vec<Segment>,
}

/// Memoizes the contour of a [`MeshSet`], keyed on the plane and the set's
/// version.
#[derive(Debug, Default)]
pub struct SliceCache {
    key: Option<(Plane, u64)>,
    contour: Contour,
}

/// Cuts every triangle with the plane. Triangles that don't straddle the
/// plane, including coplanar ones, contribute nothing.
pub fn slice(plane: &Plane, triangles: impl IntoIterator<Item = Triangle>) -> Contour {
    let segments = triangles
        .into_iter()
        .filter_map(|x| plane_triangle_intersection(plane, &x))
        .map(|[a, b]| Segment { a, b })
        .collect::<Vec<_>>();

    Contour {
        plane: *plane,
        segments,
    }
}

impl Segment {
    pub fn length(&self) -> f64 {
        (self.b - self.a).norm()
    }
}

impl Contour {
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Every segment endpoint, two per segment.
    pub fn points(&self) -> impl Iterator<Item = &Pos> {
        self.segments.iter().flat_map(|x| [&x.a, &x.b])
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.points())
    }

    pub fn perimeter(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }

    /// The segments in plane coordinates, see [`Plane::to_plane_coords`].
    pub fn to_2d(&self) -> Vec<[Vector2<f64>; 2]> {
        let flatten = |p: &Pos| self.plane.to_plane_coords(p);
        self.segments
            .iter()
            .map(|x| [flatten(&x.a), flatten(&x.b)])
            .collect()
    }

    /// Chains segments whose endpoints are within `tolerance` of each other
    /// into polylines. A closed loop repeats its first point at the end.
    pub fn polylines(&self, tolerance: f64) -> Vec<Vec<Pos>> {
        let mut remaining = self.segments.clone();
        let mut polylines = Vec::new();

        while let Some(start) = remaining.pop() {
            let mut line = vec![start.a, start.b];
            if !extend_polyline(&mut line, &mut remaining, tolerance) {
                // Open chain, so try growing it from the other end too
                line.reverse();
                extend_polyline(&mut line, &mut remaining, tolerance);
            }

            polylines.push(line);
        }

        polylines
    }
}

impl Default for Contour {
    fn default() -> Self {
        Self {
            plane: Plane::default(),
            segments: Vec::new(),
        }
    }
}

impl SliceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-slices the visible meshes if the plane or mesh set changed since the
    /// last call. Returns true when the contour was recomputed.
    pub fn refresh(&mut self, plane: &Plane, meshes: &MeshSet) -> bool {
        let key = (*plane, meshes.version());
        if self.key == Some(key) {
            debug!("Contour cache hit");
            return false;
        }

        self.contour = slice(plane, meshes.world_triangles());
        self.key = Some(key);
        debug!(
            "Sliced {} meshes {{ segments: {} }}",
            meshes.visible().count(),
            self.contour.len()
        );
        true
    }

    pub fn contour(&self) -> &Contour {
        &self.contour
    }

    /// Drops the cached contour, the next refresh always slices.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.contour = Contour::default();
    }
}

// This is n², but contours from interactive meshes are small enough that it
// doesn't matter.
/// Greedily appends the nearest connected segment to the end of `line`.
/// Returns true if the chain closed back onto its first point.
fn extend_polyline(line: &mut Vec<Pos>, remaining: &mut Vec<Segment>, tolerance: f64) -> bool {
    loop {
        let last = line[line.len() - 1];
        // (index, distance to the nearer endpoint, whether that's `b`)
        let Some((idx, near, flip)) = remaining
            .iter()
            .enumerate()
            .map(|(idx, x)| {
                let (a, b) = ((x.a - last).norm(), (x.b - last).norm());
                if a <= b {
                    (idx, a, false)
                } else {
                    (idx, b, true)
                }
            })
            .min_by_key(|(_, near, _)| OrderedFloat(*near))
        else {
            return false;
        };

        if near > tolerance {
            return false;
        }

        let segment = remaining.swap_remove(idx);
        let next = if flip { segment.a } else { segment.b };

        if (next - line[0]).norm() <= tolerance {
            line.push(line[0]);
            return true;
        }

        line.push(next);
    }
}
