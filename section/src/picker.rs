//! Turning clicks into surface points.

use nalgebra::Vector2;
use tracing::{debug, trace};

use crate::{
    camera::{Camera, Viewport},
    geometry::{Hit, Ray},
    mesh::Mesh,
    overlay::{Overlay, Style},
    Pos,
};

/// Anything a pick ray can hit.
pub trait Pickable {
    /// Closest hit in front of the ray origin, in world space.
    fn intersect_ray(&self, ray: &Ray) -> Option<Hit>;
}

impl Pickable for Mesh {
    fn intersect_ray(&self, ray: &Ray) -> Option<Hit> {
        Mesh::intersect_ray(self, ray)
    }
}

/// What happens once a picker holds as many points as it can.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapacityPolicy {
    /// The owner takes the points with [`PointPicker::consume`] as soon as the
    /// picker fills up.
    AutoConsume,
    /// Points stay until the next one is added, which starts a new list
    /// containing only that point.
    ResetOnOverflow,
}

#[derive(Debug)]
pub struct PickedPoint<M> {
    pub position: Pos,
    /// Exclusively owned. Disposed when the point leaves its picker.
    pub marker: M,
    /// Index in the picker at the time the point was added.
    pub order: usize,
}

/// An ordered, bounded list of picked points along with their markers.
#[derive(Debug)]
pub struct PointPicker<M> {
    policy: CapacityPolicy,
    capacity: usize,
    style: Style,
    marker_radius: f64,

    points: Vec<PickedPoint<M>>,
}

/// Casts the ray under `screen` against every candidate, returning the
/// closest hit. A miss is `None`, not an error.
pub fn pick<'a>(
    screen: Vector2<f64>,
    candidates: impl IntoIterator<Item = &'a dyn Pickable>,
    camera: &Camera,
    viewport: &Viewport,
) -> Option<Hit> {
    let ndc = viewport.to_ndc(screen);
    let ray = camera.ray(ndc)?;

    let hit = candidates
        .into_iter()
        .filter_map(|x| x.intersect_ray(&ray))
        .min_by(|a, b| a.distance.total_cmp(&b.distance));

    match &hit {
        Some(hit) => debug!("Picked {:?} at distance {:.3}", hit.position, hit.distance),
        None => trace!("Pick missed {{ ndc: {:?} }}", ndc),
    }

    hit
}

impl<M> PointPicker<M> {
    pub fn new(policy: CapacityPolicy, style: Style, marker_radius: f64) -> Self {
        Self {
            policy,
            capacity: 2,
            style,
            marker_radius,
            points: Vec::new(),
        }
    }

    pub fn with_capacity(self, capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            ..self
        }
    }

    /// Picks a surface point without touching the list.
    pub fn pick<'a>(
        &self,
        screen: Vector2<f64>,
        candidates: impl IntoIterator<Item = &'a dyn Pickable>,
        camera: &Camera,
        viewport: &Viewport,
    ) -> Option<Pos> {
        pick(screen, candidates, camera, viewport).map(|x| x.position)
    }

    /// Appends a point and spawns its marker. A full picker is emptied first,
    /// so the list never grows past its capacity.
    pub fn add_point<O>(&mut self, overlay: &mut O, position: Pos) -> &PickedPoint<M>
    where
        O: Overlay<Marker = M>,
    {
        if self.is_full() {
            if self.policy == CapacityPolicy::AutoConsume {
                debug!("Auto consuming picker was never consumed, starting over");
            }
            self.clear_points(overlay);
        }

        let marker = overlay.spawn_marker(position, self.marker_radius, self.style);
        let order = self.points.len();
        self.points.push(PickedPoint {
            position,
            marker,
            order,
        });

        &self.points[order]
    }

    /// Takes the positions out of a full auto consuming picker, disposing
    /// their markers. Does nothing otherwise.
    pub fn consume<O>(&mut self, overlay: &mut O) -> Option<Vec<Pos>>
    where
        O: Overlay<Marker = M>,
    {
        if self.policy != CapacityPolicy::AutoConsume || !self.is_full() {
            return None;
        }

        let positions = self.positions();
        self.clear_points(overlay);
        Some(positions)
    }

    pub fn clear_points<O>(&mut self, overlay: &mut O)
    where
        O: Overlay<Marker = M>,
    {
        for point in self.points.drain(..) {
            overlay.dispose_marker(point.marker);
        }
    }

    pub fn remove_last_point<O>(&mut self, overlay: &mut O) -> Option<Pos>
    where
        O: Overlay<Marker = M>,
    {
        let point = self.points.pop()?;
        overlay.dispose_marker(point.marker);
        Some(point.position)
    }

    pub fn points(&self) -> &[PickedPoint<M>] {
        &self.points
    }

    pub fn positions(&self) -> Vec<Pos> {
        self.points.iter().map(|x| x.position).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.points.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> CapacityPolicy {
        self.policy
    }
}
