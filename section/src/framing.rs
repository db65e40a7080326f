//! Fitting a camera around a region of interest.
//!
//! Both framing modes leave the camera alone when there is nothing to frame
//! and report whether they changed anything.

use common::config::FramingConfig;
use tracing::{debug, info, warn};

use crate::{
    camera::{Camera, Projection},
    geometry::BoundingBox,
    plane::Plane,
    Pos,
};

/// Boxes smaller than this are framed as if they were this big, so a single
/// point still gets a usable projection.
const MIN_EXTENT: f64 = 1e-3;

#[derive(Clone, Debug, Default)]
pub struct ViewFramer {
    config: FramingConfig,
}

impl ViewFramer {
    pub fn new(config: FramingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FramingConfig {
        &self.config
    }

    /// Turns `camera` into an orthographic camera looking straight down the
    /// plane normal at the given points, usually a slice contour.
    pub fn frame_contour<'a>(
        &self,
        plane: &Plane,
        points: impl IntoIterator<Item = &'a Pos>,
        camera: &mut Camera,
    ) -> bool {
        let bounds = BoundingBox::from_points(points);
        if bounds.is_empty() {
            debug!("Nothing to frame, keeping contour camera");
            return false;
        }

        let center = bounds.center();
        let half_extent = bounds.max_dimension().max(MIN_EXTENT) * self.config.contour_padding;
        let distance = self.config.contour_distance;

        let normal = plane.normal();
        let mut up = self.config.contour_up;
        if up.cross(&normal).norm() < 1e-6 {
            warn!("Contour up vector is parallel to the plane normal, using plane basis");
            up = plane.basis().1;
        }

        *camera = Camera {
            eye: center + normal * distance,
            target: center,
            up,
            projection: Projection::Orthographic {
                half_width: half_extent,
                half_height: half_extent,
                near: self.config.near,
                far: distance * 2.0,
            },
        };

        info!(
            "Framed contour {{ center: {:?}, half_extent: {:.3} }}",
            center, half_extent
        );
        true
    }

    /// Moves `camera` so the whole box fits in view from a three-quarter
    /// angle. The camera's projection kind is kept.
    pub fn frame_scene(&self, bounds: &BoundingBox, camera: &mut Camera) -> bool {
        if bounds.is_empty() {
            debug!("Nothing to frame, keeping scene camera");
            return false;
        }

        let center = bounds.center();
        let max_dim = bounds.max_dimension().max(MIN_EXTENT);

        let distance = match &mut camera.projection {
            Projection::Perspective { fov, .. } => (max_dim / (*fov / 2.0).sin()).abs(),
            Projection::Orthographic {
                half_width,
                half_height,
                ..
            } => {
                let aspect = *half_width / *half_height;
                *half_height = max_dim * self.config.contour_padding;
                *half_width = *half_height * aspect;
                max_dim * 2.0
            }
        };

        camera.eye = center + self.config.scene_offset * distance;
        camera.target = center;

        info!(
            "Framed scene {{ center: {:?}, distance: {:.3} }}",
            center, distance
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builder::MeshBuilder, plane::Axis, slicer::slice};

    #[test]
    fn empty_input_is_noop() {
        let framer = ViewFramer::default();
        let mut camera = Camera::default();
        let before = camera.clone();

        assert!(!framer.frame_contour(&Plane::default(), std::iter::empty(), &mut camera));
        assert!(!framer.frame_scene(&BoundingBox::empty(), &mut camera));
        assert_eq!(camera, before);
    }

    #[test]
    fn contour_fills_view() {
        let mesh = MeshBuilder::new()
            .cuboid(Pos::repeat(-1.0), Pos::repeat(1.0))
            .build();
        let plane = Plane::from_axis(Axis::Y);
        let contour = slice(&plane, mesh.world_triangles());

        let framer = ViewFramer::default();
        let mut camera = Camera::default();
        assert!(framer.frame_contour(&plane, contour.points(), &mut camera));

        assert_eq!(camera.target, Pos::zeros());
        assert_eq!(camera.eye, Pos::new(0.0, 1000.0, 0.0));
        assert_eq!(camera.up, Pos::x());
        assert!(matches!(
            camera.projection,
            Projection::Orthographic { half_width, half_height, .. }
                if (half_width - 2.4).abs() < 1e-12 && half_height == half_width
        ));

        // Everything lands inside the padded view
        for point in contour.points() {
            let ndc = camera.project(point);
            assert!(ndc.x.abs() <= 1.0 / 1.2 + 1e-9);
            assert!(ndc.y.abs() <= 1.0 / 1.2 + 1e-9);
            assert!(ndc.z.abs() < 1.0);
        }
    }

    #[test]
    fn contour_up_falls_back() {
        let framer = ViewFramer::default();
        let plane = Plane::from_axis(Axis::X);
        let mut camera = Camera::default();

        assert!(framer.frame_contour(&plane, &[Pos::new(0.0, 1.0, 2.0)], &mut camera));
        assert!(camera.up.cross(&plane.normal()).norm() > 0.5);
        assert!(camera.ray(nalgebra::Vector2::zeros()).is_some());
    }

    #[test]
    fn scene_fits_field_of_view() {
        let framer = ViewFramer::default();
        let mut camera = Camera::default();
        let bounds = BoundingBox::from_points(&[Pos::repeat(-1.0), Pos::repeat(1.0)]);

        assert!(framer.frame_scene(&bounds, &mut camera));

        let distance = 2.0 / 20f64.to_radians().sin();
        assert_eq!(camera.target, Pos::zeros());
        assert!((camera.eye - Pos::new(0.5, -0.8, 0.5) * distance).norm() < 1e-9);

        for corner in [Pos::repeat(-1.0), Pos::repeat(1.0), Pos::new(1.0, -1.0, 1.0)] {
            let ndc = camera.project(&corner);
            assert!(ndc.x.abs() < 1.0 && ndc.y.abs() < 1.0);
        }
    }
}
