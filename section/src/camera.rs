use common::config::{CameraConfig, FramingConfig};
use nalgebra::{Matrix4, Point3, Vector2, Vector3};

use crate::{geometry::Ray, Pos};

/// A look-at camera. Only what picking, measuring, and framing need is kept
/// here, orbit controls belong to whoever drives the camera.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Pos,
    pub target: Pos,
    pub up: Pos,
    pub projection: Projection,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians.
        fov: f64,
        aspect: f64,
        near: f64,
        far: f64,
    },
    Orthographic {
        half_width: f64,
        half_height: f64,
        near: f64,
        far: f64,
    },
}

/// The screen rectangle the camera renders into, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Camera {
    pub fn perspective(eye: Pos, target: Pos, fov: f64, aspect: f64) -> Self {
        Self {
            eye,
            target,
            up: Vector3::y(),
            projection: Projection::Perspective {
                fov,
                aspect,
                near: 0.1,
                far: 10_000.0,
            },
        }
    }

    /// The starting camera described by the config.
    pub fn from_config(camera: &CameraConfig, framing: &FramingConfig, aspect: f64) -> Self {
        Self {
            eye: camera.position,
            target: camera.target,
            up: Vector3::y(),
            projection: Projection::Perspective {
                fov: camera.fov.to_radians(),
                aspect,
                near: framing.near,
                far: framing.far,
            },
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f64> {
        Matrix4::look_at_rh(
            &Point3::from(self.eye),
            &Point3::from(self.target),
            &self.up,
        )
    }

    pub fn projection_matrix(&self) -> Matrix4<f64> {
        match self.projection {
            Projection::Perspective {
                fov,
                aspect,
                near,
                far,
            } => Matrix4::new_perspective(aspect, fov, near, far),
            Projection::Orthographic {
                half_width,
                half_height,
                near,
                far,
            } => Matrix4::new_orthographic(
                -half_width,
                half_width,
                -half_height,
                half_height,
                near,
                far,
            ),
        }
    }

    pub fn view_projection(&self) -> Matrix4<f64> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Unit vector from the eye towards the target, or zero when the eye
    /// sits on the target.
    pub fn direction(&self) -> Pos {
        (self.target - self.eye)
            .try_normalize(0.0)
            .unwrap_or_else(Pos::zeros)
    }

    /// Builds the ray under a point in normalized device coordinates.
    ///
    /// Perspective rays start at the eye. Orthographic rays start on the near
    /// plane and all point along [`Camera::direction`]. Returns `None` if the
    /// view projection matrix can't be inverted.
    pub fn ray(&self, ndc: Vector2<f64>) -> Option<Ray> {
        let inverse = self.view_projection().try_inverse()?;
        let unproject = |z: f64| {
            let point = inverse * Vector3::new(ndc.x, ndc.y, z).push(1.0);
            point.xyz() / point.w
        };

        let (near, far) = (unproject(-1.0), unproject(1.0));
        let origin = match self.projection {
            Projection::Perspective { .. } => self.eye,
            Projection::Orthographic { .. } => near,
        };

        Some(Ray::new(origin, far - near))
    }

    /// Projects a world space point into normalized device coordinates.
    pub fn project(&self, point: &Pos) -> Pos {
        let clip = self.view_projection() * point.push(1.0);
        clip.xyz() / clip.w
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Maps a screen position to normalized device coordinates. The screen's
    /// y axis points down, NDC's points up.
    pub fn to_ndc(&self, screen: Vector2<f64>) -> Vector2<f64> {
        Vector2::new(
            (screen.x - self.left) / self.width * 2.0 - 1.0,
            -((screen.y - self.top) / self.height) * 2.0 + 1.0,
        )
    }

    /// Maps normalized device coordinates to pixels measured from the
    /// viewport's top left corner.
    pub fn to_pixels(&self, ndc: Vector2<f64>) -> Vector2<f64> {
        Vector2::new(
            (ndc.x * 0.5 + 0.5) * self.width,
            (ndc.y * -0.5 + 0.5) * self.height,
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), &FramingConfig::default(), 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Pos, b: Pos) {
        assert!((a - b).norm() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn perspective_center_ray() {
        let camera = Camera::perspective(Pos::new(0.0, 0.0, 10.0), Pos::zeros(), 1.0, 1.5);
        let ray = camera.ray(Vector2::zeros()).unwrap();

        assert_close(ray.origin, camera.eye);
        assert_close(ray.direction, -Pos::z());
        assert_close(camera.direction(), -Pos::z());
    }

    #[test]
    fn eye_on_target_has_no_direction() {
        let camera = Camera::perspective(Pos::repeat(2.0), Pos::repeat(2.0), 1.0, 1.0);
        assert_eq!(camera.direction(), Pos::zeros());
    }

    #[test]
    fn ray_passes_through_projected_point() {
        let camera = Camera::perspective(Pos::new(3.0, 4.0, 12.0), Pos::new(0.0, 1.0, 0.0), 0.8, 1.0);
        let point = Pos::new(1.0, -0.5, 2.0);

        let ndc = camera.project(&point);
        let ray = camera.ray(ndc.xy()).unwrap();

        let t = (point - ray.origin).dot(&ray.direction);
        assert_close(ray.at(t), point);
    }

    #[test]
    fn orthographic_rays_are_parallel() {
        let camera = Camera {
            eye: Pos::new(0.0, 0.0, 10.0),
            target: Pos::zeros(),
            up: Pos::y(),
            projection: Projection::Orthographic {
                half_width: 4.0,
                half_height: 2.0,
                near: 0.1,
                far: 100.0,
            },
        };

        let center = camera.ray(Vector2::zeros()).unwrap();
        let edge = camera.ray(Vector2::new(1.0, -1.0)).unwrap();

        assert_close(center.direction, -Pos::z());
        assert_close(edge.direction, -Pos::z());
        assert_close(edge.origin - center.origin, Pos::new(4.0, -2.0, 0.0));
        assert!((center.origin.z - 9.9).abs() < 1e-9);
    }

    #[test]
    fn projects_target_to_center() {
        let camera = Camera::default();
        let ndc = camera.project(&camera.target);
        assert!(ndc.x.abs() < 1e-9 && ndc.y.abs() < 1e-9);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }

    #[test]
    fn viewport_mapping() {
        let viewport = Viewport::new(800.0, 600.0);

        assert_eq!(viewport.to_ndc(Vector2::new(400.0, 300.0)), Vector2::zeros());
        assert_eq!(viewport.to_ndc(Vector2::new(0.0, 0.0)), Vector2::new(-1.0, 1.0));
        assert_eq!(viewport.to_ndc(Vector2::new(800.0, 600.0)), Vector2::new(1.0, -1.0));

        assert_eq!(viewport.to_pixels(Vector2::new(-1.0, 1.0)), Vector2::zeros());
        assert_eq!(viewport.to_pixels(Vector2::new(0.5, -0.5)), Vector2::new(600.0, 450.0));
    }

    #[test]
    fn viewport_offset() {
        let viewport = Viewport {
            left: 100.0,
            top: 50.0,
            width: 200.0,
            height: 100.0,
        };

        assert_eq!(viewport.to_ndc(Vector2::new(200.0, 100.0)), Vector2::zeros());
        assert_eq!(viewport.aspect(), 2.0);
    }
}
