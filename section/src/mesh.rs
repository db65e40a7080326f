use std::{
    io::{Read, Seek},
    sync::Arc,
};

use nalgebra::{Matrix4, Vector3};
use tracing::{debug, warn};

use crate::{
    error::{Result, SectionError},
    geometry::{triangle::ray_triangle_intersection, BoundingBox, Hit, Ray, Triangle},
    Pos,
};

/// A mesh made of vertices and triangular faces. It can be scaled, translated,
/// and rotated. Vertex data is shared between clones.
#[derive(Debug, Clone)]
pub struct Mesh {
    inner: Arc<MeshInner>,

    transformation_matrix: Matrix4<f64>,
    inv_transformation_matrix: Matrix4<f64>,

    position: Pos,
    scale: Pos,
    rotation: Pos,
}

#[derive(Debug)]
struct MeshInner {
    vertices: Box<[Pos]>,
    faces: Box<[[u32; 3]]>,
    /// Local space bounds, used to skip whole meshes while picking.
    bounds: BoundingBox,
}

impl Mesh {
    /// Creates a new mesh from the given vertices and faces with an identity
    /// transform.
    pub fn new(vertices: Vec<Pos>, faces: Vec<[u32; 3]>) -> Self {
        let bounds = BoundingBox::from_points(&vertices);
        Self {
            inner: Arc::new(MeshInner {
                vertices: vertices.into_boxed_slice(),
                faces: faces.into_boxed_slice(),
                bounds,
            }),
            ..Default::default()
        }
    }

    /// Creates a mesh from a triangle soup, three vertices per face.
    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let vertices = triangles.iter().flatten().copied().collect::<Vec<_>>();
        let faces = (0..triangles.len() as u32)
            .map(|x| [x * 3, x * 3 + 1, x * 3 + 2])
            .collect();
        Self::new(vertices, faces)
    }

    pub fn vertices(&self) -> &[Pos] {
        self.inner.vertices.as_ref()
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        self.inner.faces.as_ref()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    pub fn face_count(&self) -> usize {
        self.faces().len()
    }

    /// The local space vertices of a face.
    pub fn face_verts(&self, index: usize) -> Triangle {
        let (v, f) = (self.vertices(), self.faces()[index]);
        f.map(|x| v[x as usize])
    }

    /// Iterates every face with the model transform applied.
    pub fn world_triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.face_count()).map(|x| self.face_verts(x).map(|v| self.transform(&v)))
    }

    /// Casts a world space ray against every face, returning the closest hit
    /// in front of the ray origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<Hit> {
        // Working in local space means the vertices never need transforming.
        // The direction is left unnormalized so that a distance along the
        // local ray is the same distance along the world ray.
        let local = Ray {
            origin: self.inv_transform(&ray.origin),
            direction: self.inv_transform_normal(&ray.direction),
        };

        self.inner.bounds.intersect_ray(&local)?;

        let (t, face) = (0..self.face_count())
            .filter_map(|face| {
                ray_triangle_intersection(&self.face_verts(face), &local).map(|t| (t, face))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))?;

        Some(Hit {
            position: ray.at(t),
            distance: t * ray.direction.norm(),
            face,
        })
    }

    /// Updates the internal transformation matrices. This is called
    /// automatically if you use [`Mesh::set_position`], [`Mesh::set_scale`], or
    /// [`Mesh::set_rotation`].
    fn update_transformation_matrix(&mut self) {
        let scale = Matrix4::new_nonuniform_scaling(&self.scale);
        let rotation =
            Matrix4::from_euler_angles(self.rotation.x, self.rotation.y, self.rotation.z);
        let translation = Matrix4::new_translation(&self.position);

        self.transformation_matrix = translation * scale * rotation;
        self.inv_transformation_matrix = match self.transformation_matrix.try_inverse() {
            Some(inverse) => inverse,
            None => {
                warn!("Mesh transform is singular, picking will miss this mesh");
                Matrix4::repeat(f64::NAN)
            }
        };
    }

    /// Transforms a point according to the models translation, scale, and rotation.
    pub fn transform(&self, pos: &Pos) -> Pos {
        (self.transformation_matrix * pos.push(1.0)).xyz()
    }

    /// Undoes the transformation of a point from the models translation, scale, and rotation.
    pub fn inv_transform(&self, pos: &Pos) -> Pos {
        (self.inv_transformation_matrix * pos.push(1.0)).xyz()
    }

    pub fn inv_transform_normal(&self, normal: &Pos) -> Pos {
        (self.inv_transformation_matrix * normal.to_homogeneous()).xyz()
    }

    /// World space bounds of every vertex in the model.
    pub fn bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        self.vertices()
            .iter()
            .for_each(|v| bounds.expand_point(self.transform(v)));
        bounds
    }
}

impl Mesh {
    pub fn set_position(&mut self, pos: Pos) {
        self.position = pos;
        self.update_transformation_matrix();
    }

    pub fn position(&self) -> Pos {
        self.position
    }

    pub fn set_scale(&mut self, scale: Pos) {
        self.scale = scale;
        self.update_transformation_matrix();
    }

    pub fn scale(&self) -> Pos {
        self.scale
    }

    /// Changes the current rotation of the model, using [Euler
    /// angles](https://en.wikipedia.org/wiki/Euler_angles) in radians.
    pub fn set_rotation(&mut self, rotation: Pos) {
        self.rotation = rotation;
        self.update_transformation_matrix();
    }

    pub fn rotation(&self) -> Pos {
        self.rotation
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            inner: Arc::new(MeshInner {
                vertices: Box::new([]),
                faces: Box::new([]),
                bounds: BoundingBox::empty(),
            }),

            transformation_matrix: Matrix4::identity(),
            inv_transformation_matrix: Matrix4::identity(),

            position: Pos::repeat(0.0),
            scale: Pos::repeat(1.0),
            rotation: Pos::repeat(0.0),
        }
    }
}

/// Loads an ascii or binary STL file.
pub fn load_stl<T: Read + Seek>(reader: &mut T) -> Result<Mesh> {
    let model = stl_io::read_stl(reader)?;

    let vertices = model
        .vertices
        .iter()
        .map(|v| Vector3::new(v[0], v[1], v[2]).cast::<f64>())
        .collect::<Vec<_>>();

    let faces = model
        .faces
        .iter()
        .map(|f| {
            let face = f.vertices;
            match face.iter().find(|&&x| x >= vertices.len()) {
                Some(x) => Err(SectionError::MeshFormat(format!(
                    "face references missing vertex {x}"
                ))),
                None => Ok(face.map(|x| x as u32)),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Loaded STL {{ vert: {}, face: {} }}",
        vertices.len(),
        faces.len()
    );
    Ok(Mesh::new(vertices, faces))
}

#[cfg(test)]
mod tests {
    use std::{f64::consts::FRAC_PI_2, io::Cursor};

    use super::*;
    use crate::builder::MeshBuilder;

    const ASCII_STL: &str = "solid tri
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 1 0 0
    vertex 0 1 0
  endloop
endfacet
endsolid tri
";

    #[test]
    fn triangle_soup() {
        let mesh = Mesh::from_triangles(&[
            [Pos::zeros(), Pos::x(), Pos::y()],
            [Pos::z(), Pos::x(), Pos::y()],
        ]);

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.face_verts(1), [Pos::z(), Pos::x(), Pos::y()]);
    }

    #[test]
    fn world_triangles_apply_transform() {
        let mut mesh = Mesh::from_triangles(&[[Pos::zeros(), Pos::x(), Pos::y()]]);
        mesh.set_scale(Pos::repeat(2.0));
        mesh.set_position(Pos::new(0.0, 0.0, 5.0));

        let triangles = mesh.world_triangles().collect::<Vec<_>>();
        assert_eq!(
            triangles,
            vec![[
                Pos::new(0.0, 0.0, 5.0),
                Pos::new(2.0, 0.0, 5.0),
                Pos::new(0.0, 2.0, 5.0)
            ]]
        );

        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Pos::new(0.0, 0.0, 5.0));
        assert_eq!(bounds.max, Pos::new(2.0, 2.0, 5.0));
    }

    #[test]
    fn transform_round_trip() {
        let mut mesh = Mesh::default();
        mesh.set_rotation(Pos::new(0.0, 0.0, FRAC_PI_2));
        mesh.set_position(Pos::new(1.0, 2.0, 3.0));

        let point = Pos::new(4.0, -1.0, 2.0);
        let back = mesh.inv_transform(&mesh.transform(&point));
        assert!((back - point).norm() < 1e-12);
    }

    #[test]
    fn picks_nearest_face() {
        let mesh = MeshBuilder::new()
            .cuboid(Pos::repeat(-1.0), Pos::repeat(1.0))
            .build();

        let ray = Ray::new(Pos::new(0.2, 0.3, 10.0), -Pos::z());
        let hit = mesh.intersect_ray(&ray).unwrap();
        assert!((hit.position - Pos::new(0.2, 0.3, 1.0)).norm() < 1e-12);
        assert!((hit.distance - 9.0).abs() < 1e-12);

        let miss = Ray::new(Pos::new(5.0, 0.0, 10.0), -Pos::z());
        assert_eq!(mesh.intersect_ray(&miss), None);
    }

    #[test]
    fn picks_through_transform() {
        let mut mesh = MeshBuilder::new()
            .cuboid(Pos::repeat(-1.0), Pos::repeat(1.0))
            .build();
        mesh.set_scale(Pos::repeat(3.0));
        mesh.set_position(Pos::new(10.0, 0.0, 0.0));

        let ray = Ray::new(Pos::new(10.5, 0.4, 20.0), -Pos::z());
        let hit = mesh.intersect_ray(&ray).unwrap();
        assert!((hit.position - Pos::new(10.5, 0.4, 3.0)).norm() < 1e-9);
        assert!((hit.distance - 17.0).abs() < 1e-9);
    }

    #[test]
    fn loads_ascii_stl() {
        let mesh = load_stl(&mut Cursor::new(ASCII_STL.as_bytes())).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);

        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Pos::zeros());
        assert_eq!(bounds.max, Pos::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn rejects_garbage() {
        let result = load_stl(&mut Cursor::new(b"not an stl".to_vec()));
        assert!(result.is_err());
    }
}
