use crate::{mesh::Mesh, Pos};

/// Incrementally builds indexed meshes.
#[derive(Default)]
pub struct MeshBuilder {
    vertices: Vec<Pos>,
    faces: Vec<[u32; 3]>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, vertex: Pos) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    pub fn add_face(&mut self, face: [u32; 3]) {
        self.faces.push(face);
    }

    /// Adds two triangles covering the quad `a b c d`, given in winding order.
    pub fn add_quad(&mut self, quad: [u32; 4]) {
        self.add_face([quad[0], quad[1], quad[2]]);
        self.add_face([quad[0], quad[2], quad[3]]);
    }

    /// Adds an axis aligned box with outward facing triangles.
    pub fn cuboid(mut self, min: Pos, max: Pos) -> Self {
        let corner = |x: usize, y: usize, z: usize| {
            Pos::new([min.x, max.x][x], [min.y, max.y][y], [min.z, max.z][z])
        };

        let mut idx = [0; 8];
        for (i, slot) in idx.iter_mut().enumerate() {
            *slot = self.add_vertex(corner(i & 1, (i >> 1) & 1, (i >> 2) & 1));
        }

        // Corner index bits are (z, y, x)
        for quad in [
            [0, 2, 3, 1], // -z
            [4, 5, 7, 6], // +z
            [0, 1, 5, 4], // -y
            [2, 6, 7, 3], // +y
            [0, 4, 6, 2], // -x
            [1, 3, 7, 5], // +x
        ] {
            self.add_quad(quad.map(|x| idx[x]));
        }

        self
    }

    pub fn build(self) -> Mesh {
        Mesh::new(self.vertices, self.faces)
    }
}
