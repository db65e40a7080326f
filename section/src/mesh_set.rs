use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use tracing::info;

use crate::{
    geometry::{BoundingBox, Triangle},
    mesh::Mesh,
};

/// A mesh loaded into the viewer.
#[derive(Debug, Clone)]
pub struct SceneMesh {
    pub name: String,
    pub id: u32,
    pub mesh: Mesh,
    pub hidden: bool,
}

/// The ordered set of meshes being inspected. Every mutation moves
/// [`MeshSet::version`] to a value no other set has had, which lets contour
/// caches notice changes, or a different set, without comparing geometry.
#[derive(Debug, Default)]
pub struct MeshSet {
    meshes: Vec<SceneMesh>,
    version: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshStats {
    pub meshes: usize,
    pub vertices: usize,
    pub triangles: usize,
}

impl SceneMesh {
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            id: next_id(),
            mesh,
            hidden: false,
        }
    }
}

impl MeshSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mesh, returning its id.
    pub fn add(&mut self, name: impl Into<String>, mesh: Mesh) -> u32 {
        let mesh = SceneMesh::new(name, mesh);
        let id = mesh.id;
        info!(
            "Added mesh `{}` {{ vert: {}, face: {} }}",
            mesh.name,
            mesh.mesh.vertex_count(),
            mesh.mesh.face_count()
        );

        self.meshes.push(mesh);
        self.version = next_version();
        id
    }

    pub fn remove(&mut self, id: u32) -> Option<SceneMesh> {
        let index = self.meshes.iter().position(|x| x.id == id)?;
        let mesh = self.meshes.remove(index);
        self.version = next_version();

        info!("Mesh removed, total meshes: {}", self.meshes.len());
        Some(mesh)
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
        self.version = next_version();
        info!("All meshes cleared");
    }

    pub fn get(&self, id: u32) -> Option<&SceneMesh> {
        self.meshes.iter().find(|x| x.id == id)
    }

    /// Mutable access to a mesh, counted as a change since the caller may
    /// move or rescale it.
    pub fn get_mut(&mut self, id: u32) -> Option<&mut SceneMesh> {
        let mesh = self.meshes.iter_mut().find(|x| x.id == id)?;
        self.version = next_version();
        Some(mesh)
    }

    pub fn set_hidden(&mut self, id: u32, hidden: bool) -> bool {
        match self.get_mut(id) {
            Some(mesh) => {
                mesh.hidden = hidden;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneMesh> {
        self.meshes.iter()
    }

    /// Meshes that take part in picking and slicing.
    pub fn visible(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.iter().filter(|x| !x.hidden).map(|x| &x.mesh)
    }

    /// World space triangles of every visible mesh.
    pub fn world_triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.visible().flat_map(|x| x.world_triangles())
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn stats(&self) -> MeshStats {
        self.meshes.iter().fold(
            MeshStats {
                meshes: self.meshes.len(),
                ..Default::default()
            },
            |stats, x| MeshStats {
                vertices: stats.vertices + x.mesh.vertex_count(),
                triangles: stats.triangles + x.mesh.face_count(),
                ..stats
            },
        )
    }

    /// World space bounds of all meshes, hidden ones included. Empty when the
    /// set is empty.
    pub fn bounds(&self) -> BoundingBox {
        self.meshes
            .iter()
            .fold(BoundingBox::empty(), |bounds, x| bounds.union(&x.mesh.bounds()))
    }
}

// Zero is left to empty sets, which all slice the same
fn next_version() -> u64 {
    static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

fn next_id() -> u32 {
    static NEXT_ID: AtomicU32 = AtomicU32::new(0);
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builder::MeshBuilder, Pos};

    fn cube(min: f64, max: f64) -> Mesh {
        MeshBuilder::new()
            .cuboid(Pos::repeat(min), Pos::repeat(max))
            .build()
    }

    #[test]
    fn add_remove_clear() {
        let mut set = MeshSet::new();
        assert!(set.is_empty());
        assert!(set.bounds().is_empty());

        let a = set.add("a.stl", cube(-1.0, 1.0));
        let b = set.add("b.stl", cube(2.0, 3.0));
        assert_ne!(a, b);
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.stats(),
            MeshStats {
                meshes: 2,
                vertices: 16,
                triangles: 24
            }
        );

        let bounds = set.bounds();
        assert_eq!(bounds.min, Pos::repeat(-1.0));
        assert_eq!(bounds.max, Pos::repeat(3.0));

        assert_eq!(set.remove(a).map(|x| x.name), Some("a.stl".to_owned()));
        assert!(set.remove(a).is_none());
        assert_eq!(set.get(b).map(|x| x.name.as_str()), Some("b.stl"));

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.stats(), MeshStats::default());
    }

    #[test]
    fn version_tracks_mutations() {
        let mut set = MeshSet::new();
        let v0 = set.version();

        let id = set.add("a", cube(0.0, 1.0));
        let v1 = set.version();
        assert!(v1 > v0);

        assert!(set.set_hidden(id, true));
        let v2 = set.version();
        assert!(v2 > v1);

        // Failed lookups are not changes
        assert!(!set.set_hidden(id + 1000, true));
        assert!(set.remove(id + 1000).is_none());
        assert_eq!(set.version(), v2);
    }

    #[test]
    fn versions_differ_between_sets() {
        let mut a = MeshSet::new();
        let mut b = MeshSet::new();
        a.add("a", cube(0.0, 1.0));
        b.add("b", cube(0.0, 1.0));
        assert_ne!(a.version(), b.version());
    }

    #[test]
    fn hidden_meshes_are_not_visible() {
        let mut set = MeshSet::new();
        let a = set.add("a", cube(0.0, 1.0));
        set.add("b", cube(2.0, 3.0));

        set.set_hidden(a, true);
        assert_eq!(set.visible().count(), 1);
        assert_eq!(set.world_triangles().count(), 12);
    }
}
