//! Cross sections and distance measurements on triangle meshes.
//!
//! The [`session::Session`] ties everything together: it owns the cutting
//! [`plane::Plane`], picks points off [`mesh::Mesh`]es through a
//! [`camera::Camera`], keeps the [`slicer::Contour`] up to date, and hands
//! markers and lines to an [`overlay::Overlay`] for drawing.

use nalgebra::Vector3;

pub mod builder;
pub mod camera;
pub mod error;
pub mod export;
pub mod framing;
pub mod geometry;
pub mod measure;
pub mod mesh;
pub mod mesh_set;
pub mod overlay;
pub mod picker;
pub mod plane;
pub mod session;
pub mod slicer;

pub type Pos = Vector3<f64>;
