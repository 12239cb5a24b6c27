pub mod tetrahedron;

pub use tetrahedron::{Geometry, InitError, ShaderSources, TetraMesh, Vertex};
