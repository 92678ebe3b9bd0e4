//! Rendering module
//!
//! Sketches paint through the [`Surface`] trait. [`MeshSurface`] tessellates
//! those calls into triangles and [`RenderState`] draws them with WebGPU.

pub mod mesh;
pub mod paint;
pub mod pipeline;
pub mod shapes;
pub mod surface;
pub mod vertex;

pub use mesh::MeshSurface;
pub use paint::paint;
pub use pipeline::{RenderError, RenderState};
pub use surface::{DrawCommand, RecordingSurface, Surface};
pub use vertex::Vertex;
