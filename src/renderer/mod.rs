//! WebGPU rendering module
//!
//! Bodies are tessellated into triangles on the CPU and drawn with a single
//! flat-color pipeline.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use vertex::Vertex;
