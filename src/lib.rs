//! render-technique
//!
//! A small real-time rendering core. A scene graph is drawn by a
//! [`render::RenderTechnique`]: an ordered list of render passes that each do
//! one job (clear, opaque or transparent geometry, deferred lighting, light
//! markers, picking, post-processing, copies, queries, compute dispatch). The
//! passes talk to the GPU only through the contracts in [`device`], so any
//! graphics backend can sit underneath.
//!
//! High-level modules
//! - `camera`: view/projection matrices and the viewport
//! - `context`: per-frame render arguments and the render configuration
//! - `data_structures`: scene graph, meshes, materials and lights
//! - `device`: graphics device and resource contracts
//! - `frame`: frame clock, logger setup and the `Renderer` frame driver
//! - `geometry`: procedural proxy geometry (screen quad, sphere, cone)
//! - `passes`: the render passes
//! - `render`: the technique that sequences passes
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod device;
pub mod frame;
pub mod geometry;
pub mod passes;
pub mod render;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use context::{RenderConfig, RenderEventArgs};
pub use frame::{Renderer, init_logger};
pub use passes::{RenderPass, SharedPass};
pub use render::RenderTechnique;
