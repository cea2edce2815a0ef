//! Engine data structures: scene graph, meshes, materials and lights.
//!
//! - `object` gives every scene object a process-unique id
//! - `instance` holds a decomposed local transformation
//! - `scene_graph` contains the scene, its node hierarchy and the visitor contract
//! - `mesh` binds vertex/index buffers and a swappable material
//! - `material` is the GPU-mirrored shading description
//! - `light` holds the light values consumed by the lighting passes

pub mod instance;
pub mod light;
pub mod material;
pub mod mesh;
pub mod object;
pub mod scene_graph;
