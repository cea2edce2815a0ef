//! Render passes.
//!
//! A pass is one step of a [`crate::render::RenderTechnique`]. Every pass is
//! also a scene [`Visitor`]: passes that draw geometry hand themselves to
//! [`crate::data_structures::scene_graph::Scene::accept`] and decide per
//! node kind what to do.
//!
//! - `base` binds a pipeline and draws every mesh of a scene
//! - `opaque` / `transparent` filter the base pass by material transparency
//! - `light` visualises lights as proxy volumes
//! - `pick` renders light ids for GPU picking
//! - `deferred` accumulates lighting from a G-buffer, light by light
//! - `postprocess` draws a full screen quad with a fixed projection
//! - `clear`, `copy`, `mipmaps`, `query`, `invoke`, `dispatch` wrap a single device operation

use std::{cell::RefCell, rc::Rc};

use cgmath::Matrix4;

use crate::{
    context::RenderEventArgs,
    data_structures::scene_graph::{SharedScene, Visitor},
    device::{ConstantBuffer, PipelineState, ShaderType},
};

pub mod base;
pub mod clear;
pub mod copy;
pub mod deferred;
pub mod dispatch;
pub mod invoke;
pub mod light;
pub mod mipmaps;
pub mod opaque;
pub mod pick;
pub mod postprocess;
pub mod query;
pub mod transparent;

pub type SharedPass = Rc<RefCell<dyn RenderPass>>;

/// Three phase unit of work. Phases default to no-ops.
pub trait RenderPass: Visitor {
    fn set_enabled(&mut self, enabled: bool);

    fn is_enabled(&self) -> bool;

    /// Bind global state used by the whole pass.
    fn pre_render(&mut self, _args: &RenderEventArgs) {}

    fn render(&mut self, _args: &RenderEventArgs) {}

    /// Release what `pre_render` bound.
    fn post_render(&mut self, _args: &RenderEventArgs) {}
}

/// Per draw transforms uploaded for every visited node.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PerObject {
    pub model_view: [[f32; 4]; 4],
    pub model_view_projection: [[f32; 4]; 4],
}

impl PerObject {
    pub fn new(model_view: Matrix4<f32>, model_view_projection: Matrix4<f32>) -> Self {
        Self {
            model_view: model_view.into(),
            model_view_projection: model_view_projection.into(),
        }
    }

    /// `ModelView = view * world`, `ModelViewProjection = projection * ModelView`.
    pub fn from_world(
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        world: Matrix4<f32>,
    ) -> Self {
        let model_view = view * world;
        Self::new(model_view, projection * model_view)
    }
}

/// Index of the light currently drawn, into the lights structured buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightParams {
    pub light_index: u32,
    _padding: [u32; 3],
}

impl LightParams {
    pub fn new(light_index: u32) -> Self {
        Self {
            light_index,
            _padding: [0; 3],
        }
    }
}

/// Constants for reconstructing view-space positions from screen coordinates and depth.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScreenToViewParams {
    pub inverse_projection: [[f32; 4]; 4],
    pub screen_dimensions: [f32; 2],
    _padding: [f32; 2],
}

impl ScreenToViewParams {
    pub fn new(inverse_projection: Matrix4<f32>, screen_dimensions: [f32; 2]) -> Self {
        Self {
            inverse_projection: inverse_projection.into(),
            screen_dimensions,
            _padding: [0.0; 2],
        }
    }
}

/// Assign `buffer` to the parameter `name` of the `stage` shader of `pipeline`, if there is one.
pub(crate) fn bind_constant_buffer(
    pipeline: &dyn PipelineState,
    stage: ShaderType,
    name: &str,
    buffer: &Rc<dyn ConstantBuffer>,
) {
    if let Some(shader) = pipeline.shader(stage) {
        shader.set_constant_buffer(name, buffer);
    }
}

/// Let `visitor` walk `scene`. A missing scene is skipped.
pub(crate) fn traverse(
    scene: Option<&SharedScene>,
    visitor: &mut dyn Visitor,
    args: &RenderEventArgs,
) {
    match scene {
        Some(scene) => scene.borrow().accept(visitor, args),
        None => log::trace!("No scene to traverse."),
    }
}
