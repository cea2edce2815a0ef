//! Geometry pass: bind a pipeline and draw every mesh of a scene.

use std::rc::Rc;

use anyhow::Context;
use cgmath::{Matrix4, SquareMatrix};
use log::trace;

use crate::{
    context::RenderEventArgs,
    data_structures::{
        mesh::Mesh,
        scene_graph::{SceneNode, SharedScene, Visitor},
    },
    device::{ConstantBuffer, PipelineState, RenderDevice, ShaderType},
    passes::{PerObject, RenderPass, bind_constant_buffer, traverse},
};

/**
 * Draws a scene with one pipeline.
 *
 * For every visited node the per-object constants are recomputed from the
 * node's world transform and the camera of the frame. Every mesh that has a
 * material is drawn with the pass pipeline. The pass shares the scene and the
 * pipeline; it owns only its per-object constant buffer, which is returned to
 * the device when the pass is dropped.
 *
 * The filtering passes ([`super::opaque::OpaquePass`],
 * [`super::transparent::TransparentPass`]) and
 * [`super::postprocess::PostprocessPass`] are built on top of it.
 */
pub struct BasePass {
    enabled: bool,
    device: Rc<dyn RenderDevice>,
    scene: Option<SharedScene>,
    pipeline: Option<Rc<dyn PipelineState>>,
    per_object_buffer: Option<Rc<dyn ConstantBuffer>>,
}

impl BasePass {
    pub fn new(
        device: Rc<dyn RenderDevice>,
        scene: Option<SharedScene>,
        pipeline: Option<Rc<dyn PipelineState>>,
    ) -> anyhow::Result<Self> {
        let per_object_buffer = device
            .create_constant_buffer_for(&PerObject::new(Matrix4::identity(), Matrix4::identity()))
            .context("Failed to create the per-object constant buffer")?;
        Ok(Self {
            enabled: true,
            device,
            scene,
            pipeline,
            per_object_buffer: Some(per_object_buffer),
        })
    }

    pub fn scene(&self) -> Option<SharedScene> {
        self.scene.clone()
    }

    pub fn set_scene(&mut self, scene: Option<SharedScene>) {
        self.scene = scene;
    }

    pub fn pipeline(&self) -> Option<&Rc<dyn PipelineState>> {
        self.pipeline.as_ref()
    }

    pub fn set_pipeline(&mut self, pipeline: Option<Rc<dyn PipelineState>>) {
        self.pipeline = pipeline;
    }

    /// Upload the per-object constants for the next draw.
    pub fn set_per_object(&self, per_object: &PerObject) {
        if let Some(buffer) = &self.per_object_buffer {
            buffer.set_data(per_object);
        }
    }

    /// Upload `ModelView` and `ModelViewProjection` for a node with `world` transform.
    pub fn upload_world_transform(&self, world: Matrix4<f32>, args: &RenderEventArgs) {
        match args.camera {
            Some(camera) => self.set_per_object(&PerObject::from_world(
                camera.view_matrix(),
                camera.projection_matrix(),
                world,
            )),
            None => trace!("No camera, per-object constants are not updated."),
        }
    }

    /// Draw `mesh` with the pass pipeline. Meshes without a material are skipped.
    pub fn render_mesh(&self, mesh: &Mesh, args: &RenderEventArgs) {
        if mesh.material().is_none() {
            trace!("Mesh {} has no material, skipping.", mesh.id());
            return;
        }
        mesh.render(args, self.pipeline.as_deref());
    }

    /// Bind the per-object buffer to the vertex shader and bind the pipeline.
    pub fn bind(&self) {
        let Some(pipeline) = &self.pipeline else {
            trace!("No pipeline to bind.");
            return;
        };
        if let Some(buffer) = &self.per_object_buffer {
            bind_constant_buffer(pipeline.as_ref(), ShaderType::Vertex, "PerObject", buffer);
        }
        pipeline.bind();
    }

    pub fn unbind(&self) {
        if let Some(pipeline) = &self.pipeline {
            pipeline.unbind();
        }
    }
}

impl Visitor for BasePass {
    fn visit_scene_node(&mut self, node: &SceneNode, args: &RenderEventArgs) {
        self.upload_world_transform(node.world_transform(), args);
    }

    fn visit_mesh(&mut self, mesh: &Mesh, args: &RenderEventArgs) {
        self.render_mesh(mesh, args);
    }
}

impl RenderPass for BasePass {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn pre_render(&mut self, _args: &RenderEventArgs) {
        self.bind();
    }

    fn render(&mut self, args: &RenderEventArgs) {
        let scene = self.scene.clone();
        traverse(scene.as_ref(), self, args);
    }

    fn post_render(&mut self, _args: &RenderEventArgs) {
        self.unbind();
    }
}

impl Drop for BasePass {
    fn drop(&mut self) {
        if let Some(buffer) = self.per_object_buffer.take() {
            self.device.destroy_constant_buffer(buffer);
        }
    }
}
