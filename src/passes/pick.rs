//! GPU picking of lights.
//!
//! The picking pipeline renders every light volume with a flat colour that
//! encodes the light's position in the light list. The pixel under the
//! cursor is read back by the application and turned into a light index
//! with [`decode_pick_id`].

use std::rc::Rc;

use anyhow::Context;
use cgmath::{Matrix4, SquareMatrix};
use log::trace;

use crate::{
    context::RenderEventArgs,
    data_structures::{
        light::SharedLights,
        mesh::Mesh,
        scene_graph::{SceneNode, Visitor},
    },
    device::{ConstantBuffer, PipelineState, RenderDevice, ShaderType},
    passes::{
        LightParams, PerObject, RenderPass, bind_constant_buffer, light::LightVolumes, traverse,
    },
};

/// Decode a read-back pick pixel into a light index.
///
/// The picking shader writes `index + 1` packed little endian into RGBA, so
/// a zero pixel means no light was hit.
pub fn decode_pick_id(rgba: [u8; 4]) -> Option<usize> {
    let [r, g, b, a] = rgba;
    let id = u32::from(r) | u32::from(g) << 8 | u32::from(b) << 16 | u32::from(a) << 24;
    id.checked_sub(1).map(|index| index as usize)
}

/// The pixel the picking shader writes for the light at `index`.
pub fn encode_pick_id(index: u32) -> [u8; 4] {
    index.saturating_add(1).to_le_bytes()
}

pub struct LightPickingPass {
    enabled: bool,
    device: Rc<dyn RenderDevice>,
    lights: SharedLights,
    volumes: LightVolumes,
    pipeline: Option<Rc<dyn PipelineState>>,
    per_object_buffer: Option<Rc<dyn ConstantBuffer>>,
    light_params_buffer: Option<Rc<dyn ConstantBuffer>>,
    light_transform: Matrix4<f32>,
    light_index: u32,
}

impl LightPickingPass {
    pub fn new(
        device: Rc<dyn RenderDevice>,
        lights: SharedLights,
        volumes: LightVolumes,
        pipeline: Option<Rc<dyn PipelineState>>,
    ) -> anyhow::Result<Self> {
        let per_object_buffer = device
            .create_constant_buffer_for(&PerObject::new(Matrix4::identity(), Matrix4::identity()))
            .context("Failed to create the per-object constant buffer")?;
        let light_params_buffer = device
            .create_constant_buffer_for(&LightParams::new(0))
            .context("Failed to create the light index constant buffer")?;
        Ok(Self {
            enabled: true,
            device,
            lights,
            volumes,
            pipeline,
            per_object_buffer: Some(per_object_buffer),
            light_params_buffer: Some(light_params_buffer),
            light_transform: Matrix4::identity(),
            light_index: 0,
        })
    }
}

impl Visitor for LightPickingPass {
    fn visit_scene_node(&mut self, node: &SceneNode, args: &RenderEventArgs) {
        let (Some(camera), Some(buffer)) = (args.camera, &self.per_object_buffer) else {
            return;
        };
        buffer.set_data(&PerObject::from_world(
            camera.view_matrix(),
            camera.projection_matrix(),
            self.light_transform * node.world_transform(),
        ));
    }

    fn visit_mesh(&mut self, mesh: &Mesh, args: &RenderEventArgs) {
        if let Some(buffer) = &self.light_params_buffer {
            buffer.set_data(&LightParams::new(self.light_index));
        }
        mesh.render(args, self.pipeline.as_deref());
    }
}

impl RenderPass for LightPickingPass {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn pre_render(&mut self, _args: &RenderEventArgs) {
        let Some(pipeline) = &self.pipeline else {
            trace!("Light picking pass has no pipeline.");
            return;
        };
        if let Some(buffer) = &self.per_object_buffer {
            bind_constant_buffer(pipeline.as_ref(), ShaderType::Vertex, "PerObject", buffer);
        }
        if let Some(buffer) = &self.light_params_buffer {
            bind_constant_buffer(pipeline.as_ref(), ShaderType::Pixel, "LightIndexBuffer", buffer);
        }
        pipeline.bind();
    }

    fn render(&mut self, args: &RenderEventArgs) {
        let lights = self.lights.borrow().clone();
        for (index, light) in lights.iter().enumerate() {
            let Some(volume) = self.volumes.for_light(light.light_type).cloned() else {
                continue;
            };
            self.light_index = index as u32;
            self.light_transform = light.volume_transform();
            traverse(Some(&volume), self, args);
        }
        self.light_transform = Matrix4::identity();
    }

    fn post_render(&mut self, _args: &RenderEventArgs) {
        if let Some(pipeline) = &self.pipeline {
            pipeline.unbind();
        }
    }
}

impl Drop for LightPickingPass {
    fn drop(&mut self) {
        for buffer in [self.per_object_buffer.take(), self.light_params_buffer.take()]
            .into_iter()
            .flatten()
        {
            self.device.destroy_constant_buffer(buffer);
        }
    }
}
