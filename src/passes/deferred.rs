//! Deferred lighting.
//!
//! Lighting is accumulated light by light from a G-buffer written by an
//! earlier geometry pass. Point and spot lights are bounded by a proxy volume
//! and drawn in two sub-passes:
//!
//! 1. the stencil pipeline marks the pixels inside the volume,
//! 2. the lighting pipeline shades exactly those pixels and adds the result.
//!
//! Only the stencil attachment is cleared between lights; colour and depth
//! persist for the whole pass. Directional lights affect every pixel and are
//! drawn once, as a full screen quad, with the directional pipeline.

use std::rc::Rc;

use anyhow::Context;
use cgmath::{Matrix4, SquareMatrix, Vector4, Zero};
use log::{debug, trace};

use crate::{
    context::{RenderConfig, RenderEventArgs},
    data_structures::{
        light::{LightType, SharedLights},
        mesh::Mesh,
        scene_graph::{SceneNode, SharedScene, Visitor},
    },
    device::{
        ClearFlags, ConstantBuffer, PipelineState, RenderDevice, ShaderParameterType, ShaderType,
        Texture,
    },
    passes::{
        LightParams, PerObject, RenderPass, ScreenToViewParams, bind_constant_buffer,
        light::LightVolumes, traverse,
    },
};

/// Textures written by the geometry pass and read by the lighting shaders.
#[derive(Clone, Default)]
pub struct GBuffer {
    pub diffuse: Option<Rc<dyn Texture>>,
    pub specular: Option<Rc<dyn Texture>>,
    pub normal: Option<Rc<dyn Texture>>,
    pub depth: Option<Rc<dyn Texture>>,
    /// Only needed by lighting shaders that do not reconstruct positions from depth.
    pub position: Option<Rc<dyn Texture>>,
}

impl GBuffer {
    /// Pixel shader texture register and texture, for every texture present.
    fn slots(&self) -> impl Iterator<Item = (u32, &Rc<dyn Texture>)> {
        [
            &self.diffuse,
            &self.specular,
            &self.normal,
            &self.depth,
            &self.position,
        ]
        .into_iter()
        .enumerate()
        .filter_map(|(slot, texture)| texture.as_ref().map(|texture| (slot as u32, texture)))
    }

    fn bind(&self) {
        for (slot, texture) in self.slots() {
            texture.bind(slot, ShaderType::Pixel, ShaderParameterType::Texture);
        }
    }

    fn unbind(&self) {
        for (slot, texture) in self.slots() {
            texture.unbind(slot, ShaderType::Pixel, ShaderParameterType::Texture);
        }
    }
}

/// The pipelines the lighting pass switches between.
#[derive(Clone, Default)]
pub struct LightingPipelines {
    /// Writes the stencil mask of a light volume.
    pub stencil: Option<Rc<dyn PipelineState>>,
    /// Shades the masked pixels and accumulates the result.
    pub lighting: Option<Rc<dyn PipelineState>>,
    pub directional: Option<Rc<dyn PipelineState>>,
}

impl LightingPipelines {
    fn iter(&self) -> impl Iterator<Item = &Rc<dyn PipelineState>> {
        [&self.stencil, &self.lighting, &self.directional]
            .into_iter()
            .flatten()
    }
}

/// How the proxy of the current light is placed.
#[derive(Clone, Copy)]
enum VolumePlacement {
    World(Matrix4<f32>),
    ScreenQuad,
}

pub struct DeferredLightingPass {
    enabled: bool,
    device: Rc<dyn RenderDevice>,
    lights: SharedLights,
    gbuffer: GBuffer,
    pipelines: LightingPipelines,
    volumes: LightVolumes,
    stencil_reference: u8,
    per_object_buffer: Option<Rc<dyn ConstantBuffer>>,
    light_params_buffer: Option<Rc<dyn ConstantBuffer>>,
    screen_to_view_buffer: Option<Rc<dyn ConstantBuffer>>,
    placement: VolumePlacement,
    active_pipeline: Option<Rc<dyn PipelineState>>,
}

impl DeferredLightingPass {
    /// Point and spot proxies are taken from `volumes`; the directional proxy
    /// is always a unit screen quad created here.
    pub fn new(
        device: Rc<dyn RenderDevice>,
        lights: SharedLights,
        gbuffer: GBuffer,
        pipelines: LightingPipelines,
        volumes: LightVolumes,
    ) -> anyhow::Result<Self> {
        let quad = device
            .create_screen_quad(0.0, 1.0, 0.0, 1.0, -1.0)
            .context("Failed to create the directional light quad")?;
        let per_object_buffer = device
            .create_constant_buffer_for(&PerObject::new(Matrix4::identity(), Matrix4::identity()))
            .context("Failed to create the per-object constant buffer")?;
        let light_params_buffer = device
            .create_constant_buffer_for(&LightParams::new(0))
            .context("Failed to create the light index constant buffer")?;
        let screen_to_view_buffer = device
            .create_constant_buffer_for(&ScreenToViewParams::new(Matrix4::identity(), [1.0, 1.0]))
            .context("Failed to create the screen to view constant buffer")?;

        Ok(Self {
            enabled: true,
            device,
            lights,
            gbuffer,
            pipelines,
            volumes: volumes.with_directional(Some(quad)),
            stencil_reference: 1,
            per_object_buffer: Some(per_object_buffer),
            light_params_buffer: Some(light_params_buffer),
            screen_to_view_buffer: Some(screen_to_view_buffer),
            placement: VolumePlacement::World(Matrix4::identity()),
            active_pipeline: None,
        })
    }

    /// Stencil value the mask is cleared to before each light volume.
    pub fn with_stencil_reference(mut self, stencil_reference: u8) -> Self {
        self.stencil_reference = stencil_reference;
        self
    }

    /// Take the stencil reference from the renderer configuration.
    pub fn with_config(self, config: &RenderConfig) -> Self {
        self.with_stencil_reference(config.light_stencil_reference)
    }

    pub fn set_stencil_reference(&mut self, stencil_reference: u8) {
        self.stencil_reference = stencil_reference;
    }

    pub fn gbuffer(&self) -> &GBuffer {
        &self.gbuffer
    }

    pub fn set_gbuffer(&mut self, gbuffer: GBuffer) {
        self.gbuffer = gbuffer;
    }

    pub fn lights(&self) -> &SharedLights {
        &self.lights
    }

    fn upload_screen_to_view(&self, args: &RenderEventArgs) {
        let (Some(camera), Some(buffer)) = (args.camera, &self.screen_to_view_buffer) else {
            trace!("No camera, screen to view constants are not updated.");
            return;
        };
        let inverse_projection = camera
            .projection_matrix()
            .invert()
            .unwrap_or_else(Matrix4::identity);
        let viewport = camera.viewport();
        buffer.set_data(&ScreenToViewParams::new(
            inverse_projection,
            [viewport.width, viewport.height],
        ));
    }

    fn clear_stencil(&self) {
        let target = self
            .pipelines
            .stencil
            .as_ref()
            .and_then(|pipeline| pipeline.render_target());
        match target {
            Some(target) => target.clear(
                ClearFlags::STENCIL,
                Vector4::zero(),
                1.0,
                self.stencil_reference,
            ),
            None => trace!("Stencil pipeline has no render target to clear."),
        }
    }

    /// Draw `volume` once with `pipeline`.
    fn sub_pass(
        &mut self,
        pipeline: Option<Rc<dyn PipelineState>>,
        volume: &SharedScene,
        args: &RenderEventArgs,
    ) {
        let Some(pipeline) = pipeline else {
            trace!("Skipping lighting sub-pass without a pipeline.");
            return;
        };
        pipeline.bind();
        self.active_pipeline = Some(pipeline.clone());
        traverse(Some(volume), self, args);
        self.active_pipeline = None;
        pipeline.unbind();
    }
}

impl Visitor for DeferredLightingPass {
    fn visit_scene_node(&mut self, node: &SceneNode, args: &RenderEventArgs) {
        let Some(buffer) = &self.per_object_buffer else {
            return;
        };
        let per_object = match self.placement {
            VolumePlacement::ScreenQuad => {
                PerObject::new(Matrix4::identity(), cgmath::ortho(0.0, 1.0, 0.0, 1.0, 0.0, 1.0))
            }
            VolumePlacement::World(transform) => {
                let Some(camera) = args.camera else {
                    trace!("No camera, light volume transform is not updated.");
                    return;
                };
                PerObject::from_world(
                    camera.view_matrix(),
                    camera.projection_matrix(),
                    transform * node.world_transform(),
                )
            }
        };
        buffer.set_data(&per_object);
    }

    fn visit_mesh(&mut self, mesh: &Mesh, args: &RenderEventArgs) {
        mesh.render(args, self.active_pipeline.as_deref());
    }
}

impl RenderPass for DeferredLightingPass {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn pre_render(&mut self, _args: &RenderEventArgs) {
        self.gbuffer.bind();
        for pipeline in self.pipelines.iter() {
            if let Some(buffer) = &self.per_object_buffer {
                bind_constant_buffer(pipeline.as_ref(), ShaderType::Vertex, "PerObject", buffer);
            }
            if let Some(buffer) = &self.light_params_buffer {
                bind_constant_buffer(pipeline.as_ref(), ShaderType::Pixel, "LightIndexBuffer", buffer);
            }
            if let Some(buffer) = &self.screen_to_view_buffer {
                bind_constant_buffer(pipeline.as_ref(), ShaderType::Pixel, "ScreenToViewParams", buffer);
            }
        }
    }

    fn render(&mut self, args: &RenderEventArgs) {
        self.upload_screen_to_view(args);

        let lights = self.lights.borrow().clone();
        for (index, light) in lights.iter().enumerate() {
            if !light.enabled {
                continue;
            }
            if let Some(buffer) = &self.light_params_buffer {
                buffer.set_data(&LightParams::new(index as u32));
            }
            let Some(volume) = self.volumes.for_light(light.light_type).cloned() else {
                debug!("No light volume for {:?} light {}.", light.light_type, index);
                continue;
            };

            match light.light_type {
                LightType::Point | LightType::Spot => {
                    self.placement = VolumePlacement::World(light.volume_transform());
                    self.clear_stencil();
                    self.sub_pass(self.pipelines.stencil.clone(), &volume, args);
                    self.sub_pass(self.pipelines.lighting.clone(), &volume, args);
                }
                LightType::Directional => {
                    self.placement = VolumePlacement::ScreenQuad;
                    self.sub_pass(self.pipelines.directional.clone(), &volume, args);
                }
            }
        }
        self.placement = VolumePlacement::World(Matrix4::identity());
    }

    fn post_render(&mut self, _args: &RenderEventArgs) {
        self.gbuffer.unbind();
    }
}

impl Drop for DeferredLightingPass {
    fn drop(&mut self) {
        for buffer in [
            self.per_object_buffer.take(),
            self.light_params_buffer.take(),
            self.screen_to_view_buffer.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.device.destroy_constant_buffer(buffer);
        }
    }
}
