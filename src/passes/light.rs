//! Light volume visualisation.

use std::rc::Rc;

use anyhow::Context;
use cgmath::{Matrix4, SquareMatrix};
use log::trace;

use crate::{
    context::{MarkerOpacity, RenderConfig, RenderEventArgs},
    data_structures::{
        light::{Light, LightType, SharedLights},
        material::SharedMaterial,
        mesh::Mesh,
        scene_graph::{SceneNode, SharedScene, Visitor},
    },
    device::{ConstantBuffer, PipelineState, RenderDevice, ShaderType},
    passes::{PerObject, RenderPass, bind_constant_buffer, traverse},
};

/// Unit proxy geometry for each light type, all pointing along +Z.
#[derive(Clone, Default)]
pub struct LightVolumes {
    pub point: Option<SharedScene>,
    pub spot: Option<SharedScene>,
    pub directional: Option<SharedScene>,
}

impl LightVolumes {
    /// A unit sphere for point lights and a unit cone for spot lights. The
    /// directional proxy is left to the caller.
    pub fn create(device: &dyn RenderDevice, tessellation: u32) -> anyhow::Result<Self> {
        Ok(Self {
            point: Some(
                device
                    .create_sphere(1.0, tessellation)
                    .context("Failed to create the point light volume")?,
            ),
            spot: Some(
                device
                    .create_cone(1.0, 1.0, tessellation)
                    .context("Failed to create the spot light volume")?,
            ),
            directional: None,
        })
    }

    pub fn with_directional(mut self, scene: Option<SharedScene>) -> Self {
        self.directional = scene;
        self
    }

    pub fn for_light(&self, light_type: LightType) -> Option<&SharedScene> {
        match light_type {
            LightType::Point => self.point.as_ref(),
            LightType::Spot => self.spot.as_ref(),
            LightType::Directional => self.directional.as_ref(),
        }
    }
}

/// Puts the original material back on a mesh when dropped.
pub(crate) struct MaterialSwap<'m> {
    mesh: &'m Mesh,
    original: Option<SharedMaterial>,
}

impl<'m> MaterialSwap<'m> {
    pub(crate) fn new(mesh: &'m Mesh, material: SharedMaterial) -> Self {
        let original = mesh.set_material(Some(material));
        Self { mesh, original }
    }
}

impl Drop for MaterialSwap<'_> {
    fn drop(&mut self) {
        self.mesh.set_material(self.original.take());
    }
}

/**
 * Draws a translucent proxy volume for every light.
 *
 * Each proxy mesh is drawn with a shared marker material instead of its own:
 * the marker takes the light colour and an opacity that shows whether the
 * light is selected, enabled or disabled. The mesh material is put back after
 * every draw.
 */
pub struct LightsPass {
    enabled: bool,
    device: Rc<dyn RenderDevice>,
    lights: SharedLights,
    volumes: LightVolumes,
    pipeline: Option<Rc<dyn PipelineState>>,
    marker: SharedMaterial,
    opacity: MarkerOpacity,
    per_object_buffer: Option<Rc<dyn ConstantBuffer>>,
    light_transform: Matrix4<f32>,
}

impl LightsPass {
    pub fn new(
        device: Rc<dyn RenderDevice>,
        lights: SharedLights,
        volumes: LightVolumes,
        pipeline: Option<Rc<dyn PipelineState>>,
    ) -> anyhow::Result<Self> {
        let marker = device
            .create_material()
            .context("Failed to create the light marker material")?;
        let per_object_buffer = device
            .create_constant_buffer_for(&PerObject::new(Matrix4::identity(), Matrix4::identity()))
            .context("Failed to create the per-object constant buffer")?;
        Ok(Self {
            enabled: true,
            device,
            lights,
            volumes,
            pipeline,
            marker,
            opacity: MarkerOpacity::default(),
            per_object_buffer: Some(per_object_buffer),
            light_transform: Matrix4::identity(),
        })
    }

    pub fn with_marker_opacity(mut self, opacity: MarkerOpacity) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_config(self, config: &RenderConfig) -> Self {
        self.with_marker_opacity(config.marker_opacity)
    }

    pub fn set_marker_opacity(&mut self, opacity: MarkerOpacity) {
        self.opacity = opacity;
    }

    pub fn marker_material(&self) -> &SharedMaterial {
        &self.marker
    }

    pub fn volumes(&self) -> &LightVolumes {
        &self.volumes
    }

    fn marker_opacity(&self, light: &Light) -> f32 {
        if light.selected {
            self.opacity.selected
        } else if light.enabled {
            self.opacity.enabled
        } else {
            self.opacity.disabled
        }
    }
}

impl Visitor for LightsPass {
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
        let _swap = MaterialSwap::new(mesh, self.marker.clone());
        mesh.render(args, self.pipeline.as_deref());
    }
}

impl RenderPass for LightsPass {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn pre_render(&mut self, _args: &RenderEventArgs) {
        let Some(pipeline) = &self.pipeline else {
            trace!("Lights pass has no pipeline.");
            return;
        };
        if let Some(buffer) = &self.per_object_buffer {
            bind_constant_buffer(pipeline.as_ref(), ShaderType::Vertex, "PerObject", buffer);
        }
        pipeline.bind();
    }

    fn render(&mut self, args: &RenderEventArgs) {
        let lights = self.lights.borrow().clone();
        for light in &lights {
            let Some(volume) = self.volumes.for_light(light.light_type).cloned() else {
                trace!("No volume for {:?} lights.", light.light_type);
                continue;
            };
            {
                let mut marker = self.marker.borrow_mut();
                marker.set_diffuse_color(light.color);
                marker.set_opacity(self.marker_opacity(light));
            }
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

impl Drop for LightsPass {
    fn drop(&mut self) {
        if let Some(buffer) = self.per_object_buffer.take() {
            self.device.destroy_constant_buffer(buffer);
        }
    }
}
