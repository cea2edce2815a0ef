//! Graphics device contracts.
//!
//! The renderer never talks to a concrete graphics API. Everything it needs
//! from the GPU side is expressed by the traits in this module: a
//! [`RenderDevice`] that creates resources and submits draws, and the
//! resources themselves ([`Buffer`], [`ConstantBuffer`], [`Texture`],
//! [`RenderTarget`], [`Shader`], [`PipelineState`], [`Query`]).
//!
//! Binding is stateful and order dependent: a resource bound to a slot stays
//! bound until it is explicitly unbound or replaced. The passes in
//! [`crate::passes`] are written around that model.

use std::{cell::RefCell, rc::Rc};

use anyhow::Context;
use bytemuck::Pod;
use cgmath::{Vector3, Vector4};

use crate::{
    data_structures::{
        material::{Material, MaterialProperties, SharedMaterial},
        mesh::BufferBinding,
        scene_graph::SharedScene,
    },
    geometry,
};

/// Programmable pipeline stage a resource is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderType {
    Vertex,
    TessellationControl,
    TessellationEvaluation,
    Geometry,
    Pixel,
    Compute,
}

/// How a resource is exposed to a shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderParameterType {
    Texture,
    Sampler,
    Buffer,
    RWTexture,
    RWBuffer,
}

bitflags::bitflags! {
    /// Which attachments a clear operation touches.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
        const DEPTH_STENCIL = Self::DEPTH.bits() | Self::STENCIL.bits();
        const ALL = Self::COLOR.bits() | Self::DEPTH.bits() | Self::STENCIL.bits();
    }
}

/// A GPU buffer holding vertex, index or structured data.
pub trait Buffer {
    fn bind(&self, id: u32, stage: ShaderType, parameter: ShaderParameterType) -> bool;

    fn unbind(&self, id: u32, stage: ShaderType, parameter: ShaderParameterType);

    /// Copy the contents of `other` into this buffer.
    fn copy(&self, other: &dyn Buffer);

    /// Number of elements (vertices or indices) stored in the buffer.
    fn element_count(&self) -> u32;
}

/// A small buffer of shader constants, rewritten by the CPU every time it changes.
pub trait ConstantBuffer {
    /// Upload `data` as the new contents of the buffer.
    fn set(&self, data: &[u8]);

    fn bind(&self, id: u32, stage: ShaderType) -> bool;

    fn unbind(&self, id: u32, stage: ShaderType);
}

impl<'a> dyn ConstantBuffer + 'a {
    /// Upload a GPU-mirrored value.
    pub fn set_data<T: Pod>(&self, value: &T) {
        self.set(bytemuck::bytes_of(value));
    }
}

pub trait Texture {
    fn bind(&self, id: u32, stage: ShaderType, parameter: ShaderParameterType);

    fn unbind(&self, id: u32, stage: ShaderType, parameter: ShaderParameterType);

    fn clear(&self, flags: ClearFlags, color: Vector4<f32>, depth: f32, stencil: u8);

    fn generate_mipmaps(&self);

    /// Copy the contents of `other` into this texture.
    fn copy(&self, other: &dyn Texture);

    /// Whether any texel of the texture is not fully opaque.
    fn is_transparent(&self) -> bool;
}

/// A set of color/depth/stencil attachments rendered into by a pipeline.
pub trait RenderTarget {
    fn clear(&self, flags: ClearFlags, color: Vector4<f32>, depth: f32, stencil: u8);
}

pub trait Shader {
    fn shader_type(&self) -> ShaderType;

    /// Assign `buffer` to the constant buffer parameter called `name`.
    ///
    /// The assignment is applied immediately when the shader is bound and
    /// otherwise on its next bind. Unknown names are ignored.
    fn set_constant_buffer(&self, name: &str, buffer: &Rc<dyn ConstantBuffer>);

    /// Input slot of a vertex attribute, if the shader consumes it.
    fn input_slot(&self, binding: &BufferBinding) -> Option<u32>;

    fn bind(&self);

    fn unbind(&self);

    fn dispatch(&self, groups: Vector3<u32>);
}

/// Shaders plus fixed function state (blend, depth/stencil, rasterizer) and
/// the render target they draw into, bound as one unit.
pub trait PipelineState {
    fn bind(&self);

    fn unbind(&self);

    fn shader(&self, stage: ShaderType) -> Option<Rc<dyn Shader>>;

    fn render_target(&self) -> Option<Rc<dyn RenderTarget>>;
}

/// A GPU query (timer, occlusion, ...) that is opened and closed once per frame.
pub trait Query {
    fn begin(&self, frame: u64);

    fn end(&self, frame: u64);
}

/// Factory for GPU resources and the surface draw calls are submitted to.
///
/// Creation can fail; everything else is best effort and never reports errors
/// back into the frame.
pub trait RenderDevice {
    fn create_constant_buffer(&self, data: &[u8]) -> anyhow::Result<Rc<dyn ConstantBuffer>>;

    fn destroy_constant_buffer(&self, buffer: Rc<dyn ConstantBuffer>);

    fn create_vertex_buffer(
        &self,
        data: &[u8],
        vertex_count: u32,
        stride: u32,
    ) -> anyhow::Result<Rc<dyn Buffer>>;

    fn create_index_buffer(
        &self,
        data: &[u8],
        index_count: u32,
        stride: u32,
    ) -> anyhow::Result<Rc<dyn Buffer>>;

    fn draw(&self, vertex_count: u32, first_vertex: u32);

    fn draw_indexed(&self, index_count: u32, first_index: u32);

    /// Create a material whose properties are mirrored into a constant buffer.
    fn create_material(&self) -> anyhow::Result<SharedMaterial> {
        let buffer = self
            .create_constant_buffer(bytemuck::bytes_of(&MaterialProperties::default()))
            .context("Failed to create the material constant buffer")?;
        Ok(Rc::new(RefCell::new(Material::with_constant_buffer(buffer))))
    }

    /// A single quad in the plane `z`, spanning `left..right` and `bottom..top`.
    fn create_screen_quad(
        &self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        z: f32,
    ) -> anyhow::Result<SharedScene> {
        geometry::build_scene(self, &geometry::screen_quad(left, right, bottom, top, z))
    }

    fn create_sphere(&self, radius: f32, tessellation: u32) -> anyhow::Result<SharedScene> {
        geometry::build_scene(self, &geometry::sphere(radius, tessellation))
    }

    /// A cone with its apex in the origin opening along +Z.
    fn create_cone(
        &self,
        base_radius: f32,
        height: f32,
        tessellation: u32,
    ) -> anyhow::Result<SharedScene> {
        geometry::build_scene(self, &geometry::cone(base_radius, height, tessellation))
    }
}

impl<'d> dyn RenderDevice + 'd {
    /// Create a constant buffer initialised with a GPU-mirrored value.
    pub fn create_constant_buffer_for<T: Pod>(
        &self,
        value: &T,
    ) -> anyhow::Result<Rc<dyn ConstantBuffer>> {
        self.create_constant_buffer(bytemuck::bytes_of(value))
    }
}
