//! Drawable geometry.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use log::trace;

use crate::{
    context::RenderEventArgs,
    data_structures::{material::SharedMaterial, object::ObjectId, scene_graph::Visitor},
    device::{Buffer, PipelineState, ShaderParameterType, ShaderType},
};

/// Vertex attribute semantic a buffer is bound to, e.g. `("TEXCOORD", 1)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferBinding {
    pub name: String,
    pub index: u32,
}

impl BufferBinding {
    pub fn new(name: &str, index: u32) -> Self {
        Self {
            name: name.to_string(),
            index,
        }
    }
}

/// Vertex streams, an optional index buffer and a swappable material.
///
/// Meshes are shared between nodes (`Rc<Mesh>`), so the material lives in a
/// `RefCell` to allow passes to substitute it for a single draw.
pub struct Mesh {
    id: ObjectId,
    vertex_buffers: BTreeMap<BufferBinding, Rc<dyn Buffer>>,
    index_buffer: Option<Rc<dyn Buffer>>,
    material: RefCell<Option<SharedMaterial>>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            id: ObjectId::new(),
            vertex_buffers: BTreeMap::new(),
            index_buffer: None,
            material: RefCell::new(None),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn add_vertex_buffer(&mut self, binding: BufferBinding, buffer: Rc<dyn Buffer>) {
        self.vertex_buffers.insert(binding, buffer);
    }

    pub fn vertex_buffer(&self, binding: &BufferBinding) -> Option<&Rc<dyn Buffer>> {
        self.vertex_buffers.get(binding)
    }

    pub fn set_index_buffer(&mut self, buffer: Option<Rc<dyn Buffer>>) {
        self.index_buffer = buffer;
    }

    pub fn index_buffer(&self) -> Option<&Rc<dyn Buffer>> {
        self.index_buffer.as_ref()
    }

    pub fn material(&self) -> Option<SharedMaterial> {
        self.material.borrow().clone()
    }

    /// Replace the material and return the previous one.
    pub fn set_material(&self, material: Option<SharedMaterial>) -> Option<SharedMaterial> {
        self.material.replace(material)
    }

    pub fn accept(&self, visitor: &mut dyn Visitor, args: &RenderEventArgs) {
        visitor.visit_mesh(self, args);
    }

    /**
     * Issue one draw of the mesh with `pipeline`.
     *
     * The material is bound to the pipeline's pixel shader and every vertex
     * stream the vertex shader consumes is bound to its input slot. The draw
     * is indexed when an index buffer is present. Without a pipeline the draw
     * is still submitted so that the currently bound state is used.
     */
    pub fn render(&self, args: &RenderEventArgs, pipeline: Option<&dyn PipelineState>) {
        let vertex_shader = pipeline.and_then(|p| p.shader(ShaderType::Vertex));
        let pixel_shader = pipeline.and_then(|p| p.shader(ShaderType::Pixel));
        let material = self.material();

        if let Some(material) = &material {
            material.borrow_mut().bind(pixel_shader.as_deref());
        }

        let mut bound = Vec::with_capacity(self.vertex_buffers.len());
        if let Some(vertex_shader) = &vertex_shader {
            for (binding, buffer) in &self.vertex_buffers {
                if let Some(slot) = vertex_shader.input_slot(binding) {
                    buffer.bind(slot, ShaderType::Vertex, ShaderParameterType::Buffer);
                    bound.push((slot, buffer));
                }
            }
        }

        match &self.index_buffer {
            Some(index_buffer) => {
                index_buffer.bind(0, ShaderType::Vertex, ShaderParameterType::Buffer);
                args.device.draw_indexed(index_buffer.element_count(), 0);
                index_buffer.unbind(0, ShaderType::Vertex, ShaderParameterType::Buffer);
            }
            None => match self.vertex_buffers.values().next() {
                Some(buffer) => args.device.draw(buffer.element_count(), 0),
                None => trace!("Mesh {} has no geometry to draw.", self.id),
            },
        }

        for (slot, buffer) in bound {
            buffer.unbind(slot, ShaderType::Vertex, ShaderParameterType::Buffer);
        }
        if let Some(material) = &material {
            material.borrow().unbind(pixel_shader.as_deref());
        }
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
