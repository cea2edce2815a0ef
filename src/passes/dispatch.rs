use std::rc::Rc;

use cgmath::Vector3;
use log::trace;

use crate::{
    context::RenderEventArgs, data_structures::scene_graph::Visitor, device::Shader,
    passes::RenderPass,
};

/// Runs a compute shader with a fixed number of thread groups.
pub struct DispatchPass {
    enabled: bool,
    shader: Option<Rc<dyn Shader>>,
    groups: Vector3<u32>,
}

impl DispatchPass {
    pub fn new(shader: Option<Rc<dyn Shader>>, groups: Vector3<u32>) -> Self {
        Self {
            enabled: true,
            shader,
            groups,
        }
    }

    pub fn set_groups(&mut self, groups: Vector3<u32>) {
        self.groups = groups;
    }
}

impl Visitor for DispatchPass {}

impl RenderPass for DispatchPass {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn pre_render(&mut self, _args: &RenderEventArgs) {
        if let Some(shader) = &self.shader {
            shader.bind();
        }
    }

    fn render(&mut self, _args: &RenderEventArgs) {
        match &self.shader {
            Some(shader) => shader.dispatch(self.groups),
            None => trace!("No compute shader to dispatch."),
        }
    }

    fn post_render(&mut self, _args: &RenderEventArgs) {
        if let Some(shader) = &self.shader {
            shader.unbind();
        }
    }
}
