use std::rc::Rc;

use cgmath::Vector4;
use log::trace;

use crate::{
    context::{RenderConfig, RenderEventArgs},
    data_structures::scene_graph::Visitor,
    device::{ClearFlags, RenderTarget, Texture},
    passes::RenderPass,
};

/// What a [`ClearRenderTargetPass`] clears.
#[derive(Clone)]
pub enum ClearTarget {
    RenderTarget(Rc<dyn RenderTarget>),
    Texture(Rc<dyn Texture>),
}

/// Clears a render target or a single texture at the start of a technique.
pub struct ClearRenderTargetPass {
    enabled: bool,
    target: Option<ClearTarget>,
    flags: ClearFlags,
    color: Vector4<f32>,
    depth: f32,
    stencil: u8,
}

impl ClearRenderTargetPass {
    /// Clears everything to transparent black, depth 1 and stencil 0.
    pub fn new(target: Option<ClearTarget>) -> Self {
        Self {
            enabled: true,
            target,
            flags: ClearFlags::ALL,
            color: Vector4::new(0.0, 0.0, 0.0, 0.0),
            depth: 1.0,
            stencil: 0,
        }
    }

    /// Clear values taken from the renderer configuration.
    pub fn from_config(target: Option<ClearTarget>, config: &RenderConfig) -> Self {
        Self::new(target)
            .with_color(config.clear_colour)
            .with_depth(config.clear_depth)
            .with_stencil(config.clear_stencil)
    }

    pub fn with_flags(mut self, flags: ClearFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_color(mut self, color: Vector4<f32>) -> Self {
        self.color = color;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_stencil(mut self, stencil: u8) -> Self {
        self.stencil = stencil;
        self
    }

    pub fn set_target(&mut self, target: Option<ClearTarget>) {
        self.target = target;
    }
}

impl Visitor for ClearRenderTargetPass {}

impl RenderPass for ClearRenderTargetPass {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn render(&mut self, _args: &RenderEventArgs) {
        match &self.target {
            Some(ClearTarget::RenderTarget(target)) => {
                target.clear(self.flags, self.color, self.depth, self.stencil)
            }
            Some(ClearTarget::Texture(texture)) => {
                texture.clear(self.flags, self.color, self.depth, self.stencil)
            }
            None => trace!("Nothing to clear."),
        }
    }
}
