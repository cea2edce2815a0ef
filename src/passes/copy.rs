use std::rc::Rc;

use log::trace;

use crate::{
    context::RenderEventArgs,
    data_structures::scene_graph::Visitor,
    device::{Buffer, Texture},
    passes::RenderPass,
};

/// Copies one buffer into another every frame.
pub struct CopyBufferPass {
    enabled: bool,
    destination: Option<Rc<dyn Buffer>>,
    source: Option<Rc<dyn Buffer>>,
}

impl CopyBufferPass {
    pub fn new(destination: Option<Rc<dyn Buffer>>, source: Option<Rc<dyn Buffer>>) -> Self {
        Self {
            enabled: true,
            destination,
            source,
        }
    }
}

impl Visitor for CopyBufferPass {}

impl RenderPass for CopyBufferPass {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn render(&mut self, _args: &RenderEventArgs) {
        match (&self.destination, &self.source) {
            (Some(destination), Some(source)) => destination.copy(source.as_ref()),
            _ => trace!("Buffer copy is missing a source or destination."),
        }
    }
}

/// Copies one texture into another every frame.
pub struct CopyTexturePass {
    enabled: bool,
    destination: Option<Rc<dyn Texture>>,
    source: Option<Rc<dyn Texture>>,
}

impl CopyTexturePass {
    pub fn new(destination: Option<Rc<dyn Texture>>, source: Option<Rc<dyn Texture>>) -> Self {
        Self {
            enabled: true,
            destination,
            source,
        }
    }
}

impl Visitor for CopyTexturePass {}

impl RenderPass for CopyTexturePass {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn render(&mut self, _args: &RenderEventArgs) {
        match (&self.destination, &self.source) {
            (Some(destination), Some(source)) => destination.copy(source.as_ref()),
            _ => trace!("Texture copy is missing a source or destination."),
        }
    }
}
