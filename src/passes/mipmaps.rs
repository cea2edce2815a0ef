use std::rc::Rc;

use crate::{
    context::RenderEventArgs, data_structures::scene_graph::Visitor, device::Texture,
    passes::RenderPass,
};

pub struct GenerateMipMapsPass {
    enabled: bool,
    texture: Option<Rc<dyn Texture>>,
}

impl GenerateMipMapsPass {
    pub fn new(texture: Option<Rc<dyn Texture>>) -> Self {
        Self {
            enabled: true,
            texture,
        }
    }
}

impl Visitor for GenerateMipMapsPass {}

impl RenderPass for GenerateMipMapsPass {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn render(&mut self, _args: &RenderEventArgs) {
        if let Some(texture) = &self.texture {
            texture.generate_mipmaps();
        }
    }
}
