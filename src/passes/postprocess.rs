use std::rc::Rc;

use cgmath::{Matrix4, SquareMatrix};

use crate::{
    context::RenderEventArgs,
    data_structures::{
        mesh::Mesh,
        scene_graph::{SceneNode, Visitor},
    },
    device::{ShaderParameterType, ShaderType, Texture},
    passes::{PerObject, RenderPass, base::BasePass, traverse},
};

/// Draws a full screen quad scene with a fixed projection, reading one input texture.
///
/// The camera of the frame is ignored: every node gets `ModelView = I` and
/// `ModelViewProjection = projection`. The input texture is bound to pixel
/// texture slot 0 for the duration of the pass.
pub struct PostprocessPass {
    base: BasePass,
    projection: Matrix4<f32>,
    input: Option<Rc<dyn Texture>>,
}

impl PostprocessPass {
    pub fn new(base: BasePass, projection: Matrix4<f32>, input: Option<Rc<dyn Texture>>) -> Self {
        Self {
            base,
            projection,
            input,
        }
    }

    pub fn base(&self) -> &BasePass {
        &self.base
    }

    pub fn set_input(&mut self, input: Option<Rc<dyn Texture>>) {
        self.input = input;
    }
}

impl Visitor for PostprocessPass {
    fn visit_scene_node(&mut self, _node: &SceneNode, _args: &RenderEventArgs) {
        self.base
            .set_per_object(&PerObject::new(Matrix4::identity(), self.projection));
    }

    fn visit_mesh(&mut self, mesh: &Mesh, args: &RenderEventArgs) {
        self.base.render_mesh(mesh, args);
    }
}

impl RenderPass for PostprocessPass {
    fn set_enabled(&mut self, enabled: bool) {
        self.base.set_enabled(enabled);
    }

    fn is_enabled(&self) -> bool {
        self.base.is_enabled()
    }

    fn pre_render(&mut self, args: &RenderEventArgs) {
        self.base.pre_render(args);
        if let Some(input) = &self.input {
            input.bind(0, ShaderType::Pixel, ShaderParameterType::Texture);
        }
    }

    fn render(&mut self, args: &RenderEventArgs) {
        let scene = self.base.scene();
        traverse(scene.as_ref(), self, args);
    }

    fn post_render(&mut self, args: &RenderEventArgs) {
        if let Some(input) = &self.input {
            input.unbind(0, ShaderType::Pixel, ShaderParameterType::Texture);
        }
        self.base.post_render(args);
    }
}
