use crate::{
    context::RenderEventArgs,
    data_structures::{
        mesh::Mesh,
        scene_graph::{SceneNode, Visitor},
    },
    passes::{RenderPass, base::BasePass, traverse},
};

/// A [`BasePass`] that only draws meshes whose material is opaque.
pub struct OpaquePass {
    base: BasePass,
}

impl OpaquePass {
    pub fn new(base: BasePass) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &BasePass {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut BasePass {
        &mut self.base
    }
}

impl Visitor for OpaquePass {
    fn visit_scene_node(&mut self, node: &SceneNode, args: &RenderEventArgs) {
        self.base.visit_scene_node(node, args);
    }

    fn visit_mesh(&mut self, mesh: &Mesh, args: &RenderEventArgs) {
        let opaque = mesh
            .material()
            .is_some_and(|material| !material.borrow().is_transparent());
        if opaque {
            self.base.render_mesh(mesh, args);
        }
    }
}

impl RenderPass for OpaquePass {
    fn set_enabled(&mut self, enabled: bool) {
        self.base.set_enabled(enabled);
    }

    fn is_enabled(&self) -> bool {
        self.base.is_enabled()
    }

    fn pre_render(&mut self, args: &RenderEventArgs) {
        self.base.pre_render(args);
    }

    fn render(&mut self, args: &RenderEventArgs) {
        let scene = self.base.scene();
        traverse(scene.as_ref(), self, args);
    }

    fn post_render(&mut self, args: &RenderEventArgs) {
        self.base.post_render(args);
    }
}
