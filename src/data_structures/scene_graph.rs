//! Scene graph and visitor-based traversal.
//!
//! A [`Scene`] owns a tree of [`SceneNode`]s. Every node carries a local
//! transform and the world transform derived from its ancestors, plus any
//! number of shared [`Mesh`]es. Render passes never walk the tree
//! themselves: they implement [`Visitor`] and hand themselves to
//! [`Scene::accept`], which calls back into the pass for the scene, for every
//! node (parents before children) and for every mesh of a node.

use std::{cell::RefCell, rc::Rc};

use cgmath::{Matrix4, SquareMatrix};
use log::warn;

use crate::{
    context::RenderEventArgs,
    data_structures::{mesh::Mesh, object::ObjectId},
};

pub type SharedScene = Rc<RefCell<Scene>>;

/// Double dispatch over the closed set of scene object kinds.
///
/// Every method defaults to a no-op so a visitor only implements the kinds it
/// cares about.
pub trait Visitor {
    fn visit_scene(&mut self, _scene: &Scene, _args: &RenderEventArgs) {}

    fn visit_scene_node(&mut self, _node: &SceneNode, _args: &RenderEventArgs) {}

    fn visit_mesh(&mut self, _mesh: &Mesh, _args: &RenderEventArgs) {}
}

pub struct Scene {
    id: ObjectId,
    root: SceneNode,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            id: ObjectId::new(),
            root: SceneNode::new("root"),
        }
    }

    pub fn shared(self) -> SharedScene {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut SceneNode {
        &mut self.root
    }

    /// Depth-first lookup of the first node called `name`.
    pub fn find_node(&self, name: &str) -> Option<&SceneNode> {
        self.root.find(name)
    }

    pub fn find_node_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        self.root.find_mut(name)
    }

    pub fn accept(&self, visitor: &mut dyn Visitor, args: &RenderEventArgs) {
        visitor.visit_scene(self, args);
        self.root.accept(visitor, args);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * A node in the transform hierarchy.
 *
 * World transforms are propagated eagerly: changing a local transform or
 * attaching a node to a new parent recomputes the world transform of the
 * whole affected subtree, so [`SceneNode::world_transform`] is always in sync
 * with the current parent chain.
 */
pub struct SceneNode {
    id: ObjectId,
    name: String,
    local_transform: Matrix4<f32>,
    parent_transform: Matrix4<f32>,
    world_transform: Matrix4<f32>,
    meshes: Vec<Rc<Mesh>>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: &str) -> Self {
        Self::with_transform(name, Matrix4::identity())
    }

    pub fn with_transform(name: &str, local_transform: Matrix4<f32>) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.to_string(),
            local_transform,
            parent_transform: Matrix4::identity(),
            world_transform: local_transform,
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn local_transform(&self) -> Matrix4<f32> {
        self.local_transform
    }

    pub fn set_local_transform(&mut self, local_transform: Matrix4<f32>) {
        self.local_transform = local_transform;
        self.update_world_transforms(self.parent_transform);
    }

    pub fn world_transform(&self) -> Matrix4<f32> {
        self.world_transform
    }

    /// Inverse of the world transform, or identity for degenerate transforms.
    pub fn inverse_world_transform(&self) -> Matrix4<f32> {
        self.world_transform.invert().unwrap_or_else(|| {
            warn!("Scene node '{}' has a non-invertible world transform.", self.name);
            Matrix4::identity()
        })
    }

    /// Attach `child` and return a handle to it inside the tree.
    pub fn add_child(&mut self, mut child: SceneNode) -> &mut SceneNode {
        child.update_world_transforms(self.world_transform);
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Detach the child with `id`. The detached node becomes a root again.
    pub fn remove_child(&mut self, id: ObjectId) -> Option<SceneNode> {
        let position = self.children.iter().position(|child| child.id == id)?;
        let mut child = self.children.remove(position);
        child.update_world_transforms(Matrix4::identity());
        Some(child)
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    /// Mutable access to the children. Only a slice is handed out so that
    /// attaching always goes through [`SceneNode::add_child`].
    pub fn children_mut(&mut self) -> &mut [SceneNode] {
        &mut self.children
    }

    pub fn add_mesh(&mut self, mesh: Rc<Mesh>) {
        self.meshes.push(mesh);
    }

    pub fn remove_mesh(&mut self, id: ObjectId) -> Option<Rc<Mesh>> {
        let position = self.meshes.iter().position(|mesh| mesh.id() == id)?;
        Some(self.meshes.remove(position))
    }

    pub fn meshes(&self) -> &[Rc<Mesh>] {
        &self.meshes
    }

    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(name))
    }

    pub fn accept(&self, visitor: &mut dyn Visitor, args: &RenderEventArgs) {
        visitor.visit_scene_node(self, args);
        for mesh in &self.meshes {
            mesh.accept(visitor, args);
        }
        for child in &self.children {
            child.accept(visitor, args);
        }
    }

    fn update_world_transforms(&mut self, parent_transform: Matrix4<f32>) {
        self.parent_transform = parent_transform;
        self.world_transform = parent_transform * self.local_transform;
        let world_transform = self.world_transform;
        for child in self.children.iter_mut() {
            child.update_world_transforms(world_transform);
        }
    }
}
