//! Procedural proxy geometry.
//!
//! Light volumes and full-screen passes need a handful of simple shapes: a
//! screen aligned quad, a unit sphere and a cone. They are generated on the
//! CPU here and uploaded through [`build_scene`] as a one-node [`Scene`].

use std::{cell::RefCell, f32::consts::PI, rc::Rc};

use anyhow::Context;

use crate::{
    data_structures::{
        mesh::{BufferBinding, Mesh},
        scene_graph::{Scene, SharedScene},
    },
    device::RenderDevice,
};

/// Planar vertex streams plus a triangle list with 32-bit indices.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn push(&mut self, position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        self.tex_coords.push(tex_coord);
        index
    }
}

pub fn screen_quad(left: f32, right: f32, bottom: f32, top: f32, z: f32) -> Geometry {
    let mut geometry = Geometry::default();
    let normal = [0.0, 0.0, 1.0];
    geometry.push([left, bottom, z], normal, [0.0, 1.0]);
    geometry.push([right, bottom, z], normal, [1.0, 1.0]);
    geometry.push([right, top, z], normal, [1.0, 0.0]);
    geometry.push([left, top, z], normal, [0.0, 0.0]);
    geometry.indices = vec![0, 1, 2, 0, 2, 3];
    geometry
}

/// UV sphere around the origin. `tessellation` is the number of latitude
/// rings; twice as many longitude segments are generated.
pub fn sphere(radius: f32, tessellation: u32) -> Geometry {
    let rings = tessellation.max(2);
    let segments = rings * 2;
    let mut geometry = Geometry::default();

    for y in 0..=rings {
        let v = y as f32 / rings as f32;
        let theta = v * PI;
        let ring_radius = theta.sin();
        let ny = -theta.cos();
        for x in 0..=segments {
            let u = x as f32 / segments as f32;
            let phi = u * 2.0 * PI;
            let normal = [-ring_radius * phi.cos(), ny, ring_radius * phi.sin()];
            let position = [normal[0] * radius, normal[1] * radius, normal[2] * radius];
            geometry.push(position, normal, [u, 1.0 - v]);
        }
    }

    let stride = segments + 1;
    for y in 0..rings {
        for x in 0..segments {
            let v0 = y * stride + x;
            let v1 = v0 + 1;
            let v2 = (y + 1) * stride + x;
            let v3 = v2 + 1;
            geometry.indices.extend_from_slice(&[v0, v1, v2, v1, v3, v2]);
        }
    }
    geometry
}

/// Cone with the apex in the origin and the base cap at `z = height`.
pub fn cone(base_radius: f32, height: f32, tessellation: u32) -> Geometry {
    let segments = tessellation.max(3);
    let mut geometry = Geometry::default();
    let slant = (base_radius * base_radius + height * height).sqrt().max(f32::EPSILON);

    let apex = geometry.push([0.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.5, 0.0]);
    let mut rim = Vec::with_capacity(segments as usize);
    for i in 0..segments {
        let phi = i as f32 / segments as f32 * 2.0 * PI;
        let (sin, cos) = phi.sin_cos();
        // Side normal tilts back towards the apex.
        let normal = [
            cos * height / slant,
            sin * height / slant,
            -base_radius / slant,
        ];
        rim.push(geometry.push(
            [cos * base_radius, sin * base_radius, height],
            normal,
            [i as f32 / segments as f32, 1.0],
        ));
    }
    let center = geometry.push([0.0, 0.0, height], [0.0, 0.0, 1.0], [0.5, 1.0]);

    for i in 0..rim.len() {
        let current = rim[i];
        let next = rim[(i + 1) % rim.len()];
        geometry.indices.extend_from_slice(&[apex, next, current]);
        geometry.indices.extend_from_slice(&[center, current, next]);
    }
    geometry
}

/// Upload `geometry` and wrap it in a scene with a single mesh on the root node.
pub fn build_scene<D: RenderDevice + ?Sized>(
    device: &D,
    geometry: &Geometry,
) -> anyhow::Result<SharedScene> {
    let vertex_count = geometry.vertex_count() as u32;
    let mut mesh = Mesh::new();

    let positions = device
        .create_vertex_buffer(bytemuck::cast_slice(&geometry.positions), vertex_count, 12)
        .context("Failed to create the position buffer")?;
    mesh.add_vertex_buffer(BufferBinding::new("POSITION", 0), positions);

    let normals = device
        .create_vertex_buffer(bytemuck::cast_slice(&geometry.normals), vertex_count, 12)
        .context("Failed to create the normal buffer")?;
    mesh.add_vertex_buffer(BufferBinding::new("NORMAL", 0), normals);

    let tex_coords = device
        .create_vertex_buffer(bytemuck::cast_slice(&geometry.tex_coords), vertex_count, 8)
        .context("Failed to create the texture coordinate buffer")?;
    mesh.add_vertex_buffer(BufferBinding::new("TEXCOORD", 0), tex_coords);

    let indices = device
        .create_index_buffer(
            bytemuck::cast_slice(&geometry.indices),
            geometry.indices.len() as u32,
            4,
        )
        .context("Failed to create the index buffer")?;
    mesh.set_index_buffer(Some(indices));

    let mut scene = Scene::new();
    scene.root_mut().add_mesh(Rc::new(mesh));
    Ok(Rc::new(RefCell::new(scene)))
}
