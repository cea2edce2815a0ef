use std::rc::Rc;

use cgmath::{Matrix4, SquareMatrix, Vector3};
use render_technique::{
    context::RenderEventArgs,
    data_structures::{
        material::{Material, SharedMaterial, TextureSlot},
        scene_graph::{Scene, SceneNode, SharedScene},
    },
    device::{PipelineState, RenderDevice},
    passes::{
        RenderPass, base::BasePass, opaque::OpaquePass, postprocess::PostprocessPass,
        transparent::TransparentPass,
    },
};

use crate::common::test_utils::{
    Command, MockPipeline, MockTexture, RecordingDevice, assert_matrix_eq, indexed_mesh,
    init_logger, run_pass, test_camera,
};

mod common;

fn opaque_material() -> SharedMaterial {
    Material::new().shared()
}

#[test]
fn should_upload_view_and_projection_times_world_per_node() {
    init_logger();
    let device = RecordingDevice::new();
    let log = device.log();
    let camera = test_camera();
    let parent_transform = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
    let child_transform = Matrix4::from_scale(2.0);

    let mut scene = Scene::new();
    let parent = scene
        .root_mut()
        .add_child(SceneNode::with_transform("parent", parent_transform));
    parent.add_mesh(indexed_mesh(3, Some(opaque_material()), &log));
    parent
        .add_child(SceneNode::with_transform("child", child_transform))
        .add_mesh(indexed_mesh(6, Some(opaque_material()), &log));

    let pipeline = MockPipeline::new("geometry", &log);
    let mut pass = BasePass::new(device.clone(), Some(scene.shared()), Some(pipeline)).unwrap();
    run_pass(&mut pass, &RenderEventArgs::new(device.as_ref(), Some(&camera)));

    let view = camera.view_matrix();
    let projection = camera.projection_matrix();
    let uploads = device.per_object_uploads();
    assert_eq!(uploads.len(), 3);
    assert_matrix_eq(uploads[0].model_view, view);
    assert_matrix_eq(uploads[1].model_view, view * parent_transform);
    assert_matrix_eq(
        uploads[1].model_view_projection,
        projection * view * parent_transform,
    );
    assert_matrix_eq(
        uploads[2].model_view_projection,
        projection * view * parent_transform * child_transform,
    );
    assert_eq!(device.indexed_draws(), vec![3, 6]);
}

#[test]
fn should_bind_pipeline_around_traversal() {
    let device = RecordingDevice::new();
    let log = device.log();
    let mut scene = Scene::new();
    scene
        .root_mut()
        .add_mesh(indexed_mesh(3, Some(opaque_material()), &log));
    let pipeline = MockPipeline::new("geometry", &log);
    let mut pass = BasePass::new(device.clone(), Some(scene.shared()), Some(pipeline)).unwrap();

    run_pass(&mut pass, &RenderEventArgs::new(device.as_ref(), None));

    let commands = device.commands();
    let assign = commands
        .iter()
        .position(|c| {
            *c == Command::AssignConstantBuffer {
                shader: "geometry.vs".to_string(),
                name: "PerObject".to_string(),
            }
        })
        .expect("per-object buffer is assigned");
    let bind = commands
        .iter()
        .position(|c| *c == Command::BindPipeline("geometry".to_string()))
        .unwrap();
    let draw = commands
        .iter()
        .position(|c| *c == Command::DrawIndexed { index_count: 3 })
        .unwrap();
    let unbind = commands
        .iter()
        .position(|c| *c == Command::UnbindPipeline("geometry".to_string()))
        .unwrap();
    assert!(assign < bind && bind < draw && draw < unbind);
}

#[test]
fn should_skip_meshes_without_material() {
    let device = RecordingDevice::new();
    let log = device.log();
    let mut scene = Scene::new();
    scene.root_mut().add_mesh(indexed_mesh(3, None, &log));
    scene
        .root_mut()
        .add_mesh(indexed_mesh(6, Some(opaque_material()), &log));
    let mut pass = BasePass::new(
        device.clone(),
        Some(scene.shared()),
        Some(MockPipeline::new("geometry", &log)),
    )
    .unwrap();

    run_pass(&mut pass, &RenderEventArgs::new(device.as_ref(), None));

    assert_eq!(device.indexed_draws(), vec![6]);
}

#[test]
fn missing_scene_or_pipeline_should_skip_only_dependent_work() {
    let device = RecordingDevice::new();
    let log = device.log();

    let mut no_scene = BasePass::new(device.clone(), None, Some(MockPipeline::new("p", &log))).unwrap();
    run_pass(&mut no_scene, &RenderEventArgs::new(device.as_ref(), None));
    assert!(device.draws().is_empty());
    assert!(device.commands().contains(&Command::BindPipeline("p".to_string())));

    device.clear_log();
    let mut scene = Scene::new();
    scene
        .root_mut()
        .add_mesh(indexed_mesh(3, Some(opaque_material()), &log));
    let mut no_pipeline = BasePass::new(device.clone(), Some(scene.shared()), None).unwrap();
    run_pass(&mut no_pipeline, &RenderEventArgs::new(device.as_ref(), None));
    assert_eq!(device.indexed_draws(), vec![3]);
    assert!(
        !device
            .commands()
            .iter()
            .any(|c| matches!(c, Command::BindPipeline(_)))
    );
}

#[test]
fn dropping_pass_should_destroy_its_constant_buffer() {
    let device = RecordingDevice::new();
    let pass = BasePass::new(device.clone(), None, None).unwrap();
    assert_eq!(device.live_constant_buffers(), 1);

    drop(pass);

    assert_eq!(device.live_constant_buffers(), 0);
}

/// Seven meshes, told apart by their index count.
fn mixed_scene(device: &RecordingDevice) -> SharedScene {
    let log = device.log();
    let mut scene = Scene::new();
    let root = scene.root_mut();

    root.add_mesh(indexed_mesh(3, Some(opaque_material()), &log));

    let mut translucent = Material::new();
    translucent.set_opacity(0.5);
    root.add_mesh(indexed_mesh(6, Some(translucent.shared()), &log));

    let mut cutout = Material::new();
    cutout.set_texture(TextureSlot::Opacity, Some(MockTexture::new("mask", &log)));
    root.add_mesh(indexed_mesh(9, Some(cutout.shared()), &log));

    let mut no_alpha_test = Material::new();
    no_alpha_test.set_alpha_threshold(0.0);
    root.add_mesh(indexed_mesh(12, Some(no_alpha_test.shared()), &log));

    let mut leaves = Material::new();
    leaves.set_texture(
        TextureSlot::Diffuse,
        Some(MockTexture::transparent("leaves", &log)),
    );
    let child = root.add_child(SceneNode::new("child"));
    child.add_mesh(indexed_mesh(15, Some(leaves.shared()), &log));

    let mut bricks = Material::new();
    bricks.set_texture(TextureSlot::Diffuse, Some(MockTexture::new("bricks", &log)));
    child.add_mesh(indexed_mesh(18, Some(bricks.shared()), &log));

    child.add_mesh(indexed_mesh(21, None, &log));
    scene.shared()
}

#[test]
fn opaque_and_transparent_passes_should_partition_meshes() {
    let device = RecordingDevice::new();
    let log = device.log();
    let scene = mixed_scene(&device);
    let args = RenderEventArgs::new(device.as_ref(), None);

    let mut opaque = OpaquePass::new(
        BasePass::new(device.clone(), Some(scene.clone()), Some(MockPipeline::new("opaque", &log))).unwrap(),
    );
    run_pass(&mut opaque, &args);
    let opaque_draws = device.indexed_draws();

    device.clear_log();
    let mut transparent = TransparentPass::new(
        BasePass::new(device.clone(), Some(scene), Some(MockPipeline::new("transparent", &log))).unwrap(),
    );
    run_pass(&mut transparent, &args);
    let transparent_draws = device.indexed_draws();

    assert_eq!(opaque_draws, vec![3, 18]);
    assert_eq!(transparent_draws, vec![6, 9, 12, 15]);
}

#[test]
fn filtered_pass_should_forward_enable_state() {
    let device = RecordingDevice::new();
    let mut opaque = OpaquePass::new(BasePass::new(device.clone(), None, None).unwrap());
    assert!(opaque.is_enabled());
    opaque.set_enabled(false);
    assert!(!opaque.base().is_enabled());
}

#[test]
fn postprocess_should_use_fixed_projection_and_bind_input() {
    let device = RecordingDevice::new();
    let log = device.log();
    let camera = test_camera();
    let quad = device.create_screen_quad(-1.0, 1.0, -1.0, 1.0, 0.0).unwrap();
    quad.borrow().root().meshes()[0].set_material(Some(opaque_material()));
    let projection = cgmath::ortho(-1.0, 1.0, -1.0, 1.0, 0.0, 1.0);
    let pipeline = MockPipeline::new("tonemap", &log);
    let mut pass = PostprocessPass::new(
        BasePass::new(device.clone(), Some(quad), Some(pipeline.clone())).unwrap(),
        projection,
        Some(MockTexture::new("hdr", &log)),
    );
    device.clear_log();

    run_pass(&mut pass, &RenderEventArgs::new(device.as_ref(), Some(&camera)));

    let uploads = device.per_object_uploads();
    assert_eq!(uploads.len(), 1);
    assert_matrix_eq(uploads[0].model_view, Matrix4::identity());
    assert_matrix_eq(uploads[0].model_view_projection, projection);
    assert_eq!(device.indexed_draws(), vec![6]);

    let commands = device.commands();
    let bind = commands
        .iter()
        .position(|c| matches!(c, Command::BindTexture { texture, slot: 0, .. } if texture == "hdr"))
        .unwrap();
    let unbind = commands
        .iter()
        .position(|c| matches!(c, Command::UnbindTexture { texture, slot: 0, .. } if texture == "hdr"))
        .unwrap();
    let draw = commands
        .iter()
        .position(|c| matches!(c, Command::DrawIndexed { .. }))
        .unwrap();
    assert!(bind < draw && draw < unbind);
    assert!(pass.base().pipeline().is_some_and(|p| {
        Rc::ptr_eq(p, &(pipeline.clone() as Rc<dyn PipelineState>))
    }));
}
