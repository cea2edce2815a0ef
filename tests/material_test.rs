use std::rc::Rc;

use cgmath::Vector4;
use render_technique::{
    data_structures::material::{Material, MaterialProperties, TextureSlot},
    device::{PipelineState, RenderDevice, ShaderType, Texture},
};

use crate::common::test_utils::{Command, MockPipeline, MockTexture, RecordingDevice};

mod common;

#[test]
fn default_material_should_be_opaque() {
    let material = Material::new();
    assert!(!material.is_transparent());
    assert_eq!(material.opacity(), 1.0);
    assert_eq!(material.specular_power(), -1.0);
    assert_eq!(material.index_of_refraction(), -1.0);
    assert_eq!(material.bump_intensity(), 5.0);
    assert_eq!(material.specular_scale(), 128.0);
    assert_eq!(material.alpha_threshold(), 0.1);
    assert_eq!(material.global_ambient(), Vector4::new(0.1, 0.1, 0.15, 1.0));
    assert_eq!(material.diffuse_color(), Vector4::new(1.0, 1.0, 1.0, 1.0));
}

#[test]
fn properties_should_keep_sixteen_byte_rows() {
    assert_eq!(size_of::<MaterialProperties>() % 16, 0);
}

#[test]
fn opacity_below_one_is_transparent() {
    let mut material = Material::new();
    material.set_opacity(0.99);
    assert!(material.is_transparent());
}

#[test]
fn opacity_texture_is_transparent() {
    let device = RecordingDevice::new();
    let mut material = Material::new();
    material.set_texture(
        TextureSlot::Opacity,
        Some(MockTexture::new("opacity", &device.log())),
    );
    assert!(material.is_transparent());
    assert_eq!(material.properties().has_opacity_texture, 1);

    material.set_texture(TextureSlot::Opacity, None);
    assert!(!material.is_transparent());
    assert_eq!(material.properties().has_opacity_texture, 0);
}

#[test]
fn transparent_diffuse_texture_is_transparent() {
    let device = RecordingDevice::new();
    let mut material = Material::new();

    material.set_texture(
        TextureSlot::Diffuse,
        Some(MockTexture::new("opaque", &device.log())),
    );
    assert!(!material.is_transparent());

    material.set_texture(
        TextureSlot::Diffuse,
        Some(MockTexture::transparent("leaves", &device.log())),
    );
    assert!(material.is_transparent());
}

#[test]
fn non_positive_alpha_threshold_is_transparent() {
    let mut material = Material::new();
    material.set_alpha_threshold(0.0);
    assert!(material.is_transparent());
    material.set_alpha_threshold(-1.0);
    assert!(material.is_transparent());
    material.set_alpha_threshold(0.5);
    assert!(!material.is_transparent());
}

#[test]
fn constant_buffer_should_be_refreshed_once_per_change() {
    let device = RecordingDevice::new();
    let pipeline = MockPipeline::new("forward", &device.log());
    let pixel_shader = pipeline.shader(ShaderType::Pixel);
    let material = device.create_material().unwrap();
    let material_size = size_of::<MaterialProperties>();
    assert!(material.borrow().is_dirty());

    material.borrow_mut().bind(pixel_shader.as_deref());
    material.borrow_mut().bind(pixel_shader.as_deref());
    assert_eq!(device.uploads_of_size(material_size).len(), 1);
    assert!(!material.borrow().is_dirty());

    material.borrow_mut().set_opacity(0.5);
    material
        .borrow_mut()
        .set_diffuse_color(Vector4::new(1.0, 0.0, 0.0, 1.0));
    material.borrow_mut().bind(pixel_shader.as_deref());
    material.borrow_mut().bind(pixel_shader.as_deref());

    let uploads = device.uploads_of_size(material_size);
    assert_eq!(uploads.len(), 2);
    let uploaded: MaterialProperties = bytemuck::pod_read_unaligned(&uploads[1]);
    assert_eq!(uploaded.opacity, 0.5);
    assert_eq!(uploaded.diffuse_color, [1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn bind_should_assign_constants_and_textures_to_pixel_shader() {
    let device = RecordingDevice::new();
    let log = device.log();
    let pipeline = MockPipeline::new("forward", &log);
    let pixel_shader = pipeline.shader(ShaderType::Pixel);
    let material = device.create_material().unwrap();
    let normal_map: Rc<dyn Texture> = MockTexture::new("normal", &log);
    material
        .borrow_mut()
        .set_texture(TextureSlot::Normal, Some(normal_map));
    device.clear_log();

    material.borrow_mut().bind(pixel_shader.as_deref());
    material.borrow().unbind(pixel_shader.as_deref());

    let commands = device.commands();
    assert!(commands.contains(&Command::AssignConstantBuffer {
        shader: "forward.ps".to_string(),
        name: "Material".to_string(),
    }));
    assert!(commands.contains(&Command::BindTexture {
        texture: "normal".to_string(),
        slot: TextureSlot::Normal.register(),
        stage: ShaderType::Pixel,
    }));
    assert!(commands.contains(&Command::UnbindTexture {
        texture: "normal".to_string(),
        slot: 5,
        stage: ShaderType::Pixel,
    }));
}
