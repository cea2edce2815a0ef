//! Surface shading description mirrored into a GPU constant buffer.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use cgmath::Vector4;

use crate::{
    data_structures::object::ObjectId,
    device::{ConstantBuffer, Shader, ShaderParameterType, Texture},
};

pub type SharedMaterial = Rc<RefCell<Material>>;

/// Texture slots of a material. The discriminant is the pixel shader texture register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureSlot {
    Ambient = 0,
    Emissive = 1,
    Diffuse = 2,
    Specular = 3,
    SpecularPower = 4,
    Normal = 5,
    Bump = 6,
    Opacity = 7,
}

impl TextureSlot {
    pub fn register(self) -> u32 {
        self as u32
    }
}

/**
 * The raw material block as the shaders see it.
 *
 * Every row is 16 bytes wide; booleans are stored as `u32` and the tail is
 * padded so the struct size stays a multiple of 16.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialProperties {
    pub global_ambient: [f32; 4],
    pub ambient_color: [f32; 4],
    pub emissive_color: [f32; 4],
    pub diffuse_color: [f32; 4],
    pub specular_color: [f32; 4],
    pub reflectance: [f32; 4],
    pub opacity: f32,
    pub specular_power: f32,
    pub index_of_refraction: f32,
    pub has_ambient_texture: u32,
    pub has_emissive_texture: u32,
    pub has_diffuse_texture: u32,
    pub has_specular_texture: u32,
    pub has_specular_power_texture: u32,
    pub has_normal_texture: u32,
    pub has_bump_texture: u32,
    pub has_opacity_texture: u32,
    pub bump_intensity: f32,
    pub specular_scale: f32,
    pub alpha_threshold: f32,
    _padding: [f32; 2],
}

impl Default for MaterialProperties {
    fn default() -> Self {
        Self {
            global_ambient: [0.1, 0.1, 0.15, 1.0],
            ambient_color: [0.0, 0.0, 0.0, 1.0],
            emissive_color: [0.0, 0.0, 0.0, 1.0],
            diffuse_color: [1.0, 1.0, 1.0, 1.0],
            specular_color: [0.0, 0.0, 0.0, 1.0],
            reflectance: [0.0, 0.0, 0.0, 0.0],
            opacity: 1.0,
            specular_power: -1.0,
            index_of_refraction: -1.0,
            has_ambient_texture: 0,
            has_emissive_texture: 0,
            has_diffuse_texture: 0,
            has_specular_texture: 0,
            has_specular_power_texture: 0,
            has_normal_texture: 0,
            has_bump_texture: 0,
            has_opacity_texture: 0,
            bump_intensity: 5.0,
            specular_scale: 128.0,
            alpha_threshold: 0.1,
            _padding: [0.0; 2],
        }
    }
}

/// Material properties, textures and the constant buffer they are uploaded to.
///
/// Every setter marks the material dirty; the constant buffer is rewritten
/// once, on the next [`Material::bind`].
pub struct Material {
    id: ObjectId,
    properties: MaterialProperties,
    textures: BTreeMap<TextureSlot, Rc<dyn Texture>>,
    constant_buffer: Option<Rc<dyn ConstantBuffer>>,
    dirty: bool,
}

impl Material {
    /// A material without GPU backing, see [`crate::device::RenderDevice::create_material`].
    pub fn new() -> Self {
        Self {
            id: ObjectId::new(),
            properties: MaterialProperties::default(),
            textures: BTreeMap::new(),
            constant_buffer: None,
            dirty: true,
        }
    }

    pub fn with_constant_buffer(constant_buffer: Rc<dyn ConstantBuffer>) -> Self {
        Self {
            constant_buffer: Some(constant_buffer),
            ..Self::new()
        }
    }

    pub fn shared(self) -> SharedMaterial {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn properties(&self) -> &MaterialProperties {
        &self.properties
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn global_ambient(&self) -> Vector4<f32> {
        self.properties.global_ambient.into()
    }

    pub fn set_global_ambient(&mut self, color: Vector4<f32>) {
        self.properties.global_ambient = color.into();
        self.dirty = true;
    }

    pub fn ambient_color(&self) -> Vector4<f32> {
        self.properties.ambient_color.into()
    }

    pub fn set_ambient_color(&mut self, color: Vector4<f32>) {
        self.properties.ambient_color = color.into();
        self.dirty = true;
    }

    pub fn emissive_color(&self) -> Vector4<f32> {
        self.properties.emissive_color.into()
    }

    pub fn set_emissive_color(&mut self, color: Vector4<f32>) {
        self.properties.emissive_color = color.into();
        self.dirty = true;
    }

    pub fn diffuse_color(&self) -> Vector4<f32> {
        self.properties.diffuse_color.into()
    }

    pub fn set_diffuse_color(&mut self, color: Vector4<f32>) {
        self.properties.diffuse_color = color.into();
        self.dirty = true;
    }

    pub fn specular_color(&self) -> Vector4<f32> {
        self.properties.specular_color.into()
    }

    pub fn set_specular_color(&mut self, color: Vector4<f32>) {
        self.properties.specular_color = color.into();
        self.dirty = true;
    }

    pub fn reflectance(&self) -> Vector4<f32> {
        self.properties.reflectance.into()
    }

    pub fn set_reflectance(&mut self, reflectance: Vector4<f32>) {
        self.properties.reflectance = reflectance.into();
        self.dirty = true;
    }

    pub fn opacity(&self) -> f32 {
        self.properties.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.properties.opacity = opacity;
        self.dirty = true;
    }

    pub fn specular_power(&self) -> f32 {
        self.properties.specular_power
    }

    pub fn set_specular_power(&mut self, power: f32) {
        self.properties.specular_power = power;
        self.dirty = true;
    }

    pub fn specular_scale(&self) -> f32 {
        self.properties.specular_scale
    }

    pub fn set_specular_scale(&mut self, scale: f32) {
        self.properties.specular_scale = scale;
        self.dirty = true;
    }

    pub fn index_of_refraction(&self) -> f32 {
        self.properties.index_of_refraction
    }

    pub fn set_index_of_refraction(&mut self, index_of_refraction: f32) {
        self.properties.index_of_refraction = index_of_refraction;
        self.dirty = true;
    }

    pub fn bump_intensity(&self) -> f32 {
        self.properties.bump_intensity
    }

    pub fn set_bump_intensity(&mut self, intensity: f32) {
        self.properties.bump_intensity = intensity;
        self.dirty = true;
    }

    pub fn alpha_threshold(&self) -> f32 {
        self.properties.alpha_threshold
    }

    pub fn set_alpha_threshold(&mut self, threshold: f32) {
        self.properties.alpha_threshold = threshold;
        self.dirty = true;
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<&Rc<dyn Texture>> {
        self.textures.get(&slot)
    }

    /// Assign or clear the texture of `slot` and update the matching presence flag.
    pub fn set_texture(&mut self, slot: TextureSlot, texture: Option<Rc<dyn Texture>>) {
        let present = texture.is_some() as u32;
        match texture {
            Some(texture) => self.textures.insert(slot, texture),
            None => self.textures.remove(&slot),
        };
        let flag = match slot {
            TextureSlot::Ambient => &mut self.properties.has_ambient_texture,
            TextureSlot::Emissive => &mut self.properties.has_emissive_texture,
            TextureSlot::Diffuse => &mut self.properties.has_diffuse_texture,
            TextureSlot::Specular => &mut self.properties.has_specular_texture,
            TextureSlot::SpecularPower => &mut self.properties.has_specular_power_texture,
            TextureSlot::Normal => &mut self.properties.has_normal_texture,
            TextureSlot::Bump => &mut self.properties.has_bump_texture,
            TextureSlot::Opacity => &mut self.properties.has_opacity_texture,
        };
        *flag = present;
        self.dirty = true;
    }

    /// Whether the material has to be drawn with blending.
    ///
    /// A non-positive alpha threshold disables alpha testing, which leaves
    /// blending as the only way to honour the alpha channel.
    pub fn is_transparent(&self) -> bool {
        let diffuse_is_transparent = self.properties.has_diffuse_texture != 0
            && self
                .texture(TextureSlot::Diffuse)
                .is_some_and(|texture| texture.is_transparent());

        self.properties.opacity < 1.0
            || self.properties.has_opacity_texture != 0
            || diffuse_is_transparent
            || self.properties.alpha_threshold <= 0.0
    }

    /// Upload pending property changes and bind textures and constants to `shader`.
    pub fn bind(&mut self, shader: Option<&dyn Shader>) {
        if let Some(buffer) = &self.constant_buffer {
            if self.dirty {
                buffer.set_data(&self.properties);
                self.dirty = false;
            }
        }

        let Some(shader) = shader else {
            return;
        };
        let stage = shader.shader_type();
        for (slot, texture) in &self.textures {
            texture.bind(slot.register(), stage, ShaderParameterType::Texture);
        }
        if let Some(buffer) = &self.constant_buffer {
            shader.set_constant_buffer("Material", buffer);
        }
    }

    pub fn unbind(&self, shader: Option<&dyn Shader>) {
        let Some(shader) = shader else {
            return;
        };
        let stage = shader.shader_type();
        for (slot, texture) in &self.textures {
            texture.unbind(slot.register(), stage, ShaderParameterType::Texture);
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}
