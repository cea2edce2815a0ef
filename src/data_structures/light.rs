//! Light values and their GPU layout.

use std::{cell::RefCell, rc::Rc};

use cgmath::{InnerSpace, Matrix4, Quaternion, Rad, SquareMatrix, Vector3, Vector4, Zero};

/// A light list shared between the passes that read it and the tooling that edits it.
pub type SharedLights = Rc<RefCell<Vec<Light>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightType {
    Point = 0,
    Spot = 1,
    Directional = 2,
}

/**
 * A single light.
 *
 * World-space fields are authored; view-space fields are derived once per
 * frame with [`Light::update_view_space`]. Lights are plain values: passes
 * copy the light they are working on instead of holding on to the list.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position_ws: Vector4<f32>,
    pub direction_ws: Vector4<f32>,
    pub position_vs: Vector4<f32>,
    pub direction_vs: Vector4<f32>,
    pub color: Vector4<f32>,
    /// Half angle of the spotlight cone in degrees.
    pub spotlight_angle: f32,
    pub range: f32,
    pub intensity: f32,
    pub enabled: bool,
    pub selected: bool,
    pub light_type: LightType,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position_ws: Vector4::new(0.0, 0.0, 0.0, 1.0),
            direction_ws: Vector4::new(0.0, 0.0, -1.0, 0.0),
            position_vs: Vector4::new(0.0, 0.0, 0.0, 1.0),
            direction_vs: Vector4::new(0.0, 0.0, -1.0, 0.0),
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            spotlight_angle: 45.0,
            range: 100.0,
            intensity: 1.0,
            enabled: true,
            selected: false,
            light_type: LightType::Point,
        }
    }
}

impl Light {
    pub fn point(position: Vector3<f32>, range: f32) -> Self {
        Self {
            position_ws: position.extend(1.0),
            range,
            light_type: LightType::Point,
            ..Default::default()
        }
    }

    pub fn spot(position: Vector3<f32>, direction: Vector3<f32>, angle: f32, range: f32) -> Self {
        Self {
            position_ws: position.extend(1.0),
            direction_ws: direction.extend(0.0),
            spotlight_angle: angle,
            range,
            light_type: LightType::Spot,
            ..Default::default()
        }
    }

    pub fn directional(direction: Vector3<f32>) -> Self {
        Self {
            direction_ws: direction.extend(0.0),
            light_type: LightType::Directional,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Vector4<f32>) -> Self {
        self.color = color;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Recompute the view-space position and direction from the world-space ones.
    pub fn update_view_space(&mut self, view: &Matrix4<f32>) {
        self.position_vs = view * self.position_ws;
        let direction = view * self.direction_ws;
        self.direction_vs = if direction.is_zero() {
            direction
        } else {
            direction.normalize()
        };
    }

    /**
     * Model matrix of the light volume proxy.
     *
     * The canonical proxy points along +Z and has unit size: it is scaled by
     * the range (spot lights scale the cone base by `tan(angle) * range`),
     * rotated onto the light direction and moved to the light position.
     */
    pub fn volume_transform(&self) -> Matrix4<f32> {
        let translation = Matrix4::from_translation(self.position_ws.truncate());
        let direction = self.direction_ws.truncate();
        let rotation = if direction.is_zero() {
            Matrix4::identity()
        } else {
            Matrix4::from(Quaternion::from_arc(
                Vector3::unit_z(),
                direction.normalize(),
                None,
            ))
        };
        let (scale_xy, scale_z) = match self.light_type {
            LightType::Spot => {
                let angle: Rad<f32> = cgmath::Deg(self.spotlight_angle).into();
                (angle.0.tan() * self.range, self.range)
            }
            LightType::Point | LightType::Directional => (self.range, self.range),
        };
        translation * rotation * Matrix4::from_nonuniform_scale(scale_xy, scale_xy, scale_z)
    }

    pub fn to_raw(&self) -> LightRaw {
        LightRaw {
            position_ws: self.position_ws.into(),
            direction_ws: self.direction_ws.into(),
            position_vs: self.position_vs.into(),
            direction_vs: self.direction_vs.into(),
            color: self.color.into(),
            spotlight_angle: self.spotlight_angle,
            range: self.range,
            intensity: self.intensity,
            enabled: self.enabled as u32,
            selected: self.selected as u32,
            light_type: self.light_type as u32,
            _padding: [0; 2],
        }
    }
}

/// Update the view-space fields of every light in the list.
pub fn update_view_space(lights: &SharedLights, view: &Matrix4<f32>) {
    lights
        .borrow_mut()
        .iter_mut()
        .for_each(|light| light.update_view_space(view));
}

/**
 * The raw light is the element layout of the lights structured buffer.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightRaw {
    pub position_ws: [f32; 4],
    pub direction_ws: [f32; 4],
    pub position_vs: [f32; 4],
    pub direction_vs: [f32; 4],
    pub color: [f32; 4],
    pub spotlight_angle: f32,
    pub range: f32,
    pub intensity: f32,
    pub enabled: u32,
    pub selected: u32,
    pub light_type: u32,
    // Keeps the element size a multiple of 16 bytes
    _padding: [u32; 2],
}
