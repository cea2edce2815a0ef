//! Per-frame context handed to every pass, and the renderer configuration.

use cgmath::Vector4;

use crate::{camera::Camera, device::RenderDevice};

/**
 * Everything a pass may read while a frame is rendered.
 *
 * The arguments are immutable for the duration of the frame. State that
 * changes between passes (most importantly the active pipeline) is passed
 * explicitly instead of being written back into the arguments.
 */
#[derive(Clone, Copy)]
pub struct RenderEventArgs<'a> {
    /// Seconds since the previous frame.
    pub elapsed_time: f32,
    /// Seconds since the first frame.
    pub total_time: f32,
    pub frame_counter: u64,
    pub camera: Option<&'a Camera>,
    pub device: &'a dyn RenderDevice,
}

impl<'a> RenderEventArgs<'a> {
    pub fn new(device: &'a dyn RenderDevice, camera: Option<&'a Camera>) -> Self {
        Self {
            elapsed_time: 0.0,
            total_time: 0.0,
            frame_counter: 0,
            camera,
            device,
        }
    }

    pub fn with_timing(mut self, elapsed_time: f32, total_time: f32, frame_counter: u64) -> Self {
        self.elapsed_time = elapsed_time;
        self.total_time = total_time;
        self.frame_counter = frame_counter;
        self
    }
}

/// Opacity of the light marker material depending on the light state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerOpacity {
    /// Used for selected lights, whether enabled or not.
    pub selected: f32,
    pub enabled: f32,
    pub disabled: f32,
}

impl Default for MarkerOpacity {
    fn default() -> Self {
        Self {
            selected: 0.9,
            enabled: 0.5,
            disabled: 0.1,
        }
    }
}

/// Tunables shared by the passes of a renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    pub clear_colour: Vector4<f32>,
    pub clear_depth: f32,
    pub clear_stencil: u8,
    /// Stencil value written by the light volume mask sub-pass.
    pub light_stencil_reference: u8,
    pub marker_opacity: MarkerOpacity,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_colour: Vector4::new(0.39, 0.58, 0.93, 1.0),
            clear_depth: 1.0,
            clear_stencil: 0,
            light_stencil_reference: 1,
            marker_opacity: MarkerOpacity::default(),
        }
    }
}
