//! Camera state consumed by the passes: view, projection and viewport.

use cgmath::{Deg, EuclideanSpace, Matrix4, Point3, SquareMatrix, Vector3};

/// Screen region rendered into, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    viewport: Viewport,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
}

impl Camera {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn set_view_matrix(&mut self, view: Matrix4<f32>) {
        self.view = view;
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn set_projection_matrix(&mut self, projection: Matrix4<f32>) {
        self.projection = projection;
    }

    pub fn look_at(&mut self, eye: Point3<f32>, target: Point3<f32>, up: Vector3<f32>) {
        self.view = Matrix4::look_at_rh(eye, target, up);
    }

    /// Perspective projection using the aspect ratio of the current viewport.
    pub fn set_perspective(&mut self, fovy: Deg<f32>, znear: f32, zfar: f32) {
        self.projection = cgmath::perspective(fovy, self.viewport.aspect_ratio(), znear, zfar);
    }

    pub fn set_orthographic(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        znear: f32,
        zfar: f32,
    ) {
        self.projection = cgmath::ortho(left, right, bottom, top, znear, zfar);
    }

    /// World-space position, taken from the inverse view matrix.
    pub fn position(&self) -> Point3<f32> {
        match self.view.invert() {
            Some(camera_world) => Point3::from_vec(camera_world.w.truncate()),
            None => Point3::origin(),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}
