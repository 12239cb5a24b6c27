mod camera;
mod trackball;

pub use camera::{Camera, OPENGL_TO_WGPU_MATRIX};
pub use trackball::Trackball;

use cgmath::{Deg, Matrix4, SquareMatrix, Vector3};

/// Number of frames for one full auto-rotation turn.
pub const ROTATION_PERIOD: u32 = 200;

/// Pixel area the tetrahedron is drawn into, anchored at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Host-side state of the widget: camera, interactive rotation and the
/// auto-rotation animation.
#[derive(Debug, Clone)]
pub struct Scene {
    camera: Camera,
    trackball: Trackball,
    projection: Matrix4<f32>,
    viewport: Viewport,
    frame: u32,
    rotating: bool,
}

impl Scene {
    pub fn new(rotating: bool) -> Self {
        let camera = Camera::default();
        let projection = camera.projection_matrix(1.0);
        Scene {
            camera,
            trackball: Trackball::default(),
            projection,
            viewport: Viewport {
                width: 1,
                height: 1,
            },
            frame: 0,
            rotating,
        }
    }

    /// Recomputes viewport and projection for a new logical surface size.
    ///
    /// Sizes below one pixel are clamped to one so the aspect ratio stays finite.
    pub fn resize(&mut self, width: f64, height: f64, scale_factor: f64) -> Viewport {
        let width = width.max(1.0);
        let height = height.max(1.0);
        self.viewport = Viewport {
            width: (width * scale_factor).round().max(1.0) as u32,
            height: (height * scale_factor).round().max(1.0) as u32,
        };
        let aspect_ratio = (width / height) as f32;
        self.projection = self.camera.projection_matrix(aspect_ratio);
        self.trackball.set_window_size(width as f32, height as f32);
        self.viewport
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.camera.view_matrix() * self.trackball.rotation()
    }

    pub fn rotation_angle(&self) -> Deg<f32> {
        if self.rotating {
            Deg(360.0 * self.frame as f32 / ROTATION_PERIOD as f32)
        } else {
            Deg(0.0)
        }
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        let model = Matrix4::identity();
        if self.rotating {
            model * Matrix4::from_axis_angle(Vector3::unit_z(), self.rotation_angle())
        } else {
            model
        }
    }

    /// Projection x view x model for the current frame.
    pub fn pvm(&self) -> Matrix4<f32> {
        self.projection * self.view_matrix() * self.model_matrix()
    }

    pub fn advance_frame(&mut self) {
        self.frame = (self.frame + 1) % ROTATION_PERIOD;
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    /// Returns whether the flag changed.
    pub fn set_rotating(&mut self, rotating: bool) -> bool {
        let changed = self.rotating != rotating;
        self.rotating = rotating;
        changed
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn trackball(&self) -> &Trackball {
        &self.trackball
    }

    pub fn trackball_mut(&mut self) -> &mut Trackball {
        &mut self.trackball
    }
}
