use cgmath::{Deg, Matrix4, Point3, Vector3};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Fixed-position camera looking at the origin.
#[derive(Debug, Clone)]
pub struct Camera {
    eye: Point3<f32>,
    center: Point3<f32>,
    up: Vector3<f32>,
    fov_y: f32,
    near: f32,
    far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            eye: Point3::new(0.0, 0.0, 4.0),
            center: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::unit_y(),
            fov_y: 30.0,
            near: 2.0,
            far: 5.0,
        }
    }
}

impl Camera {
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.center, self.up)
    }

    /// Perspective projection in OpenGL clip conventions.
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Matrix4<f32> {
        cgmath::perspective(Deg(self.fov_y), aspect_ratio, self.near, self.far)
    }

    pub fn fov_y(&self) -> Deg<f32> {
        Deg(self.fov_y)
    }

    pub fn clip_range(&self) -> (f32, f32) {
        (self.near, self.far)
    }
}
