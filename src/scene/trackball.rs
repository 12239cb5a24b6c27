use cgmath::{InnerSpace, Matrix4, One, Quaternion, Vector2, Vector3};

/// Virtual-sphere rotation driven by pointer drags.
///
/// Pointer coordinates are in logical window pixels with the origin at the
/// top-left corner, as winit reports them.
#[derive(Debug, Clone)]
pub struct Trackball {
    width: f32,
    height: f32,
    rotation: Quaternion<f32>,
    last: Option<Vector3<f32>>,
    pointer: Option<(f32, f32)>,
}

impl Default for Trackball {
    fn default() -> Self {
        Trackball {
            width: 1.0,
            height: 1.0,
            rotation: Quaternion::one(),
            last: None,
            pointer: None,
        }
    }
}

impl Trackball {
    pub fn set_window_size(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    pub fn window_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn press(&mut self, x: f32, y: f32) {
        self.last = Some(self.project(x, y));
    }

    pub fn drag(&mut self, x: f32, y: f32) {
        let start = match self.last {
            Some(start) => start,
            None => return,
        };
        let end = self.project(x, y);
        if (end - start).magnitude2() <= f32::EPSILON {
            return;
        }
        let delta = Quaternion::from_arc(start, end, None);
        self.rotation = (delta * self.rotation).normalize();
        self.last = Some(end);
    }

    /// Records the pointer position and drags if a button is held.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = Some((x, y));
        if self.is_dragging() {
            self.drag(x, y);
        }
    }

    /// Starts a drag at the last known pointer position.
    ///
    /// Ignored until the pointer has been seen at least once.
    pub fn grab(&mut self) {
        if let Some((x, y)) = self.pointer {
            self.press(x, y);
        }
    }

    pub fn release(&mut self) {
        self.last = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    pub fn reset(&mut self) {
        self.rotation = Quaternion::one();
        self.last = None;
    }

    pub fn rotation(&self) -> Matrix4<f32> {
        Matrix4::from(self.rotation)
    }

    fn project(&self, x: f32, y: f32) -> Vector3<f32> {
        let p = Vector2::new(
            (2.0 * x - self.width) / self.width,
            (self.height - 2.0 * y) / self.height,
        );
        project_to_sphere(p).normalize()
    }
}

// Sphere of radius 1 blended into a hyperbolic sheet past r^2 = 1/2.
fn project_to_sphere(p: Vector2<f32>) -> Vector3<f32> {
    let d2 = p.magnitude2();
    let z = if d2 <= 0.5 {
        (1.0 - d2).sqrt()
    } else {
        0.5 / d2.sqrt()
    };
    Vector3::new(p.x, p.y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};

    const EPS: f32 = 1e-5;

    fn is_identity(m: Matrix4<f32>) -> bool {
        let identity = Matrix4::<f32>::identity();
        (0..4).all(|c| (0..4).all(|r| (m[c][r] - identity[c][r]).abs() < EPS))
    }

    #[test]
    fn starts_at_identity() {
        assert!(is_identity(Trackball::default().rotation()));
    }

    #[test]
    fn drag_without_press_is_ignored() {
        let mut ball = Trackball::default();
        ball.set_window_size(800.0, 600.0);
        ball.drag(700.0, 300.0);
        assert!(is_identity(ball.rotation()));
    }

    #[test]
    fn drag_right_turns_front_towards_positive_x() {
        let mut ball = Trackball::default();
        ball.set_window_size(800.0, 600.0);
        ball.press(400.0, 300.0);
        ball.drag(500.0, 300.0);
        ball.release();

        let front = ball.rotation() * Vector4::new(0.0, 0.0, 1.0, 0.0);
        assert!(front.x > 0.1);
        assert!(front.y.abs() < EPS);
        assert!(!ball.is_dragging());
    }

    #[test]
    fn drag_back_and_forth_cancels() {
        let mut ball = Trackball::default();
        ball.set_window_size(400.0, 400.0);
        ball.press(200.0, 200.0);
        ball.drag(200.0, 120.0);
        ball.drag(200.0, 200.0);
        assert!(is_identity(ball.rotation()));
    }

    #[test]
    fn rotation_stays_orthonormal_after_many_drags() {
        let mut ball = Trackball::default();
        ball.set_window_size(640.0, 480.0);
        ball.press(10.0, 10.0);
        for i in 0..500 {
            ball.drag(10.0 + (i % 97) as f32 * 6.0, 10.0 + (i % 41) as f32 * 11.0);
        }
        let m = ball.rotation();
        assert!((m.determinant() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn grab_before_any_pointer_motion_is_ignored() {
        let mut ball = Trackball::default();
        ball.set_window_size(800.0, 600.0);
        ball.grab();
        assert!(!ball.is_dragging());
        ball.pointer_moved(500.0, 300.0);
        assert!(is_identity(ball.rotation()));
    }

    #[test]
    fn grab_anchors_at_last_pointer_position() {
        let mut ball = Trackball::default();
        ball.set_window_size(800.0, 600.0);
        ball.pointer_moved(400.0, 300.0);
        ball.grab();
        assert!(ball.is_dragging());
        ball.pointer_moved(500.0, 300.0);
        ball.release();

        let mut reference = Trackball::default();
        reference.set_window_size(800.0, 600.0);
        reference.press(400.0, 300.0);
        reference.drag(500.0, 300.0);

        let (a, b) = (ball.rotation(), reference.rotation());
        assert!((0..4).all(|c| (0..4).all(|r| (a[c][r] - b[c][r]).abs() < EPS)));
        assert!(!is_identity(a));
    }

    #[test]
    fn reset_returns_to_identity() {
        let mut ball = Trackball::default();
        ball.set_window_size(100.0, 100.0);
        ball.press(50.0, 50.0);
        ball.drag(80.0, 20.0);
        ball.reset();
        assert!(is_identity(ball.rotation()));
        assert!(!ball.is_dragging());
    }

    #[test]
    fn zero_window_size_is_clamped() {
        let mut ball = Trackball::default();
        ball.set_window_size(0.0, 0.0);
        assert_eq!(ball.window_size(), (1.0, 1.0));
    }
}
