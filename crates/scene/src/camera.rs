use glam::{Mat3, Mat4, Vec3};
use umbra_common::CameraConfig;

/// Vertical field of view used by every perspective projection.
pub const FIELD_OF_VIEW: f32 = std::f32::consts::FRAC_PI_4;

/// Free-look camera described by a position, a look direction and an up vector.
///
/// `target` is a direction, not a point. Nothing keeps it unit length or
/// orthogonal to `up`: the setters overwrite blindly and [`Camera::rotate`]
/// accumulates floating-point drift over time. All matrices are left-handed
/// with a [0, 1] depth range and are returned in glam's column-major layout,
/// ready for upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    projection: Mat4,
    orthographic: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -1.0),
            target: Vec3::Z,
            up: Vec3::Y,
            projection: Mat4::IDENTITY,
            orthographic: Mat4::IDENTITY,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user camera as configured, with projections for a `width` x
    /// `height` target. The configured look direction is normalized so a
    /// move covers exactly its `speed`.
    pub fn from_config(config: &CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self::new();
        camera.set_position(config.position);
        camera.set_target(config.target.normalize_or_zero());
        camera.set_up(config.up);
        camera.set_properties(width as f32, height.max(1) as f32, config.near, config.far);
        camera
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn set_up(&mut self, up: Vec3) {
        self.up = up;
    }

    /// Rebuild both projections: a 45° perspective with aspect `width / height`
    /// and an orthographic box `width` x `height` wide.
    pub fn set_properties(&mut self, width: f32, height: f32, near: f32, far: f32) {
        self.projection = Mat4::perspective_lh(FIELD_OF_VIEW, width / height, near, far);
        self.orthographic = Mat4::orthographic_lh(
            -width * 0.5,
            width * 0.5,
            -height * 0.5,
            height * 0.5,
            near,
            far,
        );
    }

    pub fn move_forward(&mut self, speed: f32) {
        self.position += self.target * speed;
    }

    pub fn move_backward(&mut self, speed: f32) {
        self.position -= self.target * speed;
    }

    pub fn move_left(&mut self, speed: f32) {
        self.position += self.target.cross(self.up).normalize_or_zero() * speed;
    }

    pub fn move_right(&mut self, speed: f32) {
        self.position += self.up.cross(self.target).normalize_or_zero() * speed;
    }

    /// First-person look: pitch about the current [`Camera::right`] axis, then
    /// yaw about world +Y using the already pitched vectors.
    ///
    /// The pitch step is skipped when `target` and `up` are parallel, since
    /// there is no axis to pitch around.
    pub fn rotate(&mut self, pitch: f32, yaw: f32) {
        let right = self.right();
        if right == Vec3::ZERO {
            tracing::trace!("camera target is parallel to up, skipping pitch");
        } else {
            let pitch_rotation = Mat3::from_axis_angle(right, -pitch);
            self.up = pitch_rotation * self.up;
            self.target = pitch_rotation * self.target;
        }

        let yaw_rotation = Mat3::from_rotation_y(yaw);
        self.up = yaw_rotation * self.up;
        self.target = yaw_rotation * self.target;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// `normalize(target × up)`, or zero when the two are parallel.
    pub fn right(&self) -> Vec3 {
        self.target.cross(self.up).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_lh(self.position, self.position + self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn orthographic_matrix(&self) -> Mat4 {
        self.orthographic
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    const EPS: f32 = 1e-5;

    fn origin_camera() -> Camera {
        let mut cam = Camera::new();
        cam.set_position(Vec3::ZERO);
        cam.set_target(Vec3::Z);
        cam.set_up(Vec3::Y);
        cam
    }

    #[test]
    fn default_orientation() {
        let cam = Camera::default();
        assert_eq!(cam.position(), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(cam.target(), Vec3::Z);
        assert_eq!(cam.up(), Vec3::Y);
        assert_eq!(cam.projection_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn move_forward_follows_target() {
        let mut cam = origin_camera();
        cam.move_forward(2.0);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), EPS));
        cam.move_backward(0.5);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, 1.5), EPS));
    }

    #[test]
    fn strafing_scales_speed_once() {
        let mut cam = origin_camera();
        cam.move_left(3.0);
        assert!((cam.position().length() - 3.0).abs() < EPS);
        cam.move_right(3.0);
        assert!(cam.position().abs_diff_eq(Vec3::ZERO, EPS));
    }

    #[test]
    fn left_and_right_are_opposite() {
        let mut left = origin_camera();
        let mut right = origin_camera();
        left.move_left(1.0);
        right.move_right(1.0);
        assert!((left.position() + right.position()).abs_diff_eq(Vec3::ZERO, EPS));
        // +X is to the right in a left-handed frame looking down +Z
        assert!(right.position().x > 0.0);
    }

    #[test]
    fn configured_camera_moves_exactly_move_speed() {
        let config = CameraConfig::default();
        assert!((config.target.length() - 1.0).abs() > 1e-3);
        let mut cam = Camera::from_config(&config, 800, 600);
        assert!((cam.target().length() - 1.0).abs() < EPS);

        cam.move_forward(config.move_speed);
        let moved = cam.position().distance(config.position);
        assert!((moved - config.move_speed).abs() < 1e-4, "moved {moved}");

        cam.move_backward(config.move_speed);
        assert!(cam.position().abs_diff_eq(config.position, 1e-4));
    }

    #[test]
    fn configured_camera_uses_window_aspect() {
        let cam = Camera::from_config(&CameraConfig::default(), 800, 600);
        let p = cam.projection_matrix();
        assert!((p.y_axis.y / p.x_axis.x - 800.0 / 600.0).abs() < 1e-4);
        // a zero height is clamped rather than producing NaNs
        let flat = Camera::from_config(&CameraConfig::default(), 800, 0);
        assert!(flat.projection_matrix().is_finite());
    }

    #[test]
    fn right_is_unit_and_perpendicular() {
        let mut cam = origin_camera();
        for (target, up) in [
            (Vec3::Z, Vec3::Y),
            (Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 1.0, 0.5)),
            (Vec3::new(-0.3, -0.9, 0.2), Vec3::new(0.1, 0.2, 1.0)),
        ] {
            cam.set_target(target);
            cam.set_up(up);
            let right = cam.right();
            assert!((right.length() - 1.0).abs() < EPS);
            assert!(right.dot(target).abs() < 1e-4);
            assert!(right.dot(up).abs() < 1e-4);
        }
    }

    #[test]
    fn right_degenerates_to_zero_when_parallel() {
        let mut cam = origin_camera();
        cam.set_target(Vec3::Y);
        assert_eq!(cam.right(), Vec3::ZERO);
        // pitch is skipped, yaw still applies
        cam.rotate(0.5, 0.0);
        assert_eq!(cam.target(), Vec3::Y);
    }

    #[test]
    fn pitch_preserves_lengths() {
        let mut cam = origin_camera();
        cam.set_target(Vec3::new(0.0, 0.0, 2.0));
        for _ in 0..50 {
            cam.rotate(0.07, 0.0);
        }
        assert!((cam.target().length() - 2.0).abs() < 1e-4);
        assert!((cam.up().length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn pitch_down_then_yaw_right() {
        let mut cam = origin_camera();
        cam.rotate(0.3, 0.0);
        assert!(cam.target().y < 0.0, "positive pitch looks down");
        let mut cam = origin_camera();
        cam.rotate(0.0, 0.3);
        assert!(cam.target().x > 0.0, "positive yaw turns right");
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn projection_aspect_round_trip() {
        let mut cam = Camera::new();
        for (w, h) in [(800.0, 600.0), (1920.0, 1080.0), (300.0, 900.0)] {
            cam.set_properties(w, h, 0.1, 1000.0);
            let p = cam.projection_matrix();
            let aspect = p.y_axis.y / p.x_axis.x;
            assert!((aspect - w / h).abs() < 1e-4);
            // cot(fov / 2) for a 45° field of view
            assert!((p.y_axis.y - 1.0 / (FIELD_OF_VIEW * 0.5).tan()).abs() < 1e-4);
        }
    }

    #[test]
    fn projection_maps_near_and_far_to_unit_depth() {
        let mut cam = Camera::new();
        cam.set_properties(800.0, 600.0, 1.0, 100.0);
        let near = cam.projection_matrix() * Vec4::new(0.0, 0.0, 1.0, 1.0);
        let far = cam.projection_matrix() * Vec4::new(0.0, 0.0, 100.0, 1.0);
        assert!((near.z / near.w).abs() < EPS);
        assert!((far.z / far.w - 1.0).abs() < EPS);
    }

    #[test]
    fn orthographic_spans_width_and_height() {
        let mut cam = Camera::new();
        cam.set_properties(40.0, 20.0, 1.0, 11.0);
        let corner = cam.orthographic_matrix() * Vec4::new(20.0, 10.0, 11.0, 1.0);
        assert!(corner.truncate().abs_diff_eq(Vec3::new(1.0, 1.0, 1.0), EPS));
    }

    #[test]
    fn view_matrix_moves_eye_to_origin() {
        let mut cam = origin_camera();
        cam.set_position(Vec3::new(3.0, 4.0, 5.0));
        let eye = cam.view_matrix().transform_point3(cam.position());
        assert!(eye.abs_diff_eq(Vec3::ZERO, EPS));
        let ahead = cam
            .view_matrix()
            .transform_point3(cam.position() + cam.target() * 7.0);
        assert!(ahead.abs_diff_eq(Vec3::new(0.0, 0.0, 7.0), EPS));
    }
}
