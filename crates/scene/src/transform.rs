use glam::{Mat4, Vec3};
use umbra_common::TransformOp;

/// World matrix built up from translate/rotate/scale calls.
///
/// Every call right-multiplies the current matrix, so for column vectors the
/// most recent call is the first one applied to a local-space point:
/// `reset(); translate(t); scale(s)` yields `T * S`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    world: Mat4,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            world: Mat4::IDENTITY,
        }
    }
}

impl ModelTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.world = Mat4::IDENTITY;
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.world *= Mat4::from_translation(offset);
    }

    /// Rotate about `axis` by `degrees`. A zero-length axis leaves the matrix unchanged.
    pub fn rotate(&mut self, axis: Vec3, degrees: f32) {
        let Some(axis) = axis.try_normalize() else {
            tracing::warn!("ignoring rotation about a zero-length axis");
            return;
        };
        self.world *= Mat4::from_axis_angle(axis, degrees.to_radians());
    }

    pub fn scale(&mut self, factors: Vec3) {
        self.world *= Mat4::from_scale(factors);
    }

    pub fn apply(&mut self, op: &TransformOp) {
        match *op {
            TransformOp::Translate { by } => self.translate(by),
            TransformOp::Rotate { axis, degrees } => self.rotate(axis, degrees),
            TransformOp::Scale { by } => self.scale(by),
        }
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn starts_at_identity() {
        assert_eq!(ModelTransform::new().world_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut t = ModelTransform::new();
        t.translate(Vec3::new(1.0, 2.0, 3.0));
        t.reset();
        let once = t.world_matrix();
        t.reset();
        assert_eq!(once, Mat4::IDENTITY);
        assert_eq!(t.world_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn composition_matches_product_in_call_order() {
        let a = Vec3::new(1.0, -2.0, 0.5);
        let b = Vec3::new(2.0, 3.0, 4.0);
        let c = Vec3::new(0.0, 7.0, -1.0);

        let mut t = ModelTransform::new();
        t.translate(a);
        t.scale(b);
        t.translate(c);

        let expected =
            Mat4::from_translation(a) * Mat4::from_scale(b) * Mat4::from_translation(c);
        assert!(t.world_matrix().abs_diff_eq(expected, EPS));
    }

    #[test]
    fn translate_then_scale_differs_from_scale_then_translate() {
        let mut ts = ModelTransform::new();
        ts.translate(Vec3::new(0.0, 5.0, 0.0));
        ts.scale(Vec3::splat(2.0));

        let mut st = ModelTransform::new();
        st.scale(Vec3::splat(2.0));
        st.translate(Vec3::new(0.0, 5.0, 0.0));

        assert!(!ts.world_matrix().abs_diff_eq(st.world_matrix(), EPS));
    }

    #[test]
    fn scale_acts_in_local_space_before_translation() {
        let mut t = ModelTransform::new();
        t.reset();
        t.translate(Vec3::new(0.0, 5.0, 0.0));
        t.scale(Vec3::new(2.0, 2.0, 2.0));
        let p = t.world_matrix().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(2.0, 5.0, 0.0), EPS));
    }

    #[test]
    fn rotate_takes_degrees() {
        let mut t = ModelTransform::new();
        t.rotate(Vec3::Y, 90.0);
        let p = t.world_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), EPS));
    }

    #[test]
    fn rotate_composes_like_translate_and_scale() {
        let mut t = ModelTransform::new();
        t.translate(Vec3::new(10.0, 0.0, 0.0));
        t.rotate(Vec3::new(0.0, 3.0, 0.0), 180.0);
        let p = t.world_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(9.0, 0.0, 0.0), 1e-4));
    }

    #[test]
    fn zero_axis_rotation_is_ignored() {
        let mut t = ModelTransform::new();
        t.translate(Vec3::ONE);
        let before = t.world_matrix();
        t.rotate(Vec3::ZERO, 45.0);
        assert_eq!(t.world_matrix(), before);
    }

    #[test]
    fn apply_dispatches_ops() {
        let mut by_ops = ModelTransform::new();
        for op in [
            TransformOp::translate(1.0, 0.0, 0.0),
            TransformOp::rotate(Vec3::Z, 30.0),
            TransformOp::scale(2.0, 1.0, 1.0),
        ] {
            by_ops.apply(&op);
        }

        let mut by_calls = ModelTransform::new();
        by_calls.translate(Vec3::X);
        by_calls.rotate(Vec3::Z, 30.0);
        by_calls.scale(Vec3::new(2.0, 1.0, 1.0));

        assert_eq!(by_ops, by_calls);
    }
}
