use crate::camera::Camera;
use glam::Vec3;
use umbra_common::LightConfig;

/// Closed-form orbit of the shadow-casting light.
///
/// With `s = elapsed * speed` the position is
/// `(cos s · sin s · P.x, cos s · P.y, sin² s · P.z) + O`
/// where `P` is the protrusion and `O` the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightOrbit {
    pub origin: Vec3,
    pub protrusion: Vec3,
    pub speed: f32,
}

impl Default for LightOrbit {
    fn default() -> Self {
        Self::from(&LightConfig::default())
    }
}

impl From<&LightConfig> for LightOrbit {
    fn from(config: &LightConfig) -> Self {
        Self {
            origin: config.origin,
            protrusion: config.protrusion,
            speed: config.speed,
        }
    }
}

impl LightOrbit {
    pub fn position_at(&self, elapsed: f64) -> Vec3 {
        // keep the phase in f64 so long sessions do not lose precision
        let s = elapsed * f64::from(self.speed);
        let (sin, cos) = s.sin_cos();
        let p = self.protrusion;
        Vec3::new(
            (cos * sin) as f32 * p.x,
            cos as f32 * p.y,
            (sin * sin) as f32 * p.z,
        ) + self.origin
    }

    /// Move `light` to its orbit position and aim it back toward the world
    /// origin. Returns the new position.
    pub fn aim(&self, light: &mut Camera, elapsed: f64) -> Vec3 {
        let position = self.position_at(elapsed);
        light.set_position(position);
        light.set_target((-position).normalize_or_zero());
        position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f32 = 1e-4;

    #[test]
    fn starts_above_origin() {
        let orbit = LightOrbit::default();
        let p = orbit.position_at(0.0);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 80.0, -10.0), EPS));
    }

    #[test]
    fn quarter_phase_swings_to_full_z() {
        let orbit = LightOrbit::default();
        let elapsed = FRAC_PI_2 / f64::from(orbit.speed);
        let p = orbit.position_at(elapsed);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 50.0, -40.0), EPS));
    }

    #[test]
    fn eighth_phase_matches_formula() {
        let orbit = LightOrbit {
            origin: Vec3::new(1.0, 2.0, 3.0),
            protrusion: Vec3::new(10.0, 20.0, 30.0),
            speed: 1.0,
        };
        let p = orbit.position_at(std::f64::consts::FRAC_PI_4);
        // cos = sin = sqrt(0.5)
        let expected = Vec3::new(0.5 * 10.0 + 1.0, 0.5f32.sqrt() * 20.0 + 2.0, 0.5 * 30.0 + 3.0);
        assert!(p.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn aim_points_light_at_origin() {
        let orbit = LightOrbit::default();
        let mut light = Camera::new();
        let position = orbit.aim(&mut light, 1.3);
        assert_eq!(light.position(), position);
        assert!((light.target().length() - 1.0).abs() < EPS);
        assert!(light.target().abs_diff_eq(-position.normalize(), EPS));
    }

    #[test]
    fn default_orbit_stays_above_ground() {
        let orbit = LightOrbit::default();
        for step in 0..200 {
            let p = orbit.position_at(f64::from(step) * 0.1);
            assert!(p.y >= 20.0 - EPS);
        }
    }
}
