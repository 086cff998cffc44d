//! GPU uniform block layouts.
//!
//! Matrices are stored column-major exactly as glam keeps them, so WGSL reads
//! them as `mat4x4<f32>` and multiplies `M * v`.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Per-draw block of the shadow pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShadowUniforms {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
}

impl Default for ShadowUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

impl ShadowUniforms {
    pub fn new(world: Mat4, view: Mat4, proj: Mat4) -> Self {
        Self {
            world: world.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
        }
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.world)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.proj)
    }
}

/// Values uploaded once per frame for the main pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// Light projection × light view.
    pub light_space: [[f32; 4]; 4],
    /// Negated camera target, w = 0.
    pub camera_dir: [f32; 4],
    /// World-space light position, w = 1.
    pub light_pos: [f32; 4],
    /// Light near, light far, 1.0 if orthographic, depth compare bias.
    pub light_params: [f32; 4],
    /// Shading mode, debug view mode, unused, unused.
    pub mode: [u32; 4],
}

impl FrameUniforms {
    pub fn light_space_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.light_space)
    }

    pub fn light_position(&self) -> Vec3 {
        Vec3::new(self.light_pos[0], self.light_pos[1], self.light_pos[2])
    }
}

/// Per-draw block of the main pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub world: [[f32; 4]; 4],
    /// Inverse transpose of `world`, for transforming normals and tangents.
    pub normal: [[f32; 4]; 4],
}

impl DrawUniforms {
    pub fn new(world: Mat4) -> Self {
        let normal = if world.determinant().abs() > f32::EPSILON {
            world.inverse().transpose()
        } else {
            world
        };
        Self {
            world: world.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
        }
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_sizes_match_shader_layouts() {
        assert_eq!(std::mem::size_of::<ShadowUniforms>(), 192);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 256);
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 128);
    }

    #[test]
    fn matrices_keep_column_major_layout() {
        let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let block = ShadowUniforms::new(world, Mat4::IDENTITY, Mat4::IDENTITY);
        // translation lives in the fourth column
        assert_eq!(block.world[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(block.world_matrix(), world);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let world = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let block = DrawUniforms::new(world);
        let normal = Mat4::from_cols_array_2d(&block.normal);
        assert!(
            normal
                .transform_vector3(Vec3::X)
                .abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6)
        );
    }

    #[test]
    fn singular_world_falls_back_to_itself() {
        let world = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        let block = DrawUniforms::new(world);
        assert_eq!(block.normal, block.world);
    }
}
