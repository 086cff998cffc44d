use crate::transform::ModelTransform;
use glam::{Mat4, Vec3};
use umbra_common::TransformOp;

/// Read-only view of an entity's geometry, implemented by the GPU backend and
/// by CPU-side mesh data.
pub trait Geometry {
    fn vertex_count(&self) -> u32;
    fn index_count(&self) -> u32;
    /// Bytes per vertex record.
    fn vertex_stride(&self) -> u32;
}

/// A renderable mesh instance: immutable geometry plus a mutable world transform.
///
/// The geometry is owned exclusively. `Entity` is deliberately not `Clone`:
/// moving it transfers the geometry, and dropping it releases the buffers.
#[derive(Debug)]
pub struct Entity<G> {
    geometry: G,
    transform: ModelTransform,
}

impl<G: Geometry> Entity<G> {
    pub fn new(geometry: G) -> Self {
        Self {
            geometry,
            transform: ModelTransform::new(),
        }
    }

    pub fn reset(&mut self) {
        self.transform.reset();
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.transform.translate(offset);
    }

    pub fn rotate(&mut self, axis: Vec3, degrees: f32) {
        self.transform.rotate(axis, degrees);
    }

    pub fn scale(&mut self, factors: Vec3) {
        self.transform.scale(factors);
    }

    /// Apply placement steps in order.
    pub fn apply(&mut self, ops: &[TransformOp]) {
        for op in ops {
            self.transform.apply(op);
        }
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.transform.world_matrix()
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    pub fn vertex_count(&self) -> u32 {
        self.geometry.vertex_count()
    }

    pub fn index_count(&self) -> u32 {
        self.geometry.index_count()
    }

    pub fn vertex_stride(&self) -> u32 {
        self.geometry.vertex_stride()
    }

    /// Give the geometry back, consuming the entity.
    pub fn into_geometry(self) -> G {
        self.geometry
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Counts-only geometry for tests.
    #[derive(Debug, PartialEq)]
    pub(crate) struct FakeGeometry {
        pub vertices: u32,
        pub indices: u32,
    }

    impl Geometry for FakeGeometry {
        fn vertex_count(&self) -> u32 {
            self.vertices
        }
        fn index_count(&self) -> u32 {
            self.indices
        }
        fn vertex_stride(&self) -> u32 {
            48
        }
    }

    #[test]
    fn accessors_pass_through() {
        let entity = Entity::new(FakeGeometry {
            vertices: 24,
            indices: 36,
        });
        assert_eq!(entity.vertex_count(), 24);
        assert_eq!(entity.index_count(), 36);
        assert_eq!(entity.vertex_stride(), 48);
        assert_eq!(entity.world_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn move_transfers_geometry() {
        let entity = Entity::new(FakeGeometry {
            vertices: 3,
            indices: 3,
        });
        let moved = entity;
        assert_eq!(
            moved.into_geometry(),
            FakeGeometry {
                vertices: 3,
                indices: 3
            }
        );
    }

    #[test]
    fn transform_mutators_rebuild_from_identity() {
        let mut entity = Entity::new(FakeGeometry {
            vertices: 3,
            indices: 3,
        });
        entity.translate(Vec3::new(0.0, 5.0, 0.0));
        entity.scale(Vec3::splat(2.0));
        let p = entity.world_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(2.0, 5.0, 0.0), 1e-5));

        entity.reset();
        entity.apply(&[TransformOp::translate(1.0, 1.0, 1.0)]);
        assert_eq!(
            entity.world_matrix(),
            Mat4::from_translation(Vec3::ONE)
        );
    }
}
