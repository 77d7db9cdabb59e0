//! Linear blend skinning of a page against its own skeleton.

use nalgebra::{Matrix4, Point3, Vector3};
use std::rc::Rc;

use crate::error::{FolioError, FolioResult};
use crate::page::PageGeometry;
use crate::skeleton::Skeleton;

/// Shared page geometry bound to a skeleton owned by this mesh.
#[derive(Debug, Clone)]
pub struct SkinnedMesh {
    geometry: Rc<PageGeometry>,
    skeleton: Skeleton,
}

/// Bind `geometry` to `skeleton`, rejecting geometry that references bones
/// the skeleton does not have.
pub fn bind_skin(geometry: Rc<PageGeometry>, skeleton: Skeleton) -> FolioResult<SkinnedMesh> {
    let count = skeleton.len();
    let needed = geometry.max_bone_index();
    if needed >= count {
        return Err(FolioError::BoneOutOfRange {
            bone: needed,
            count,
        });
    }
    Ok(SkinnedMesh { geometry, skeleton })
}

impl SkinnedMesh {
    pub fn geometry(&self) -> &Rc<PageGeometry> {
        &self.geometry
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        &mut self.skeleton
    }

    /// Skinned position of one vertex in page-local space.
    pub fn deform_vertex(&self, index: usize) -> Point3<f32> {
        let rest = self.geometry.mesh.positions[index];
        let bones = self.geometry.skin_indices[index];
        let weights = self.geometry.skin_weights[index];

        let mut blended = Vector3::zeros();
        for lane in 0..2 {
            if weights[lane] == 0.0 {
                continue;
            }
            let m = self.skeleton.skinning_matrix(bones[lane] as usize);
            blended += m.transform_point(&rest).coords * weights[lane];
        }
        Point3::from(blended)
    }

    /// Write every skinned vertex position into `out`, reusing its storage.
    pub fn deformed_positions_into(&self, out: &mut Vec<Point3<f32>>) {
        out.clear();
        out.extend((0..self.geometry.vertex_count()).map(|i| self.deform_vertex(i)));
    }

    pub fn deformed_positions(&self) -> Vec<Point3<f32>> {
        let mut out = Vec::with_capacity(self.geometry.vertex_count());
        self.deformed_positions_into(&mut out);
        out
    }

    /// Skinning matrices for GPU skinning, 16 column-major floats per bone.
    pub fn bone_matrices_into(&self, out: &mut Vec<f32>) {
        out.clear();
        for i in 0..self.skeleton.len() {
            let m: Matrix4<f32> = self.skeleton.skinning_matrix(i);
            out.extend_from_slice(m.as_slice());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageDimensions;
    use crate::page::build_page_geometry;
    use crate::skeleton::build_bone_chain;
    use crate::transform::{RotationState, Transform};

    fn reference_mesh() -> SkinnedMesh {
        let dims = PageDimensions::default();
        let geometry = Rc::new(build_page_geometry(dims).unwrap());
        let skeleton = build_bone_chain(dims.segments, dims.segment_width()).unwrap();
        bind_skin(geometry, skeleton).unwrap()
    }

    #[test]
    fn test_rest_pose_is_unchanged() {
        let mesh = reference_mesh();
        let deformed = mesh.deformed_positions();
        for (rest, moved) in mesh.geometry().mesh.positions.iter().zip(&deformed) {
            assert!((rest - moved).norm() < 1e-5);
        }
    }

    #[test]
    fn test_bend_leaves_spine_side_alone() {
        let mut mesh = reference_mesh();
        mesh.skeleton_mut()
            .set_rotation_y(2, 20.0_f32.to_radians())
            .unwrap();
        let segment = mesh.geometry().dimensions.segment_width();
        let deformed = mesh.deformed_positions();

        for (i, rest) in mesh.geometry().mesh.positions.iter().enumerate() {
            let weights = mesh.geometry().skin_weights[i];
            let bones = mesh.geometry().skin_indices[i];
            let touches_bent = (0..2).any(|lane| bones[lane] >= 2 && weights[lane] > 0.0);
            if !touches_bent {
                assert!((rest - deformed[i]).norm() < 1e-5);
            }
            if rest.x < segment - 1e-4 {
                assert!(!touches_bent);
            }
        }
    }

    #[test]
    fn test_bend_rotates_far_side_rigidly() {
        let mut mesh = reference_mesh();
        let angle = 20.0_f32.to_radians();
        mesh.skeleton_mut().set_rotation_y(2, angle).unwrap();

        let pivot = Vector3::new(2.0 * mesh.geometry().dimensions.segment_width(), 0.0, 0.0);
        let rigid = Transform::translation_matrix(&pivot)
            * Transform::rotation_matrix(&RotationState::new(0.0, angle, 0.0))
            * Transform::translation_matrix(&-pivot);

        let deformed = mesh.deformed_positions();
        let mut checked = 0;
        for (i, rest) in mesh.geometry().mesh.positions.iter().enumerate() {
            if rest.x >= pivot.x - 1e-5 {
                checked += 1;
                assert!((rigid.transform_point(rest) - deformed[i]).norm() < 1e-5);
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn test_bone_matrix_buffer() {
        let mesh = reference_mesh();
        let mut buffer = Vec::new();
        mesh.bone_matrices_into(&mut buffer);
        assert_eq!(buffer.len(), 6 * 16);
        // rest pose: identity per bone
        for bone in buffer.chunks_exact(16) {
            let m = Matrix4::from_column_slice(bone);
            assert!((m - Matrix4::identity()).norm() < 1e-5);
        }
    }

    #[test]
    fn test_rejects_short_skeleton() {
        let dims = PageDimensions::default();
        let geometry = Rc::new(build_page_geometry(dims).unwrap());
        let skeleton = build_bone_chain(3, dims.segment_width()).unwrap();
        assert!(matches!(
            bind_skin(geometry, skeleton),
            Err(FolioError::BoneOutOfRange { bone: 5, count: 4 })
        ));
    }
}
