//! Page bone chain.
//!
//! Bones live in an arena ordered parent-first: bone `i` is the only child of
//! bone `i - 1`, so world transforms resolve in a single forward pass.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::MAX_SEGMENTS;
use crate::error::{FolioError, FolioResult};
use crate::transform::{RotationState, Transform};

/// One joint of the chain, in its parent's frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub parent: Option<usize>,
    pub position: Vector3<f32>,
    pub rotation: RotationState,
}

impl Bone {
    pub fn local_matrix(&self) -> Matrix4<f32> {
        Transform::local_matrix(&self.position, &self.rotation)
    }
}

/// Bone arena plus the inverse bind matrices captured at rest pose.
#[derive(Debug, Clone)]
pub struct Skeleton {
    bones: Vec<Bone>,
    bone_inverses: Vec<Matrix4<f32>>,
    world: Vec<Matrix4<f32>>,
}

/// Build `segments + 1` bones, each one segment further along x than its
/// parent.
pub fn build_bone_chain(segments: u32, segment_width: f32) -> FolioResult<Skeleton> {
    if segments == 0 || segments > MAX_SEGMENTS {
        return Err(FolioError::InvalidDimension {
            name: "segments",
            value: segments as f32,
        });
    }
    if !segment_width.is_finite() || segment_width <= 0.0 {
        return Err(FolioError::InvalidDimension {
            name: "segment_width",
            value: segment_width,
        });
    }

    let bones = (0..=segments as usize)
        .map(|i| Bone {
            parent: i.checked_sub(1),
            position: if i == 0 {
                Vector3::zeros()
            } else {
                Vector3::new(segment_width, 0.0, 0.0)
            },
            rotation: RotationState::zero(),
        })
        .collect();

    Skeleton::new(bones)
}

impl Skeleton {
    /// Build a skeleton and capture its rest pose. Every parent must precede
    /// its children in `bones`.
    pub fn new(bones: Vec<Bone>) -> FolioResult<Self> {
        for (i, bone) in bones.iter().enumerate() {
            if let Some(parent) = bone.parent {
                if parent >= i {
                    return Err(FolioError::BoneOutOfRange {
                        bone: parent,
                        count: i,
                    });
                }
            }
        }

        let mut skeleton = Self {
            world: vec![Matrix4::identity(); bones.len()],
            bone_inverses: Vec::new(),
            bones,
        };
        skeleton.update_world();
        skeleton.bone_inverses = skeleton
            .world
            .iter()
            .map(|m| m.try_inverse().unwrap_or_else(Matrix4::identity))
            .collect();
        Ok(skeleton)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, index: usize) -> FolioResult<&Bone> {
        self.bones.get(index).ok_or(FolioError::BoneOutOfRange {
            bone: index,
            count: self.bones.len(),
        })
    }

    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(move |(_, bone)| bone.parent == Some(index))
            .map(|(i, _)| i)
    }

    /// Set one bone's local y rotation and refresh world transforms.
    pub fn set_rotation_y(&mut self, index: usize, angle: f32) -> FolioResult<()> {
        let count = self.bones.len();
        let bone = self
            .bones
            .get_mut(index)
            .ok_or(FolioError::BoneOutOfRange { bone: index, count })?;
        bone.rotation.y = angle;
        self.update_world();
        Ok(())
    }

    /// Restore every bone to its bind rotation.
    pub fn reset_pose(&mut self) {
        for bone in &mut self.bones {
            bone.rotation = RotationState::zero();
        }
        self.update_world();
    }

    fn update_world(&mut self) {
        for i in 0..self.bones.len() {
            let local = self.bones[i].local_matrix();
            self.world[i] = match self.bones[i].parent {
                Some(parent) => self.world[parent] * local,
                None => local,
            };
        }
    }

    pub fn world_matrix(&self, index: usize) -> Option<&Matrix4<f32>> {
        self.world.get(index)
    }

    /// World-space origin of every bone, for drawing the chain.
    pub fn joint_positions_into(&self, out: &mut Vec<Point3<f32>>) {
        out.clear();
        out.extend(self.world.iter().map(|m| m.transform_point(&Point3::origin())));
    }

    pub fn bone_inverses(&self) -> &[Matrix4<f32>] {
        &self.bone_inverses
    }

    /// Skinning matrix of one bone: current world transform times the
    /// inverse of its rest transform.
    pub fn skinning_matrix(&self, index: usize) -> Matrix4<f32> {
        match (self.world.get(index), self.bone_inverses.get(index)) {
            (Some(world), Some(inverse)) => world * inverse,
            _ => Matrix4::identity(),
        }
    }
}
