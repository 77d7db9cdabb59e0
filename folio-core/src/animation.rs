//! Per-frame page bending.
//!
//! The host calls [`BendAnimator::apply`] once per rendered frame. It writes a
//! single bone's y rotation and touches nothing else.

use crate::error::FolioResult;
use crate::skeleton::Skeleton;

/// Bend angle (radians) as a function of time (seconds).
pub trait BendCurve {
    fn angle(&self, t: f32) -> f32;
}

/// Holds the bend at a fixed angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantBend {
    pub angle: f32,
}

impl ConstantBend {
    pub fn degrees(degrees: f32) -> Self {
        Self {
            angle: degrees.to_radians(),
        }
    }
}

impl BendCurve for ConstantBend {
    fn angle(&self, _t: f32) -> f32 {
        self.angle
    }
}

impl<F> BendCurve for F
where
    F: Fn(f32) -> f32,
{
    fn angle(&self, t: f32) -> f32 {
        self(t)
    }
}

/// Drives one bone of a page skeleton from a curve.
pub struct BendAnimator {
    bone: usize,
    curve: Box<dyn BendCurve>,
}

impl BendAnimator {
    pub fn new(bone: usize, curve: impl BendCurve + 'static) -> Self {
        Self {
            bone,
            curve: Box::new(curve),
        }
    }

    pub fn bone(&self) -> usize {
        self.bone
    }

    pub fn set_curve(&mut self, curve: impl BendCurve + 'static) {
        self.curve = Box::new(curve);
    }

    pub fn angle_at(&self, t: f32) -> f32 {
        self.curve.angle(t)
    }

    pub fn apply(&self, skeleton: &mut Skeleton, t: f32) -> FolioResult<()> {
        skeleton.set_rotation_y(self.bone, self.curve.angle(t))
    }
}

impl std::fmt::Debug for BendAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BendAnimator")
            .field("bone", &self.bone)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::build_bone_chain;
    use crate::transform::RotationState;

    #[test]
    fn test_constant_bend_sets_only_target_bone() {
        let mut skeleton = build_bone_chain(5, 0.256).unwrap();
        let animator = BendAnimator::new(2, ConstantBend::degrees(20.0));

        for frame in 0..3 {
            animator.apply(&mut skeleton, frame as f32 / 60.0).unwrap();
        }

        for (i, bone) in skeleton.bones().iter().enumerate() {
            if i == 2 {
                assert!((bone.rotation.y - 20.0_f32.to_radians()).abs() < 1e-6);
                assert_eq!(bone.rotation.x, 0.0);
                assert_eq!(bone.rotation.z, 0.0);
            } else {
                assert_eq!(bone.rotation, RotationState::zero());
            }
        }
    }

    #[test]
    fn test_closure_curve() {
        let mut skeleton = build_bone_chain(3, 1.0).unwrap();
        let animator = BendAnimator::new(1, |t: f32| t * 0.5);
        animator.apply(&mut skeleton, 2.0).unwrap();
        assert!((skeleton.bones()[1].rotation.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_bone() {
        let mut skeleton = build_bone_chain(1, 1.0).unwrap();
        let animator = BendAnimator::new(4, ConstantBend { angle: 0.1 });
        assert!(animator.apply(&mut skeleton, 0.0).is_err());
    }
}
