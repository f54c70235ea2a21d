// Maya transform model
//
// Holds the decomposed transform carried by `matrix "xform"` attribute values
// and composes it into a single DMat4 using Maya's pivot/shear conventions.
// Note: glam matrices transform column vectors, so the Maya (row vector)
// product order is reversed here.

use glam::{DMat3, DMat4, DQuat, DVec3};
use serde::Serialize;

/// A principal rotation axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Euler rotation order, indexed the way Maya stores `rotateOrder`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum RotateOrder {
    #[default]
    Xyz,
    Yzx,
    Zxy,
    Xzy,
    Yxz,
    Zyx,
}

impl RotateOrder {
    /// Map a stored index (0-5) to a rotate order.
    ///
    /// Returns `None` for anything outside the valid range; callers decide
    /// whether to fall back to [`RotateOrder::Xyz`].
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(RotateOrder::Xyz),
            1 => Some(RotateOrder::Yzx),
            2 => Some(RotateOrder::Zxy),
            3 => Some(RotateOrder::Xzy),
            4 => Some(RotateOrder::Yxz),
            5 => Some(RotateOrder::Zyx),
            _ => None,
        }
    }

    /// The index Maya writes for this order.
    pub fn index(self) -> i64 {
        match self {
            RotateOrder::Xyz => 0,
            RotateOrder::Yzx => 1,
            RotateOrder::Zxy => 2,
            RotateOrder::Xzy => 3,
            RotateOrder::Yxz => 4,
            RotateOrder::Zyx => 5,
        }
    }

    /// Axes in application order (first axis is applied first).
    pub fn axes(self) -> [Axis; 3] {
        match self {
            RotateOrder::Xyz => [Axis::X, Axis::Y, Axis::Z],
            RotateOrder::Yzx => [Axis::Y, Axis::Z, Axis::X],
            RotateOrder::Zxy => [Axis::Z, Axis::X, Axis::Y],
            RotateOrder::Xzy => [Axis::X, Axis::Z, Axis::Y],
            RotateOrder::Yxz => [Axis::Y, Axis::X, Axis::Z],
            RotateOrder::Zyx => [Axis::Z, Axis::Y, Axis::X],
        }
    }

    /// Build the rotation matrix for euler angles (radians) in this order.
    pub fn rotation_matrix(self, angles: DVec3) -> DMat4 {
        let mut m = DMat4::IDENTITY;
        for axis in self.axes() {
            let r = match axis {
                Axis::X => DMat4::from_rotation_x(angles.x),
                Axis::Y => DMat4::from_rotation_y(angles.y),
                Axis::Z => DMat4::from_rotation_z(angles.z),
            };
            m = r * m;
        }
        m
    }
}

/// Decomposed transform as stored in a `matrix "xform"` value.
///
/// Rotations are in radians, orientations are quaternions stored as
/// `x y z w`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TransformComponents {
    pub scale: DVec3,
    pub rotate: DVec3,
    pub rotate_order: RotateOrder,
    pub translate: DVec3,
    /// Shear factors (xy, xz, yz)
    pub shear: DVec3,
    pub scale_pivot: DVec3,
    pub scale_pivot_translate: DVec3,
    pub rotate_pivot: DVec3,
    pub rotate_pivot_translate: DVec3,
    pub rotate_orient: DQuat,
    pub joint_orient: DQuat,
    pub inverse_parent_scale: DVec3,
    pub compensate_parent_scale: bool,
}

impl Default for TransformComponents {
    fn default() -> Self {
        Self {
            scale: DVec3::ONE,
            rotate: DVec3::ZERO,
            rotate_order: RotateOrder::Xyz,
            translate: DVec3::ZERO,
            shear: DVec3::ZERO,
            scale_pivot: DVec3::ZERO,
            scale_pivot_translate: DVec3::ZERO,
            rotate_pivot: DVec3::ZERO,
            rotate_pivot_translate: DVec3::ZERO,
            rotate_orient: DQuat::IDENTITY,
            joint_orient: DQuat::IDENTITY,
            inverse_parent_scale: DVec3::ONE,
            compensate_parent_scale: false,
        }
    }
}

impl TransformComponents {
    /// Shear as a matrix (x' = x + xy*y + xz*z, y' = y + yz*z).
    pub fn shear_matrix(&self) -> DMat4 {
        let s = self.shear;
        DMat4::from_mat3(DMat3::from_cols(
            DVec3::X,
            DVec3::new(s.x, 1.0, 0.0),
            DVec3::new(s.y, s.z, 1.0),
        ))
    }

    /// Compose the local matrix.
    ///
    /// Maya order (row vectors):
    /// `-Sp * S * Sh * Sp * St * -Rp * Ra * R * Jo * Rp * Rt * T`
    pub fn matrix(&self) -> DMat4 {
        let scale_side = DMat4::from_translation(self.scale_pivot_translate)
            * DMat4::from_translation(self.scale_pivot)
            * self.shear_matrix()
            * DMat4::from_scale(self.scale)
            * DMat4::from_translation(-self.scale_pivot);

        let rotate_side = DMat4::from_translation(self.rotate_pivot_translate)
            * DMat4::from_translation(self.rotate_pivot)
            * DMat4::from_quat(self.joint_orient)
            * self.rotate_order.rotation_matrix(self.rotate)
            * DMat4::from_quat(self.rotate_orient)
            * DMat4::from_translation(-self.rotate_pivot);

        DMat4::from_translation(self.translate) * rotate_side * scale_side
    }
}
