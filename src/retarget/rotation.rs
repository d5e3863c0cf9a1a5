//! Quaternion to Euler conversion.
//!
//! The host rig takes local rotations as Euler angles in degrees. Inputs are
//! assumed to be unit quaternions and are not renormalized; a non-unit
//! quaternion yields a deterministic (if meaningless) result rather than a
//! panic. When the middle angle's sine reaches ±1 the configuration is in
//! gimbal lock and `asin` would be outside its domain for slightly-off inputs,
//! so the middle angle saturates to ±90°.

use crate::types::{EulerAngles, Quaternion};
use serde::{Deserialize, Serialize};

/// Euler decomposition order used for the host rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationOrder {
    /// X applied first, then Y, then Z (`R = Rz * Ry * Rx`)
    #[default]
    Xyz,
    /// Z applied first, then Y, then X (`R = Rx * Ry * Rz`)
    Zyx,
}

/// Convert a quaternion to XYZ Euler angles in degrees.
pub fn to_euler(qx: f64, qy: f64, qz: f64, qw: f64) -> EulerAngles {
    to_euler_ordered([qx, qy, qz, qw], RotationOrder::Xyz)
}

/// Convert a `[x, y, z, w]` quaternion using the given order.
pub fn to_euler_ordered(q: Quaternion, order: RotationOrder) -> EulerAngles {
    let [x, y, z, w] = q;
    match order {
        RotationOrder::Xyz => {
            let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
            let pitch = saturating_asin(2.0 * (w * y - z * x));
            let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));
            EulerAngles::new(roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees())
        }
        RotationOrder::Zyx => {
            let roll = (2.0 * (w * x - y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
            let pitch = saturating_asin(2.0 * (w * y + z * x));
            let yaw = (2.0 * (w * z - x * y)).atan2(1.0 - 2.0 * (y * y + z * z));
            EulerAngles::new(roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees())
        }
    }
}

/// `asin` that returns ±π/2 once `|s| >= 1`.
fn saturating_asin(s: f64) -> f64 {
    if s.abs() >= 1.0 {
        std::f64::consts::FRAC_PI_2.copysign(s)
    } else {
        s.asin()
    }
}
