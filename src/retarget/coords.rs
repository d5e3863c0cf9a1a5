//! Source-to-host coordinate conventions.

use crate::types::{Position, Quaternion};
use serde::{Deserialize, Serialize};

/// How source axes map onto host axes before scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisConvention {
    /// Axes used as received
    #[default]
    AsIs,
    /// Source Y and Z exchanged (Y-up source onto a Z-up host or back)
    SwapYz,
    /// Y and Z of the position exchanged, rotation passed through untouched.
    ///
    /// For hosts that already read rotations in source axes, as a hips-only
    /// rig driven by translation usually does.
    SwapYzTranslation,
}

impl AxisConvention {
    /// Convert a position and rotation from source to host axes.
    ///
    /// Exchanging two axes is a reflection, so besides permuting the vector
    /// part the rotation sense flips: `(x, y, z, w)` becomes
    /// `(-x, -z, -y, w)`.
    pub fn apply(self, position: Position, rotation: Quaternion) -> (Position, Quaternion) {
        match self {
            AxisConvention::AsIs => (position, rotation),
            AxisConvention::SwapYz => {
                let [px, py, pz] = position;
                let [x, y, z, w] = rotation;
                ([px, pz, py], [-x, -z, -y, w])
            }
            AxisConvention::SwapYzTranslation => {
                let [px, py, pz] = position;
                ([px, pz, py], rotation)
            }
        }
    }
}
