//! Core data types for vmc-retarget
//!
//! # Main Types
//!
//! - [`BoneSample`] - One decoded bone pose as it arrives from the network
//! - [`EulerAngles`] - Host-side rotation in degrees
//! - [`ReceiverStatus`] - Lifecycle state of the network receiver
//!
//! Positions are carried in source units (meters for VMC senders) until the
//! update driver scales them for the host. Quaternions are stored `x, y, z, w`
//! in the order they appear on the wire.

use serde::{Deserialize, Serialize};

/// Position in source units `[x, y, z]`
pub type Position = [f64; 3];

/// Rotation quaternion `[x, y, z, w]`
pub type Quaternion = [f64; 4];

/// Identity quaternion
pub const IDENTITY_QUAT: Quaternion = [0.0, 0.0, 0.0, 1.0];

/// A single bone pose received from the mocap source
#[derive(Debug, Clone, PartialEq)]
pub struct BoneSample {
    /// Canonical source bone name (e.g. `"Hips"`, `"LeftHand"`)
    pub bone_id: String,
    /// Local position in source units
    pub position: Position,
    /// Local rotation as a (nominally unit) quaternion
    pub rotation: Quaternion,
}

impl BoneSample {
    pub fn new(bone_id: impl Into<String>, position: Position, rotation: Quaternion) -> Self {
        Self {
            bone_id: bone_id.into(),
            position,
            rotation,
        }
    }

    /// Sample at the origin with no rotation
    pub fn identity(bone_id: impl Into<String>) -> Self {
        Self::new(bone_id, [0.0; 3], IDENTITY_QUAT)
    }
}

/// Euler rotation in degrees, as handed to the host
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerAngles {
    /// Rotation about X
    pub roll: f64,
    /// Rotation about Y
    pub pitch: f64,
    /// Rotation about Z
    pub yaw: f64,
}

impl EulerAngles {
    pub const ZERO: EulerAngles = EulerAngles {
        roll: 0.0,
        pitch: 0.0,
        yaw: 0.0,
    };

    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.roll, self.pitch, self.yaw]
    }
}

/// Lifecycle of the network receiver as seen by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiverStatus {
    /// Receiver thread not started yet
    #[default]
    Idle,
    /// Socket bound and waiting for packets
    Listening,
    /// Socket could not be bound or failed while receiving
    Error,
    /// Receiver thread has exited
    Stopped,
}

impl ReceiverStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReceiverStatus::Idle => "Idle",
            ReceiverStatus::Listening => "Listening",
            ReceiverStatus::Error => "Error",
            ReceiverStatus::Stopped => "Stopped",
        }
    }
}
