//! Retargeting core
//!
//! - [`rotation`] - Quaternion to Euler conversion
//! - [`mapping`] - Source bone names to target names and parents
//! - [`coords`] - Source to host axis conventions
//! - [`registry`] - Lazily created rig nodes and parent linking
//! - [`driver`] - The per-frame update tying the above together

pub mod coords;
pub mod driver;
pub mod mapping;
pub mod registry;
pub mod rotation;

pub use coords::AxisConvention;
pub use driver::{DriverStats, TickReport, UpdateDriver};
pub use mapping::{BoneIdentity, BoneMap, BoneTable, MappingPreset};
pub use registry::{LinkPolicy, LinkReport, RigNode, SkeletonRegistry, DEFAULT_UNIT_SCALE};
pub use rotation::{to_euler, to_euler_ordered, RotationOrder};
