//! Host scene-graph capability interface
//!
//! The retargeting core never talks to a concrete animation application.
//! Everything it needs from the host (creating a named rigid node, toggling
//! its visibility, parenting it, writing its local transform) goes through
//! the [`SceneHost`] trait. A binding for a real application
//! implements the trait; [`InMemoryScene`] is the in-process implementation
//! used by the viewer and the tests.
//!
//! All calls happen on the per-frame thread, so implementations need not be
//! `Send` or `Sync`.

pub mod id;
pub mod scene;

pub use id::NodeHandle;
pub use scene::{InMemoryScene, SceneNode};

use crate::error::Result;

/// Operations the core requires from the host scene graph
///
/// Translations passed to [`SceneHost::set_translation`] are already in host
/// units; rotations are Euler angles in degrees in the configured order.
#[cfg_attr(test, mockall::automock)]
pub trait SceneHost {
    /// Create a named node and return its handle
    fn create_node(&mut self, name: &str) -> Result<NodeHandle>;

    /// Show or hide a node
    fn set_visible(&mut self, node: NodeHandle, visible: bool) -> Result<()>;

    /// Make `parent` the parent of `child`
    fn set_parent(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<()>;

    /// Set the local translation of a node
    fn set_translation(&mut self, node: NodeHandle, x: f64, y: f64, z: f64) -> Result<()>;

    /// Set the local rotation of a node
    fn set_rotation_euler(&mut self, node: NodeHandle, roll: f64, pitch: f64, yaw: f64)
        -> Result<()>;
}
