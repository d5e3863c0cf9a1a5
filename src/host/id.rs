//! Node handles handed out by a [`SceneHost`](super::SceneHost).
//!
//! A handle is a newtype over `u32`. For [`InMemoryScene`](super::InMemoryScene)
//! it is a direct index into the node vector; other hosts may use it as an
//! opaque key. Handles do not own the node, so holding one as a parent
//! reference never keeps a node alive.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeHandle(pub u32);

impl NodeHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
