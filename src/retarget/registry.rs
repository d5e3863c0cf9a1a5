//! Skeleton registry.
//!
//! Owns the rig nodes created for the session, keyed by source bone name.
//! Nodes are created lazily the first time a bone is seen and are never
//! removed. Parent links are applied by [`SkeletonRegistry::link_all`]
//! according to the configured [`LinkPolicy`].

use crate::error::Result;
use crate::host::{NodeHandle, SceneHost};
use crate::retarget::mapping::BoneMap;
use crate::types::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Default source-to-host unit factor (meters to centimeters)
pub const DEFAULT_UNIT_SCALE: f64 = 100.0;

/// When parent links are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPolicy {
    /// A single link pass for the whole session. Bones first seen after
    /// that pass stay unparented.
    #[default]
    OneShot,
    /// Every pass links any created bone whose parent now exists.
    Incremental,
}

/// A node created on the host for one source bone
#[derive(Debug, Clone, PartialEq)]
pub struct RigNode {
    /// Target rig name the node was created with
    pub name: String,
    pub handle: NodeHandle,
    /// Parent node once linked; a handle, not ownership
    pub parent: Option<NodeHandle>,
    pub visible: bool,
}

/// Outcome of one link pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Parent links applied in this pass
    pub linked: usize,
    /// `set_parent` calls the host rejected
    pub failed: usize,
    /// Pass skipped because the one-shot latch was already closed
    pub skipped: bool,
}

pub struct SkeletonRegistry {
    map: Arc<BoneMap>,
    nodes: HashMap<String, RigNode>,
    unit_scale: f64,
    policy: LinkPolicy,
    linked: bool,
}

impl SkeletonRegistry {
    pub fn new(map: Arc<BoneMap>) -> Self {
        Self {
            map,
            nodes: HashMap::new(),
            unit_scale: DEFAULT_UNIT_SCALE,
            policy: LinkPolicy::default(),
            linked: false,
        }
    }

    pub fn with_unit_scale(mut self, unit_scale: f64) -> Self {
        self.unit_scale = unit_scale;
        self
    }

    pub fn with_link_policy(mut self, policy: LinkPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Return the node for `source`, creating it on the host if needed.
    ///
    /// An existing node is returned untouched. A new node gets the mapped
    /// target name, is made visible and, if `initial_position` is given,
    /// seeded with that position scaled to host units.
    ///
    /// If `create_node` fails nothing is registered and the next call tries
    /// again. Once the host has created the node it is registered even if
    /// showing or seeding it fails, so a retry never creates a duplicate.
    pub fn get_or_create<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        source: &str,
        initial_position: Option<Position>,
    ) -> Result<NodeHandle> {
        if let Some(node) = self.nodes.get(source) {
            return Ok(node.handle);
        }

        let target = self.map.resolve_target_name(source).to_string();
        let handle = host.create_node(&target)?;

        let visible = match host.set_visible(handle, true) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to show {}: {}", target, e);
                false
            }
        };
        if let Some(pos) = initial_position {
            let [x, y, z] = scale_position(pos, self.unit_scale);
            if let Err(e) = host.set_translation(handle, x, y, z) {
                tracing::warn!("Failed to seed translation of {}: {}", target, e);
            }
        }

        tracing::debug!("Created node {} -> {} ({})", source, target, handle);
        self.nodes.insert(
            source.to_string(),
            RigNode {
                name: target,
                handle,
                parent: None,
                visible,
            },
        );
        Ok(handle)
    }

    /// Apply parent links for created bones whose parent bone was also
    /// created.
    ///
    /// Under [`LinkPolicy::OneShot`] only the first call does anything.
    /// Under [`LinkPolicy::Incremental`] each call links whatever became
    /// linkable since the previous one. Existing links are never changed.
    pub fn link_all<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> LinkReport {
        if self.policy == LinkPolicy::OneShot && self.linked {
            return LinkReport {
                skipped: true,
                ..LinkReport::default()
            };
        }

        let mut report = LinkReport::default();
        for bone in self.map.entries() {
            let Some(parent_source) = bone.parent.as_deref() else {
                continue;
            };
            let Some(parent_handle) = self.nodes.get(parent_source).map(|n| n.handle) else {
                continue;
            };
            let Some(child) = self.nodes.get_mut(&bone.source) else {
                continue;
            };
            if child.parent.is_some() {
                continue;
            }

            match host.set_parent(child.handle, parent_handle) {
                Ok(()) => {
                    child.parent = Some(parent_handle);
                    report.linked += 1;
                    tracing::debug!("Linked {} -> {}", bone.source, parent_source);
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("Failed to link {} -> {}: {}", bone.source, parent_source, e);
                }
            }
        }

        self.linked = true;
        report
    }

    pub fn get(&self, source: &str) -> Option<&RigNode> {
        self.nodes.get(source)
    }

    /// Source name and node for every created bone, in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &RigNode)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a link pass has run
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn unit_scale(&self) -> f64 {
        self.unit_scale
    }

    pub fn link_policy(&self) -> LinkPolicy {
        self.policy
    }

    pub fn bone_map(&self) -> &BoneMap {
        &self.map
    }
}

/// Scale a source-unit position into host units
#[inline]
pub fn scale_position(pos: Position, unit_scale: f64) -> [f64; 3] {
    [pos[0] * unit_scale, pos[1] * unit_scale, pos[2] * unit_scale]
}
