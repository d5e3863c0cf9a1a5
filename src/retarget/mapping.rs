//! Bone identity tables.
//!
//! A [`BoneMap`] answers two questions for a source bone name: which node
//! name to create on the target rig, and which source bone is its parent.
//! The tables are plain data so that a different rig convention can be
//! swapped in from a JSON file without touching the retargeting code.
//!
//! Two built-in presets cover the humanoid bone set sent by VMC senders:
//!
//! - [`MappingPreset::Mirrored`] retargets onto the host's naming
//!   (`UpperChest` → `UpChest`, `LeftUpperArm` → `RightArm`, ...) and swaps
//!   left and right, mirroring the performer onto the rig.
//! - [`MappingPreset::Identity`] keeps every source name.
//!
//! Names absent from the table resolve to themselves with no parent.

use crate::error::{Result, RetargetError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// `(source, mirrored target, parent source)` for the VMC humanoid bone set.
const HUMANOID_TABLE: &[(&str, &str, Option<&str>)] = &[
    ("root", "root", None),
    ("Hips", "Hips", Some("root")),
    ("Spine", "Spine", Some("Hips")),
    ("Chest", "Chest", Some("Spine")),
    ("UpperChest", "UpChest", Some("Chest")),
    ("Neck", "Neck", Some("UpperChest")),
    ("Head", "Head", Some("Neck")),
    ("LeftShoulder", "RightShoulder", Some("UpperChest")),
    ("LeftUpperArm", "RightArm", Some("LeftShoulder")),
    ("LeftLowerArm", "RightForeArm", Some("LeftUpperArm")),
    ("LeftHand", "RightHand", Some("LeftLowerArm")),
    ("RightShoulder", "LeftShoulder", Some("UpperChest")),
    ("RightUpperArm", "LeftArm", Some("RightShoulder")),
    ("RightLowerArm", "LeftForeArm", Some("RightUpperArm")),
    ("RightHand", "LeftHand", Some("RightLowerArm")),
    ("LeftUpperLeg", "RightUpLeg", Some("Hips")),
    ("LeftLowerLeg", "RightLeg", Some("LeftUpperLeg")),
    ("LeftFoot", "RightFoot", Some("LeftLowerLeg")),
    ("RightUpperLeg", "LeftUpLeg", Some("Hips")),
    ("RightLowerLeg", "LeftLeg", Some("RightUpperLeg")),
    ("RightFoot", "LeftFoot", Some("RightLowerLeg")),
];

/// Built-in mapping table selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingPreset {
    /// Host naming with left/right swapped
    #[default]
    Mirrored,
    /// Source names kept as-is
    Identity,
}

/// One row of a mapping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoneIdentity {
    /// Canonical bone name used by the mocap source
    pub source: String,
    /// Node name created on the target rig
    pub target: String,
    /// Source name of the parent bone, `None` for a root
    #[serde(default)]
    pub parent: Option<String>,
}

impl BoneIdentity {
    pub fn new(source: &str, target: &str, parent: Option<&str>) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            parent: parent.map(str::to_string),
        }
    }
}

/// On-disk form of a mapping table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoneTable {
    pub bones: Vec<BoneIdentity>,
}

/// Validated, indexed mapping table
#[derive(Debug, Clone)]
pub struct BoneMap {
    bones: Vec<BoneIdentity>,
    index: HashMap<String, usize>,
}

impl BoneMap {
    /// Build a map from table rows, rejecting duplicates, dangling parents
    /// and parent cycles.
    pub fn from_table(bones: Vec<BoneIdentity>) -> Result<Self> {
        let mut index = HashMap::with_capacity(bones.len());
        for (i, bone) in bones.iter().enumerate() {
            if index.insert(bone.source.clone(), i).is_some() {
                return Err(RetargetError::Mapping(format!(
                    "duplicate source bone '{}'",
                    bone.source
                )));
            }
        }

        for bone in &bones {
            if let Some(parent) = &bone.parent {
                if !index.contains_key(parent) {
                    return Err(RetargetError::Mapping(format!(
                        "bone '{}' has unknown parent '{}'",
                        bone.source, parent
                    )));
                }
            }
        }

        let map = Self { bones, index };
        map.check_acyclic()?;
        Ok(map)
    }

    /// Table for a built-in preset
    pub fn from_preset(preset: MappingPreset) -> Self {
        let bones = HUMANOID_TABLE
            .iter()
            .map(|&(source, mirrored, parent)| match preset {
                MappingPreset::Mirrored => BoneIdentity::new(source, mirrored, parent),
                MappingPreset::Identity => BoneIdentity::new(source, source, parent),
            })
            .collect::<Vec<_>>();
        let index = bones
            .iter()
            .enumerate()
            .map(|(i, b)| (b.source.clone(), i))
            .collect();
        Self { bones, index }
    }

    pub fn mirrored() -> Self {
        Self::from_preset(MappingPreset::Mirrored)
    }

    pub fn identity() -> Self {
        Self::from_preset(MappingPreset::Identity)
    }

    /// Load a table from a JSON file of the form `{"bones": [...]}`
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RetargetError::Mapping(format!("Failed to read mapping table {:?}: {}", path, e))
        })?;
        let table: BoneTable = serde_json::from_str(&content).map_err(|e| {
            RetargetError::Mapping(format!("Failed to parse mapping table {:?}: {}", path, e))
        })?;
        Self::from_table(table.bones)
    }

    /// Export the table in its on-disk form
    pub fn to_table(&self) -> BoneTable {
        BoneTable {
            bones: self.bones.clone(),
        }
    }

    /// Target rig name for a source bone, the source name itself if unmapped
    pub fn resolve_target_name<'a>(&'a self, source: &'a str) -> &'a str {
        self.lookup(source).map_or(source, |b| b.target.as_str())
    }

    /// Parent source name, `None` for roots and unknown bones
    pub fn resolve_parent(&self, source: &str) -> Option<&str> {
        self.lookup(source).and_then(|b| b.parent.as_deref())
    }

    pub fn contains(&self, source: &str) -> bool {
        self.index.contains_key(source)
    }

    /// Rows in table order
    pub fn entries(&self) -> &[BoneIdentity] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    fn lookup(&self, source: &str) -> Option<&BoneIdentity> {
        self.index.get(source).map(|&i| &self.bones[i])
    }

    fn check_acyclic(&self) -> Result<()> {
        for bone in &self.bones {
            let mut steps = 0;
            let mut current = bone.parent.as_deref();
            while let Some(name) = current {
                steps += 1;
                if steps > self.bones.len() {
                    return Err(RetargetError::Mapping(format!(
                        "parent cycle through bone '{}'",
                        bone.source
                    )));
                }
                current = self.resolve_parent(name);
            }
        }
        Ok(())
    }
}

impl Default for BoneMap {
    fn default() -> Self {
        Self::mirrored()
    }
}
