//! Per-frame update driver.
//!
//! [`UpdateDriver::tick`] is called once per host frame on the frame thread.
//! It drains the [`FrameBridge`], makes sure every drained bone has a node,
//! writes the node's translation and rotation, and finally runs the
//! registry's link pass. A bone whose host calls fail is counted and skipped;
//! the remaining bones in the same drain are still applied and `tick` itself
//! never fails.

use crate::config::RetargetConfig;
use crate::error::{Result, ResultExt};
use crate::host::SceneHost;
use crate::pipeline::bridge::FrameBridge;
use crate::retarget::coords::AxisConvention;
use crate::retarget::registry::{scale_position, LinkReport, SkeletonRegistry};
use crate::retarget::rotation::{to_euler_ordered, RotationOrder};
use crate::types::BoneSample;
use std::collections::HashSet;
use std::sync::Arc;

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Samples taken from the bridge
    pub drained: usize,
    /// Samples dropped by the bone filter
    pub filtered: usize,
    /// Nodes created this tick
    pub created: usize,
    /// Bones whose transform was written
    pub updated: usize,
    /// Bones skipped because a host call failed
    pub failed: usize,
    /// Result of the link pass, default when the tick had nothing to do
    pub link: LinkReport,
}

impl TickReport {
    pub fn is_idle(&self) -> bool {
        self.drained == 0
    }
}

/// Running totals across ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub ticks: u64,
    /// Ticks that drained at least one sample
    pub active_ticks: u64,
    pub samples_applied: u64,
    pub samples_filtered: u64,
    pub failures: u64,
    pub nodes_created: u64,
    pub links_applied: u64,
}

impl DriverStats {
    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        if !report.is_idle() {
            self.active_ticks += 1;
        }
        self.samples_applied += report.updated as u64;
        self.samples_filtered += report.filtered as u64;
        self.failures += report.failed as u64;
        self.nodes_created += report.created as u64;
        self.links_applied += report.link.linked as u64;
    }
}

pub struct UpdateDriver<H: SceneHost> {
    bridge: Arc<FrameBridge>,
    registry: SkeletonRegistry,
    host: H,
    rotation_order: RotationOrder,
    axis: AxisConvention,
    bone_filter: Option<HashSet<String>>,
    stats: DriverStats,
}

impl<H: SceneHost> UpdateDriver<H> {
    pub fn new(bridge: Arc<FrameBridge>, registry: SkeletonRegistry, host: H) -> Self {
        Self {
            bridge,
            registry,
            host,
            rotation_order: RotationOrder::default(),
            axis: AxisConvention::default(),
            bone_filter: None,
            stats: DriverStats::default(),
        }
    }

    /// Build a driver, registry included, from the retargeting config
    pub fn from_config(config: &RetargetConfig, bridge: Arc<FrameBridge>, host: H) -> Result<Self> {
        let map = config.bone_map().context("Building bone map")?;
        let registry = SkeletonRegistry::new(Arc::new(map))
            .with_unit_scale(config.unit_scale)
            .with_link_policy(config.link_policy);

        let mut driver = Self::new(bridge, registry, host)
            .with_rotation_order(config.rotation_order)
            .with_axis_convention(config.axis_convention);
        if !config.bone_filter.is_empty() {
            driver = driver.with_bone_filter(config.bone_filter.iter().cloned());
        }
        Ok(driver)
    }

    pub fn with_rotation_order(mut self, order: RotationOrder) -> Self {
        self.rotation_order = order;
        self
    }

    pub fn with_axis_convention(mut self, axis: AxisConvention) -> Self {
        self.axis = axis;
        self
    }

    /// Only apply samples for the listed source bones
    pub fn with_bone_filter(mut self, bones: impl IntoIterator<Item = String>) -> Self {
        self.bone_filter = Some(bones.into_iter().collect());
        self
    }

    /// Run one frame's worth of retargeting.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        let drained = self.bridge.drain_all();
        report.drained = drained.len();

        if drained.is_empty() {
            self.stats.record(&report);
            return report;
        }

        for (bone_id, sample) in drained {
            if let Some(filter) = &self.bone_filter {
                if !filter.contains(&bone_id) {
                    report.filtered += 1;
                    continue;
                }
            }

            let known = self.registry.get(&bone_id).is_some();
            match self.apply_sample(&bone_id, &sample) {
                Ok(()) => {
                    report.updated += 1;
                    if !known {
                        report.created += 1;
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    // Node may exist even though a later host call failed
                    if !known && self.registry.get(&bone_id).is_some() {
                        report.created += 1;
                    }
                    tracing::warn!("Skipping bone {} this frame: {}", bone_id, e);
                }
            }
        }

        report.link = self.registry.link_all(&mut self.host);
        self.stats.record(&report);
        report
    }

    /// `bone_id` is the bridge key, which is what the filter and the
    /// registry see even if the sample itself names another bone.
    fn apply_sample(&mut self, bone_id: &str, sample: &BoneSample) -> Result<()> {
        let (position, rotation) = self.axis.apply(sample.position, sample.rotation);
        let handle = self
            .registry
            .get_or_create(&mut self.host, bone_id, Some(position))?;

        let [x, y, z] = scale_position(position, self.registry.unit_scale());
        self.host
            .set_translation(handle, x, y, z)
            .context("Setting translation")?;

        let euler = to_euler_ordered(rotation, self.rotation_order);
        self.host
            .set_rotation_euler(handle, euler.roll, euler.pitch, euler.yaw)
            .context("Setting rotation")?;
        Ok(())
    }

    pub fn bridge(&self) -> &Arc<FrameBridge> {
        &self.bridge
    }

    pub fn registry(&self) -> &SkeletonRegistry {
        &self.registry
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }
}
