//! Side panel: pipeline statistics and the bone table.

use egui::{Color32, RichText, Ui};

use super::topics::Topics;
use crate::host::InMemoryScene;
use crate::retarget::SkeletonRegistry;

/// Render receiver, bridge and driver counters
pub fn render_stats_panel(ui: &mut Ui, topics: &Topics) {
    ui.heading("Pipeline");
    egui::Grid::new("pipeline_stats")
        .num_columns(2)
        .spacing([10.0, 4.0])
        .striped(true)
        .show(ui, |ui| {
            let rx = &topics.receiver_stats;
            stat_row(ui, "Packets", rx.packets);
            stat_row(ui, "Samples received", rx.samples);
            stat_row(ui, "Malformed", rx.malformed);
            stat_row(ui, "Other addresses", rx.ignored);
            stat_row(ui, "Undecodable", rx.undecodable);

            let mb = &topics.mailbox_stats;
            stat_row(ui, "Coalesced", mb.coalesced);

            let drv = &topics.driver_stats;
            stat_row(ui, "Frames", drv.ticks);
            stat_row(ui, "Active frames", drv.active_ticks);
            stat_row(ui, "Applied", drv.samples_applied);
            stat_row(ui, "Filtered", drv.samples_filtered);
            stat_row(ui, "Nodes created", drv.nodes_created);
            stat_row(ui, "Links", drv.links_applied);

            ui.label("Failures:");
            let color = if drv.failures > 0 {
                Color32::LIGHT_RED
            } else {
                Color32::GRAY
            };
            ui.colored_label(color, drv.failures.to_string());
            ui.end_row();
        });

    ui.separator();
    let tick = &topics.last_tick;
    ui.label(
        RichText::new(format!(
            "Last frame: {} drained, {} updated, {} failed",
            tick.drained, tick.updated, tick.failed
        ))
        .small(),
    );
}

fn stat_row(ui: &mut Ui, label: &str, value: u64) {
    ui.label(format!("{}:", label));
    ui.label(RichText::new(value.to_string()).monospace());
    ui.end_row();
}

/// Render one row per created bone, sorted by source name
pub fn render_bone_table(ui: &mut Ui, registry: &SkeletonRegistry, scene: &InMemoryScene) {
    ui.heading(format!("Bones ({})", registry.len()));

    let mut rows: Vec<_> = registry.nodes().collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Grid::new("bone_table")
            .num_columns(4)
            .spacing([10.0, 2.0])
            .striped(true)
            .show(ui, |ui| {
                ui.label(RichText::new("Source").strong());
                ui.label(RichText::new("Target").strong());
                ui.label(RichText::new("Parent").strong());
                ui.label(RichText::new("Rotation").strong());
                ui.end_row();

                for (source, rig) in rows {
                    ui.label(source);
                    ui.label(&rig.name);
                    let parent = rig
                        .parent
                        .and_then(|p| scene.node(p))
                        .map_or("-", |n| n.name.as_str());
                    ui.label(parent);
                    let rotation = scene
                        .node(rig.handle)
                        .map(|n| {
                            let [r, p, y] = n.rotation.as_array();
                            format!("{:7.1} {:7.1} {:7.1}", r, p, y)
                        })
                        .unwrap_or_default();
                    ui.label(RichText::new(rotation).monospace());
                    ui.end_row();
                }
            });
    });
}
