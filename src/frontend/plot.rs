//! Skeleton rendering using egui_plot
//!
//! The rig is drawn as two orthographic projections of the in-memory scene's
//! world positions: a front view (X right, Y up) and a side view (Z right,
//! Y up). Bones are segments from each parented node to its parent; every
//! node is drawn as a joint marker.

use egui::Color32;
use egui_plot::{Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::host::InMemoryScene;

/// Which world axes map onto the plot's horizontal and vertical axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// X horizontal, Y vertical
    Front,
    /// Z horizontal, Y vertical
    Side,
}

impl Projection {
    pub fn title(&self) -> &'static str {
        match self {
            Projection::Front => "Front (X/Y)",
            Projection::Side => "Side (Z/Y)",
        }
    }

    fn id(&self) -> &'static str {
        match self {
            Projection::Front => "skeleton_front",
            Projection::Side => "skeleton_side",
        }
    }

    #[inline]
    pub fn project(&self, p: [f64; 3]) -> [f64; 2] {
        match self {
            Projection::Front => [p[0], p[1]],
            Projection::Side => [p[2], p[1]],
        }
    }
}

/// Projected geometry of the rig for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletonGeometry {
    /// Parent-to-child segments
    pub bones: Vec<[[f64; 2]; 2]>,
    /// Joint positions with their node names, hidden nodes left out
    pub joints: Vec<([f64; 2], String)>,
}

impl SkeletonGeometry {
    pub fn from_scene(scene: &InMemoryScene, projection: Projection) -> Self {
        let world = scene.world_positions();
        let mut geometry = Self::default();

        for (handle, node) in scene.nodes() {
            if !node.visible {
                continue;
            }
            let here = projection.project(world[handle.index()]);
            geometry.joints.push((here, node.name.clone()));

            let parent = node
                .parent
                .filter(|p| scene.node(*p).is_some_and(|n| n.visible));
            if let Some(parent) = parent {
                let there = projection.project(world[parent.index()]);
                geometry.bones.push([there, here]);
            }
        }
        geometry
    }
}

/// Draw one projection of the rig
pub fn show_skeleton(
    ui: &mut egui::Ui,
    scene: &InMemoryScene,
    projection: Projection,
    show_labels: bool,
) {
    let geometry = SkeletonGeometry::from_scene(scene, projection);
    let bone_color = Color32::from_rgb(120, 200, 255);
    let joint_color = Color32::from_rgb(255, 200, 90);

    ui.label(projection.title());
    Plot::new(projection.id())
        .data_aspect(1.0)
        .show_grid(true)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, [a, b]) in geometry.bones.iter().enumerate() {
                let line = Line::new(format!("bone_{}", i), PlotPoints::from(vec![*a, *b]))
                    .color(bone_color)
                    .width(2.5);
                plot_ui.line(line);
            }

            let joints: Vec<[f64; 2]> = geometry.joints.iter().map(|(p, _)| *p).collect();
            plot_ui.points(
                Points::new("joints", PlotPoints::from(joints))
                    .color(joint_color)
                    .radius(3.5),
            );

            if show_labels {
                for ([x, y], name) in &geometry.joints {
                    plot_ui.text(
                        Text::new(name.clone(), PlotPoint::new(*x, *y), name.as_str())
                            .color(Color32::LIGHT_GRAY),
                    );
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SceneHost;

    fn two_bone_scene() -> InMemoryScene {
        let mut scene = InMemoryScene::new();
        let hips = scene.create_node("Hips").unwrap();
        let spine = scene.create_node("Spine").unwrap();
        scene.set_visible(hips, true).unwrap();
        scene.set_visible(spine, true).unwrap();
        scene.set_parent(spine, hips).unwrap();
        scene.set_translation(hips, 5.0, 100.0, 20.0).unwrap();
        scene.set_translation(spine, 0.0, 10.0, 0.0).unwrap();
        scene
    }

    #[test]
    fn test_front_projection() {
        let geometry = SkeletonGeometry::from_scene(&two_bone_scene(), Projection::Front);
        assert_eq!(geometry.joints.len(), 2);
        assert_eq!(geometry.bones, vec![[[5.0, 100.0], [5.0, 110.0]]]);
    }

    #[test]
    fn test_side_projection() {
        let geometry = SkeletonGeometry::from_scene(&two_bone_scene(), Projection::Side);
        assert_eq!(geometry.bones, vec![[[20.0, 100.0], [20.0, 110.0]]]);
    }

    #[test]
    fn test_hidden_nodes_skipped() {
        let mut scene = two_bone_scene();
        let hips = scene.find("Hips").unwrap();
        scene.set_visible(hips, false).unwrap();

        let geometry = SkeletonGeometry::from_scene(&scene, Projection::Front);
        assert_eq!(geometry.joints.len(), 1);
        assert_eq!(geometry.joints[0].1, "Spine");
        assert!(geometry.bones.is_empty());
    }
}
