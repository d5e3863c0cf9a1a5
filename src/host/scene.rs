//! In-memory scene graph
//!
//! A flat arena of [`SceneNode`]s indexed by [`NodeHandle`]. It implements
//! [`SceneHost`] faithfully enough for the viewer to draw the rig: local
//! transforms are stored as given and [`InMemoryScene::world_positions`]
//! composes them down the parent chain.

use super::{NodeHandle, SceneHost};
use crate::error::{Result, RetargetError};
use crate::retarget::rotation::RotationOrder;
use crate::types::EulerAngles;

/// A node as stored by the in-memory host
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeHandle>,
    pub visible: bool,
    /// Local translation in host units
    pub translation: [f64; 3],
    /// Local rotation in degrees
    pub rotation: EulerAngles,
}

impl SceneNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            visible: false,
            translation: [0.0; 3],
            rotation: EulerAngles::ZERO,
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryScene {
    nodes: Vec<SceneNode>,
    rotation_order: RotationOrder,
}

impl InMemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret stored Euler angles in the given order when composing
    /// world transforms
    pub fn with_rotation_order(mut self, order: RotationOrder) -> Self {
        self.rotation_order = order;
        self
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(handle.index())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeHandle, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeHandle(i as u32), n))
    }

    /// First node with the given name
    pub fn find(&self, name: &str) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeHandle(i as u32))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// World-space position of every node, in handle order.
    ///
    /// A parent chain longer than the node count (a cycle) is cut at that
    /// depth.
    pub fn world_positions(&self) -> Vec<[f64; 3]> {
        let mut cache: Vec<Option<([f64; 3], Mat3)>> = vec![None; self.nodes.len()];
        (0..self.nodes.len())
            .map(|i| self.world_transform(i, &mut cache, 0).0)
            .collect()
    }

    fn world_transform(
        &self,
        index: usize,
        cache: &mut [Option<([f64; 3], Mat3)>],
        depth: usize,
    ) -> ([f64; 3], Mat3) {
        if let Some(cached) = cache[index] {
            return cached;
        }
        let node = &self.nodes[index];
        let local_rot = Mat3::from_euler(node.rotation, self.rotation_order);

        let result = match node.parent {
            Some(parent) if parent.index() < self.nodes.len() && depth < self.nodes.len() => {
                let (parent_pos, parent_rot) =
                    self.world_transform(parent.index(), cache, depth + 1);
                let offset = parent_rot.mul_vec(node.translation);
                (
                    [
                        parent_pos[0] + offset[0],
                        parent_pos[1] + offset[1],
                        parent_pos[2] + offset[2],
                    ],
                    parent_rot.mul(&local_rot),
                )
            }
            _ => (node.translation, local_rot),
        };

        cache[index] = Some(result);
        result
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Result<&mut SceneNode> {
        self.nodes
            .get_mut(handle.index())
            .ok_or_else(|| RetargetError::Host(format!("unknown node {}", handle)))
    }
}

impl SceneHost for InMemoryScene {
    fn create_node(&mut self, name: &str) -> Result<NodeHandle> {
        if name.is_empty() {
            return Err(RetargetError::NodeCreation {
                name: name.to_string(),
                message: "empty node name".to_string(),
            });
        }
        let handle = NodeHandle(self.nodes.len() as u32);
        self.nodes.push(SceneNode::new(name));
        Ok(handle)
    }

    fn set_visible(&mut self, node: NodeHandle, visible: bool) -> Result<()> {
        self.node_mut(node)?.visible = visible;
        Ok(())
    }

    fn set_parent(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<()> {
        if child == parent {
            return Err(RetargetError::Host(format!("{} cannot parent itself", child)));
        }
        if parent.index() >= self.nodes.len() {
            return Err(RetargetError::Host(format!("unknown parent {}", parent)));
        }
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn set_translation(&mut self, node: NodeHandle, x: f64, y: f64, z: f64) -> Result<()> {
        self.node_mut(node)?.translation = [x, y, z];
        Ok(())
    }

    fn set_rotation_euler(
        &mut self,
        node: NodeHandle,
        roll: f64,
        pitch: f64,
        yaw: f64,
    ) -> Result<()> {
        self.node_mut(node)?.rotation = EulerAngles::new(roll, pitch, yaw);
        Ok(())
    }
}

/// Row-major 3x3 rotation matrix
#[derive(Debug, Clone, Copy, PartialEq)]
struct Mat3([[f64; 3]; 3]);

impl Mat3 {
    fn from_euler(e: EulerAngles, order: RotationOrder) -> Self {
        let (sx, cx) = e.roll.to_radians().sin_cos();
        let (sy, cy) = e.pitch.to_radians().sin_cos();
        let (sz, cz) = e.yaw.to_radians().sin_cos();
        let rx = Mat3([[1.0, 0.0, 0.0], [0.0, cx, -sx], [0.0, sx, cx]]);
        let ry = Mat3([[cy, 0.0, sy], [0.0, 1.0, 0.0], [-sy, 0.0, cy]]);
        let rz = Mat3([[cz, -sz, 0.0], [sz, cz, 0.0], [0.0, 0.0, 1.0]]);
        match order {
            RotationOrder::Xyz => rz.mul(&ry).mul(&rx),
            RotationOrder::Zyx => rx.mul(&ry).mul(&rz),
        }
    }

    fn mul(&self, other: &Mat3) -> Mat3 {
        let mut out = [[0.0; 3]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.0[r][k] * other.0[k][c]).sum();
            }
        }
        Mat3(out)
    }

    fn mul_vec(&self, v: [f64; 3]) -> [f64; 3] {
        let m = &self.0;
        [
            m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
            m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
            m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx3(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn test_create_and_mutate() {
        let mut scene = InMemoryScene::new();
        let hips = scene.create_node("Hips").unwrap();
        scene.set_visible(hips, true).unwrap();
        scene.set_translation(hips, 0.0, 100.0, 0.0).unwrap();
        scene.set_rotation_euler(hips, 1.0, 2.0, 3.0).unwrap();

        let node = scene.node(hips).unwrap();
        assert_eq!(node.name, "Hips");
        assert!(node.visible);
        assert_eq!(node.translation, [0.0, 100.0, 0.0]);
        assert_eq!(node.rotation, EulerAngles::new(1.0, 2.0, 3.0));
        assert_eq!(scene.find("Hips"), Some(hips));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut scene = InMemoryScene::new();
        assert!(matches!(
            scene.create_node(""),
            Err(RetargetError::NodeCreation { .. })
        ));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_unknown_handle_is_error() {
        let mut scene = InMemoryScene::new();
        let a = scene.create_node("A").unwrap();
        assert!(scene.set_visible(NodeHandle(9), true).is_err());
        assert!(scene.set_parent(a, NodeHandle(9)).is_err());
        assert!(scene.set_parent(a, a).is_err());
    }

    #[test]
    fn test_world_positions_follow_parent_chain() {
        let mut scene = InMemoryScene::new();
        let hips = scene.create_node("Hips").unwrap();
        let spine = scene.create_node("Spine").unwrap();
        scene.set_parent(spine, hips).unwrap();
        scene.set_translation(hips, 0.0, 100.0, 0.0).unwrap();
        scene.set_translation(spine, 0.0, 10.0, 0.0).unwrap();

        let world = scene.world_positions();
        assert!(approx3(world[0], [0.0, 100.0, 0.0]));
        assert!(approx3(world[1], [0.0, 110.0, 0.0]));

        // Rolling the hips 90° about X swings the spine offset onto +Z.
        scene.set_rotation_euler(hips, 90.0, 0.0, 0.0).unwrap();
        let world = scene.world_positions();
        assert!(approx3(world[1], [0.0, 100.0, 10.0]));
    }

    #[test]
    fn test_rotation_order_changes_composition() {
        let build = |order| {
            let mut scene = InMemoryScene::new().with_rotation_order(order);
            let a = scene.create_node("A").unwrap();
            let b = scene.create_node("B").unwrap();
            scene.set_parent(b, a).unwrap();
            scene.set_rotation_euler(a, 90.0, 0.0, 90.0).unwrap();
            scene.set_translation(b, 0.0, 1.0, 0.0).unwrap();
            scene.world_positions()[1]
        };
        // Rz*Rx sends +Y to +Z, Rx*Rz sends +Y to -X then keeps it.
        assert!(approx3(build(RotationOrder::Xyz), [0.0, 0.0, 1.0]));
        assert!(approx3(build(RotationOrder::Zyx), [-1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_world_positions_survive_cycle() {
        let mut scene = InMemoryScene::new();
        let a = scene.create_node("A").unwrap();
        let b = scene.create_node("B").unwrap();
        scene.set_parent(a, b).unwrap();
        scene.set_parent(b, a).unwrap();
        assert_eq!(scene.world_positions().len(), 2);
    }
}
