//! Fake hosts for driving the pipeline from integration tests

use std::collections::HashMap;
use std::net::UdpSocket;

use rosc::OscPacket;
use vmc_retarget::backend::osc::{bone_message, encode_packet};
use vmc_retarget::config::BONE_POS_ADDRESS;
use vmc_retarget::{BoneSample, InMemoryScene, NodeHandle, Result, RetargetError, SceneHost};

/// In-memory scene that refuses to create some nodes a set number of times
/// and counts every call it sees.
#[derive(Default)]
pub struct FlakyScene {
    pub inner: InMemoryScene,
    failures_left: HashMap<String, usize>,
    pub create_calls: usize,
    pub parent_calls: usize,
}

impl FlakyScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail creation of the target node `name` the next `times` attempts
    pub fn fail_create(mut self, name: &str, times: usize) -> Self {
        self.failures_left.insert(name.to_string(), times);
        self
    }
}

impl SceneHost for FlakyScene {
    fn create_node(&mut self, name: &str) -> Result<NodeHandle> {
        self.create_calls += 1;
        if let Some(left) = self.failures_left.get_mut(name) {
            if *left > 0 {
                *left -= 1;
                return Err(RetargetError::NodeCreation {
                    name: name.to_string(),
                    message: "host busy".to_string(),
                });
            }
        }
        self.inner.create_node(name)
    }

    fn set_visible(&mut self, node: NodeHandle, visible: bool) -> Result<()> {
        self.inner.set_visible(node, visible)
    }

    fn set_parent(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<()> {
        self.parent_calls += 1;
        self.inner.set_parent(child, parent)
    }

    fn set_translation(&mut self, node: NodeHandle, x: f64, y: f64, z: f64) -> Result<()> {
        self.inner.set_translation(node, x, y, z)
    }

    fn set_rotation_euler(
        &mut self,
        node: NodeHandle,
        roll: f64,
        pitch: f64,
        yaw: f64,
    ) -> Result<()> {
        self.inner.set_rotation_euler(node, roll, pitch, yaw)
    }
}

/// Encode a single bone pose message as a VMC sender would
pub fn encode_sample(sample: &BoneSample) -> Vec<u8> {
    encode_packet(&OscPacket::Message(bone_message(BONE_POS_ADDRESS, sample)))
        .expect("encode bone message")
}

/// Loopback UDP socket to play the mocap sender
pub fn sender_socket() -> UdpSocket {
    UdpSocket::bind("127.0.0.1:0").expect("bind sender socket")
}
