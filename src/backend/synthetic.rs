//! Synthetic motion source
//!
//! Publishes a procedurally swaying humanoid into the bridge so the viewer
//! can run without a mocap application on the network. Positions are local
//! offsets from the parent bone in meters, the same layout a VMC sender uses.
//!
//! Only compiled with the `synthetic-source` feature:
//!
//! ```bash
//! cargo run --features synthetic-source
//! ```

use crate::error::{Result, RetargetError};
use crate::pipeline::bridge::FrameBridge;
use crate::types::{BoneSample, Quaternion};
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Rest offset of each bone from its parent, in meters
const REST_POSE: &[(&str, [f64; 3])] = &[
    ("root", [0.0, 0.0, 0.0]),
    ("Hips", [0.0, 0.95, 0.0]),
    ("Spine", [0.0, 0.1, 0.0]),
    ("Chest", [0.0, 0.12, 0.0]),
    ("UpperChest", [0.0, 0.12, 0.0]),
    ("Neck", [0.0, 0.14, 0.0]),
    ("Head", [0.0, 0.1, 0.0]),
    ("LeftShoulder", [0.04, 0.1, 0.0]),
    ("LeftUpperArm", [0.12, 0.0, 0.0]),
    ("LeftLowerArm", [0.26, 0.0, 0.0]),
    ("LeftHand", [0.24, 0.0, 0.0]),
    ("RightShoulder", [-0.04, 0.1, 0.0]),
    ("RightUpperArm", [-0.12, 0.0, 0.0]),
    ("RightLowerArm", [-0.26, 0.0, 0.0]),
    ("RightHand", [-0.24, 0.0, 0.0]),
    ("LeftUpperLeg", [0.09, -0.05, 0.0]),
    ("LeftLowerLeg", [0.0, -0.42, 0.0]),
    ("LeftFoot", [0.0, -0.42, 0.0]),
    ("RightUpperLeg", [-0.09, -0.05, 0.0]),
    ("RightLowerLeg", [0.0, -0.42, 0.0]),
    ("RightFoot", [0.0, -0.42, 0.0]),
];

/// Unit quaternion for a rotation of `degrees` about a unit `axis`
fn axis_angle(axis: [f64; 3], degrees: f64) -> Quaternion {
    let (s, c) = (degrees.to_radians() / 2.0).sin_cos();
    [axis[0] * s, axis[1] * s, axis[2] * s, c]
}

const X: [f64; 3] = [1.0, 0.0, 0.0];
const Y: [f64; 3] = [0.0, 1.0, 0.0];
const Z: [f64; 3] = [0.0, 0.0, 1.0];

/// Full-body pose `elapsed_secs` into a slow sway
pub fn pose_at(elapsed_secs: f64) -> Vec<BoneSample> {
    let phase = TAU * 0.5 * elapsed_secs;
    let sway = phase.sin();
    let step = (phase * 2.0).sin();

    REST_POSE
        .iter()
        .map(|&(bone, offset)| {
            let mut position = offset;
            let rotation = match bone {
                "Hips" => {
                    position[1] += 0.02 * step.abs();
                    axis_angle(Y, 10.0 * sway)
                }
                "Spine" => axis_angle(Z, 4.0 * sway),
                "Head" => axis_angle(X, 8.0 * (phase * 0.5).sin()),
                "LeftUpperArm" => axis_angle(Z, -70.0 + 15.0 * sway),
                "RightUpperArm" => axis_angle(Z, 70.0 + 15.0 * sway),
                "LeftLowerArm" | "RightLowerArm" => axis_angle(Y, 20.0 + 10.0 * step),
                "LeftUpperLeg" => axis_angle(X, 20.0 * step),
                "RightUpperLeg" => axis_angle(X, -20.0 * step),
                "LeftLowerLeg" => axis_angle(X, 15.0 * (1.0 + step)),
                "RightLowerLeg" => axis_angle(X, 15.0 * (1.0 - step)),
                _ => [0.0, 0.0, 0.0, 1.0],
            };
            BoneSample::new(bone, position, rotation)
        })
        .collect()
}

/// Generator thread publishing [`pose_at`] at a fixed rate
pub struct SyntheticSource {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SyntheticSource {
    pub fn spawn(bridge: Arc<FrameBridge>, rate_hz: u32) -> Result<Self> {
        if rate_hz == 0 {
            return Err(RetargetError::Config(
                "synthetic rate must be greater than zero".to_string(),
            ));
        }
        let period = Duration::from_secs_f64(1.0 / f64::from(rate_hz));
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let thread = std::thread::Builder::new()
            .name("synthetic-source".to_string())
            .spawn(move || {
                tracing::info!("Synthetic source started at {} Hz", rate_hz);
                let start = Instant::now();
                while flag.load(Ordering::SeqCst) {
                    for sample in pose_at(start.elapsed().as_secs_f64()) {
                        bridge.publish_sample(sample);
                    }
                    std::thread::sleep(period);
                }
                tracing::info!("Synthetic source stopped");
            })
            .map_err(|e| RetargetError::Io(e).with_context("Spawning synthetic source"))?;

        Ok(Self {
            running,
            thread: Some(thread),
        })
    }

    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retarget::mapping::BoneMap;

    #[test]
    fn test_pose_covers_every_mapped_bone() {
        let map = BoneMap::mirrored();
        let pose = pose_at(0.0);
        assert_eq!(pose.len(), map.len());
        assert!(pose.iter().all(|s| map.contains(&s.bone_id)));
    }

    #[test]
    fn test_pose_rotations_are_unit() {
        for t in [0.0, 0.3, 1.7, 12.5] {
            for sample in pose_at(t) {
                let norm: f64 = sample.rotation.iter().map(|c| c * c).sum();
                assert!((norm - 1.0).abs() < 1e-9, "{} at {}", sample.bone_id, t);
            }
        }
    }

    #[test]
    fn test_source_publishes_until_shutdown() {
        let bridge = Arc::new(FrameBridge::new());
        let mut source = SyntheticSource::spawn(Arc::clone(&bridge), 200).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while bridge.pending_len() == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        source.shutdown();
        assert_eq!(bridge.drain_all().len(), REST_POSE.len());
        assert!(SyntheticSource::spawn(bridge, 0).is_err());
    }
}
