//! Network side of the pipeline
//!
//! Everything here runs off the frame thread. The receiver decodes VMC bone
//! pose messages from UDP and publishes them into the shared
//! [`FrameBridge`](crate::pipeline::bridge::FrameBridge); the frame thread
//! only ever sees the bridge.
//!
//! # Components
//!
//! - [`osc`] - OSC packet decoding into [`BoneSample`](crate::types::BoneSample)s
//! - [`ReceiverHandle`] - Spawns and owns the UDP receiver thread
//! - [`ReceiverEvent`] - Status changes sent to the UI over a channel
//! - [`SyntheticSource`] - Procedural motion generator (feature-gated)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vmc_retarget::backend::ReceiverHandle;
//! use vmc_retarget::config::ReceiverConfig;
//! use vmc_retarget::pipeline::FrameBridge;
//!
//! let bridge = Arc::new(FrameBridge::new());
//! let mut receiver = ReceiverHandle::spawn(&ReceiverConfig::default(), Arc::clone(&bridge))?;
//!
//! // Once per frame
//! for event in receiver.drain_events() {
//!     println!("{:?}", event);
//! }
//! let samples = bridge.drain_all();
//!
//! receiver.shutdown();
//! ```

pub mod osc;
pub mod receiver;
#[cfg(feature = "synthetic-source")]
pub mod synthetic;

pub use osc::{decode_bone_message, decode_packet, DecodedPacket};
pub use receiver::{ReceiverEvent, ReceiverHandle, ReceiverStatsSnapshot};
#[cfg(feature = "synthetic-source")]
pub use synthetic::SyntheticSource;
