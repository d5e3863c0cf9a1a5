//! # vmc-retarget: real-time mocap retargeting
//!
//! Receives full-body bone poses from a VMC performer over OSC/UDP and drives
//! a skeletal rig with them. Each bone is renamed through a mapping table
//! (with optional left/right mirroring), created on the rig the first time it
//! is seen, linked to its parent, and updated every frame with a scaled
//! translation and an Euler rotation converted from the incoming quaternion.
//!
//! ## Architecture
//!
//! - **Backend**: UDP receiver thread decoding OSC with `rosc`
//! - **Pipeline**: [`FrameBridge`], a latest-value mailbox between the
//!   receiver and the frame thread
//! - **Retarget**: rotation conversion, bone mapping, the skeleton registry
//!   and the per-frame [`UpdateDriver`]
//! - **Host**: the [`SceneHost`] capability trait and an in-memory scene
//! - **Frontend**: an eframe/egui viewer that ticks the driver every frame
//!   and plots the rig with egui_plot
//!
//! ## Configuration
//!
//! Settings are read from a TOML file, by default `config.toml` in the
//! platform data directory under `dev.vmc-retarget`:
//!
//! - **Linux**: `~/.local/share/dev.vmc-retarget/`
//! - **macOS**: `~/Library/Application Support/dev.vmc-retarget/`
//! - **Windows**: `%APPDATA%\dev.vmc-retarget\`
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vmc_retarget::{AppConfig, FrameBridge, InMemoryScene, ReceiverHandle, UpdateDriver};
//!
//! let config = AppConfig::default();
//! let bridge = Arc::new(FrameBridge::new());
//! let _receiver = ReceiverHandle::spawn(&config.receiver, Arc::clone(&bridge))?;
//! let mut driver = UpdateDriver::from_config(&config.retarget, bridge, InMemoryScene::new())?;
//!
//! loop {
//!     let report = driver.tick();
//!     // draw driver.host() ...
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod frontend;
pub mod host;
pub mod pipeline;
pub mod retarget;
pub mod types;

// Re-export commonly used types
pub use backend::{ReceiverEvent, ReceiverHandle};
pub use config::AppConfig;
pub use error::{Result, RetargetError};
pub use frontend::RigViewerApp;
pub use host::{InMemoryScene, NodeHandle, SceneHost};
pub use pipeline::FrameBridge;
pub use retarget::{
    to_euler, BoneMap, LinkPolicy, SkeletonRegistry, TickReport, UpdateDriver,
};
pub use types::{BoneSample, EulerAngles};
