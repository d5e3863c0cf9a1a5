//! Configuration module for vmc-retarget
//!
//! Settings are static for the lifetime of the process and come from a TOML
//! file. A missing file means defaults; a file that exists but does not parse
//! is an error reported to the user.
//!
//! # App Data Location
//!
//! The default config file and the log directory live in the
//! platform-appropriate data directory:
//! - **Linux**: `~/.local/share/dev.vmc-retarget/`
//! - **macOS**: `~/Library/Application Support/dev.vmc-retarget/`
//! - **Windows**: `%APPDATA%\dev.vmc-retarget\`
//!
//! # Example
//!
//! ```toml
//! [receiver]
//! bind_addr = "0.0.0.0:39539"
//!
//! [retarget]
//! unit_scale = 100.0
//! mapping = "mirrored"
//! link_policy = "incremental"
//! bone_filter = ["Hips"]
//! ```

use crate::error::{Result, RetargetError};
use crate::retarget::coords::AxisConvention;
use crate::retarget::mapping::{BoneMap, MappingPreset};
use crate::retarget::registry::{LinkPolicy, DEFAULT_UNIT_SCALE};
use crate::retarget::rotation::RotationOrder;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.vmc-retarget";

/// Config filename inside the app data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Subdirectory of the app data directory holding log files
pub const LOG_DIR: &str = "logs";

/// Default VMC performer port
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:39539";

/// OSC address carrying bone poses
pub const BONE_POS_ADDRESS: &str = "/VMC/Ext/Bone/Pos";

/// Default socket read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        RetargetError::Config("Could not determine app data directory".to_string())
    })?;
    ensure_dir(dir)
}

fn ensure_dir(dir: PathBuf) -> Result<PathBuf> {
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            RetargetError::Config(format!("Failed to create directory {:?}: {}", dir, e))
        })?;
    }
    Ok(dir)
}

/// Get the path to the default config file
pub fn default_config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

/// Ensure the log directory inside the app data directory exists
pub fn ensure_log_dir() -> Result<PathBuf> {
    ensure_dir(ensure_app_data_dir()?.join(LOG_DIR))
}

// ==================== App Config ====================

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub receiver: ReceiverConfig,

    #[serde(default)]
    pub retarget: RetargetConfig,

    #[serde(default)]
    pub viewer: ViewerConfig,

    #[cfg(feature = "synthetic-source")]
    #[serde(default)]
    pub synthetic: SyntheticConfig,
}

impl AppConfig {
    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RetargetError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            RetargetError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, falling back to defaults if it does not exist.
    ///
    /// A file that exists but is invalid is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save config to disk as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RetargetError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| RetargetError::Serialization(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            RetargetError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        self.receiver.socket_addr()?;
        if !self.receiver.bone_address.starts_with('/') {
            return Err(RetargetError::Config(format!(
                "OSC address must start with '/': {:?}",
                self.receiver.bone_address
            )));
        }
        if self.receiver.read_timeout_ms == 0 {
            return Err(RetargetError::Config(
                "read_timeout_ms must be greater than zero".to_string(),
            ));
        }
        let scale = self.retarget.unit_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RetargetError::Config(format!(
                "unit_scale must be a positive number, got {}",
                scale
            )));
        }
        Ok(())
    }
}

// ==================== Receiver ====================

/// OSC/UDP receiver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Local address to bind the UDP socket to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// OSC address of bone pose messages
    #[serde(default = "default_bone_address")]
    pub bone_address: String,

    /// Socket read timeout; bounds how long shutdown waits
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_bone_address() -> String {
    BONE_POS_ADDRESS.to_string()
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            bone_address: default_bone_address(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl ReceiverConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr.parse().map_err(|e| {
            RetargetError::Config(format!("Invalid bind address {:?}: {}", self.bind_addr, e))
        })
    }

    pub fn read_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.read_timeout_ms)
    }
}

// ==================== Retargeting ====================

/// Settings of the retargeting core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetargetConfig {
    /// Source units to host units
    #[serde(default = "default_unit_scale")]
    pub unit_scale: f64,

    #[serde(default)]
    pub rotation_order: RotationOrder,

    #[serde(default)]
    pub axis_convention: AxisConvention,

    /// Built-in mapping table, ignored when `mapping_file` is set
    #[serde(default)]
    pub mapping: MappingPreset,

    /// JSON mapping table replacing the preset
    #[serde(default)]
    pub mapping_file: Option<PathBuf>,

    #[serde(default)]
    pub link_policy: LinkPolicy,

    /// Source bones to apply; empty applies every bone
    #[serde(default)]
    pub bone_filter: Vec<String>,
}

fn default_unit_scale() -> f64 {
    DEFAULT_UNIT_SCALE
}

impl Default for RetargetConfig {
    fn default() -> Self {
        Self {
            unit_scale: default_unit_scale(),
            rotation_order: RotationOrder::default(),
            axis_convention: AxisConvention::default(),
            mapping: MappingPreset::default(),
            mapping_file: None,
            link_policy: LinkPolicy::default(),
            bone_filter: Vec::new(),
        }
    }
}

impl RetargetConfig {
    /// Build the bone map this config selects
    pub fn bone_map(&self) -> Result<BoneMap> {
        match &self.mapping_file {
            Some(path) => BoneMap::load_json(path),
            None => Ok(BoneMap::from_preset(self.mapping)),
        }
    }
}

// ==================== Viewer ====================

/// Viewer window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_window_size")]
    pub window_size: [f32; 2],

    /// Draw bone names next to joints
    #[serde(default = "default_true")]
    pub show_labels: bool,

    #[serde(default = "default_true")]
    pub dark_mode: bool,
}

fn default_window_size() -> [f32; 2] {
    [1100.0, 700.0]
}

fn default_true() -> bool {
    true
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            show_labels: true,
            dark_mode: true,
        }
    }
}

// ==================== Synthetic Source ====================

/// Built-in motion generator settings
#[cfg(feature = "synthetic-source")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Feed the bridge from the generator instead of the network
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_synthetic_rate_hz")]
    pub rate_hz: u32,
}

#[cfg(feature = "synthetic-source")]
fn default_synthetic_rate_hz() -> u32 {
    60
}

#[cfg(feature = "synthetic-source")]
impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rate_hz: default_synthetic_rate_hz(),
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.receiver.bind_addr, "127.0.0.1:39539");
        assert_eq!(config.receiver.bone_address, "/VMC/Ext/Bone/Pos");
        assert_eq!(config.retarget.unit_scale, 100.0);
        assert_eq!(config.retarget.link_policy, LinkPolicy::OneShot);
        assert_eq!(config.retarget.rotation_order, RotationOrder::Xyz);
        assert!(config.retarget.bone_filter.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [retarget]
            unit_scale = 1.0
            link_policy = "incremental"
            axis_convention = "swap_yz"
            "#,
        )
        .unwrap();
        assert_eq!(config.retarget.unit_scale, 1.0);
        assert_eq!(config.retarget.link_policy, LinkPolicy::Incremental);
        assert_eq!(config.retarget.axis_convention, AxisConvention::SwapYz);
        assert_eq!(config.retarget.mapping, MappingPreset::Mirrored);
        assert_eq!(config.receiver, ReceiverConfig::default());
    }

    #[test]
    fn test_ensure_dir_creates_nested_once() {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join(APP_ID).join(LOG_DIR);

        assert_eq!(ensure_dir(logs.clone()).unwrap(), logs);
        assert!(logs.is_dir());
        // Existing directory is fine
        assert_eq!(ensure_dir(logs.clone()).unwrap(), logs);
    }

    #[test]
    fn test_ensure_dir_fails_on_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, "").unwrap();
        assert!(matches!(
            ensure_dir(file.join(LOG_DIR)),
            Err(RetargetError::Config(_))
        ));
    }

    #[test]
    fn test_translation_only_swap_parses() {
        let config: AppConfig =
            toml::from_str("[retarget]\naxis_convention = \"swap_yz_translation\"\n").unwrap();
        assert_eq!(
            config.retarget.axis_convention,
            AxisConvention::SwapYzTranslation
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = AppConfig::default();
        config.receiver.bind_addr = "0.0.0.0:39540".to_string();
        config.retarget.mapping = MappingPreset::Identity;
        config.retarget.bone_filter = vec!["Hips".to_string()];
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_rejects_bad_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        std::fs::write(&path, "[receiver]\nbind_addr = \"not an address\"\n").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(RetargetError::Config(_))));

        std::fs::write(&path, "[retarget]\nunit_scale = -1.0\n").unwrap();
        assert!(AppConfig::load_or_default(&path).is_err());

        std::fs::write(&path, "[receiver]\nbone_address = \"VMC\"\n").unwrap();
        assert!(AppConfig::load(&path).is_err());

        std::fs::write(&path, "this is = = not toml").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_bone_map_from_preset_and_file() {
        let mut retarget = RetargetConfig::default();
        let map = retarget.bone_map().unwrap();
        assert_eq!(map.resolve_target_name("LeftHand"), "RightHand");

        retarget.mapping = MappingPreset::Identity;
        let map = retarget.bone_map().unwrap();
        assert_eq!(map.resolve_target_name("LeftHand"), "LeftHand");

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rig.json");
        std::fs::write(
            &path,
            r#"{"bones": [
                {"source": "Hips", "target": "pelvis", "parent": null},
                {"source": "Spine", "target": "spine_01", "parent": "Hips"}
            ]}"#,
        )
        .unwrap();
        retarget.mapping_file = Some(path);
        let map = retarget.bone_map().unwrap();
        assert_eq!(map.resolve_target_name("Spine"), "spine_01");
        assert_eq!(map.resolve_parent("Spine"), Some("Hips"));
    }

    #[test]
    fn test_receiver_timeout() {
        let receiver = ReceiverConfig {
            read_timeout_ms: 250,
            ..ReceiverConfig::default()
        };
        assert_eq!(receiver.read_timeout().as_millis(), 250);
        assert!(receiver.socket_addr().is_ok());
    }
}
