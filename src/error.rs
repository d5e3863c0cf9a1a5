//! Error handling for vmc-retarget
//!
//! This module defines the crate error type and a Result alias used by the
//! receiver, the retargeting core and the host bindings.

use thiserror::Error;

/// Main error type for retargeting operations
#[derive(Error, Debug)]
pub enum RetargetError {
    /// The host scene graph rejected a node operation
    #[error("Host error: {0}")]
    Host(String),

    /// The host could not create a node for a bone
    #[error("Failed to create node '{name}': {message}")]
    NodeCreation { name: String, message: String },

    /// An inbound OSC payload did not match the bone-pose layout
    #[error("Malformed message at {address}: {reason}")]
    MalformedMessage { address: String, reason: String },

    /// OSC packet could not be decoded at all
    #[error("OSC decode error: {0}")]
    Osc(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to bone mapping tables
    #[error("Mapping table error: {0}")]
    Mapping(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<RetargetError>,
    },
}

impl RetargetError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        RetargetError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a malformed-message error for the given OSC address
    pub fn malformed(address: impl Into<String>, reason: impl Into<String>) -> Self {
        RetargetError::MalformedMessage {
            address: address.into(),
            reason: reason.into(),
        }
    }
}

impl From<rosc::OscError> for RetargetError {
    fn from(err: rosc::OscError) -> Self {
        RetargetError::Osc(format!("{:?}", err))
    }
}

/// Result type alias for retargeting operations
pub type Result<T> = std::result::Result<T, RetargetError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
