//! Error types for inventory polling.
//!
//! An unsupported capability is not an error: it is
//! expressed as [`crate::Support::Unsupported`] and resolved to a default
//! by the component that asked for it.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use netdev_types::ParseError;

/// Result type alias for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors that can occur while polling a device.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// No address resolves for the device hostname, in either family.
    #[error("No reverse found for host {host}")]
    NoReverseFound {
        /// The hostname that was looked up.
        host: String,
    },

    /// The device does not expose a serial number.
    #[error("Device {host} not supported")]
    DeviceNotSupported {
        /// The device hostname.
        host: String,
    },

    /// A baseline driver or capability provider call failed.
    #[error("Driver operation failed: {operation}: {message}")]
    Driver {
        /// The operation that failed (e.g. "get_interfaces").
        operation: String,
        /// Error message.
        message: String,
    },

    /// Management session misuse or failure.
    #[error("Session error on {host}: {message}")]
    Session {
        /// The device hostname.
        host: String,
        /// Error message.
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    Config {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// A snapshot file could not be read.
    #[error("Failed to read snapshot file {path}: {source}")]
    Snapshot {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// A JSON document could not be decoded.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        /// The offending file.
        path: PathBuf,
        /// The decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// A YAML document could not be decoded.
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A device returned a value that does not parse.
    #[error("Invalid device value: {0}")]
    Parse(#[from] ParseError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl InventoryError {
    /// Creates a driver error.
    pub fn driver(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Driver {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a session error.
    pub fn session(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Session {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true for the errors a poll recovers from by omitting a field.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            InventoryError::NoReverseFound { .. } | InventoryError::DeviceNotSupported { .. }
        )
    }
}
