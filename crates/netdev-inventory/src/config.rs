//! Application configuration and device list loading.
//!
//! The application config is looked up in this order:
//! 1. the path given on the command line
//! 2. the `CONFIG_PATH` environment variable
//! 3. `$XDG_CONFIG_HOME/netdev-inventory/config.yml`
//! 4. `/etc/netdev-inventory/config.yml`
//!
//! An explicitly requested file must exist. When neither search location
//! has one, defaults apply.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::capability::VendorDriver;
use crate::constants::{
    APP_NAME, CONFIG_FILENAME, CONFIG_PATH_ENV, DEFAULT_LOG_LEVEL, DEFAULT_THREADS,
    SITE_CONFIG_DIR,
};
use crate::error::{InventoryError, InventoryResult};
use crate::model::DiscoveryMode;
use crate::poll::PollSettings;

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log level when neither `-v` nor `RUST_LOG` is given
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Devices polled in parallel
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Domain suffixes stripped from neighbor hostnames
    #[serde(default)]
    pub remove_domains: Vec<String>,
}

fn default_loglevel() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_threads() -> usize {
    DEFAULT_THREADS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            loglevel: default_loglevel(),
            threads: default_threads(),
            remove_domains: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Loads a config file that must exist.
    pub fn load(path: impl AsRef<Path>) -> InventoryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            InventoryError::config(
                "config",
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;

        Self::from_yaml(&content)
    }

    /// Loads a config file, falling back to defaults if it does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> InventoryResult<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => Self::from_yaml(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(InventoryError::Io(e)),
        }
    }

    /// Parses and validates a YAML document. An empty document is the
    /// default config.
    pub fn from_yaml(content: &str) -> InventoryResult<Self> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Finds and loads the config from the standard locations.
    pub fn locate(custom: Option<&Path>) -> InventoryResult<Self> {
        let from_env = env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::locate_in(custom, from_env.as_deref(), &search_paths())
    }

    fn locate_in(
        custom: Option<&Path>,
        from_env: Option<&Path>,
        search: &[PathBuf],
    ) -> InventoryResult<Self> {
        if let Some(path) = custom.or(from_env) {
            return Self::load(path);
        }

        match search.iter().find(|path| path.is_file()) {
            Some(path) => {
                debug!(path = %path.display(), "using config file");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Validates configuration.
    pub fn validate(&self) -> InventoryResult<()> {
        if tracing::Level::from_str(&self.loglevel).is_err() {
            return Err(InventoryError::config(
                "loglevel",
                format!("unknown log level {:?}", self.loglevel),
            ));
        }

        if self.threads == 0 {
            return Err(InventoryError::config("threads", "must be > 0"));
        }

        Ok(())
    }
}

/// Per-user then site-wide config file locations.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    let user_dir = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")));
    if let Some(dir) = user_dir {
        paths.push(dir.join(APP_NAME).join(CONFIG_FILENAME));
    }

    paths.push(
        Path::new(SITE_CONFIG_DIR)
            .join(APP_NAME)
            .join(CONFIG_FILENAME),
    );
    paths
}

/// One device of the device list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Management address override, defaults to the device name
    #[serde(default)]
    pub target: Option<String>,

    pub driver: String,

    #[serde(default)]
    pub discovery_protocol: Option<DiscoveryMode>,

    /// Snapshot directory, relative to the device list file
    #[serde(default)]
    pub snapshot: Option<PathBuf>,

    /// Driver-specific connection arguments
    #[serde(default)]
    pub optional_args: BTreeMap<String, serde_yaml::Value>,
}

/// A device ready to be polled.
#[derive(Debug, Clone)]
pub struct DeviceSpec {
    pub name: String,
    pub vendor: VendorDriver,
    pub snapshot: Option<PathBuf>,
    pub settings: PollSettings,
}

/// Devices to poll, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct DeviceList {
    pub devices: BTreeMap<String, DeviceEntry>,
    base_dir: PathBuf,
}

impl DeviceList {
    pub fn load(path: impl AsRef<Path>) -> InventoryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            InventoryError::config(
                "devices",
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;

        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_yaml(&content, base_dir)
    }

    pub fn from_yaml(content: &str, base_dir: impl Into<PathBuf>) -> InventoryResult<Self> {
        let devices: BTreeMap<String, DeviceEntry> = serde_yaml::from_str(content)?;

        for (name, entry) in &devices {
            if entry.driver.trim().is_empty() {
                return Err(InventoryError::config(
                    "driver",
                    format!("device {} has no driver", name),
                ));
            }
        }

        Ok(Self {
            devices,
            base_dir: base_dir.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Resolves every entry into a device spec, in name order.
    pub fn specs(&self, config: &AppConfig) -> Vec<DeviceSpec> {
        self.devices
            .iter()
            .map(|(name, entry)| {
                let vendor = entry
                    .driver
                    .parse::<VendorDriver>()
                    .unwrap_or_else(|never| match never {});
                let target = entry.target.clone().unwrap_or_else(|| name.clone());
                let settings = PollSettings::new(name.clone(), vendor.clone())
                    .with_target(target)
                    .with_discovery(entry.discovery_protocol.unwrap_or_default())
                    .with_remove_domains(config.remove_domains.clone());

                DeviceSpec {
                    name: name.clone(),
                    vendor,
                    snapshot: entry.snapshot.as_ref().map(|dir| self.base_dir.join(dir)),
                    settings,
                }
            })
            .collect()
    }
}
