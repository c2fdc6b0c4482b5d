//! Normalized inventory record types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use netdev_types::{InterfaceMode, IpInterface, MacAddress};

use crate::constants::{DESCRIPTION_MAX_CHARS, TYPE_OTHER};
use crate::error::InventoryError;

/// Interface name → normalized interface, iterated in name order.
pub type InterfaceMap = BTreeMap<String, NormalizedInterface>;

/// One interface of the final inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedInterface {
    /// Administrative state
    pub enabled: bool,

    /// Free-text description, at most 100 characters
    pub description: String,

    /// Validated MAC address
    pub mac_address: Option<MacAddress>,

    pub mtu: Option<u32>,

    /// Free-form classification, `"Other"` when unknown
    #[serde(rename = "type")]
    pub if_type: String,

    pub mode: Option<InterfaceMode>,

    pub untagged_vlan: Option<u16>,

    pub tagged_vlans: Vec<u16>,

    /// Owning LAG interface name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lag: Option<String>,

    /// Configured addresses, IPv4 and IPv6 mixed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip: Vec<IpInterface>,
}

impl NormalizedInterface {
    /// Creates an interface with the defaults every field starts from.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            description: String::new(),
            mac_address: None,
            mtu: None,
            if_type: TYPE_OTHER.to_string(),
            mode: None,
            untagged_vlan: None,
            tagged_vlans: Vec::new(),
            lag: None,
            ip: Vec::new(),
        }
    }

    /// Sets the description, truncated to the inventory limit.
    pub fn set_description(&mut self, description: Option<&str>) {
        self.description = truncate_description(description.unwrap_or_default());
    }

    /// Returns true if the interface is in tagged mode.
    pub fn is_tagged(&self) -> bool {
        matches!(self.mode, Some(InterfaceMode::Tagged))
    }
}

/// Truncates on character boundaries, never splitting a code point.
pub fn truncate_description(description: &str) -> String {
    description.chars().take(DESCRIPTION_MAX_CHARS).collect()
}

/// The canonical record handed to the inventory store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_ip4: Option<Ipv4Addr>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_ip6: Option<Ipv6Addr>,

    pub interfaces: InterfaceMap,
}

/// An L2 neighbor seen on a local port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborRecord {
    pub local_port: String,

    #[serde(default)]
    pub hostname: Option<String>,

    pub port: String,

    /// Chassis or management identifier, only known from vendor providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mgmt_id: Option<String>,
}

impl NeighborRecord {
    pub fn new(
        local_port: impl Into<String>,
        hostname: Option<String>,
        port: impl Into<String>,
    ) -> Self {
        Self {
            local_port: local_port.into(),
            hostname,
            port: port.into(),
            mgmt_id: None,
        }
    }

    pub fn with_mgmt_id(mut self, mgmt_id: impl Into<String>) -> Self {
        self.mgmt_id = Some(mgmt_id.into());
        self
    }

    /// Strips the first matching domain suffix from the neighbor hostname.
    ///
    /// Domains are given without the leading dot (`example.net`).
    pub fn strip_domains(&mut self, domains: &[String]) {
        let Some(hostname) = self.hostname.as_mut() else {
            return;
        };
        for domain in domains {
            let suffix = format!(".{}", domain.trim_start_matches('.'));
            if let Some(short) = hostname.strip_suffix(&suffix) {
                *hostname = short.to_string();
                return;
            }
        }
    }
}

/// Which neighbor discovery protocol(s) to consult.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    #[default]
    Lldp,
    Cdp,
    /// CDP merged with LLDP, for vendors that speak both
    Multiple,
}

impl DiscoveryMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiscoveryMode::Lldp => "lldp",
            DiscoveryMode::Cdp => "cdp",
            DiscoveryMode::Multiple => "multiple",
        }
    }
}

impl fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscoveryMode {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lldp" => Ok(DiscoveryMode::Lldp),
            "cdp" => Ok(DiscoveryMode::Cdp),
            "multiple" => Ok(DiscoveryMode::Multiple),
            other => Err(InventoryError::config(
                "discovery_protocol",
                format!("unknown discovery mode {:?}", other),
            )),
        }
    }
}
