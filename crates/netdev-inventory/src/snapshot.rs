//! File-backed device.
//!
//! A snapshot directory holds the JSON answers of one device:
//!
//! ```text
//! get_facts.json          baseline facts
//! get_interfaces.json     baseline interface table
//! get_interfaces_ip.json  baseline IP table
//! get_lldp_neighbors.json baseline LLDP table
//! capabilities.json       optional vendor answers
//! ```
//!
//! Baseline files are read on every call, like a live device answering
//! every command. `capabilities.json` is loaded once when the session opens;
//! a section missing from it means the vendor does not support that query.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use netdev_types::VlanId;

use crate::capability::{CapabilityProvider, LagMembership, VendorDriver, VendorFamily};
use crate::constants::{snapshot_files, TYPE_OTHER, TYPE_VIRTUAL};
use crate::driver::{BaselineDriver, Facts, GenericNeighborTable, InterfaceTable, IpTable};
use crate::error::{InventoryError, InventoryResult};
use crate::model::{InterfaceMap, NeighborRecord};
use crate::subintf::fold_to_parent;
use crate::support::Support;
use crate::vendors::{abbreviate_interface, expand_port_list, iftype, strip_device_serial};

/// Port type details reported for one interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransceiverInfo {
    /// Transceiver part number
    #[serde(default)]
    pub partnum: Option<String>,

    /// Port type string
    #[serde(default, rename = "type")]
    pub port_type: Option<String>,

    /// Speed in Mb/s
    #[serde(default)]
    pub speed: Option<u32>,
}

/// Member ports of a VLAN, as one NX-OS port list or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortList {
    One(String),
    Many(Vec<String>),
}

impl PortList {
    pub fn ports(&self) -> Vec<String> {
        match self {
            PortList::One(list) => expand_port_list(list),
            PortList::Many(lists) => lists.iter().flat_map(|l| expand_port_list(l)).collect(),
        }
    }
}

/// Vendor answers of a snapshot. `None` sections are unsupported queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilitySnapshot {
    pub interface_types: Option<BTreeMap<String, String>>,
    pub transceivers: Option<BTreeMap<String, TransceiverInfo>>,
    pub interface_modes: Option<BTreeMap<String, Option<String>>>,
    pub access_vlans: Option<BTreeMap<String, u16>>,
    pub native_vlans: Option<BTreeMap<String, u16>>,
    pub tagged_vlans: Option<BTreeMap<String, Vec<u16>>>,
    /// VLAN → member ports, used when `tagged_vlans` is absent
    pub vlans: Option<BTreeMap<VlanId, PortList>>,
    pub lag_members: Option<LagMembership>,
    pub lldp_neighbors: Option<Vec<NeighborRecord>>,
    pub cdp_neighbors: Option<Vec<NeighborRecord>>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> InventoryResult<T> {
    let content = fs::read_to_string(path).map_err(|source| InventoryError::Snapshot {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| InventoryError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// A device answering from a snapshot directory.
#[derive(Debug)]
pub struct SnapshotDevice {
    hostname: String,
    dir: PathBuf,
    family: VendorFamily,
    capabilities: CapabilitySnapshot,
    open: bool,
}

impl SnapshotDevice {
    pub fn new(hostname: impl Into<String>, dir: impl Into<PathBuf>, vendor: &VendorDriver) -> Self {
        Self {
            hostname: hostname.into(),
            dir: dir.into(),
            family: vendor.family(),
            capabilities: CapabilitySnapshot::default(),
            open: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_open(&self) -> InventoryResult<()> {
        if !self.open {
            return Err(InventoryError::session(&self.hostname, "session is not open"));
        }
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> InventoryResult<T> {
        self.ensure_open()?;
        read_json(&self.dir.join(file))
    }

    fn load_capabilities(&self) -> InventoryResult<CapabilitySnapshot> {
        let path = self.dir.join(snapshot_files::CAPABILITIES);
        match fs::metadata(&path) {
            Ok(_) => read_json(&path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(host = %self.hostname, "no capabilities in snapshot");
                Ok(CapabilitySnapshot::default())
            }
            Err(source) => Err(InventoryError::Snapshot { path, source }),
        }
    }

    /// Juniper reports logical units (`ae0.0`) where the physical port is
    /// meant.
    fn port_name<'a>(&self, name: &'a str) -> &'a str {
        match self.family {
            VendorFamily::Juniper => fold_to_parent(name),
            _ => name,
        }
    }
}

impl BaselineDriver for SnapshotDevice {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn open(&mut self) -> InventoryResult<()> {
        if self.open {
            return Err(InventoryError::session(&self.hostname, "session already open"));
        }
        if !self.dir.is_dir() {
            return Err(InventoryError::session(
                &self.hostname,
                format!("snapshot directory {} not found", self.dir.display()),
            ));
        }

        self.capabilities = self.load_capabilities()?;
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> InventoryResult<()> {
        self.ensure_open()?;
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn facts(&self) -> InventoryResult<Facts> {
        self.read(snapshot_files::FACTS)
    }

    fn interfaces(&self) -> InventoryResult<InterfaceTable> {
        self.read(snapshot_files::INTERFACES)
    }

    fn interface_ip_table(&self) -> InventoryResult<IpTable> {
        self.read(snapshot_files::INTERFACES_IP)
    }

    fn generic_neighbors(&self) -> InventoryResult<GenericNeighborTable> {
        self.read(snapshot_files::LLDP_NEIGHBORS)
    }
}

impl CapabilityProvider for SnapshotDevice {
    fn interface_type(&self, name: &str) -> InventoryResult<Support<String>> {
        let caps = &self.capabilities;
        if caps.interface_types.is_none() && caps.transceivers.is_none() {
            return Ok(Support::Unsupported);
        }

        if let Some(explicit) = caps.interface_types.as_ref().and_then(|t| t.get(name)) {
            return Ok(Support::Supported(explicit.clone()));
        }

        let resolved = match caps.transceivers.as_ref().and_then(|t| t.get(name)) {
            Some(info) => iftype::classify_interface(
                self.family,
                name,
                info.partnum.as_deref(),
                info.port_type.as_deref(),
                info.speed,
            ),
            None if iftype::name_implies_virtual(self.family, name) => {
                TYPE_VIRTUAL.to_string()
            }
            None => TYPE_OTHER.to_string(),
        };

        Ok(Support::Supported(resolved))
    }

    fn interface_mode(&self, name: &str) -> InventoryResult<Support<Option<String>>> {
        Ok(self
            .capabilities
            .interface_modes
            .as_ref()
            .map(|modes| modes.get(name).cloned().flatten())
            .into())
    }

    fn interface_access_vlan(&self, name: &str) -> InventoryResult<Support<Option<u16>>> {
        Ok(self
            .capabilities
            .access_vlans
            .as_ref()
            .map(|vlans| vlans.get(name).copied())
            .into())
    }

    fn interface_tagged_vlans(&self, name: &str) -> InventoryResult<Support<Option<Vec<u16>>>> {
        let caps = &self.capabilities;

        if let Some(tagged) = &caps.tagged_vlans {
            return Ok(Support::Supported(tagged.get(name).cloned()));
        }

        let Some(vlans) = &caps.vlans else {
            return Ok(Support::Unsupported);
        };

        let member_of: Vec<u16> = vlans
            .iter()
            .filter(|(_, ports)| ports.ports().iter().any(|port| port == name))
            .map(|(vid, _)| vid.as_u16())
            .collect();

        Ok(Support::Supported(
            (!member_of.is_empty()).then_some(member_of),
        ))
    }

    fn interface_native_vlan(&self, name: &str) -> InventoryResult<Support<Option<u16>>> {
        Ok(self
            .capabilities
            .native_vlans
            .as_ref()
            .map(|vlans| vlans.get(name).copied())
            .into())
    }

    fn lag_membership(&self, interfaces: &InterfaceMap) -> InventoryResult<Support<LagMembership>> {
        let Some(members) = &self.capabilities.lag_members else {
            return Ok(Support::Unsupported);
        };

        let membership = members
            .iter()
            .filter(|(member, _)| interfaces.contains_key(member.as_str()))
            .map(|(member, lag)| (member.clone(), self.port_name(lag).to_string()))
            .collect();

        Ok(Support::Supported(membership))
    }

    fn detailed_lldp_neighbors(&self) -> InventoryResult<Support<Vec<NeighborRecord>>> {
        let Some(neighbors) = &self.capabilities.lldp_neighbors else {
            return Ok(Support::Unsupported);
        };

        Ok(Support::Supported(
            neighbors
                .iter()
                .map(|n| {
                    let mut n = n.clone();
                    n.local_port = self.port_name(&n.local_port).to_string();
                    n.port = self.port_name(&n.port).to_string();
                    n
                })
                .collect(),
        ))
    }

    fn detailed_cdp_neighbors(&self) -> InventoryResult<Support<Vec<NeighborRecord>>> {
        let Some(neighbors) = &self.capabilities.cdp_neighbors else {
            return Ok(Support::Unsupported);
        };

        Ok(Support::Supported(
            neighbors
                .iter()
                .map(|n| {
                    let mut n = n.clone();
                    n.hostname = n.hostname.map(|h| strip_device_serial(&h).to_string());
                    n
                })
                .collect(),
        ))
    }

    fn abbreviate_port_name(&self, name: &str) -> Support<String> {
        match self.family {
            VendorFamily::Cisco => Support::Supported(abbreviate_interface(name)),
            _ => Support::Unsupported,
        }
    }
}
