//! Baseline driver contract: vendor-neutral device telemetry.
//!
//! Every method performs blocking I/O against the device. Errors are
//! returned as [`InventoryError`] and are never recovered by the engine
//! except where the poll orchestrator documents it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::InventoryResult;

/// Device facts. Only the serial number is consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facts {
    #[serde(default)]
    pub serial_number: Option<String>,

    #[serde(default)]
    pub hostname: Option<String>,

    #[serde(default)]
    pub vendor: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub os_version: Option<String>,
}

/// One row of the device interface table, keyed by interface name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInterfaceSample {
    #[serde(rename = "is_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub description: Option<String>,

    /// Unvalidated, as reported by the device
    #[serde(default)]
    pub mac_address: Option<String>,

    #[serde(default)]
    pub mtu: Option<u32>,
}

impl RawInterfaceSample {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac_address = Some(mac.into());
        self
    }

    pub fn with_mtu(mut self, mtu: u32) -> Self {
        self.mtu = Some(mtu);
        self
    }
}

/// Interface name → raw sample, iterated in name order.
pub type InterfaceTable = BTreeMap<String, RawInterfaceSample>;

/// Prefix length attached to a configured address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixInfo {
    pub prefix_length: u8,
}

/// Address string → prefix, in the order the device listed them.
///
/// Addresses stay unparsed here; a device may report forms such as scoped
/// link-local addresses (`fe80::1%vlan1`) that the enricher normalizes.
pub type AddressEntries = Vec<(String, PrefixInfo)>;

/// Addresses configured on one interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceAddresses {
    #[serde(default, with = "ordered_entries")]
    pub ipv4: AddressEntries,

    #[serde(default, with = "ordered_entries")]
    pub ipv6: AddressEntries,
}

impl InterfaceAddresses {
    /// Returns the prefix length listed for `address`.
    pub fn prefix_of(&self, address: &str) -> Option<u8> {
        self.ipv4
            .iter()
            .chain(&self.ipv6)
            .find(|(addr, _)| addr == address)
            .map(|(_, info)| info.prefix_length)
    }
}

/// A JSON object read into a list, keeping document order.
mod ordered_entries {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};

    use super::{AddressEntries, PrefixInfo};

    pub fn serialize<S: Serializer>(entries: &AddressEntries, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(entries.iter().map(|(addr, info)| (addr, info)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AddressEntries, D::Error> {
        deserializer.deserialize_map(EntriesVisitor)
    }

    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = AddressEntries;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of address to prefix length")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((addr, info)) = map.next_entry::<String, PrefixInfo>()? {
                entries.push((addr, info));
            }
            Ok(entries)
        }
    }
}

/// Interface name → configured addresses.
pub type IpTable = BTreeMap<String, InterfaceAddresses>;

/// A neighbor entry from the vendor-neutral LLDP table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericNeighbor {
    pub hostname: String,
    pub port: String,
}

/// Local port → neighbors seen on it.
pub type GenericNeighborTable = BTreeMap<String, Vec<GenericNeighbor>>;

/// Vendor-neutral telemetry source for one device.
pub trait BaselineDriver {
    /// Name used in logs and errors.
    fn hostname(&self) -> &str;

    /// Establishes the management session.
    fn open(&mut self) -> InventoryResult<()>;

    /// Tears the management session down.
    fn close(&mut self) -> InventoryResult<()>;

    /// Returns true while a session is established.
    fn is_open(&self) -> bool;

    fn facts(&self) -> InventoryResult<Facts>;

    fn interfaces(&self) -> InventoryResult<InterfaceTable>;

    fn interface_ip_table(&self) -> InventoryResult<IpTable>;

    fn generic_neighbors(&self) -> InventoryResult<GenericNeighborTable>;
}
