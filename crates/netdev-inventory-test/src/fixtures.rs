//! Test fixtures for device polling
//!
//! [`FakeDevice`] answers both the baseline driver and the capability
//! provider from in-memory tables. A capability section stays unsupported
//! until the first entry is added to it, or until it is declared supported.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;

use netdev_inventory::constants::{snapshot_files, TYPE_OTHER};
use netdev_inventory::snapshot::CapabilitySnapshot;
use netdev_inventory::vendors::abbreviate_interface;
use netdev_inventory::{
    AddressResolver, BaselineDriver, CapabilityProvider, Facts, GenericNeighbor,
    GenericNeighborTable, InterfaceMap, InterfaceTable, InventoryError, InventoryResult, IpFamily,
    IpTable, LagMembership, NeighborRecord, PrefixInfo, RawInterfaceSample, Support,
};

/// Every device query, for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    Open,
    Close,
    Facts,
    Interfaces,
    InterfaceIpTable,
    GenericNeighbors,
    InterfaceType,
    InterfaceMode,
    AccessVlan,
    TaggedVlans,
    NativeVlan,
    LagMembership,
    LldpNeighbors,
    CdpNeighbors,
}

impl Operation {
    /// Driver-style operation name used in injected errors.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Open => "open",
            Operation::Close => "close",
            Operation::Facts => "get_facts",
            Operation::Interfaces => "get_interfaces",
            Operation::InterfaceIpTable => "get_interfaces_ip",
            Operation::GenericNeighbors => "get_lldp_neighbors",
            Operation::InterfaceType => "get_interface_type",
            Operation::InterfaceMode => "get_interface_mode",
            Operation::AccessVlan => "get_access_vlan",
            Operation::TaggedVlans => "get_tagged_vlans",
            Operation::NativeVlan => "get_native_vlan",
            Operation::LagMembership => "get_lag_membership",
            Operation::LldpNeighbors => "get_lldp_neighbors_detail",
            Operation::CdpNeighbors => "get_cdp_neighbors_detail",
        }
    }
}

/// Vendor answers of a [`FakeDevice`]. `None` sections are unsupported.
#[derive(Debug, Clone, Default)]
pub struct FakeCapabilities {
    pub types: Option<BTreeMap<String, String>>,
    pub modes: Option<BTreeMap<String, String>>,
    pub access_vlans: Option<BTreeMap<String, u16>>,
    pub tagged_vlans: Option<BTreeMap<String, Vec<u16>>>,
    pub native_vlans: Option<BTreeMap<String, u16>>,
    pub lag_members: Option<LagMembership>,
    pub lldp: Option<Vec<NeighborRecord>>,
    pub cdp: Option<Vec<NeighborRecord>>,
    pub abbreviate: bool,
}

/// In-memory device implementing [`BaselineDriver`] and
/// [`CapabilityProvider`].
#[derive(Debug, Default)]
pub struct FakeDevice {
    hostname: String,
    open: bool,
    facts: Facts,
    interfaces: InterfaceTable,
    ips: IpTable,
    neighbors: GenericNeighborTable,
    pub caps: FakeCapabilities,
    failures: BTreeSet<Operation>,
    calls: RefCell<BTreeMap<Operation, usize>>,
}

impl FakeDevice {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Self::default()
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.facts.serial_number = Some(serial.into());
        self
    }

    pub fn with_interface(mut self, name: impl Into<String>, sample: RawInterfaceSample) -> Self {
        self.interfaces.insert(name.into(), sample);
        self
    }

    /// Adds an enabled interface with no other attributes.
    pub fn with_port(self, name: &str) -> Self {
        self.with_interface(name, RawInterfaceSample::new(true))
    }

    pub fn with_ipv4(mut self, name: &str, address: Ipv4Addr, prefix_length: u8) -> Self {
        self.ips
            .entry(name.to_string())
            .or_default()
            .ipv4
            .push((address.to_string(), PrefixInfo { prefix_length }));
        self
    }

    pub fn with_ipv6(mut self, name: &str, address: Ipv6Addr, prefix_length: u8) -> Self {
        self.ips
            .entry(name.to_string())
            .or_default()
            .ipv6
            .push((address.to_string(), PrefixInfo { prefix_length }));
        self
    }

    /// Adds a neighbor to the baseline LLDP table.
    pub fn with_generic_neighbor(mut self, local_port: &str, hostname: &str, port: &str) -> Self {
        self.neighbors
            .entry(local_port.to_string())
            .or_default()
            .push(GenericNeighbor {
                hostname: hostname.to_string(),
                port: port.to_string(),
            });
        self
    }

    pub fn with_type(mut self, name: &str, if_type: &str) -> Self {
        insert(&mut self.caps.types, name, if_type.to_string());
        self
    }

    pub fn with_mode(mut self, name: &str, mode: &str) -> Self {
        insert(&mut self.caps.modes, name, mode.to_string());
        self
    }

    pub fn with_access_vlan(mut self, name: &str, vlan: u16) -> Self {
        insert(&mut self.caps.access_vlans, name, vlan);
        self
    }

    pub fn with_tagged_vlans(mut self, name: &str, vlans: &[u16]) -> Self {
        insert(&mut self.caps.tagged_vlans, name, vlans.to_vec());
        self
    }

    pub fn with_native_vlan(mut self, name: &str, vlan: u16) -> Self {
        insert(&mut self.caps.native_vlans, name, vlan);
        self
    }

    pub fn with_lag_member(mut self, member: &str, lag: &str) -> Self {
        insert(&mut self.caps.lag_members, member, lag.to_string());
        self
    }

    pub fn with_lldp(mut self, record: NeighborRecord) -> Self {
        self.caps.lldp.get_or_insert_with(Vec::new).push(record);
        self
    }

    pub fn with_cdp(mut self, record: NeighborRecord) -> Self {
        self.caps.cdp.get_or_insert_with(Vec::new).push(record);
        self
    }

    /// Enables Cisco port-name abbreviation.
    pub fn with_abbreviation(mut self) -> Self {
        self.caps.abbreviate = true;
        self
    }

    /// Declares every capability section supported, empty where unset.
    pub fn with_all_capabilities(mut self) -> Self {
        let caps = &mut self.caps;
        caps.types.get_or_insert_with(BTreeMap::new);
        caps.modes.get_or_insert_with(BTreeMap::new);
        caps.access_vlans.get_or_insert_with(BTreeMap::new);
        caps.tagged_vlans.get_or_insert_with(BTreeMap::new);
        caps.native_vlans.get_or_insert_with(BTreeMap::new);
        caps.lag_members.get_or_insert_with(BTreeMap::new);
        caps.lldp.get_or_insert_with(Vec::new);
        caps.cdp.get_or_insert_with(Vec::new);
        self
    }

    /// Makes every call of `operation` fail with a driver error.
    pub fn failing(mut self, operation: Operation) -> Self {
        self.failures.insert(operation);
        self
    }

    /// Number of times `operation` was called.
    pub fn calls(&self, operation: Operation) -> usize {
        self.calls.borrow().get(&operation).copied().unwrap_or(0)
    }

    /// Writes the device as a snapshot directory readable by
    /// `SnapshotDevice`.
    pub fn write_snapshot(&self, dir: &Path) -> io::Result<()> {
        write_json(&dir.join(snapshot_files::FACTS), &self.facts)?;
        write_json(&dir.join(snapshot_files::INTERFACES), &self.interfaces)?;
        write_json(&dir.join(snapshot_files::INTERFACES_IP), &self.ips)?;
        write_json(&dir.join(snapshot_files::LLDP_NEIGHBORS), &self.neighbors)?;

        let caps = &self.caps;
        let snapshot = CapabilitySnapshot {
            interface_types: caps.types.clone(),
            interface_modes: caps.modes.as_ref().map(|modes| {
                modes
                    .iter()
                    .map(|(name, mode)| (name.clone(), Some(mode.clone())))
                    .collect()
            }),
            access_vlans: caps.access_vlans.clone(),
            native_vlans: caps.native_vlans.clone(),
            tagged_vlans: caps.tagged_vlans.clone(),
            lag_members: caps.lag_members.clone(),
            lldp_neighbors: caps.lldp.clone(),
            cdp_neighbors: caps.cdp.clone(),
            ..CapabilitySnapshot::default()
        };
        write_json(&dir.join(snapshot_files::CAPABILITIES), &snapshot)
    }

    fn record(&self, operation: Operation) -> InventoryResult<()> {
        *self.calls.borrow_mut().entry(operation).or_insert(0) += 1;
        if self.failures.contains(&operation) {
            return Err(InventoryError::driver(operation.name(), "injected failure"));
        }
        Ok(())
    }
}

fn insert<V>(section: &mut Option<BTreeMap<String, V>>, name: &str, value: V) {
    section
        .get_or_insert_with(BTreeMap::new)
        .insert(name.to_string(), value);
}

fn lookup<V: Clone>(section: &Option<BTreeMap<String, V>>, name: &str) -> Support<Option<V>> {
    section
        .as_ref()
        .map(|entries| entries.get(name).cloned())
        .into()
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    let content = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    fs::write(path, content)
}

impl BaselineDriver for FakeDevice {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn open(&mut self) -> InventoryResult<()> {
        self.record(Operation::Open)?;
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> InventoryResult<()> {
        self.open = false;
        self.record(Operation::Close)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn facts(&self) -> InventoryResult<Facts> {
        self.record(Operation::Facts)?;
        Ok(self.facts.clone())
    }

    fn interfaces(&self) -> InventoryResult<InterfaceTable> {
        self.record(Operation::Interfaces)?;
        Ok(self.interfaces.clone())
    }

    fn interface_ip_table(&self) -> InventoryResult<IpTable> {
        self.record(Operation::InterfaceIpTable)?;
        Ok(self.ips.clone())
    }

    fn generic_neighbors(&self) -> InventoryResult<GenericNeighborTable> {
        self.record(Operation::GenericNeighbors)?;
        Ok(self.neighbors.clone())
    }
}

impl CapabilityProvider for FakeDevice {
    fn interface_type(&self, name: &str) -> InventoryResult<Support<String>> {
        self.record(Operation::InterfaceType)?;
        Ok(lookup(&self.caps.types, name)
            .map(|if_type| if_type.unwrap_or_else(|| TYPE_OTHER.to_string())))
    }

    fn interface_mode(&self, name: &str) -> InventoryResult<Support<Option<String>>> {
        self.record(Operation::InterfaceMode)?;
        Ok(lookup(&self.caps.modes, name))
    }

    fn interface_access_vlan(&self, name: &str) -> InventoryResult<Support<Option<u16>>> {
        self.record(Operation::AccessVlan)?;
        Ok(lookup(&self.caps.access_vlans, name))
    }

    fn interface_tagged_vlans(&self, name: &str) -> InventoryResult<Support<Option<Vec<u16>>>> {
        self.record(Operation::TaggedVlans)?;
        Ok(lookup(&self.caps.tagged_vlans, name))
    }

    fn interface_native_vlan(&self, name: &str) -> InventoryResult<Support<Option<u16>>> {
        self.record(Operation::NativeVlan)?;
        Ok(lookup(&self.caps.native_vlans, name))
    }

    fn lag_membership(&self, interfaces: &InterfaceMap) -> InventoryResult<Support<LagMembership>> {
        self.record(Operation::LagMembership)?;
        Ok(self
            .caps
            .lag_members
            .as_ref()
            .map(|members| {
                members
                    .iter()
                    .filter(|(member, _)| interfaces.contains_key(member.as_str()))
                    .map(|(member, lag)| (member.clone(), lag.clone()))
                    .collect()
            })
            .into())
    }

    fn detailed_lldp_neighbors(&self) -> InventoryResult<Support<Vec<NeighborRecord>>> {
        self.record(Operation::LldpNeighbors)?;
        Ok(self.caps.lldp.clone().into())
    }

    fn detailed_cdp_neighbors(&self) -> InventoryResult<Support<Vec<NeighborRecord>>> {
        self.record(Operation::CdpNeighbors)?;
        Ok(self.caps.cdp.clone().into())
    }

    fn abbreviate_port_name(&self, name: &str) -> Support<String> {
        if self.caps.abbreviate {
            Support::Supported(abbreviate_interface(name))
        } else {
            Support::Unsupported
        }
    }
}

/// Resolver answering from a static host table.
#[derive(Debug, Clone, Default)]
pub struct FakeResolver {
    hosts: BTreeMap<String, Vec<IpAddr>>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: &str, addresses: &[IpAddr]) -> Self {
        self.hosts
            .entry(host.to_string())
            .or_default()
            .extend_from_slice(addresses);
        self
    }
}

impl AddressResolver for FakeResolver {
    fn resolve(&self, host: &str, family: IpFamily) -> io::Result<IpAddr> {
        self.hosts
            .get(host)
            .into_iter()
            .flatten()
            .find(|addr| match family {
                IpFamily::V4 => addr.is_ipv4(),
                IpFamily::V6 => addr.is_ipv6(),
            })
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("unknown host {}", host)))
    }
}

/// Neighbor record shorthand.
pub fn neighbor(local_port: &str, hostname: &str, port: &str) -> NeighborRecord {
    NeighborRecord::new(local_port, Some(hostname.to_string()), port)
}

/// Common device fixtures
pub mod device_fixtures {
    use super::*;

    /// NX-OS access switch: a trunk with a native VLAN, an access port,
    /// a LAG with one member and a routed subinterface.
    pub fn nxos_access_switch(hostname: &str) -> FakeDevice {
        FakeDevice::new(hostname)
            .with_serial("FDO21120U8N")
            .with_interface(
                "Ethernet1/1",
                RawInterfaceSample::new(true)
                    .with_description("uplink to core1")
                    .with_mac("00:11:22:aa:bb:01")
                    .with_mtu(9216),
            )
            .with_interface(
                "Ethernet1/2",
                RawInterfaceSample::new(true).with_mac("00:11:22:aa:bb:02"),
            )
            .with_interface("Ethernet1/3", RawInterfaceSample::new(false))
            .with_port("Ethernet1/4")
            .with_port("Ethernet1/4.100")
            .with_port("port-channel10")
            .with_port("Vlan10")
            .with_type("Ethernet1/1", "SFP+ (10GE)")
            .with_type("Vlan10", "Virtual")
            .with_mode("Ethernet1/1", "trunk")
            .with_mode("Ethernet1/2", "access")
            .with_mode("Ethernet1/3", "trunk")
            .with_access_vlan("Ethernet1/2", 20)
            .with_tagged_vlans("Ethernet1/1", &[10, 20, 99])
            .with_tagged_vlans("Ethernet1/3", &[10])
            .with_native_vlan("Ethernet1/1", 99)
            .with_native_vlan("Ethernet1/3", 1)
            .with_lag_member("Ethernet1/3", "Port-Channel10")
            .with_ipv4("Ethernet1/4.100", Ipv4Addr::new(10, 1, 0, 1), 30)
            .with_ipv4("Vlan10", Ipv4Addr::new(192, 0, 2, 1), 24)
            .with_ipv6("Vlan10", Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1), 64)
            .with_abbreviation()
    }

    /// Device with interfaces but no vendor capabilities at all.
    pub fn baseline_only(hostname: &str) -> FakeDevice {
        FakeDevice::new(hostname)
            .with_serial("JN11D3ADBEEF")
            .with_port("ge-0/0/0")
            .with_port("ge-0/0/1")
            .with_generic_neighbor("ge-0/0/0", "core1.example.net", "et-0/0/1")
    }
}
