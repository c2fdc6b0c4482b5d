//! L3 address enrichment.
//!
//! Addresses of a sub-interface belong to its parent. Within one interface,
//! IPv4 addresses are listed before IPv6, each in device order, and entries
//! are appended to whatever the interface already carries.

use std::collections::BTreeMap;
use std::net::IpAddr;

use tracing::{debug, warn};

use netdev_types::IpInterface;

use crate::driver::{InterfaceAddresses, IpTable};
use crate::model::InterfaceMap;
use crate::subintf::fold_to_parent;

/// Interface name → configured addresses.
pub type AddressMap = BTreeMap<String, Vec<IpInterface>>;

/// Parses one listed address. A scope suffix (`fe80::1%vlan1`) is dropped.
fn parse_entry(address: &str, prefix_length: u8) -> Option<IpInterface> {
    let plain = address.split('%').next().unwrap_or(address).trim();
    let parsed = plain
        .parse::<IpAddr>()
        .ok()
        .and_then(|addr| IpInterface::new(addr, prefix_length).ok());

    if parsed.is_none() {
        warn!(address = %address, prefix_length, "skipping unparsable interface address");
    }
    parsed
}

fn interface_addresses(addresses: &InterfaceAddresses) -> impl Iterator<Item = IpInterface> + '_ {
    addresses
        .ipv4
        .iter()
        .chain(&addresses.ipv6)
        .filter_map(|(addr, info)| parse_entry(addr, info.prefix_length))
}

/// Builds an address map from scratch, creating keys as they appear.
pub fn address_map(table: &IpTable) -> AddressMap {
    let mut map = AddressMap::new();

    for (name, addresses) in table {
        let parent = fold_to_parent(name);
        map.entry(parent.to_string())
            .or_default()
            .extend(interface_addresses(addresses));
    }

    map
}

/// Appends addresses onto an already classified interface map.
///
/// Addresses of interfaces that are not in the map are dropped; no new
/// interface is ever created here.
pub fn enrich_interfaces(interfaces: &mut InterfaceMap, table: &IpTable) {
    for (name, addresses) in table {
        let parent = fold_to_parent(name);
        let Some(intf) = interfaces.get_mut(parent) else {
            debug!(interface = %name, "addresses for unknown interface dropped");
            continue;
        };
        intf.ip.extend(interface_addresses(addresses));
    }
}
