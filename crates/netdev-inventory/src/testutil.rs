//! In-crate fakes for unit tests.

use std::cell::Cell;
use std::collections::BTreeMap;

use crate::capability::{CapabilityProvider, LagMembership};
use crate::driver::{BaselineDriver, Facts, GenericNeighborTable, InterfaceTable, IpTable};
use crate::error::{InventoryError, InventoryResult};
use crate::model::{InterfaceMap, NeighborRecord};
use crate::support::Support;
use crate::vendors::abbreviate_interface;

/// Capability provider backed by optional tables. `None` means unsupported.
#[derive(Default)]
pub struct TableCapabilities {
    pub types: Option<BTreeMap<String, String>>,
    pub modes: Option<BTreeMap<String, String>>,
    pub access_vlans: Option<BTreeMap<String, u16>>,
    pub tagged_vlans: Option<BTreeMap<String, Vec<u16>>>,
    pub native_vlans: Option<BTreeMap<String, u16>>,
    pub lags: Option<LagMembership>,
    pub lldp: Option<Vec<NeighborRecord>>,
    pub cdp: Option<Vec<NeighborRecord>>,
    pub abbreviate: bool,
    /// Interface whose queries fail with a driver error
    pub failing_interface: Option<String>,
    pub lldp_calls: Cell<usize>,
    pub cdp_calls: Cell<usize>,
}

pub fn entries<V: Clone>(entries: &[(&str, V)]) -> Option<BTreeMap<String, V>> {
    Some(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )
}

pub fn strings(entries: &[(&str, &str)]) -> Option<BTreeMap<String, String>> {
    Some(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

impl TableCapabilities {
    fn check(&self, name: &str) -> InventoryResult<()> {
        if self.failing_interface.as_deref() == Some(name) {
            return Err(InventoryError::driver("interface query", "timed out"));
        }
        Ok(())
    }
}

fn lookup<V: Clone>(table: &Option<BTreeMap<String, V>>, name: &str) -> Support<Option<V>> {
    match table {
        Some(table) => Support::Supported(table.get(name).cloned()),
        None => Support::Unsupported,
    }
}

impl CapabilityProvider for TableCapabilities {
    fn interface_type(&self, name: &str) -> InventoryResult<Support<String>> {
        self.check(name)?;
        Ok(lookup(&self.types, name).map(|t| t.unwrap_or_else(|| "Other".to_string())))
    }

    fn interface_mode(&self, name: &str) -> InventoryResult<Support<Option<String>>> {
        self.check(name)?;
        Ok(lookup(&self.modes, name))
    }

    fn interface_access_vlan(&self, name: &str) -> InventoryResult<Support<Option<u16>>> {
        self.check(name)?;
        Ok(lookup(&self.access_vlans, name))
    }

    fn interface_tagged_vlans(&self, name: &str) -> InventoryResult<Support<Option<Vec<u16>>>> {
        self.check(name)?;
        Ok(lookup(&self.tagged_vlans, name))
    }

    fn interface_native_vlan(&self, name: &str) -> InventoryResult<Support<Option<u16>>> {
        self.check(name)?;
        Ok(lookup(&self.native_vlans, name))
    }

    fn lag_membership(&self, _interfaces: &InterfaceMap) -> InventoryResult<Support<LagMembership>> {
        Ok(self.lags.clone().into())
    }

    fn detailed_lldp_neighbors(&self) -> InventoryResult<Support<Vec<NeighborRecord>>> {
        self.lldp_calls.set(self.lldp_calls.get() + 1);
        Ok(self.lldp.clone().into())
    }

    fn detailed_cdp_neighbors(&self) -> InventoryResult<Support<Vec<NeighborRecord>>> {
        self.cdp_calls.set(self.cdp_calls.get() + 1);
        Ok(self.cdp.clone().into())
    }

    fn abbreviate_port_name(&self, name: &str) -> Support<String> {
        if self.abbreviate {
            Support::Supported(abbreviate_interface(name))
        } else {
            Support::Unsupported
        }
    }
}

/// Baseline driver backed by in-memory tables.
#[derive(Default)]
pub struct TableDriver {
    pub open: bool,
    /// `None` makes `facts()` fail
    pub facts: Option<Facts>,
    pub interfaces: InterfaceTable,
    pub ips: IpTable,
    pub neighbors: GenericNeighborTable,
    pub fail_interfaces: bool,
    pub neighbor_calls: Cell<usize>,
    pub closes: usize,
}

impl BaselineDriver for TableDriver {
    fn hostname(&self) -> &str {
        "sw1.example.net"
    }

    fn open(&mut self) -> InventoryResult<()> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> InventoryResult<()> {
        self.open = false;
        self.closes += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn facts(&self) -> InventoryResult<Facts> {
        self.facts
            .clone()
            .ok_or_else(|| InventoryError::driver("get_facts", "command rejected"))
    }

    fn interfaces(&self) -> InventoryResult<InterfaceTable> {
        if self.fail_interfaces {
            return Err(InventoryError::driver("get_interfaces", "connection reset"));
        }
        Ok(self.interfaces.clone())
    }

    fn interface_ip_table(&self) -> InventoryResult<IpTable> {
        Ok(self.ips.clone())
    }

    fn generic_neighbors(&self) -> InventoryResult<GenericNeighborTable> {
        self.neighbor_calls.set(self.neighbor_calls.get() + 1);
        Ok(self.neighbors.clone())
    }
}
