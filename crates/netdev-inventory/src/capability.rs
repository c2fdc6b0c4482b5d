//! Vendor capability provider contract and driver registry.
//!
//! A capability provider answers the per-vendor questions the baseline
//! driver cannot: interface type, switchport mode, VLANs, LAG membership,
//! detailed neighbor tables. Every method defaults to
//! [`Support::Unsupported`], so a provider overrides only what its platform
//! can answer and [`StubCapabilities`] is simply an empty implementation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::constants::drivers;
use crate::error::InventoryResult;
use crate::model::{InterfaceMap, NeighborRecord};
use crate::support::Support;

/// Member interface name → LAG interface name, as the vendor spells it.
pub type LagMembership = BTreeMap<String, String>;

/// Optional, vendor-specific device queries.
///
/// The outer `Result` carries I/O failures, which abort the poll. The inner
/// [`Support`] says whether the vendor implements the query at all.
pub trait CapabilityProvider {
    /// Inventory type of an interface (`"SFP+ (10GE)"`, `"Virtual"`, ...).
    fn interface_type(&self, _name: &str) -> InventoryResult<Support<String>> {
        Ok(Support::Unsupported)
    }

    /// Raw administrative mode token: `access`, `static access`, `trunk`,
    /// or `None` when the interface is not a switchport.
    fn interface_mode(&self, _name: &str) -> InventoryResult<Support<Option<String>>> {
        Ok(Support::Unsupported)
    }

    fn interface_access_vlan(&self, _name: &str) -> InventoryResult<Support<Option<u16>>> {
        Ok(Support::Unsupported)
    }

    fn interface_tagged_vlans(&self, _name: &str) -> InventoryResult<Support<Option<Vec<u16>>>> {
        Ok(Support::Unsupported)
    }

    fn interface_native_vlan(&self, _name: &str) -> InventoryResult<Support<Option<u16>>> {
        Ok(Support::Unsupported)
    }

    /// LAG membership of the polled interfaces.
    fn lag_membership(&self, _interfaces: &InterfaceMap) -> InventoryResult<Support<LagMembership>> {
        Ok(Support::Unsupported)
    }

    fn detailed_lldp_neighbors(&self) -> InventoryResult<Support<Vec<NeighborRecord>>> {
        Ok(Support::Unsupported)
    }

    fn detailed_cdp_neighbors(&self) -> InventoryResult<Support<Vec<NeighborRecord>>> {
        Ok(Support::Unsupported)
    }

    /// Short form of a port name, used to match the same port across
    /// protocols that spell it differently.
    fn abbreviate_port_name(&self, _name: &str) -> Support<String> {
        Support::Unsupported
    }
}

/// Provider for platforms without a vendor implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubCapabilities;

impl CapabilityProvider for StubCapabilities {}

/// Platform family, selecting parsing and classification conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorFamily {
    Cisco,
    Juniper,
    Unknown,
}

/// Driver identifier from the device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VendorDriver {
    Nxos,
    NxosSsh,
    Ios,
    Junos,
    /// Any driver without vendor capabilities
    Other(String),
}

impl VendorDriver {
    /// Returns the configuration spelling of the driver.
    pub fn as_str(&self) -> &str {
        match self {
            VendorDriver::Nxos => drivers::NXOS,
            VendorDriver::NxosSsh => drivers::NXOS_SSH,
            VendorDriver::Ios => drivers::IOS,
            VendorDriver::Junos => drivers::JUNOS,
            VendorDriver::Other(name) => name,
        }
    }

    pub fn family(&self) -> VendorFamily {
        match self {
            VendorDriver::Nxos | VendorDriver::NxosSsh | VendorDriver::Ios => VendorFamily::Cisco,
            VendorDriver::Junos => VendorFamily::Juniper,
            VendorDriver::Other(_) => VendorFamily::Unknown,
        }
    }

    /// Returns true if the platform has a capability provider.
    pub fn has_capabilities(&self) -> bool {
        !matches!(self, VendorDriver::Other(_))
    }

    /// Returns true if `multiple` discovery mode applies to this driver.
    pub fn supports_multiple_discovery(&self) -> bool {
        matches!(
            self,
            VendorDriver::Ios | VendorDriver::Nxos | VendorDriver::NxosSsh
        )
    }

    /// Logs when the driver falls back to baseline-only features.
    pub fn log_support_level(&self, host: &str) {
        if !self.has_capabilities() {
            info!(
                host = %host,
                driver = %self,
                "driver is not fully supported, limited to baseline features"
            );
        }
    }
}

/// Returns the provider to use for `vendor`: `provider` itself when the
/// platform has a vendor implementation, [`StubCapabilities`] otherwise.
pub fn select_capabilities<'a>(
    vendor: &VendorDriver,
    host: &str,
    provider: &'a dyn CapabilityProvider,
) -> &'a dyn CapabilityProvider {
    vendor.log_support_level(host);
    if vendor.has_capabilities() {
        provider
    } else {
        &StubCapabilities
    }
}

impl fmt::Display for VendorDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VendorDriver {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            drivers::NXOS => VendorDriver::Nxos,
            drivers::NXOS_SSH => VendorDriver::NxosSsh,
            drivers::IOS => VendorDriver::Ios,
            drivers::JUNOS => VendorDriver::Junos,
            other => VendorDriver::Other(other.to_string()),
        })
    }
}
