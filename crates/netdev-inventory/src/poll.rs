//! Per-device poll orchestration.
//!
//! A poll runs in a fixed order:
//!
//! 1. Primary addresses from a hostname lookup (recovered on failure)
//! 2. Serial number from the device facts (recovered on failure)
//! 3. Interfaces: classify, native VLANs, LAGs, addresses (never recovered)
//!
//! Neighbor discovery is a separate operation, see [`DevicePoller::neighbors`].

use tracing::{debug, error, info, instrument};

use crate::addressing::enrich_interfaces;
use crate::capability::{CapabilityProvider, VendorDriver};
use crate::classifier::classify_interfaces;
use crate::driver::BaselineDriver;
use crate::error::{InventoryError, InventoryResult};
use crate::lag::resolve_lags;
use crate::model::{DeviceRecord, DiscoveryMode, InterfaceMap};
use crate::neighbors::NeighborStream;
use crate::resolve::{resolve_primary_ips, AddressResolver, PrimaryIps};
use crate::vlan::resolve_native_vlans;

/// What the poller needs to know about the device besides its drivers.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Configured device name
    pub hostname: String,
    /// Management address the driver connects to
    pub target: String,
    pub vendor: VendorDriver,
    pub discovery: DiscoveryMode,
    /// Domain suffixes stripped from neighbor hostnames
    pub remove_domains: Vec<String>,
}

impl PollSettings {
    pub fn new(hostname: impl Into<String>, vendor: VendorDriver) -> Self {
        let hostname = hostname.into();
        Self {
            target: hostname.clone(),
            hostname,
            vendor,
            discovery: DiscoveryMode::default(),
            remove_domains: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_discovery(mut self, discovery: DiscoveryMode) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_remove_domains(mut self, domains: Vec<String>) -> Self {
        self.remove_domains = domains;
        self
    }
}

/// Polls one device over an already opened session.
///
/// Holds no state of its own between calls; every operation queries the
/// device again.
pub struct DevicePoller<'a> {
    driver: &'a dyn BaselineDriver,
    caps: &'a dyn CapabilityProvider,
    resolver: &'a dyn AddressResolver,
    settings: &'a PollSettings,
}

impl<'a> DevicePoller<'a> {
    pub fn new(
        driver: &'a dyn BaselineDriver,
        caps: &'a dyn CapabilityProvider,
        resolver: &'a dyn AddressResolver,
        settings: &'a PollSettings,
    ) -> Self {
        Self {
            driver,
            caps,
            resolver,
            settings,
        }
    }

    /// Builds the inventory record of the device.
    ///
    /// A missing primary address or serial number only omits the field.
    /// Any failure while assembling interfaces aborts the poll.
    #[instrument(skip(self), fields(host = %self.settings.hostname))]
    pub fn poll(&self) -> InventoryResult<DeviceRecord> {
        let mut record = DeviceRecord::default();

        debug!("resolving primary addresses");
        match self.primary_ips() {
            Ok(ips) => {
                record.primary_ip4 = ips.ipv4;
                record.primary_ip6 = ips.ipv6;
            }
            Err(e) if e.is_recoverable() => {
                error!(error = %e, "cannot fill primary ip, no reverse found");
            }
            Err(e) => return Err(e),
        }

        match self.serial() {
            Ok(serial) => record.serial = serial,
            Err(e) if e.is_recoverable() => {
                error!(error = %e, "cannot fetch serial");
            }
            Err(e) => return Err(e),
        }

        debug!("collecting interfaces");
        record.interfaces = self.interfaces()?;

        info!(interfaces = record.interfaces.len(), "device polled");
        Ok(record)
    }

    /// Primary addresses from a lookup of the device hostname.
    pub fn primary_ips(&self) -> InventoryResult<PrimaryIps> {
        resolve_primary_ips(self.resolver, &self.settings.hostname)
    }

    /// Serial number from the device facts. An empty serial is `None`.
    pub fn serial(&self) -> InventoryResult<Option<String>> {
        let facts = self.driver.facts().map_err(|e| {
            debug!(host = %self.settings.hostname, error = %e, "facts unavailable");
            InventoryError::DeviceNotSupported {
                host: self.settings.hostname.clone(),
            }
        })?;

        Ok(facts.serial_number.filter(|serial| !serial.is_empty()))
    }

    /// Runs the interface pipeline: classifier, VLAN resolver, LAG resolver
    /// and IP enricher, in that order.
    pub fn interfaces(&self) -> InventoryResult<InterfaceMap> {
        let table = self.driver.interfaces()?;
        let mut interfaces = classify_interfaces(&table, self.caps)?;

        resolve_native_vlans(&mut interfaces, self.caps)?;
        resolve_lags(&mut interfaces, self.caps)?;

        debug!(host = %self.settings.hostname, "collecting interface addresses");
        let ip_table = self.driver.interface_ip_table()?;
        enrich_interfaces(&mut interfaces, &ip_table);

        Ok(interfaces)
    }

    /// Neighbor records for the configured discovery mode.
    pub fn neighbors(&self) -> NeighborStream<'a> {
        NeighborStream::new(
            self.driver,
            self.caps,
            self.settings.discovery,
            &self.settings.vendor,
        )
        .with_remove_domains(&self.settings.remove_domains)
    }
}
