//! Neighbor discovery merging.
//!
//! [`NeighborStream`] is a pull-based iterator over the neighbor records of
//! one device. Upstream tables are queried lazily, when the stream first
//! needs them, so building a stream costs nothing and a second stream
//! queries the device again.
//!
//! | mode                       | records                                  |
//! |----------------------------|------------------------------------------|
//! | `cdp`                      | provider CDP, nothing if unsupported     |
//! | `multiple` (allow-listed)  | CDP, then LLDP on ports CDP did not cover |
//! | anything else              | provider LLDP, else baseline LLDP        |

use std::collections::HashSet;

use tracing::{debug, error};

use crate::capability::{CapabilityProvider, VendorDriver};
use crate::driver::BaselineDriver;
use crate::error::{InventoryError, InventoryResult};
use crate::model::{DiscoveryMode, NeighborRecord};
use crate::support::Support;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    CdpOnly,
    Merged,
    LldpOnly,
}

impl Plan {
    fn select(mode: DiscoveryMode, vendor: &VendorDriver) -> Self {
        match mode {
            DiscoveryMode::Cdp => Plan::CdpOnly,
            DiscoveryMode::Multiple if vendor.supports_multiple_discovery() => Plan::Merged,
            DiscoveryMode::Multiple => {
                debug!(driver = %vendor, "multiple discovery not available, using lldp");
                Plan::LldpOnly
            }
            DiscoveryMode::Lldp => Plan::LldpOnly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    Cdp,
    Lldp,
    Done,
}

/// Lazy, finite, single-pass sequence of neighbor records.
pub struct NeighborStream<'a> {
    driver: &'a dyn BaselineDriver,
    caps: &'a dyn CapabilityProvider,
    plan: Plan,
    stage: Stage,
    pending: std::vec::IntoIter<NeighborRecord>,
    /// Lowercased short names of the ports CDP reported
    cdp_ports: HashSet<String>,
    remove_domains: &'a [String],
}

impl<'a> NeighborStream<'a> {
    pub fn new(
        driver: &'a dyn BaselineDriver,
        caps: &'a dyn CapabilityProvider,
        mode: DiscoveryMode,
        vendor: &VendorDriver,
    ) -> Self {
        Self {
            driver,
            caps,
            plan: Plan::select(mode, vendor),
            stage: Stage::Start,
            pending: Vec::new().into_iter(),
            cdp_ports: HashSet::new(),
            remove_domains: &[],
        }
    }

    /// Strips these domain suffixes from neighbor hostnames.
    pub fn with_remove_domains(mut self, domains: &'a [String]) -> Self {
        self.remove_domains = domains;
        self
    }

    fn port_key(&self, port: &str) -> String {
        self.caps
            .abbreviate_port_name(port)
            .unwrap_or_else(|| port.to_string())
            .to_lowercase()
    }

    fn cdp_records(&self) -> InventoryResult<Vec<NeighborRecord>> {
        match self.caps.detailed_cdp_neighbors()? {
            Support::Supported(records) => Ok(records),
            Support::Unsupported => {
                error!(host = %self.driver.hostname(), "platform does not support cdp");
                Ok(Vec::new())
            }
        }
    }

    fn lldp_records(&self) -> InventoryResult<Vec<NeighborRecord>> {
        if let Support::Supported(records) = self.caps.detailed_lldp_neighbors()? {
            return Ok(records);
        }

        debug!(host = %self.driver.hostname(), "using baseline lldp neighbors");
        let table = self.driver.generic_neighbors()?;
        Ok(table
            .into_iter()
            .flat_map(|(local_port, neighbors)| {
                neighbors.into_iter().map(move |n| {
                    NeighborRecord::new(local_port.clone(), Some(n.hostname), n.port)
                })
            })
            .collect())
    }

    /// Moves to the next stage, loading its records.
    fn advance(&mut self) -> InventoryResult<()> {
        let next = match (self.stage, self.plan) {
            (Stage::Start, Plan::CdpOnly | Plan::Merged) => Stage::Cdp,
            (Stage::Start, Plan::LldpOnly) | (Stage::Cdp, Plan::Merged) => Stage::Lldp,
            _ => Stage::Done,
        };
        self.stage = next;

        let records = match next {
            Stage::Cdp => self.cdp_records()?,
            Stage::Lldp => self.lldp_records()?,
            Stage::Start | Stage::Done => Vec::new(),
        };
        self.pending = records.into_iter();

        Ok(())
    }

    fn fail(&mut self, e: InventoryError) -> Option<InventoryResult<NeighborRecord>> {
        self.stage = Stage::Done;
        self.pending = Vec::new().into_iter();
        Some(Err(e))
    }
}

impl Iterator for NeighborStream<'_> {
    type Item = InventoryResult<NeighborRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(mut record) = self.pending.next() {
                if self.plan == Plan::Merged {
                    let key = self.port_key(&record.local_port);
                    match self.stage {
                        Stage::Cdp => {
                            self.cdp_ports.insert(key);
                        }
                        Stage::Lldp if self.cdp_ports.contains(&key) => {
                            debug!(port = %record.local_port, "lldp neighbor already known from cdp");
                            continue;
                        }
                        _ => {}
                    }
                }

                record.strip_domains(self.remove_domains);
                return Some(Ok(record));
            }

            if self.stage == Stage::Done {
                return None;
            }

            if let Err(e) = self.advance() {
                return self.fail(e);
            }
        }
    }
}
