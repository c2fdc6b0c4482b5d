//! Verification helpers for polled records
//!
//! Each check returns a [`VerifyResult`] so a test can either `unwrap()` it
//! or assert on the failure.

use netdev_inventory::constants::{DESCRIPTION_MAX_CHARS, TYPE_LAG};
use netdev_inventory::subintf::is_subintf_name;
use netdev_inventory::{DeviceRecord, NeighborRecord, NormalizedInterface};
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Expected interface '{name}' not found in record")]
    InterfaceNotFound { name: String },

    #[error("Subinterface '{name}' left in record")]
    SubinterfaceKept { name: String },

    #[error("Interface '{name}' carries native VLAN {vlan} in its tagged list")]
    NativeVlanTagged { name: String, vlan: u16 },

    #[error("Interface '{name}' is a member of '{lag}', which is not a LAG parent")]
    DanglingLag { name: String, lag: String },

    #[error("Interface '{name}' has a description of {length} characters")]
    DescriptionTooLong { name: String, length: usize },

    #[error("Expected {expected} neighbors, found {actual}")]
    NeighborCountMismatch { expected: usize, actual: usize },

    #[error("No neighbor '{hostname}' on local port '{local_port}'")]
    NeighborNotFound { local_port: String, hostname: String },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Device record verification helper
pub struct RecordVerifier<'a> {
    record: &'a DeviceRecord,
}

impl<'a> RecordVerifier<'a> {
    pub fn new(record: &'a DeviceRecord) -> Self {
        Self { record }
    }

    /// Returns the named interface.
    pub fn interface(&self, name: &str) -> VerifyResult<&'a NormalizedInterface> {
        self.record
            .interfaces
            .get(name)
            .ok_or_else(|| VerificationError::InterfaceNotFound {
                name: name.to_string(),
            })
    }

    /// Verify that subinterfaces were folded into their parents
    pub fn assert_no_subinterfaces(&self) -> VerifyResult<()> {
        match self.record.interfaces.keys().find(|name| is_subintf_name(name)) {
            Some(name) => Err(VerificationError::SubinterfaceKept { name: name.clone() }),
            None => Ok(()),
        }
    }

    /// Verify that no untagged VLAN is repeated in the tagged list
    pub fn assert_native_vlans_untagged(&self) -> VerifyResult<()> {
        for (name, interface) in &self.record.interfaces {
            if let Some(vlan) = interface.untagged_vlan {
                if interface.tagged_vlans.contains(&vlan) {
                    return Err(VerificationError::NativeVlanTagged {
                        name: name.clone(),
                        vlan,
                    });
                }
            }
        }
        Ok(())
    }

    /// Verify that every LAG reference names an interface typed as a LAG
    pub fn assert_lag_parents(&self) -> VerifyResult<()> {
        for (name, interface) in &self.record.interfaces {
            let Some(lag) = &interface.lag else {
                continue;
            };
            let is_parent = self
                .record
                .interfaces
                .get(lag)
                .is_some_and(|parent| parent.if_type == TYPE_LAG);
            if !is_parent {
                return Err(VerificationError::DanglingLag {
                    name: name.clone(),
                    lag: lag.clone(),
                });
            }
        }
        Ok(())
    }

    /// Verify the description limit
    pub fn assert_descriptions_bounded(&self) -> VerifyResult<()> {
        for (name, interface) in &self.record.interfaces {
            let length = interface.description.chars().count();
            if length > DESCRIPTION_MAX_CHARS {
                return Err(VerificationError::DescriptionTooLong {
                    name: name.clone(),
                    length,
                });
            }
        }
        Ok(())
    }

    /// Runs every record invariant check
    pub fn assert_invariants(&self) -> VerifyResult<()> {
        self.assert_no_subinterfaces()?;
        self.assert_native_vlans_untagged()?;
        self.assert_lag_parents()?;
        self.assert_descriptions_bounded()
    }
}

/// Neighbor list verification helper
pub struct NeighborVerifier<'a> {
    records: &'a [NeighborRecord],
}

impl<'a> NeighborVerifier<'a> {
    pub fn new(records: &'a [NeighborRecord]) -> Self {
        Self { records }
    }

    pub fn assert_count(&self, expected: usize) -> VerifyResult<()> {
        let actual = self.records.len();
        if actual != expected {
            return Err(VerificationError::NeighborCountMismatch { expected, actual });
        }
        Ok(())
    }

    /// Verify that `hostname` was seen on `local_port`
    pub fn assert_neighbor(&self, local_port: &str, hostname: &str) -> VerifyResult<()> {
        let found = self.records.iter().any(|record| {
            record.local_port == local_port && record.hostname.as_deref() == Some(hostname)
        });
        if !found {
            return Err(VerificationError::NeighborNotFound {
                local_port: local_port.to_string(),
                hostname: hostname.to_string(),
            });
        }
        Ok(())
    }

    /// Local ports in yield order
    pub fn local_ports(&self) -> Vec<&'a str> {
        self.records.iter().map(|r| r.local_port.as_str()).collect()
    }
}
