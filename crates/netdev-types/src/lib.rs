//! Common types for network device inventory records.
//!
//! This crate provides type-safe representations of the network primitives
//! that appear in a normalized inventory record:
//!
//! - [`MacAddress`]: 48-bit Ethernet MAC addresses, parsed leniently
//! - [`VlanId`]: IEEE 802.1Q VLAN identifiers
//! - [`InterfaceMode`]: 802.1Q switchport mode (access or tagged)
//! - [`IpInterface`]: an address with its prefix length (CIDR notation)

mod ip;
mod mac;
mod mode;
mod vlan;

pub use ip::IpInterface;
pub use mac::{mac_to_u64, MacAddress};
pub use mode::InterfaceMode;
pub use vlan::VlanId;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid IP interface format: {0}")]
    InvalidIpInterface(String),

    #[error("invalid VLAN ID: {0} (must be 1-4094)")]
    InvalidVlanId(u16),

    #[error("invalid VLAN ID string: {0:?}")]
    InvalidVlanString(String),

    #[error("unknown interface mode: {0:?}")]
    UnknownInterfaceMode(String),
}
