//! Device-state normalization engine for network inventories.
//!
//! Given an open session to a switch or router, the engine queries the
//! device through a small baseline driver interface plus an optional set of
//! vendor capabilities, and produces normalized records:
//!
//! - [`classifier`]: interface records, subinterfaces folded into parents
//! - [`vlan`]: native VLAN separation on tagged ports
//! - [`lag`]: LAG membership and LAG parent typing
//! - [`addressing`]: interface IP addresses, fresh or merged into a map
//! - [`neighbors`]: CDP/LLDP neighbor records as a lazy stream
//! - [`poll`]: the per-device pipeline tying the above together
//!
//! # Architecture
//!
//! ```text
//! BaselineDriver ──┐
//!                  ├──> DevicePoller ──> DeviceRecord
//! CapabilityProvider ┘        └────────> NeighborStream ──> NeighborRecord*
//! ```
//!
//! Drivers are external; [`snapshot::SnapshotDevice`] implements both traits
//! over JSON files captured from a device and backs the command line tool.
//! Every capability query answers [`Support::Unsupported`] when the platform
//! cannot answer it, and the pipeline degrades instead of failing.

pub mod addressing;
pub mod capability;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod lag;
pub mod model;
pub mod neighbors;
pub mod poll;
pub mod resolve;
pub mod session;
pub mod snapshot;
pub mod subintf;
pub mod support;
pub mod vendors;
pub mod vlan;

#[cfg(test)]
mod testutil;

// Re-export commonly used items at crate root
pub use capability::{
    select_capabilities, CapabilityProvider, LagMembership, StubCapabilities, VendorDriver,
    VendorFamily,
};
pub use config::{AppConfig, DeviceEntry, DeviceList, DeviceSpec};
pub use driver::{
    BaselineDriver, Facts, GenericNeighbor, GenericNeighborTable, InterfaceAddresses,
    InterfaceTable, IpTable, PrefixInfo, RawInterfaceSample,
};
pub use error::{InventoryError, InventoryResult};
pub use model::{DeviceRecord, DiscoveryMode, InterfaceMap, NeighborRecord, NormalizedInterface};
pub use neighbors::NeighborStream;
pub use poll::{DevicePoller, PollSettings};
pub use resolve::{AddressResolver, IpFamily, PrimaryIps, SystemResolver};
pub use session::{with_session, DeviceSession};
pub use snapshot::SnapshotDevice;
pub use support::Support;

pub use netdev_types::{InterfaceMode, IpInterface, MacAddress, VlanId};
