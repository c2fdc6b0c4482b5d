//! Vendor conventions shared by capability providers.
//!
//! - [`cisco`]: port-name abbreviation, NX-OS port lists, CDP device ids
//! - [`iftype`]: transceiver and port-type classification tables

pub mod cisco;
pub mod iftype;

pub use cisco::{abbreviate_interface, expand_port_list, strip_device_serial};
pub use iftype::{classify_port_type, name_implies_virtual};
