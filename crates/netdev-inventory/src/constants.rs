//! Interface type markers and record limits

/// Type assigned when no classification is available.
pub const TYPE_OTHER: &str = "Other";

/// Type assigned to VLAN and tunnel interfaces.
pub const TYPE_VIRTUAL: &str = "Virtual";

/// Type forced onto every interface that owns LAG members.
pub const TYPE_LAG: &str = "Link Aggregation Group (LAG)";

/// Inventory descriptions are capped at this many characters.
pub const DESCRIPTION_MAX_CHARS: usize = 100;

/// Name prefix that never denotes a subinterface parent (`vlan.100`).
pub const VLAN_TOKEN: &str = "vlan";

// Driver identifiers
pub mod drivers {
    pub const NXOS: &str = "nxos";
    pub const NXOS_SSH: &str = "nxos_ssh";
    pub const IOS: &str = "ios";
    pub const JUNOS: &str = "junos";
}

// Snapshot file names
pub mod snapshot_files {
    pub const FACTS: &str = "get_facts.json";
    pub const INTERFACES: &str = "get_interfaces.json";
    pub const INTERFACES_IP: &str = "get_interfaces_ip.json";
    pub const LLDP_NEIGHBORS: &str = "get_lldp_neighbors.json";
    pub const CAPABILITIES: &str = "capabilities.json";
}

// Configuration
pub const APP_NAME: &str = "netdev-inventory";
pub const CONFIG_FILENAME: &str = "config.yml";
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
pub const SITE_CONFIG_DIR: &str = "/etc";
pub const DEFAULT_LOG_LEVEL: &str = "error";
pub const DEFAULT_THREADS: usize = 10;
