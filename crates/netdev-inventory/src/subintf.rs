//! Sub-interface naming utilities

use crate::constants::VLAN_TOKEN;

/// Parse a sub-interface name into (parent, tag)
///
/// Examples:
/// - "Ethernet1/1.100" → ("Ethernet1/1", "100")
/// - "ge-0/0/1.0" → ("ge-0/0/1", "0")
/// - "Po1.200.10" → ("Po1", "200.10")
///
/// Returns None for plain interfaces and for `vlan.<n>` names, which are
/// never parent/child pairs.
pub fn parse_subintf_name(name: &str) -> Option<(&str, &str)> {
    let (parent, tag) = name.split_once('.')?;

    if parent.eq_ignore_ascii_case(VLAN_TOKEN) {
        return None;
    }

    Some((parent, tag))
}

/// Returns the parent interface name of a sub-interface.
pub fn subintf_parent(name: &str) -> Option<&str> {
    parse_subintf_name(name).map(|(parent, _)| parent)
}

/// Folds a sub-interface name into its parent, leaving other names as-is.
pub fn fold_to_parent(name: &str) -> &str {
    subintf_parent(name).unwrap_or(name)
}

/// Check if a name is a sub-interface
pub fn is_subintf_name(name: &str) -> bool {
    parse_subintf_name(name).is_some()
}
