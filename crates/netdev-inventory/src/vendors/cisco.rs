//! Cisco naming conventions (IOS and NX-OS).

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Largest number of ports one range token may expand to.
const MAX_RANGE_PORTS: u32 = 4096;

/// A port range such as `Eth1/1-4` or `Po10-12`: (base, first, last).
static PORT_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z/-]+|.*/)(\d+)-(\d+)$").expect("Invalid regex pattern")
});

/// Short form of a Cisco port name.
///
/// The prefix is the first 3 characters for `Eth*` names and the first 2
/// otherwise, followed by everything from the first digit on:
/// - "Ethernet1/1" → "Eth1/1"
/// - "GigabitEthernet0/1" → "Gi0/1"
/// - "mgmt0" → "mg0"
pub fn abbreviate_interface(name: &str) -> String {
    let index = name
        .find(|c: char| c.is_ascii_digit())
        .map(|pos| &name[pos..])
        .unwrap_or_default();

    let prefix_len = if name
        .get(..3)
        .is_some_and(|p| p.eq_ignore_ascii_case("eth"))
    {
        3
    } else {
        2
    };
    let prefix: String = name.chars().take(prefix_len).collect();

    format!("{}{}", prefix, index)
}

/// Expands an NX-OS port list into individual port names.
///
/// `"Eth1/1-3, Po10"` → `["Eth1/1", "Eth1/2", "Eth1/3", "Po10"]`. Tokens
/// that are not ranges are kept verbatim, empty tokens are dropped.
pub fn expand_port_list(ports: &str) -> Vec<String> {
    let mut expanded = Vec::new();

    for token in ports.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match expand_range(token) {
            Some(range) => expanded.extend(range),
            None => expanded.push(token.to_string()),
        }
    }

    expanded
}

fn expand_range(token: &str) -> Option<Vec<String>> {
    let caps = PORT_RANGE_RE.captures(token)?;
    let base = caps.get(1)?.as_str();
    let first: u32 = caps.get(2)?.as_str().parse().ok()?;
    let last: u32 = caps.get(3)?.as_str().parse().ok()?;

    if last < first || last - first >= MAX_RANGE_PORTS {
        debug!(token = %token, "port range out of bounds, kept as a single name");
        return None;
    }

    Some((first..=last).map(|i| format!("{}{}", base, i)).collect())
}

/// Drops the `(serial)` suffix NX-OS appends to CDP device ids.
///
/// `"sw2.example.net(FOX1234)"` → `"sw2.example.net"`
pub fn strip_device_serial(device_id: &str) -> &str {
    match device_id.find('(') {
        Some(pos) => &device_id[..pos],
        None => device_id,
    }
}
