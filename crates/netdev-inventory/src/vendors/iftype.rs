//! Interface type classification from transceiver part numbers and port
//! type strings.
//!
//! Patterns are matched in table order against the start of the reported
//! string. Cisco and Juniper report different vocabularies, so each family
//! has its own table.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::capability::VendorFamily;
use crate::constants::{TYPE_OTHER, TYPE_VIRTUAL};

/// Inventory interface type strings
pub mod types {
    pub const CFP: &str = "CFP (100GE)";
    pub const CFP2: &str = "CFP2 (100GE)";
    pub const ETH100: &str = "100BASE-TX (10/100ME)";
    pub const ETH1000: &str = "1000BASE-T (1GE)";
    pub const SFP: &str = "SFP (1GE)";
    pub const SFP_PLUS: &str = "SFP+ (10GE)";
    pub const SFP28: &str = "SFP28 (25GE)";
    pub const QSFP_PLUS: &str = "QSFP+ (40GE)";
    pub const QSFP28: &str = "QSFP28 (100GE)";
    pub const XENPAK: &str = "XENPAK (10GE)";
    pub const X2: &str = "X2";
    pub const XFP: &str = "XFP (10GE)";
}

type TypeTable = Vec<(Regex, &'static str)>;

fn build_table(patterns: &[(&str, &'static str)]) -> TypeTable {
    patterns
        .iter()
        .map(|(pattern, iftype)| {
            let anchored = format!("^(?:{})", pattern);
            (
                Regex::new(&anchored).expect("Invalid regex pattern"),
                *iftype,
            )
        })
        .collect()
}

static CISCO_TYPES: Lazy<TypeTable> = Lazy::new(|| {
    build_table(&[
        (r"CFP-.*", types::CFP),
        (r"CFP2-.*", types::CFP2),
        (r".*(i?)100Base(-T|TX)", types::ETH100),
        (r".*(i?)1000(BASE|Base)?(-T|TX|X|T)", types::ETH1000),
        (r"1000B(ASE|ase)(-.|.)X", types::SFP),
        (r"((.?WDM-)?SFP-.?10G.*-.*|10Gbase-(.R|.?CU.*M))", types::SFP_PLUS),
        (r"SFP-.?25G-.*", types::SFP28),
        (r"QSFP-(40|4X10)G.*", types::QSFP_PLUS),
        (r"QSFP-(100G|40/100|4SFP25G)-.*", types::QSFP28),
        (r"XENPAK-10GB-.*", types::XENPAK),
        (r"X2-10GB-.*", types::X2),
    ])
});

static JUNIPER_TYPES: Lazy<TypeTable> = Lazy::new(|| {
    build_table(&[
        (r".*100 Base(-T|TX)", types::ETH100),
        (r".*1000 Base(-T|TX)", types::ETH1000),
        (r"SFP-.?G.*", types::SFP),
        (r"(.?WDM-)?SFP.?-.?10G.*-.*", types::SFP_PLUS),
        (r"QSFP\+", types::QSFP_PLUS),
        (r"XFP", types::XFP),
    ])
});

static CISCO_VIRTUAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Vlan(\d*)|^Tunnel(\d+)").expect("Invalid regex pattern"));

fn table_for(family: VendorFamily) -> Option<&'static TypeTable> {
    match family {
        VendorFamily::Cisco => Some(&CISCO_TYPES),
        VendorFamily::Juniper => Some(&JUNIPER_TYPES),
        VendorFamily::Unknown => None,
    }
}

/// Returns true for interface names that are always virtual.
pub fn name_implies_virtual(family: VendorFamily, name: &str) -> bool {
    family == VendorFamily::Cisco && CISCO_VIRTUAL_RE.is_match(name)
}

/// Maps a transceiver part number or port type string to an inventory type.
pub fn classify_port_type(family: VendorFamily, reported: &str) -> Option<&'static str> {
    table_for(family)?
        .iter()
        .find(|(re, _)| re.is_match(reported))
        .map(|(_, iftype)| *iftype)
}

/// Full classification of one interface.
///
/// Virtual names win, then the transceiver part number, then the port type
/// string. A blank port type on a 1000 Mb/s port means copper gigabit.
pub fn classify_interface(
    family: VendorFamily,
    name: &str,
    transceiver: Option<&str>,
    port_type: Option<&str>,
    speed: Option<u32>,
) -> String {
    if name_implies_virtual(family, name) {
        return TYPE_VIRTUAL.to_string();
    }

    if let Some(iftype) = transceiver.and_then(|part| classify_port_type(family, part)) {
        return iftype.to_string();
    }

    if let Some(port_type) = port_type {
        if port_type.trim_matches('-').is_empty() {
            if speed == Some(1000) {
                return types::ETH1000.to_string();
            }
        } else if let Some(iftype) = classify_port_type(family, port_type) {
            return iftype.to_string();
        }
    }

    TYPE_OTHER.to_string()
}
