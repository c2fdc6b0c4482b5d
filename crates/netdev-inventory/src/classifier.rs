//! Interface classification.
//!
//! Builds the canonical interface map from the baseline interface table and
//! the vendor capability provider:
//!
//! 1. Sub-interfaces (`parent.tag`) are folded away; their parents are
//!    remembered for trunk inference.
//! 2. MAC addresses are validated, invalid values become `None`.
//! 3. Type, mode, access VLAN and tagged VLANs come from the provider, each
//!    with its own default when the provider does not implement the query.
//! 4. Every parent of a sub-interface is promoted to tagged mode.

use std::collections::BTreeSet;

use tracing::{debug, info};

use netdev_types::{InterfaceMode, MacAddress};

use crate::capability::CapabilityProvider;
use crate::constants::TYPE_OTHER;
use crate::driver::{InterfaceTable, RawInterfaceSample};
use crate::error::InventoryResult;
use crate::model::{InterfaceMap, NormalizedInterface};
use crate::subintf::subintf_parent;

/// Classifies every interface of the baseline table.
///
/// Entries are processed in name order. Provider I/O failures propagate and
/// abort classification.
pub fn classify_interfaces(
    table: &InterfaceTable,
    caps: &dyn CapabilityProvider,
) -> InventoryResult<InterfaceMap> {
    let mut interfaces = InterfaceMap::new();
    let mut trunk_parents = BTreeSet::new();

    for (name, sample) in table {
        if let Some(parent) = subintf_parent(name) {
            debug!(interface = %name, parent = %parent, "sub-interface folded into parent");
            trunk_parents.insert(parent);
            continue;
        }

        let intf = classify_interface(name, sample, caps)?;
        interfaces.insert(name.clone(), intf);
    }

    promote_trunk_parents(&mut interfaces, &trunk_parents);

    Ok(interfaces)
}

fn classify_interface(
    name: &str,
    sample: &RawInterfaceSample,
    caps: &dyn CapabilityProvider,
) -> InventoryResult<NormalizedInterface> {
    let mut intf = NormalizedInterface::new(sample.enabled);
    intf.set_description(sample.description.as_deref());
    intf.mtu = sample.mtu;
    intf.mac_address = sample
        .mac_address
        .as_deref()
        .and_then(MacAddress::parse_lenient);

    intf.if_type = caps
        .interface_type(name)?
        .unwrap_or_else(|| TYPE_OTHER.to_string());
    if intf.if_type == TYPE_OTHER {
        info!(interface = %name, "interface type could not be determined");
    }

    intf.mode = interface_mode(name, caps)?;
    if intf.mode == Some(InterfaceMode::Access) {
        intf.untagged_vlan = caps.interface_access_vlan(name)?.flatten();
    }

    intf.tagged_vlans = caps
        .interface_tagged_vlans(name)?
        .flatten()
        .unwrap_or_default();

    Ok(intf)
}

/// Maps the vendor mode token. Unknown tokens and unsupported queries both
/// yield no mode.
fn interface_mode(
    name: &str,
    caps: &dyn CapabilityProvider,
) -> InventoryResult<Option<InterfaceMode>> {
    let Some(token) = caps.interface_mode(name)?.flatten() else {
        return Ok(None);
    };

    match token.parse::<InterfaceMode>() {
        Ok(mode) => Ok(Some(mode)),
        Err(e) => {
            debug!(interface = %name, error = %e, "ignoring interface mode");
            Ok(None)
        }
    }
}

/// Marks subinterface parents as tagged. The untagged VLAN of a tagged
/// port is the native VLAN only, so an access VLAN set earlier is cleared.
fn promote_trunk_parents(interfaces: &mut InterfaceMap, parents: &BTreeSet<&str>) {
    for parent in parents {
        if let Some(intf) = interfaces.get_mut(*parent) {
            debug!(interface = %parent, "802.1Q sub-interfaces present, marking as tagged");
            if let Some(vlan) = intf.untagged_vlan.take() {
                debug!(interface = %parent, vlan, "access VLAN dropped on promotion");
            }
            intf.mode = Some(InterfaceMode::Tagged);
        }
    }
}
