//! Native VLAN resolution for tagged interfaces.

use tracing::debug;

use crate::capability::CapabilityProvider;
use crate::error::InventoryResult;
use crate::model::InterfaceMap;

/// Moves each tagged interface's native VLAN out of `tagged_vlans` and into
/// `untagged_vlan`.
///
/// Only interfaces in tagged mode are queried. A native VLAN that is not
/// among the tagged VLANs leaves the interface untouched, and an
/// unsupported query is a no-op.
pub fn resolve_native_vlans(
    interfaces: &mut InterfaceMap,
    caps: &dyn CapabilityProvider,
) -> InventoryResult<()> {
    for (name, intf) in interfaces.iter_mut().filter(|(_, intf)| intf.is_tagged()) {
        let Some(native) = caps.interface_native_vlan(name)?.flatten() else {
            continue;
        };

        match intf.tagged_vlans.iter().position(|vid| *vid == native) {
            Some(pos) => {
                intf.tagged_vlans.remove(pos);
                intf.untagged_vlan = Some(native);
            }
            None => {
                debug!(interface = %name, vlan = native, "native VLAN is not a tagged VLAN");
            }
        }
    }

    Ok(())
}
