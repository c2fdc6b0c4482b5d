//! LAG membership resolution.

use tracing::{debug, error, warn};

use crate::capability::CapabilityProvider;
use crate::constants::TYPE_LAG;
use crate::error::InventoryResult;
use crate::model::InterfaceMap;

/// Resolves a vendor-spelled LAG name to the interface map key.
///
/// Tries an exact match first, then a case-insensitive scan.
pub fn find_interface_key<'a>(interfaces: &'a InterfaceMap, lag: &str) -> Option<&'a str> {
    if let Some((key, _)) = interfaces.get_key_value(lag) {
        return Some(key);
    }

    let wanted = lag.to_lowercase();
    interfaces
        .keys()
        .find(|key| key.to_lowercase() == wanted)
        .map(String::as_str)
}

/// Assigns LAG membership and marks every LAG parent as a LAG interface.
///
/// A LAG name that matches no interface is logged and skipped, leaving the
/// member unassigned. An unsupported query assigns nothing.
pub fn resolve_lags(
    interfaces: &mut InterfaceMap,
    caps: &dyn CapabilityProvider,
) -> InventoryResult<()> {
    let membership = caps.lag_membership(interfaces)?.unwrap_or_default();

    for (member, lag) in &membership {
        let Some(lag_key) = find_interface_key(interfaces, lag).map(str::to_string) else {
            error!(interface = %member, lag = %lag, "LAG interface not found");
            continue;
        };

        match interfaces.get_mut(member) {
            Some(intf) => intf.lag = Some(lag_key.clone()),
            None => {
                warn!(interface = %member, lag = %lag_key, "LAG member not found");
                continue;
            }
        }

        if let Some(parent) = interfaces.get_mut(&lag_key) {
            debug!(interface = %member, lag = %lag_key, "LAG member assigned");
            parent.if_type = TYPE_LAG.to_string();
        }
    }

    Ok(())
}
