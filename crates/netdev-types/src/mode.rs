//! 802.1Q switchport mode.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Switchport mode of an interface as recorded in the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterfaceMode {
    /// Carries a single untagged VLAN.
    Access,
    /// Carries several 802.1Q tagged VLANs, plus at most one untagged.
    Tagged,
}

impl InterfaceMode {
    /// Returns the inventory spelling of the mode.
    pub const fn as_str(&self) -> &'static str {
        match self {
            InterfaceMode::Access => "Access",
            InterfaceMode::Tagged => "Tagged",
        }
    }

    /// Returns true for [`InterfaceMode::Tagged`].
    pub const fn is_tagged(&self) -> bool {
        matches!(self, InterfaceMode::Tagged)
    }
}

impl fmt::Display for InterfaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterfaceMode {
    type Err = ParseError;

    /// Parses the administrative mode tokens devices report:
    /// `access`, `static access` and `trunk`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "access" | "static access" => Ok(InterfaceMode::Access),
            "trunk" => Ok(InterfaceMode::Tagged),
            other => Err(ParseError::UnknownInterfaceMode(other.to_string())),
        }
    }
}
