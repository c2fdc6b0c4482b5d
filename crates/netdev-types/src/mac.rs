//! MAC address type with lenient parsing and canonical formatting.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separators accepted (and ignored) anywhere in a raw MAC string.
const SEPARATORS: [char; 3] = [':', '.', '-'];

/// A 48-bit Ethernet MAC address.
///
/// Devices report MAC addresses in many shapes (`00:11:22:33:44:55`,
/// `0011.2233.4455`, `00-11-22-33-44-55`, or even a mix of separators).
/// Parsing strips every `:`, `.` and `-` and then requires exactly twelve
/// hexadecimal digits.
///
/// # Examples
///
/// ```
/// use netdev_types::MacAddress;
///
/// let mac: MacAddress = "0011.2233.4455".parse().unwrap();
/// assert_eq!(mac.to_string(), "00:11:22:33:44:55");
///
/// let mixed: MacAddress = "00.11:22:33:44.55".parse().unwrap();
/// assert_eq!(mac, mixed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// The zero/null MAC address (00:00:00:00:00:00).
    pub const ZERO: MacAddress = MacAddress([0, 0, 0, 0, 0, 0]);

    /// Creates a new MAC address from raw bytes.
    pub const fn new(bytes: [u8; 6]) -> Self {
        MacAddress(bytes)
    }

    /// Returns the raw bytes of the MAC address.
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Parses a raw device value, returning `None` for anything that is not
    /// a valid MAC address.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    /// Returns the address as an unsigned integer.
    pub fn to_u64(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
    }
}

/// Converts a raw MAC string to its integer value.
///
/// A missing, empty or unparsable value converts to `0`.
pub fn mac_to_u64(raw: Option<&str>) -> u64 {
    raw.and_then(MacAddress::parse_lenient)
        .map(|mac| mac.to_u64())
        .unwrap_or(0)
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for MacAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| !SEPARATORS.contains(c)).collect();
        if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseError::InvalidMacAddress(s.to_string()));
        }

        let mut bytes = [0u8; 6];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
                .map_err(|_| ParseError::InvalidMacAddress(s.to_string()))?;
        }

        Ok(MacAddress(bytes))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> String {
        mac.to_string()
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddress(bytes)
    }
}
