//! IP interface (address plus prefix length) with CIDR formatting.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// An address configured on an interface, with its prefix length.
///
/// Unlike a network prefix, the host bits are kept: `192.0.2.1/24` stays
/// `192.0.2.1/24`.
///
/// # Examples
///
/// ```
/// use netdev_types::IpInterface;
///
/// let intf: IpInterface = "2001:db8::1/64".parse().unwrap();
/// assert!(intf.is_ipv6());
/// assert_eq!(intf.to_string(), "2001:db8::1/64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpInterface {
    address: IpAddr,
    prefix_len: u8,
}

impl IpInterface {
    /// Creates a new IP interface.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix length exceeds the address width.
    pub fn new(address: IpAddr, prefix_len: u8) -> Result<Self, ParseError> {
        let max_len = if address.is_ipv4() { 32 } else { 128 };
        if prefix_len > max_len {
            return Err(ParseError::InvalidIpInterface(format!(
                "{}/{}",
                address, prefix_len
            )));
        }
        Ok(IpInterface {
            address,
            prefix_len,
        })
    }

    /// Returns the address.
    pub const fn address(&self) -> IpAddr {
        self.address
    }

    /// Returns the prefix length.
    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Returns true if this is an IPv4 interface.
    pub const fn is_ipv4(&self) -> bool {
        self.address.is_ipv4()
    }

    /// Returns true if this is an IPv6 interface.
    pub const fn is_ipv6(&self) -> bool {
        self.address.is_ipv6()
    }
}

impl fmt::Display for IpInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for IpInterface {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_str, len_str) = s
            .split_once('/')
            .ok_or_else(|| ParseError::InvalidIpInterface(s.to_string()))?;

        let address: IpAddr = addr_str
            .parse()
            .map_err(|_| ParseError::InvalidIpInterface(s.to_string()))?;
        let prefix_len: u8 = len_str
            .parse()
            .map_err(|_| ParseError::InvalidIpInterface(s.to_string()))?;

        IpInterface::new(address, prefix_len)
    }
}

impl TryFrom<String> for IpInterface {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IpInterface> for String {
    fn from(intf: IpInterface) -> String {
        intf.to_string()
    }
}
