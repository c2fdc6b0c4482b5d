//! Primary address resolution.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use tracing::debug;

use crate::error::{InventoryError, InventoryResult};

/// Address family of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    fn matches(&self, addr: &IpAddr) -> bool {
        match self {
            IpFamily::V4 => addr.is_ipv4(),
            IpFamily::V6 => addr.is_ipv6(),
        }
    }
}

/// Hostname lookup, one address family at a time.
pub trait AddressResolver {
    /// Returns the first address of `family` for `host`.
    fn resolve(&self, host: &str, family: IpFamily) -> io::Result<IpAddr>;
}

/// Resolver backed by the system `getaddrinfo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl AddressResolver for SystemResolver {
    fn resolve(&self, host: &str, family: IpFamily) -> io::Result<IpAddr> {
        dns_lookup::lookup_host(host)?
            .into_iter()
            .find(|addr| family.matches(addr))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no {:?} address for {}", family, host),
                )
            })
    }
}

/// Management addresses of a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimaryIps {
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
}

/// Resolves both primary addresses of `host`.
///
/// One family is enough; `NoReverseFound` means neither resolved.
pub fn resolve_primary_ips(resolver: &dyn AddressResolver, host: &str) -> InventoryResult<PrimaryIps> {
    let mut ips = PrimaryIps::default();

    for family in [IpFamily::V4, IpFamily::V6] {
        match resolver.resolve(host, family) {
            Ok(IpAddr::V4(addr)) if family == IpFamily::V4 => ips.ipv4 = Some(addr),
            Ok(IpAddr::V6(addr)) if family == IpFamily::V6 => ips.ipv6 = Some(addr),
            Ok(addr) => {
                debug!(host = %host, family = ?family, address = %addr, "resolver returned wrong family");
            }
            Err(e) => {
                debug!(host = %host, family = ?family, error = %e, "address lookup failed");
            }
        }
    }

    if ips.ipv4.is_none() && ips.ipv6.is_none() {
        return Err(InventoryError::NoReverseFound {
            host: host.to_string(),
        });
    }

    Ok(ips)
}
