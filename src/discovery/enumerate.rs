use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;
use log::debug;

use crate::constants::MIN_NETWORK_PREFIX;
use crate::errors::SweepError;

/// Parse a CIDR string into a network, masking off any host bits.
///
/// Prefixes shorter than `MIN_NETWORK_PREFIX` are rejected; every host of a
/// target is held in memory for the classification map.
pub fn parse_network(network_cidr: &str) -> Result<Ipv4Network, SweepError> {
    let trimmed = network_cidr.trim();
    let parsed: Ipv4Network = trimmed
        .parse()
        .map_err(|e: ipnetwork::IpNetworkError| SweepError::InvalidNetwork {
            input: trimmed.to_string(),
            reason: e.to_string(),
        })?;

    if parsed.prefix() < MIN_NETWORK_PREFIX {
        return Err(SweepError::InvalidNetwork {
            input: trimmed.to_string(),
            reason: format!(
                "prefix /{} is wider than the /{} limit",
                parsed.prefix(),
                MIN_NETWORK_PREFIX
            ),
        });
    }

    Ipv4Network::new(parsed.network(), parsed.prefix()).map_err(|e| SweepError::InvalidNetwork {
        input: trimmed.to_string(),
        reason: e.to_string(),
    })
}

/// Expand a CIDR network into its usable host addresses, ascending.
///
/// The network and broadcast addresses are excluded. A /31 yields both of
/// its addresses and a /32 its single address (RFC 3021 point-to-point).
pub fn enumerate(network_cidr: &str) -> Result<Vec<Ipv4Addr>, SweepError> {
    let network = parse_network(network_cidr)?;
    let hosts = usable_hosts(network);
    debug!("{} expands to {} host(s)", network, hosts.len());
    Ok(hosts)
}

/// Usable host range of an already-parsed network.
pub fn usable_hosts(network: Ipv4Network) -> Vec<Ipv4Addr> {
    let first = u32::from(network.network()) as u64;
    let last = u32::from(network.broadcast()) as u64;

    let (start, end) = match network.prefix() {
        31 | 32 => (first, last),
        _ => (first + 1, last - 1),
    };

    (start..=end).map(|ip| Ipv4Addr::from(ip as u32)).collect()
}
