//! Address tokens: a single IP address or a CIDR network.
//!
//! Every input list (custom blacklist, whitelist, rendered output) mixes
//! plain addresses and networks of both IP versions. [`AddressToken`] is
//! the sum type for one such entry; consumers match on it exhaustively.

use ipnet::IpNet;
use std::cmp::Ordering;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::BanipError;

/// Comment marker for every line-oriented input file.
pub const COMMENT_MARKER: char = '#';

/// A single address or a network, IPv4 or IPv6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressToken {
    Address(IpAddr),
    Network(IpNet),
}

impl AddressToken {
    /// Parse one line of a list file.
    ///
    /// Blank lines, comment lines and anything that does not parse yield
    /// `None`; callers skip those lines.
    pub fn from_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
            return None;
        }
        trimmed.parse().ok()
    }

    pub fn is_ipv4(&self) -> bool {
        match self {
            Self::Address(addr) => addr.is_ipv4(),
            Self::Network(net) => matches!(net, IpNet::V4(_)),
        }
    }

    fn sort_key(&self) -> (bool, u128, u8, u8) {
        match self {
            Self::Address(addr) => (addr.is_ipv6(), ip_value(addr), 0, 0),
            Self::Network(net) => (
                matches!(net, IpNet::V6(_)),
                ip_value(&net.network()),
                1,
                net.prefix_len(),
            ),
        }
    }
}

impl FromStr for AddressToken {
    type Err = BanipError;

    /// Networks must be in canonical form: `10.0.0.5/24` is rejected
    /// because host bits are set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('/') {
            let net: IpNet = s
                .parse()
                .map_err(|_| BanipError::InvalidToken(s.to_string()))?;
            if net.trunc() != net {
                return Err(BanipError::InvalidToken(s.to_string()));
            }
            Ok(Self::Network(net))
        } else {
            s.parse()
                .map(Self::Address)
                .map_err(|_| BanipError::InvalidToken(s.to_string()))
        }
    }
}

impl fmt::Display for AddressToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(addr) => write!(f, "{}", addr),
            Self::Network(net) => write!(f, "{}", net),
        }
    }
}

/// IPv4 sorts before IPv6; within a version tokens sort by numeric value,
/// an address before a network with the same base, then by prefix length.
impl Ord for AddressToken {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for AddressToken {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<IpAddr> for AddressToken {
    fn from(addr: IpAddr) -> Self {
        Self::Address(addr)
    }
}

impl From<IpNet> for AddressToken {
    fn from(net: IpNet) -> Self {
        Self::Network(net)
    }
}

/// Numeric value of an address. IPv4 values are widened, so callers must
/// never compare values across versions.
pub fn ip_value(addr: &IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u32::from(*v4) as u128,
        IpAddr::V6(v6) => u128::from(*v6),
    }
}

/// Split tokens into addresses and networks, preserving input order.
pub fn partition<I>(tokens: I) -> (Vec<IpAddr>, Vec<IpNet>)
where
    I: IntoIterator<Item = AddressToken>,
{
    let mut addresses = Vec::new();
    let mut networks = Vec::new();
    for token in tokens {
        match token {
            AddressToken::Address(addr) => addresses.push(addr),
            AddressToken::Network(net) => networks.push(net),
        }
    }
    (addresses, networks)
}

/// Parse every usable line of a list file, skipping the rest.
pub fn parse_lines(content: &str) -> Vec<AddressToken> {
    content.lines().filter_map(AddressToken::from_line).collect()
}
