//! Sorted network index with binary-search membership queries.
//!
//! Networks are partitioned by IP version and kept sorted by base
//! address. Lookups are O(log n). Overlapping networks are tolerated but
//! not merged: a query reports whichever network the search path lands
//! on, and an address covered only by an overlapped network that the
//! search path skips is reported as not found.

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::net::IpAddr;

/// Numeric `[base, broadcast]` range of a network.
pub trait Bounds {
    fn bounds(&self) -> (u128, u128);
}

impl Bounds for Ipv4Net {
    fn bounds(&self) -> (u128, u128) {
        (
            u32::from(self.network()) as u128,
            u32::from(self.broadcast()) as u128,
        )
    }
}

impl Bounds for Ipv6Net {
    fn bounds(&self) -> (u128, u128) {
        (u128::from(self.network()), u128::from(self.broadcast()))
    }
}

/// Binary search `sorted` for a network whose range brackets `value`.
///
/// `sorted` must be ascending by base address and hold a single IP
/// version.
pub fn locate<N: Bounds>(value: u128, sorted: &[N]) -> Option<&N> {
    let mut first = 0;
    let mut last = sorted.len();
    while first < last {
        let mid = first + (last - first) / 2;
        let (base, broadcast) = sorted[mid].bounds();
        if value < base {
            last = mid;
        } else if value > broadcast {
            first = mid + 1;
        } else {
            return Some(&sorted[mid]);
        }
    }
    None
}

/// Version-partitioned, sorted collection of networks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkIndex {
    v4: Vec<Ipv4Net>,
    v6: Vec<Ipv6Net>,
}

impl NetworkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Network containing `addr`, if the search finds one.
    pub fn locate(&self, addr: IpAddr) -> Option<IpNet> {
        match addr {
            IpAddr::V4(v4) => locate(u32::from(v4) as u128, &self.v4).map(|n| IpNet::V4(*n)),
            IpAddr::V6(v6) => locate(u128::from(v6), &self.v6).map(|n| IpNet::V6(*n)),
        }
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        self.locate(addr).is_some()
    }

    /// Whether any indexed network shares at least one address with `net`.
    pub fn overlaps(&self, net: &IpNet) -> bool {
        match net {
            IpNet::V4(target) => self
                .v4
                .iter()
                .any(|n| n.contains(&target.network()) || target.contains(&n.network())),
            IpNet::V6(target) => self
                .v6
                .iter()
                .any(|n| n.contains(&target.network()) || target.contains(&n.network())),
        }
    }

    pub fn len(&self) -> usize {
        self.v4.len() + self.v6.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v4.is_empty() && self.v6.is_empty()
    }

    /// Networks in canonical order: IPv4 ascending, then IPv6 ascending.
    pub fn iter(&self) -> impl Iterator<Item = IpNet> + '_ {
        self.v4
            .iter()
            .map(|n| IpNet::V4(*n))
            .chain(self.v6.iter().map(|n| IpNet::V6(*n)))
    }
}

impl FromIterator<IpNet> for NetworkIndex {
    fn from_iter<I: IntoIterator<Item = IpNet>>(iter: I) -> Self {
        let mut index = Self::new();
        for net in iter {
            match net {
                IpNet::V4(v4) => index.v4.push(v4),
                IpNet::V6(v6) => index.v6.push(v6),
            }
        }
        index.v4.sort_unstable();
        index.v4.dedup();
        index.v6.sort_unstable();
        index.v6.dedup();
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(nets: &[&str]) -> NetworkIndex {
        nets.iter().map(|n| n.parse::<IpNet>().unwrap()).collect()
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_locate_hit_and_miss() {
        let idx = index(&["1.2.3.0/24", "10.0.0.0/8", "192.168.0.0/16"]);
        assert_eq!(
            idx.locate(ip("10.20.30.40")),
            Some("10.0.0.0/8".parse().unwrap())
        );
        assert!(idx.contains(ip("1.2.3.255")));
        assert!(!idx.contains(ip("1.2.4.0")));
        assert!(!idx.contains(ip("0.0.0.1")));
        assert!(!idx.contains(ip("255.255.255.255")));
    }

    #[test]
    fn test_locate_network_edges() {
        let idx = index(&["10.0.0.0/24"]);
        assert!(idx.contains(ip("10.0.0.0")));
        assert!(idx.contains(ip("10.0.0.255")));
        assert!(!idx.contains(ip("9.255.255.255")));
        assert!(!idx.contains(ip("10.0.1.0")));
    }

    #[test]
    fn test_versions_never_mix() {
        let idx = index(&["0.0.0.0/0"]);
        assert!(idx.contains(ip("8.8.8.8")));
        assert!(!idx.contains(ip("::1")));

        let idx6 = index(&["::/0"]);
        assert!(idx6.contains(ip("2001:db8::1")));
        assert!(!idx6.contains(ip("8.8.8.8")));
    }

    #[test]
    fn test_empty_index() {
        let idx = NetworkIndex::new();
        assert!(idx.is_empty());
        assert!(!idx.contains(ip("1.1.1.1")));
    }

    #[test]
    fn test_iter_canonical_order_and_dedup() {
        let idx = index(&["2001:db8::/32", "10.0.0.0/8", "1.0.0.0/8", "10.0.0.0/8"]);
        let order: Vec<String> = idx.iter().map(|n| n.to_string()).collect();
        assert_eq!(order, vec!["1.0.0.0/8", "10.0.0.0/8", "2001:db8::/32"]);
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn test_overlapping_networks_first_hit_wins() {
        // The search path lands on the /16 first and reports it
        let idx = index(&["10.0.0.0/8", "10.1.0.0/16", "10.2.0.0/16"]);
        assert_eq!(
            idx.locate(ip("10.1.2.3")),
            Some("10.1.0.0/16".parse().unwrap())
        );
    }

    #[test]
    fn test_overlaps() {
        let idx = index(&["10.0.0.0/8", "192.168.1.128/25"]);
        assert!(idx.overlaps(&"10.5.0.0/24".parse().unwrap()));
        assert!(idx.overlaps(&"192.168.1.0/24".parse().unwrap()));
        assert!(!idx.overlaps(&"192.168.2.0/24".parse().unwrap()));
        assert!(!idx.overlaps(&"::/0".parse().unwrap()));
    }
}
