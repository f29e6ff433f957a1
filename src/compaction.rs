//! /24 compaction of dense IPv4 address clusters.
//!
//! Addresses sharing a /24 are replaced by that /24 once the group
//! reaches `min_count` members, unless the whitelist touches the /24.
//! A compacted /24 also blocks neighbours that were never in the feed;
//! that over-blocking is the operator's choice when enabling it.
//!
//! IPv6 addresses pass through untouched.

use ipnet::{IpNet, Ipv4Net};
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use tracing::debug;

use crate::lists::CustomList;

/// `min_count` value that disables compaction
pub const COMPACTION_DISABLED: u8 = 0;

const GROUP_PREFIX: u8 = 24;

/// Compact `addresses` against `whitelist`.
///
/// Returns the remaining addresses and the produced /24 networks, both
/// sorted ascending.
pub fn compact(
    addresses: &[IpAddr],
    whitelist: &CustomList,
    min_count: u8,
) -> (Vec<IpAddr>, Vec<IpNet>) {
    let mut remaining = addresses.to_vec();
    remaining.sort_unstable();
    if min_count == COMPACTION_DISABLED {
        return (remaining, Vec::new());
    }

    let mut groups: BTreeMap<Ipv4Net, Vec<IpAddr>> = BTreeMap::new();
    let mut passthrough = Vec::new();
    for addr in remaining {
        match addr {
            IpAddr::V4(v4) => groups.entry(supernet(v4)).or_default().push(addr),
            IpAddr::V6(_) => passthrough.push(addr),
        }
    }

    let whitelist_nets = whitelist.network_index();
    let mut networks = Vec::new();
    let mut kept = Vec::new();
    for (net, members) in groups {
        let net = IpNet::V4(net);
        let whitelisted = whitelist.addresses().iter().any(|a| net.contains(a))
            || whitelist_nets.overlaps(&net);
        if members.len() >= usize::from(min_count) && !whitelisted {
            debug!("Compacted {} addresses into {}", members.len(), net);
            networks.push(net);
        } else {
            kept.extend(members);
        }
    }

    kept.extend(passthrough);
    kept.sort_unstable();
    (kept, networks)
}

fn supernet(addr: Ipv4Addr) -> Ipv4Net {
    // GROUP_PREFIX is a valid IPv4 prefix length
    Ipv4Net::new(addr, GROUP_PREFIX)
        .map(|n| n.trunc())
        .unwrap_or_else(|_| Ipv4Net::from(addr))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ips(list: &[&str]) -> Vec<IpAddr> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    const CLUSTER: &[&str] = &["10.0.0.4", "10.0.0.1", "10.0.0.3", "10.0.0.2"];

    #[test]
    fn test_dense_group_collapses() {
        let (addrs, nets) = compact(&ips(CLUSTER), &CustomList::new(), 3);
        assert!(addrs.is_empty());
        assert_eq!(nets, vec!["10.0.0.0/24".parse::<IpNet>().unwrap()]);
    }

    #[test]
    fn test_whitelisted_address_blocks_compaction() {
        let whitelist = CustomList::parse("10.0.0.2\n");
        let (addrs, nets) = compact(&ips(CLUSTER), &whitelist, 3);
        assert_eq!(
            addrs,
            ips(&["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"])
        );
        assert!(nets.is_empty());
    }

    #[test]
    fn test_whitelisted_network_blocks_compaction() {
        // Smaller whitelist network inside the /24
        let whitelist = CustomList::parse("10.0.0.128/25\n");
        let (_, nets) = compact(&ips(CLUSTER), &whitelist, 3);
        assert!(nets.is_empty());

        // Larger whitelist network around the /24
        let whitelist = CustomList::parse("10.0.0.0/8\n");
        let (_, nets) = compact(&ips(CLUSTER), &whitelist, 3);
        assert!(nets.is_empty());

        // Unrelated whitelist network
        let whitelist = CustomList::parse("10.0.1.0/24\n");
        let (_, nets) = compact(&ips(CLUSTER), &whitelist, 3);
        assert_eq!(nets.len(), 1);
    }

    #[test]
    fn test_sparse_group_kept() {
        let (addrs, nets) = compact(&ips(&["10.0.0.1", "10.0.1.1", "10.0.2.1"]), &CustomList::new(), 2);
        assert_eq!(addrs.len(), 3);
        assert!(nets.is_empty());
    }

    #[test]
    fn test_ipv6_never_compacted() {
        let input = ips(&["2001:db8::1", "2001:db8::2", "2001:db8::3"]);
        let (addrs, nets) = compact(&input, &CustomList::new(), 1);
        assert_eq!(addrs, input);
        assert!(nets.is_empty());
    }

    #[test]
    fn test_disabled_returns_sorted_input() {
        let (addrs, nets) = compact(&ips(CLUSTER), &CustomList::new(), COMPACTION_DISABLED);
        assert_eq!(
            addrs,
            ips(&["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"])
        );
        assert!(nets.is_empty());
    }

    #[test]
    fn test_mixed_groups_output_sorted() {
        let input = ips(&["2001:db8::1", "20.0.0.1", "10.0.0.1", "10.0.0.2", "5.5.5.5"]);
        let (addrs, nets) = compact(&input, &CustomList::new(), 2);
        assert_eq!(addrs, ips(&["5.5.5.5", "20.0.0.1", "2001:db8::1"]));
        assert_eq!(nets, vec!["10.0.0.0/24".parse::<IpNet>().unwrap()]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Addresses concentrated in a few /24s so groups actually form
    fn clustered_addrs() -> impl Strategy<Value = Vec<IpAddr>> {
        prop::collection::vec((0u8..4, any::<u8>()), 0..200).prop_map(|raw| {
            raw.into_iter()
                .map(|(c, d)| IpAddr::V4(Ipv4Addr::new(10, 0, c, d)))
                .collect()
        })
    }

    fn whitelist_strategy() -> impl Strategy<Value = CustomList> {
        (
            prop::collection::vec((0u8..8, any::<u8>()), 0..4),
            prop::collection::vec((0u8..8, 20u8..=32), 0..3),
        )
            .prop_map(|(addrs, nets)| {
                let addrs = addrs
                    .into_iter()
                    .map(|(c, d)| IpAddr::V4(Ipv4Addr::new(10, 0, c, d)))
                    .collect();
                let nets = nets
                    .into_iter()
                    .map(|(c, p)| {
                        IpNet::V4(Ipv4Net::new(Ipv4Addr::new(10, 0, c, 0), p).unwrap().trunc())
                    })
                    .collect();
                CustomList::from_parts(addrs, nets)
            })
    }

    proptest! {
        /// Produced networks never touch the whitelist
        #[test]
        fn prop_compaction_respects_whitelist(
            addrs in clustered_addrs(),
            whitelist in whitelist_strategy(),
            min in 1u8..=255,
        ) {
            let (_, nets) = compact(&addrs, &whitelist, min);
            let wl_index = whitelist.network_index();
            for net in &nets {
                prop_assert!(!wl_index.overlaps(net));
                for a in whitelist.addresses() {
                    prop_assert!(!net.contains(a));
                }
            }
        }

        /// Zero disables compaction: sorted input, no networks
        #[test]
        fn prop_disabled_sentinel(addrs in clustered_addrs(), whitelist in whitelist_strategy()) {
            let (out, nets) = compact(&addrs, &whitelist, COMPACTION_DISABLED);
            let mut expected = addrs.clone();
            expected.sort_unstable();
            prop_assert_eq!(out, expected);
            prop_assert!(nets.is_empty());
        }

        /// Every input address is either kept or covered by a produced network
        #[test]
        fn prop_no_address_lost(addrs in clustered_addrs(), min in 1u8..=10) {
            let (out, nets) = compact(&addrs, &CustomList::new(), min);
            for a in &addrs {
                prop_assert!(out.contains(a) || nets.iter().any(|n| n.contains(a)));
            }
        }
    }
}
