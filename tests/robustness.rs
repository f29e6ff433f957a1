//! Robustness tests for edge cases and error conditions.
//!
//! These tests verify that banip handles malformed input gracefully.

use banip::country::CountryMap;
use banip::feed::ThreatFeed;
use banip::geolite::{parse_locations, tag_blocks};
use banip::lists::CustomList;
use banip::token::{parse_lines, AddressToken};
use std::net::IpAddr;

/// Test IP parsing edge cases
#[test]
fn test_token_parsing_edge_cases() {
    // Valid edge cases
    assert!("0.0.0.0".parse::<AddressToken>().is_ok());
    assert!("255.255.255.255".parse::<AddressToken>().is_ok());
    assert!("::".parse::<AddressToken>().is_ok());
    assert!("0.0.0.0/0".parse::<AddressToken>().is_ok());
    assert!("::/0".parse::<AddressToken>().is_ok());

    // Invalid cases - should fail gracefully
    assert!("256.0.0.0".parse::<AddressToken>().is_err());
    assert!("1.2.3".parse::<AddressToken>().is_err());
    assert!("1.2.3.4/33".parse::<AddressToken>().is_err());
    assert!("1.2.3.4/24".parse::<AddressToken>().is_err()); // host bits set
    assert!("1.2.3.0/".parse::<AddressToken>().is_err());
    assert!("".parse::<AddressToken>().is_err());
    assert!("hello".parse::<AddressToken>().is_err());
}

/// Garbage lines never abort parsing
#[test]
fn test_list_with_garbage_lines() {
    let content = "\
# comment

1.2.3.4
not an ip
1.2.3.4/24
\u{feff}5.6.7.8
10.0.0.0/8
   9.9.9.9
::ffff:zz
2001:db8::/32
";
    let tokens = parse_lines(content);
    assert_eq!(tokens.len(), 4);
    let list = CustomList::parse(content);
    assert_eq!(list.addresses().len(), 2);
    assert_eq!(list.networks().len(), 2);
}

/// Feed lines with bad hit counts are skipped, the rest survive
#[test]
fn test_feed_with_bad_hit_counts() {
    let feed = ThreatFeed::parse(
        "1.1.1.1 3\n2.2.2.2 three\n3.3.3.3 99999999999\n4.4.4.4\n5.5.5.5 -2\n6.6.6.6 0\n",
    );
    assert_eq!(feed.len(), 2);
    assert_eq!(feed.hits(&"1.1.1.1".parse::<IpAddr>().unwrap()), Some(3));
    assert_eq!(feed.hits(&"6.6.6.6".parse::<IpAddr>().unwrap()), Some(0));
}

/// Empty inputs produce empty structures
#[test]
fn test_empty_inputs() {
    assert!(ThreatFeed::parse("").is_empty());
    assert!(CustomList::parse("").is_empty());
    assert!(CountryMap::from_mirror("").is_empty());
    assert!(parse_lines("\n\n# only comments\n").is_empty());
}

/// Truncated or malformed mirror lines are skipped
#[test]
fn test_mirror_with_bad_lines() {
    let map = CountryMap::from_mirror("1.2.3.0/24 US\n1.2.3.0/24\nbogus CN\n5.6.7.0/24 cn\n");
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&"5.6.7.0/24".parse().unwrap()), Some("CN"));
}

/// Malformed CSV rows are skipped without failing the conversion
#[test]
fn test_geolite_with_bad_rows() {
    let codes = parse_locations(
        "geoname_id,continent_code,country_iso_code\n\
         1,NA,US\n\
         oops,EU,FR\n\
         2,EU\n",
    )
    .unwrap();
    assert_eq!(codes.len(), 2);

    let mut map = CountryMap::new();
    let tagged = tag_blocks(
        "network,geoname_id\n\
         1.2.3.0/24,1\n\
         not-a-net,1\n\
         5.6.7.0/24,2\n\
         9.9.9.0/24,\n",
        &codes,
        &mut map,
    )
    .unwrap();
    assert_eq!(tagged, 2);
    assert_eq!(map.get(&"5.6.7.0/24".parse().unwrap()), Some("EU"));
}

/// A corrupt country cache is an error, not a panic
#[test]
fn test_corrupt_cache_is_reported() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("country_nets.bin");
    std::fs::write(&path, b"\xff\xff\xff\xff not bincode").unwrap();
    let result = CountryMap::load_cache(&banip::fs_abstraction::RealFileSystem, &path);
    assert!(result.is_err());
}
