//! End-to-end tests: range list in, membership answers out.

use std::net::IpAddr;

use ipnet::Ipv4Net;
use k2ipset::{IpSet, RangeList, RangeListParser};

/// Ranges mirroring the shape of real country-level data: the v4 block
/// behind the classic European 2.0.0.0/12 allocation plus an unaligned
/// block and a host route, and one v6 allocation.
const RANGES: &str = "\
# sample country ranges
2.0.0.0/12
5.44.0.0/14
9.9.9.9/32
2001:420:4000::/52
";

fn sample_set() -> IpSet {
    let ranges = RangeListParser::parse(RANGES.as_bytes())
        .unwrap()
        .aggregate();
    IpSet::from_ranges(&ranges).unwrap()
}

#[test]
fn test_known_addresses() {
    let set = sample_set();

    for (address, expected) in [
        ("2.0.0.1", true),
        ("1.0.0.1", false),
        ("2.15.255.255", true),
        ("2.16.0.0", false),
        ("::", false),
        ("2001:420:4000:1::", true),
    ] {
        let ip: IpAddr = address.parse().unwrap();
        assert_eq!(set.contains(ip), expected, "contains({})", address);
    }
}

#[test]
fn test_every_range_covered_and_bounded() {
    let ranges = RangeListParser::parse(RANGES.as_bytes()).unwrap();
    let set = IpSet::from_ranges(&ranges).unwrap();

    for net in &ranges.v4 {
        let first = u32::from(net.network());
        let last = u32::from(net.broadcast());

        assert!(set.contains_bytes(&first.to_be_bytes()), "{net} start");
        assert!(set.contains_bytes(&last.to_be_bytes()), "{net} end");

        // The address one past the upper boundary must not be covered
        // unless another range claims it.
        let past = last.wrapping_add(1);
        let in_other = ranges
            .v4
            .iter()
            .filter(|other| *other != net)
            .any(|other| other.contains(&std::net::Ipv4Addr::from(past)));
        if !in_other {
            assert!(!set.contains_bytes(&past.to_be_bytes()), "{net} past end");
        }
    }
}

#[test]
fn test_unrecognized_input_is_false() {
    let set = sample_set();

    assert!(!set.contains_bytes(&[]));
    assert!(!set.contains_bytes(&[2]));
    assert!(!set.contains_bytes(&[2, 0, 0, 0, 0, 0]));
    // 17 bytes: one past a v6 address.
    assert!(!set.contains_bytes(&[0x20; 17]));
}

#[test]
fn test_rebuild_is_byte_identical() {
    let ranges = RangeListParser::parse(RANGES.as_bytes()).unwrap();
    let first = IpSet::build_tables(&ranges).unwrap();
    let second = IpSet::build_tables(&ranges).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_aggregation_does_not_change_membership() {
    let mut ranges = RangeList::new();
    for r in ["10.0.0.0/9", "10.128.0.0/9", "2.0.0.0/12"] {
        ranges.v4.push(r.parse::<Ipv4Net>().unwrap());
    }
    let plain = IpSet::from_ranges(&ranges).unwrap();
    let aggregated = IpSet::from_ranges(&ranges.aggregate()).unwrap();

    for address in ["10.0.0.1", "10.127.255.255", "10.128.0.0", "10.255.1.2", "11.0.0.0", "2.3.4.5"] {
        let ip: IpAddr = address.parse().unwrap();
        assert_eq!(plain.contains(ip), aggregated.contains(ip), "{address}");
    }
}

#[test]
fn test_global_initialization() {
    let ranges = RangeListParser::parse(RANGES.as_bytes()).unwrap();
    let (v4, v6) = IpSet::build_tables(&ranges).unwrap();

    k2ipset::init_from_bytes(v4.clone(), v6.clone()).unwrap();
    assert!(k2ipset::is_initialized());
    assert!(k2ipset::contains_ip("2.0.0.1".parse().unwrap()));
    assert!(!k2ipset::contains_ip("1.0.0.1".parse().unwrap()));
    assert!(k2ipset::contains_bytes(&[2, 0, 0, 1]));
    assert!(!k2ipset::contains_bytes(&[1, 2, 3]));

    // A second initialization is a no-op.
    k2ipset::init_from_bytes(v4, v6).unwrap();
    assert!(k2ipset::contains_ip("2.15.255.255".parse().unwrap()));
}

#[test]
fn test_table_files_roundtrip() {
    use std::path::Path;

    let ranges = RangeListParser::parse(RANGES.as_bytes()).unwrap();
    let (v4, v6) = IpSet::build_tables(&ranges).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let v4_path = dir.path().join("ipset_v4.k2s");
    let v6_path = dir.path().join("ipset_v6.k2s");
    std::fs::write(&v4_path, &v4).unwrap();
    std::fs::write(&v6_path, &v6).unwrap();

    let set = IpSet::open(Path::new(&v4_path), Path::new(&v6_path)).unwrap();
    assert!(set.contains("2.0.0.1".parse().unwrap()));
    assert!(set.contains("2001:420:4000:1::".parse().unwrap()));
    assert!(!set.contains("2.16.0.0".parse().unwrap()));
}
