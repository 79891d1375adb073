use crate::address::AddressDecoder;
use crate::config::{CacheGeometry, ConfigError, ADDRESS_BITS, MAX_BLOCK_BITS, HierarchyConfig, PartialGeometry, PartialHierarchyConfig};

#[test]
fn derived_sizes() {
    let geometry = CacheGeometry::new(3, 4, 5);
    assert_eq!(geometry.num_sets(), 8);
    assert_eq!(geometry.block_size(), 32);
    assert_eq!(geometry.line_count(), 32);
}

#[test]
fn zero_sets_and_byte_blocks_are_valid() {
    let geometry = CacheGeometry::new(0, 1, 0);
    assert_eq!(geometry.validate("L1"), Ok(()));
    let decoded = AddressDecoder::new(&geometry).decode(0xdead_beef);
    assert_eq!((decoded.tag, decoded.set, decoded.offset), (0xdead_beef, 0, 0));
}

#[test]
fn decoder_splits_fields_per_geometry() {
    let l1 = AddressDecoder::new(&CacheGeometry::new(1, 2, 4));
    let l2 = AddressDecoder::new(&CacheGeometry::new(2, 2, 4));
    let a = l1.decode(0x7ff3);
    let b = l2.decode(0x7ff3);
    assert_eq!((a.tag, a.set, a.offset), (0x3ff, 1, 3));
    assert_eq!((b.tag, b.set, b.offset), (0x1ff, 3, 3));
    assert_eq!(l1.block_start(0x7ff3), 0x7ff0);
}

#[test]
fn rejects_zero_associativity() {
    let config = HierarchyConfig::new(CacheGeometry::new(1, 2, 4), CacheGeometry::new(2, 0, 4));
    assert_eq!(config.validate(), Err(ConfigError::ZeroAssociativity { cache: "L2" }));
}

#[test]
fn rejects_geometry_wider_than_an_address() {
    let config = HierarchyConfig::new(CacheGeometry::new(20, 1, 12), CacheGeometry::new(2, 2, 4));
    assert_eq!(config.validate(), Err(ConfigError::AddressBitsExceeded { cache: "L1", bits: 32 }));
}

#[test]
fn rejects_huge_blocks() {
    let config = HierarchyConfig::new(CacheGeometry::new(1, 1, 17), CacheGeometry::new(2, 2, 4));
    assert_eq!(config.validate(), Err(ConfigError::BlockTooLarge { cache: "L1", block_bits: 17 }));
}

#[test]
fn parses_json_with_short_names() {
    let config: HierarchyConfig = serde_json::from_str(
        r#"{"l1": {"s": 1, "E": 2, "b": 4}, "l2": {"set_bits": 2, "associativity": 4, "block_bits": 5}}"#,
    )
    .unwrap();
    assert_eq!(config, HierarchyConfig::new(CacheGeometry::new(1, 2, 4), CacheGeometry::new(2, 4, 5)));
}

#[test]
fn flags_override_file_values() {
    let file: PartialHierarchyConfig =
        serde_json::from_str(r#"{"l1": {"s": 1, "E": 2, "b": 4}, "l2": {"s": 2, "E": 2, "b": 4}}"#).unwrap();
    let flags = PartialHierarchyConfig {
        l1: PartialGeometry { set_bits: Some(3), ..Default::default() },
        l2: PartialGeometry::default(),
    };
    let config = file.overridden_by(flags).resolve().unwrap();
    assert_eq!(config.l1, CacheGeometry::new(3, 2, 4));
    assert_eq!(config.l2, CacheGeometry::new(2, 2, 4));
}

#[test]
fn missing_parameter_is_named() {
    let partial = PartialHierarchyConfig {
        l1: PartialGeometry { set_bits: Some(1), associativity: Some(2), block_bits: Some(4) },
        l2: PartialGeometry { set_bits: Some(2), associativity: None, block_bits: Some(4) },
    };
    assert_eq!(partial.resolve(), Err(ConfigError::MissingParameter { name: "L2E" }));
    assert_eq!(
        ConfigError::MissingParameter { name: "L2E" }.to_string(),
        "missing cache parameter L2E"
    );
}

#[test]
fn resolve_validates() {
    let partial = PartialHierarchyConfig {
        l1: PartialGeometry { set_bits: Some(1), associativity: Some(0), block_bits: Some(4) },
        l2: PartialGeometry { set_bits: Some(2), associativity: Some(2), block_bits: Some(4) },
    };
    assert_eq!(partial.resolve(), Err(ConfigError::ZeroAssociativity { cache: "L1" }));
}

#[test]
fn limit_messages_name_the_limits() {
    assert_eq!(
        ConfigError::AddressBitsExceeded { cache: "L2", bits: 33 }.to_string(),
        format!("L2 uses 33 set and block bits, addresses only have {ADDRESS_BITS}")
    );
    assert_eq!(
        ConfigError::BlockTooLarge { cache: "L1", block_bits: 20 }.to_string(),
        format!("L1 block offset of 20 bits is larger than the maximum of {MAX_BLOCK_BITS}")
    );
}
