//! End-to-end sizing scenarios

mod common;

use std::collections::{BTreeMap, HashMap};
use std::mem::size_of;

use common::*;
use memusage::*;
use test_case::test_case;

#[test]
fn test_record_with_pointer_to_record() {
    let obj = scenario_a();
    let profile = compute_profile(&obj);

    // Outer (root) + Inner (pointer target) + string bytes + vec backing
    let expected = size_of::<Outer>() + size_of::<Inner>() + 6 + obj.y.b.capacity() * 8;
    assert_eq!(profile.total_bytes(), expected);

    #[cfg(target_pointer_width = "64")]
    assert_eq!(profile.total_bytes(), 94);
}

#[test]
fn test_record_breakdown_by_type() {
    let obj = scenario_a();
    let profile = compute_profile(&obj);

    assert_eq!(profile.count_for::<Outer>(), 1);
    assert_eq!(profile.count_for::<Inner>(), 1);
    assert_eq!(profile.count_for::<i64>(), 1, "only the field x; vec elements are priced in bulk");
    assert_eq!(profile.bytes_for::<String>(), size_of::<String>() + 6);
    assert_eq!(
        profile.bytes_for::<Vec<i64>>(),
        size_of::<Vec<i64>>() + 3 * 8
    );

    let string = profile.stats_for::<String>().unwrap();
    assert_eq!(string.attributed, 6, "embedded field only adds its content");
    assert_eq!(profile.attributed_total(), profile.total_bytes());
}

#[test_case(total_bytes(&7u8), 1 ; "u8 root")]
#[test_case(total_bytes(&7u16), 2 ; "u16 root")]
#[test_case(total_bytes(&7i64), 8 ; "i64 root")]
#[test_case(total_bytes(&1.5f32), 4 ; "f32 root")]
#[test_case(total_bytes(&true), 1 ; "bool root")]
#[test_case(total_bytes(&'x'), 4 ; "char root")]
#[test_case(total_bytes(&()), 0 ; "unit root")]
fn test_scalar_root_is_fixed_width(actual: usize, expected: usize) {
    assert_eq!(actual, expected);
}

#[test_case("" ; "empty")]
#[test_case("123456" ; "short")]
#[test_case("größer als ascii" ; "multibyte")]
fn test_string_root_is_header_plus_len(text: &str) {
    let owned = text.to_string();
    assert_eq!(total_bytes(&owned), size_of::<String>() + text.len());
}

#[test]
fn test_scalar_vec_uses_capacity() {
    let mut values: Vec<u32> = Vec::with_capacity(16);
    values.extend([1, 2, 3]);

    let profile = compute_profile(&values);
    assert_eq!(profile.total_bytes(), size_of::<Vec<u32>>() + 16 * 4);
    assert_eq!(profile.count_for::<u32>(), 0, "scalar elements are never visited");
}

#[test]
fn test_scalar_array_is_not_doubled() {
    let values = [1u64; 8];
    let profile = compute_profile(&values);
    assert_eq!(profile.total_bytes(), 64);
    assert_eq!(profile.count_for::<u64>(), 0);
}

#[test]
fn test_vec_of_scalar_pointers_priced_in_bulk() {
    let values = vec![Box::new(1u64), Box::new(2u64)];
    let profile = compute_profile(&values);

    let chain = size_of::<Box<u64>>() + 8;
    assert_eq!(profile.total_bytes(), size_of::<Vec<Box<u64>>>() + values.capacity() * chain);
    assert_eq!(profile.count_for::<Box<u64>>(), 0);
}

#[test]
fn test_vec_of_strings_counts_slots_and_contents() {
    let values = vec!["ab".to_string(), "cde".to_string(), String::new()];
    let profile = compute_profile(&values);

    let expected = size_of::<Vec<String>>() + values.capacity() * size_of::<String>() + 5;
    assert_eq!(profile.total_bytes(), expected);
    assert_eq!(profile.count_for::<String>(), 3);
}

#[test]
fn test_nil_pointer_contributes_only_its_slot() {
    let holder = Holder {
        tag: 1,
        target: None,
    };
    let profile = compute_profile(&holder);

    assert_eq!(profile.total_bytes(), size_of::<Holder>());
    assert_eq!(profile.count_for::<Inner>(), 0);
}

#[test]
fn test_set_pointer_adds_target() {
    let target = inner();
    let cost = inner_cost(&target);
    let holder = Holder {
        tag: 1,
        target: Some(Box::new(target)),
    };
    assert_eq!(total_bytes(&holder), size_of::<Holder>() + cost);
}

#[test]
fn test_nil_link_is_not_followed() {
    let ring = Ring::new(1);
    let profile = compute_profile(&ring);

    assert_eq!(profile.total_bytes(), size_of::<Ring>());
    assert_eq!(profile.count_for::<Ring>(), 1);
    assert_eq!(profile.count_for::<Link>(), 1);
}

#[test]
fn test_map_keys_and_values_each_visited_once() {
    let mut map: HashMap<String, Vec<u8>> = HashMap::new();
    map.insert("alpha".to_string(), vec![1, 2, 3]);
    map.insert("beta".to_string(), Vec::with_capacity(10));
    map.insert("gamma".to_string(), vec![]);

    let profile = compute_profile(&map);

    assert_eq!(profile.count_for::<String>(), 3);
    assert_eq!(profile.count_for::<Vec<u8>>(), 3);

    let keys: usize = map.keys().map(|k| size_of::<String>() + k.len()).sum();
    let values: usize = map.values().map(|v| size_of::<Vec<u8>>() + v.capacity()).sum();
    assert_eq!(
        profile.total_bytes(),
        size_of::<HashMap<String, Vec<u8>>>() + keys + values
    );
}

#[test]
fn test_empty_containers_contribute_headers_only() {
    let map: BTreeMap<u32, String> = BTreeMap::new();
    let vec: Vec<String> = Vec::new();
    assert_eq!(total_bytes(&map), size_of::<BTreeMap<u32, String>>());
    assert_eq!(total_bytes(&vec), size_of::<Vec<String>>());
}

#[test]
fn test_trait_object_payload_is_independent() {
    let values: Vec<Box<dyn Describe>> = vec![Box::new(5u32), Box::new("hey".to_string())];
    let profile = compute_profile(&values);

    let slots = values.capacity() * size_of::<Box<dyn Describe>>();
    let payloads = 4 + size_of::<String>() + 3;
    assert_eq!(
        profile.total_bytes(),
        size_of::<Vec<Box<dyn Describe>>>() + slots + payloads
    );
    assert_eq!(profile.count_for::<u32>(), 1);
}

#[test]
fn test_tuple_fields_are_embedded() {
    let pair = (1u64, "abc".to_string());
    assert_eq!(total_bytes(&pair), size_of::<(u64, String)>() + 3);
}

#[test]
fn test_pointer_slot_included_via_double_reference() {
    let value = 9u64;
    let reference = &value;
    assert_eq!(total_bytes(&value), 8);
    assert_eq!(total_bytes(&reference), size_of::<&u64>() + 8);
}
