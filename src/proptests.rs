use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

/// Check the structural invariants: len matches a full rescan, and every
/// stored nibble is within range.
fn validate_map(map: &PackedMap) {
    let rescan: usize = map.items().count();
    assert_eq!(map.len(), rescan, "len must match a full entry scan");
    for (key, value) in map.items() {
        assert!(value >= 1 && value <= MAX_VALUE, "bad stored value {value}");
        assert!(
            key < 10u64.pow(map.digits()),
            "key {key} outside the addressable range"
        );
    }
}

#[derive(Clone, Debug)]
enum Op {
    Set(u64, u8),
    Remove(u64),
    Get(u64),
    Pop(u64),
    Clear,
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    // digits = 6, so keys 0..1_000_000. Bias towards a narrow band so ops
    // actually collide on keys (and on shared bucket bytes).
    let key = prop_oneof![
        4 => 0u64..2_000,
        1 => 0u64..1_000_000,
    ];
    let value = 0u8..=15;
    let op = prop_oneof![
        50 => (key.clone(), value).prop_map(|(k, v)| Op::Set(k, v)),
        20 => key.clone().prop_map(Op::Remove),
        19 => key.clone().prop_map(Op::Get),
        10 => key.clone().prop_map(Op::Pop),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=500)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut map = PackedMap::new(6);
        let mut model: BTreeMap<u64, u8> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Set(k, v) => {
                    map.set(k, v);
                    // Setting 0 is removal in the model too.
                    if v == 0 {
                        model.remove(&k);
                    } else {
                        model.insert(k, v);
                    }
                }
                Op::Remove(k) => {
                    map.remove(k);
                    model.remove(&k);
                }
                Op::Get(k) => {
                    let got = map.get(k);
                    let expected = model.get(&k).copied().unwrap_or(0);
                    prop_assert_eq!(got, expected);
                }
                Op::Pop(k) => {
                    let got = map.pop(k);
                    let expected = model.remove(&k).unwrap_or(0);
                    prop_assert_eq!(got, expected);
                }
                Op::Clear => {
                    map.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(map.len(), model.len());
        }

        validate_map(&map);
        let got: Vec<(u64, u8)> = map.items().collect();
        let expected: Vec<(u64, u8)> = model.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_addressing_independent(
        entries in prop::collection::btree_map(0u64..1_000_000, 1u8..=15, 1..200)
    ) {
        let mut map = PackedMap::new(6);
        for (&k, &v) in &entries {
            map.set(k, v);
        }
        // No write may have disturbed any other key's slot.
        for (&k, &v) in &entries {
            prop_assert_eq!(map.get(k), v);
        }
        prop_assert_eq!(map.len(), entries.len());

        let got: Vec<u64> = map.keys().collect();
        let expected: Vec<u64> = entries.keys().copied().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_save_load_roundtrip(
        entries in prop::collection::btree_map(0u64..100_000, 1u8..=15, 0..100)
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.nmap");

        let mut map = PackedMap::new(5);
        for (&k, &v) in &entries {
            map.set(k, v);
        }
        map.save(&path).unwrap();

        let mut fresh = PackedMap::new(5);
        fresh.load(&path, false).unwrap();

        let got: Vec<(u64, u8)> = fresh.items().collect();
        let expected: Vec<(u64, u8)> = entries.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(got, expected);
    }
}
