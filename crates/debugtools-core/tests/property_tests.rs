//! Property-based tests for metadata merging and level handling
//!
//! Uses proptest to verify precedence and totality of the three-way merge.

use proptest::prelude::*;

use debugtools_core::{merge_metadata, LogLevel, Metadata, MetadataValue};

// ============================================================================
// Strategy Generators
// ============================================================================

/// Small key space so the three sources collide often
fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-e]").expect("valid regex")
}

fn leaf_strategy() -> impl Strategy<Value = MetadataValue> {
    prop::string::string_regex("[a-z0-9]{0,8}")
        .expect("valid regex")
        .prop_map(MetadataValue::String)
}

/// Recursive values: strings, arrays and nested maps
fn value_strategy() -> impl Strategy<Value = MetadataValue> {
    leaf_strategy().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(MetadataValue::Array),
            prop::collection::btree_map(key_strategy(), inner, 0..4).prop_map(MetadataValue::Map),
        ]
    })
}

fn metadata_strategy() -> impl Strategy<Value = Metadata> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 0..5)
}

fn level_strategy() -> impl Strategy<Value = LogLevel> {
    prop::sample::select(LogLevel::ALL.to_vec())
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Every key takes the value of the most specific source that has it
    #[test]
    fn merge_precedence(
        call in prop::option::of(metadata_strategy()),
        handler in metadata_strategy(),
        provided in metadata_strategy(),
    ) {
        let merged = merge_metadata(call.clone(), &handler, provided.clone());
        let call = call.unwrap_or_default();

        for (key, value) in &merged {
            let expected = call
                .get(key)
                .or_else(|| handler.get(key))
                .or_else(|| provided.get(key));
            prop_assert_eq!(Some(value), expected);
        }
    }

    /// The merged key set is exactly the union of the three sources
    #[test]
    fn merge_totality(
        call in prop::option::of(metadata_strategy()),
        handler in metadata_strategy(),
        provided in metadata_strategy(),
    ) {
        let merged = merge_metadata(call.clone(), &handler, provided.clone());

        let mut keys: Vec<&String> = call
            .iter()
            .flat_map(|c| c.keys())
            .chain(handler.keys())
            .chain(provided.keys())
            .collect();
        keys.sort();
        keys.dedup();

        prop_assert_eq!(merged.keys().collect::<Vec<_>>(), keys);
    }

    /// Merging is deterministic for identical inputs
    #[test]
    fn merge_is_deterministic(
        call in prop::option::of(metadata_strategy()),
        handler in metadata_strategy(),
        provided in metadata_strategy(),
    ) {
        let first = merge_metadata(call.clone(), &handler, provided.clone());
        let second = merge_metadata(call, &handler, provided);
        prop_assert_eq!(first, second);
    }

    /// A source alone passes through unchanged
    #[test]
    fn merge_single_source_is_identity(meta in metadata_strategy()) {
        let empty = Metadata::new();
        prop_assert_eq!(merge_metadata(Some(meta.clone()), &empty, Metadata::new()), meta.clone());
        prop_assert_eq!(merge_metadata(None, &meta, Metadata::new()), meta.clone());
        prop_assert_eq!(merge_metadata(None, &empty, meta.clone()), meta);
    }

    /// Level names parse back to the same level, in any case
    #[test]
    fn level_name_parses_back(level in level_strategy(), upper in any::<bool>()) {
        let name = if upper { level.as_str().to_uppercase() } else { level.as_str().to_string() };
        prop_assert_eq!(name.parse::<LogLevel>().unwrap(), level);
    }

    /// Ordering of levels follows their position in ALL
    #[test]
    fn level_order_matches_severity(a in level_strategy(), b in level_strategy()) {
        let pos = |l: LogLevel| LogLevel::ALL.iter().position(|x| *x == l).unwrap();
        prop_assert_eq!(a.cmp(&b), pos(a).cmp(&pos(b)));
    }
}
