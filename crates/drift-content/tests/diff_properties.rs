//! Property tests for the structural differ

use std::collections::BTreeSet;

use drift_content::{DiffKind, DiffPath, DiffSide, diff, diff_tokens};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| Value::from(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-d]{1,2}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

proptest! {
    #[test]
    fn diff_of_value_with_itself_is_empty(value in arb_value()) {
        prop_assert!(diff(&value, &value, &DiffPath::root(), &BTreeSet::new()).is_empty());
    }

    #[test]
    fn reversed_list_has_no_records(items in prop::collection::vec(arb_value(), 0..6)) {
        let mut reversed = items.clone();
        reversed.reverse();
        let records = diff(
            &Value::Array(items),
            &Value::Array(reversed),
            &DiffPath::root(),
            &BTreeSet::new(),
        );
        prop_assert!(records.is_empty());
    }

    #[test]
    fn ignored_key_never_reported(base in prop::collection::btree_map("[a-d]{1,2}", arb_value(), 0..4),
                                  left in arb_value(),
                                  right in arb_value()) {
        let mut desired: Map<String, Value> = base.clone().into_iter().collect();
        let mut observed: Map<String, Value> = base.into_iter().collect();
        desired.insert("zz_ignored".into(), left);
        observed.insert("zz_ignored".into(), right);
        let ignores: BTreeSet<String> = ["zz_ignored".to_string()].into();

        let records = diff(&Value::Object(desired), &Value::Object(observed), &DiffPath::root(), &ignores);
        prop_assert!(records.is_empty());
    }

    #[test]
    fn swapping_sides_swaps_extra_records(desired in arb_value(), observed in arb_value()) {
        let forward = diff(&desired, &observed, &DiffPath::root(), &BTreeSet::new());
        let backward = diff(&observed, &desired, &DiffPath::root(), &BTreeSet::new());

        let extras = |records: &[drift_content::DiffRecord], side: DiffSide| {
            records
                .iter()
                .filter(|r| r.side == side && matches!(r.kind, DiffKind::Extra { .. }))
                .count()
        };
        prop_assert_eq!(extras(&forward, DiffSide::Desired), extras(&backward, DiffSide::Observed));
        prop_assert_eq!(extras(&forward, DiffSide::Observed), extras(&backward, DiffSide::Desired));
    }

    #[test]
    fn token_diff_counts_match_lengths(a in prop::collection::vec("[a-c]", 0..8),
                                        b in prop::collection::vec("[a-c]", 0..8)) {
        let records = diff_tokens(&a, &b);
        let removed = records.iter().filter(|r| r.side == DiffSide::Desired).count();
        let inserted = records.iter().filter(|r| r.side == DiffSide::Observed).count();
        // Both sides drop the same common subsequence
        prop_assert_eq!(a.len() - removed, b.len() - inserted);
    }
}
