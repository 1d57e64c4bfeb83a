//! Property-based tests for manifests and verification reports

mod common;

use std::collections::{BTreeMap, BTreeSet};

use common::{RecordingAttributes, RecordingRunner, app_target, collaborators, settings};
use drift_core::{Attributes, Manifest, Reconciler, SaveOutcome};
use drift_test_utils::TestStores;
use proptest::prelude::*;
use serde_yaml::Value;
use tempfile::TempDir;

fn attribute_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z][a-z0-9_]{0,11}".prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        proptest::collection::vec("[a-z]{1,6}", 0..4)
            .prop_map(|items| Value::Sequence(items.into_iter().map(Value::from).collect())),
    ]
}

fn entries() -> impl Strategy<Value = BTreeMap<String, Attributes>> {
    proptest::collection::btree_map(
        "[a-z][a-z0-9_./-]{0,15}",
        proptest::collection::btree_map("[a-z_]{1,10}", attribute_value(), 0..5),
        0..8,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn manifest_round_trips(entries in entries()) {
        let temp = TempDir::new().unwrap();
        let mut manifest = Manifest::load(temp.path()).unwrap();
        for (name, attributes) in &entries {
            manifest.insert(name.clone(), attributes.clone());
        }
        manifest.save().unwrap();

        let mut reloaded = Manifest::load(temp.path()).unwrap();
        prop_assert_eq!(reloaded.entries(), &entries);
        prop_assert_eq!(reloaded.save().unwrap(), SaveOutcome::Identical);
    }
}

#[derive(Debug, Clone)]
enum Presence {
    Desired(u8),
    Observed(u8),
    Both(u8, u8),
}

fn presence() -> impl Strategy<Value = Presence> {
    prop_oneof![
        any::<u8>().prop_map(Presence::Desired),
        any::<u8>().prop_map(Presence::Observed),
        (any::<u8>(), any::<u8>()).prop_map(|(d, o)| Presence::Both(d, o)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn difference_count_matches_components(
        objects in proptest::collection::btree_map("[a-f]{1,3}", presence(), 1..8)
    ) {
        let stores = TestStores::new();
        std::fs::create_dir_all(stores.live_path().join("etc")).unwrap();
        stores.write_desired("primary", "app/app/.keep.yaml", "k: 1\n");
        stores.write_live("etc/.keep.yaml", "k: 1\n");

        let mut expect_desired = BTreeSet::new();
        let mut expect_observed = BTreeSet::new();
        let mut expect_diffs = BTreeSet::new();
        for (stem, presence) in &objects {
            let name = format!("{stem}.yaml");
            match presence {
                Presence::Desired(v) => {
                    stores.write_desired("primary", &format!("app/app/{name}"), &format!("v: {v}\n"));
                    expect_desired.insert(name);
                }
                Presence::Observed(v) => {
                    stores.write_live(&format!("etc/{name}"), &format!("v: {v}\n"));
                    expect_observed.insert(name);
                }
                Presence::Both(d, o) => {
                    stores.write_desired("primary", &format!("app/app/{name}"), &format!("v: {d}\n"));
                    stores.write_live(&format!("etc/{name}"), &format!("v: {o}\n"));
                    if d != o {
                        expect_diffs.insert(name);
                    }
                }
            }
        }

        let runner = RecordingRunner::ok();
        let attributes = RecordingAttributes::default();
        let mut reconciler = Reconciler::new(
            settings(&stores),
            app_target(&stores),
            collaborators(&runner, &attributes),
        )
        .unwrap();
        let report = reconciler.verify().unwrap();
        let result = report.result("app").unwrap();

        prop_assert_eq!(&result.desired_only, &expect_desired);
        prop_assert_eq!(&result.observed_only, &expect_observed);
        prop_assert_eq!(
            result.value_diffs.keys().cloned().collect::<BTreeSet<_>>(),
            expect_diffs
        );
        let components = result.desired_only.len()
            + result.observed_only.len()
            + result.value_diffs.values().map(Vec::len).sum::<usize>()
            + result.permission_violations.len();
        prop_assert_eq!(result.difference_count(), components);
        prop_assert_eq!(report.total_differences(), components);
        prop_assert!(result.desired_only.is_disjoint(&result.observed_only));
    }
}
