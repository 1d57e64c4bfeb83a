//! Parse-then-diff flows across the registry

use std::collections::BTreeSet;
use std::sync::Arc;

use drift_content::{
    Classification, DecryptError, DiffKind, DiffPath, DiffSide, FormatKind, Parsed,
    ParserRegistry, SecretDecryptor, classify, diff, diff_tokens, worksheet,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

struct PlainVault;

impl SecretDecryptor for PlainVault {
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError> {
        ciphertext
            .strip_prefix("$ANSIBLE_VAULT;1.1;AES256\n")
            .map(str::to_string)
            .ok_or_else(|| DecryptError::Failed("not a vault".into()))
    }
}

fn structured(registry: &ParserRegistry, kind: FormatKind, text: &str) -> serde_json::Value {
    match registry.parse(kind, text).unwrap() {
        Parsed::Structured(value) => value,
        other => panic!("expected structured content, got {other:?}"),
    }
}

#[test]
fn yaml_app_scenario_reports_two_records() {
    let registry = ParserRegistry::new();
    let Classification::Known(kind) = classify("app.yaml", None, "sys") else {
        panic!("app.yaml must classify");
    };
    let desired = structured(&registry, kind, "port: 8080\ndebug: true\n");
    let observed = structured(&registry, kind, "port: 8081\n");

    let records = diff(&desired, &observed, &DiffPath::root(), &BTreeSet::new());

    assert_eq!(records.len(), 2);
    assert!(records.iter().any(|r| r.side == DiffSide::Desired
        && r.path.to_string() == "debug"
        && matches!(r.kind, DiffKind::Extra { .. })));
    assert!(records.iter().any(|r| r.path.to_string() == "port"
        && r.kind == DiffKind::ValueMismatch { desired: json!(8080), observed: json!(8081) }));
}

#[rstest]
#[case(FormatKind::Json, r#"{"a": [1, 2], "b": {"c": "x"}}"#, r#"{"b": {"c": "x"}, "a": [2, 1]}"#)]
#[case(FormatKind::Ini, "[s]\nA = 1\nb: 2\n", "[s]\nb=2\na=1\n")]
#[case(FormatKind::KeyValue, "a=1\nb=2\n", "# generated\nb = 2\na = 1\n")]
#[case(FormatKind::KeySpaceValue, "a 1\nb 2\n", "b    2\na\t1\n")]
fn formatting_differences_are_not_drift(
    #[case] kind: FormatKind,
    #[case] desired: &str,
    #[case] observed: &str,
) {
    let registry = ParserRegistry::new();
    let records = diff(
        &structured(&registry, kind, desired),
        &structured(&registry, kind, observed),
        &DiffPath::root(),
        &BTreeSet::new(),
    );
    assert!(records.is_empty(), "unexpected records: {records:?}");
}

#[test]
fn ini_value_change_is_located_by_section() {
    let registry = ParserRegistry::new();
    let records = diff(
        &structured(&registry, FormatKind::Ini, "[db]\nport = 5432\n"),
        &structured(&registry, FormatKind::Ini, "[db]\nport = 5433\n"),
        &DiffPath::root(),
        &BTreeSet::new(),
    );
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].to_string(), "db.port: desired 5432 != observed 5433");
}

#[test]
fn raw_content_uses_token_diff() {
    let registry = ParserRegistry::new();
    let (Parsed::Tokens(desired), Parsed::Tokens(observed)) = (
        registry.parse(FormatKind::Raw, "ClusterName=sys\nSlurmctldPort=6817\n").unwrap(),
        registry.parse(FormatKind::Raw, "ClusterName=sys\nSlurmctldPort=6818\n").unwrap(),
    ) else {
        panic!("raw content must tokenize");
    };

    let records = diff_tokens(&desired, &observed);
    let rendered: Vec<String> = records.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "desired: SlurmctldPort=6817".to_string(),
            "observed: SlurmctldPort=6818".to_string(),
        ]
    );
}

#[test]
fn vault_is_skipped_without_key_material() {
    let registry = ParserRegistry::new();
    let parsed = registry
        .parse(FormatKind::AnsibleVaultYaml, "$ANSIBLE_VAULT;1.1;AES256\nsecret: 1\n")
        .unwrap();
    assert!(matches!(parsed, Parsed::Skipped(_)));
}

#[test]
fn vault_is_compared_after_decryption() {
    let registry = ParserRegistry::with_decryptor(Arc::new(PlainVault));
    let desired = structured(
        &registry,
        FormatKind::AnsibleVaultYaml,
        "$ANSIBLE_VAULT;1.1;AES256\ndb_password: a\n",
    );
    let observed = structured(
        &registry,
        FormatKind::AnsibleVaultYaml,
        "$ANSIBLE_VAULT;1.1;AES256\ndb_password: b\n",
    );
    let records = diff(&desired, &observed, &DiffPath::root(), &BTreeSet::new());
    assert_eq!(records.len(), 1);
}

#[test]
fn worksheet_compares_against_nested_config() {
    let registry = ParserRegistry::new();
    let sheet = structured(&registry, FormatKind::Yaml, "cray_net.enabled: true\ncray_net.mtu: 9000\n");
    let config = structured(&registry, FormatKind::Yaml, "cray_net:\n  enabled: true\n  mtu: 1500\n");

    let records = diff(
        &worksheet::expand_dotted_keys(&sheet),
        &config,
        &DiffPath::root(),
        &BTreeSet::new(),
    );
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].path.to_string(), "cray_net.mtu");
}
