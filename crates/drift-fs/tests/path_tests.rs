use drift_fs::NormalizedPath;
use rstest::rstest;
use std::path::Path;

#[rstest]
#[case("roles\\common\\main.yml", "roles/common/main.yml")]
#[case("a//b///c", "a/b/c")]
#[case("/etc/hosts", "/etc/hosts")]
fn test_normalize(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(input).as_str(), expected);
}

#[test]
fn test_join_paths() {
    let base = NormalizedPath::new("/var/opt/driftflow/git/primary");
    let joined = base.join("hss").join("p0_hss");
    assert_eq!(joined.as_str(), "/var/opt/driftflow/git/primary/hss/p0_hss");
}

#[test]
fn test_join_onto_empty() {
    let joined = NormalizedPath::new("").join("app.yaml");
    assert_eq!(joined.as_str(), "app.yaml");
}

#[test]
fn test_parent_and_file_name() {
    let path = NormalizedPath::new("/etc/opt/cray/app.yaml");
    assert_eq!(path.file_name(), Some("app.yaml"));
    assert_eq!(path.parent().unwrap().as_str(), "/etc/opt/cray");
    assert_eq!(NormalizedPath::new("/etc").parent().unwrap().as_str(), "/");
    assert_eq!(NormalizedPath::new("name").parent(), None);
}

#[rstest]
#[case("cfg.yaml", Some("yaml"))]
#[case("archive.tar.gz", Some("gz"))]
#[case(".hidden", None)]
#[case("noext", None)]
fn test_extension(#[case] input: &str, #[case] expected: Option<&str>) {
    assert_eq!(NormalizedPath::new(input).extension(), expected);
}

#[test]
fn test_relative_to() {
    let rel = NormalizedPath::relative_to(
        Path::new("/store/cfgset/ansible/roles/x/main.yml"),
        Path::new("/store/cfgset/ansible"),
    );
    assert_eq!(rel.unwrap().as_str(), "roles/x/main.yml");

    assert!(NormalizedPath::relative_to(Path::new("/store"), Path::new("/store")).is_none());
    assert!(NormalizedPath::relative_to(Path::new("/other/file"), Path::new("/store")).is_none());
}

#[test]
fn test_ordering_is_lexical() {
    let mut names = vec![
        NormalizedPath::new("b.yaml"),
        NormalizedPath::new("a/z.yaml"),
        NormalizedPath::new("a.yaml"),
    ];
    names.sort();
    let sorted: Vec<&str> = names.iter().map(|p| p.as_str()).collect();
    assert_eq!(sorted, vec!["a.yaml", "a/z.yaml", "b.yaml"]);
}
