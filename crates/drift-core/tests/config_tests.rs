//! Settings resolution from files on disk

use std::path::PathBuf;

use drift_core::{Error, SettingsOverrides, SettingsResolver, StoreConfig};
use drift_test_utils::TestStores;
use pretty_assertions::assert_eq;

fn resolver(stores: &TestStores) -> SettingsResolver {
    SettingsResolver::new()
        .with_base_dir(stores.root())
        .with_global_config_dir(stores.root().join("user-config"))
        .with_clustername_file(stores.root().join("clustername"))
}

#[test]
fn explicit_config_file_sets_stores_and_system() {
    let stores = TestStores::new();
    let path = stores.write_settings("edison");

    let settings = resolver(&stores)
        .with_config_file(Some(path))
        .resolve(&SettingsOverrides::default())
        .unwrap();

    assert_eq!(settings.system().unwrap(), "edison");
    assert_eq!(settings.store("primary").unwrap().path, stores.store_path("primary"));
    assert_eq!(settings.configset_path, stores.live_path().join("sets"));
    assert_eq!(
        settings.password_file(),
        Some(stores.store_path("secured").join("ansible_vault/ansible.hash"))
    );
}

#[test]
fn overrides_beat_every_file() {
    let stores = TestStores::new();
    let path = stores.write_settings("edison");
    let overrides = SettingsOverrides {
        stores: vec![StoreConfig::new("primary", "/srv/primary")],
        system: Some("cori".into()),
        password_file: Some(PathBuf::from("/root/vault.pw")),
        partition: Some("p1".into()),
        ..Default::default()
    };

    let settings = resolver(&stores)
        .with_config_file(Some(path))
        .resolve(&overrides)
        .unwrap();

    assert_eq!(settings.system().unwrap(), "cori");
    assert_eq!(settings.store("primary").unwrap().path, PathBuf::from("/srv/primary"));
    assert_eq!(settings.password_file(), Some(PathBuf::from("/root/vault.pw")));
    assert_eq!(settings.partition, "p1");
}

#[test]
fn unknown_keys_are_rejected() {
    let stores = TestStores::new();
    std::fs::create_dir_all(stores.root().join("etc")).unwrap();
    std::fs::write(stores.root().join("etc/driftflow.toml"), "sytem = \"typo\"\n").unwrap();

    let result = resolver(&stores).resolve(&SettingsOverrides::default());
    assert!(matches!(result, Err(Error::SettingsParse { .. })));
}

#[test]
fn unknown_store_is_an_error() {
    let stores = TestStores::new();
    let settings = resolver(&stores).resolve(&SettingsOverrides::default()).unwrap();
    assert!(matches!(settings.store("zypper"), Err(Error::UnknownStore(_))));
}
