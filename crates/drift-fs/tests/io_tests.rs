use drift_fs::{NormalizedPath, io};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_missing_parents() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("etc/opt/app/app.yaml"));

    io::write_atomic(&path, b"port: 8080\n").unwrap();

    let content = fs::read_to_string(path.to_native()).unwrap();
    assert_eq!(content, "port: 8080\n");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("app.ini");
    fs::write(&file_path, "[main]\nport=1\n").unwrap();

    let path = NormalizedPath::new(&file_path);
    io::write_atomic(&path, b"[main]\nport=2\n").unwrap();

    let content = fs::read_to_string(&file_path).unwrap();
    assert_eq!(content, "[main]\nport=2\n");
}

#[test]
fn test_write_atomic_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("hosts"));

    io::write_atomic(&path, b"127.0.0.1 localhost\n").unwrap();

    let names: Vec<String> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["hosts".to_string()]);
}

#[test]
fn test_read_text_nonexistent_file() {
    let path = NormalizedPath::new("/nonexistent/driftflow/file.txt");
    let result = io::read_text(&path);
    assert!(matches!(result, Err(drift_fs::Error::Io { .. })));
}

#[test]
fn test_copy_file_copies_content() {
    let temp = TempDir::new().unwrap();
    let from = NormalizedPath::new(temp.path().join("live/slurm.conf"));
    let to = NormalizedPath::new(temp.path().join("store/hss/sys_hss/slurm.conf"));
    io::write_text(&from, "ClusterName=sys\n").unwrap();

    io::copy_file(&from, &to).unwrap();

    assert_eq!(io::read_text(&to).unwrap(), "ClusterName=sys\n");
}

#[test]
fn test_ensure_dir_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let dir = NormalizedPath::new(temp.path().join("a/b/c"));

    io::ensure_dir(&dir).unwrap();
    io::ensure_dir(&dir).unwrap();

    assert!(dir.to_native().is_dir());
}
