//! Several store instances over one directory, as separate processes would see it.

use boundary_secrets::{FileSecretStore, KeySource, MasterKey, SecretOptions, SecretStore};
use tempfile::TempDir;

fn opts() -> SecretOptions {
    SecretOptions::new().environment("test")
}

#[tokio::test]
async fn test_second_instance_reads_first_instance_writes() {
    let dir = TempDir::new().unwrap();
    let first = FileSecretStore::open(dir.path().to_path_buf(), "test").await.unwrap();
    let second = FileSecretStore::open(dir.path().to_path_buf(), "test").await.unwrap();

    assert!(matches!(first.key_source().await, KeySource::File(_)));

    first.store("shared", "value-1", opts()).await.unwrap();
    let got = second.get("shared", None).await.unwrap().unwrap();
    assert_eq!(got.expose(), "value-1");

    let meta = second.update("shared", "value-2", opts()).await.unwrap();
    assert_eq!(meta.version, 2);
    assert_eq!(first.get("shared", None).await.unwrap().unwrap().expose(), "value-2");
}

#[tokio::test]
async fn test_rotation_persists_key_for_new_instances() {
    let dir = TempDir::new().unwrap();
    let key = MasterKey::generate();
    let store = FileSecretStore::with_master_key(dir.path().to_path_buf(), "test", key);

    store.store("a", "alpha", opts()).await.unwrap();
    store.store("b", "beta", opts().tags(["x"])).await.unwrap();

    let report = store.rotate_master_key().await.unwrap();
    assert_eq!(report.rotated, 2);

    // A fresh instance picks up the rotated key from disk.
    let reopened = FileSecretStore::open(dir.path().to_path_buf(), "test").await.unwrap();
    assert_eq!(reopened.get("a", None).await.unwrap().unwrap().expose(), "alpha");
    assert_eq!(reopened.get("b", None).await.unwrap().unwrap().expose(), "beta");

    let listed = reopened.list(None).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[1].tags.contains("x"));
}

#[tokio::test]
async fn test_wrong_key_cannot_read() {
    let dir = TempDir::new().unwrap();
    let writer =
        FileSecretStore::with_master_key(dir.path().to_path_buf(), "test", MasterKey::generate());
    writer.store("k", "v", opts()).await.unwrap();

    let reader =
        FileSecretStore::with_master_key(dir.path().to_path_buf(), "test", MasterKey::generate());
    assert!(reader.get("k", None).await.is_err());
    assert!(!reader.validate("k", None).await);
}
