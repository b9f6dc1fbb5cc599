use studyplan::storage::Store;
use tempfile::TempDir;

/// Runs `f` against a store in a fresh temporary directory.
pub fn with_test_store<F>(f: F)
where
    F: FnOnce(Store),
{
    let dir = TempDir::new().unwrap();
    let store = Store::open(dir.path().join("store.json"));
    f(store);
}
