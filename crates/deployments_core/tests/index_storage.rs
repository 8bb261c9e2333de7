use deployments_core::db::keys::INDEX_UNIQUE_NAME_VERSION;
use deployments_core::{Database, SoftwareImage, SoftwareImageConstructor, SoftwareImagesStorage};
use rusqlite::Connection;

fn image(name: &str, model: &str) -> SoftwareImage {
    SoftwareImage::new(SoftwareImageConstructor::new(name, model))
}

#[test]
fn index_storage_creates_named_unique_index() {
    let db = Database::open_in_memory().unwrap();
    let storage = SoftwareImagesStorage::new(db.clone());

    assert!(!index_exists(&db.session().unwrap(), INDEX_UNIQUE_NAME_VERSION));
    storage.index_storage().unwrap();
    assert!(index_exists(&db.session().unwrap(), INDEX_UNIQUE_NAME_VERSION));
    assert!(index_is_unique(&db.session().unwrap(), INDEX_UNIQUE_NAME_VERSION));
}

#[test]
fn index_storage_is_idempotent() {
    let db = Database::open_in_memory().unwrap();
    let storage = SoftwareImagesStorage::new(db.clone());

    storage.index_storage().unwrap();
    storage.insert(Some(&mut image("app-1.0", "bbb"))).unwrap();
    storage.index_storage().unwrap();

    assert_eq!(storage.find_all().unwrap().len(), 1);
    assert!(storage
        .insert(Some(&mut image("app-1.0", "bbb")))
        .unwrap_err()
        .is_duplicate_key());
}

#[test]
fn index_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    SoftwareImagesStorage::new(Database::open_in_dir(dir.path()).unwrap())
        .index_storage()
        .unwrap();

    let storage = SoftwareImagesStorage::new(Database::open_in_dir(dir.path()).unwrap());
    storage.insert(Some(&mut image("app-1.0", "bbb"))).unwrap();
    assert!(storage
        .insert(Some(&mut image("app-1.0", "bbb")))
        .unwrap_err()
        .is_duplicate_key());
}

#[test]
fn index_storage_fails_when_duplicates_already_exist() {
    let db = Database::open_in_memory().unwrap();
    let storage = SoftwareImagesStorage::new(db.clone());

    storage.insert(Some(&mut image("app-1.0", "bbb"))).unwrap();
    storage.insert(Some(&mut image("app-1.0", "bbb"))).unwrap();

    let err = storage.index_storage().unwrap_err();
    assert!(err.is_duplicate_key(), "unexpected error: {err}");
    assert!(!index_exists(&db.session().unwrap(), INDEX_UNIQUE_NAME_VERSION));
}

fn index_exists(conn: &Connection, name: &str) -> bool {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = ?1);",
        [name],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        == 1
}

fn index_is_unique(conn: &Connection, name: &str) -> bool {
    let mut stmt = conn.prepare("SELECT name, \"unique\" FROM pragma_index_list('images');").unwrap();
    let mut rows = stmt.query([]).unwrap();
    while let Some(row) = rows.next().unwrap() {
        let index_name: String = row.get(0).unwrap();
        if index_name == name {
            return row.get::<_, i64>(1).unwrap() == 1;
        }
    }
    false
}
