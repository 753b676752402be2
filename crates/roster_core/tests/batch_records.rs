use roster_core::db::open_db_in_memory;
use roster_core::{
    with_store, Batch, BatchChoice, BatchKey, NewStudent, SqliteRecordStore, StoreError,
    ValidationError,
};

#[test]
fn add_batch_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    store.add_batch("B1", "Morning").unwrap();

    assert!(store.batch_exists(BatchKey::Name("Morning")).unwrap());
    assert!(store.batch_exists(BatchKey::Id("B1")).unwrap());
    assert_eq!(
        store.list_batches().unwrap(),
        vec![Batch {
            id: "B1".to_string(),
            name: "Morning".to_string(),
        }]
    );
}

#[test]
fn add_batch_rejects_duplicate_id_or_name() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    store.add_batch("B1", "Morning").unwrap();

    let err = store.add_batch("B1", "Evening").unwrap_err();
    assert!(matches!(err, StoreError::DuplicateBatchId(ref id) if id == "B1"));

    let err = store.add_batch("B2", "Morning").unwrap_err();
    assert!(matches!(err, StoreError::DuplicateBatchName(ref name) if name == "Morning"));

    assert_eq!(store.list_batches().unwrap().len(), 1);
}

#[test]
fn add_batch_rejects_blank_input() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let err = store.add_batch("B1", "  ").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::BlankField("name"))
    ));
    assert!(store.list_batch_ids().unwrap().is_empty());
}

#[test]
fn batch_options_always_start_with_no_batch_sentinel() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    assert!(store.list_batch_ids().unwrap().is_empty());
    assert_eq!(store.batch_options().unwrap(), vec![BatchChoice::None]);

    store.add_batch("B2", "Evening").unwrap();
    store.add_batch("B1", "Morning").unwrap();
    assert_eq!(store.list_batch_ids().unwrap(), vec!["B2", "B1"]);
    assert_eq!(
        store.batch_options().unwrap(),
        vec![
            BatchChoice::None,
            BatchChoice::Batch("B2".to_string()),
            BatchChoice::Batch("B1".to_string()),
        ]
    );
}

#[test]
fn delete_batches_drops_associations_but_keeps_students() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    store.add_batch("B1", "Morning").unwrap();
    store.add_batch("B2", "Evening").unwrap();
    store
        .add_student(&NewStudent::new("1", "Ann", "CS", "X").with_batches(vec![
            BatchChoice::Batch("B1".to_string()),
            BatchChoice::Batch("B2".to_string()),
        ]))
        .unwrap();

    let removed = store
        .delete_batches(&["Morning".to_string(), "Unknown".to_string()])
        .unwrap();
    assert_eq!(removed, 1);
    assert!(!store.batch_exists(BatchKey::Id("B1")).unwrap());

    let student = store.get_student("1").unwrap().unwrap();
    assert_eq!(student.batches, vec!["B2"]);
}

#[test]
fn with_store_scopes_connection_per_action() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.sqlite3");

    with_store(&path, |store| store.add_batch("B1", "Morning")).unwrap();

    let err = with_store(&path, |store| store.add_batch("B1", "Other")).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateBatchId(_)));

    let batches = with_store(&path, |store| store.list_batches()).unwrap();
    assert_eq!(batches.len(), 1);
}
