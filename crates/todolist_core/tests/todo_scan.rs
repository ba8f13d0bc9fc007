use rusqlite::Connection;
use todolist_core::{
    open_store, open_store_in_memory, NewTodo, ReadError, SqliteTodoRepository, TodoRepository,
    TxPhase,
};

#[test]
fn scan_yields_records_in_insertion_order() {
    let handle = open_store_in_memory("todolist_db", 1).unwrap();
    let mut repo = SqliteTodoRepository::try_new(handle.connection()).unwrap();
    for title in ["A", "B", "C"] {
        repo.insert_todo(&NewTodo::new(title, "")).unwrap();
    }

    let records: Vec<_> = repo.scan_all().unwrap().map(Result::unwrap).collect();
    let titles: Vec<&str> = records.iter().map(|record| record.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
    assert!(records.windows(2).all(|pair| pair[0].id < pair[1].id));
}

#[test]
fn scan_of_empty_table_ends_immediately() {
    let handle = open_store_in_memory("todolist_db", 1).unwrap();
    let repo = SqliteTodoRepository::try_new(handle.connection()).unwrap();

    let mut cursor = repo.scan_all().unwrap();
    assert!(cursor.next().is_none());
    assert!(cursor.next().is_none());
    assert_eq!(cursor.yielded(), 0);
}

#[test]
fn small_batches_walk_the_whole_table_lazily() {
    let handle = open_store_in_memory("todolist_db", 1).unwrap();
    let mut repo = SqliteTodoRepository::try_new(handle.connection())
        .unwrap()
        .with_scan_batch_size(2);
    for index in 0..5 {
        repo.insert_todo(&NewTodo::new(format!("item {index}"), ""))
            .unwrap();
    }

    let mut cursor = repo.scan_all().unwrap();
    let first_three: Vec<_> = cursor.by_ref().take(3).map(Result::unwrap).collect();
    assert_eq!(first_three.len(), 3);
    assert_eq!(cursor.yielded(), 3);

    let rest: Vec<_> = cursor.map(Result::unwrap).collect();
    let titles: Vec<String> = rest.into_iter().map(|record| record.title).collect();
    assert_eq!(titles, vec!["item 3".to_string(), "item 4".to_string()]);
}

#[test]
fn every_scan_starts_from_the_beginning() {
    let handle = open_store_in_memory("todolist_db", 1).unwrap();
    let mut repo = SqliteTodoRepository::try_new(handle.connection()).unwrap();
    repo.insert_todo(&NewTodo::new("one", "")).unwrap();
    repo.insert_todo(&NewTodo::new("two", "")).unwrap();

    let mut partial = repo.scan_all().unwrap();
    assert_eq!(partial.next().unwrap().unwrap().title, "one");
    drop(partial);

    let full: Vec<_> = repo.scan_all().unwrap().map(Result::unwrap).collect();
    assert_eq!(full.len(), 2);
    assert_eq!(full[0].title, "one");
}

#[test]
fn commit_from_another_connection_is_visible_to_later_scans() {
    let dir = tempfile::tempdir().unwrap();
    let handle = open_store(dir.path(), "todolist_db", 1).unwrap();
    let repo = SqliteTodoRepository::try_new(handle.connection()).unwrap();
    assert_eq!(repo.scan_all().unwrap().count(), 0);

    let writer_handle = open_store(dir.path(), "todolist_db", 1).unwrap();
    let mut writer = SqliteTodoRepository::try_new(writer_handle.connection()).unwrap();
    writer.insert_todo(&NewTodo::new("from writer", "")).unwrap();

    let titles: Vec<String> = repo
        .scan_all()
        .unwrap()
        .map(|record| record.unwrap().title)
        .collect();
    assert_eq!(titles, vec!["from writer".to_string()]);
}

#[test]
fn scan_fails_with_read_error_when_table_is_gone() {
    let handle = open_store_in_memory("todolist_db", 1).unwrap();
    let repo = SqliteTodoRepository::try_new(handle.connection()).unwrap();
    handle
        .connection()
        .execute_batch("DROP TABLE todolist_os;")
        .unwrap();

    let err = repo.scan_all().err().unwrap();
    assert!(matches!(err, ReadError::Open(_)));
}

#[test]
fn invalid_persisted_id_is_reported_not_masked() {
    let dir = tempfile::tempdir().unwrap();
    let handle = open_store(dir.path(), "todolist_db", 1).unwrap();
    let raw = Connection::open(dir.path().join("todolist_db.sqlite3")).unwrap();
    raw.execute(
        "INSERT INTO todolist_os (id, title, description) VALUES (-4, 'bad', '');",
        [],
    )
    .unwrap();

    let repo = SqliteTodoRepository::try_new(handle.connection()).unwrap();
    let err = repo.scan_all().err().unwrap();
    assert!(matches!(err, ReadError::InvalidData(message) if message.contains("-4")));
}

#[test]
fn cursor_never_observes_commits_made_after_it_opened() {
    let dir = tempfile::tempdir().unwrap();
    let handle = open_store(dir.path(), "todolist_db", 1).unwrap();
    let mut repo = SqliteTodoRepository::try_new(handle.connection())
        .unwrap()
        .with_scan_batch_size(1);
    for title in ["a", "b", "c"] {
        repo.insert_todo(&NewTodo::new(title, "")).unwrap();
    }

    let mut cursor = repo.scan_all().unwrap();
    assert_eq!(cursor.next().unwrap().unwrap().title, "a");

    let writer_handle = open_store(dir.path(), "todolist_db", 1).unwrap();
    let mut writer = SqliteTodoRepository::try_new(writer_handle.connection()).unwrap();
    writer.insert_todo(&NewTodo::new("late", "")).unwrap();

    let rest: Vec<String> = cursor.map(|record| record.unwrap().title).collect();
    assert_eq!(rest, vec!["b".to_string(), "c".to_string()]);

    let titles: Vec<String> = repo
        .scan_all()
        .unwrap()
        .map(|record| record.unwrap().title)
        .collect();
    assert_eq!(titles, vec!["a", "b", "c", "late"]);
}

#[test]
fn second_cursor_on_busy_connection_is_refused_not_shared() {
    let handle = open_store_in_memory("todolist_db", 1).unwrap();
    let mut repo = SqliteTodoRepository::try_new(handle.connection())
        .unwrap()
        .with_scan_batch_size(1);
    for title in ["a", "b", "c"] {
        repo.insert_todo(&NewTodo::new(title, "")).unwrap();
    }

    let mut first = repo.scan_all().unwrap();
    assert_eq!(first.next().unwrap().unwrap().title, "a");
    let err = repo.scan_all().err().unwrap();
    assert!(matches!(err, ReadError::ConnectionBusy));

    drop(first);
    assert_eq!(repo.scan_all().unwrap().count(), 3);
}

#[test]
fn write_through_other_repository_fails_while_cursor_holds_connection() {
    let handle = open_store_in_memory("todolist_db", 1).unwrap();
    let mut reader = SqliteTodoRepository::try_new(handle.connection())
        .unwrap()
        .with_scan_batch_size(1);
    reader.insert_todo(&NewTodo::new("a", "")).unwrap();
    reader.insert_todo(&NewTodo::new("b", "")).unwrap();
    let mut writer = SqliteTodoRepository::try_new(handle.connection()).unwrap();

    let mut cursor = reader.scan_all().unwrap();
    cursor.next().unwrap().unwrap();
    let err = writer.insert_todo(&NewTodo::new("blocked", "")).unwrap_err();
    assert_eq!(err.phase, TxPhase::Idle);

    drop(cursor);
    writer.insert_todo(&NewTodo::new("after", "")).unwrap();
    assert_eq!(reader.scan_all().unwrap().count(), 3);
}
