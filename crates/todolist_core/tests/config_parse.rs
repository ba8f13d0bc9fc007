use std::path::PathBuf;
use todolist_core::{
    logging_status, open_with_config, start, NewTodo, SqliteTodoRepository, StoreConfig,
    StoreLocation, TodoConfig, TodoRepository,
};

#[test]
fn empty_object_yields_default_config() {
    let config: TodoConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, TodoConfig::default());
    assert_eq!(config.store.name, "todolist_db");
    assert_eq!(config.store.version, 1);
    assert_eq!(config.store.location, StoreLocation::Memory);
    assert!(config.log.is_none());
}

#[test]
fn partial_store_section_keeps_remaining_defaults() {
    let config: TodoConfig = serde_json::from_str(
        r#"{
            "store": { "location": { "directory": "/var/lib/todo" }, "version": 2 },
            "log": { "level": "debug", "dir": "/var/log/todo" }
        }"#,
    )
    .unwrap();

    assert_eq!(
        config.store.location,
        StoreLocation::Directory(PathBuf::from("/var/lib/todo"))
    );
    assert_eq!(config.store.version, 2);
    assert_eq!(config.store.name, "todolist_db");
    assert_eq!(config.store.scan_batch_size, 64);

    let log = config.log.unwrap();
    assert_eq!(log.level, "debug");
    assert_eq!(log.dir, PathBuf::from("/var/log/todo"));
}

#[test]
fn memory_location_parses_from_plain_string() {
    let config: StoreConfig =
        serde_json::from_str(r#"{ "location": "memory", "scan_batch_size": 8 }"#).unwrap();
    assert_eq!(config.location, StoreLocation::Memory);
    assert_eq!(config.scan_batch_size, 8);
}

#[test]
fn parsed_config_opens_a_working_store() {
    let dir = tempfile::tempdir().unwrap();
    let json = serde_json::json!({
        "store": {
            "name": "groceries",
            "location": { "directory": dir.path() },
            "scan_batch_size": 1
        }
    });
    let config: TodoConfig = serde_json::from_value(json).unwrap();

    let handle = open_with_config(&config.store).unwrap();
    assert!(dir.path().join("groceries.sqlite3").exists());

    let mut repo = SqliteTodoRepository::try_new(handle.connection())
        .unwrap()
        .with_scan_batch_size(config.store.scan_batch_size);
    repo.insert_todo(&NewTodo::new("eggs", "")).unwrap();
    repo.insert_todo(&NewTodo::new("bread", "")).unwrap();
    assert_eq!(repo.scan_all().unwrap().count(), 2);
}

#[test]
fn config_with_zero_version_is_refused_by_open() {
    let config: StoreConfig = serde_json::from_str(r#"{ "version": 0 }"#).unwrap();
    assert!(open_with_config(&config).is_err());
}

#[test]
fn configured_batch_size_reaches_the_cursor() {
    let config: StoreConfig =
        serde_json::from_str(r#"{ "location": "memory", "scan_batch_size": 1 }"#).unwrap();
    let handle = open_with_config(&config).unwrap();
    assert_eq!(handle.scan_batch_size(), 1);

    let mut repo = SqliteTodoRepository::from_handle(&handle).unwrap();
    repo.insert_todo(&NewTodo::new("eggs", "")).unwrap();
    repo.insert_todo(&NewTodo::new("bread", "")).unwrap();

    let cursor = repo.scan_all().unwrap();
    assert_eq!(cursor.batch_size(), 1);
    assert_eq!(cursor.count(), 2);
}

#[test]
fn direct_open_keeps_default_batch_size() {
    let handle = todolist_core::open_store_in_memory("todolist_db", 1).unwrap();
    let repo = SqliteTodoRepository::from_handle(&handle).unwrap();
    assert_eq!(repo.scan_all().unwrap().batch_size(), 64);
}

#[test]
fn start_initializes_configured_logging_then_opens_store() {
    let log_dir = std::env::temp_dir().join(format!(
        "todolist-config-parse-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let store_dir = tempfile::tempdir().unwrap();
    let json = serde_json::json!({
        "store": { "location": { "directory": store_dir.path() }, "scan_batch_size": 4 },
        "log": { "level": "info", "dir": log_dir }
    });
    let config: TodoConfig = serde_json::from_value(json).unwrap();

    let handle = start(&config).unwrap();
    assert_eq!(handle.scan_batch_size(), 4);
    assert!(store_dir.path().join("todolist_db.sqlite3").exists());

    let (level, dir) = logging_status().unwrap();
    assert_eq!(level, "info");
    assert_eq!(dir, log_dir);
}
