use {
    crate::common::{int, manager},
    catalog::{Error, Result, LOG_FILE_NAME, META_FILE_NAME},
    def::ColumnType,
    std::fs,
    tempfile::tempdir,
};

#[test]
fn create_and_drop() -> Result<()> {
    let temp_dir = tempdir().unwrap();
    let mut manager = manager(temp_dir.path());

    manager.create_database("db1")?;
    let dir = temp_dir.path().join("db1");
    assert!(dir.join(META_FILE_NAME).is_file());
    assert!(dir.join(LOG_FILE_NAME).is_file());

    assert!(matches!(
        manager.create_database("db1"),
        Err(Error::DatabaseExists { .. })
    ));

    manager.drop_database("db1")?;
    assert!(!dir.exists());

    assert!(matches!(
        manager.drop_database("db1"),
        Err(Error::DatabaseNotFound { .. })
    ));

    Ok(())
}

#[test]
fn names_must_be_usable_as_directories() {
    let temp_dir = tempdir().unwrap();
    let mut manager = manager(temp_dir.path());

    for name in ["", "..", "a/b"] {
        assert!(matches!(
            manager.create_database(name),
            Err(Error::InvalidName { .. })
        ));
    }
    assert!(fs::read_dir(temp_dir.path()).unwrap().next().is_none());
}

#[test]
fn open_database_is_exclusive() -> Result<()> {
    let temp_dir = tempdir().unwrap();
    let mut manager = manager(temp_dir.path());
    manager.create_database("db1")?;
    manager.create_database("db2")?;

    assert!(matches!(
        manager.open_database("missing"),
        Err(Error::DatabaseNotFound { .. })
    ));
    assert!(!manager.is_open());

    manager.open_database("db1")?;
    assert_eq!(manager.current_database(), Some("db1"));

    assert!(matches!(
        manager.open_database("db2"),
        Err(Error::DatabaseAlreadyOpen { name }) if name == "db1"
    ));
    assert!(matches!(
        manager.drop_database("db1"),
        Err(Error::DatabaseInUse { .. })
    ));
    manager.drop_database("db2")?;

    manager.close_database()?;
    assert!(!manager.is_open());
    assert!(matches!(
        manager.close_database(),
        Err(Error::NoDatabaseOpen { .. })
    ));
    assert!(matches!(manager.flush(), Err(Error::NoDatabaseOpen { .. })));

    manager.drop_database("db1")?;

    Ok(())
}

#[test]
fn open_database_goes_by_directory_name() -> Result<()> {
    let temp_dir = tempdir().unwrap();
    let mut manager = manager(temp_dir.path());
    manager.create_database("a")?;
    manager.create_database("c")?;
    fs::rename(temp_dir.path().join("a"), temp_dir.path().join("b")).unwrap();

    manager.open_database("b")?;
    assert_eq!(manager.current_database(), Some("b"));
    assert!(matches!(
        manager.drop_database("b"),
        Err(Error::DatabaseInUse { name }) if name == "b"
    ));
    assert!(matches!(
        manager.open_database("c"),
        Err(Error::DatabaseAlreadyOpen { name }) if name == "b"
    ));
    assert!(temp_dir.path().join("b").is_dir());

    manager.close_database()?;
    manager.drop_database("b")?;
    assert!(!temp_dir.path().join("b").exists());

    Ok(())
}

#[test]
fn catalog_survives_reopen() -> Result<()> {
    let temp_dir = tempdir().unwrap();
    let mut manager = manager(temp_dir.path());

    manager.create_database("db1")?;
    manager.open_database("db1")?;
    manager.create_table("t", &[int("a"), int("b")])?;
    manager.create_index("t", &["a"])?;

    let before = manager.database()?.clone();
    let table = manager.table("t")?;
    assert_eq!(table.record_size(), 8);
    assert_eq!(
        table.columns.iter().map(|c| c.offset).collect::<Vec<_>>(),
        vec![0, 4]
    );
    assert_eq!(table.indexes[0].key_len, 4);

    manager.close_database()?;
    assert_eq!(manager.handle_counts(), (0, 0));

    manager.open_database("db1")?;
    assert_eq!(manager.database()?, &before);
    assert_eq!(manager.handle_counts(), (1, 1));
    assert!(manager.index_handle("t", &["a"]).is_some());

    let columns = manager.desc_table("t")?;
    assert_eq!(columns[0].ty, ColumnType::Int);
    assert!(columns[0].indexed);
    assert!(!columns[1].indexed);

    Ok(())
}

#[test]
fn dropping_the_manager_closes_the_database() -> Result<()> {
    let temp_dir = tempdir().unwrap();

    {
        let mut manager = manager(temp_dir.path());
        manager.create_database("db1")?;
        manager.open_database("db1")?;
        manager.create_table("t", &[int("a")])?;
    }

    let mut manager = manager(temp_dir.path());
    manager.open_database("db1")?;
    assert_eq!(manager.show_tables()?, vec!["t"]);

    Ok(())
}

#[test]
fn corrupt_catalog_is_reported() -> Result<()> {
    let temp_dir = tempdir().unwrap();
    let mut manager = manager(temp_dir.path());
    manager.create_database("db1")?;

    let path = temp_dir.path().join("db1").join(META_FILE_NAME);
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    fs::write(&path, bytes).unwrap();

    assert!(matches!(
        manager.open_database("db1"),
        Err(Error::MetadataCorrupt { .. })
    ));
    assert!(!manager.is_open());

    fs::remove_file(&path).unwrap();
    assert!(matches!(
        manager.open_database("db1"),
        Err(Error::MetadataCorrupt { .. })
    ));

    Ok(())
}
