use {
    crate::common::{int, manager, text, Manager},
    catalog::{Error, Result},
    std::fs,
    tempfile::{tempdir, TempDir},
};

fn open_with_table() -> Result<(TempDir, Manager)> {
    let temp_dir = tempdir().unwrap();
    let mut manager = manager(temp_dir.path());
    manager.create_database("db1")?;
    manager.open_database("db1")?;
    manager.create_table("t", &[int("a"), text("b", 12), int("c")])?;

    Ok((temp_dir, manager))
}

#[test]
fn create_and_drop_index() -> Result<()> {
    let (temp_dir, mut manager) = open_with_table()?;
    let file = temp_dir.path().join("db1").join("t_b.idx");

    manager.create_index("t", &["b"])?;

    let table = manager.table("t")?;
    assert_eq!(table.indexes.len(), 1);
    assert_eq!(table.indexes[0].key_len, 12);
    assert!(table.column("b").unwrap().indexed);
    assert!(file.is_file());
    assert_eq!(manager.index_handle("t", &["b"]).unwrap().key_len(), 12);

    manager.drop_index("t", &["b"])?;

    let table = manager.table("t")?;
    assert!(table.indexes.is_empty());
    assert!(!table.column("b").unwrap().indexed);
    assert!(!file.exists());
    assert_eq!(manager.handle_counts(), (1, 0));

    assert!(matches!(
        manager.drop_index("t", &["b"]),
        Err(Error::IndexNotFound { .. })
    ));

    Ok(())
}

#[test]
fn column_order_makes_a_different_index() -> Result<()> {
    let (_temp_dir, mut manager) = open_with_table()?;

    manager.create_index("t", &["a", "c"])?;
    manager.create_index("t", &["c", "a"])?;
    assert!(matches!(
        manager.create_index("t", &["a", "c"]),
        Err(Error::IndexExists { .. })
    ));

    let table = manager.table("t")?;
    assert_eq!(table.indexes.len(), 2);
    assert!(table.columns.iter().all(|c| !c.indexed));

    let columns = table.resolve_columns(&["c", "a"]).unwrap();
    manager.drop_index_by_columns("t", &columns)?;

    let table = manager.table("t")?;
    assert_eq!(table.indexes.len(), 1);
    assert_eq!(table.indexes[0].columns, vec!["a", "c"]);

    Ok(())
}

#[test]
fn bad_index_requests_change_nothing() -> Result<()> {
    let (_temp_dir, mut manager) = open_with_table()?;
    manager.create_index("t", &["a"])?;
    let before = manager.database()?.clone();

    assert!(matches!(
        manager.create_index("missing", &["a"]),
        Err(Error::TableNotFound { .. })
    ));
    assert!(matches!(
        manager.create_index("t", &["a", "zz"]),
        Err(Error::ColumnNotFound { column, .. }) if column == "zz"
    ));
    assert!(matches!(
        manager.create_index::<&str>("t", &[]),
        Err(Error::InvalidIndex { .. })
    ));
    assert!(matches!(
        manager.create_index("t", &["b", "b"]),
        Err(Error::DuplicateColumn { .. })
    ));
    assert!(matches!(
        manager.create_index("t", &["a"]),
        Err(Error::IndexExists { .. })
    ));
    assert!(matches!(
        manager.drop_index("missing", &["a"]),
        Err(Error::TableNotFound { .. })
    ));
    assert!(matches!(
        manager.drop_index("t", &["c"]),
        Err(Error::IndexNotFound { .. })
    ));

    assert_eq!(manager.database()?, &before);
    assert_eq!(manager.handle_counts(), (1, 1));

    Ok(())
}

#[test]
fn stray_index_file_blocks_creation() -> Result<()> {
    let (temp_dir, mut manager) = open_with_table()?;
    fs::write(temp_dir.path().join("db1").join("t_c.idx"), b"leftover").unwrap();

    assert!(matches!(
        manager.create_index("t", &["c"]),
        Err(Error::IndexExists { .. })
    ));
    assert!(manager.table("t")?.indexes.is_empty());

    Ok(())
}

#[test]
fn underscores_keep_index_files_apart() -> Result<()> {
    let temp_dir = tempdir().unwrap();
    let dir = temp_dir.path().join("db1");
    let mut manager = manager(temp_dir.path());
    manager.create_database("db1")?;
    manager.open_database("db1")?;
    manager.create_table("t", &[int("a_b"), int("a"), int("b")])?;

    manager.create_index("t", &["a_b"])?;
    manager.create_index("t", &["a", "b"])?;

    assert!(dir.join("t_a%5Fb.idx").is_file());
    assert!(dir.join("t_a_b.idx").is_file());
    assert_eq!(manager.table("t")?.indexes.len(), 2);
    assert_eq!(manager.handle_counts(), (1, 2));

    manager.drop_index("t", &["a_b"])?;
    assert!(manager.index_handle("t", &["a", "b"]).is_some());
    assert!(dir.join("t_a_b.idx").is_file());

    Ok(())
}
