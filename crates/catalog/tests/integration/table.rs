use {
    crate::common::{int, manager, text, Manager},
    catalog::{Error, Result},
    def::{ColumnDef, ColumnType},
    tempfile::{tempdir, TempDir},
};

fn open() -> Result<(TempDir, Manager)> {
    let temp_dir = tempdir().unwrap();
    let mut manager = manager(temp_dir.path());
    manager.create_database("shop")?;
    manager.open_database("shop")?;

    Ok((temp_dir, manager))
}

#[test]
fn create_table_lays_out_columns() -> Result<()> {
    let (temp_dir, mut manager) = open()?;

    manager.create_table(
        "orders",
        &[
            int("id"),
            text("customer", 16),
            ColumnDef::new("total", ColumnType::Float, 8),
        ],
    )?;

    let table = manager.table("orders")?;
    assert_eq!(table.record_size(), 28);
    assert_eq!(table.column("total").unwrap().offset, 20);
    assert!(table.indexes.is_empty());

    assert!(temp_dir.path().join("shop").join("orders").is_file());
    assert_eq!(manager.heap_handle("orders").unwrap().record_size(), 28);
    assert_eq!(manager.handle_counts(), (1, 0));

    let columns = manager.desc_table("orders")?;
    assert_eq!(
        columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["id", "customer", "total"]
    );
    assert_eq!(columns[1].ty, ColumnType::Char);
    assert_eq!(columns[1].len, 16);

    Ok(())
}

#[test]
fn existing_table_is_left_alone() -> Result<()> {
    let (_temp_dir, mut manager) = open()?;
    manager.create_table("t", &[int("a")])?;
    let before = manager.database()?.clone();

    assert!(matches!(
        manager.create_table("t", &[int("a"), int("b")]),
        Err(Error::TableExists { .. })
    ));
    assert_eq!(manager.database()?, &before);
    assert_eq!(manager.handle_counts(), (1, 0));

    Ok(())
}

#[test]
fn column_lists_are_checked() -> Result<()> {
    let (temp_dir, mut manager) = open()?;

    assert!(matches!(
        manager.create_table("t", &[]),
        Err(Error::NoColumns { .. })
    ));
    assert!(matches!(
        manager.create_table("t", &[int("a"), int("a")]),
        Err(Error::DuplicateColumn { column, .. }) if column == "a"
    ));
    assert!(matches!(
        manager.create_table("t", &[ColumnDef::new("a", ColumnType::Int, 8)]),
        Err(Error::InvalidColumn { .. })
    ));
    assert!(matches!(
        manager.create_table("t", &[text("a", 0)]),
        Err(Error::InvalidColumn { .. })
    ));
    assert!(matches!(
        manager.create_table("t.idx", &[int("a")]),
        Err(Error::InvalidName { .. })
    ));

    assert!(matches!(
        manager.create_table("t", &[int("a"), text("b/c", 4)]),
        Err(Error::InvalidColumn { column, .. }) if column == "b/c"
    ));

    assert!(manager.show_tables()?.is_empty());
    assert!(!temp_dir.path().join("shop").join("t").exists());

    Ok(())
}

#[test]
fn record_size_must_fit_in_u32() -> Result<()> {
    let (temp_dir, mut manager) = open()?;

    assert!(matches!(
        manager.create_table("t", &[text("a", 3_000_000_000), text("b", 3_000_000_000)]),
        Err(Error::InvalidColumn { column, .. }) if column == "b"
    ));
    assert!(manager.show_tables()?.is_empty());
    assert_eq!(manager.handle_counts(), (0, 0));
    assert!(!temp_dir.path().join("shop").join("t").exists());

    Ok(())
}

#[test]
fn drop_table_removes_indexes() -> Result<()> {
    let (temp_dir, mut manager) = open()?;
    let dir = temp_dir.path().join("shop");

    manager.create_table("t", &[int("a"), int("b")])?;
    manager.create_table("u", &[int("x")])?;
    manager.create_index("t", &["a"])?;
    manager.create_index("t", &["b", "a"])?;
    assert_eq!(manager.handle_counts(), (2, 2));

    manager.drop_table("t")?;

    assert_eq!(manager.show_tables()?, vec!["u"]);
    assert_eq!(manager.handle_counts(), (1, 0));
    assert!(!dir.join("t").exists());
    assert!(!dir.join("t_a.idx").exists());
    assert!(!dir.join("t_b_a.idx").exists());

    manager.close_database()?;
    manager.open_database("shop")?;
    assert_eq!(manager.show_tables()?, vec!["u"]);

    let before = manager.database()?.clone();
    let counts = manager.handle_counts();
    assert!(matches!(
        manager.drop_table("t"),
        Err(Error::TableNotFound { .. })
    ));
    assert_eq!(manager.database()?, &before);
    assert_eq!(manager.handle_counts(), counts);

    Ok(())
}

#[test]
fn table_operations_need_an_open_database() {
    let temp_dir = tempdir().unwrap();
    let mut manager = manager(temp_dir.path());

    assert!(matches!(
        manager.create_table("t", &[int("a")]),
        Err(Error::NoDatabaseOpen { .. })
    ));
    assert!(matches!(
        manager.drop_table("t"),
        Err(Error::NoDatabaseOpen { .. })
    ));
    assert!(matches!(
        manager.show_tables(),
        Err(Error::NoDatabaseOpen { .. })
    ));
    assert!(matches!(
        manager.desc_table("t"),
        Err(Error::NoDatabaseOpen { .. })
    ));
}
