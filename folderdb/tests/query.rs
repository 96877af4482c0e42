use chrono::{TimeZone, Utc};
use folderdb::{AttributeInput, FileId, Predicate, QueryOptions};
use serde_json::json;
use tempfile::tempdir;

mod common;

fn ids(records: &[folderdb::FileRecord]) -> Vec<FileId> {
    records.iter().map(|r| r.id).collect()
}

#[test]
fn test_query_equality_and_range() {
    let dir = tempdir().unwrap();
    let folder = common::setup_folder(&dir);

    let a = common::create_dummy_file(&dir, "a.txt", "a");
    let b = common::create_dummy_file(&dir, "b.txt", "b");
    let c = common::create_dummy_file(&dir, "c.txt", "c");
    let id_a = folder
        .store(&a, common::attrs(&[("color", "red".into()), ("size", 10.into())]))
        .unwrap();
    let id_b = folder
        .store(&b, common::attrs(&[("color", "red".into()), ("size", 11.into())]))
        .unwrap();
    let _id_c = folder
        .store(&c, common::attrs(&[("color", "blue".into()), ("size", 12.into())]))
        .unwrap();

    let red = folder
        .query(&Predicate::new().equals("color", "red"), None)
        .unwrap();
    assert_eq!(ids(&red), vec![id_a, id_b]);

    let big_red = Predicate::new().equals("color", "red").op("size", "$gte", 11);
    assert_eq!(ids(&folder.query(&big_red, None).unwrap()), vec![id_b]);

    let small = Predicate::new().op("size", "$lt", 11);
    assert_eq!(ids(&folder.query(&small, None).unwrap()), vec![id_a]);

    let mid = Predicate::new().op("size", "$lte", 11).op("color", "$gt", "blue");
    assert_eq!(ids(&folder.query(&mid, None).unwrap()), vec![id_a, id_b]);
}

#[test]
fn test_query_from_json_predicate() {
    let dir = tempdir().unwrap();
    let folder = common::setup_folder(&dir);

    let one = common::create_dummy_file(&dir, "one.txt", "1");
    let two = common::create_dummy_file(&dir, "two.txt", "2");
    let _id_one = folder
        .store(&one, common::attrs(&[("a", "x".into()), ("b", 1.into())]))
        .unwrap();
    let id_two = folder
        .store(&two, common::attrs(&[("a", "x".into()), ("b", 2.into())]))
        .unwrap();

    let predicate = Predicate::from_json(&json!({"a": "x", "b": {"$gt": 1}})).unwrap();
    assert_eq!(ids(&folder.query(&predicate, None).unwrap()), vec![id_two]);
}

#[test]
fn test_unknown_operator_matches_by_equality() {
    let dir = tempdir().unwrap();
    let folder = common::setup_folder(&dir);

    let one = common::create_dummy_file(&dir, "one.txt", "1");
    let two = common::create_dummy_file(&dir, "two.txt", "2");
    let id_one = folder.store(&one, common::attrs(&[("n", 5.into())])).unwrap();
    folder.store(&two, common::attrs(&[("n", 6.into())])).unwrap();

    let predicate = Predicate::new().op("n", "$ne", 5);
    assert_eq!(ids(&folder.query(&predicate, None).unwrap()), vec![id_one]);
}

#[test]
fn test_query_kinds_do_not_mix() {
    let dir = tempdir().unwrap();
    let folder = common::setup_folder(&dir);

    let one = common::create_dummy_file(&dir, "one.txt", "1");
    folder.store(&one, common::attrs(&[("v", "10".into())])).unwrap();

    // 字符串 "10" 不等于数字 10
    assert!(folder
        .query(&Predicate::new().equals("v", 10), None)
        .unwrap()
        .is_empty());
    assert_eq!(
        folder
            .query(&Predicate::new().equals("v", "10"), None)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_query_dates() {
    let dir = tempdir().unwrap();
    let folder = common::setup_folder(&dir);

    let early = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let late = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
    let a = common::create_dummy_file(&dir, "a.txt", "a");
    let b = common::create_dummy_file(&dir, "b.txt", "b");
    let id_a = folder.store(&a, common::attrs(&[("at", early.into())])).unwrap();
    let id_b = folder.store(&b, common::attrs(&[("at", late.into())])).unwrap();

    let cutoff = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(
        ids(&folder.query(&Predicate::new().op("at", "$lt", cutoff), None).unwrap()),
        vec![id_a]
    );
    assert_eq!(
        ids(&folder.query(&Predicate::new().op("at", "$gte", cutoff), None).unwrap()),
        vec![id_b]
    );

    let record = folder.find(&id_b).unwrap();
    assert_eq!(record.attributes["at"], folderdb::AttributeValue::from(late));
}

#[test]
fn test_query_paging_defaults() {
    let dir = tempdir().unwrap();
    let folder = common::setup_folder(&dir);

    let mut stored = Vec::new();
    for i in 0..105 {
        let source = common::create_dummy_file(&dir, &format!("f_{:03}.txt", i), "x");
        stored.push(folder.store(&source, common::attrs(&[("i", i.into())])).unwrap());
    }

    // 未指定选项时最多返回 100 条
    let first = folder.query(&Predicate::new(), None).unwrap();
    assert_eq!(ids(&first), stored[..100].to_vec());

    // limit 为 0 同样使用默认值
    let zero = folder
        .query(&Predicate::new(), Some(QueryOptions { skip: None, limit: Some(0) }))
        .unwrap();
    assert_eq!(zero.len(), 100);

    let rest = folder
        .query(&Predicate::new(), Some(QueryOptions::new(100, 10)))
        .unwrap();
    assert_eq!(ids(&rest), stored[100..].to_vec());

    let window = folder
        .query(&Predicate::new().op("i", "$gte", 50), Some(QueryOptions::new(5, 3)))
        .unwrap();
    assert_eq!(ids(&window), stored[55..58].to_vec());
}

#[test]
fn test_query_empty_folder() {
    let dir = tempdir().unwrap();
    let folder = common::setup_folder(&dir);
    let source = common::create_dummy_file(&dir, "a.txt", "a");
    folder.store(&source, AttributeInput::Empty).unwrap();

    assert!(folder
        .query(&Predicate::new().equals("missing", "x"), None)
        .unwrap()
        .is_empty());
}
