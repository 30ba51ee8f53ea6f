//! Integration tests for hash lookups over file-backed logs.

use sparklog_core::{HashReader, IteratorState, KeyIndex};
use sparklog_testkit::prelude::*;

fn file_reader() -> (TestLog, HashReader) {
    let test_log = TestLog::file(&default_builder());
    let reader = HashReader::open(test_log.log.clone()).unwrap();
    (test_log, reader)
}

#[test]
fn index_counts_keys() {
    let (_log, reader) = file_reader();
    assert_eq!(reader.index().len(), 3);
    assert_eq!(reader.index().live_len(), 2);
}

#[test]
fn iterate_over_live_keys() {
    let (_log, reader) = file_reader();
    let mut iter = reader.iter();
    let mut contents = Vec::new();

    iter.next_live().unwrap();
    while iter.is_valid() {
        contents.push(kv(&mut iter));
        iter.next_live().unwrap();
    }

    let long = String::from_utf8(very_long_value()).unwrap();
    assert_eq!(contents, vec!["xk:short".to_string(), format!("zk:{long}")]);
    assert!(iter.fault().is_none());
}

#[test]
fn seek_keys() {
    let (_log, reader) = file_reader();
    let mut iter = reader.iter();

    iter.seek(b"missing").unwrap();
    assert_eq!(iter.state(), IteratorState::Invalid);
    iter.seek(b"yk").unwrap();
    assert_eq!(iter.state(), IteratorState::Invalid);

    iter.seek(b"zk").unwrap();
    assert_eq!(iter.state(), IteratorState::Active);
    assert_eq!(iter.read_key().unwrap(), "zk");
    assert_eq!(iter.read_value().unwrap(), very_long_value());

    iter.seek(b"xk").unwrap();
    assert_eq!(iter.state(), IteratorState::Active);
    assert_eq!(kv(&mut iter), "xk:short");
}

#[test]
fn retrieve_values() {
    let (_log, reader) = file_reader();
    let mut iter = reader.iter();

    assert!(iter.get(b"missing").unwrap().is_none());
    assert!(iter.get(b"x").unwrap().is_none());
    assert_eq!(iter.get(b"zk").unwrap().unwrap(), very_long_value());
    assert_eq!(iter.get(b"xk").unwrap().unwrap(), "short");
    assert!(iter.get(b"yk").unwrap().is_none());

    assert_eq!(reader.get(b"xk").unwrap().unwrap(), "short");
    assert!(reader.get(b"yk").unwrap().is_none());
}

#[test]
fn reput_after_delete_is_live_again() {
    let log = LogBuilder::new()
        .put("k", "1")
        .delete("k")
        .put("k", "2")
        .open();
    let reader = HashReader::open(log).unwrap();

    assert_eq!(reader.get(b"k").unwrap().unwrap(), "2");
    let live: Vec<_> = reader
        .iter()
        .live_entries()
        .map(|e| e.unwrap().value)
        .collect();
    assert_eq!(live, vec!["2"]);
}

#[test]
fn readers_share_one_log() {
    let log = default_log();
    let first = HashReader::open(log.clone()).unwrap();
    let second = first.clone();

    let mut a = first.iter();
    let mut b = second.iter();
    a.seek(b"xk").unwrap();
    b.seek(b"zk").unwrap();

    assert_eq!(a.read_value().unwrap(), "short");
    assert_eq!(b.read_value().unwrap(), very_long_value());
    assert!(std::sync::Arc::ptr_eq(first.log(), &log));
}

#[test]
fn hash_iterator_compares_through_log_iterator() {
    let reader = HashReader::open(default_log()).unwrap();
    let mut a = reader.iter();
    let mut b = reader.iter();
    a.seek(b"xk").unwrap();
    b.seek(b"zk").unwrap();

    assert_eq!(a.compare(&mut b).unwrap(), std::cmp::Ordering::Less);
}

#[test]
fn next_live_skips_deleted_key() {
    let log = LogBuilder::new()
        .put("xk", "short")
        .put("yk", "longvalue")
        .delete("yk")
        .open();
    let reader = HashReader::open(log).unwrap();
    let mut iter = reader.iter();

    iter.next_live().unwrap();
    assert_eq!(kv(&mut iter), "xk:short");
    iter.next_live().unwrap();
    assert!(!iter.is_valid());
    assert_eq!(iter.state(), IteratorState::Closed);
}
