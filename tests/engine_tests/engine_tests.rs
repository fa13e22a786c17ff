//! Tests for the built-in file engine
//!
//! These tests verify:
//! - Basic raw operations (set, get, remove, clear, iterate)
//! - Persistence through close/reopen and through journal replay
//! - Compaction once the journal reaches its threshold
//! - Open modes (read-only, truncate, missing store)
//! - Engine kind selection and tree ordering
//! - Recovery from a torn journal tail

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use bytes::Bytes;
use shelfkv::config::{Config, EngineKind, OpenMode, SyncStrategy};
use shelfkv::engine::IndexKind;
use shelfkv::{FileEngine, ShelfError, StorageEngine};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.db");
    (temp_dir, path)
}

fn config(path: &PathBuf) -> Config {
    Config::builder()
        .path(path)
        .sync_strategy(SyncStrategy::EveryWrite)
        .build()
}

fn open(path: &PathBuf) -> FileEngine {
    FileEngine::open(&config(path)).unwrap()
}

fn open_with(path: &PathBuf, engine: EngineKind, mode: OpenMode) -> shelfkv::Result<FileEngine> {
    let config = Config::builder()
        .path(path)
        .engine(engine)
        .mode(mode)
        .build();
    FileEngine::open(&config)
}

fn b(s: &str) -> Bytes {
    Bytes::copy_from_slice(s.as_bytes())
}

fn journal_path(path: &PathBuf) -> PathBuf {
    config(path).journal_path()
}

// =============================================================================
// Basic Operation Tests
// =============================================================================

#[test]
fn test_open_creates_store() {
    let (_temp, path) = setup_temp_store();
    let engine = open(&path);

    assert!(path.exists());
    assert_eq!(engine.count().unwrap(), 0);
    assert_eq!(engine.path(), path.as_path());
    assert!(!engine.is_read_only());
}

#[test]
fn test_set_get_remove() {
    let (_temp, path) = setup_temp_store();
    let mut engine = open(&path);

    engine.set(b("k1"), b("v1")).unwrap();
    engine.set(b("k2"), b("v2")).unwrap();
    engine.set(b("k1"), b("v1b")).unwrap();

    assert_eq!(engine.get(b"k1").unwrap(), Some(b("v1b")));
    assert!(engine.contains(b"k2").unwrap());
    assert_eq!(engine.count().unwrap(), 2);

    assert_eq!(engine.remove(b"k1").unwrap(), Some(b("v1b")));
    assert_eq!(engine.remove(b"k1").unwrap(), None);
    assert_eq!(engine.get(b"k1").unwrap(), None);
    assert_eq!(engine.count().unwrap(), 1);
}

#[test]
fn test_remove_absent_key_is_not_journaled() {
    let (_temp, path) = setup_temp_store();
    let mut engine = open(&path);

    engine.remove(b"missing").unwrap();
    assert_eq!(engine.journal_len(), 0);
}

#[test]
fn test_clear() {
    let (_temp, path) = setup_temp_store();
    let mut engine = open(&path);
    for i in 0..5 {
        engine.set(b(&format!("k{}", i)), b("v")).unwrap();
    }

    engine.clear().unwrap();
    assert_eq!(engine.count().unwrap(), 0);
    assert_eq!(engine.iter().unwrap().count(), 0);
}

#[test]
fn test_tree_iterates_in_key_order() {
    let (_temp, path) = setup_temp_store();
    let mut engine = open(&path);
    assert_eq!(engine.kind(), IndexKind::Tree);

    for key in ["delta", "alpha", "charlie", "bravo"] {
        engine.set(b(key), b(key)).unwrap();
    }

    let keys: Vec<Bytes> = engine
        .iter()
        .unwrap()
        .map(|entry| entry.unwrap().0)
        .collect();
    assert_eq!(keys, vec![b("alpha"), b("bravo"), b("charlie"), b("delta")]);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_close_and_reopen() {
    let (_temp, path) = setup_temp_store();
    {
        let mut engine = open(&path);
        engine.set(b("a"), b("1")).unwrap();
        engine.set(b("b"), b("2")).unwrap();
        engine.remove(b"a").unwrap();
        engine.close().unwrap();
        assert_eq!(engine.journal_len(), 0);
    }

    assert_eq!(fs::metadata(journal_path(&path)).unwrap().len(), 0);

    let engine = open(&path);
    assert_eq!(engine.count().unwrap(), 1);
    assert_eq!(engine.get(b"b").unwrap(), Some(b("2")));
}

#[test]
fn test_journal_replay_without_close() {
    let (_temp, path) = setup_temp_store();
    {
        let mut engine = open(&path);
        engine.set(b("a"), b("1")).unwrap();
        engine.set(b("b"), b("2")).unwrap();
        engine.clear().unwrap();
        engine.set(b("c"), b("3")).unwrap();
        assert_eq!(engine.journal_len(), 4);
        // Dropped without close: only the journal holds these writes
    }

    let engine = open(&path);
    assert_eq!(engine.count().unwrap(), 1);
    assert_eq!(engine.get(b"c").unwrap(), Some(b("3")));

    // Replayed entries were folded into the snapshot on open
    assert_eq!(engine.journal_len(), 0);
}

#[test]
fn test_torn_journal_tail_is_dropped() {
    let (_temp, path) = setup_temp_store();
    {
        let mut engine = open(&path);
        engine.set(b("kept"), b("yes")).unwrap();
    }

    let mut journal = OpenOptions::new()
        .append(true)
        .open(journal_path(&path))
        .unwrap();
    journal.write_all(&[0x09, 0x00, 0x00, 0x00, 0x01]).unwrap();
    drop(journal);

    let mut engine = open(&path);
    assert_eq!(engine.get(b"kept").unwrap(), Some(b("yes")));
    assert_eq!(engine.count().unwrap(), 1);

    engine.set(b("after"), b("ok")).unwrap();
    drop(engine);

    let engine = open(&path);
    assert_eq!(engine.count().unwrap(), 2);
}

#[test]
fn test_compaction_at_threshold() {
    let (_temp, path) = setup_temp_store();
    let config = Config::builder()
        .path(&path)
        .compaction_threshold(4)
        .build();
    let mut engine = FileEngine::open(&config).unwrap();

    for i in 0..3 {
        engine.set(b(&format!("k{}", i)), b("v")).unwrap();
    }
    assert_eq!(engine.journal_len(), 3);

    engine.set(b("k3"), b("v")).unwrap();
    assert_eq!(engine.journal_len(), 0);
    assert_eq!(fs::metadata(journal_path(&path)).unwrap().len(), 0);
    drop(engine);

    let engine = open(&path);
    assert_eq!(engine.count().unwrap(), 4);
}

#[test]
fn test_failed_compaction_keeps_the_write() {
    let (temp, path) = setup_temp_store();
    let config = Config::builder()
        .path(&path)
        .compaction_threshold(2)
        .build();
    let mut engine = FileEngine::open(&config).unwrap();

    // The open journal handle keeps working; the snapshot rewrite cannot
    // create its temporary file any more
    fs::remove_dir_all(temp.path()).unwrap();

    engine.set(b("a"), b("1")).unwrap();
    engine.set(b("b"), b("2")).unwrap();
    assert_eq!(engine.get(b"b").unwrap(), Some(b("2")));
    assert_eq!(engine.journal_len(), 2);

    engine.clear().unwrap();
    assert_eq!(engine.count().unwrap(), 0);
    assert_eq!(engine.journal_len(), 3);
}

#[test]
fn test_explicit_compact() {
    let (_temp, path) = setup_temp_store();
    let mut engine = open(&path);
    engine.set(b("x"), b("1")).unwrap();

    engine.compact().unwrap();
    assert_eq!(engine.journal_len(), 0);
    assert_eq!(engine.get(b"x").unwrap(), Some(b("1")));
}

#[test]
fn test_corrupted_snapshot_fails_open() {
    let (_temp, path) = setup_temp_store();
    {
        let mut engine = open(&path);
        engine.set(b("a"), b("1")).unwrap();
        engine.close().unwrap();
    }

    let mut data = fs::read(&path).unwrap();
    let last = data.len() - 1;
    data[last] ^= 0xFF;
    fs::write(&path, &data).unwrap();

    assert!(matches!(
        FileEngine::open(&config(&path)),
        Err(ShelfError::Corruption(_))
    ));
}

// =============================================================================
// Open Mode Tests
// =============================================================================

#[test]
fn test_read_only_rejects_writes() {
    let (_temp, path) = setup_temp_store();
    {
        let mut engine = open(&path);
        engine.set(b("a"), b("1")).unwrap();
        engine.close().unwrap();
    }

    let mut engine = open_with(&path, EngineKind::Auto, OpenMode::READ_ONLY).unwrap();
    assert!(engine.is_read_only());
    assert_eq!(engine.get(b"a").unwrap(), Some(b("1")));

    assert!(matches!(engine.set(b("b"), b("2")), Err(ShelfError::ReadOnly)));
    assert!(matches!(engine.remove(b"a"), Err(ShelfError::ReadOnly)));
    assert!(matches!(engine.remove(b"missing"), Err(ShelfError::ReadOnly)));
    assert!(matches!(engine.clear(), Err(ShelfError::ReadOnly)));
    assert_eq!(engine.count().unwrap(), 1);
    engine.close().unwrap();
}

#[test]
fn test_read_only_sees_journal_without_rewriting() {
    let (_temp, path) = setup_temp_store();
    {
        let mut engine = open(&path);
        engine.set(b("pending"), b("1")).unwrap();
    }
    let snapshot_before = fs::read(&path).unwrap();
    let journal_before = fs::read(journal_path(&path)).unwrap();

    let engine = open_with(&path, EngineKind::Auto, OpenMode::READ_ONLY).unwrap();
    assert_eq!(engine.get(b"pending").unwrap(), Some(b("1")));
    drop(engine);

    assert_eq!(fs::read(&path).unwrap(), snapshot_before);
    assert_eq!(fs::read(journal_path(&path)).unwrap(), journal_before);
}

#[test]
fn test_read_only_missing_store() {
    let (_temp, path) = setup_temp_store();
    match open_with(&path, EngineKind::Auto, OpenMode::READ_ONLY) {
        Err(ShelfError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        Err(e) => panic!("expected NotFound, got {}", e),
        Ok(_) => panic!("opened a missing store read-only"),
    }
    assert!(!path.exists());
}

#[test]
fn test_truncate_discards_contents() {
    let (_temp, path) = setup_temp_store();
    {
        let mut engine = open(&path);
        engine.set(b("a"), b("1")).unwrap();
        engine.close().unwrap();
    }
    {
        let mut engine = open(&path);
        engine.set(b("journaled"), b("1")).unwrap();
    }

    let engine = open_with(&path, EngineKind::Auto, OpenMode::TRUNCATE).unwrap();
    assert_eq!(engine.count().unwrap(), 0);
    drop(engine);

    assert_eq!(open(&path).count().unwrap(), 0);
}

#[test]
fn test_invalid_config_rejected() {
    let (_temp, path) = setup_temp_store();
    let config = Config::builder()
        .path(&path)
        .compaction_threshold(0)
        .build();

    assert!(matches!(FileEngine::open(&config), Err(ShelfError::Config(_))));
}

// =============================================================================
// Engine Kind Tests
// =============================================================================

#[test]
fn test_auto_defaults_to_tree() {
    let (_temp, path) = setup_temp_store();
    let engine = open_with(&path, EngineKind::Auto, OpenMode::READ_WRITE).unwrap();
    assert_eq!(engine.kind(), IndexKind::Tree);
}

#[test]
fn test_auto_adopts_recorded_kind() {
    let (_temp, path) = setup_temp_store();
    {
        let mut engine = open_with(&path, EngineKind::Hash, OpenMode::READ_WRITE).unwrap();
        assert_eq!(engine.kind(), IndexKind::Hash);
        engine.set(b("h"), b("1")).unwrap();
        engine.close().unwrap();
    }

    let engine = open_with(&path, EngineKind::Auto, OpenMode::READ_WRITE).unwrap();
    assert_eq!(engine.kind(), IndexKind::Hash);
    assert_eq!(engine.get(b"h").unwrap(), Some(b("1")));
}

#[test]
fn test_explicit_kind_converts_store() {
    let (_temp, path) = setup_temp_store();
    {
        let mut engine = open_with(&path, EngineKind::Hash, OpenMode::READ_WRITE).unwrap();
        engine.set(b("z"), b("1")).unwrap();
        engine.set(b("a"), b("2")).unwrap();
        engine.close().unwrap();
    }
    {
        let engine = open_with(&path, EngineKind::Tree, OpenMode::READ_WRITE).unwrap();
        assert_eq!(engine.kind(), IndexKind::Tree);
        let first = engine.iter().unwrap().next().unwrap().unwrap();
        assert_eq!(first.0, b("a"));
    }

    let engine = open_with(&path, EngineKind::Auto, OpenMode::READ_WRITE).unwrap();
    assert_eq!(engine.kind(), IndexKind::Tree);
    assert_eq!(engine.count().unwrap(), 2);
}

#[test]
fn test_hash_engine_basic_operations() {
    let (_temp, path) = setup_temp_store();
    let mut engine = open_with(&path, EngineKind::Hash, OpenMode::READ_WRITE).unwrap();

    for i in 0..20 {
        engine.set(b(&format!("k{}", i)), b(&format!("v{}", i))).unwrap();
    }
    engine.remove(b"k7").unwrap();

    assert_eq!(engine.count().unwrap(), 19);
    assert_eq!(engine.iter().unwrap().count(), 19);
    assert_eq!(engine.get(b"k3").unwrap(), Some(b("v3")));
    assert_eq!(engine.get(b"k7").unwrap(), None);
}
