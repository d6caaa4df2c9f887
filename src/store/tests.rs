//! Tests for the versioned artifact store.

use super::layout::{Area, decode_code_key, encode_code_key};
use super::*;
use crate::journal::read_journal;
use serde::Deserialize;
use std::collections::BTreeMap;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CodeModel {
    path: String,
    version: u32,
    conditions: Vec<(u32, String)>,
}

fn model(path: &str, version: u32) -> CodeModel {
    CodeModel {
        path: path.to_string(),
        version,
        conditions: vec![(3, format!("CONFIG_V{}", version))],
    }
}

fn open_store() -> (TempDir, VersionedStore) {
    let temp = TempDir::new().unwrap();
    let store = VersionedStore::open(temp.path().join("cache")).unwrap();
    (temp, store)
}

fn flag_set(flags: &[ChangeFlag]) -> BTreeSet<ChangeFlag> {
    flags.iter().copied().collect()
}

#[test]
fn first_write_is_flagged_addition() {
    let (_temp, mut store) = open_store();
    let key = ArtifactKey::code("a/b.c");

    store.write(&key, &model("a/b.c", 1)).unwrap();

    assert_eq!(store.read::<CodeModel>(&key).unwrap(), model("a/b.c", 1));
    assert_eq!(store.flags(&key), flag_set(&[ChangeFlag::Addition]));
    assert!(store.read_previous::<CodeModel>(&key).unwrap_err().is_not_found());
}

#[test]
fn second_write_moves_old_value_to_previous() {
    let (_temp, mut store) = open_store();
    let key = ArtifactKey::code("a/b.c");

    store.write(&key, &model("a/b.c", 1)).unwrap();
    store.write(&key, &model("a/b.c", 2)).unwrap();

    assert_eq!(store.read::<CodeModel>(&key).unwrap(), model("a/b.c", 2));
    assert_eq!(store.read_previous::<CodeModel>(&key).unwrap(), model("a/b.c", 1));
    assert!(store.flags(&key).contains(&ChangeFlag::Modification));
}

#[test]
fn delete_after_two_writes_keeps_latest_value_as_previous() {
    let (_temp, mut store) = open_store();
    let key = ArtifactKey::code("a/b.c");

    store.write(&key, &model("a/b.c", 1)).unwrap();
    store.write(&key, &model("a/b.c", 2)).unwrap();
    store.delete(&key).unwrap();

    assert!(store.read::<CodeModel>(&key).unwrap_err().is_not_found());
    assert!(!store.contains(&key));
    assert_eq!(store.read_previous::<CodeModel>(&key).unwrap(), model("a/b.c", 2));
    assert!(store.flags(&key).contains(&ChangeFlag::Deletion));
}

#[test]
fn delete_of_missing_key_is_not_found() {
    let (_temp, mut store) = open_store();
    let err = store.delete(&ArtifactKey::Build).unwrap_err();
    assert!(err.is_not_found());
    assert!(store.flags(&ArtifactKey::Build).is_empty());
}

#[test]
fn untouched_key_reads_previous_from_current() {
    let (_temp, mut store) = open_store();
    store.write(&ArtifactKey::Variability, &"vm-1").unwrap();
    store.clear_history().unwrap();

    assert_eq!(
        store.read_previous::<String>(&ArtifactKey::Variability).unwrap(),
        "vm-1"
    );
    assert!(store.flags(&ArtifactKey::Variability).is_empty());
}

#[test]
fn explicit_flags_do_not_move_artifacts() {
    let (_temp, mut store) = open_store();
    let key = ArtifactKey::code("init/main.c");
    store.write(&key, &model("init/main.c", 1)).unwrap();
    store.clear_history().unwrap();

    store.flag(&key, ChangeFlag::AuxiliaryChange).unwrap();
    store.flag(&key, ChangeFlag::ExtractionChange).unwrap();

    assert_eq!(
        store.flags(&key),
        flag_set(&[ChangeFlag::ExtractionChange, ChangeFlag::AuxiliaryChange])
    );
    assert_eq!(store.read::<CodeModel>(&key).unwrap(), model("init/main.c", 1));
    assert_eq!(store.status().unwrap().previous, 0);
}

#[test]
fn keys_with_flag_selects_by_kind_and_flag() {
    let (_temp, mut store) = open_store();
    store.write(&ArtifactKey::code("z.c"), &model("z.c", 1)).unwrap();
    store.write(&ArtifactKey::code("a/y.c"), &model("a/y.c", 1)).unwrap();
    store.write(&ArtifactKey::Build, &"bm").unwrap();
    store.clear_history().unwrap();

    store.write(&ArtifactKey::code("z.c"), &model("z.c", 2)).unwrap();
    store.write(&ArtifactKey::code("new.c"), &model("new.c", 1)).unwrap();
    store.write(&ArtifactKey::Build, &"bm2").unwrap();

    assert_eq!(
        store.keys_with_flag(ArtifactKind::Code, ChangeFlag::Addition),
        vec![ArtifactKey::code("new.c")]
    );
    assert_eq!(
        store.keys_with_flag(ArtifactKind::Code, ChangeFlag::Modification),
        vec![ArtifactKey::code("z.c")]
    );
    assert_eq!(
        store.keys_with_flag(ArtifactKind::Build, ChangeFlag::Modification),
        vec![ArtifactKey::Build]
    );
    assert!(store
        .keys_with_flag(ArtifactKind::Variability, ChangeFlag::Modification)
        .is_empty());
}

#[test]
fn clear_history_drops_previous_and_flags() {
    let (_temp, mut store) = open_store();
    let key = ArtifactKey::code("a.c");
    store.write(&key, &model("a.c", 1)).unwrap();
    store.write(&key, &model("a.c", 2)).unwrap();

    store.clear_history().unwrap();

    assert!(store.flags(&key).is_empty());
    assert_eq!(store.read::<CodeModel>(&key).unwrap(), model("a.c", 2));
    assert_eq!(store.read_previous::<CodeModel>(&key).unwrap(), model("a.c", 2));
    assert_eq!(store.status().unwrap().previous, 0);
}

#[test]
fn rollback_restores_generation_start() {
    let (_temp, mut store) = open_store();
    let a = ArtifactKey::code("a.c");
    let b = ArtifactKey::code("sub/b.c");
    let c = ArtifactKey::code("c.c");

    // S0
    store.write(&a, &model("a.c", 1)).unwrap();
    store.write(&b, &model("sub/b.c", 1)).unwrap();
    store.write(&ArtifactKey::Build, &"bm-1").unwrap();
    store.clear_history().unwrap();

    // S1
    store.write(&a, &model("a.c", 2)).unwrap();
    store.write(&a, &model("a.c", 3)).unwrap();
    store.delete(&b).unwrap();
    store.write(&c, &model("c.c", 1)).unwrap();
    store.write(&c, &model("c.c", 2)).unwrap();
    store.write(&ArtifactKey::Build, &"bm-2").unwrap();
    store.write(&ArtifactKey::Variability, &"vm-1").unwrap();
    store.flag(&a, ChangeFlag::ExtractionChange).unwrap();

    store.rollback().unwrap();

    assert_eq!(store.read::<CodeModel>(&a).unwrap(), model("a.c", 1));
    assert_eq!(store.read::<CodeModel>(&b).unwrap(), model("sub/b.c", 1));
    assert!(store.read::<CodeModel>(&c).unwrap_err().is_not_found());
    assert_eq!(store.read::<String>(&ArtifactKey::Build).unwrap(), "bm-1");
    assert!(store.read::<String>(&ArtifactKey::Variability).unwrap_err().is_not_found());

    for key in [&a, &b, &c, &ArtifactKey::Build, &ArtifactKey::Variability] {
        assert!(store.flags(key).is_empty(), "{key} still flagged");
    }
    let status = store.status().unwrap();
    assert_eq!(status.previous, 0);
    assert_eq!(status.flagged_keys, 0);
}

#[test]
fn rollback_after_delete_and_rewrite_restores_original() {
    let (_temp, mut store) = open_store();
    let key = ArtifactKey::code("k/Kconfig");
    store.write(&key, &model("k/Kconfig", 1)).unwrap();
    store.clear_history().unwrap();

    store.delete(&key).unwrap();
    store.write(&key, &model("k/Kconfig", 2)).unwrap();
    store.write(&key, &model("k/Kconfig", 3)).unwrap();

    // Rewriting a key that existed at generation start is a modification.
    assert!(!store.flags(&key).contains(&ChangeFlag::Addition));
    assert_eq!(store.read_previous::<CodeModel>(&key).unwrap(), model("k/Kconfig", 2));

    store.rollback().unwrap();
    assert_eq!(store.read::<CodeModel>(&key).unwrap(), model("k/Kconfig", 1));
}

#[test]
fn rollback_of_added_then_deleted_key_leaves_nothing() {
    let (_temp, mut store) = open_store();
    let key = ArtifactKey::code("tmp.c");

    store.write(&key, &model("tmp.c", 1)).unwrap();
    store.delete(&key).unwrap();
    assert_eq!(store.read_previous::<CodeModel>(&key).unwrap(), model("tmp.c", 1));

    store.rollback().unwrap();
    assert!(!store.contains(&key));
    assert!(store.read_previous::<CodeModel>(&key).unwrap_err().is_not_found());
}

#[test]
fn serialization_failure_leaves_store_untouched() {
    let (_temp, mut store) = open_store();
    let key = ArtifactKey::Build;
    store.write(&key, &"bm-1").unwrap();
    store.clear_history().unwrap();

    // JSON maps need string keys.
    let mut bad: BTreeMap<(u32, u32), u32> = BTreeMap::new();
    bad.insert((1, 2), 3);
    let err = store.write(&key, &bad).unwrap_err();

    assert!(matches!(err, VariError::Serialization(_)));
    assert_eq!(store.read::<String>(&key).unwrap(), "bm-1");
    assert!(store.flags(&key).is_empty());
    assert_eq!(store.status().unwrap().previous, 0);
}

#[test]
fn decoding_into_wrong_type_is_a_serialization_error() {
    let (_temp, mut store) = open_store();
    store.write(&ArtifactKey::Build, &"not a model").unwrap();

    let err = store.read::<CodeModel>(&ArtifactKey::Build).unwrap_err();
    assert!(matches!(err, VariError::Serialization(_)));
}

#[test]
fn flags_survive_reopening_the_store() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("cache");
    let key = ArtifactKey::code("drivers/gpio.c");

    {
        let mut store = VersionedStore::open(&root).unwrap();
        store.write(&key, &model("drivers/gpio.c", 1)).unwrap();
        store.write(&key, &model("drivers/gpio.c", 2)).unwrap();
    }

    let mut store = VersionedStore::open(&root).unwrap();
    assert_eq!(
        store.flags(&key),
        flag_set(&[ChangeFlag::Addition, ChangeFlag::Modification])
    );
    assert_eq!(
        store.read_previous::<CodeModel>(&key).unwrap(),
        model("drivers/gpio.c", 1)
    );

    store.rollback().unwrap();
    assert!(!store.contains(&key));
}

#[test]
fn keys_lists_current_artifacts_by_path() {
    let (_temp, mut store) = open_store();
    for path in ["b/x.c", "a#1.c", "a/1.c", "100%.c"] {
        store.write(&ArtifactKey::code(path), &model(path, 1)).unwrap();
    }
    store.write(&ArtifactKey::Variability, &"vm").unwrap();

    let keys = store.keys(ArtifactKind::Code).unwrap();
    let mut expected: Vec<ArtifactKey> = ["b/x.c", "a#1.c", "a/1.c", "100%.c"]
        .into_iter()
        .map(ArtifactKey::code)
        .collect();
    expected.sort();
    assert_eq!(keys, expected);
    assert_eq!(
        store.keys(ArtifactKind::Variability).unwrap(),
        vec![ArtifactKey::Variability]
    );

    let status = store.status().unwrap();
    assert_eq!(status.current_code, 4);
    assert!(status.current_variability);
    assert!(!status.current_build);
}

#[test]
fn backslash_paths_share_a_key_with_forward_slash_paths() {
    assert_eq!(ArtifactKey::code("arch\\arm\\boot.c"), ArtifactKey::code("arch/arm/boot.c"));
}

#[test]
fn code_keys_encode_without_collisions() {
    let paths = ["a/b.c", "a#b.c", "a%23b.c", "a%2Fb.c", "a/b/c", "a//b.c"];
    let encoded: BTreeSet<String> = paths.iter().map(|p| encode_code_key(p, "cache")).collect();
    assert_eq!(encoded.len(), paths.len());

    for path in paths {
        let name = encode_code_key(path, "cache");
        assert!(!name.contains('/'));
        assert_eq!(decode_code_key(&name, "cache").as_deref(), Some(path));
    }

    assert_eq!(encode_code_key("a/b.c", "cache"), "a#b.c.cache");
    assert_eq!(decode_code_key(".a#b.c.cache.123.0.tmp", "cache"), None);
    assert_eq!(decode_code_key("a#b.c.json", "cache"), None);
}

#[test]
fn custom_extension_is_used_for_artifact_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("cache");
    let mut store = VersionedStore::open_with(&root, "json", JsonCodec::pretty()).unwrap();

    store.write(&ArtifactKey::code("a/b.c"), &model("a/b.c", 1)).unwrap();
    store.write(&ArtifactKey::Build, &"bm").unwrap();

    assert!(root.join("current/code/a#b.c.json").exists());
    assert!(root.join("current/build.json").exists());
}

#[test]
fn mutations_are_journaled() {
    let (_temp, mut store) = open_store();
    let key = ArtifactKey::code("a.c");
    store.write(&key, &model("a.c", 1)).unwrap();
    store.flag(&key, ChangeFlag::AuxiliaryChange).unwrap();
    store.delete(&key).unwrap();
    store.rollback().unwrap();

    let actions: Vec<JournalAction> = read_journal(&store.journal_path())
        .unwrap()
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            JournalAction::Write,
            JournalAction::Flag,
            JournalAction::Delete,
            JournalAction::Rollback,
            JournalAction::ClearHistory,
        ]
    );
}

fn temp_files(dir: &std::path::Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".tmp"))
        .collect()
}

#[test]
fn failed_commit_restores_displaced_value_without_flags() {
    let (temp, mut store) = open_store();
    let key = ArtifactKey::code("a/b.c");
    store.write(&key, &model("a/b.c", 1)).unwrap();
    store.clear_history().unwrap();
    let journal_len = read_journal(&store.journal_path()).unwrap().len();

    store.fail_next_commit = true;
    let err = store.write(&key, &model("a/b.c", 2)).unwrap_err();
    assert!(matches!(err, VariError::Io(_)));

    assert_eq!(store.read::<CodeModel>(&key).unwrap(), model("a/b.c", 1));
    assert!(!store.layout.artifact_path(Area::Previous, &key).exists());
    assert_eq!(store.read_previous::<CodeModel>(&key).unwrap(), model("a/b.c", 1));
    assert!(store.flags(&key).is_empty());
    assert!(temp_files(&temp.path().join("cache/current/code")).is_empty());
    assert_eq!(read_journal(&store.journal_path()).unwrap().len(), journal_len);

    // Flags on disk agree with memory.
    let reopened = VersionedStore::open(temp.path().join("cache")).unwrap();
    assert!(reopened.flags(&key).is_empty());
}

#[test]
fn failed_commit_restores_previous_from_baseline() {
    let (_temp, mut store) = open_store();
    let key = ArtifactKey::Build;
    store.write(&key, &"bm-0").unwrap();
    store.clear_history().unwrap();
    store.write(&key, &"bm-1").unwrap();
    assert_eq!(store.flags(&key), flag_set(&[ChangeFlag::Modification]));

    store.fail_next_commit = true;
    assert!(store.write(&key, &"bm-2").is_err());

    assert_eq!(store.read::<String>(&key).unwrap(), "bm-1");
    assert_eq!(store.read_previous::<String>(&key).unwrap(), "bm-0");
    assert!(!store.layout.artifact_path(Area::Baseline, &key).exists());
    assert_eq!(store.flags(&key), flag_set(&[ChangeFlag::Modification]));

    store.rollback().unwrap();
    assert_eq!(store.read::<String>(&key).unwrap(), "bm-0");
}

#[test]
fn failed_first_write_leaves_no_addition_flag() {
    let (_temp, mut store) = open_store();
    let key = ArtifactKey::Variability;

    store.fail_next_commit = true;
    assert!(store.write(&key, &"vm").is_err());

    assert!(store.read::<String>(&key).unwrap_err().is_not_found());
    assert!(store.flags(&key).is_empty());
    assert!(store.keys_with_flag(ArtifactKind::Variability, ChangeFlag::Addition).is_empty());

    // The flag is one-shot.
    store.write(&key, &"vm").unwrap();
    assert_eq!(store.flags(&key), flag_set(&[ChangeFlag::Addition]));
}
