use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

static DIR_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Unique scratch directory per test; removed on drop.
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new(label: &str) -> Self {
        let seq = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("sessiongate-{label}-{}-{seq}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        Self(dir)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

// =============================================================================
// MemorySlot
// =============================================================================

#[test]
fn memory_slot_get_missing_is_none() {
    let slot = MemorySlot::new();
    assert_eq!(slot.get("auth_user_token").unwrap(), None);
}

#[test]
fn memory_slot_set_replaces_previous_value() {
    let slot = MemorySlot::new();
    slot.set("k", "one").unwrap();
    slot.set("k", "two").unwrap();
    assert_eq!(slot.get("k").unwrap().as_deref(), Some("two"));
}

#[test]
fn memory_slot_remove_absent_key_succeeds() {
    let slot = MemorySlot::new();
    slot.remove("never-set").unwrap();
    slot.set("k", "v").unwrap();
    slot.remove("k").unwrap();
    assert_eq!(slot.get("k").unwrap(), None);
}

// =============================================================================
// FileSlot
// =============================================================================

#[test]
fn file_slot_missing_dir_reads_as_none() {
    let scratch = ScratchDir::new("missing");
    let slot = FileSlot::new(&scratch.0);
    assert_eq!(slot.get("auth_user_token").unwrap(), None);
}

#[test]
fn file_slot_value_survives_new_instance() {
    let scratch = ScratchDir::new("durable");
    FileSlot::new(&scratch.0).set("auth_user_token", r#"{"username":"alice","token":"t"}"#).unwrap();

    let reopened = FileSlot::new(&scratch.0);
    assert_eq!(
        reopened.get("auth_user_token").unwrap().as_deref(),
        Some(r#"{"username":"alice","token":"t"}"#)
    );
    assert!(scratch.0.join("auth_user_token.json").exists());
}

#[test]
fn file_slot_set_leaves_no_temp_file() {
    let scratch = ScratchDir::new("tmp");
    let slot = FileSlot::new(&scratch.0);
    slot.set("k", "v").unwrap();
    let names: Vec<String> = std::fs::read_dir(&scratch.0)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["k.json".to_owned()]);
}

#[test]
fn file_slot_remove_is_idempotent() {
    let scratch = ScratchDir::new("remove");
    let slot = FileSlot::new(&scratch.0);
    slot.set("k", "v").unwrap();
    slot.remove("k").unwrap();
    slot.remove("k").unwrap();
    assert_eq!(slot.get("k").unwrap(), None);
}

#[test]
fn file_slot_rejects_path_like_keys() {
    let scratch = ScratchDir::new("keys");
    let slot = FileSlot::new(&scratch.0);
    for key in ["", "../escape", "a/b", ".hidden", "with space"] {
        assert!(matches!(slot.set(key, "v"), Err(StorageError::InvalidKey(_))), "expected {key:?} rejected");
    }
}

#[test]
fn validate_key_accepts_provider_cache_keys() {
    assert!(validate_key("CognitoIdentityServiceProvider.client-abc.tokens").is_ok());
    assert!(validate_key("auth_user_token").is_ok());
}
