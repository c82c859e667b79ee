use super::*;
use tempfile::TempDir;

#[test]
fn test_sanitize_topic() {
    assert_eq!(sanitize_topic("Red Lipsticks").as_deref(), Some("red_lipsticks"));
    assert_eq!(sanitize_topic("  lip_gloss  ").as_deref(), Some("lip_gloss"));
    assert_eq!(sanitize_topic("../../etc/passwd").as_deref(), Some("etc_passwd"));
    assert_eq!(sanitize_topic("Lip Stain & Tint").as_deref(), Some("lip_stain_tint"));
    assert_eq!(sanitize_topic("!!!"), None);
    assert_eq!(sanitize_topic(""), None);
}

#[test]
fn test_sanitize_topic_is_bounded() {
    let long = "a".repeat(200);
    assert_eq!(sanitize_topic(&long).map(|t| t.len()), Some(MAX_TOPIC_LEN));
}

#[test]
fn test_render_list_note_numbers_items() {
    let note = render_list_note("lipstick", &["MAC Ruby Woo".to_string(), "Sugar".to_string()]);
    assert!(note.starts_with("# lipstick\n"));
    assert!(note.contains("1. MAC Ruby Woo\n"));
    assert!(note.contains("2. Sugar\n"));
}

#[tokio::test]
async fn test_file_store_missing_note_is_none() {
    let dir = TempDir::new().expect("temp dir");
    let store = FileNoteStore::new(dir.path());

    let note = store.get("s1", "lipstick").await.expect("read ok");
    assert!(note.is_none());
}

#[tokio::test]
async fn test_file_store_put_then_get() {
    let dir = TempDir::new().expect("temp dir");
    let store = FileNoteStore::new(dir.path());

    let note_ref = store
        .put("s1", "Red Lipsticks", "1. MAC Ruby Woo")
        .await
        .expect("write ok");
    assert_eq!(note_ref.topic, "red_lipsticks");
    assert_eq!(note_ref.bytes, 15);

    let note = store.get("s1", "red lipsticks").await.expect("read ok");
    assert_eq!(note.as_deref(), Some("1. MAC Ruby Woo"));
}

#[tokio::test]
async fn test_file_store_sessions_isolated() {
    let dir = TempDir::new().expect("temp dir");
    let store = FileNoteStore::new(dir.path());

    store.put("alice", "lipstick", "hers").await.expect("write ok");
    assert!(store.get("bob", "lipstick").await.expect("read ok").is_none());
}

#[tokio::test]
async fn test_file_store_paths_stay_under_root() {
    let dir = TempDir::new().expect("temp dir");
    let store = FileNoteStore::new(dir.path());

    let path = store.note_path("../../escape", "../topic").expect("valid");
    assert!(path.starts_with(dir.path()));
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("md"));
}

#[tokio::test]
async fn test_file_store_rejects_oversized_note() {
    let dir = TempDir::new().expect("temp dir");
    let store = FileNoteStore::new(dir.path()).with_max_bytes(8);

    let err = store.put("s1", "lipstick", "way too long").await.unwrap_err();
    assert!(matches!(err, NoteError::TooLarge { limit: 8, .. }));
}

#[tokio::test]
async fn test_file_store_invalid_topic() {
    let dir = TempDir::new().expect("temp dir");
    let store = FileNoteStore::new(dir.path());

    let err = store.put("s1", "???", "note").await.unwrap_err();
    assert!(matches!(err, NoteError::InvalidTopic { .. }));
}

#[tokio::test]
async fn test_memory_store_roundtrip_and_failures() {
    let store = InMemoryNoteStore::new();
    store.put("s1", "blush", "note").await.expect("write ok");
    assert_eq!(store.get("s1", "Blush").await.expect("read ok").as_deref(), Some("note"));
    assert_eq!(store.len(), 1);

    let failing = InMemoryNoteStore::failing_writes();
    assert!(failing.put("s1", "blush", "note").await.is_err());
    assert!(failing.is_empty());
}
