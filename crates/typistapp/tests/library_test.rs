use std::fs;
use tempfile::TempDir;
use typistapp::init::{initialize, TypistContext};
use typistapp::model::{Category, TextEntry};
use typistapp::ErrorKind;

fn setup() -> (TempDir, TypistContext) {
    let dir = TempDir::new().unwrap();
    let ctx = initialize(Some(dir.path().to_path_buf())).unwrap();
    (dir, ctx)
}

#[test]
fn test_save_then_read_end_to_end() {
    let (_dir, ctx) = setup();
    ctx.library
        .save_text(&TextEntry::new("t1", "Hi", "hello").with_language(""))
        .unwrap();

    let entry = ctx.library.text("t1").unwrap();
    assert_eq!(entry.title, "Hi");
    assert_eq!(entry.content, "hello");
    assert_eq!(entry.language, "text");
}

#[test]
fn test_saved_text_survives_restart() {
    let (dir, ctx) = setup();
    ctx.library
        .save_text(&TextEntry::new("loop", "Loops", "for i in 0..10 {}").with_language("rust"))
        .unwrap();
    drop(ctx);

    let reopened = initialize(Some(dir.path().to_path_buf())).unwrap();
    let entry = reopened.library.text("loop").unwrap();
    assert_eq!(entry.content, "for i in 0..10 {}");
    assert_eq!(entry.language, "rust");
}

#[test]
fn test_index_never_holds_content() {
    let (_dir, ctx) = setup();
    ctx.library
        .save_text(&TextEntry::new("t1", "Hi", "hello"))
        .unwrap();

    assert!(ctx
        .library
        .library()
        .unwrap()
        .texts
        .iter()
        .all(|t| t.content.is_empty()));

    let raw = fs::read_to_string(ctx.paths.index_file()).unwrap();
    let index: serde_json::Value = serde_json::from_str(&raw).unwrap();
    for text in index["texts"].as_array().unwrap() {
        assert_eq!(text["content"], "");
    }
    assert_eq!(
        fs::read_to_string(ctx.paths.content_file("t1")).unwrap(),
        "hello"
    );
}

#[test]
fn test_duplicate_save_leaves_disk_untouched() {
    let (_dir, ctx) = setup();
    ctx.library
        .save_text(&TextEntry::new("t1", "Hi", "hello"))
        .unwrap();
    let index_before = fs::read(ctx.paths.index_file()).unwrap();
    let content_before = fs::read(ctx.paths.content_file("t1")).unwrap();

    let err = ctx
        .library
        .save_text(&TextEntry::new("t1", "Other", "overwritten?"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    assert_eq!(fs::read(ctx.paths.index_file()).unwrap(), index_before);
    assert_eq!(fs::read(ctx.paths.content_file("t1")).unwrap(), content_before);
}

#[test]
fn test_delete_removes_content_file() {
    let (_dir, ctx) = setup();
    ctx.library
        .save_text(&TextEntry::new("t1", "Hi", "hello"))
        .unwrap();
    ctx.library.delete_text("t1").unwrap();

    assert_eq!(ctx.library.text("t1").unwrap_err().kind(), ErrorKind::NotFound);
    assert!(!ctx.paths.content_file("t1").exists());
}

#[test]
fn test_traversal_ids_never_reach_disk() {
    let (dir, ctx) = setup();
    for id in ["../escape", "..", "a/b", "a\\b"] {
        let err = ctx
            .library
            .save_text(&TextEntry::new(id, "Bad", "bad"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{id}");
        assert_eq!(ctx.library.text(id).unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(
            ctx.library.delete_text(id).unwrap_err().kind(),
            ErrorKind::Validation
        );
    }
    assert!(!dir.path().join("texts").join("escape.txt").exists());
    assert!(!dir.path().join("escape.txt").exists());
}

#[test]
fn test_missing_content_file_serves_fallback() {
    let (_dir, ctx) = setup();
    fs::remove_file(ctx.paths.content_file("rust-ownership")).unwrap();

    let entry = ctx.library.text("rust-ownership").unwrap();
    assert_eq!(entry.title, "Rust: ownership");
    assert!(entry.content.starts_with("This text's content could not be found"));
}

#[test]
fn test_fallback_outlives_the_default_text() {
    let (_dir, ctx) = setup();
    ctx.library
        .update_text(&TextEntry::new("welcome", "Welcome", "my own words"))
        .unwrap();
    ctx.library.delete_text("welcome").unwrap();
    fs::remove_file(ctx.paths.content_file("rust-ownership")).unwrap();

    let entry = ctx.library.text("rust-ownership").unwrap();
    assert!(entry.content.starts_with("This text's content could not be found"));
    assert!(ctx.paths.fallback_file().exists());
}

#[test]
fn test_failed_index_write_rolls_back_content() {
    let (_dir, ctx) = setup();
    ctx.library.library().unwrap();

    // A directory where index.json should be makes the index write fail
    fs::remove_file(ctx.paths.index_file()).unwrap();
    fs::create_dir(ctx.paths.index_file()).unwrap();

    let err = ctx
        .library
        .save_text(&TextEntry::new("t1", "Hi", "hello"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!ctx.paths.content_file("t1").exists());
    assert_eq!(ctx.library.text("t1").unwrap_err().kind(), ErrorKind::NotFound);

    let err = ctx
        .library
        .update_text(&TextEntry::new("welcome", "Changed", "changed"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    let welcome = ctx.library.text("welcome").unwrap();
    assert_eq!(welcome.title, "Welcome");
    assert!(fs::read_to_string(ctx.paths.content_file("welcome"))
        .unwrap()
        .starts_with("Welcome to typist."));
}

#[test]
fn test_categories_round_trip_through_index() {
    let (dir, ctx) = setup();
    ctx.library
        .save_category(&Category::new("drills", "Drills").with_parent("general"))
        .unwrap();
    ctx.library.delete_category("code").unwrap();
    drop(ctx);

    let reopened = initialize(Some(dir.path().to_path_buf())).unwrap();
    let ids: Vec<String> = reopened
        .library
        .library()
        .unwrap()
        .categories
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec!["general", "drills"]);
}
