//! Job list parsing tests
//!
//! Exercises the text and JSON job file loaders end to end through files
//! on disk.

use skillvoice::jobs::{load_line_file, load_structured_file, Job};
use skillvoice::GeneratorError;
use std::fs;

#[test]
fn test_line_file_with_comment_and_malformed_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skills.txt");
    fs::write(&path, "冲锋:Charge.ogg\n# test\nbadline\n").unwrap();

    let parsed = load_line_file(&path).expect("one valid line is enough");
    assert_eq!(parsed.jobs, vec![Job::new("冲锋", "Charge.ogg")]);
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.warnings[0].line_number, 3);
    assert_eq!(parsed.warnings[0].content, "badline");
    assert!(parsed.warnings[0].to_string().contains("badline"));
}

#[test]
fn test_line_file_keeps_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skills.txt");
    fs::write(
        &path,
        "# warrior\n\n冲锋:Charge.ogg\n斩杀：Execute.ogg\n盾牌猛击:ShieldSlam.ogg\n",
    )
    .unwrap();

    let parsed = load_line_file(&path).unwrap();
    let filenames: Vec<&str> = parsed.jobs.iter().map(|j| j.filename.as_str()).collect();
    assert_eq!(filenames, vec!["Charge.ogg", "Execute.ogg", "ShieldSlam.ogg"]);
    assert!(parsed.warnings.is_empty());
}

#[test]
fn test_missing_line_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_line_file(&dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, GeneratorError::InputNotFound(_)));
}

#[test]
fn test_structured_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skills.json");
    fs::write(
        &path,
        r#"{"skills": [
            {"text": "突袭", "filename": "Raid.ogg"},
            {"text": "爆炸性打击", "filename": "Blast.ogg", "ssml": "<speak>...</speak>"}
        ]}"#,
    )
    .unwrap();

    let parsed = load_structured_file(&path).unwrap();
    assert_eq!(parsed.jobs.len(), 2);
    assert_eq!(parsed.jobs[0].ssml, None);
    assert_eq!(parsed.jobs[1].ssml.as_deref(), Some("<speak>...</speak>"));
}

#[test]
fn test_broken_structured_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skills.json");
    fs::write(&path, r#"{"skills": [ {"text": "突袭"#).unwrap();

    let err = load_structured_file(&path).unwrap_err();
    assert!(matches!(err, GeneratorError::JobFile(_)));
}
