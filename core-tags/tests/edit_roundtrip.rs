//! Integration tests applying edits to a real (generated) WAV file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use core_tags::{TagEdit, TagEditor};

/// Write a minimal mono 16-bit PCM WAV file.
fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) {
    let data_len = (samples.len() * 2) as u32;
    let mut out = Vec::with_capacity(44 + data_len as usize);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }

    let mut file = File::create(path).unwrap();
    file.write_all(&out).unwrap();
}

fn fixture(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("track.wav");
    let samples: Vec<i16> = (0..4096).map(|i| ((i % 128) * 200 - 12_000) as i16).collect();
    write_wav(&path, &samples, 44_100);
    path
}

fn set(key: &str, value: &str) -> TagEdit {
    TagEdit::Set {
        key: key.into(),
        value: value.into(),
    }
}

#[test]
fn test_save_as_leaves_source_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let source = fixture(dir.path());
    let before = std::fs::read(&source).unwrap();

    let dest = dir.path().join("copy.wav");
    let mut editor = TagEditor::open(&source).unwrap();
    editor.apply(&[set("title", "Edited")]);
    editor.save_as(&dest).unwrap();

    assert_eq!(std::fs::read(&source).unwrap(), before);
    assert!(dest.exists());
}

#[test]
fn test_edits_survive_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let source = fixture(dir.path());
    let dest = dir.path().join("tagged.wav");

    let mut editor = TagEditor::open(&source).unwrap();
    editor.apply(&[set("title", "Some Song"), set("artist", "Some Artist")]);
    editor.save_as(&dest).unwrap();

    let reread = TagEditor::open(&dest).unwrap();
    let tags = reread.tags();
    assert!(tags.contains(&("title".to_string(), "Some Song".to_string())));
    assert!(tags.contains(&("artist".to_string(), "Some Artist".to_string())));
}

#[test]
fn test_later_set_wins_over_earlier() {
    let dir = tempfile::tempdir().unwrap();
    let source = fixture(dir.path());

    let mut editor = TagEditor::open(&source).unwrap();
    editor.apply(&[set("title", "First"), set("title", "Second")]);

    let tags = editor.tags();
    let titles: Vec<_> = tags.iter().filter(|(k, _)| k == "title").collect();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].1, "Second");
}

#[test]
fn test_delete_after_set_removes_key() {
    let dir = tempfile::tempdir().unwrap();
    let source = fixture(dir.path());

    let mut editor = TagEditor::open(&source).unwrap();
    editor.apply(&[
        set("title", "Temporary"),
        TagEdit::Delete {
            key: "title".into(),
        },
    ]);

    assert!(!editor.tags().iter().any(|(k, _)| k == "title"));
}
