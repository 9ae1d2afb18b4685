//! End-to-end tests running the full verified rewrite protocol against
//! real generated WAV files, with the production scanner and tag rewriter.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use core_rewrite::{LoftyRewriter, RewriteError, Rewriter, TagRewriter};
use core_scan::{AudioScanner, ScanSpec};
use core_tags::{TagEdit, TagEditor, TagError};

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

fn tone(len: usize) -> Vec<i16> {
    (0..len)
        .map(|i| {
            let t = i as f32 / 44_100.0;
            ((t * 220.0 * 2.0 * std::f32::consts::PI).sin() * 10_000.0) as i16
        })
        .collect()
}

fn fixture(dir: &Path, samples: usize) -> PathBuf {
    let path = dir.join("track.wav");
    write_wav(&path, &tone(samples), 44_100);
    path
}

fn temp_files_in(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with(".tmp"))
                .unwrap_or(false)
        })
        .collect()
}

#[test]
fn test_tag_edit_round_trip_preserves_audio() {
    let dir = tempfile::tempdir().unwrap();
    let original = fixture(dir.path(), 44_100);

    let scanner = AudioScanner::new(ScanSpec::default());
    let before = scanner.scan(&original).unwrap();

    let rewriter = Rewriter::new(scanner.clone(), LoftyRewriter);
    let outcome = rewriter
        .run(
            &original,
            &[TagEdit::Set {
                key: "title".into(),
                value: "Round Trip".into(),
            }],
        )
        .unwrap();

    assert_eq!(outcome.before, before);
    assert_eq!(outcome.after, before);

    // The published file decodes to the exact same audio and carries the tag.
    assert_eq!(scanner.scan(&original).unwrap(), before);
    let tags = TagEditor::open(&original).unwrap().tags();
    assert!(tags.contains(&("title".to_string(), "Round Trip".to_string())));

    assert!(temp_files_in(dir.path()).is_empty());
}

/// A rewriter that also flips one byte inside the audio data chunk,
/// simulating a tag library corrupting the stream it rewrites.
struct CorruptingRewriter;

impl TagRewriter for CorruptingRewriter {
    fn rewrite(&self, source: &Path, dest: &Path, edits: &[TagEdit]) -> Result<(), TagError> {
        LoftyRewriter.rewrite(source, dest, edits)?;

        let mut bytes = fs::read(dest)?;
        // Offset 2000 is deep inside the data chunk of our fixtures.
        bytes[2000] ^= 0x40;
        fs::write(dest, bytes)?;
        Ok(())
    }
}

#[test]
fn test_corrupted_rewrite_is_detected_and_original_kept() {
    let dir = tempfile::tempdir().unwrap();
    let original = fixture(dir.path(), 44_100);
    let pristine = fs::read(&original).unwrap();

    let scanner = AudioScanner::new(ScanSpec::default());
    let rewriter = Rewriter::new(scanner, CorruptingRewriter);

    let err = rewriter
        .run(
            &original,
            &[TagEdit::Set {
                key: "title".into(),
                value: "Corrupted".into(),
            }],
        )
        .unwrap_err();

    let RewriteError::ChecksumMismatch { temp, .. } = err else {
        panic!("expected ChecksumMismatch, got {err:?}");
    };

    // Original byte-identical to its pre-run state; temp kept on disk.
    assert_eq!(fs::read(&original).unwrap(), pristine);
    assert!(temp.exists());
}

#[test]
fn test_near_empty_decode_aborts_before_mutation() {
    let dir = tempfile::tempdir().unwrap();
    // 256 samples normalize to 512 bytes, below the 1024-byte guard.
    let original = fixture(dir.path(), 256);
    let pristine = fs::read(&original).unwrap();

    let scanner = AudioScanner::new(ScanSpec::default());
    let rewriter = Rewriter::new(scanner, LoftyRewriter);

    let err = rewriter
        .run(
            &original,
            &[TagEdit::Set {
                key: "title".into(),
                value: "Too Short".into(),
            }],
        )
        .unwrap_err();

    assert!(matches!(err, RewriteError::ImplausiblyShort { .. }));
    assert_eq!(fs::read(&original).unwrap(), pristine);
    assert!(temp_files_in(dir.path()).is_empty());
}

#[test]
fn test_delete_only_run_publishes() {
    let dir = tempfile::tempdir().unwrap();
    let original = fixture(dir.path(), 44_100);

    // Seed a tag first so there is something to delete.
    let scanner = AudioScanner::new(ScanSpec::default());
    Rewriter::new(scanner.clone(), LoftyRewriter)
        .run(
            &original,
            &[TagEdit::Set {
                key: "comment".into(),
                value: "to be removed".into(),
            }],
        )
        .unwrap();

    Rewriter::new(scanner, LoftyRewriter)
        .run(
            &original,
            &[TagEdit::Delete {
                key: "comment".into(),
            }],
        )
        .unwrap();

    let tags = TagEditor::open(&original).unwrap().tags();
    assert!(!tags.iter().any(|(k, _)| k == "comment"));
}
