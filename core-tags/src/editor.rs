//! # Tag Edit Application
//!
//! Wraps a lofty `TaggedFile` with the deferred edit model: edits mutate the
//! in-memory tag only, and `save_as` materializes them into a brand-new file
//! while the source stays untouched.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{ItemKey, ItemValue, Tag};
use tracing::debug;

use crate::error::{Result, TagError};
use crate::ops::TagEdit;

/// In-memory tag editor for one media file.
pub struct TagEditor {
    source: PathBuf,
    file: TaggedFile,
}

impl TagEditor {
    /// Probe `path` and load its tags. A file without any tag gets an empty
    /// primary tag so edits have somewhere to land.
    pub fn open(path: &Path) -> Result<Self> {
        let probe = Probe::open(path)
            .map_err(|e| TagError::Open(format!("{}: {}", path.display(), e)))?;
        let mut file = probe
            .guess_file_type()
            .map_err(|e| TagError::Open(format!("{}: {}", path.display(), e)))?
            .read()
            .map_err(|e| TagError::Parse(e.to_string()))?;

        if file.primary_tag().is_none() {
            let tag_type = file.primary_tag_type();
            debug!("No tag present, creating empty {:?} tag", tag_type);
            file.insert_tag(Tag::new(tag_type));
        }

        Ok(Self {
            source: path.to_path_buf(),
            file,
        })
    }

    /// Apply `edits` to the in-memory tag, in order. Nothing touches disk
    /// until [`save_as`](Self::save_as).
    pub fn apply(&mut self, edits: &[TagEdit]) {
        // The tag is guaranteed present by `open`.
        let Some(tag) = self.file.primary_tag_mut() else {
            return;
        };

        for edit in edits {
            match edit {
                TagEdit::Set { key, value } => {
                    debug!("set {}={}", key, value);
                    tag.insert_text(item_key_for(key), value.clone());
                }
                TagEdit::Delete { key } => {
                    debug!("delete {}", key);
                    let item_key = item_key_for(key);
                    tag.retain(|item| item.key() != &item_key);
                }
            }
        }
    }

    /// Snapshot of the current (post-edit) tag state as key/value text
    /// pairs, in tag order. Non-text items (artwork, binary frames) are
    /// skipped.
    pub fn tags(&self) -> Vec<(String, String)> {
        let Some(tag) = self.file.primary_tag() else {
            return Vec::new();
        };

        tag.items()
            .filter_map(|item| match item.value() {
                ItemValue::Text(text) | ItemValue::Locator(text) => {
                    Some((display_key(item.key()), text.clone()))
                }
                ItemValue::Binary(_) => None,
            })
            .collect()
    }

    /// Materialize all pending edits into a new file at `dest`.
    ///
    /// Copies the source file first, then rewrites the copy's tags, so the
    /// source is never modified. `dest` may already exist (e.g. a reserved
    /// temp placeholder); it is overwritten.
    pub fn save_as(&self, dest: &Path) -> Result<()> {
        fs::copy(&self.source, dest)?;

        let mut out = OpenOptions::new().read(true).write(true).open(dest)?;
        self.file
            .save_to(&mut out, WriteOptions::default())
            .map_err(|e| TagError::Save(format!("{}: {}", dest.display(), e)))?;

        debug!("Saved tagged copy to {}", dest.display());
        Ok(())
    }
}

/// Map a user-facing key to a lofty `ItemKey`. Well-known names normalize to
/// their canonical items so they survive conversion across tag formats;
/// anything else passes through verbatim.
fn item_key_for(key: &str) -> ItemKey {
    match key.to_ascii_lowercase().as_str() {
        "title" => ItemKey::TrackTitle,
        "artist" => ItemKey::TrackArtist,
        "album" => ItemKey::AlbumTitle,
        "albumartist" | "album_artist" => ItemKey::AlbumArtist,
        "genre" => ItemKey::Genre,
        "comment" => ItemKey::Comment,
        "composer" => ItemKey::Composer,
        "year" => ItemKey::Year,
        "date" => ItemKey::RecordingDate,
        "track" => ItemKey::TrackNumber,
        _ => ItemKey::Unknown(key.to_string()),
    }
}

/// Inverse of [`item_key_for`] for display purposes.
fn display_key(key: &ItemKey) -> String {
    match key {
        ItemKey::TrackTitle => "title".to_string(),
        ItemKey::TrackArtist => "artist".to_string(),
        ItemKey::AlbumTitle => "album".to_string(),
        ItemKey::AlbumArtist => "albumartist".to_string(),
        ItemKey::Genre => "genre".to_string(),
        ItemKey::Comment => "comment".to_string(),
        ItemKey::Composer => "composer".to_string(),
        ItemKey::Year => "year".to_string(),
        ItemKey::RecordingDate => "date".to_string(),
        ItemKey::TrackNumber => "track".to_string(),
        ItemKey::Unknown(name) => name.clone(),
        other => format!("{:?}", other).to_ascii_lowercase(),
    }
}
