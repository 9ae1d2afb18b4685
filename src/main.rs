//! Command-line entry point for `tagsafe`.
//!
//! Edits metadata tags on a media file while verifying, via a checksum over
//! the decoded audio, that the edit did not corrupt the audio stream:
//!
//! ```text
//! tagsafe file [--update KEY VALUE]... [--delete KEY]...
//! ```
//!
//! Tag listings go to stdout; progress and diagnostics go to stderr. Exit
//! status is zero only when the verified copy has been published.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_rewrite::{LoftyRewriter, Rewriter};
use core_scan::{AudioScanner, ScanSpec};
use core_tags::{TagEdit, TagEditor};

#[derive(Parser, Debug)]
#[command(
    name = "tagsafe",
    about = "Edit media file tags, verifying the audio stream survives the rewrite"
)]
struct CliArgs {
    /// Path to the media file to edit.
    pub file: PathBuf,

    /// Set a tag to a value. Repeat as many times as you need to.
    #[arg(long, num_args = 2, value_names = ["KEY", "VALUE"], action = ArgAction::Append)]
    pub update: Vec<String>,

    /// Delete a tag. Repeat as many times as you need to.
    #[arg(long, value_name = "KEY", action = ArgAction::Append)]
    pub delete: Vec<String>,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Rebuild the global ordering of `--update` and `--delete` occurrences.
///
/// Edits must be applied in the order given on the command line (a later
/// operation on the same key wins), and clap groups values per flag, so the
/// two lists are merged back together by argument index.
fn collect_edits(matches: &ArgMatches) -> Vec<TagEdit> {
    let mut ordered: Vec<(usize, TagEdit)> = Vec::new();

    if let Some(occurrences) = matches.get_occurrences::<String>("update") {
        let indices: Vec<usize> = matches
            .indices_of("update")
            .map(|indices| indices.collect())
            .unwrap_or_default();
        for (slot, mut occurrence) in occurrences.enumerate() {
            if let (Some(key), Some(value)) = (occurrence.next(), occurrence.next()) {
                // Two indices per occurrence; the first one orders the pair.
                ordered.push((
                    indices[slot * 2],
                    TagEdit::Set {
                        key: key.clone(),
                        value: value.clone(),
                    },
                ));
            }
        }
    }

    if let Some(occurrences) = matches.get_occurrences::<String>("delete") {
        let indices: Vec<usize> = matches
            .indices_of("delete")
            .map(|indices| indices.collect())
            .unwrap_or_default();
        for (slot, mut occurrence) in occurrences.enumerate() {
            if let Some(key) = occurrence.next() {
                ordered.push((indices[slot], TagEdit::Delete { key: key.clone() }));
            }
        }
    }

    ordered.sort_by_key(|(index, _)| *index);
    ordered.into_iter().map(|(_, edit)| edit).collect()
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .try_init()
        .ok();
}

fn run(file: &Path, edits: &[TagEdit]) -> Result<()> {
    let scanner = AudioScanner::new(ScanSpec::default());
    let rewriter = Rewriter::new(scanner, LoftyRewriter);

    let outcome = rewriter
        .run(file, edits)
        .with_context(|| format!("rewrite of {} failed", file.display()))?;

    // Inspection output: the tag state of the published file.
    let editor = TagEditor::open(&outcome.published)
        .with_context(|| format!("reading back tags of {}", outcome.published.display()))?;
    for (key, value) in editor.tags() {
        println!("{}={}", key, value);
    }

    info!("OK");
    Ok(())
}

fn main() -> ExitCode {
    let matches = CliArgs::command().get_matches();
    let args = match CliArgs::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    init_tracing(args.verbose);
    let edits = collect_edits(&matches);

    match run(&args.file, &edits) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
