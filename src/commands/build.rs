//! Build command
//!
//! Builds and saves a side store for a loaded lexicon, reporting progress
//! while the builder runs on its own thread.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::engine::WordEngine;
use crate::wordlists::loader::load_playability;

/// Options for a side-store build
pub struct BuildConfig<'a> {
    pub output: &'a Path,
    /// Playability values, one `VALUE WORD` pair per line
    pub playability: Option<&'a Path>,
    pub show_progress: bool,
}

pub struct BuildResult {
    pub lexicon: String,
    pub path: PathBuf,
    pub words: usize,
    pub symbols: usize,
    pub duration: Duration,
}

/// Build the side store of `lexicon` and write it to `config.output`
///
/// # Errors
/// Fails if the lexicon is not loaded, the playability file cannot be read,
/// or the build itself fails.
pub fn build_store(engine: &WordEngine, lexicon: &str, config: &BuildConfig) -> Result<BuildResult> {
    let start = Instant::now();
    let mut builder = engine
        .store_builder(lexicon)
        .with_context(|| format!("Lexicon {lexicon} is not loaded"))?;
    if let Some(path) = config.playability {
        builder = builder.playability(load_playability(path)?);
    }

    let handle = builder.spawn(Some(config.output.to_path_buf()));
    if config.show_progress {
        let pb = ProgressBar::new(handle.total());
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | {msg}")?
                .progress_chars("█▓▒░"),
        );
        pb.set_message(lexicon.to_string());
        while !handle.is_finished() {
            pb.set_position(handle.progress());
            thread::sleep(Duration::from_millis(50));
        }
        pb.set_position(handle.progress());
        pb.finish_and_clear();
    }

    let store = handle
        .join()
        .with_context(|| format!("Building side store for {lexicon}"))?;
    let symbols = store.num_with_symbols()?;

    Ok(BuildResult {
        lexicon: lexicon.to_string(),
        path: config.output.to_path_buf(),
        words: store.len(),
        symbols,
        duration: start.elapsed(),
    })
}
