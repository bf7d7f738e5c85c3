//! Offline side-store construction
//!
//! Builds one row per word of a lexicon: draw combinations, hooks, anagram
//! counts, probability and playability orderings, lexicon symbols and
//! resolved definitions. Row values are computed on rayon; each phase
//! (table creation, word insertion, rank assignment, definition attachment,
//! indexes and meta tables) is written in its own transaction. The shared
//! cancellation flag is checked every `cancel_check_interval` rows, and a
//! cancelled phase rolls back. File builds write to a temporary database
//! that only replaces the destination once every phase has committed.

use rayon::prelude::*;
use rusqlite::{Connection, params};
use rustc_hash::FxHashMap;
use std::cmp::Ordering as CmpOrdering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tempfile::TempPath;

use super::definitions::Definitions;
use super::record::{ValueOrder, WordRecord};
use super::styles::LexiconStyle;
use super::table::{
    self, SideStore, StoreMeta, UPDATE_DEFINITION, UPDATE_ORDERS, create_tables, finish_tables,
};
use crate::core::{LetterBag, alphagram, ranks_tied};
use crate::error::{BuildError, StoreError};
use crate::graph::WordGraph;

/// Work units per word: record, ranking and definition phases
const STEPS_PER_WORD: u64 = 3;

/// Everything needed to build the side store of one lexicon
#[derive(Debug, Clone)]
pub struct StoreBuilder {
    lexicon: String,
    graph: Arc<WordGraph>,
    bag: LetterBag,
    definitions: Definitions,
    playability: FxHashMap<String, i64>,
    styles: Vec<LexiconStyle>,
    compare_graphs: FxHashMap<String, Arc<WordGraph>>,
    meta: StoreMeta,
    link_depth: usize,
    check_interval: usize,
}

impl StoreBuilder {
    #[must_use]
    pub fn new(lexicon: &str, graph: Arc<WordGraph>, bag: LetterBag) -> Self {
        Self {
            lexicon: lexicon.to_string(),
            graph,
            bag,
            definitions: Definitions::new(),
            playability: FxHashMap::default(),
            styles: Vec::new(),
            compare_graphs: FxHashMap::default(),
            meta: StoreMeta::default(),
            link_depth: 3,
            check_interval: 1000,
        }
    }

    #[must_use]
    pub fn definitions(mut self, definitions: Definitions) -> Self {
        self.definitions = definitions;
        self
    }

    #[must_use]
    pub fn playability(mut self, values: impl IntoIterator<Item = (String, i64)>) -> Self {
        self.playability = values.into_iter().collect();
        self
    }

    /// Style rules plus the graphs of the lexicons they compare against
    #[must_use]
    pub fn styles(
        mut self,
        styles: Vec<LexiconStyle>,
        compare_graphs: FxHashMap<String, Arc<WordGraph>>,
    ) -> Self {
        self.styles = styles;
        self.compare_graphs = compare_graphs;
        self
    }

    #[must_use]
    pub fn meta(mut self, meta: StoreMeta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub const fn link_depth(mut self, depth: usize) -> Self {
        self.link_depth = depth;
        self
    }

    #[must_use]
    pub fn cancel_check_interval(mut self, rows: usize) -> Self {
        self.check_interval = rows.max(1);
        self
    }

    /// Progress units a full build reports
    #[must_use]
    pub fn total_steps(&self) -> u64 {
        self.graph.len() as u64 * STEPS_PER_WORD
    }

    /// Build an in-memory store on the calling thread
    ///
    /// # Errors
    /// Returns `BuildError::Cancelled` if `cancel` is raised mid-build.
    pub fn build(&self, cancel: &AtomicBool, progress: &AtomicU64) -> Result<SideStore, BuildError> {
        let mut conn = Connection::open_in_memory()?;
        self.populate(&mut conn, cancel, progress)?;
        Ok(SideStore::from_connection(conn)?)
    }

    /// Build into a database file at `path`, replacing it atomically
    ///
    /// # Errors
    /// Returns `BuildError::DatabaseOpen` if the database cannot be created,
    /// before any work is done, plus the errors of [`Self::build`]. The
    /// destination is untouched on failure.
    pub fn build_to_file(
        &self,
        path: &Path,
        cancel: &AtomicBool,
        progress: &AtomicU64,
    ) -> Result<SideStore, BuildError> {
        let temp_path = open_destination(path)?;
        let mut conn = Connection::open(&temp_path).map_err(|e| BuildError::DatabaseOpen {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.populate(&mut conn, cancel, progress)?;
        conn.close().map_err(|(_, e)| e)?;
        check(cancel)?;
        temp_path.persist(path).map_err(StoreError::from)?;
        log::info!("Wrote side store for {} to {}", self.lexicon, path.display());
        Ok(SideStore::load(path)?)
    }

    /// Run every build phase against `conn`
    fn populate(
        &self,
        conn: &mut Connection,
        cancel: &AtomicBool,
        progress: &AtomicU64,
    ) -> Result<(), BuildError> {
        let started = Instant::now();
        let words = self.graph.words();
        log::info!("Building side store for {} ({} words)", self.lexicon, words.len());

        let tx = conn.transaction()?;
        create_tables(&tx)?;
        tx.commit()?;

        let mut anagrams: FxHashMap<String, u32> = FxHashMap::default();
        for word in &words {
            *anagrams.entry(alphagram(word)).or_insert(0) += 1;
        }
        let symbol_styles = self.active_styles();

        log::debug!("Computing word records");
        let mut rows: Vec<WordRecord> = words
            .par_chunks(self.check_interval)
            .map(|chunk| {
                check(cancel)?;
                let rows: Vec<WordRecord> = chunk
                    .iter()
                    .map(|word| self.record(word, &anagrams, &symbol_styles))
                    .collect();
                progress.fetch_add(chunk.len() as u64, Ordering::Relaxed);
                Ok(rows)
            })
            .collect::<Result<Vec<_>, BuildError>>()?
            .into_iter()
            .flatten()
            .collect();

        log::debug!("Inserting {} words", rows.len());
        let tx = conn.transaction()?;
        {
            let mut insert = table::prepare_insert(&tx)?;
            for (i, row) in rows.iter().enumerate() {
                if i % self.check_interval == 0 {
                    check(cancel)?;
                }
                if let Err(e) = table::insert_record(&mut insert, row) {
                    log::warn!("Skipped row for {}: {e}", row.word);
                }
            }
        }
        tx.commit()?;

        log::debug!("Ranking by probability and playability");
        assign_orders(&mut rows, cancel, progress)?;
        let tx = conn.transaction()?;
        {
            let mut update = tx.prepare(UPDATE_ORDERS)?;
            for (i, row) in rows.iter().enumerate() {
                if i % self.check_interval == 0 {
                    check(cancel)?;
                }
                let [p0, p1, p2] = row.probability_order;
                let play = row.playability_order;
                let result = update.execute(params![
                    row.word, p0.order, p0.min, p0.max, p1.order, p1.min, p1.max, p2.order,
                    p2.min, p2.max, play.order, play.min, play.max,
                ]);
                if let Err(e) = result {
                    log::warn!("Skipped orders for {}: {e}", row.word);
                }
            }
        }
        tx.commit()?;

        log::debug!("Resolving definitions");
        let depth = self.link_depth;
        let definitions: Vec<(String, String)> = rows
            .par_chunks(self.check_interval)
            .map(|chunk| {
                check(cancel)?;
                let resolved: Vec<(String, String)> = chunk
                    .iter()
                    .filter_map(|row| {
                        self.definitions
                            .resolved(&row.word, depth)
                            .map(|text| (row.word.clone(), text))
                    })
                    .collect();
                progress.fetch_add(chunk.len() as u64, Ordering::Relaxed);
                Ok(resolved)
            })
            .collect::<Result<Vec<_>, BuildError>>()?
            .into_iter()
            .flatten()
            .collect();
        let tx = conn.transaction()?;
        {
            let mut update = tx.prepare(UPDATE_DEFINITION)?;
            for (i, (word, text)) in definitions.iter().enumerate() {
                if i % self.check_interval == 0 {
                    check(cancel)?;
                }
                if let Err(e) = update.execute(params![word, text]) {
                    log::warn!("Skipped definition for {word}: {e}");
                }
            }
        }
        tx.commit()?;

        check(cancel)?;
        let tx = conn.transaction()?;
        finish_tables(&tx, &self.meta)?;
        tx.commit()?;

        let unmatched = self
            .playability
            .keys()
            .filter(|word| !self.graph.contains(word))
            .count();
        if unmatched > 0 {
            log::warn!("Skipped {unmatched} playability rows for words not in {}", self.lexicon);
        }

        log::info!(
            "Built side store for {} in {:.2}s",
            self.lexicon,
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Run [`Self::build_to_file`] (or [`Self::build`] without a path) on a
    /// background thread
    #[must_use]
    pub fn spawn(self, path: Option<PathBuf>) -> BuildHandle {
        let cancel = Arc::new(AtomicBool::new(false));
        let progress = Arc::new(AtomicU64::new(0));
        let total = self.total_steps();
        let handle = {
            let cancel = Arc::clone(&cancel);
            let progress = Arc::clone(&progress);
            thread::spawn(move || match path {
                Some(path) => self.build_to_file(&path, &cancel, &progress),
                None => self.build(&cancel, &progress),
            })
        };
        BuildHandle {
            cancel,
            progress,
            total,
            handle,
        }
    }

    /// Style rules of this lexicon whose comparison lexicon is available
    fn active_styles(&self) -> Vec<(&LexiconStyle, &WordGraph)> {
        self.styles
            .iter()
            .filter(|style| style.lexicon == self.lexicon)
            .filter_map(|style| match self.compare_graphs.get(&style.compare_lexicon) {
                Some(graph) => Some((style, graph.as_ref())),
                None => {
                    log::warn!(
                        "Lexicon {} is not loaded, ignoring style '{style}'",
                        style.compare_lexicon
                    );
                    None
                }
            })
            .collect()
    }

    fn record(
        &self,
        word: &str,
        anagrams: &FxHashMap<String, u32>,
        styles: &[(&LexiconStyle, &WordGraph)],
    ) -> WordRecord {
        let mut record = WordRecord::new(word, &self.bag);
        record.num_anagrams = anagrams.get(&record.alphagram).copied().unwrap_or(1);
        record.playability = self.playability.get(word).copied().unwrap_or(0);

        let mut candidate = String::with_capacity(word.len() + 1);
        for letter in 'A'..='Z' {
            candidate.clear();
            candidate.push(letter);
            candidate.push_str(word);
            if self.graph.contains(&candidate) {
                record.front_hooks.push(letter.to_ascii_lowercase());
            }
            candidate.clear();
            candidate.push_str(word);
            candidate.push(letter);
            if self.graph.contains(&candidate) {
                record.back_hooks.push(letter.to_ascii_lowercase());
            }
        }
        record.is_front_hook = word.len() > 1 && self.graph.contains(&word[1..]);
        record.is_back_hook = word.len() > 1 && self.graph.contains(&word[..word.len() - 1]);

        for (style, graph) in styles {
            if style.applies(graph.contains(word)) {
                record.lexicon_symbols.push_str(&style.symbol);
            }
        }
        record
    }
}

/// A build running on a background thread
#[derive(Debug)]
pub struct BuildHandle {
    cancel: Arc<AtomicBool>,
    progress: Arc<AtomicU64>,
    total: u64,
    handle: JoinHandle<Result<SideStore, BuildError>>,
}

impl BuildHandle {
    /// Ask the build to stop at its next check
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn progress(&self) -> u64 {
        self.progress.load(Ordering::Relaxed)
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the build to end
    ///
    /// # Errors
    /// Returns the build's error, or `BuildError::WorkerPanicked`.
    pub fn join(self) -> Result<SideStore, BuildError> {
        self.handle.join().map_err(|_| BuildError::WorkerPanicked)?
    }
}

#[inline]
fn check(cancel: &AtomicBool) -> Result<(), BuildError> {
    if cancel.load(Ordering::Relaxed) {
        Err(BuildError::Cancelled)
    } else {
        Ok(())
    }
}

/// Create the temporary database file next to `path`
fn open_destination(path: &Path) -> Result<TempPath, BuildError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let open_error = |e: std::io::Error| BuildError::DatabaseOpen {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    std::fs::create_dir_all(parent).map_err(open_error)?;
    let temp = tempfile::Builder::new()
        .prefix(".zdb-")
        .tempfile_in(parent)
        .map_err(open_error)?;
    Ok(temp.into_temp_path())
}

/// Compare two records for one ordering: value descending, then alphagram,
/// then word
fn by_value(a: &WordRecord, b: &WordRecord, value: impl Fn(&WordRecord) -> f64) -> CmpOrdering {
    value(b)
        .total_cmp(&value(a))
        .then_with(|| a.alphagram.cmp(&b.alphagram))
        .then_with(|| a.word.cmp(&b.word))
}

/// Rank every length bucket by each blank count and by playability
fn assign_orders(
    rows: &mut [WordRecord],
    cancel: &AtomicBool,
    progress: &AtomicU64,
) -> Result<(), BuildError> {
    let mut buckets: FxHashMap<u32, Vec<usize>> = FxHashMap::default();
    for (i, row) in rows.iter().enumerate() {
        buckets.entry(row.length).or_default().push(i);
    }

    for indices in buckets.values() {
        check(cancel)?;
        for blanks in 0..3 {
            let orders = rank(rows, indices, |r| r.combinations[blanks]);
            for (&i, order) in indices.iter().zip(orders) {
                rows[i].probability_order[blanks] = order;
            }
        }
        let orders = rank(rows, indices, |r| r.playability as f64);
        for (&i, order) in indices.iter().zip(orders) {
            rows[i].playability_order = order;
        }
        progress.fetch_add(indices.len() as u64, Ordering::Relaxed);
    }
    Ok(())
}

/// Orders for `indices` (in their given sequence) under one value
///
/// Positions are 1-based; a tie group of equal values shares the window
/// from its first to its last position.
fn rank(
    rows: &[WordRecord],
    indices: &[usize],
    value: impl Fn(&WordRecord) -> f64 + Copy,
) -> Vec<ValueOrder> {
    let mut sorted: Vec<usize> = (0..indices.len()).collect();
    sorted.sort_by(|&a, &b| by_value(&rows[indices[a]], &rows[indices[b]], value));

    let mut orders = vec![ValueOrder::default(); indices.len()];
    let mut start = 0;
    while start < sorted.len() {
        let group_value = value(&rows[indices[sorted[start]]]);
        let mut end = start;
        while end + 1 < sorted.len()
            && ranks_tied(value(&rows[indices[sorted[end + 1]]]), group_value)
        {
            end += 1;
        }
        for (pos, &slot) in sorted.iter().enumerate().take(end + 1).skip(start) {
            orders[slot] = ValueOrder {
                order: pos as u32 + 1,
                min: start as u32 + 1,
                max: end as u32 + 1,
            };
        }
        start = end + 1;
    }
    orders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LetterBag;

    fn builder(words: &[&str]) -> StoreBuilder {
        StoreBuilder::new(
            "TEST",
            Arc::new(WordGraph::from_words(words.iter().copied())),
            LetterBag::default(),
        )
    }

    fn build(b: &StoreBuilder) -> SideStore {
        b.build(&AtomicBool::new(false), &AtomicU64::new(0)).unwrap()
    }

    /// CAT takes a back hook but is not one itself: dropping its last
    /// letter leaves CA, which is not a word.
    #[test]
    fn back_hooks_and_hook_flags() {
        let store = build(&builder(&["CAT", "CATS", "SCAT", "AT"]));
        let cat = store.get("CAT").unwrap();
        assert_eq!(cat.back_hooks, "s");
        assert_eq!(cat.front_hooks, "s");
        assert!(cat.is_front_hook);
        assert!(!cat.is_back_hook);

        let cats = store.get("CATS").unwrap();
        assert!(cats.is_back_hook);
        assert!(!cats.is_front_hook);
    }

    #[test]
    fn anagram_counts_include_the_word() {
        let store = build(&builder(&["CAT", "ACT", "TACO"]));
        assert_eq!(store.get("CAT").unwrap().num_anagrams, 2);
        assert_eq!(store.get("TACO").unwrap().num_anagrams, 1);
    }

    #[test]
    fn tied_words_share_order_window() {
        // Anagrams always tie on combinations
        let store = build(&builder(&["CAT", "ACT", "TAO", "ZAX"]));
        for blanks in 0..3 {
            let act = store.get("ACT").unwrap().probability_order[blanks];
            let cat = store.get("CAT").unwrap().probability_order[blanks];
            assert_eq!((act.min, act.max), (cat.min, cat.max));
            assert_eq!(act.max - act.min, 1);
            // Alphagram ties fall back to word order
            assert_eq!(act.order + 1, cat.order);
        }
        let zax = store.get("ZAX").unwrap().probability_order[0];
        assert_eq!((zax.order, zax.min, zax.max), (4, 4, 4));
    }

    #[test]
    fn rounding_differences_share_order_window() {
        let row = |word: &str, combinations: f64| WordRecord {
            word: word.to_string(),
            alphagram: alphagram(word),
            combinations: [combinations; 3],
            ..WordRecord::default()
        };
        let rows = [row("TAB", 0.1 + 0.2), row("ZAX", 0.3), row("TIE", 0.1)];
        let orders = rank(&rows, &[0, 1, 2], |r| r.combinations[0]);
        assert_eq!((orders[0].min, orders[0].max), (1, 2));
        assert_eq!((orders[1].min, orders[1].max), (1, 2));
        assert_eq!((orders[2].order, orders[2].min), (3, 3));
    }

    #[test]
    fn orders_are_per_length_bucket() {
        let store = build(&builder(&["AT", "ZA", "CAT"]));
        assert_eq!(store.get("CAT").unwrap().probability_order[2].order, 1);
        assert_eq!(store.get("AT").unwrap().probability_order[0].order, 1);
        assert_eq!(store.get("ZA").unwrap().probability_order[0].order, 2);
    }

    #[test]
    fn playability_orders_descend() {
        let b = builder(&["QI", "ZA", "XI"])
            .playability([("ZA".to_string(), 90), ("QI".to_string(), 120), ("NOPE".to_string(), 5)]);
        let store = build(&b);
        assert_eq!(store.get("QI").unwrap().playability_order.order, 1);
        assert_eq!(store.get("ZA").unwrap().playability_order.order, 2);
        assert_eq!(store.get("XI").unwrap().playability, 0);
        assert_eq!(store.get("XI").unwrap().playability_order.order, 3);
    }

    #[test]
    fn definitions_and_symbols_are_attached() {
        let mut defs = Definitions::new();
        defs.insert("CAT", "a feline [n CATS]");
        defs.insert("CATS", "<CAT=n>");
        let other = Arc::new(WordGraph::from_words(["CAT"]));
        let mut compare = FxHashMap::default();
        compare.insert("OLD".to_string(), other);
        let style: LexiconStyle = "TEST and not OLD: symbol +".parse().unwrap();

        let store = build(
            &builder(&["CAT", "CATS"])
                .definitions(defs)
                .styles(vec![style], compare),
        );
        assert_eq!(store.get("CATS").unwrap().definition, "a feline");
        assert_eq!(store.get("CATS").unwrap().lexicon_symbols, "+");
        assert_eq!(store.get("CAT").unwrap().lexicon_symbols, "");
    }

    #[test]
    fn progress_reaches_total() {
        let b = builder(&["CAT", "ACT", "TACO"]);
        let progress = AtomicU64::new(0);
        b.build(&AtomicBool::new(false), &progress).unwrap();
        assert_eq!(progress.load(Ordering::Relaxed), b.total_steps());
    }

    #[test]
    fn cancelled_build_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TEST.zdb");
        let result = builder(&["CAT"]).build_to_file(&path, &AtomicBool::new(true), &AtomicU64::new(0));
        assert!(matches!(result, Err(BuildError::Cancelled)));
        assert!(!path.exists());
    }

    #[test]
    fn cancelled_phase_leaves_no_loadable_store() {
        let mut conn = Connection::open_in_memory().unwrap();
        let result = builder(&["CAT", "ACT"]).populate(&mut conn, &AtomicBool::new(true), &AtomicU64::new(0));
        assert!(matches!(result, Err(BuildError::Cancelled)));

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
        assert!(matches!(
            SideStore::from_connection(conn),
            Err(StoreError::IncompatibleVersion { found: 0, .. })
        ));
    }

    #[test]
    fn file_store_has_word_and_meta_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TEST.zdb");
        let meta = StoreMeta {
            lexicon_file: Some("test.txt".into()),
            ..StoreMeta::default()
        };
        let store = builder(&["CAT", "CATS"])
            .meta(meta.clone())
            .build_to_file(&path, &AtomicBool::new(false), &AtomicU64::new(0))
            .unwrap();
        assert_eq!(store.meta(), &meta);

        let conn = Connection::open(&path).unwrap();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(tables, ["db_version", "lexicon_date", "lexicon_file", "words"]);
    }

    #[test]
    fn unwritable_destination_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let path = blocker.join("TEST.zdb");
        let result = builder(&["CAT"]).build_to_file(&path, &AtomicBool::new(false), &AtomicU64::new(0));
        assert!(matches!(result, Err(BuildError::DatabaseOpen { .. })));
    }

    #[test]
    fn background_build_completes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TEST.zdb");
        let handle = builder(&["CAT", "CATS"]).spawn(Some(path.clone()));
        assert_eq!(handle.total(), 6);
        let store = handle.join().unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(SideStore::load(&path).unwrap().len(), 2);
    }
}
