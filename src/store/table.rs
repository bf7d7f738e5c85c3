//! The side store: one metadata row per word in SQLite
//!
//! A store is a database with a wide `words` table plus three one-column
//! meta tables (`db_version`, `lexicon_date`, `lexicon_file`). Side-store
//! conditions become a single `WHERE` clause over `words`. Saving copies the
//! database into a temporary file in the destination directory that is
//! renamed into place, so a reader never sees a half-written store.

use chrono::NaiveDate;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, Statement, params};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::query::WhereClause;
use super::record::WordRecord;
use crate::error::StoreError;
use crate::search::SearchCondition;

/// Schema version written by this crate
pub const SCHEMA_VERSION: u32 = 2;

const CREATE_TABLES: &str = "
    CREATE TABLE words (
        word TEXT PRIMARY KEY NOT NULL,
        alphagram TEXT NOT NULL,
        length INTEGER NOT NULL,
        combinations0 REAL NOT NULL,
        combinations1 REAL NOT NULL,
        combinations2 REAL NOT NULL,
        probability_order0 INTEGER NOT NULL DEFAULT 0,
        min_probability_order0 INTEGER NOT NULL DEFAULT 0,
        max_probability_order0 INTEGER NOT NULL DEFAULT 0,
        probability_order1 INTEGER NOT NULL DEFAULT 0,
        min_probability_order1 INTEGER NOT NULL DEFAULT 0,
        max_probability_order1 INTEGER NOT NULL DEFAULT 0,
        probability_order2 INTEGER NOT NULL DEFAULT 0,
        min_probability_order2 INTEGER NOT NULL DEFAULT 0,
        max_probability_order2 INTEGER NOT NULL DEFAULT 0,
        playability INTEGER NOT NULL DEFAULT 0,
        playability_order INTEGER NOT NULL DEFAULT 0,
        min_playability_order INTEGER NOT NULL DEFAULT 0,
        max_playability_order INTEGER NOT NULL DEFAULT 0,
        point_value INTEGER NOT NULL,
        num_vowels INTEGER NOT NULL,
        num_unique_letters INTEGER NOT NULL,
        num_anagrams INTEGER NOT NULL,
        front_hooks TEXT NOT NULL,
        back_hooks TEXT NOT NULL,
        is_front_hook INTEGER NOT NULL,
        is_back_hook INTEGER NOT NULL,
        lexicon_symbols TEXT NOT NULL,
        definition TEXT NOT NULL DEFAULT ''
    );
    CREATE TABLE db_version (version INTEGER NOT NULL);
    CREATE TABLE lexicon_date (date TEXT);
    CREATE TABLE lexicon_file (file TEXT);
";

const CREATE_INDEXES: &str = "
    CREATE INDEX length_index ON words (length);
    CREATE INDEX alphagram_index ON words (alphagram);
";

const INSERT_RECORD: &str = "
    INSERT OR REPLACE INTO words (
        word, alphagram, length, combinations0, combinations1, combinations2,
        probability_order0, min_probability_order0, max_probability_order0,
        probability_order1, min_probability_order1, max_probability_order1,
        probability_order2, min_probability_order2, max_probability_order2,
        playability, playability_order, min_playability_order, max_playability_order,
        point_value, num_vowels, num_unique_letters, num_anagrams,
        front_hooks, back_hooks, is_front_hook, is_back_hook,
        lexicon_symbols, definition
    ) VALUES (
        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
        ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29
    )";

pub(super) const UPDATE_ORDERS: &str = "
    UPDATE words SET
        probability_order0 = ?2, min_probability_order0 = ?3, max_probability_order0 = ?4,
        probability_order1 = ?5, min_probability_order1 = ?6, max_probability_order1 = ?7,
        probability_order2 = ?8, min_probability_order2 = ?9, max_probability_order2 = ?10,
        playability_order = ?11, min_playability_order = ?12, max_playability_order = ?13
    WHERE word = ?1";

pub(super) const UPDATE_DEFINITION: &str = "UPDATE words SET definition = ?2 WHERE word = ?1";

/// Contents of the auxiliary meta tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreMeta {
    pub schema_version: u32,
    pub lexicon_date: Option<NaiveDate>,
    /// Word list the store was built from
    pub lexicon_file: Option<String>,
}

impl Default for StoreMeta {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            lexicon_date: None,
            lexicon_file: None,
        }
    }
}

/// Create the `words` table and the meta tables
pub(super) fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_TABLES)
}

/// Create the secondary indexes and fill the meta tables
pub(super) fn finish_tables(conn: &Connection, meta: &StoreMeta) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_INDEXES)?;
    conn.execute("INSERT INTO db_version (version) VALUES (?1)", [meta.schema_version])?;
    conn.execute("INSERT INTO lexicon_date (date) VALUES (?1)", [meta.lexicon_date])?;
    conn.execute("INSERT INTO lexicon_file (file) VALUES (?1)", [&meta.lexicon_file])?;
    Ok(())
}

pub(super) fn prepare_insert(conn: &Connection) -> rusqlite::Result<Statement<'_>> {
    conn.prepare(INSERT_RECORD)
}

/// Write every column of `record`, replacing any row for the same word
pub(super) fn insert_record(insert: &mut Statement<'_>, record: &WordRecord) -> rusqlite::Result<()> {
    let [p0, p1, p2] = record.probability_order;
    let play = record.playability_order;
    insert.execute(params![
        record.word,
        record.alphagram,
        record.length,
        record.combinations[0],
        record.combinations[1],
        record.combinations[2],
        p0.order,
        p0.min,
        p0.max,
        p1.order,
        p1.min,
        p1.max,
        p2.order,
        p2.min,
        p2.max,
        record.playability,
        play.order,
        play.min,
        play.max,
        record.point_value,
        record.num_vowels,
        record.num_unique_letters,
        record.num_anagrams,
        record.front_hooks,
        record.back_hooks,
        record.is_front_hook,
        record.is_back_hook,
        record.lexicon_symbols,
        record.definition,
    ])?;
    Ok(())
}

fn read_meta(conn: &Connection) -> Result<StoreMeta, StoreError> {
    let schema_version = conn
        .query_row("SELECT version FROM db_version", [], |row| row.get(0))
        .optional()?
        .unwrap_or(0);
    let lexicon_date = conn
        .query_row("SELECT date FROM lexicon_date", [], |row| row.get(0))
        .optional()?
        .flatten();
    let lexicon_file = conn
        .query_row("SELECT file FROM lexicon_file", [], |row| row.get(0))
        .optional()?
        .flatten();
    Ok(StoreMeta {
        schema_version,
        lexicon_date,
        lexicon_file,
    })
}

/// A side store backed by an open SQLite connection
///
/// Clones share the connection.
#[derive(Debug, Clone)]
pub struct SideStore {
    conn: Arc<Mutex<Connection>>,
    meta: StoreMeta,
    len: usize,
}

impl SideStore {
    /// Build an in-memory store from rows; later duplicates of a word
    /// replace earlier ones
    ///
    /// # Errors
    /// Returns `StoreError::Database` if SQLite rejects the rows.
    pub fn from_records(meta: StoreMeta, records: &[WordRecord]) -> Result<Self, StoreError> {
        let mut conn = Connection::open_in_memory()?;
        let tx = conn.transaction()?;
        create_tables(&tx)?;
        {
            let mut insert = prepare_insert(&tx)?;
            for record in records {
                insert_record(&mut insert, record)?;
            }
        }
        finish_tables(&tx, &meta)?;
        tx.commit()?;
        Self::from_connection(conn)
    }

    /// Wrap a populated connection, checking its schema version
    ///
    /// # Errors
    /// Returns `StoreError::IncompatibleVersion` for a store of another
    /// schema, or `StoreError::Database` if the tables are missing.
    pub(super) fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        rusqlite::vtab::array::load_module(&conn)?;
        let meta = read_meta(&conn)?;
        if meta.schema_version != SCHEMA_VERSION {
            return Err(StoreError::IncompatibleVersion {
                found: meta.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        let len: i64 = conn.query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            meta,
            len: len as usize,
        })
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn meta(&self) -> &StoreMeta {
        &self.meta
    }

    /// Every row, ordered by word
    ///
    /// # Errors
    /// Returns `StoreError::Database` if the rows cannot be read.
    pub fn records(&self) -> Result<Vec<WordRecord>, StoreError> {
        let conn = self.connection();
        let mut stmt = conn.prepare("SELECT * FROM words ORDER BY word")?;
        let rows = stmt
            .query_map([], |row: &Row<'_>| WordRecord::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// The row for `word`; read failures are logged and give `None`
    #[must_use]
    pub fn get(&self, word: &str) -> Option<WordRecord> {
        let upper = word.to_ascii_uppercase();
        let conn = self.connection();
        conn.query_row("SELECT * FROM words WHERE word = ?1", [&upper], |row| {
            WordRecord::from_row(row)
        })
        .optional()
        .unwrap_or_else(|e| {
            log::warn!("Side store lookup of {upper} failed: {e}");
            None
        })
    }

    /// Rows for each of `words` that has one, ordered by word
    ///
    /// # Errors
    /// Returns `StoreError::Database` if the query fails.
    pub fn get_many(&self, words: &[String]) -> Result<Vec<WordRecord>, StoreError> {
        let mut clause = WhereClause::default();
        clause.restrict_to(words);
        let sql = format!("SELECT * FROM words WHERE {} ORDER BY word", clause.sql());
        let conn = self.connection();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(clause.params(), |row| WordRecord::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Number of rows carrying lexicon symbols
    ///
    /// # Errors
    /// Returns `StoreError::Database` if the count fails.
    pub fn num_with_symbols(&self) -> Result<usize, StoreError> {
        let count: i64 = self.connection().query_row(
            "SELECT COUNT(*) FROM words WHERE lexicon_symbols <> ''",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Words whose rows satisfy every side-store condition in `conditions`,
    /// ordered by word
    ///
    /// Conditions of other phases are skipped. With `restrict`, only those
    /// words are considered.
    ///
    /// # Errors
    /// Returns `StoreError::Database` if the query fails.
    pub fn query(
        &self,
        conditions: &[SearchCondition],
        restrict: Option<&[String]>,
    ) -> Result<Vec<String>, StoreError> {
        let mut clause = WhereClause::from_conditions(conditions);
        if let Some(words) = restrict {
            clause.restrict_to(words);
        }
        let sql = format!("SELECT word FROM words WHERE {} ORDER BY word", clause.sql());
        log::trace!("Side store query: {sql}");

        let conn = self.connection();
        let mut stmt = conn.prepare(&sql)?;
        let words = stmt
            .query_map(clause.params(), |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(words)
    }

    /// Write the store atomically
    ///
    /// # Errors
    /// Returns `StoreError` if the directory, temp file, copy or final
    /// rename fails. The destination is untouched on failure.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let parent_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent_dir)?;

        let temp_path = tempfile::Builder::new()
            .prefix(".zdb-")
            .tempfile_in(parent_dir)?
            .into_temp_path();
        self.connection()
            .execute("VACUUM INTO ?1", [temp_path.to_string_lossy().into_owned()])?;
        temp_path.persist(path)?;
        log::info!("Saved side store ({} words) to {}", self.len, path.display());
        Ok(())
    }

    /// Open a store written by [`SideStore::save`] or a file build
    ///
    /// # Errors
    /// Returns `StoreError::IncompatibleVersion` for a store of another
    /// schema, `StoreError::Io` for a missing file, or a database error.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        fs::metadata(path)?;
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let store = Self::from_connection(conn)?;
        log::info!(
            "Loaded side store ({} words) from {}",
            store.len,
            path.display()
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LetterBag;
    use crate::search::{Condition, Range};

    fn records() -> Vec<WordRecord> {
        let bag = LetterBag::default();
        ["CAT", "CATS", "ACT", "QUIZ", "ZA"]
            .iter()
            .map(|w| WordRecord::new(w, &bag))
            .collect()
    }

    fn store() -> SideStore {
        SideStore::from_records(StoreMeta::default(), &records()).unwrap()
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let s = store();
        assert_eq!(s.len(), 5);
        assert_eq!(s.get("quiz").map(|r| r.point_value), Some(22));
        assert!(s.get("DOG").is_none());
    }

    #[test]
    fn rows_round_trip_through_the_table() {
        let mut cat = WordRecord::new("CAT", &LetterBag::default());
        cat.front_hooks = "s".into();
        cat.is_back_hook = true;
        cat.playability = 120;
        cat.probability_order[1].max = 7;
        cat.definition = "a feline [n CATS]".into();
        let s = SideStore::from_records(StoreMeta::default(), std::slice::from_ref(&cat)).unwrap();
        assert_eq!(s.get("CAT"), Some(cat));
    }

    #[test]
    fn duplicate_rows_keep_the_last() {
        let mut first = WordRecord::new("CAT", &LetterBag::default());
        first.playability = 1;
        let mut second = first.clone();
        second.playability = 2;
        let s = SideStore::from_records(StoreMeta::default(), &[first, second]).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.get("CAT").map(|r| r.playability), Some(2));
    }

    #[test]
    fn query_scans_all_rows() {
        let found = store().query(&[SearchCondition::length(3, 3)], None).unwrap();
        assert_eq!(found, ["ACT", "CAT"]);
    }

    #[test]
    fn query_respects_restriction() {
        let restrict = vec!["ZA".to_string(), "CATS".to_string(), "DOG".to_string()];
        let found = store()
            .query(
                &[SearchCondition::new(Condition::PointValue(Range::new(0, 11)))],
                Some(&restrict),
            )
            .unwrap();
        assert_eq!(found, ["CATS", "ZA"]);
    }

    #[test]
    fn query_ignores_other_phases() {
        let found = store()
            .query(
                &[
                    SearchCondition::new(Condition::Prefix("S".into())),
                    SearchCondition::length(4, 4),
                ],
                None,
            )
            .unwrap();
        assert_eq!(found, ["CATS", "QUIZ"]);
    }

    #[test]
    fn negated_conditions_exclude_matches() {
        let found = store()
            .query(&[SearchCondition::negated(Condition::Length(Range::new(3, 3)))], None)
            .unwrap();
        assert_eq!(found, ["CATS", "QUIZ", "ZA"]);
    }

    #[test]
    fn get_many_skips_missing_words() {
        let words = vec!["QUIZ".to_string(), "DOG".to_string(), "cat".to_string()];
        let found: Vec<String> = store()
            .get_many(&words)
            .unwrap()
            .into_iter()
            .map(|r| r.word)
            .collect();
        assert_eq!(found, ["CAT", "QUIZ"]);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("OWL2.zdb");
        let meta = StoreMeta {
            lexicon_date: NaiveDate::from_ymd_opt(2006, 3, 1),
            lexicon_file: Some("owl2.txt".into()),
            ..StoreMeta::default()
        };
        let original = SideStore::from_records(meta.clone(), &records()).unwrap();
        original.save(&path).unwrap();

        let loaded = SideStore::load(&path).unwrap();
        assert_eq!(loaded.meta(), &meta);
        assert_eq!(loaded.records().unwrap(), original.records().unwrap());
        assert!(loaded.get("cat").is_some());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SideStore::load(&dir.path().join("none.zdb"));
        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[test]
    fn incompatible_schema_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.zdb");
        let conn = Connection::open(&path).unwrap();
        create_tables(&conn).unwrap();
        let meta = StoreMeta {
            schema_version: 1,
            ..StoreMeta::default()
        };
        finish_tables(&conn, &meta).unwrap();
        drop(conn);
        assert!(matches!(
            SideStore::load(&path),
            Err(StoreError::IncompatibleVersion { found: 1, expected: 2 })
        ));
    }

    #[test]
    fn non_store_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.zdb");
        fs::write(&path, b"not a database").unwrap();
        assert!(matches!(SideStore::load(&path), Err(StoreError::Database(_))));
    }
}
