//! Storage for the Q-table.
//!
//! The table maps a state key to the ordered list of `(action, value)`
//! entries for that state. Two backends implement [`QStore`]:
//! - [`MemoryStore`]: an in-process hash map
//! - [`JournalStore`]: a file-backed map that appends and flushes every
//!   write, so the table survives the process without an explicit save

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock, RwLockReadGuard};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::qlearn::game::Action;

/// One learned value: an action and its estimated return.
///
/// Serialized as a two-element array `[action, value]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QEntry<A>(pub A, pub f64);

impl<A> QEntry<A> {
    /// Fresh entry with value 0.
    pub fn zero(action: A) -> Self {
        QEntry(action, 0.0)
    }

    /// The action.
    pub fn action(&self) -> &A {
        &self.0
    }

    /// The current value.
    pub fn value(&self) -> f64 {
        self.1
    }
}

/// Highest value among `entries`, if any.
pub fn max_value<A>(entries: &[QEntry<A>]) -> Option<f64> {
    entries.iter().map(|e| e.1).reduce(f64::max)
}

/// Action with the highest value; the earliest entry wins ties.
pub fn best_action<A: Clone>(entries: &[QEntry<A>]) -> Option<A> {
    let mut best: Option<&QEntry<A>> = None;
    for entry in entries {
        if best.map_or(true, |b| entry.1 > b.1) {
            best = Some(entry);
        }
    }
    best.map(|e| e.0.clone())
}

/// Mapping-like access to a Q-table.
///
/// Implementations use interior mutability so a store can be shared
/// read-only across evaluation threads while the trainer owns writes.
pub trait QStore<A: Action>: Send + Sync {
    /// Entries for a state, cloned out of the store.
    fn get(&self, key: &str) -> Option<Vec<QEntry<A>>>;

    /// Replace the entries for a state.
    fn set(&self, key: &str, entries: Vec<QEntry<A>>) -> Result<(), StoreError>;

    /// Whether the state has been seen.
    fn contains(&self, key: &str) -> bool;

    /// Number of states stored.
    fn len(&self) -> usize;

    /// Whether nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit every stored state.
    fn for_each(&self, f: &mut dyn FnMut(&str, &[QEntry<A>]));

    /// Remove every state.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Errors raised by persistent storage and model files.
#[derive(Debug, Clone)]
pub enum StoreError {
    /// The backing file could not be read or written.
    IoError(String),
    /// The backing file held something other than a table.
    ParseError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::IoError(msg) => write!(f, "Storage I/O error: {}", msg),
            StoreError::ParseError(msg) => write!(f, "Storage parse error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// In-memory Q-table.
#[derive(Debug)]
pub struct MemoryStore<A> {
    /// state_key -> [(action, value)]
    table: RwLock<FxHashMap<String, Vec<QEntry<A>>>>,
}

impl<A> Default for MemoryStore<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> MemoryStore<A> {
    /// Create new empty storage.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(FxHashMap::default()),
        }
    }

    /// Create storage with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: RwLock::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    /// Get read access to the whole table (for analysis/export).
    pub fn table(&self) -> RwLockReadGuard<'_, FxHashMap<String, Vec<QEntry<A>>>> {
        self.table.read().unwrap()
    }
}

impl<A: Clone> Clone for MemoryStore<A> {
    fn clone(&self) -> Self {
        Self {
            table: RwLock::new(self.table.read().unwrap().clone()),
        }
    }
}

impl<A: Action> QStore<A> for MemoryStore<A> {
    fn get(&self, key: &str) -> Option<Vec<QEntry<A>>> {
        self.table.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, entries: Vec<QEntry<A>>) -> Result<(), StoreError> {
        self.table.write().unwrap().insert(key.to_string(), entries);
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.table.read().unwrap().contains_key(key)
    }

    fn len(&self) -> usize {
        self.table.read().unwrap().len()
    }

    fn for_each(&self, f: &mut dyn FnMut(&str, &[QEntry<A>])) {
        for (key, entries) in self.table.read().unwrap().iter() {
            f(key, entries);
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.table.write().unwrap().clear();
        Ok(())
    }
}

/// File-backed Q-table with write-through semantics.
///
/// Every `set` appends one JSON line `[key, entries]` to the journal and
/// flushes it before returning. Opening a journal replays it; later lines
/// overwrite earlier ones. [`JournalStore::compact`] rewrites the file with
/// one line per state.
#[derive(Debug)]
pub struct JournalStore<A> {
    path: PathBuf,
    table: RwLock<FxHashMap<String, Vec<QEntry<A>>>>,
    writer: Mutex<BufWriter<File>>,
}

impl<A: Action> JournalStore<A> {
    /// Open (or create) the journal at `path`, replaying any existing contents.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut table = FxHashMap::default();

        if path.exists() {
            let file = File::open(&path).map_err(|e| StoreError::IoError(e.to_string()))?;
            for (line_no, line) in BufReader::new(file).lines().enumerate() {
                let line = line.map_err(|e| StoreError::IoError(e.to_string()))?;
                if line.trim().is_empty() {
                    continue;
                }
                let (key, entries): (String, Vec<QEntry<A>>) = serde_json::from_str(&line)
                    .map_err(|e| StoreError::ParseError(format!("line {}: {}", line_no + 1, e)))?;
                table.insert(key, entries);
            }
        }

        let writer = Self::append_writer(&path)?;

        Ok(Self {
            path,
            table: RwLock::new(table),
            writer: Mutex::new(writer),
        })
    }

    /// Path of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the journal with exactly one line per stored state.
    pub fn compact(&self) -> Result<(), StoreError> {
        // Writer before table, the same order `set` and `clear` use.
        let mut writer = self.writer.lock().unwrap();
        let table = self.table.read().unwrap();

        let tmp = self.path.with_extension("compact");
        {
            let file = File::create(&tmp).map_err(|e| StoreError::IoError(e.to_string()))?;
            let mut out = BufWriter::new(file);
            for (key, entries) in table.iter() {
                write_line(&mut out, key, entries)?;
            }
            out.flush().map_err(|e| StoreError::IoError(e.to_string()))?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::IoError(e.to_string()))?;

        *writer = Self::append_writer(&self.path)?;
        Ok(())
    }

    fn append_writer(path: &Path) -> Result<BufWriter<File>, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        Ok(BufWriter::new(file))
    }
}

fn write_line<A: Serialize, W: Write>(
    out: &mut W,
    key: &str,
    entries: &[QEntry<A>],
) -> Result<(), StoreError> {
    let line = serde_json::to_string(&(key, entries))
        .map_err(|e| StoreError::ParseError(e.to_string()))?;
    writeln!(out, "{}", line).map_err(|e| StoreError::IoError(e.to_string()))
}

impl<A: Action> QStore<A> for JournalStore<A> {
    fn get(&self, key: &str) -> Option<Vec<QEntry<A>>> {
        self.table.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, entries: Vec<QEntry<A>>) -> Result<(), StoreError> {
        {
            let mut writer = self.writer.lock().unwrap();
            write_line(&mut *writer, key, &entries)?;
            writer
                .flush()
                .map_err(|e| StoreError::IoError(e.to_string()))?;
        }
        self.table.write().unwrap().insert(key.to_string(), entries);
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.table.read().unwrap().contains_key(key)
    }

    fn len(&self) -> usize {
        self.table.read().unwrap().len()
    }

    fn for_each(&self, f: &mut dyn FnMut(&str, &[QEntry<A>])) {
        for (key, entries) in self.table.read().unwrap().iter() {
            f(key, entries);
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut writer = self.writer.lock().unwrap();
        File::create(&self.path).map_err(|e| StoreError::IoError(e.to_string()))?;
        *writer = Self::append_writer(&self.path)?;
        self.table.write().unwrap().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::moves::{Jump, Move};

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("checkers_qlearn_{}_{}.jsonl", name, std::process::id()));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_best_action_prefers_first_on_tie() {
        let entries = vec![
            QEntry(Move::Step { from: 8, to: 12 }, 0.5),
            QEntry(Move::Step { from: 8, to: 13 }, 0.5),
            QEntry(Move::Step { from: 9, to: 13 }, -0.2),
        ];
        assert_eq!(best_action(&entries), Some(Move::Step { from: 8, to: 12 }));
        assert_eq!(max_value(&entries), Some(0.5));
        assert_eq!(best_action::<Move>(&[]), None);
    }

    #[test]
    fn test_memory_store_basic_ops() {
        let store: MemoryStore<Move> = MemoryStore::new();
        assert!(store.is_empty());
        store
            .set("bkey", vec![QEntry::zero(Move::Step { from: 8, to: 12 })])
            .unwrap();
        assert!(store.contains("bkey"));
        assert!(!store.contains("wkey"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("bkey").unwrap()[0].value(), 0.0);

        let mut seen = 0;
        store.for_each(&mut |_: &str, entries: &[QEntry<Move>]| seen += entries.len());
        assert_eq!(seen, 1);

        store.clear().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_journal_store_replays_latest_write() {
        let path = temp_path("replay");
        let capture = Move::Capture {
            from: 9,
            jumps: vec![Jump::new(13, 16)],
        };

        {
            let store: JournalStore<Move> = JournalStore::open(&path).unwrap();
            store.set("k1", vec![QEntry(capture.clone(), 0.0)]).unwrap();
            store.set("k1", vec![QEntry(capture.clone(), 0.25)]).unwrap();
            store
                .set("k2", vec![QEntry(Move::Step { from: 1, to: 5 }, -1.0)])
                .unwrap();
        }

        let reopened: JournalStore<Move> = JournalStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get("k1"), Some(vec![QEntry(capture, 0.25)]));

        assert_eq!(reopened.path(), path.as_path());
        reopened.compact().unwrap();
        let lines = fs::read_to_string(&path).unwrap().lines().count();
        assert_eq!(lines, 2);

        reopened.clear().unwrap();
        let empty: JournalStore<Move> = JournalStore::open(&path).unwrap();
        assert!(empty.is_empty());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_journal_store_rejects_garbage() {
        let path = temp_path("garbage");
        fs::write(&path, "not json\n").unwrap();
        let result: Result<JournalStore<Move>, _> = JournalStore::open(&path);
        assert!(matches!(result, Err(StoreError::ParseError(_))));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_journal_store_compacts_during_writes() {
        let path = temp_path("concurrent");
        let store: JournalStore<Move> = JournalStore::open(&path).unwrap();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..200u8 {
                    let entries = vec![QEntry(Move::Step { from: i % 32, to: 0 }, i as f64)];
                    store.set(&format!("k{}", i % 10), entries).unwrap();
                }
            });
            scope.spawn(|| {
                for _ in 0..50 {
                    store.compact().unwrap();
                }
            });
        });

        assert_eq!(store.len(), 10);
        store.compact().unwrap();
        let reopened: JournalStore<Move> = JournalStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 10);
        assert_eq!(reopened.get("k9"), store.get("k9"));

        let _ = fs::remove_file(&path);
    }
}
