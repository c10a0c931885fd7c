//! Model files: learning tunables plus the whole Q-table as one JSON document.
//!
//! ```text
//! {
//!   "params":  { "learning_rate": 0.1, "discount_factor": 0.5, "epsilon": 0.5 },
//!   "q_table": { "<state key>": [[<action>, <value>], ...], ... }
//! }
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::qlearn::config::ModelParams;
use crate::qlearn::game::Action;
use crate::qlearn::storage::{QEntry, QStore, StoreError};

/// A serializable snapshot of a trained policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model<A> {
    /// Tunables in effect when the snapshot was taken.
    pub params: ModelParams,
    /// state_key -> [(action, value)]
    pub q_table: FxHashMap<String, Vec<QEntry<A>>>,
}

impl<A: Action> Model<A> {
    /// Empty model with the given tunables.
    pub fn new(params: ModelParams) -> Self {
        Self {
            params,
            q_table: FxHashMap::default(),
        }
    }

    /// Snapshot every state held by `store`.
    pub fn from_store<S: QStore<A>>(params: ModelParams, store: &S) -> Self {
        let mut q_table = FxHashMap::with_capacity_and_hasher(store.len(), Default::default());
        store.for_each(&mut |key: &str, entries: &[QEntry<A>]| {
            q_table.insert(key.to_string(), entries.to_vec());
        });
        Self { params, q_table }
    }

    /// Copy every state into `store`.
    pub fn load_into<S: QStore<A>>(&self, store: &S) -> Result<(), StoreError> {
        for (key, entries) in &self.q_table {
            store.set(key, entries.clone())?;
        }
        Ok(())
    }

    /// Number of states in the table.
    pub fn num_states(&self) -> usize {
        self.q_table.len()
    }

    /// Load a model from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| StoreError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse a model from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let model: Self =
            serde_json::from_str(json).map_err(|e| StoreError::ParseError(e.to_string()))?;
        model
            .params
            .validate()
            .map_err(|e| StoreError::ParseError(e.to_string()))?;
        Ok(model)
    }

    /// Save to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let json = serde_json::to_string(self).map_err(|e| StoreError::ParseError(e.to_string()))?;
        let mut file = File::create(path).map_err(|e| StoreError::IoError(e.to_string()))?;
        file.write_all(json.as_bytes())
            .map_err(|e| StoreError::IoError(e.to_string()))
    }
}
