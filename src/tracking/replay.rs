//! Replay Log
//!
//! Reads back a tracked operation's history and renders it in call order.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::error::{CacheError, Result};
use crate::store::KeyValueStore;
use crate::tracking::HistoryKeys;

// == Replay Entry ==
/// One recorded call: rendered argument tuple and rendered result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayEntry {
    pub args: String,
    pub result: String,
}

// == Replay ==
/// The recorded history of one operation.
///
/// Renders as a header followed by one line per call:
///
/// ```text
/// Cache.store was called 2 times:
/// Cache.store(*('a',)) -> 5f1c...
/// Cache.store(*('b',)) -> 9d0e...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub name: String,
    /// Counter value, which may exceed `entries.len()` for failed calls
    pub calls: u64,
    pub entries: Vec<ReplayEntry>,
}

impl Replay {
    pub fn header(&self) -> String {
        format!("{} was called {} times:", self.name, self.calls)
    }

    /// Call lines without the header.
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| format!("{}(*{}) -> {}", self.name, entry.args, entry.result))
            .collect()
    }
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header())?;
        for line in self.lines() {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}

// == Replay Log ==
/// Read-only view over the histories written by `CallTracker`.
#[derive(Debug)]
pub struct ReplayLog<S> {
    store: Arc<S>,
}

impl<S> Clone for ReplayLog<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: KeyValueStore> ReplayLog<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Loads the counter and both histories for `name` and pairs them by index.
    ///
    /// An operation that was never called yields zero calls and no entries.
    pub async fn replay(&self, name: &str) -> Result<Replay> {
        let keys = HistoryKeys::for_operation(name);

        let calls = match self.store.get(&keys.counter).await? {
            Some(bytes) => std::str::from_utf8(&bytes)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .ok_or_else(|| {
                    CacheError::Conversion(format!(
                        "Call counter '{}' does not hold an integer",
                        keys.counter
                    ))
                })?,
            None => 0,
        };

        let inputs = self.store.range(&keys.inputs, 0, -1).await?;
        let outputs = self.store.range(&keys.outputs, 0, -1).await?;
        if inputs.len() != outputs.len() {
            warn!(
                "History of {} is misaligned: {} inputs, {} outputs",
                name,
                inputs.len(),
                outputs.len()
            );
        }

        let entries = inputs
            .into_iter()
            .zip(outputs)
            .map(|(args, result)| ReplayEntry { args, result })
            .collect();

        Ok(Replay {
            name: name.to_string(),
            calls,
            entries,
        })
    }
}
