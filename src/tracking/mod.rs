//! Tracking Module
//!
//! Call counting, argument/result history and replay for any [`Operation`].
//!
//! For an operation named `Cache.store` the store holds:
//! - `Cache.store` - invocation counter
//! - `Cache.store:inputs` - rendered argument tuples, in call order
//! - `Cache.store:outputs` - rendered results, index-aligned with the inputs

mod operation;
mod replay;
mod repr;
mod tracker;

use std::fmt;
use std::str::FromStr;

pub use operation::{FnOperation, Operation};
pub use replay::{Replay, ReplayEntry, ReplayLog};
pub use repr::{repr_bytes, ArgRepr, CallArgs};
pub use tracker::CallTracker;

// == History Keys ==
/// Store keys holding the record of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryKeys {
    pub counter: String,
    pub inputs: String,
    pub outputs: String,
}

impl HistoryKeys {
    pub fn for_operation(name: &str) -> Self {
        Self {
            counter: name.to_string(),
            inputs: format!("{}:inputs", name),
            outputs: format!("{}:outputs", name),
        }
    }
}

// == Failure Policy ==
/// What a [`CallTracker`] records when the wrapped operation returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Count and input always; the error is recorded as the output `Err(<message>)`
    /// so inputs and outputs stay index-aligned.
    #[default]
    RecordError,
    /// Count and input always; output only on success. Failed calls leave the
    /// input history one entry longer than the output history.
    SkipOutput,
    /// Nothing is recorded unless the operation succeeds.
    SuccessOnly,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "record_error" => Ok(FailurePolicy::RecordError),
            "skip_output" => Ok(FailurePolicy::SkipOutput),
            "success_only" => Ok(FailurePolicy::SuccessOnly),
            other => Err(format!("Unknown failure policy: {}", other)),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailurePolicy::RecordError => "record_error",
            FailurePolicy::SkipOutput => "skip_output",
            FailurePolicy::SuccessOnly => "success_only",
        };
        f.write_str(name)
    }
}
