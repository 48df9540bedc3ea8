//! Call Tracker
//!
//! Wraps an [`Operation`] so every invocation is counted and its arguments and
//! result are appended to the store.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Result;
use crate::store::KeyValueStore;
use crate::tracking::{CallArgs, FailurePolicy, HistoryKeys, Operation};

// == Call Tracker ==
/// Counting and history-recording wrapper around an operation.
///
/// The tracker is itself an [`Operation`] with the same name, arguments and
/// output, so callers use it in place of the wrapped one.
///
/// Per call, in order: increment the counter, append the rendered arguments,
/// invoke, append the rendered result, return the result unchanged. The steps
/// are separate store writes. Concurrent calls on the same identity can
/// interleave them unless the tracker is [`serialized`](Self::serialized).
pub struct CallTracker<O, S> {
    inner: O,
    store: Arc<S>,
    keys: HistoryKeys,
    policy: FailurePolicy,
    /// Held across a whole call when serialized
    gate: Option<Mutex<()>>,
}

impl<O, S> CallTracker<O, S>
where
    O: Operation,
    S: KeyValueStore,
{
    // == Constructor ==
    /// Wraps `inner`, recording into `store` under its qualified name.
    pub fn new(inner: O, store: Arc<S>) -> Self {
        let keys = HistoryKeys::for_operation(inner.qualified_name());
        Self {
            inner,
            store,
            keys,
            policy: FailurePolicy::default(),
            gate: None,
        }
    }

    /// Sets what is recorded when the wrapped operation fails.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// When enabled, calls through this tracker run one at a time so the
    /// counter, inputs and outputs always advance together.
    pub fn serialized(mut self, enabled: bool) -> Self {
        self.gate = enabled.then(|| Mutex::new(()));
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn is_serialized(&self) -> bool {
        self.gate.is_some()
    }

    pub fn keys(&self) -> &HistoryKeys {
        &self.keys
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }

    // == Call ==
    /// Invokes the wrapped operation and records the call.
    ///
    /// Store failures while recording are returned as `Storage` errors. An
    /// error from the operation itself is returned unchanged.
    pub async fn call(&self, args: O::Args) -> Result<O::Output> {
        let _guard = match &self.gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };

        let rendered = args.render();
        if self.policy != FailurePolicy::SuccessOnly {
            self.record_input(&rendered).await?;
        }

        match self.inner.invoke(args).await {
            Ok(output) => {
                if self.policy == FailurePolicy::SuccessOnly {
                    self.record_input(&rendered).await?;
                }
                self.store
                    .append(&self.keys.outputs, output.to_string())
                    .await?;
                Ok(output)
            }
            Err(err) => {
                warn!("{}{} failed: {}", self.keys.counter, rendered, err);
                if self.policy == FailurePolicy::RecordError {
                    let recorded = self
                        .store
                        .append(&self.keys.outputs, format!("Err({})", err))
                        .await;
                    if let Err(record_err) = recorded {
                        warn!(
                            "Could not record failed call to {}: {}",
                            self.keys.counter, record_err
                        );
                    }
                }
                Err(err)
            }
        }
    }

    async fn record_input(&self, rendered: &str) -> Result<()> {
        let count = self.store.increment(&self.keys.counter).await?;
        self.store
            .append(&self.keys.inputs, rendered.to_string())
            .await?;
        debug!("{} call #{} args={}", self.keys.counter, count, rendered);
        Ok(())
    }
}

impl<O, S> fmt::Debug for CallTracker<O, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallTracker")
            .field("keys", &self.keys)
            .field("policy", &self.policy)
            .field("serialized", &self.gate.is_some())
            .finish()
    }
}

#[async_trait]
impl<O, S> Operation for CallTracker<O, S>
where
    O: Operation,
    S: KeyValueStore,
{
    type Args = O::Args;
    type Output = O::Output;

    fn qualified_name(&self) -> &str {
        self.inner.qualified_name()
    }

    async fn invoke(&self, args: Self::Args) -> Result<Self::Output> {
        self.call(args).await
    }
}
