//! Operation abstraction that call tracking wraps.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::Result;
use crate::tracking::CallArgs;

// == Operation ==
/// An async callable with a stable, qualified identity such as `Cache.store`.
///
/// The identity keys the call counter and both histories, so two operations
/// with the same name share one record.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Positional arguments, rendered into the input history
    type Args: CallArgs + Send;
    /// Return value, rendered into the output history with `Display`
    type Output: fmt::Display + Send;

    fn qualified_name(&self) -> &str;

    async fn invoke(&self, args: Self::Args) -> Result<Self::Output>;
}

// == Fn Operation ==
/// Adapts an async closure into an [`Operation`].
///
/// ```ignore
/// let double = FnOperation::new("math.double", |(n,): (i64,)| async move { Ok(n * 2) });
/// ```
pub struct FnOperation<A, F> {
    name: String,
    f: F,
    _args: PhantomData<fn(A)>,
}

impl<A, F> FnOperation<A, F> {
    pub fn new<Fut, T>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        Self {
            name: name.into(),
            f,
            _args: PhantomData,
        }
    }
}

impl<A, F> fmt::Debug for FnOperation<A, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOperation").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<A, F, Fut, T> Operation for FnOperation<A, F>
where
    A: CallArgs + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: fmt::Display + Send + 'static,
{
    type Args = A;
    type Output = T;

    fn qualified_name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, args: A) -> Result<T> {
        (self.f)(args).await
    }
}
