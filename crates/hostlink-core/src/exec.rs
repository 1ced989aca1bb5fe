//! Synchronous execution of asynchronous work.
//!
//! The host protocol is synchronous and pull-based: it calls into the
//! engine on one logical thread and blocks for each result. Several of the
//! engine's collaborators (notably the children provider behind variable
//! expansion) are asynchronous. Rather than scattering ad hoc `block_on`
//! calls through the codebase, the bridge is a single injected capability:
//! any component that must present a synchronous contract over an async
//! dependency takes a [`BlockingExecutor`] at construction.
//!
//! The executor runs exactly one future at a time to completion. There is
//! deliberately no timeout or cancellation here: the host protocol has no
//! cancellation concept for these calls, and inventing one would change
//! observable behavior. A hang in the underlying future hangs the caller.

use std::future::Future;
use std::sync::Arc;

use crate::error::{EngineError, Result};

/// Runs futures to completion on behalf of blocking, single-threaded
/// callers.
///
/// Internally this owns a current-thread tokio runtime; the calling thread
/// itself drives the future, so no worker threads are spawned and calls
/// complete in submission order. Share one executor across components via
/// [`BlockingExecutor::shared`].
#[derive(Debug)]
pub struct BlockingExecutor
{
    runtime: tokio::runtime::Runtime,
}

impl BlockingExecutor
{
    /// Build a new executor.
    ///
    /// ## Errors
    ///
    /// Returns [`EngineError::Executor`] if the tokio runtime could not be
    /// created.
    pub fn new() -> Result<Self>
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(EngineError::Executor)?;
        Ok(Self { runtime })
    }

    /// Build a new executor wrapped for sharing between components.
    pub fn shared() -> Result<Arc<Self>>
    {
        Ok(Arc::new(Self::new()?))
    }

    /// Run `future` to completion, blocking the calling thread.
    ///
    /// Must not be called from within an async context (the runtime will
    /// panic); the host protocol's calls never are.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output
    {
        self.runtime.block_on(future)
    }
}
