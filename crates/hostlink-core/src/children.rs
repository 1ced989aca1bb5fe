//! Paged enumeration of a variable's children.
//!
//! When the host displays a composite variable it pulls the children
//! through a fixed four-operation cursor protocol: count, next-batch,
//! reset, and skip. The protocol is synchronous and strictly sequential,
//! while the underlying children source is asynchronous and may change
//! size between calls (the debugged process keeps running). This module
//! reconciles the two:
//!
//! - [`ChildrenProvider`] is the async source. It is queried fresh for its
//!   total on every count/skip; the total is never cached because the live
//!   collection can shrink or grow between host calls.
//! - [`ChildEnumerator`] owns the cursor and bridges each async fetch to a
//!   blocking result via an injected [`BlockingExecutor`]. One fetch is in
//!   flight at a time; the host never issues overlapping calls on the same
//!   cursor.
//!
//! A short read is end-of-data, not an error. The cursor is only advanced
//! after a fetch or count succeeds, so a provider failure leaves the
//! enumerator exactly where it was.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::error::{EngineError, Result};
use crate::exec::BlockingExecutor;

/// Boxed future returned by [`ChildrenProvider`] operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Flat, host-facing description of one child of a variable.
///
/// This is the fixed-layout record written directly into the host's output
/// buffer; it carries no behavior of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildPropertyInfo
{
    /// Display name of the child (field name, element index, etc.).
    pub name: String,
    /// Formatted value string.
    pub value: String,
    /// Formatted type name.
    pub type_name: String,
}

/// Asynchronous source of child records.
///
/// The enumerator holds a non-owning (shared) reference to the provider
/// for its own lifetime. Implementations report their *live* count: the
/// collection behind a provider is externally mutable and callers must not
/// assume two `count` calls agree.
pub trait ChildrenProvider: Send + Sync
{
    /// Current total number of children.
    fn count(&self) -> BoxFuture<'_, Result<usize>>;

    /// Fetch up to `requested` children starting at `from`, writing them
    /// into `out` from index 0. Returns the number written; fewer than
    /// `requested` means the source is exhausted at this call, not that it
    /// failed.
    fn fetch<'a>(&'a self, from: usize, requested: usize, out: &'a mut [ChildPropertyInfo])
        -> BoxFuture<'a, Result<usize>>;
}

/// Outcome of one next-batch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchStatus
{
    /// Number of records written into the caller's buffer.
    pub written: usize,
    /// Whether the full requested count was satisfied. `false` is the
    /// protocol's end-of-data indication, distinct from a fetch failure.
    pub fully_satisfied: bool,
}

/// Cursor-based enumerator over an externally-mutable child collection.
///
/// There is no closed or error state: every operation maps the current
/// offset and a fresh source snapshot to a new offset. After any operation
/// completes, `0 <= position <= live total` holds.
///
/// Not `Clone`: the host protocol defines a clone operation, but aliasing
/// cursor state silently is worse than refusing, so [`ChildEnumerator::try_clone`]
/// reports the capability as unsupported. Construct a new enumerator for
/// independent iteration.
pub struct ChildEnumerator
{
    provider: Arc<dyn ChildrenProvider>,
    exec: Arc<BlockingExecutor>,
    position: usize,
}

impl std::fmt::Debug for ChildEnumerator
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("ChildEnumerator")
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl ChildEnumerator
{
    /// Create an enumerator positioned at offset 0.
    #[must_use]
    pub fn new(provider: Arc<dyn ChildrenProvider>, exec: Arc<BlockingExecutor>) -> Self
    {
        Self {
            provider,
            exec,
            position: 0,
        }
    }

    /// Current cursor offset.
    #[must_use]
    pub fn position(&self) -> usize
    {
        self.position
    }

    /// Query the provider's current total.
    ///
    /// ## Errors
    ///
    /// Propagates the provider's failure; the cursor is untouched.
    pub fn count(&self) -> Result<usize>
    {
        self.exec.block_on(self.provider.count())
    }

    /// Fetch up to `requested` children at the cursor into `out`, then
    /// advance the cursor by the number actually written.
    ///
    /// `out` must have capacity for `requested` records; if it is smaller,
    /// only `out.len()` records are requested.
    ///
    /// ## Errors
    ///
    /// Propagates the provider's failure; the cursor is untouched on
    /// failure.
    pub fn next(&mut self, requested: usize, out: &mut [ChildPropertyInfo]) -> Result<BatchStatus>
    {
        let take = requested.min(out.len());
        let written = self
            .exec
            .block_on(self.provider.fetch(self.position, take, &mut out[..take]))?;
        self.position += written;
        debug!(written, position = self.position, "fetched child batch");
        Ok(BatchStatus {
            written,
            fully_satisfied: written == requested,
        })
    }

    /// Set the cursor back to offset 0. Always succeeds.
    pub fn reset(&mut self)
    {
        self.position = 0;
    }

    /// Advance the cursor by `n` without fetching, clamping to the
    /// provider's *live* total. Returns `true` if the unclamped target was
    /// within bounds, `false` if the cursor had to be clamped.
    ///
    /// The total is re-queried here rather than reusing any earlier count:
    /// if the collection shrank since the host last asked, the cursor must
    /// land on the current end, otherwise a subsequent [`ChildEnumerator::next`]
    /// would read nothing and be indistinguishable from ordinary
    /// end-of-data.
    ///
    /// ## Errors
    ///
    /// Propagates the provider's failure; the cursor is untouched on
    /// failure.
    pub fn skip(&mut self, n: usize) -> Result<bool>
    {
        let target = self.position.saturating_add(n);
        let total = self.exec.block_on(self.provider.count())?;
        if target > total {
            debug!(target, total, "skip clamped to live child count");
            self.position = total;
            Ok(false)
        } else {
            self.position = target;
            Ok(true)
        }
    }

    /// The enumeration protocol's clone operation.
    ///
    /// ## Errors
    ///
    /// Always [`EngineError::Unsupported`]; this surface does not alias
    /// cursor state.
    pub fn try_clone(&self) -> Result<Self>
    {
        Err(EngineError::Unsupported("clone of a child enumerator"))
    }
}
