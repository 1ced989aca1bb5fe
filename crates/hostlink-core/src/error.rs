//! # Error Types
//!
//! General error handling for the adapter core.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! A deliberate part of this design is what is *not* an error: a short read
//! from the children provider is end-of-data (reported through
//! [`crate::children::BatchStatus`]), an out-of-range skip clamps the cursor
//! and reports it through a flag, and a malformed embedded payload yields
//! `None` from the parser. Only conditions that genuinely prevent an
//! operation from completing surface as [`EngineError`].

use thiserror::Error;

/// Main error type for adapter operations
///
/// ## Error Categories
///
/// 1. **Protocol errors**: Unsupported (the host asked for a capability
///    this protocol surface does not provide)
/// 2. **Collaborator errors**: Provider (the async children source failed)
/// 3. **Configuration errors**: DuplicateSignal (invalid catalog supplied
///    at construction)
/// 4. **Runtime errors**: Executor (the blocking executor could not start)
/// 5. **I/O errors**: Io (for file operations, etc.)
#[derive(Error, Debug)]
pub enum EngineError
{
    /// The host requested an operation this protocol surface does not
    /// implement.
    ///
    /// This is explicit capability absence, not a bug: the enumeration
    /// protocol defines a clone operation that this engine intentionally
    /// refuses (callers needing independent iteration must construct a new
    /// enumerator). Modeled as an error variant instead of a panic so it
    /// can cross the protocol boundary as a well-formed failure code.
    #[error("operation not supported by this protocol surface: {0}")]
    Unsupported(&'static str),

    /// The asynchronous children provider failed a count or fetch call.
    ///
    /// The enumerator never advances its cursor when this happens, so the
    /// host can retry the same call.
    #[error("children provider error: {0}")]
    Provider(String),

    /// A signal catalog was constructed with two entries sharing a code.
    ///
    /// Signal identity is the numeric code; a duplicate would make the
    /// stop-disposition lookup ambiguous, so catalogs are validated at
    /// construction time.
    #[error("duplicate signal code {0} in catalog")]
    DuplicateSignal(i32),

    /// The blocking executor's runtime could not be built.
    #[error("failed to start blocking executor: {0}")]
    Executor(#[source] std::io::Error),

    /// I/O error (for file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, EngineError>`
pub type Result<T> = std::result::Result<T, EngineError>;
