//! # hostlink-core
//!
//! Translation layer between a synchronous, pull-based host debugging
//! protocol and an asynchronous native debugging backend.
//!
//! The host dictates a fixed integration contract: blocking calls,
//! cursor-based batch enumeration, exception policy expressed as generic
//! notifications. The backend speaks the opposite dialect: async child
//! lookups, process-level signal dispositions, free-form text-annotated
//! events. This crate reconciles the two with three independent adapters:
//!
//! - [`children`]: exposes an async, dynamically-sized child collection
//!   through the host's synchronous count/next/reset/skip protocol.
//! - [`exceptions`]: maps host exception notifications onto the native
//!   signal table and keeps the backend's stop/continue policy in sync.
//! - [`payload`]: recovers machine-readable payloads embedded in the
//!   backend's free-text event descriptions.
//!
//! Supporting pieces: [`exec`] provides the single sync-over-async bridge
//! the adapters share, [`signals`] the immutable per-session signal
//! catalog, and [`events`] the background subscriber that drains the
//! backend's listener and republishes typed events.
//!
//! The adapters share no state and are composed by a surrounding engine.

pub mod children;
pub mod error;
pub mod events;
pub mod exceptions;
pub mod exec;
pub mod payload;
pub mod signals;

pub use children::{BatchStatus, ChildEnumerator, ChildPropertyInfo, ChildrenProvider};
// Re-export commonly used types
pub use error::{EngineError, Result};
pub use events::{BackendListener, EngineEvent, EventSubscriber};
pub use exceptions::{ExceptionNotification, ExceptionTranslator, SignalController, SourceId};
pub use exec::BlockingExecutor;
pub use payload::{EventDescriptionParser, FileProcessingMethod, FileProcessingUpdate};
pub use signals::{default_catalog, Signal, SignalCatalog};
