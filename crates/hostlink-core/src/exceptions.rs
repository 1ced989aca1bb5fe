//! Exception-to-signal policy translation.
//!
//! The host expresses exception-handling policy as generic exception
//! notifications: a source identifier, a numeric code, and a state
//! bitmask. On a native target those map onto process signals, so this
//! module owns the runtime question "for signal X, should the debugged
//! process stop" and pushes the answer to the backend's signal controller.
//!
//! Notifications that are not ours to handle are silently dropped. That is
//! a design choice, not an oversight: an exception raised under a foreign
//! source identifier, or with a code outside the catalog, must not be
//! reinterpreted as a signal with an undefined disposition. The translator
//! only ever writes to the controller, never reads back.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::signals::SignalCatalog;

/// Identifier of the component that raised an exception notification.
///
/// The host hands these around as GUIDs; within the engine they are opaque
/// 128-bit values compared for equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub u128);

impl std::fmt::Display for SourceId
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "{:032x}", self.0)
    }
}

/// Source identifier of the debug engine itself.
pub const DEBUG_ENGINE_SOURCE: SourceId = SourceId(0x32ad_9dd9_25e4_48e4_8b0f_e0c2_2c9f_5e78);

/// Source identifier used for the engine's exception-settings category.
pub const EXCEPTION_SETTINGS_SOURCE: SourceId = SourceId(0x7a4a_9a61_9c68_4c33_9f1b_2c6f_3d8d_41b2);

/// Bit in [`ExceptionNotification::state`] requesting a stop on delivery.
pub const EXCEPTION_STOP_REQUESTED: u32 = 0x0020;

/// One exception event raised by the backend or by the engine itself.
/// Transient; consumed once by [`ExceptionTranslator::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionNotification
{
    /// Who raised this notification.
    pub source: SourceId,
    /// Exception code; for engine-owned notifications this is a signal
    /// code.
    pub code: i32,
    /// State bitmask; only [`EXCEPTION_STOP_REQUESTED`] is interpreted
    /// here.
    pub state: u32,
}

/// The backend's live, process-level signal policy handle.
///
/// The translator is the only writer within this engine; it never reads
/// back, so implementations need no read path.
pub trait SignalController
{
    /// Set whether the target should stop when `code` is delivered.
    fn set_should_stop(&mut self, code: i32, stop: bool);
}

/// Owns the per-session stop policy and applies it to the controller.
///
/// Construction immediately pushes every catalog default so that signals
/// the host never configures behave like backend-native defaults. Created
/// once per debugged-process session and dropped with it.
#[derive(Debug)]
pub struct ExceptionTranslator<C: SignalController>
{
    catalog: SignalCatalog,
    controller: C,
}

impl<C: SignalController> ExceptionTranslator<C>
{
    /// Create a translator and push all catalog defaults to `controller`.
    pub fn new(catalog: SignalCatalog, controller: C) -> Self
    {
        let mut translator = Self { catalog, controller };
        translator.reset_to_defaults();
        translator
    }

    /// Apply a batch of exception notifications.
    ///
    /// Only notifications raised under one of the engine's own source
    /// identifiers *and* carrying a catalog-known code reach the
    /// controller; everything else is dropped. When several notifications
    /// touch the same signal the last one wins, and the resulting
    /// mutations are pushed in catalog (ascending code) order, one
    /// controller call per signal touched.
    pub fn apply(&mut self, notifications: &[ExceptionNotification])
    {
        let mut requested: BTreeMap<i32, bool> = BTreeMap::new();
        for notification in notifications {
            if notification.source != DEBUG_ENGINE_SOURCE && notification.source != EXCEPTION_SETTINGS_SOURCE {
                trace!(source = %notification.source, code = notification.code, "ignoring foreign exception source");
                continue;
            }
            let Some(signal) = self.catalog.get(notification.code) else {
                debug!(code = notification.code, "ignoring exception for unmapped signal code");
                continue;
            };
            let stop = notification.state & EXCEPTION_STOP_REQUESTED != 0;
            trace!(signal = signal.name, stop, "stop disposition requested");
            requested.insert(signal.code, stop);
        }

        for (code, stop) in requested {
            debug!(code, stop, "pushing stop disposition to controller");
            self.controller.set_should_stop(code, stop);
        }
    }

    /// Re-push every catalog entry's default disposition, discarding any
    /// prior [`ExceptionTranslator::apply`] effects. Used on session
    /// (re)start.
    pub fn reset_to_defaults(&mut self)
    {
        for signal in self.catalog.iter() {
            self.controller.set_should_stop(signal.code, signal.stop);
        }
    }

    /// The catalog this translator was constructed with.
    #[must_use]
    pub fn catalog(&self) -> &SignalCatalog
    {
        &self.catalog
    }

    /// Access the controller (read-only, mainly for inspection in tests).
    #[must_use]
    pub fn controller(&self) -> &C
    {
        &self.controller
    }
}

#[cfg(test)]
mod tests
{
    use std::collections::HashMap;

    use super::*;
    use crate::signals::Signal;

    /// Records every mutation, in order, the way the backend stub in the
    /// original engine's test bench does.
    #[derive(Debug, Default)]
    struct RecordingController
    {
        dispositions: HashMap<i32, bool>,
        calls: Vec<(i32, bool)>,
    }

    impl RecordingController
    {
        fn should_stop(&self, code: i32) -> Option<bool>
        {
            self.dispositions.get(&code).copied()
        }
    }

    impl SignalController for RecordingController
    {
        fn set_should_stop(&mut self, code: i32, stop: bool)
        {
            self.dispositions.insert(code, stop);
            self.calls.push((code, stop));
        }
    }

    fn test_catalog() -> SignalCatalog
    {
        SignalCatalog::new([
            Signal::new(1, "SIGHUP", true),
            Signal::new(2, "SIGINT", true),
            Signal::new(3, "SIGQUIT", false),
        ])
        .unwrap()
    }

    fn stop_notification(source: SourceId, code: i32, stop: bool) -> ExceptionNotification
    {
        ExceptionNotification {
            source,
            code,
            state: if stop { EXCEPTION_STOP_REQUESTED } else { 0 },
        }
    }

    #[test]
    fn test_construction_pushes_all_defaults()
    {
        let translator = ExceptionTranslator::new(test_catalog(), RecordingController::default());
        let controller = translator.controller();
        assert_eq!(controller.should_stop(1), Some(true));
        assert_eq!(controller.should_stop(2), Some(true));
        assert_eq!(controller.should_stop(3), Some(false));
        assert_eq!(controller.calls, vec![(1, true), (2, true), (3, false)]);
    }

    #[test]
    fn test_foreign_source_never_reaches_controller()
    {
        let mut translator = ExceptionTranslator::new(test_catalog(), RecordingController::default());
        let foreign = SourceId(0x0123_4567_89ab_cdef_0123_4567_89ab_cedf);

        translator.apply(&[stop_notification(foreign, 1, false)]);
        // Code 1 is in the catalog, but the source is not ours, so the
        // default must be untouched.
        assert_eq!(translator.controller().should_stop(1), Some(true));
    }

    #[test]
    fn test_unmapped_signal_code_is_dropped()
    {
        let mut translator = ExceptionTranslator::new(test_catalog(), RecordingController::default());

        translator.apply(&[stop_notification(DEBUG_ENGINE_SOURCE, 5000, true)]);
        assert_eq!(translator.controller().should_stop(5000), None);
    }

    #[test]
    fn test_apply_updates_one_signal_and_reset_restores_it()
    {
        let mut translator = ExceptionTranslator::new(test_catalog(), RecordingController::default());

        translator.apply(&[stop_notification(DEBUG_ENGINE_SOURCE, 1, false)]);
        assert_eq!(translator.controller().should_stop(1), Some(false));
        assert_eq!(translator.controller().should_stop(2), Some(true), "SIGINT untouched");

        translator.apply(&[stop_notification(DEBUG_ENGINE_SOURCE, 1, true)]);
        assert_eq!(translator.controller().should_stop(1), Some(true));

        translator.apply(&[stop_notification(EXCEPTION_SETTINGS_SOURCE, 1, false)]);
        assert_eq!(translator.controller().should_stop(1), Some(false));

        translator.reset_to_defaults();
        assert_eq!(translator.controller().should_stop(1), Some(true));
        assert_eq!(translator.controller().should_stop(3), Some(false));
    }

    #[test]
    fn test_batch_mutations_are_pushed_in_code_order_and_deduplicated()
    {
        let mut translator = ExceptionTranslator::new(test_catalog(), RecordingController::default());
        let baseline = translator.controller().calls.len();

        translator.apply(&[
            stop_notification(DEBUG_ENGINE_SOURCE, 3, true),
            stop_notification(DEBUG_ENGINE_SOURCE, 1, false),
            stop_notification(DEBUG_ENGINE_SOURCE, 3, false),
        ]);

        let calls = &translator.controller().calls[baseline..];
        assert_eq!(calls, &[(1, false), (3, false)], "code order, last write wins");
    }
}
