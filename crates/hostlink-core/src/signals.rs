//! Native signal catalog.
//!
//! A catalog maps each signal code the backend can deliver to its name and
//! default stop disposition. One catalog exists per debugged-process
//! session, is validated at construction, and is never mutated afterwards;
//! runtime policy changes go through the backend's signal controller, not
//! the catalog (see [`crate::exceptions`]).
//!
//! Iteration order is ascending by code, which makes bulk pushes to the
//! controller deterministic.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::error::{EngineError, Result};

/// One native runtime signal and whether the debugger should halt the
/// target when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal
{
    /// Numeric code; this is the signal's identity within a catalog.
    pub code: i32,
    /// Canonical name, e.g. `SIGSEGV`.
    pub name: &'static str,
    /// Default stop disposition.
    pub stop: bool,
    /// Alternative names some toolchains use for the same code.
    pub aliases: &'static [&'static str],
}

impl Signal
{
    #[must_use]
    pub const fn new(code: i32, name: &'static str, stop: bool) -> Self
    {
        Self {
            code,
            name,
            stop,
            aliases: &[],
        }
    }

    #[must_use]
    pub const fn with_aliases(code: i32, name: &'static str, stop: bool, aliases: &'static [&'static str]) -> Self
    {
        Self {
            code,
            name,
            stop,
            aliases,
        }
    }
}

/// Immutable mapping from signal code to default [`Signal`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalCatalog
{
    by_code: BTreeMap<i32, Signal>,
}

impl SignalCatalog
{
    /// Build a catalog from a list of signals.
    ///
    /// ## Errors
    ///
    /// Returns [`EngineError::DuplicateSignal`] if two entries share a
    /// code.
    pub fn new(signals: impl IntoIterator<Item = Signal>) -> Result<Self>
    {
        let mut by_code = BTreeMap::new();
        for signal in signals {
            let code = signal.code;
            if by_code.insert(code, signal).is_some() {
                return Err(EngineError::DuplicateSignal(code));
            }
        }
        Ok(Self { by_code })
    }

    /// Look up a signal by code.
    #[must_use]
    pub fn get(&self, code: i32) -> Option<&Signal>
    {
        self.by_code.get(&code)
    }

    /// Whether a code is known to this catalog.
    #[must_use]
    pub fn contains(&self, code: i32) -> bool
    {
        self.by_code.contains_key(&code)
    }

    /// Look up a signal by canonical name or alias.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Signal>
    {
        self.by_code
            .values()
            .find(|signal| signal.name == name || signal.aliases.contains(&name))
    }

    /// Iterate over all signals in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = &Signal>
    {
        self.by_code.values()
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        self.by_code.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.by_code.is_empty()
    }
}

impl<'a> IntoIterator for &'a SignalCatalog
{
    type Item = &'a Signal;
    type IntoIter = std::collections::btree_map::Values<'a, i32, Signal>;

    fn into_iter(self) -> Self::IntoIter
    {
        self.by_code.values()
    }
}

/// Default stop dispositions for the Linux signal table.
///
/// The real-time range carries the backend's `SIGTMIN`/`SIGTMAX` spelling
/// so names round-trip with what the backend reports.
const DEFAULT_SIGNALS: &[Signal] = &[
    Signal::new(1, "SIGHUP", true),
    Signal::new(2, "SIGINT", true),
    Signal::new(3, "SIGQUIT", true),
    Signal::new(4, "SIGILL", true),
    Signal::new(5, "SIGTRAP", true),
    Signal::with_aliases(6, "SIGABRT", true, &["SIGIOT"]),
    Signal::new(7, "SIGBUS", true),
    Signal::new(8, "SIGFPE", true),
    Signal::new(9, "SIGKILL", true),
    Signal::new(10, "SIGUSR1", true),
    Signal::new(11, "SIGSEGV", true),
    Signal::new(12, "SIGUSR2", true),
    Signal::new(13, "SIGPIPE", false),
    Signal::new(14, "SIGALRM", false),
    Signal::new(15, "SIGTERM", true),
    Signal::new(16, "SIGSTKFLT", true),
    Signal::with_aliases(17, "SIGCHLD", false, &["SIGCLD"]),
    Signal::new(18, "SIGCONT", true),
    Signal::new(19, "SIGSTOP", true),
    Signal::new(20, "SIGSTP", true),
    Signal::new(21, "SIGTTIN", true),
    Signal::new(22, "SIGTTOU", true),
    Signal::new(23, "SIGURG", true),
    Signal::new(24, "SIGXCPU", true),
    Signal::new(25, "SIGXFSZ", true),
    Signal::new(26, "SIGVTALRM", true),
    Signal::new(27, "SIGPROF", false),
    Signal::new(28, "SIGWINCH", true),
    Signal::with_aliases(29, "SIGIO", true, &["SIGPOLL"]),
    Signal::new(30, "SIGPWR", true),
    Signal::new(31, "SIGSYS", true),
    Signal::new(32, "SIG32", false),
    Signal::new(33, "SIG33", false),
    Signal::new(34, "SIGTMIN", false),
    Signal::new(35, "SIGTMIN+1", false),
    Signal::new(36, "SIGTMIN+2", false),
    Signal::new(37, "SIGTMIN+3", false),
    Signal::new(38, "SIGTMIN+4", false),
    Signal::new(39, "SIGTMIN+5", false),
    Signal::new(40, "SIGTMIN+6", false),
    Signal::new(41, "SIGTMIN+7", false),
    Signal::new(42, "SIGTMIN+8", false),
    Signal::new(43, "SIGTMIN+9", false),
    Signal::new(44, "SIGTMIN+10", false),
    Signal::new(45, "SIGTMIN+11", false),
    Signal::new(46, "SIGTMIN+12", false),
    Signal::new(47, "SIGTMIN+13", false),
    Signal::new(48, "SIGTMIN+14", false),
    Signal::new(49, "SIGTMIN+15", false),
    Signal::new(50, "SIGTMAX-14", false),
    Signal::new(51, "SIGTMAX-13", false),
    Signal::new(52, "SIGTMAX-12", false),
    Signal::new(53, "SIGTMAX-11", false),
    Signal::new(54, "SIGTMAX-10", false),
    Signal::new(55, "SIGTMAX-9", false),
    Signal::new(56, "SIGTMAX-8", false),
    Signal::new(57, "SIGTMAX-7", false),
    Signal::new(58, "SIGTMAX-6", false),
    Signal::new(59, "SIGTMAX-5", false),
    Signal::new(60, "SIGTMAX-4", false),
    Signal::new(61, "SIGTMAX-3", false),
    Signal::new(62, "SIGTMAX-2", false),
    Signal::new(63, "SIGTMAX-1", false),
    Signal::new(64, "SIGTMAX", false),
];

static DEFAULT_CATALOG: Lazy<SignalCatalog> = Lazy::new(|| {
    SignalCatalog::new(DEFAULT_SIGNALS.iter().cloned()).expect("default signal table has unique codes")
});

/// The built-in Linux default catalog.
#[must_use]
pub fn default_catalog() -> &'static SignalCatalog
{
    &DEFAULT_CATALOG
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_default_catalog_has_full_signal_range()
    {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 64);
        assert!(catalog.contains(1));
        assert!(catalog.contains(64));
        assert!(!catalog.contains(0));
        assert!(!catalog.contains(65));
    }

    #[test]
    fn test_default_dispositions()
    {
        let catalog = default_catalog();
        assert!(catalog.get(5).unwrap().stop, "SIGTRAP stops by default");
        assert!(catalog.get(11).unwrap().stop, "SIGSEGV stops by default");
        assert!(!catalog.get(13).unwrap().stop, "SIGPIPE continues by default");
        assert!(!catalog.get(17).unwrap().stop, "SIGCHLD continues by default");
    }

    #[test]
    fn test_alias_lookup()
    {
        let catalog = default_catalog();
        assert_eq!(catalog.get_by_name("SIGIOT").unwrap().code, 6);
        assert_eq!(catalog.get_by_name("SIGCLD").unwrap().code, 17);
        assert_eq!(catalog.get_by_name("SIGPOLL").unwrap().code, 29);
        assert!(catalog.get_by_name("SIGNOPE").is_none());
    }

    #[test]
    fn test_iteration_is_ordered_by_code()
    {
        let catalog = SignalCatalog::new([
            Signal::new(9, "SIGKILL", true),
            Signal::new(2, "SIGINT", true),
            Signal::new(5, "SIGTRAP", true),
        ])
        .unwrap();
        let codes: Vec<i32> = catalog.iter().map(|s| s.code).collect();
        assert_eq!(codes, vec![2, 5, 9]);
    }

    #[test]
    fn test_duplicate_code_is_rejected()
    {
        let result = SignalCatalog::new([Signal::new(2, "SIGINT", true), Signal::new(2, "SIGINT2", false)]);
        assert!(matches!(result, Err(EngineError::DuplicateSignal(2))));
    }
}
