//! Rate-limited diagnostics
//!
//! Degenerate-but-tolerated conditions (reading or writing past the end of a
//! buffer, clipping while mixing, saving a non-canonical buffer) never abort
//! an operation. They are reported here instead, and each kind is
//! rate-limited according to its [`DiagnosticPolicy`].
//!
//! A process-wide instance is available through [`Diagnostics::global`];
//! callers that need isolation (tests in particular) create their own.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Kinds of non-fatal diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// `get` past the last frame
    OutOfRangeRead,
    /// `set` past the last frame
    OutOfRangeWrite,
    /// A mixed sample exceeded the 16-bit range
    Clipping,
    /// A buffer failed canonical validation after being saved
    SaveInvariant,
}

impl DiagnosticKind {
    /// All kinds, in counter order
    pub const ALL: [DiagnosticKind; 4] = [
        DiagnosticKind::OutOfRangeRead,
        DiagnosticKind::OutOfRangeWrite,
        DiagnosticKind::Clipping,
        DiagnosticKind::SaveInvariant,
    ];

    fn index(self) -> usize {
        match self {
            DiagnosticKind::OutOfRangeRead => 0,
            DiagnosticKind::OutOfRangeWrite => 1,
            DiagnosticKind::Clipping => 2,
            DiagnosticKind::SaveInvariant => 3,
        }
    }

    /// Short label used in log output
    pub fn label(self) -> &'static str {
        match self {
            DiagnosticKind::OutOfRangeRead => "out_of_range_read",
            DiagnosticKind::OutOfRangeWrite => "out_of_range_write",
            DiagnosticKind::Clipping => "clipping",
            DiagnosticKind::SaveInvariant => "save_invariant",
        }
    }
}

/// How often a diagnostic kind is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticPolicy {
    /// Only the first occurrence since creation or [`Diagnostics::reset`]
    #[default]
    Once,
    /// Every occurrence
    Always,
    /// Counted but never emitted
    Silent,
}

/// Per-kind rate limiter for non-fatal diagnostics
#[derive(Debug)]
pub struct Diagnostics {
    policies: [DiagnosticPolicy; 4],
    occurrences: [AtomicUsize; 4],
    emitted: [AtomicUsize; 4],
}

static GLOBAL: OnceLock<Diagnostics> = OnceLock::new();

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Default policies: everything once, except save-time invariant
    /// violations which are reported on every save.
    pub fn new() -> Self {
        Self::with_policies(
            DiagnosticPolicy::Once,
            DiagnosticPolicy::Once,
            DiagnosticPolicy::Once,
            DiagnosticPolicy::Always,
        )
    }

    /// Create a limiter with an explicit policy for each kind
    pub fn with_policies(
        out_of_range_read: DiagnosticPolicy,
        out_of_range_write: DiagnosticPolicy,
        clipping: DiagnosticPolicy,
        save_invariant: DiagnosticPolicy,
    ) -> Self {
        Self {
            policies: [out_of_range_read, out_of_range_write, clipping, save_invariant],
            occurrences: std::array::from_fn(|_| AtomicUsize::new(0)),
            emitted: std::array::from_fn(|_| AtomicUsize::new(0)),
        }
    }

    /// The process-wide instance used by the convenience accessors
    pub fn global() -> &'static Diagnostics {
        GLOBAL.get_or_init(Diagnostics::new)
    }

    /// Make `diagnostics` the process-wide instance
    ///
    /// Only succeeds before [`global`](Self::global) is first used; returns
    /// false if an instance is already in place.
    pub fn install_global(diagnostics: Diagnostics) -> bool {
        GLOBAL.set(diagnostics).is_ok()
    }

    /// Policy in effect for `kind`
    pub fn policy(&self, kind: DiagnosticKind) -> DiagnosticPolicy {
        self.policies[kind.index()]
    }

    /// Record an occurrence of `kind`.
    ///
    /// `detail` is only evaluated when the diagnostic is actually emitted.
    /// Returns true if it was emitted.
    pub fn report<F>(&self, kind: DiagnosticKind, detail: F) -> bool
    where
        F: FnOnce() -> String,
    {
        let i = kind.index();
        let previous = self.occurrences[i].fetch_add(1, Ordering::Relaxed);

        let emit = match self.policies[i] {
            DiagnosticPolicy::Once => previous == 0,
            DiagnosticPolicy::Always => true,
            DiagnosticPolicy::Silent => false,
        };

        if emit {
            self.emitted[i].fetch_add(1, Ordering::Relaxed);
            warn!(kind = kind.label(), "{}", detail());
        }

        emit
    }

    /// Number of times `kind` was reported
    pub fn occurrences(&self, kind: DiagnosticKind) -> usize {
        self.occurrences[kind.index()].load(Ordering::Relaxed)
    }

    /// Number of times `kind` was actually emitted
    pub fn emitted(&self, kind: DiagnosticKind) -> usize {
        self.emitted[kind.index()].load(Ordering::Relaxed)
    }

    /// Clear all counters, re-arming every `Once` policy
    pub fn reset(&self) {
        for counter in self.occurrences.iter().chain(self.emitted.iter()) {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
