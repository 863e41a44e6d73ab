//! The fallback strategy: bounded, contained invocation of a value's own
//! native representation routine.
//!
//! Any type without a registered strategy ends up here. The native routine
//! is treated as untrusted: it runs inside a guarded region, its output is
//! measured against a length ceiling, and the first failure of either kind
//! permanently suppresses the routine for the rest of the process (until
//! explicitly reset). Suppressed routines are never invoked again - the
//! placeholder is produced without touching the value.

use alloc::{format, string::String};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::{
    context::Helper,
    strategy::Strategy,
    util::truncate_chars,
    value::{Identity, ReprError, RoutineId, Value},
};

/// Which failure kind put a routine on the suppression ledger.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SuppressionKind {
    /// The routine's output exceeded the length ceiling.
    TooLong,
    /// The routine returned an error or panicked.
    Failed,
}

/// Key into the suppression ledger.
///
/// Native routines are keyed by [`RoutineId`], so a wrapper type that
/// delegates its routine to an inner value shares the inner routine's
/// suppression. Registered strategies are keyed by the type they were
/// registered under, so a type resolving to an ancestor's registration
/// shares the ancestor's suppression.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum RoutineKey {
    /// A native representation routine.
    Native(RoutineId),
    /// A registered strategy, keyed by its registration type.
    Strategy(core::any::TypeId),
}

pub(crate) fn suppressed_placeholder(
    label: &str,
    identity: Identity,
    kind: SuppressionKind,
) -> String {
    let marker = match kind {
        SuppressionKind::TooLong => "repr suppressed",
        SuppressionKind::Failed => "exception in repr",
    };
    format!("<{label} instance at {identity} ({marker})>")
}

enum NativeOutcome {
    Text(String),
    Failed(ReprError),
    #[cfg(feature = "std")]
    Panicked(alloc::boxed::Box<dyn core::any::Any + Send>),
}

fn invoke_native(value: &dyn Value) -> NativeOutcome {
    #[cfg(feature = "std")]
    {
        match std::panic::catch_unwind(core::panic::AssertUnwindSafe(|| value.native_repr())) {
            Ok(Ok(text)) => NativeOutcome::Text(text),
            Ok(Err(error)) => NativeOutcome::Failed(error),
            Err(payload) => NativeOutcome::Panicked(payload),
        }
    }
    #[cfg(not(feature = "std"))]
    {
        match value.native_repr() {
            Ok(text) => NativeOutcome::Text(text),
            Err(error) => NativeOutcome::Failed(error),
        }
    }
}

#[cfg(feature = "std")]
pub(crate) fn panic_message(payload: &dyn core::any::Any) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "opaque panic payload"
    }
}

/// The strategy used for every type without an explicit registration.
///
/// Wraps [`Value::native_repr`] with failure containment and the length
/// ceiling. Both thresholds are runtime-tunable:
///
/// - [`suppression_threshold`](Self::suppression_threshold) - output length
///   beyond which a routine is suppressed (default 300 characters);
/// - [`truncation_ceiling`](Self::truncation_ceiling) - size of the
///   truncated form returned on first over-length failure (default 60
///   characters, split as prefix + `...` + suffix).
pub struct FallbackStrategy {
    suppression_threshold: AtomicUsize,
    truncation_ceiling: AtomicUsize,
    raise: AtomicBool,
}

impl FallbackStrategy {
    const DEFAULT_SUPPRESSION_THRESHOLD: usize = 300;
    const DEFAULT_TRUNCATION_CEILING: usize = 60;

    pub(crate) const fn new() -> Self {
        Self {
            suppression_threshold: AtomicUsize::new(Self::DEFAULT_SUPPRESSION_THRESHOLD),
            truncation_ceiling: AtomicUsize::new(Self::DEFAULT_TRUNCATION_CEILING),
            raise: AtomicBool::new(false),
        }
    }

    /// Output length beyond which a native routine is suppressed.
    pub fn suppression_threshold(&self) -> usize {
        self.suppression_threshold.load(Ordering::Relaxed)
    }

    /// Adjusts the suppression threshold at runtime.
    pub fn set_suppression_threshold(&self, threshold: usize) {
        self.suppression_threshold
            .store(threshold, Ordering::Relaxed);
    }

    /// Character budget of the truncated form returned when a routine first
    /// exceeds the threshold.
    pub fn truncation_ceiling(&self) -> usize {
        self.truncation_ceiling.load(Ordering::Relaxed)
    }

    /// Adjusts the truncation ceiling at runtime.
    pub fn set_truncation_ceiling(&self, ceiling: usize) {
        self.truncation_ceiling.store(ceiling, Ordering::Relaxed);
    }

    /// Makes native representation failures propagate to the caller instead
    /// of being contained and suppressed, for all types that use the
    /// fallback. Narrower than the renderer-wide override.
    pub fn set_raise_exceptions(&self, raise: bool) {
        self.raise.store(raise, Ordering::Relaxed);
    }
}

impl Strategy for FallbackStrategy {
    fn render(&self, value: &dyn Value, helper: &mut Helper<'_>) -> String {
        let renderer = helper.renderer();
        let key = RoutineKey::Native(value.repr_routine());
        if let Some(kind) = renderer.suppression(key) {
            return suppressed_placeholder(value.type_label(), value.identity(), kind);
        }

        let raise = renderer.raise_exceptions() || self.raise_exceptions();
        match invoke_native(value) {
            NativeOutcome::Text(text) => {
                let threshold = self.suppression_threshold();
                let length = text.chars().count();
                if length <= threshold {
                    return text;
                }
                if renderer.record_suppression(key, SuppressionKind::TooLong) {
                    log::warn!(
                        "native repr of `{}` is {} characters long and has been suppressed; \
                         register a strategy for this type or raise the suppression threshold",
                        value.type_label(),
                        length,
                    );
                }
                truncate_chars(&text, self.truncation_ceiling()).into_owned()
            }
            NativeOutcome::Failed(error) => {
                if raise {
                    panic!("native repr of `{}` failed: {error}", value.type_label());
                }
                if renderer.record_suppression(key, SuppressionKind::Failed) {
                    log::warn!(
                        "native repr of `{}` failed: {error}; \
                         the repr has been suppressed for this routine",
                        value.type_label(),
                    );
                }
                suppressed_placeholder(value.type_label(), value.identity(), SuppressionKind::Failed)
            }
            #[cfg(feature = "std")]
            NativeOutcome::Panicked(payload) => {
                if raise {
                    std::panic::resume_unwind(payload);
                }
                if renderer.record_suppression(key, SuppressionKind::Failed) {
                    log::warn!(
                        "native repr of `{}` panicked: {}; \
                         the repr has been suppressed for this routine",
                        value.type_label(),
                        panic_message(&*payload),
                    );
                }
                suppressed_placeholder(value.type_label(), value.identity(), SuppressionKind::Failed)
            }
        }
    }

    fn raise_exceptions(&self) -> bool {
        self.raise.load(Ordering::Relaxed)
    }
}
