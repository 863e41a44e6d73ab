//! Rendering strategies: the polymorphic units that turn one value into a
//! bounded piece of text.
//!
//! Three families exist, matching the registry's data model:
//!
//! - **Custom** strategies, registered by the caller ([`FnStrategy`] or any
//!   other [`Strategy`] implementation).
//! - The **fallback** strategy ([`fallback::FallbackStrategy`]), used for
//!   every type without a registration; it wraps the value's own native
//!   representation routine with containment and truncation.
//! - The **container** family ([`containers`], [`text`]), registered for
//!   the ancestor tokens in [`crate::kinds`] and bounded per strategy by
//!   `maxparts`.

pub mod containers;
pub mod fallback;
pub mod text;

use alloc::{boxed::Box, string::String};
use core::sync::atomic::{AtomicBool, Ordering};

use crate::{context::Helper, value::Value};

/// A unit of rendering logic.
///
/// Strategies are shared process-wide once registered, so tunables are
/// interior-mutable and implementations must be `Send + Sync`. A strategy
/// renders nested elements through the [`Helper`] it receives, which keeps
/// recursion tracking and suppression working across nesting levels.
pub trait Strategy: Send + Sync + 'static {
    /// Renders `value` into its bounded textual form.
    fn render(&self, value: &dyn Value, helper: &mut Helper<'_>) -> String;

    /// The collapsed form substituted when the recursion guard refuses to
    /// re-enter this strategy for `value` (for example `[...]` for a list).
    ///
    /// `None` - the default - marks a strategy that never recurses; such
    /// strategies are never collapsed by the depth bound.
    fn placeholder(&self, value: &dyn Value) -> Option<String> {
        let _ = value;
        None
    }

    /// The current element budget, if this strategy truncates by elements
    /// (or by characters, for text-shaped strategies).
    fn max_parts(&self) -> Option<usize> {
        None
    }

    /// Adjusts the element budget at runtime. A no-op for strategies
    /// without one.
    fn set_max_parts(&self, parts: usize) {
        let _ = parts;
    }

    /// Whether failures inside this strategy should propagate to the caller
    /// instead of being contained and suppressed.
    fn raise_exceptions(&self) -> bool {
        false
    }
}

/// A custom strategy wrapping a rendering closure.
///
/// The closure receives the value and a [`Helper`] bound to the active
/// render context, so nested elements can be rendered safely:
///
/// ```
/// use glimpse::{FnStrategy, Renderer};
///
/// let renderer = Renderer::new();
/// renderer.register::<i64>(FnStrategy::new(|_, _| "<int>".into()));
/// assert_eq!(renderer.render(&vec![1i64, 2]), "[<int>, <int>]");
/// ```
pub struct FnStrategy {
    render_fn: Box<dyn Fn(&dyn Value, &mut Helper<'_>) -> String + Send + Sync>,
    raise: AtomicBool,
}

impl FnStrategy {
    /// Wraps `render_fn` as a registrable strategy.
    pub fn new(
        render_fn: impl Fn(&dyn Value, &mut Helper<'_>) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            render_fn: Box::new(render_fn),
            raise: AtomicBool::new(false),
        }
    }

    /// Marks this strategy to always propagate failures instead of having
    /// them contained and suppressed.
    pub fn set_raise_exceptions(&self, raise: bool) {
        self.raise.store(raise, Ordering::Relaxed);
    }
}

impl Strategy for FnStrategy {
    fn render(&self, value: &dyn Value, helper: &mut Helper<'_>) -> String {
        (self.render_fn)(value, helper)
    }

    fn raise_exceptions(&self) -> bool {
        self.raise.load(Ordering::Relaxed)
    }
}
