//! The renderer: registry, suppression ledger, recursion tunables, and the
//! public entry points.
//!
//! A [`Renderer`] is the single explicit process-wide context object - there
//! is no hidden ambient state beyond the crate's default instance, and tests
//! can build isolated renderers freely. The crate-level free functions
//! ([`render`], [`register`], …) all delegate to the default instance, which
//! installs the built-in container registrations once on first use.

use alloc::string::String;
use core::{
    any::TypeId,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;
use triomphe::Arc;

use crate::{
    context::{Context, Entered, Helper},
    kinds,
    lock::{InitOnce, StateLock},
    registry::{Registry, Resolution},
    strategy::{
        FnStrategy, Strategy,
        containers::{MappingStrategy, MultisetStrategy, SequenceStrategy, TaggedSequenceStrategy},
        fallback::{FallbackStrategy, RoutineKey, SuppressionKind, suppressed_placeholder},
        text::TextStrategy,
    },
    value::Value,
};

const DEFAULT_REPEAT_LIMIT: usize = 3;
const DEFAULT_MAX_DEPTH: usize = 3;

type SuppressionMap = HashMap<RoutineKey, SuppressionKind, FxBuildHasher>;

/// The rendering engine: strategy registry, suppression ledger, fallback,
/// and recursion tunables.
///
/// [`Renderer::new`] starts with the built-in container strategies
/// registered; [`Renderer::empty`] starts with an empty registry (every
/// value goes through the fallback) and is `const`, which is how the
/// crate-wide default instance is built.
///
/// Rendering through a shared renderer from multiple threads is fine -
/// registration and suppression are lock-guarded, and each call owns its
/// recursion state.
///
/// ```
/// use glimpse::Renderer;
///
/// let renderer = Renderer::new();
/// assert_eq!(renderer.render(&(1i64, 2i64)), "(1, 2)");
/// ```
pub struct Renderer {
    registry: Registry,
    suppressions: StateLock<SuppressionMap>,
    fallback: FallbackStrategy,
    raise_exceptions: AtomicBool,
    repeat_limit: AtomicUsize,
    max_depth: AtomicUsize,
    setup: InitOnce,
}

impl Renderer {
    /// A renderer with an empty registry and an empty suppression ledger.
    ///
    /// Without registrations every value renders through the fallback.
    /// Useful for isolated tests and as the const initializer of the
    /// default instance.
    pub const fn empty() -> Self {
        Self {
            registry: Registry::new(),
            suppressions: StateLock::new(HashMap::with_hasher(FxBuildHasher)),
            fallback: FallbackStrategy::new(),
            raise_exceptions: AtomicBool::new(false),
            repeat_limit: AtomicUsize::new(DEFAULT_REPEAT_LIMIT),
            max_depth: AtomicUsize::new(DEFAULT_MAX_DEPTH),
            setup: InitOnce::new(),
        }
    }

    /// A renderer with the built-in container strategies registered.
    pub fn new() -> Self {
        let renderer = Self::empty();
        renderer.install_builtins();
        renderer
    }

    /// Registers the built-in strategies for the ancestor tokens in
    /// [`crate::kinds`]. Idempotent; does not disturb existing custom
    /// registrations when called again.
    pub fn install_builtins(&self) {
        self.setup.call_once(|| {
            self.registry.register::<kinds::Sequence>(SequenceStrategy::list());
            self.registry.register::<kinds::Tuple>(SequenceStrategy::tuple());
            self.registry.register::<kinds::Set>(SequenceStrategy::set());
            self.registry.register::<kinds::Mapping>(MappingStrategy::new(4));
            self.registry
                .register::<kinds::MappingView>(TaggedSequenceStrategy::new(6));
            self.registry
                .register::<kinds::TaggedSequence>(TaggedSequenceStrategy::new(6));
            self.registry
                .register::<kinds::TypedBuffer>(TaggedSequenceStrategy::new(5));
            self.registry
                .register::<kinds::LayeredMap>(TaggedSequenceStrategy::new(6));
            self.registry.register::<kinds::Text>(TextStrategy::new());
            self.registry.register::<kinds::Bytes>(TextStrategy::new());
            self.registry.register::<kinds::Multiset>(MultisetStrategy::new(3));
        });
    }

    /// Renders `value` into its bounded textual form.
    ///
    /// Never panics unless [`set_raise_exceptions`](Self::set_raise_exceptions)
    /// is on or the resolved strategy is marked to always propagate.
    pub fn render(&self, value: &dyn Value) -> String {
        let mut context = Context::new();
        self.render_with(value, &mut context)
    }

    pub(crate) fn render_with(&self, value: &dyn Value, context: &mut Context) -> String {
        let resolution = self.registry.resolve(&value.lineage());

        // Depth bound: strategies that recurse advertise a collapsed form
        // and stop here; scalar strategies render at any depth.
        if context.depth() >= self.max_depth() {
            let collapsed = resolution
                .as_ref()
                .and_then(|resolution| resolution.strategy.placeholder(value));
            if let Some(collapsed) = collapsed {
                return collapsed;
            }
        }

        let identity = value.identity();
        match context.enter(identity, self.repeat_limit()) {
            Entered::Blocked => resolution
                .as_ref()
                .and_then(|resolution| resolution.strategy.placeholder(value))
                .unwrap_or_else(|| String::from("...")),
            entered => {
                let rendered = match &resolution {
                    Some(resolution) => self.invoke_registered(resolution, value, context),
                    None => {
                        let mut helper = Helper::new(self, context);
                        self.fallback.render(value, &mut helper)
                    }
                };
                context.leave(identity, entered);
                rendered
            }
        }
    }

    #[cfg(feature = "std")]
    fn invoke_registered(
        &self,
        resolution: &Resolution,
        value: &dyn Value,
        context: &mut Context,
    ) -> String {
        use crate::strategy::fallback::panic_message;

        let key = RoutineKey::Strategy(resolution.registered_under);
        if let Some(kind) = self.suppression(key) {
            return suppressed_placeholder(value.type_label(), value.identity(), kind);
        }

        let mark = context.mark();
        let outcome = std::panic::catch_unwind(core::panic::AssertUnwindSafe(|| {
            let mut helper = Helper::new(self, context);
            resolution.strategy.render(value, &mut helper)
        }));
        match outcome {
            Ok(rendered) => rendered,
            Err(payload) => {
                if self.raise_exceptions() || resolution.strategy.raise_exceptions() {
                    std::panic::resume_unwind(payload);
                }
                context.rewind(mark);
                if self.record_suppression(key, SuppressionKind::Failed) {
                    log::warn!(
                        "strategy for `{}` panicked: {}; it has been suppressed",
                        value.type_label(),
                        panic_message(&*payload),
                    );
                }
                suppressed_placeholder(value.type_label(), value.identity(), SuppressionKind::Failed)
            }
        }
    }

    #[cfg(not(feature = "std"))]
    fn invoke_registered(
        &self,
        resolution: &Resolution,
        value: &dyn Value,
        context: &mut Context,
    ) -> String {
        let key = RoutineKey::Strategy(resolution.registered_under);
        if let Some(kind) = self.suppression(key) {
            return suppressed_placeholder(value.type_label(), value.identity(), kind);
        }
        let mut helper = Helper::new(self, context);
        resolution.strategy.render(value, &mut helper)
    }

    /// Installs or replaces the strategy registered for exactly `T`, and
    /// invalidates affected cached resolutions.
    pub fn register<T: 'static + ?Sized>(&self, strategy: impl Strategy) {
        self.registry.register::<T>(strategy);
    }

    /// Registers a rendering closure for `T`. The closure receives the
    /// value and a [`Helper`] bound to the active render context.
    pub fn register_fn<T: 'static + ?Sized>(
        &self,
        render_fn: impl Fn(&dyn Value, &mut Helper<'_>) -> String + Send + Sync + 'static,
    ) {
        self.register::<T>(FnStrategy::new(render_fn));
    }

    /// Hierarchy-aware resolution without the fallback default: the
    /// strategy `value` would render with, or `None` if it would use the
    /// fallback.
    pub fn find_strategy(&self, value: &dyn Value) -> Option<Arc<dyn Strategy>> {
        self.registry
            .resolve(&value.lineage())
            .map(|resolution| resolution.strategy)
    }

    /// The strategy registered for exactly `T`, without walking any
    /// lineage.
    pub fn registered_strategy<T: 'static + ?Sized>(&self) -> Option<Arc<dyn Strategy>> {
        self.registry.registered(TypeId::of::<T>())
    }

    /// The fallback strategy and its tunables (suppression threshold,
    /// truncation ceiling, propagation flag).
    pub fn fallback(&self) -> &FallbackStrategy {
        &self.fallback
    }

    /// Diagnostic override: when on, failures inside native routines and
    /// strategies propagate verbatim to the caller instead of being
    /// contained and suppressed.
    pub fn set_raise_exceptions(&self, raise: bool) {
        self.raise_exceptions.store(raise, Ordering::Relaxed);
    }

    /// Whether the diagnostic override is on.
    pub fn raise_exceptions(&self) -> bool {
        self.raise_exceptions.load(Ordering::Relaxed)
    }

    /// How many times one identity may repeat on the render stack before
    /// collapsing to a placeholder (default 3).
    pub fn repeat_limit(&self) -> usize {
        self.repeat_limit.load(Ordering::Relaxed)
    }

    /// Adjusts the repeat limit at runtime.
    pub fn set_repeat_limit(&self, limit: usize) {
        self.repeat_limit.store(limit, Ordering::Relaxed);
    }

    /// Nesting depth beyond which container strategies collapse to their
    /// placeholder (default 3).
    pub fn max_depth(&self) -> usize {
        self.max_depth.load(Ordering::Relaxed)
    }

    /// Adjusts the depth bound at runtime.
    pub fn set_max_depth(&self, depth: usize) {
        self.max_depth.store(depth, Ordering::Relaxed);
    }

    /// Forgets every suppression decision, so previously suppressed
    /// routines are invoked again on their next render.
    pub fn reset_suppressions(&self) {
        self.suppressions.write().clear();
    }

    pub(crate) fn suppression(&self, key: RoutineKey) -> Option<SuppressionKind> {
        self.suppressions.read().get(&key).copied()
    }

    /// Records a suppression decision. Returns `true` the first time the
    /// routine transitions, which gates the one-time warning.
    pub(crate) fn record_suppression(&self, key: RoutineKey, kind: SuppressionKind) -> bool {
        match self.suppressions.write().entry(key) {
            hashbrown::hash_map::Entry::Occupied(_) => false,
            hashbrown::hash_map::Entry::Vacant(entry) => {
                entry.insert(kind);
                true
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_RENDERER: Renderer = Renderer::empty();

/// The crate-wide default renderer, with built-ins installed.
///
/// The free functions below all operate on this instance.
pub fn default_renderer() -> &'static Renderer {
    DEFAULT_RENDERER.install_builtins();
    &DEFAULT_RENDERER
}

/// Renders `value` into its bounded textual form using the default
/// renderer.
///
/// This is the sole primary entry point: it never panics (unless the
/// diagnostic override is on or a strategy is marked to always propagate),
/// never blocks indefinitely, and never produces output beyond the
/// configured bounds - even when the value's own representation routine is
/// slow, unbounded, or faulty.
///
/// ```
/// assert_eq!(glimpse::render(&vec![1, 2, 3]), "[1, 2, 3]");
///
/// let long: Vec<i64> = (0..20).collect();
/// assert_eq!(glimpse::render(&long), "[0, 1, 2, 3, 4, 5, ...]");
/// ```
pub fn render(value: &dyn Value) -> String {
    default_renderer().render(value)
}

/// Installs or replaces the strategy for exactly `T` on the default
/// renderer.
pub fn register<T: 'static + ?Sized>(strategy: impl Strategy) {
    default_renderer().register::<T>(strategy);
}

/// Registers a rendering closure for `T` on the default renderer.
///
/// ```
/// use glimpse::{Lineage, Value};
///
/// struct Opaque;
///
/// impl Value for Opaque {
///     fn lineage(&self) -> Lineage {
///         Lineage::of::<Self>()
///     }
/// }
///
/// glimpse::register_fn::<Opaque>(|_, _| "<opaque>".into());
/// assert_eq!(glimpse::render(&Opaque), "<opaque>");
/// ```
pub fn register_fn<T: 'static + ?Sized>(
    render_fn: impl Fn(&dyn Value, &mut Helper<'_>) -> String + Send + Sync + 'static,
) {
    default_renderer().register_fn::<T>(render_fn);
}

/// Hierarchy-aware resolution on the default renderer, without the
/// fallback default.
pub fn find_strategy(value: &dyn Value) -> Option<Arc<dyn Strategy>> {
    default_renderer().find_strategy(value)
}

/// Toggles the diagnostic override on the default renderer.
pub fn set_raise_exceptions(raise: bool) {
    default_renderer().set_raise_exceptions(raise);
}

/// Forgets every suppression decision on the default renderer.
pub fn reset_suppressions() {
    default_renderer().reset_suppressions();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Lineage;

    #[test]
    fn test_derived_type_resolves_to_ancestors_strategy() {
        struct Base;
        struct Derived;

        impl Value for Base {
            fn lineage(&self) -> Lineage {
                Lineage::of::<Self>()
            }
        }

        impl Value for Derived {
            fn lineage(&self) -> Lineage {
                Lineage::of::<Self>().base::<Base>()
            }
        }

        let renderer = Renderer::new();
        renderer.register_fn::<Base>(|_, _| "base".into());

        let base = renderer.find_strategy(&Base).unwrap();
        let derived = renderer.find_strategy(&Derived).unwrap();
        assert!(Arc::ptr_eq(&base, &derived));
    }

    #[test]
    fn test_renderer_send_sync() {
        static_assertions::assert_impl_all!(Renderer: Send, Sync);
        static_assertions::assert_impl_all!(FallbackStrategy: Send, Sync);
        static_assertions::assert_impl_all!(Arc<dyn Strategy>: Send, Sync);
    }

    #[test]
    fn test_empty_renderer_has_no_registrations() {
        let renderer = Renderer::empty();
        assert!(renderer.find_strategy(&5i64).is_none());
        assert!(renderer.find_strategy(&alloc::vec![1i64]).is_none());
        // Everything renders through the fallback's native path.
        assert_eq!(renderer.render(&5i64), "5");
    }

    #[test]
    fn test_builtin_install_is_idempotent() {
        let renderer = Renderer::new();
        renderer.register_fn::<i64>(|_, _| "custom".into());
        renderer.install_builtins();
        assert_eq!(renderer.render(&5i64), "custom");
    }
}
