//! The strategy registry: exact-type registration with hierarchy-aware,
//! memoized resolution.

use core::any::TypeId;

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;
use triomphe::Arc;
use unsize::CoerceUnsize;

use crate::{lock::StateLock, strategy::Strategy, value::Lineage};

type StrategyMap = HashMap<TypeId, Arc<dyn Strategy>, FxBuildHasher>;
type ResolutionCache = HashMap<TypeId, Option<Resolution>, FxBuildHasher>;

/// A resolved strategy together with the type it was registered under.
///
/// The registration type keys suppression for registered strategies, so a
/// type that resolves to an ancestor's registration shares the ancestor's
/// suppression state.
#[derive(Clone)]
pub(crate) struct Resolution {
    pub(crate) registered_under: TypeId,
    pub(crate) strategy: Arc<dyn Strategy>,
}

pub(crate) struct Registry {
    inner: StateLock<RegistryInner>,
}

struct RegistryInner {
    strategies: StrategyMap,
    /// Memoized walk results keyed by exact head type, including negative
    /// results. Invalidated wholesale on registration: a derived type that
    /// previously resolved to an ancestor must re-resolve once a more
    /// specific strategy exists.
    cache: ResolutionCache,
}

impl Registry {
    pub(crate) const fn new() -> Self {
        Self {
            inner: StateLock::new(RegistryInner {
                strategies: HashMap::with_hasher(FxBuildHasher),
                cache: HashMap::with_hasher(FxBuildHasher),
            }),
        }
    }

    /// Installs or replaces the strategy for exactly `T`.
    pub(crate) fn register<T: 'static + ?Sized>(&self, strategy: impl Strategy) {
        let strategy = Arc::new(strategy).unsize(unsize::Coercion!(to dyn Strategy));
        let mut inner = self.inner.write();
        inner.strategies.insert(TypeId::of::<T>(), strategy);
        inner.cache.clear();
    }

    /// The strategy registered for exactly this type, without walking the
    /// lineage.
    pub(crate) fn registered(&self, type_id: TypeId) -> Option<Arc<dyn Strategy>> {
        self.inner.read().strategies.get(&type_id).cloned()
    }

    /// Walks the lineage, most derived first, and returns the first
    /// registered strategy. `None` means the caller should use the
    /// fallback; resolution itself cannot fail.
    pub(crate) fn resolve(&self, lineage: &Lineage) -> Option<Resolution> {
        let head = lineage.head().id;
        {
            let inner = self.inner.read();
            if let Some(cached) = inner.cache.get(&head) {
                return cached.clone();
            }
        }
        let resolution = {
            let inner = self.inner.read();
            lineage.kinds().find_map(|kind| {
                inner.strategies.get(&kind.id).map(|strategy| Resolution {
                    registered_under: kind.id,
                    strategy: strategy.clone(),
                })
            })
        };
        self.inner.write().cache.insert(head, resolution.clone());
        resolution
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;
    use crate::{context::Helper, value::Value};

    struct Labeled(&'static str);

    impl Strategy for Labeled {
        fn render(&self, _value: &dyn Value, _helper: &mut Helper<'_>) -> String {
            self.0.into()
        }
    }

    struct Base;
    struct Derived;
    struct Unrelated;

    fn derived_lineage() -> Lineage {
        Lineage::of::<Derived>().base::<Base>()
    }

    #[test]
    fn test_resolution_walks_lineage() {
        let registry = Registry::new();
        registry.register::<Base>(Labeled("base"));

        let resolution = registry.resolve(&derived_lineage()).unwrap();
        assert_eq!(resolution.registered_under, TypeId::of::<Base>());
        assert!(registry.resolve(&Lineage::of::<Unrelated>()).is_none());
    }

    #[test]
    fn test_registration_invalidates_cached_resolutions() {
        let registry = Registry::new();
        registry.register::<Base>(Labeled("base"));

        // Prime the cache through the ancestor.
        let before = registry.resolve(&derived_lineage()).unwrap();
        assert_eq!(before.registered_under, TypeId::of::<Base>());

        // A more specific registration must win on the next resolve.
        registry.register::<Derived>(Labeled("derived"));
        let after = registry.resolve(&derived_lineage()).unwrap();
        assert_eq!(after.registered_under, TypeId::of::<Derived>());
    }

    #[test]
    fn test_exact_lookup_does_not_walk() {
        let registry = Registry::new();
        registry.register::<Base>(Labeled("base"));
        assert!(registry.registered(TypeId::of::<Base>()).is_some());
        assert!(registry.registered(TypeId::of::<Derived>()).is_none());
    }
}
