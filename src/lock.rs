#[cfg(feature = "std")]
use std::sync as impl_;

#[cfg(not(feature = "std"))]
use spin as impl_;

/// RwLock over shared renderer state.
///
/// Uses `std::sync::RwLock` when the `std` feature is enabled and
/// `spin::RwLock` otherwise. Poisoning is treated as a bug in the caller's
/// strategy code; the guards unwrap it.
pub(crate) struct StateLock<T>(impl_::RwLock<T>);

pub(crate) struct StateLockReadGuard<'a, T>(impl_::RwLockReadGuard<'a, T>);
pub(crate) struct StateLockWriteGuard<'a, T>(impl_::RwLockWriteGuard<'a, T>);

impl<T> StateLock<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self(impl_::RwLock::new(value))
    }

    pub(crate) fn read(&self) -> StateLockReadGuard<'_, T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.read();

        #[cfg(feature = "std")]
        let guard = self.0.read().expect("renderer state lock poisoned");

        StateLockReadGuard(guard)
    }

    pub(crate) fn write(&self) -> StateLockWriteGuard<'_, T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.write();

        #[cfg(feature = "std")]
        let guard = self.0.write().expect("renderer state lock poisoned");

        StateLockWriteGuard(guard)
    }
}

impl<T> core::ops::Deref for StateLockReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> core::ops::Deref for StateLockWriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> core::ops::DerefMut for StateLockWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

#[cfg(feature = "std")]
type OnceImpl = std::sync::Once;

#[cfg(not(feature = "std"))]
type OnceImpl = spin::Once<()>;

/// One-time initialization gate for the default renderer's built-in
/// registrations.
pub(crate) struct InitOnce(OnceImpl);

impl InitOnce {
    pub(crate) const fn new() -> Self {
        Self(OnceImpl::new())
    }

    pub(crate) fn call_once(&self, init: impl FnOnce()) {
        #[cfg(feature = "std")]
        self.0.call_once(init);

        #[cfg(not(feature = "std"))]
        self.0.call_once(|| init());
    }
}
