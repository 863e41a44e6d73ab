//! The runtime value model: what a renderable value has to expose.
//!
//! Rendering is driven entirely through the object-safe [`Value`] trait. A
//! value declares its [`Lineage`] (an explicit, linearized ancestor chain
//! used for strategy resolution), an address-based [`Identity`] (used by the
//! recursion guard), a [`RoutineId`] naming its native representation
//! routine (used by the suppression ledger), and structured element access
//! through [`Items`] (used by the built-in container strategies).
//!
//! Implementations for the common `alloc`/`std` containers, scalars, text
//! and byte sequences live in [`impls`](self).

mod impls;

use alloc::{format, string::String, vec, vec::Vec};
use core::any::TypeId;

use crate::util::short_type_name;

/// One entry in a [`Lineage`]: a type identity paired with its display name.
#[derive(Copy, Clone, Debug)]
pub struct Kind {
    /// The type this entry stands for. Either a concrete type or one of the
    /// ancestor tokens in [`crate::kinds`].
    pub id: TypeId,
    /// Short display name (module path and generic arguments stripped).
    pub name: &'static str,
}

impl Kind {
    /// The kind of `T`.
    pub fn of<T: 'static + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_type_name::<T>(),
        }
    }
}

impl PartialEq for Kind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Kind {}

/// A declared, linearized ancestor chain, most derived first.
///
/// Strategy resolution walks this chain and picks the first entry with a
/// registered strategy. The first entry must be the implementing type
/// itself; resolution results are memoized per head type.
///
/// ```
/// use glimpse::{Lineage, kinds};
///
/// struct Playlist;
///
/// let lineage = Lineage::of::<Playlist>().base::<kinds::Sequence>();
/// assert_eq!(lineage.head().name, "Playlist");
/// ```
#[derive(Clone, Debug)]
pub struct Lineage {
    chain: Vec<Kind>,
}

impl Lineage {
    /// Starts a chain at `T` itself.
    pub fn of<T: 'static + ?Sized>() -> Self {
        Self {
            chain: vec![Kind::of::<T>()],
        }
    }

    /// Appends an ancestor to the chain. Ancestors are consulted in the
    /// order they were appended.
    #[must_use]
    pub fn base<T: 'static + ?Sized>(mut self) -> Self {
        self.chain.push(Kind::of::<T>());
        self
    }

    /// The most derived entry - the type itself.
    pub fn head(&self) -> &Kind {
        &self.chain[0]
    }

    /// All entries, most derived first.
    pub fn kinds(&self) -> impl Iterator<Item = &Kind> {
        self.chain.iter()
    }
}

/// Address-based identity of a value, stable for the value's lifetime.
///
/// Used by the recursion guard to detect self-reference and by the fallback
/// placeholders (`<TypeName instance at 0x…>`). Reference-counted wrappers
/// forward this to the shared allocation so every alias of one object
/// reports the same identity.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Identity(usize);

impl Identity {
    /// Identity of the referenced object.
    pub fn of<T: ?Sized>(value: &T) -> Self {
        Self(core::ptr::from_ref(value).cast::<()>() as usize)
    }
}

impl core::fmt::Display for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Identifies a concrete native representation routine.
///
/// The suppression ledger is keyed by routine, not by value type: a wrapper
/// that delegates [`Value::native_repr`] to an inner value should delegate
/// [`Value::repr_routine`] as well, and then shares the inner routine's
/// suppression state.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct RoutineId(TypeId);

impl RoutineId {
    /// The routine owned by type `T`.
    pub fn of<T: 'static + ?Sized>() -> Self {
        Self(TypeId::of::<T>())
    }
}

/// Failure of a value's native representation routine.
///
/// Returned by [`Value::native_repr`] when the routine is defective. The
/// fallback strategy converts this into a stable placeholder unless
/// exception propagation has been switched on.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ReprError {
    message: String,
}

impl ReprError {
    /// A failure carrying the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Borrowed iterator over a container's elements.
pub type ValueIter<'a> = alloc::boxed::Box<dyn Iterator<Item = &'a dyn Value> + 'a>;

/// Borrowed iterator over a mapping's entries.
pub type PairIter<'a> = alloc::boxed::Box<dyn Iterator<Item = (&'a dyn Value, &'a dyn Value)> + 'a>;

/// Structured element access for the built-in container strategies.
///
/// A strategy only ever materializes as many elements as it needs (one more
/// than its `maxparts`), so these iterators may be arbitrarily long.
pub enum Items<'a> {
    /// No visible structure; only the native routine applies.
    Opaque,
    /// Ordered elements (lists, tuples, sets, views, layers).
    Sequence(ValueIter<'a>),
    /// Key/value entries (mappings, multisets).
    Pairs(PairIter<'a>),
    /// A text sequence, truncated by character count rather than elements.
    Text(&'a str),
    /// A byte sequence, truncated by byte count rather than elements.
    Bytes(&'a [u8]),
}

/// A runtime value that can be rendered.
///
/// Every method has a sensible default except [`lineage`](Self::lineage);
/// a minimal scalar-like implementation is a single line, and the default
/// [`native_repr`](Self::native_repr) produces the basic
/// `<TypeName instance at 0x…>` form.
///
/// ```
/// use glimpse::{Lineage, ReprError, Value};
///
/// struct UserId(u64);
///
/// impl Value for UserId {
///     fn lineage(&self) -> Lineage {
///         Lineage::of::<Self>()
///     }
///
///     fn native_repr(&self) -> Result<String, ReprError> {
///         Ok(format!("UserId({})", self.0))
///     }
/// }
///
/// assert_eq!(glimpse::render(&UserId(7)), "UserId(7)");
/// ```
pub trait Value: 'static {
    /// The declared ancestor chain, most derived first. The first entry
    /// must be the implementing type itself.
    fn lineage(&self) -> Lineage;

    /// Short type name used in placeholders and tagged container forms.
    fn type_label(&self) -> &'static str {
        self.lineage().head().name
    }

    /// Identity used for self-reference detection and address formatting.
    fn identity(&self) -> Identity {
        Identity::of(self)
    }

    /// The concrete native representation routine this value resolves to.
    ///
    /// Defaults to the implementing type's own routine. Delegating wrappers
    /// should forward this together with [`native_repr`](Self::native_repr)
    /// so suppression decisions follow the shared routine.
    fn repr_routine(&self) -> RoutineId {
        RoutineId(self.lineage().head().id)
    }

    /// The value's own representation routine. May be arbitrarily slow,
    /// verbose, or faulty; the fallback strategy invokes it inside a guarded
    /// region and enforces the length ceiling.
    fn native_repr(&self) -> Result<String, ReprError> {
        Ok(instance_repr(self.type_label(), self.identity()))
    }

    /// Structured element access for container strategies.
    fn items(&self) -> Items<'_> {
        Items::Opaque
    }

    /// Exact element count, where cheap. Required for the multiset summary
    /// form (`TypeName(N keys)`).
    fn len_hint(&self) -> Option<usize> {
        None
    }
}

/// The basic instance form: `<TypeName instance at 0x…>`.
///
/// This is the default native representation, exported so that callers can
/// pre-register it for types whose own routine is expensive:
///
/// ```
/// use glimpse::{Lineage, Renderer, Value, basic_repr};
///
/// struct Expensive;
///
/// impl Value for Expensive {
///     fn lineage(&self) -> Lineage {
///         Lineage::of::<Self>()
///     }
///
///     fn native_repr(&self) -> Result<String, glimpse::ReprError> {
///         // imagine something slow here
///         Ok("...".repeat(10_000))
///     }
/// }
///
/// let renderer = Renderer::new();
/// renderer.register_fn::<Expensive>(|value, _| basic_repr(value));
/// assert!(renderer.render(&Expensive).starts_with("<Expensive instance at 0x"));
/// ```
pub fn basic_repr(value: &dyn Value) -> String {
    instance_repr(value.type_label(), value.identity())
}

pub(crate) fn instance_repr(label: &str, identity: Identity) -> String {
    format!("<{label} instance at {identity}>")
}
