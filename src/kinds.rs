//! Ancestor tokens for the built-in container shapes.
//!
//! These zero-sized types are never instantiated; they exist purely as
//! registration keys. A value places one or more of them in its
//! [`Lineage`](crate::Lineage) to inherit the matching built-in strategy:
//!
//! ```
//! use glimpse::{Items, Lineage, Value, kinds};
//!
//! struct Ring(Vec<u32>);
//!
//! impl Value for Ring {
//!     fn lineage(&self) -> Lineage {
//!         Lineage::of::<Self>().base::<kinds::TaggedSequence>()
//!     }
//!
//!     fn items(&self) -> Items<'_> {
//!         Items::Sequence(Box::new(self.0.iter().map(|item| item as &dyn Value)))
//!     }
//! }
//!
//! assert_eq!(glimpse::render(&Ring(vec![1, 2])), "Ring([1, 2])");
//! ```

/// Ordered sequences rendered as a bracketed comma list: `[1, 2, 3, ...]`.
#[derive(Copy, Clone, Debug)]
pub struct Sequence;

/// Tuple-shaped sequences rendered in parentheses: `(1, 2, 3, ...)`.
#[derive(Copy, Clone, Debug)]
pub struct Tuple;

/// Unordered sets rendered as a brace list: `{1, 2, 3, ...}`.
#[derive(Copy, Clone, Debug)]
pub struct Set;

/// Mappings rendered as `key: value` pairs: `{1: 2, 3: 4, ...}`.
#[derive(Copy, Clone, Debug)]
pub struct Mapping;

/// Key/value/entry views over a mapping, rendered as a type-tagged list:
/// `Keys([1, 2, ...])`.
#[derive(Copy, Clone, Debug)]
pub struct MappingView;

/// Sequences rendered with their type name as a tag: `VecDeque([1, 2, ...])`.
#[derive(Copy, Clone, Debug)]
pub struct TaggedSequence;

/// Fixed-width numeric sequences, rendered tagged with a tighter element
/// budget: `Samples([0, 1, 2, 3, 4, ...])`.
#[derive(Copy, Clone, Debug)]
pub struct TypedBuffer;

/// Text sequences, truncated by character count with a middle ellipsis.
#[derive(Copy, Clone, Debug)]
pub struct Text;

/// Byte sequences, rendered as a `b"…"` literal truncated by byte count.
#[derive(Copy, Clone, Debug)]
pub struct Bytes;

/// Counting mappings (multisets): listed in full when small, summarized as
/// `TypeName(N keys)` otherwise.
#[derive(Copy, Clone, Debug)]
pub struct Multiset;

/// Layered/chained mappings rendered as a tagged outer list of maps, each
/// layer going through the mapping strategy at its own element budget.
#[derive(Copy, Clone, Debug)]
pub struct LayeredMap;
