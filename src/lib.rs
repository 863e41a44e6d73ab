#![cfg_attr(not(feature = "std"), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! Bounded-cost, panic-contained textual previews of runtime values.
//!
//! ## Overview
//!
//! This crate renders an arbitrary runtime value into a short, human-readable
//! string for diagnostic display - log lines, debugger output, test failure
//! messages. The contract is a *fast, safe, truncated approximation*, not
//! fidelity: [`render`] never panics, never runs unbounded, and never
//! produces output beyond a fixed size, even when the value's own
//! representation routine is slow, enormous, or broken.
//!
//! ```
//! let big: Vec<i64> = (0..1000).collect();
//! assert_eq!(glimpse::render(&big), "[0, 1, 2, 3, 4, 5, ...]");
//!
//! let text = "abc".repeat(50);
//! // Long text keeps its head and tail around a middle ellipsis.
//! assert_eq!(glimpse::render(&text).chars().count(), 62);
//! ```
//!
//! ## Core Concepts
//!
//! - A [`Value`] is anything renderable. It declares a [`Lineage`] - an
//!   explicit, linearized ancestor chain ending in the tokens from
//!   [`kinds`] - plus structured element access and a native representation
//!   routine.
//! - A [`Strategy`] turns one value into bounded text. The built-in family
//!   covers sequences, sets, mappings, mapping views, tagged and fixed-width
//!   numeric sequences, multisets, layered mappings, text and byte
//!   sequences, each truncating to a small per-strategy `maxparts`.
//! - The [`Renderer`] resolves a value's type to a strategy by walking its
//!   lineage (memoized, invalidated on registration). Types without any
//!   registration go through the fallback, which invokes the value's own
//!   [`native_repr`](Value::native_repr) inside a guarded region: failures
//!   and over-length output are converted into stable placeholders and the
//!   offending routine is suppressed for the rest of the process.
//! - Self-reference is detected per render call: a value that contains
//!   itself unrolls a bounded number of times and then collapses to its
//!   container's `[...]`-style placeholder.
//!
//! ## Registering custom strategies
//!
//! ```
//! use glimpse::{Lineage, Renderer, Value};
//!
//! struct Token(u32);
//!
//! impl Value for Token {
//!     fn lineage(&self) -> Lineage {
//!         Lineage::of::<Self>()
//!     }
//! }
//!
//! let renderer = Renderer::new();
//! renderer.register_fn::<Token>(|_, _| "Token(…)".into());
//! assert_eq!(renderer.render(&Token(7)), "Token(…)");
//! ```
//!
//! Registration is hierarchy-aware: a strategy registered for an ancestor in
//! a value's lineage applies to the value unless something more derived is
//! registered. The built-in container strategies are themselves ordinary
//! registrations for the [`kinds`] tokens.
//!
//! ## Failure containment
//!
//! The first time a native routine fails (panic or [`ReprError`]) or
//! overflows the length ceiling, a one-time warning is emitted through
//! [`log`] and the routine is suppressed: later renders produce
//! `<TypeName instance at 0x… (exception in repr)>`-style placeholders
//! without invoking it again. [`set_raise_exceptions`] flips the crate into
//! diagnostic mode, where failures propagate verbatim instead.
//!
//! ## no_std
//!
//! The crate is `no_std + alloc`; the default `std` feature adds panic
//! containment (`catch_unwind`) and switches the internal locks from `spin`
//! to `std::sync`. Without it, native-routine panics unwind to the caller
//! while `ReprError`-shaped failures are still contained.

extern crate alloc;

mod context;
pub mod kinds;
mod lock;
mod registry;
mod renderer;
pub mod strategy;
mod util;
mod value;

pub use crate::{
    context::Helper,
    renderer::{
        Renderer, default_renderer, find_strategy, register, register_fn, render,
        reset_suppressions, set_raise_exceptions,
    },
    strategy::{
        FnStrategy, Strategy,
        containers::{MappingStrategy, MultisetStrategy, SequenceStrategy, TaggedSequenceStrategy},
        fallback::{FallbackStrategy, RoutineKey, SuppressionKind},
        text::TextStrategy,
    },
    value::{
        Identity, Items, Kind, Lineage, PairIter, ReprError, RoutineId, Value, ValueIter,
        basic_repr,
    },
};
