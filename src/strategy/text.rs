//! Text and byte-sequence strategies.
//!
//! Unlike the container strategies these truncate by character (or byte)
//! count, and the cut happens in the middle: a fixed prefix and suffix
//! joined by `...`, sized to fit the configured ceiling exactly.

use alloc::{format, string::String};
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    context::Helper,
    strategy::Strategy,
    util::{split_budget, truncate_chars},
    value::{Items, Value, basic_repr},
};

/// Renders a text or byte sequence as a quoted literal with a middle
/// ellipsis once it exceeds the character ceiling (60 by default).
///
/// The ceiling applies to the raw content; quotes and escapes come on top,
/// so a truncated string renders as `"<28 chars>...<29 chars>"`.
pub struct TextStrategy {
    max_chars: AtomicUsize,
}

impl TextStrategy {
    const DEFAULT_CEILING: usize = 60;

    /// A text strategy with the default 60-character ceiling.
    pub fn new() -> Self {
        Self {
            max_chars: AtomicUsize::new(Self::DEFAULT_CEILING),
        }
    }
}

impl Default for TextStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for TextStrategy {
    fn render(&self, value: &dyn Value, _helper: &mut Helper<'_>) -> String {
        let max = self.max_chars.load(Ordering::Relaxed);
        match value.items() {
            Items::Text(text) => format!("{:?}", truncate_chars(text, max).as_ref()),
            Items::Bytes(data) => render_bytes(data, max),
            _ => basic_repr(value),
        }
    }

    fn max_parts(&self) -> Option<usize> {
        Some(self.max_chars.load(Ordering::Relaxed))
    }

    fn set_max_parts(&self, parts: usize) {
        self.max_chars.store(parts, Ordering::Relaxed);
    }
}

fn render_bytes(data: &[u8], max: usize) -> String {
    let mut out = String::from("b\"");
    match split_budget(data.len(), max) {
        None => push_escaped(&mut out, data),
        Some((head, tail)) => {
            push_escaped(&mut out, &data[..head]);
            out.push_str("...");
            push_escaped(&mut out, &data[data.len() - tail..]);
        }
    }
    out.push('"');
    out
}

fn push_escaped(out: &mut String, data: &[u8]) {
    for &byte in data {
        out.extend(core::ascii::escape_default(byte).map(char::from));
    }
}
