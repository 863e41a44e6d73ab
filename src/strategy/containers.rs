//! The built-in container strategies.
//!
//! Each strategy shows a bounded preview of an iterable value: up to
//! `maxparts` elements followed by a `...` marker. To decide whether the
//! marker applies, a strategy materializes one element more than its budget,
//! so a container holding exactly `maxparts` elements is never reported as
//! truncated. Nested elements go back through the shared entry point, which
//! is what makes cycles and suppression behave correctly in nested
//! positions.

use alloc::{format, string::String, vec::Vec};
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    context::Helper,
    strategy::Strategy,
    value::{Items, Value, basic_repr},
};

const ELLIPSIS: &str = "...";

/// Renders an ordered sequence as a delimited comma list.
///
/// Instances differ only in delimiters and budget: lists (`[1, 2, ...]`),
/// tuples (`(1, 2, ...)`, with the trailing comma for a single element),
/// and sets (`{1, 2, ...}`).
pub struct SequenceStrategy {
    open: &'static str,
    close: &'static str,
    trailing_comma_when_single: bool,
    max_parts: AtomicUsize,
}

impl SequenceStrategy {
    /// A sequence strategy with the given delimiters and element budget.
    pub fn new(open: &'static str, close: &'static str, max_parts: usize) -> Self {
        Self {
            open,
            close,
            trailing_comma_when_single: false,
            max_parts: AtomicUsize::new(max_parts),
        }
    }

    /// The list form: `[1, 2, 3, ...]`, budget 6.
    pub fn list() -> Self {
        Self::new("[", "]", 6)
    }

    /// The tuple form: `(1, 2, 3, ...)`, budget 6, `(1,)` for one element.
    pub fn tuple() -> Self {
        Self {
            trailing_comma_when_single: true,
            ..Self::new("(", ")", 6)
        }
    }

    /// The set form: `{1, 2, 3, ...}`, budget 6.
    pub fn set() -> Self {
        Self::new("{", "}", 6)
    }
}

impl Strategy for SequenceStrategy {
    fn render(&self, value: &dyn Value, helper: &mut Helper<'_>) -> String {
        let Items::Sequence(iter) = value.items() else {
            return basic_repr(value);
        };
        let max = self.max_parts.load(Ordering::Relaxed);
        let elements: Vec<&dyn Value> = iter.take(max + 1).collect();
        let truncated = elements.len() > max;
        let mut parts: Vec<String> = elements[..elements.len().min(max)]
            .iter()
            .map(|element| helper.render(*element))
            .collect();
        if truncated {
            parts.push(ELLIPSIS.into());
        } else if parts.len() == 1 && self.trailing_comma_when_single {
            return format!("{}{},{}", self.open, parts[0], self.close);
        }
        format!("{}{}{}", self.open, parts.join(", "), self.close)
    }

    fn placeholder(&self, _value: &dyn Value) -> Option<String> {
        Some(format!("{}{}{}", self.open, ELLIPSIS, self.close))
    }

    fn max_parts(&self) -> Option<usize> {
        Some(self.max_parts.load(Ordering::Relaxed))
    }

    fn set_max_parts(&self, parts: usize) {
        self.max_parts.store(parts, Ordering::Relaxed);
    }
}

/// Renders a sequence tagged with the value's own type name:
/// `VecDeque([0, 1, 2, ...])`.
///
/// Registered for mapping views, deque-like containers, fixed-width numeric
/// buffers (with a tighter budget), and layered mappings - the latter's
/// elements are maps, which recurse into the mapping strategy at its own
/// budget.
pub struct TaggedSequenceStrategy {
    max_parts: AtomicUsize,
}

impl TaggedSequenceStrategy {
    /// A tagged sequence strategy with the given element budget.
    pub fn new(max_parts: usize) -> Self {
        Self {
            max_parts: AtomicUsize::new(max_parts),
        }
    }
}

impl Strategy for TaggedSequenceStrategy {
    fn render(&self, value: &dyn Value, helper: &mut Helper<'_>) -> String {
        let Items::Sequence(iter) = value.items() else {
            return basic_repr(value);
        };
        let max = self.max_parts.load(Ordering::Relaxed);
        let elements: Vec<&dyn Value> = iter.take(max + 1).collect();
        let truncated = elements.len() > max;
        let mut parts: Vec<String> = elements[..elements.len().min(max)]
            .iter()
            .map(|element| helper.render(*element))
            .collect();
        if truncated {
            parts.push(ELLIPSIS.into());
        }
        format!("{}([{}])", value.type_label(), parts.join(", "))
    }

    fn placeholder(&self, value: &dyn Value) -> Option<String> {
        Some(format!("{}([{}])", value.type_label(), ELLIPSIS))
    }

    fn max_parts(&self) -> Option<usize> {
        Some(self.max_parts.load(Ordering::Relaxed))
    }

    fn set_max_parts(&self, parts: usize) {
        self.max_parts.store(parts, Ordering::Relaxed);
    }
}

/// Renders a mapping as `{key: value, ...}` pairs, budget 4 by default.
pub struct MappingStrategy {
    max_parts: AtomicUsize,
}

impl MappingStrategy {
    /// A mapping strategy with the given entry budget.
    pub fn new(max_parts: usize) -> Self {
        Self {
            max_parts: AtomicUsize::new(max_parts),
        }
    }
}

impl Strategy for MappingStrategy {
    fn render(&self, value: &dyn Value, helper: &mut Helper<'_>) -> String {
        let Items::Pairs(iter) = value.items() else {
            return basic_repr(value);
        };
        let max = self.max_parts.load(Ordering::Relaxed);
        let entries: Vec<(&dyn Value, &dyn Value)> = iter.take(max + 1).collect();
        let truncated = entries.len() > max;
        let mut parts: Vec<String> = entries[..entries.len().min(max)]
            .iter()
            .map(|(key, entry)| format!("{}: {}", helper.render(*key), helper.render(*entry)))
            .collect();
        if truncated {
            parts.push(ELLIPSIS.into());
        }
        format!("{{{}}}", parts.join(", "))
    }

    fn placeholder(&self, _value: &dyn Value) -> Option<String> {
        Some(format!("{{{ELLIPSIS}}}"))
    }

    fn max_parts(&self) -> Option<usize> {
        Some(self.max_parts.load(Ordering::Relaxed))
    }

    fn set_max_parts(&self, parts: usize) {
        self.max_parts.store(parts, Ordering::Relaxed);
    }
}

/// Renders a counting mapping: the full `Label({key: count, ...})` literal
/// while the cardinality fits the budget, and the `Label(N keys)` summary
/// beyond it. Switches representation form instead of truncating.
pub struct MultisetStrategy {
    max_parts: AtomicUsize,
}

impl MultisetStrategy {
    /// A multiset strategy with the given cardinality budget.
    pub fn new(max_parts: usize) -> Self {
        Self {
            max_parts: AtomicUsize::new(max_parts),
        }
    }
}

impl Strategy for MultisetStrategy {
    fn render(&self, value: &dyn Value, helper: &mut Helper<'_>) -> String {
        let label = value.type_label();
        let (Some(len), Items::Pairs(iter)) = (value.len_hint(), value.items()) else {
            return basic_repr(value);
        };
        let max = self.max_parts.load(Ordering::Relaxed);
        if len > max {
            return format!("{label}({len} keys)");
        }
        let parts: Vec<String> = iter
            .map(|(key, count)| format!("{}: {}", helper.render(key), helper.render(count)))
            .collect();
        format!("{label}({{{}}})", parts.join(", "))
    }

    fn placeholder(&self, value: &dyn Value) -> Option<String> {
        Some(format!("{}({ELLIPSIS})", value.type_label()))
    }

    fn max_parts(&self) -> Option<usize> {
        Some(self.max_parts.load(Ordering::Relaxed))
    }

    fn set_max_parts(&self, parts: usize) {
        self.max_parts.store(parts, Ordering::Relaxed);
    }
}
