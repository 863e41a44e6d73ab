use alloc::{borrow::Cow, string::String};

/// Strips the module path and generic arguments from a full type name, so
/// `alloc::vec::Vec<i64>` becomes `Vec`. The result borrows from the
/// `'static` string returned by [`core::any::type_name`].
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = core::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Budget split for middle-ellipsis truncation: `(head, tail)` lengths such
/// that `head + 3 + tail == budget`. Returns `None` when `len` already fits.
pub(crate) fn split_budget(len: usize, budget: usize) -> Option<(usize, usize)> {
    if len <= budget {
        return None;
    }
    let head = budget.saturating_sub(3) / 2;
    let tail = budget.saturating_sub(3) - head;
    Some((head, tail))
}

/// Truncates `text` to at most `budget` characters, replacing the middle
/// with `...`. Operates on characters, not bytes, so multi-byte text never
/// splits a code point.
pub(crate) fn truncate_chars(text: &str, budget: usize) -> Cow<'_, str> {
    let count = text.chars().count();
    match split_budget(count, budget) {
        None => Cow::Borrowed(text),
        Some((head, tail)) => {
            let mut out = String::with_capacity(budget);
            out.extend(text.chars().take(head));
            out.push_str("...");
            out.extend(text.chars().skip(count - tail));
            Cow::Owned(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<i64>(), "i64");
        assert_eq!(short_type_name::<String>(), "String");
        assert_eq!(short_type_name::<Vec<i64>>(), "Vec");
        assert_eq!(short_type_name::<Vec<Vec<String>>>(), "Vec");
        assert_eq!(short_type_name::<str>(), "str");
    }

    #[test]
    fn test_split_budget() {
        assert_eq!(split_budget(60, 60), None);
        assert_eq!(split_budget(61, 60), Some((28, 29)));
        assert_eq!(split_budget(2000, 60), Some((28, 29)));
        assert_eq!(split_budget(5, 2), Some((0, 0)));
    }

    #[test]
    fn test_truncate_chars_short_input_is_borrowed() {
        assert!(matches!(truncate_chars("abc", 60), Cow::Borrowed("abc")));
    }

    #[test]
    fn test_truncate_chars_splits_around_middle() {
        let text = "abc".repeat(50);
        let truncated = truncate_chars(&text, 60);
        assert_eq!(truncated.chars().count(), 60);
        assert!(truncated.starts_with("abcabcabcabcabcabcabcabcabca..."));
        assert!(truncated.ends_with("...bcabcabcabcabcabcabcabcabcabc"));
    }

    #[test]
    fn test_truncate_chars_is_character_based() {
        let text = "é".repeat(100);
        let truncated = truncate_chars(&text, 60);
        assert_eq!(truncated.chars().count(), 60);
    }
}
