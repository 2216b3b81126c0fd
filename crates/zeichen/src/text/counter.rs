//! Unicode-aware character counting.
//!
//! A "character" is a Unicode scalar value that is not whitespace according to
//! [`char::is_whitespace`]. Tabs, newlines, runs of spaces and non-breaking
//! spaces all count as zero-width, so counts do not depend on layout.

use serde::{Deserialize, Serialize};

/// Count characters after removing all Unicode whitespace.
///
/// ```rust
/// use zeichen::text::count_chars;
///
/// assert_eq!(count_chars("hello world"), 10);
/// assert_eq!(count_chars("\t\n  "), 0);
/// ```
pub fn count_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Count whitespace characters only.
pub fn count_whitespace(text: &str) -> usize {
    text.chars().filter(|c| c.is_whitespace()).count()
}

/// Count honoring the `include_whitespace_in_totals` setting.
pub fn count_with_mode(text: &str, include_whitespace: bool) -> usize {
    if include_whitespace {
        text.chars().count()
    } else {
        count_chars(text)
    }
}

/// Both counts for one piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharCounts {
    pub chars: usize,
    pub whitespace: usize,
}

impl CharCounts {
    pub fn of(text: &str) -> Self {
        let mut counts = Self::default();
        for c in text.chars() {
            if c.is_whitespace() {
                counts.whitespace += 1;
            } else {
                counts.chars += 1;
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.chars + self.whitespace
    }
}
