//! Text utilities: character counting and HTML escaping.

pub mod counter;
pub mod escape;

pub use counter::{CharCounts, count_chars, count_whitespace, count_with_mode};
pub use escape::escape_html;
