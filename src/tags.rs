//! Tag allowlists.
//!
//! Sections and markers name their own tags, so tag names in a document are
//! untrusted input. Anything outside these fixed sets is silently dropped
//! rather than rendered.

/// Tags a markup section may use.
const MARKUP_SECTION_TAGS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pull-quote",
];

/// Tags a list section may use.
const LIST_SECTION_TAGS: &[&str] = &["ul", "ol"];

/// Tags an inline marker may open.
const MARKER_TAGS: &[&str] = &["a", "b", "code", "em", "i", "s", "strong", "sub", "sup", "u"];

fn contains_ignore_case(set: &[&str], tag: &str) -> bool {
    set.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Whether a markup section may render with this tag.
pub fn is_valid_markup_section_tag(tag: &str) -> bool {
    contains_ignore_case(MARKUP_SECTION_TAGS, tag)
}

/// Whether a list section may render with this tag.
pub fn is_valid_list_section_tag(tag: &str) -> bool {
    contains_ignore_case(LIST_SECTION_TAGS, tag)
}

/// Whether an inline marker may open an element with this tag.
pub fn is_valid_marker_tag(tag: &str) -> bool {
    contains_ignore_case(MARKER_TAGS, tag)
}
