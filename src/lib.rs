//! # mobiledoc-md
//!
//! Renders Mobiledoc rich-text documents to Markdown.
//!
//! Mobiledoc is a versioned, JSON-serializable document format: block-level
//! sections (paragraphs, headings, lists, images, embedded "cards") carry
//! inline formatting as flattened marker runs with open/close counts. This
//! library walks that structure, rebuilds the implicit formatting tree, and
//! serializes it to Markdown. Both the 0.2.0 and 0.3.0 schemas are
//! supported; tag names outside a fixed allowlist are silently dropped as
//! an injection defense.
//!
//! The transform is pure and synchronous: no I/O, no Markdown parsing, no
//! escaping of Markdown special characters found in source text.
//!
//! ## Quick Start
//!
//! ```
//! use serde_json::json;
//!
//! fn main() -> mobiledoc_md::Result<()> {
//!     let doc = json!({
//!         "version": "0.2.0",
//!         "sections": [
//!             [["B"]],
//!             [[1, "p", [[[0], 1, "hello world"]]]]
//!         ]
//!     });
//!
//!     let rendered = mobiledoc_md::render(&doc)?;
//!     assert_eq!(rendered.result, "**hello world**\n");
//!
//!     // Fires any cleanup callbacks cards/atoms registered.
//!     rendered.teardown();
//!     Ok(())
//! }
//! ```
//!
//! ## Cards and atoms
//!
//! Cards (block-level) and atoms (inline, schema 0.3.0) are pluggable
//! widgets the caller supplies per renderer:
//!
//! ```
//! use mobiledoc_md::{Card, CardArgs, MarkdownRenderer, RendererConfig};
//! use serde_json::json;
//!
//! struct TitleCard;
//!
//! impl Card for TitleCard {
//!     fn name(&self) -> &str {
//!         "title-card"
//!     }
//!
//!     fn render(&self, args: CardArgs<'_>) -> mobiledoc_md::Result<Option<String>> {
//!         let title = args.payload.get("title").and_then(|t| t.as_str());
//!         Ok(title.map(|t| format!("# {t}")))
//!     }
//! }
//!
//! fn main() -> mobiledoc_md::Result<()> {
//!     let renderer = MarkdownRenderer::new(RendererConfig::new().with_card(TitleCard))?;
//!     let doc = json!({
//!         "version": "0.2.0",
//!         "sections": [[], [[10, "title-card", { "title": "Hi" }]]]
//!     });
//!     assert_eq!(renderer.render(&doc)?.result, "# Hi");
//!     Ok(())
//! }
//! ```

pub mod cards;
pub mod error;
pub mod renderer;
pub mod tags;
pub mod tree;

// Re-export commonly used types
pub use cards::{
    Atom, AtomArgs, AtomEnv, Card, CardArgs, CardEnv, ImageCard, UnknownAtomHandler,
    UnknownCardHandler, IMAGE_CARD_NAME, RENDER_TYPE,
};
pub use error::{Error, Result};
pub use renderer::{
    MarkdownRenderer, RenderResult, RendererConfig, ATOM_MARKER_TYPE, CARD_SECTION_TYPE,
    IMAGE_SECTION_TYPE, LIST_SECTION_TYPE, MARKUP_MARKER_TYPE, MARKUP_SECTION_TYPE,
};

use serde_json::Value;

/// Render a document with an empty configuration (no cards, no atoms, no
/// unknown handlers).
///
/// # Example
///
/// ```
/// use serde_json::json;
///
/// let doc = json!({
///     "version": "0.3.0",
///     "atoms": [], "cards": [], "markups": [],
///     "sections": [[1, "p", [[0, [], 0, "plain text"]]]]
/// });
/// let rendered = mobiledoc_md::render(&doc).unwrap();
/// assert_eq!(rendered.result, "plain text\n");
/// ```
pub fn render(doc: &Value) -> Result<RenderResult> {
    render_with_config(doc, RendererConfig::new())
}

/// Render a document with the given configuration.
///
/// Convenience for one-shot rendering; construct a [`MarkdownRenderer`]
/// directly to reuse a configuration across documents.
pub fn render_with_config(doc: &Value, config: RendererConfig) -> Result<RenderResult> {
    MarkdownRenderer::new(config)?.render(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_empty_documents() {
        let doc = json!({ "version": "0.2.0", "sections": [[], []] });
        assert_eq!(render(&doc).unwrap().result, "");

        let doc = json!({
            "version": "0.3.0",
            "atoms": [], "cards": [], "markups": [], "sections": []
        });
        assert_eq!(render(&doc).unwrap().result, "");
    }

    #[test]
    fn test_render_rejects_unknown_version() {
        let doc = json!({ "version": "1.0.0", "sections": [] });
        assert!(matches!(render(&doc), Err(Error::UnexpectedVersion(_))));
    }
}
