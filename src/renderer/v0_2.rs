//! Renderer for Mobiledoc schema 0.2.0.
//!
//! The 0.2.0 layout nests everything under `sections`:
//! `[markerTypeDefs, sectionList]`. Card sections embed their name and
//! payload inline, and markers are plain `[openIndices, closeCount, text]`
//! triples; there are no atoms.

use serde_json::{json, Value};

use crate::cards::TeardownRegistry;
use crate::error::{Error, Result};

use super::{
    expect_array, expect_str, expect_u64, field, parse_markup_def, parse_open_indices,
    render_sections, version_string, CardRef, Marker, MarkupDef, RenderContext, RenderResult,
    RendererConfig, Section, CARD_SECTION_TYPE, IMAGE_SECTION_TYPE, LIST_SECTION_TYPE,
    MARKUP_SECTION_TYPE,
};

/// The exact version literal this renderer accepts.
pub const MOBILEDOC_VERSION: &str = "0.2.0";

/// Renders a single 0.2.0 document.
pub struct Renderer<'a> {
    marker_types: Vec<MarkupDef>,
    sections: &'a [Value],
    config: &'a RendererConfig,
    teardown: TeardownRegistry,
}

impl<'a> Renderer<'a> {
    /// Validate the document's version and schema shape.
    pub fn new(doc: &'a Value, config: &'a RendererConfig) -> Result<Self> {
        validate_version(doc)?;

        let section_data = doc
            .get("sections")
            .ok_or_else(|| Error::Malformed("document has no sections".to_string()))?;
        let section_data = expect_array(section_data, "sections")?;

        let marker_types = expect_array(field(section_data, 0, "marker types")?, "marker types")?
            .iter()
            .map(parse_markup_def)
            .collect::<Result<Vec<_>>>()?;
        let sections = expect_array(field(section_data, 1, "section list")?, "section list")?;

        Ok(Self {
            marker_types,
            sections,
            config,
            teardown: TeardownRegistry::new(),
        })
    }

    /// Walk the section list and produce the Markdown result.
    pub fn render(self) -> Result<RenderResult> {
        log::debug!(
            "rendering {} sections (schema {MOBILEDOC_VERSION})",
            self.sections.len()
        );
        let ctx = RenderContext {
            marker_types: &self.marker_types,
            card_defs: &[],
            atom_defs: &[],
            config: self.config,
            teardown: &self.teardown,
        };
        let result = render_sections(&ctx, self.sections.iter().map(parse_section))?;
        Ok(RenderResult::new(result, self.teardown))
    }
}

fn validate_version(doc: &Value) -> Result<()> {
    match doc.get("version").and_then(Value::as_str) {
        Some(MOBILEDOC_VERSION) => Ok(()),
        _ => Err(Error::UnexpectedVersion(version_string(doc))),
    }
}

fn parse_section(value: &Value) -> Result<Section> {
    let parts = expect_array(value, "section")?;
    let discriminant = expect_u64(field(parts, 0, "section type")?, "section type")?;

    match discriminant {
        MARKUP_SECTION_TYPE => Ok(Section::Markup {
            tag_name: expect_str(field(parts, 1, "section tag name")?, "section tag name")?
                .to_string(),
            markers: parse_markers(field(parts, 2, "section markers")?)?,
        }),
        IMAGE_SECTION_TYPE => Ok(Section::Image {
            url: expect_str(field(parts, 1, "image url")?, "image url")?.to_string(),
        }),
        LIST_SECTION_TYPE => {
            let tag_name =
                expect_str(field(parts, 1, "list tag name")?, "list tag name")?.to_string();
            let items = expect_array(field(parts, 2, "list items")?, "list items")?
                .iter()
                .map(parse_markers)
                .collect::<Result<Vec<_>>>()?;
            Ok(Section::List { tag_name, items })
        }
        CARD_SECTION_TYPE => Ok(Section::Card(CardRef::Named {
            name: expect_str(field(parts, 1, "card name")?, "card name")?.to_string(),
            payload: parts.get(2).cloned().unwrap_or_else(|| json!({})),
        })),
        other => Err(Error::UnknownSectionType(other)),
    }
}

fn parse_markers(value: &Value) -> Result<Vec<Marker>> {
    expect_array(value, "markers")?
        .iter()
        .map(parse_marker)
        .collect()
}

/// 0.2.0 markers are text-only: `[openIndices, closeCount, text]`.
fn parse_marker(value: &Value) -> Result<Marker> {
    let parts = expect_array(value, "marker")?;
    Ok(Marker::Text {
        open: parse_open_indices(field(parts, 0, "marker open indices")?)?,
        close: expect_u64(field(parts, 1, "marker close count")?, "marker close count")? as usize,
        text: expect_str(field(parts, 2, "marker text")?, "marker text")?.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_version() {
        let config = RendererConfig::new();
        for version in ["0.1.0", "0.2.1", "0.3.0"] {
            let doc = json!({ "version": version, "sections": [[], []] });
            let err = match Renderer::new(&doc, &config) {
                Err(err) => err,
                Ok(_) => panic!("version {version} should be rejected"),
            };
            match err {
                Error::UnexpectedVersion(v) => assert!(v.contains(version)),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_rejects_missing_sections() {
        let config = RendererConfig::new();
        let doc = json!({ "version": MOBILEDOC_VERSION });
        assert!(matches!(
            Renderer::new(&doc, &config),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_unknown_section_discriminant_is_fatal() {
        let config = RendererConfig::new();
        let doc = json!({
            "version": MOBILEDOC_VERSION,
            "sections": [[], [[7, "p", []]]]
        });
        let err = match Renderer::new(&doc, &config).and_then(Renderer::render) {
            Err(err) => err,
            Ok(_) => panic!("expected an error"),
        };
        assert!(matches!(err, Error::UnknownSectionType(7)));
    }
}
