//! Renderer for Mobiledoc schema 0.3.0.
//!
//! The 0.3.0 layout hoists `atoms`, `cards`, and `markups` (marker types)
//! into top-level tables; card sections and atom markers reference them by
//! index. Markers gain a leading discriminant separating text runs from
//! atom references.

use serde_json::{json, Value};

use crate::cards::TeardownRegistry;
use crate::error::{Error, Result};

use super::{
    expect_array, expect_str, expect_u64, expect_usize, field, parse_markup_def,
    parse_open_indices, render_sections, version_string, AtomDef, CardDef, CardRef, Marker,
    MarkupDef, RenderContext, RenderResult, RendererConfig, Section, ATOM_MARKER_TYPE,
    CARD_SECTION_TYPE, IMAGE_SECTION_TYPE, LIST_SECTION_TYPE, MARKUP_MARKER_TYPE,
    MARKUP_SECTION_TYPE,
};

/// The exact version literal this renderer accepts.
pub const MOBILEDOC_VERSION: &str = "0.3.0";

/// Renders a single 0.3.0 document.
pub struct Renderer<'a> {
    marker_types: Vec<MarkupDef>,
    card_defs: Vec<CardDef>,
    atom_defs: Vec<AtomDef>,
    sections: &'a [Value],
    config: &'a RendererConfig,
    teardown: TeardownRegistry,
}

impl<'a> Renderer<'a> {
    /// Validate the document's version and schema shape.
    ///
    /// Missing `atoms`/`cards`/`markups` tables are treated as empty;
    /// `sections` is required.
    pub fn new(doc: &'a Value, config: &'a RendererConfig) -> Result<Self> {
        validate_version(doc)?;

        let marker_types = parse_table(doc, "markups", parse_markup_def)?;
        let card_defs = parse_table(doc, "cards", parse_card_def)?;
        let atom_defs = parse_table(doc, "atoms", parse_atom_def)?;
        let sections = doc
            .get("sections")
            .ok_or_else(|| Error::Malformed("document has no sections".to_string()))?;
        let sections = expect_array(sections, "sections")?;

        Ok(Self {
            marker_types,
            card_defs,
            atom_defs,
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
            card_defs: &self.card_defs,
            atom_defs: &self.atom_defs,
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

fn parse_table<T>(doc: &Value, key: &str, parse: impl Fn(&Value) -> Result<T>) -> Result<Vec<T>> {
    match doc.get(key) {
        Some(table) => expect_array(table, key)?.iter().map(parse).collect(),
        None => Ok(Vec::new()),
    }
}

/// Card table entry: `[name, payload?]`.
fn parse_card_def(value: &Value) -> Result<CardDef> {
    let parts = expect_array(value, "card definition")?;
    Ok(CardDef {
        name: expect_str(field(parts, 0, "card name")?, "card name")?.to_string(),
        payload: parts.get(1).cloned().unwrap_or_else(|| json!({})),
    })
}

/// Atom table entry: `[name, value, payload?]`.
fn parse_atom_def(value: &Value) -> Result<AtomDef> {
    let parts = expect_array(value, "atom definition")?;
    Ok(AtomDef {
        name: expect_str(field(parts, 0, "atom name")?, "atom name")?.to_string(),
        value: field(parts, 1, "atom value")?.clone(),
        payload: parts.get(2).cloned().unwrap_or_else(|| json!({})),
    })
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
        CARD_SECTION_TYPE => Ok(Section::Card(CardRef::Indexed(expect_usize(
            field(parts, 1, "card index")?,
            "card index",
        )?))),
        other => Err(Error::UnknownSectionType(other)),
    }
}

fn parse_markers(value: &Value) -> Result<Vec<Marker>> {
    expect_array(value, "markers")?
        .iter()
        .map(parse_marker)
        .collect()
}

/// 0.3.0 markers are `[type, openIndices, closeCount, value]` where `type`
/// selects a text run or an atom reference.
fn parse_marker(value: &Value) -> Result<Marker> {
    let parts = expect_array(value, "marker")?;
    let discriminant = expect_u64(field(parts, 0, "marker type")?, "marker type")?;
    let open = parse_open_indices(field(parts, 1, "marker open indices")?)?;
    let close =
        expect_u64(field(parts, 2, "marker close count")?, "marker close count")? as usize;

    match discriminant {
        MARKUP_MARKER_TYPE => Ok(Marker::Text {
            open,
            close,
            text: expect_str(field(parts, 3, "marker text")?, "marker text")?.to_string(),
        }),
        ATOM_MARKER_TYPE => Ok(Marker::Atom {
            open,
            close,
            index: expect_usize(field(parts, 3, "atom index")?, "atom index")?,
        }),
        other => Err(Error::UnknownMarkerType(other)),
    }
}
