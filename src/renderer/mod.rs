//! Rendering module: shared core plus one renderer per schema version.
//!
//! The two Mobiledoc schemas differ only in field layout (0.2.0 nests its
//! marker-type table inside `sections`; 0.3.0 references cards and atoms by
//! index into top-level tables). Each version module owns that positional
//! parsing; everything else (section dispatch, the inline stack walk,
//! card/atom invocation, tree serialization) lives here and is shared.

pub mod v0_2;
pub mod v0_3;

use serde_json::{json, Value};

use crate::cards::{
    Atom, AtomArgs, AtomEnv, Card, CardArgs, CardEnv, ImageCard, TeardownRegistry,
    UnknownAtomHandler, UnknownCardHandler, IMAGE_CARD_NAME, RENDER_TYPE,
};
use crate::error::{Error, Result};
use crate::tags::{is_valid_list_section_tag, is_valid_markup_section_tag, is_valid_marker_tag};
use crate::tree::{Element, Node};

/// Markup section discriminant.
pub const MARKUP_SECTION_TYPE: u64 = 1;
/// Image section discriminant.
pub const IMAGE_SECTION_TYPE: u64 = 2;
/// List section discriminant.
pub const LIST_SECTION_TYPE: u64 = 3;
/// Card section discriminant.
pub const CARD_SECTION_TYPE: u64 = 10;

/// Text marker discriminant (schema 0.3.0).
pub const MARKUP_MARKER_TYPE: u64 = 0;
/// Atom marker discriminant (schema 0.3.0).
pub const ATOM_MARKER_TYPE: u64 = 1;

/// Configuration for a [`MarkdownRenderer`]: plugins, opaque plugin
/// options, and fallback handlers for unresolved plugin names.
#[derive(Default)]
pub struct RendererConfig {
    pub(crate) cards: Vec<Box<dyn Card>>,
    pub(crate) atoms: Vec<Box<dyn Atom>>,
    pub(crate) card_options: Value,
    pub(crate) unknown_card_handler: Option<UnknownCardHandler>,
    pub(crate) unknown_atom_handler: Option<UnknownAtomHandler>,
}

impl RendererConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self {
            card_options: json!({}),
            ..Self::default()
        }
    }

    /// Add a card plugin.
    pub fn with_card(mut self, card: impl Card + 'static) -> Self {
        self.cards.push(Box::new(card));
        self
    }

    /// Add an atom plugin (used by schema 0.3.0 documents).
    pub fn with_atom(mut self, atom: impl Atom + 'static) -> Self {
        self.atoms.push(Box::new(atom));
        self
    }

    /// Set the opaque options value passed through to every card and atom.
    pub fn with_card_options(mut self, options: Value) -> Self {
        self.card_options = options;
        self
    }

    /// Set the handler invoked for card names that resolve to nothing.
    pub fn with_unknown_card_handler(
        mut self,
        handler: impl Fn(CardArgs<'_>) -> Result<Option<String>> + 'static,
    ) -> Self {
        self.unknown_card_handler = Some(Box::new(handler));
        self
    }

    /// Set the handler invoked for atom names that resolve to nothing.
    pub fn with_unknown_atom_handler(
        mut self,
        handler: impl Fn(AtomArgs<'_>) -> Result<Option<String>> + 'static,
    ) -> Self {
        self.unknown_atom_handler = Some(Box::new(handler));
        self
    }
}

/// Renders Mobiledoc documents to Markdown, dispatching on the document's
/// `version` field.
///
/// Construction validates every supplied plugin's capability tag; rendering
/// is a pure in-memory walk. Plugins may recursively render sub-documents:
/// each render invocation owns its own insertion-point stacks and teardown
/// registry.
pub struct MarkdownRenderer {
    config: RendererConfig,
}

impl MarkdownRenderer {
    /// Create a renderer, validating plugin shapes eagerly.
    ///
    /// Fails with [`Error::InvalidCardType`] / [`Error::InvalidAtomType`]
    /// if a supplied plugin declares a capability other than
    /// [`RENDER_TYPE`].
    pub fn new(config: RendererConfig) -> Result<Self> {
        for card in &config.cards {
            if card.render_type() != RENDER_TYPE {
                return Err(Error::InvalidCardType(
                    card.name().to_string(),
                    card.render_type().to_string(),
                ));
            }
        }
        for atom in &config.atoms {
            if atom.render_type() != RENDER_TYPE {
                return Err(Error::InvalidAtomType(
                    atom.name().to_string(),
                    atom.render_type().to_string(),
                ));
            }
        }
        Ok(Self { config })
    }

    /// Render a document, selecting the schema renderer by its `version`.
    pub fn render(&self, doc: &Value) -> Result<RenderResult> {
        match doc.get("version").and_then(Value::as_str) {
            Some(v0_2::MOBILEDOC_VERSION) => v0_2::Renderer::new(doc, &self.config)?.render(),
            Some(v0_3::MOBILEDOC_VERSION) => v0_3::Renderer::new(doc, &self.config)?.render(),
            _ => Err(Error::UnexpectedVersion(version_string(doc))),
        }
    }
}

/// A finished render: the Markdown text plus a teardown handle.
pub struct RenderResult {
    /// The rendered Markdown.
    pub result: String,
    teardown: TeardownRegistry,
}

impl std::fmt::Debug for RenderResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderResult")
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

impl RenderResult {
    pub(crate) fn new(result: String, teardown: TeardownRegistry) -> Self {
        Self { result, teardown }
    }

    /// Fire every teardown callback plugins registered during this render,
    /// in registration order.
    ///
    /// There is no idempotency guard: calling this again fires all the
    /// callbacks again.
    pub fn teardown(&self) {
        self.teardown.fire();
    }
}

/// A marker-type definition: inline tag name plus attribute pairs.
#[derive(Debug, Clone)]
pub(crate) struct MarkupDef {
    pub tag_name: String,
    pub attributes: Vec<(String, String)>,
}

impl MarkupDef {
    fn to_element(&self) -> Element {
        let mut element = Element::new(&self.tag_name);
        for (name, value) in &self.attributes {
            element.set_attribute(name.as_str(), value.as_str());
        }
        element
    }
}

/// A card definition from a 0.3.0 document's cards table.
#[derive(Debug, Clone)]
pub(crate) struct CardDef {
    pub name: String,
    pub payload: Value,
}

/// An atom definition from a 0.3.0 document's atoms table.
#[derive(Debug, Clone)]
pub(crate) struct AtomDef {
    pub name: String,
    pub value: Value,
    pub payload: Value,
}

/// A block-level section, parsed into schema-agnostic form.
#[derive(Debug)]
pub(crate) enum Section {
    Markup {
        tag_name: String,
        markers: Vec<Marker>,
    },
    Image {
        url: String,
    },
    List {
        tag_name: String,
        items: Vec<Vec<Marker>>,
    },
    Card(CardRef),
}

/// How a card section refers to its card.
#[derive(Debug)]
pub(crate) enum CardRef {
    /// 0.2.0: name and payload embedded in the section.
    Named { name: String, payload: Value },
    /// 0.3.0: index into the document's cards table.
    Indexed(usize),
}

/// One inline run: open some marker types, emit a payload, close some.
#[derive(Debug)]
pub(crate) enum Marker {
    Text {
        open: Vec<usize>,
        close: usize,
        text: String,
    },
    /// 0.3.0 only: the payload is an index into the atoms table.
    Atom {
        open: Vec<usize>,
        close: usize,
        index: usize,
    },
}

/// Everything the shared render core needs for one render invocation.
pub(crate) struct RenderContext<'a> {
    pub marker_types: &'a [MarkupDef],
    pub card_defs: &'a [CardDef],
    pub atom_defs: &'a [AtomDef],
    pub config: &'a RendererConfig,
    pub teardown: &'a TeardownRegistry,
}

/// Render parsed sections into a root container and serialize it.
///
/// Sections that render nothing (disallowed tags) contribute nothing;
/// everything else is appended in document order.
pub(crate) fn render_sections<I>(ctx: &RenderContext<'_>, sections: I) -> Result<String>
where
    I: Iterator<Item = Result<Section>>,
{
    let mut root = Element::new("div");
    for section in sections {
        if let Some(node) = render_section(ctx, &section?)? {
            root.append_child(node);
        }
    }
    Ok(root.to_markdown())
}

fn render_section(ctx: &RenderContext<'_>, section: &Section) -> Result<Option<Node>> {
    match section {
        Section::Markup { tag_name, markers } => render_markup_section(ctx, tag_name, markers),
        Section::Image { url } => Ok(Some(render_image_section(url))),
        Section::List { tag_name, items } => render_list_section(ctx, tag_name, items),
        Section::Card(card_ref) => render_card_section(ctx, card_ref).map(Some),
    }
}

fn render_markup_section(
    ctx: &RenderContext<'_>,
    tag_name: &str,
    markers: &[Marker],
) -> Result<Option<Node>> {
    if !is_valid_markup_section_tag(tag_name) {
        return Ok(None);
    }
    let element = render_markers(ctx, Element::new(tag_name), markers)?;
    Ok(Some(Node::Element(element)))
}

fn render_list_section(
    ctx: &RenderContext<'_>,
    tag_name: &str,
    items: &[Vec<Marker>],
) -> Result<Option<Node>> {
    if !is_valid_list_section_tag(tag_name) {
        return Ok(None);
    }
    let ordered = tag_name.eq_ignore_ascii_case("ol");
    let mut element = Element::new(tag_name);
    for (i, item) in items.iter().enumerate() {
        let mut li = Element::new("li");
        if ordered {
            li.set_attribute("position", (i + 1).to_string());
        }
        let li = render_markers(ctx, li, item)?;
        element.append_child(Node::Element(li));
    }
    Ok(Some(Node::Element(element)))
}

fn render_image_section(url: &str) -> Node {
    // URLs are not tag names; no allowlist applies.
    let mut element = Element::new("img");
    element.set_attribute("src", url);
    Node::Element(element)
}

fn render_card_section(ctx: &RenderContext<'_>, card_ref: &CardRef) -> Result<Node> {
    let (name, payload) = match card_ref {
        CardRef::Named { name, payload } => (name.as_str(), payload),
        CardRef::Indexed(index) => {
            let def = ctx
                .card_defs
                .get(*index)
                .ok_or(Error::NoCardAtIndex(*index))?;
            (def.name.as_str(), &def.payload)
        }
    };

    let rendered = invoke_card(ctx, name, payload)?;
    let mut wrapper = Element::new("div");
    if let Some(text) = rendered {
        wrapper.append_text(text);
    }
    Ok(Node::Element(wrapper))
}

/// Resolve and invoke a card: supplied cards by name, then the built-in
/// image card, then the unknown-card handler.
fn invoke_card(ctx: &RenderContext<'_>, name: &str, payload: &Value) -> Result<Option<String>> {
    let args = CardArgs {
        env: CardEnv::new(name, ctx.teardown.clone()),
        options: &ctx.config.card_options,
        payload,
    };

    if let Some(card) = ctx.config.cards.iter().find(|c| c.name() == name) {
        return card.render(args);
    }
    if name == IMAGE_CARD_NAME {
        return ImageCard.render(args);
    }
    match &ctx.config.unknown_card_handler {
        Some(handler) => {
            log::debug!("card \"{name}\" not found, using unknown card handler");
            handler(args)
        }
        None => Err(Error::CardNotFound(name.to_string())),
    }
}

fn render_atom(ctx: &RenderContext<'_>, index: usize) -> Result<Node> {
    let def = ctx.atom_defs.get(index).ok_or(Error::NoAtomAtIndex(index))?;
    let args = AtomArgs {
        env: AtomEnv::new(&def.name, ctx.teardown.clone()),
        options: &ctx.config.card_options,
        value: &def.value,
        payload: &def.payload,
    };

    let rendered = match ctx.config.atoms.iter().find(|a| a.name() == def.name) {
        Some(atom) => atom.render(args)?,
        None => match &ctx.config.unknown_atom_handler {
            Some(handler) => {
                log::debug!("atom \"{}\" not found, using unknown atom handler", def.name);
                handler(args)?
            }
            None => return Err(Error::AtomNotFound(def.name.clone())),
        },
    };
    Ok(Node::text(rendered.unwrap_or_default()))
}

/// Insertion-point stack for one inline walk.
///
/// Always holds at least the section's root element; closes never pop the
/// root, and elements still open at the end of the walk are flushed into
/// their parents.
struct ElementStack {
    elements: Vec<Element>,
}

impl ElementStack {
    fn new(root: Element) -> Self {
        Self {
            elements: vec![root],
        }
    }

    fn open(&mut self, element: Element) {
        self.elements.push(element);
    }

    fn append(&mut self, node: Node) {
        if let Some(top) = self.elements.last_mut() {
            top.append_child(node);
        }
    }

    fn close(&mut self) {
        if self.elements.len() > 1 {
            if let Some(element) = self.elements.pop() {
                self.append(Node::Element(element));
            }
        }
    }

    fn finish(mut self) -> Element {
        while self.elements.len() > 1 {
            self.close();
        }
        // The root is seeded at construction and never popped.
        self.elements.pop().unwrap_or_else(|| Element::new("div"))
    }
}

/// Walk one marker-run sequence, reconstructing the implicit nesting tree
/// inside `root`.
///
/// A disallowed marker tag opens nothing; its matching close is suppressed
/// by decrementing the run's close count (saturating at zero) so stack
/// depth stays consistent.
pub(crate) fn render_markers(
    ctx: &RenderContext<'_>,
    root: Element,
    markers: &[Marker],
) -> Result<Element> {
    let mut stack = ElementStack::new(root);

    for marker in markers {
        let (open, mut close) = match marker {
            Marker::Text { open, close, .. } | Marker::Atom { open, close, .. } => (open, *close),
        };

        for &index in open {
            let def = ctx
                .marker_types
                .get(index)
                .ok_or_else(|| Error::Malformed(format!("no marker type at index {index}")))?;
            if is_valid_marker_tag(&def.tag_name) {
                stack.open(def.to_element());
            } else {
                close = close.saturating_sub(1);
            }
        }

        match marker {
            Marker::Text { text, .. } => stack.append(Node::text(text.as_str())),
            Marker::Atom { index, .. } => stack.append(render_atom(ctx, *index)?),
        }

        for _ in 0..close {
            stack.close();
        }
    }

    Ok(stack.finish())
}

pub(crate) fn version_string(doc: &Value) -> String {
    doc.get("version")
        .map(|v| v.to_string())
        .unwrap_or_else(|| "(missing)".to_string())
}

// Positional-field helpers for the compact array encodings.

pub(crate) fn expect_array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::Malformed(format!("{what} must be an array")))
}

pub(crate) fn expect_str<'a>(value: &'a Value, what: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::Malformed(format!("{what} must be a string")))
}

pub(crate) fn expect_u64(value: &Value, what: &str) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| Error::Malformed(format!("{what} must be a non-negative integer")))
}

pub(crate) fn expect_usize(value: &Value, what: &str) -> Result<usize> {
    Ok(expect_u64(value, what)? as usize)
}

pub(crate) fn field<'a>(parts: &'a [Value], index: usize, what: &str) -> Result<&'a Value> {
    parts
        .get(index)
        .ok_or_else(|| Error::Malformed(format!("missing {what}")))
}

/// Parse a marker-type definition: `[tagName]` or `[tagName, [k, v, ...]]`.
pub(crate) fn parse_markup_def(value: &Value) -> Result<MarkupDef> {
    let parts = expect_array(value, "marker type")?;
    let tag_name = expect_str(field(parts, 0, "marker type tag name")?, "marker type tag name")?
        .to_lowercase();

    let mut attributes = Vec::new();
    if let Some(attrs) = parts.get(1) {
        let attrs = expect_array(attrs, "marker type attributes")?;
        for pair in attrs.chunks(2) {
            if let [name, value] = pair {
                attributes.push((
                    expect_str(name, "attribute name")?.to_string(),
                    expect_str(value, "attribute value")?.to_string(),
                ));
            }
        }
    }

    Ok(MarkupDef {
        tag_name,
        attributes,
    })
}

/// Parse a marker's open-indices list.
pub(crate) fn parse_open_indices(value: &Value) -> Result<Vec<usize>> {
    expect_array(value, "marker open indices")?
        .iter()
        .map(|v| expect_usize(v, "marker open index"))
        .collect()
}
