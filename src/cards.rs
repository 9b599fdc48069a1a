//! The card/atom plugin boundary.
//!
//! Cards are block-level embedded widgets; atoms are their inline
//! counterpart (schema 0.3.0 only). Both are supplied by the caller per
//! renderer and resolved by name while rendering. A plugin renders to
//! `Some(markdown_string)` or `None`; anything it needs to clean up later
//! is registered through `env.on_teardown` and fired when the caller
//! invokes the returned teardown handle.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::error::Result;

/// Capability tag this renderer requires of its plugins.
pub const RENDER_TYPE: &str = "markdown";

/// A teardown callback registered by a card or atom.
pub type TeardownFn = Box<dyn Fn()>;

/// Accumulates teardown callbacks across one render invocation.
///
/// Shared between the renderer, the plugin environments handed out during
/// the walk, and the returned [`RenderResult`](crate::RenderResult).
#[derive(Clone, Default)]
pub(crate) struct TeardownRegistry {
    callbacks: Rc<RefCell<Vec<TeardownFn>>>,
}

impl TeardownRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, callback: TeardownFn) {
        self.callbacks.borrow_mut().push(callback);
    }

    /// Invoke every registered callback in registration order.
    ///
    /// There is no idempotency guard: calling this twice runs the
    /// callbacks twice.
    pub(crate) fn fire(&self) {
        for callback in self.callbacks.borrow().iter() {
            callback();
        }
    }
}

/// Environment handed to a card's `render`.
pub struct CardEnv {
    name: String,
    teardown: TeardownRegistry,
}

impl CardEnv {
    pub(crate) fn new(name: &str, teardown: TeardownRegistry) -> Self {
        Self {
            name: name.to_string(),
            teardown,
        }
    }

    /// Name the card was resolved under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Always false: this renderer never runs inside an editor.
    pub fn is_in_editor(&self) -> bool {
        false
    }

    /// Register a cleanup callback, fired when the caller tears down the
    /// render result.
    pub fn on_teardown(&self, callback: impl Fn() + 'static) {
        self.teardown.register(Box::new(callback));
    }
}

/// Environment handed to an atom's `render`.
pub struct AtomEnv {
    name: String,
    teardown: TeardownRegistry,
}

impl AtomEnv {
    pub(crate) fn new(name: &str, teardown: TeardownRegistry) -> Self {
        Self {
            name: name.to_string(),
            teardown,
        }
    }

    /// Name the atom was resolved under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a cleanup callback, fired when the caller tears down the
    /// render result.
    pub fn on_teardown(&self, callback: impl Fn() + 'static) {
        self.teardown.register(Box::new(callback));
    }
}

/// Argument bundle passed to a card's `render`.
pub struct CardArgs<'a> {
    /// Render environment (name, teardown hook).
    pub env: CardEnv,
    /// The opaque `card_options` value from the renderer configuration.
    pub options: &'a Value,
    /// The card's payload from the document.
    pub payload: &'a Value,
}

/// Argument bundle passed to an atom's `render`.
pub struct AtomArgs<'a> {
    /// Render environment (name, teardown hook).
    pub env: AtomEnv,
    /// The opaque `card_options` value from the renderer configuration.
    pub options: &'a Value,
    /// The atom's display value from the document's atoms table.
    pub value: &'a Value,
    /// The atom's payload from the document's atoms table.
    pub payload: &'a Value,
}

/// A block-level plugin, resolved by name from card sections.
///
/// Returning `Ok(None)` renders no content (the card's wrapper element is
/// still emitted, empty). Errors abort the whole render.
pub trait Card {
    /// Name card sections resolve this plugin by.
    fn name(&self) -> &str;

    /// Capability tag; must be [`RENDER_TYPE`]. Checked eagerly when the
    /// renderer is constructed.
    fn render_type(&self) -> &str {
        RENDER_TYPE
    }

    /// Render the card to Markdown.
    fn render(&self, args: CardArgs<'_>) -> Result<Option<String>>;
}

/// An inline plugin, resolved by index then name from atom markers
/// (schema 0.3.0).
///
/// Returning `Ok(None)` emits an empty text node in the atom's place.
pub trait Atom {
    /// Name atom markers resolve this plugin by.
    fn name(&self) -> &str;

    /// Capability tag; must be [`RENDER_TYPE`]. Checked eagerly when the
    /// renderer is constructed.
    fn render_type(&self) -> &str {
        RENDER_TYPE
    }

    /// Render the atom to Markdown.
    fn render(&self, args: AtomArgs<'_>) -> Result<Option<String>>;
}

/// Handler invoked for card names that resolve to no supplied card and not
/// to the built-in image card.
pub type UnknownCardHandler = Box<dyn Fn(CardArgs<'_>) -> Result<Option<String>>>;

/// Handler invoked for atom names that resolve to no supplied atom.
pub type UnknownAtomHandler = Box<dyn Fn(AtomArgs<'_>) -> Result<Option<String>>>;

/// The built-in image card.
///
/// Renders the payload's `src` field as a Markdown image, or nothing when
/// the payload has no `src`.
pub struct ImageCard;

/// Name the built-in image card resolves under.
pub const IMAGE_CARD_NAME: &str = "image-card";

impl Card for ImageCard {
    fn name(&self) -> &str {
        IMAGE_CARD_NAME
    }

    fn render(&self, args: CardArgs<'_>) -> Result<Option<String>> {
        match args.payload.get("src").and_then(Value::as_str) {
            Some(src) => Ok(Some(format!("![]({src})"))),
            None => Ok(None),
        }
    }
}
