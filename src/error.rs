//! Error types for the mobiledoc-md library.

use thiserror::Error;

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while rendering a document.
///
/// Disallowed tag names are *not* errors: sections and markers with tags
/// outside the allowlists silently render nothing.
#[derive(Error, Debug)]
pub enum Error {
    /// The document's `version` field does not match a supported schema.
    #[error("unexpected Mobiledoc version {0}")]
    UnexpectedVersion(String),

    /// A section carries a discriminant the renderer does not know.
    #[error("renderer cannot render section type {0}")]
    UnknownSectionType(u64),

    /// A marker carries a discriminant the renderer does not know (0.3.0).
    #[error("unknown marker type {0}")]
    UnknownMarkerType(u64),

    /// A card section references an index past the end of the cards table.
    #[error("no card definition found at index {0}")]
    NoCardAtIndex(usize),

    /// An atom marker references an index past the end of the atoms table.
    #[error("no atom definition found at index {0}")]
    NoAtomAtIndex(usize),

    /// No card with this name was supplied and no unknown-card handler is
    /// configured.
    #[error("card \"{0}\" not found and no unknown card handler was registered")]
    CardNotFound(String),

    /// No atom with this name was supplied and no unknown-atom handler is
    /// configured.
    #[error("atom \"{0}\" not found and no unknown atom handler was registered")]
    AtomNotFound(String),

    /// A supplied card declares a capability other than "markdown".
    #[error("card \"{0}\" must be of type \"markdown\", was \"{1}\"")]
    InvalidCardType(String, String),

    /// A supplied atom declares a capability other than "markdown".
    #[error("atom \"{0}\" must be of type \"markdown\", was \"{1}\"")]
    InvalidAtomType(String, String),

    /// The document does not have the shape its schema version prescribes.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// Generic error with message, for failures raised by plugins.
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnexpectedVersion("\"0.2.1\"".to_string());
        assert_eq!(err.to_string(), "unexpected Mobiledoc version \"0.2.1\"");

        let err = Error::NoCardAtIndex(7);
        assert_eq!(err.to_string(), "no card definition found at index 7");

        let err = Error::CardNotFound("missing-card".to_string());
        assert_eq!(
            err.to_string(),
            "card \"missing-card\" not found and no unknown card handler was registered"
        );
    }

    #[test]
    fn test_plugin_shape_errors_name_the_plugin() {
        let err = Error::InvalidCardType("bad".to_string(), "html".to_string());
        assert_eq!(
            err.to_string(),
            "card \"bad\" must be of type \"markdown\", was \"html\""
        );
    }
}
