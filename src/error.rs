//! Error types.
//!
//! Three families are kept apart:
//! - [`ArgumentError`] – a caller handed in something invalid (bad identifier,
//!   out-of-range index).
//! - [`CompositionError`] – an attach/remove would break the entity's
//!   required/incompatible component rules.
//! - [`SerializeError`] – a binary stream or XML document could not be read or
//!   written.

use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::components::ComponentKind;

/// Invalid caller-supplied argument.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    /// Identifier is empty or only whitespace.
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// Index past the end of a sequence.
    #[error("index {index} out of range (count is {count})")]
    OutOfRange { index: usize, count: usize },

    /// A sibling already uses this identifier.
    #[error("duplicate child id '{0}'")]
    DuplicateIdentifier(String),

    /// No child with this identifier.
    #[error("no child entity '{0}'")]
    UnknownChild(String),

    /// Children are renamed through their parent.
    #[error("'{0}' is a child entity, rename it with rename_child on its parent")]
    ChildRename(String),
}

/// Entity composition failure. The entity is left unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositionError {
    /// A component of this kind is already attached and replace was not requested.
    #[error("Failed: Unable to add {0}, it is already attached")]
    AlreadyAttached(ComponentKind),

    /// The requested kind conflicts with a kind on the entity.
    #[error("Failed: Unable to add {kind}, it is incompatible with {conflicts_with}")]
    Incompatible {
        kind: ComponentKind,
        conflicts_with: ComponentKind,
    },

    /// A required component could not be added alongside the requested kind.
    #[error("Failed: Unable to add {kind}, its requirement {requires} cannot be satisfied")]
    Unsatisfiable {
        kind: ComponentKind,
        requires: ComponentKind,
    },

    /// Another attached component depends on the one being removed.
    #[error("Failed: Unable to remove {kind}, it is required by {required_by}")]
    RequiredBy {
        kind: ComponentKind,
        required_by: ComponentKind,
    },

    /// No component of this kind is attached.
    #[error("{0} is not attached")]
    NotAttached(ComponentKind),
}

/// Binary stream or XML (de)serialization failure.
#[derive(Error, Debug)]
pub enum SerializeError {
    #[error("stream error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid UTF-8 string in stream: {0}")]
    Utf8(#[from] FromUtf8Error),

    #[error("xml parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("unexpected element <{found}>, expected <{expected}>")]
    UnexpectedElement { expected: String, found: String },

    #[error("missing element <{child}> in <{parent}>")]
    MissingElement { parent: String, child: String },

    #[error("missing attribute '{attribute}' on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    #[error("Failed: Incorrect value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },

    #[error("unknown component '{0}'")]
    UnknownComponent(String),

    #[error("invalid data: {0}")]
    Invalid(String),

    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Composition(#[from] CompositionError),
}

impl SerializeError {
    /// Build a [`SerializeError::Invalid`] value.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Convenience result type for serialization.
pub type SerializeResult<T> = Result<T, SerializeError>;
