//! Error types for payload metadata construction.
//!
//! Two failure classes exist. [`ValidationError`] is returned by a builder's
//! `build()` when a required field is missing or a type-specific invariant is
//! violated. [`AttachmentError`] is returned when an [`crate::Attachment`] is
//! narrowed to the variant it does not hold.

use thiserror::Error;

use crate::attachment::AttachmentKind;

/// Result alias for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// A builder rejected its accumulated fields.
///
/// Nothing is partially built on failure. The caller fixes the input and
/// builds again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Stream attachment built without a data handle
    #[error("missing data source")]
    MissingDataSource,

    /// Stream attachment built without a content type
    #[error("missing content type")]
    MissingContentType,

    /// Stream attachment built with a zero length
    #[error("missing length")]
    MissingLength,

    /// Group context built without a group id
    #[error("missing group id")]
    MissingGroupId,

    /// UPDATE group context that changes nothing
    #[error("empty update")]
    EmptyUpdate,
}

/// Errors from narrowing an attachment to a concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AttachmentError {
    /// The attachment holds a different variant than requested
    #[error("variant mismatch: expected {expected}, found {found}")]
    VariantMismatch {
        /// Variant the caller asked for
        expected: AttachmentKind,
        /// Variant the attachment actually holds
        found: AttachmentKind,
    },
}

/// Umbrella error for callers that handle both failure classes together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Builder validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Attachment narrowed to the wrong variant
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}
