//! Payload metadata for the Courier messaging protocol.
//!
//! Messages can carry two kinds of metadata besides their body: attachments
//! and a group context. This crate holds the value types for both and the
//! builders that enforce which field combinations are legal. Encoding them
//! into the message envelope, moving attachment bytes and encrypting them all
//! happen in other layers.
//!
//! # Components
//!
//! - [`attachment`]: [`Attachment`] (stream or pointer) and its stream builder
//! - [`group`]: [`GroupContext`], [`GroupType`] and the validating builder
//! - [`errors`]: validation and variant-mismatch errors
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//!
//! use courier_proto::{Attachment, GroupContext};
//!
//! let avatar = Attachment::stream_builder()
//!     .with_stream(Cursor::new(vec![0x89, 0x50, 0x4e, 0x47]))
//!     .with_content_type("image/png")
//!     .with_length(4)
//!     .build()?;
//!
//! let context = GroupContext::update_builder()
//!     .with_id(vec![1, 2, 3])
//!     .with_name("Team")
//!     .with_avatar(avatar)
//!     .build()?;
//!
//! assert!(context.avatar().is_some_and(Attachment::is_stream));
//! # Ok::<(), courier_proto::ProtocolError>(())
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod attachment;
pub mod errors;
pub mod group;

pub use attachment::{
    Attachment, AttachmentKind, AttachmentPointer, AttachmentStream, AttachmentStreamBuilder,
    DataSource, ProgressListener,
};
pub use errors::{AttachmentError, ProtocolError, Result, ValidationError};
pub use group::{GroupContext, GroupContextBuilder, GroupType};
