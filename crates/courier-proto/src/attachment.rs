//! Attachment metadata.
//!
//! An attachment is either a [`AttachmentStream`] (local bytes that have not
//! been uploaded yet) or an [`AttachmentPointer`] (a reference to bytes the
//! server already holds). The two are mutually exclusive, so [`Attachment`] is
//! a closed enum and callers narrow it with [`Attachment::as_stream`] /
//! [`Attachment::as_pointer`] or by matching.
//!
//! # Ownership
//!
//! A stream owns its data handle. The handle moves into the attachment at
//! `build()` and out again through [`AttachmentStream::into_data`] when the
//! transport uploads it. The progress listener is shared: this crate stores it
//! and hands it to the transport, but never calls it.

use std::{fmt, io::Read, sync::Arc};

use bytes::Bytes;
use tracing::{debug, trace};

use crate::errors::{AttachmentError, ValidationError};

/// Readable handle over the bytes of a stream attachment.
pub type DataSource = Box<dyn Read + Send + Sync>;

/// Receives upload or download progress for an attachment.
///
/// Invoked by the transport at arbitrary times during a transfer. No ordering
/// or delivery guarantee is made beyond what the transport provides.
pub trait ProgressListener: Send + Sync {
    /// Called on a progress change.
    ///
    /// `total` is the number of bytes to transfer, `progress` the number of
    /// bytes transferred so far.
    fn on_progress(&self, total: u64, progress: u64);
}

impl<F> ProgressListener for F
where
    F: Fn(u64, u64) + Send + Sync,
{
    fn on_progress(&self, total: u64, progress: u64) {
        self(total, progress);
    }
}

/// Which variant an [`Attachment`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    /// Local data, not yet transmitted
    Stream,
    /// Reference to already transmitted data
    Pointer,
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream => f.write_str("stream"),
            Self::Pointer => f.write_str("pointer"),
        }
    }
}

/// Binary payload associated with a message.
#[derive(Debug)]
pub enum Attachment {
    /// Local data to be uploaded
    Stream(AttachmentStream),
    /// Previously uploaded data
    Pointer(AttachmentPointer),
}

impl Attachment {
    /// Start building a stream attachment.
    pub fn stream_builder() -> AttachmentStreamBuilder {
        AttachmentStreamBuilder::default()
    }

    /// MIME content type
    pub fn content_type(&self) -> &str {
        match self {
            Self::Stream(stream) => stream.content_type(),
            Self::Pointer(pointer) => pointer.content_type(),
        }
    }

    /// Original filename, if one was given
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Stream(stream) => stream.filename(),
            Self::Pointer(pointer) => pointer.filename(),
        }
    }

    /// Variant held by this attachment
    pub fn kind(&self) -> AttachmentKind {
        match self {
            Self::Stream(_) => AttachmentKind::Stream,
            Self::Pointer(_) => AttachmentKind::Pointer,
        }
    }

    /// True if this is local data awaiting upload
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// True if this references uploaded data
    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointer(_))
    }

    /// Narrow to the stream variant.
    ///
    /// # Errors
    ///
    /// `VariantMismatch` if this attachment is a pointer.
    pub fn as_stream(&self) -> Result<&AttachmentStream, AttachmentError> {
        match self {
            Self::Stream(stream) => Ok(stream),
            Self::Pointer(_) => Err(mismatch(AttachmentKind::Stream, AttachmentKind::Pointer)),
        }
    }

    /// Narrow to the stream variant for reading its data in place.
    ///
    /// # Errors
    ///
    /// `VariantMismatch` if this attachment is a pointer.
    pub fn as_stream_mut(&mut self) -> Result<&mut AttachmentStream, AttachmentError> {
        match self {
            Self::Stream(stream) => Ok(stream),
            Self::Pointer(_) => Err(mismatch(AttachmentKind::Stream, AttachmentKind::Pointer)),
        }
    }

    /// Narrow to the pointer variant.
    ///
    /// # Errors
    ///
    /// `VariantMismatch` if this attachment is a stream.
    pub fn as_pointer(&self) -> Result<&AttachmentPointer, AttachmentError> {
        match self {
            Self::Pointer(pointer) => Ok(pointer),
            Self::Stream(_) => Err(mismatch(AttachmentKind::Pointer, AttachmentKind::Stream)),
        }
    }

    /// Consume into the stream variant.
    ///
    /// # Errors
    ///
    /// `VariantMismatch` if this attachment is a pointer.
    pub fn into_stream(self) -> Result<AttachmentStream, AttachmentError> {
        match self {
            Self::Stream(stream) => Ok(stream),
            Self::Pointer(_) => Err(mismatch(AttachmentKind::Stream, AttachmentKind::Pointer)),
        }
    }

    /// Consume into the pointer variant.
    ///
    /// # Errors
    ///
    /// `VariantMismatch` if this attachment is a stream.
    pub fn into_pointer(self) -> Result<AttachmentPointer, AttachmentError> {
        match self {
            Self::Pointer(pointer) => Ok(pointer),
            Self::Stream(_) => Err(mismatch(AttachmentKind::Pointer, AttachmentKind::Stream)),
        }
    }
}

fn mismatch(expected: AttachmentKind, found: AttachmentKind) -> AttachmentError {
    AttachmentError::VariantMismatch { expected, found }
}

impl From<AttachmentStream> for Attachment {
    fn from(stream: AttachmentStream) -> Self {
        Self::Stream(stream)
    }
}

impl From<AttachmentPointer> for Attachment {
    fn from(pointer: AttachmentPointer) -> Self {
        Self::Pointer(pointer)
    }
}

/// Local attachment data that has not been transmitted yet.
///
/// Only constructed through [`AttachmentStreamBuilder::build`], so the content
/// type is always non-empty and the length always non-zero.
pub struct AttachmentStream {
    data: DataSource,
    content_type: String,
    filename: Option<String>,
    length: u64,
    listener: Option<Arc<dyn ProgressListener>>,
}

impl AttachmentStream {
    /// MIME content type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Original filename, if one was given
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Number of bytes the data handle yields
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Listener the transport should report progress to
    pub fn progress_listener(&self) -> Option<&Arc<dyn ProgressListener>> {
        self.listener.as_ref()
    }

    /// Borrow the data handle for reading.
    pub fn data_mut(&mut self) -> &mut DataSource {
        &mut self.data
    }

    /// Take ownership of the data handle.
    pub fn into_data(self) -> DataSource {
        self.data
    }
}

impl fmt::Debug for AttachmentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentStream")
            .field("content_type", &self.content_type)
            .field("filename", &self.filename)
            .field("length", &self.length)
            .field("has_listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

/// Reference to attachment data already held by the server.
///
/// Pointers arrive fully formed from the layer that uploaded or received the
/// attachment. This crate does not validate them.
#[derive(Clone, PartialEq, Eq)]
pub struct AttachmentPointer {
    id: u64,
    key: Bytes,
    content_type: String,
    filename: Option<String>,
    size: Option<u32>,
    digest: Option<Bytes>,
}

impl AttachmentPointer {
    /// Create a pointer to the uploaded blob `id`, decryptable with `key`.
    pub fn new(id: u64, key: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
            content_type: content_type.into(),
            filename: None,
            size: None,
            digest: None,
        }
    }

    /// Set the original filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the plaintext size in bytes.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the digest of the encrypted blob.
    pub fn with_digest(mut self, digest: impl Into<Bytes>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    /// Server-assigned blob id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Key material for decrypting the blob
    pub fn key(&self) -> &Bytes {
        &self.key
    }

    /// MIME content type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Original filename, if known
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Plaintext size, if known
    pub fn size(&self) -> Option<u32> {
        self.size
    }

    /// Digest of the encrypted blob, if known
    pub fn digest(&self) -> Option<&Bytes> {
        self.digest.as_ref()
    }
}

impl fmt::Debug for AttachmentPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentPointer")
            .field("id", &self.id)
            .field("content_type", &self.content_type)
            .field("filename", &self.filename)
            .field("size", &self.size)
            .field("digest", &self.digest.as_ref().map(hex::encode))
            .finish_non_exhaustive()
    }
}

/// Builder for [`AttachmentStream`].
///
/// Setters can be called in any order. Nothing is checked until
/// [`build`](Self::build), which either returns a complete stream or the
/// first missing field.
#[derive(Default)]
pub struct AttachmentStreamBuilder {
    data: Option<DataSource>,
    content_type: Option<String>,
    filename: Option<String>,
    length: u64,
    listener: Option<Arc<dyn ProgressListener>>,
}

impl AttachmentStreamBuilder {
    /// Set the data handle. Ownership moves to the built attachment.
    pub fn with_stream(mut self, data: impl Read + Send + Sync + 'static) -> Self {
        self.data = Some(Box::new(data));
        self
    }

    /// Set the MIME content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the original filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the number of bytes the data handle yields.
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = length;
        self
    }

    /// Set the listener the transport reports progress to.
    pub fn with_listener(mut self, listener: Arc<dyn ProgressListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Validate and build the stream attachment.
    ///
    /// The filename is optional. Everything else is required.
    ///
    /// # Errors
    ///
    /// - `MissingDataSource` if no data handle was set
    /// - `MissingContentType` if the content type is unset or empty
    /// - `MissingLength` if the length is zero
    pub fn build(self) -> Result<AttachmentStream, ValidationError> {
        let result = self.validate();
        match &result {
            Ok(stream) => trace!(length = stream.length, "built stream attachment"),
            Err(error) => debug!(%error, "rejected stream attachment"),
        }
        result
    }

    fn validate(self) -> Result<AttachmentStream, ValidationError> {
        let Some(data) = self.data else {
            return Err(ValidationError::MissingDataSource);
        };

        let content_type = match self.content_type {
            Some(content_type) if !content_type.is_empty() => content_type,
            _ => return Err(ValidationError::MissingContentType),
        };

        if self.length == 0 {
            return Err(ValidationError::MissingLength);
        }

        Ok(AttachmentStream {
            data,
            content_type,
            filename: self.filename,
            length: self.length,
            listener: self.listener,
        })
    }
}
