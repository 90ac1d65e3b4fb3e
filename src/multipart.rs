//! Streaming single-file multipart ingestion.
//!
//! [`ingest`] takes the request headers and the raw body stream, opens the
//! first part of a `multipart/form-data` or `multipart/mixed` body, and
//! forwards its bytes to a sink chunk by chunk. Nothing is buffered beyond
//! what the multipart parser needs to find the next boundary.
//!
//! Only the first part is read. Anything after it is left in the stream and
//! dropped with it.
//!
//! ```rust,no_run
//! # async fn demo(headers: http::HeaderMap, body: httpcmp::Body) {
//! let mut sink = tokio::io::sink();
//! match httpcmp::multipart::ingest(&headers, body, &mut sink).await {
//!     Ok(n) => println!("{n} bytes"),
//!     Err(e) => println!("{e}"),
//! }
//! # }
//! ```

use std::io;

use bytes::Bytes;
use futures_util::Stream;
use http::HeaderMap;
use http::header::CONTENT_TYPE;
use mime::Mime;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::outcome::{Category, Classify, Failure};

/// Why a multipart upload could not be ingested.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("request Content-Type is missing")]
    MissingContentType,

    #[error("request Content-Type isn't multipart/form-data or multipart/mixed")]
    NotMultipart,

    #[error("no multipart boundary param in Content-Type")]
    MissingBoundary,

    /// Empty, longer than 70 bytes, or outside the RFC 2046 `bchars` set.
    #[error("invalid multipart boundary {0:?} in Content-Type")]
    InvalidBoundary(String),

    #[error("multipart body contains no parts")]
    NoPart,

    /// Framing broke before the first part could be opened.
    #[error("malformed multipart body: {0}")]
    Malformed(#[source] multer::Error),

    /// The request stream failed, or ended early, while the part was copied.
    #[error("reading part: {0}")]
    Read(#[source] multer::Error),

    #[error("writing to sink: {0}")]
    Sink(#[source] io::Error),
}

impl Classify for IngestError {
    fn category(&self) -> Category {
        match self {
            Self::MissingContentType
            | Self::NotMultipart
            | Self::MissingBoundary
            | Self::InvalidBoundary(_) => Category::UnsupportedMedia,
            Self::NoPart | Self::Malformed(_) => Category::UnprocessableContent,
            Self::Read(_) | Self::Sink(_) => Category::Internal,
        }
    }
}

impl From<IngestError> for Failure {
    fn from(err: IngestError) -> Self {
        Failure::classify(&err)
    }
}

/// Extracts the multipart boundary from the request's `content-type`.
pub fn boundary(headers: &HeaderMap) -> Result<String, IngestError> {
    let value = headers
        .get(CONTENT_TYPE)
        .ok_or(IngestError::MissingContentType)?;

    let media: Mime = value
        .to_str()
        .ok()
        .and_then(|v| v.parse().ok())
        .ok_or(IngestError::NotMultipart)?;

    let is_multipart = media.type_() == mime::MULTIPART
        && (media.subtype() == mime::FORM_DATA || media.subtype() == "mixed");
    if !is_multipart {
        return Err(IngestError::NotMultipart);
    }

    let boundary = media
        .get_param(mime::BOUNDARY)
        .ok_or(IngestError::MissingBoundary)?
        .as_str();

    if !is_valid_boundary(boundary) {
        return Err(IngestError::InvalidBoundary(boundary.to_owned()));
    }
    Ok(boundary.to_owned())
}

const MAX_BOUNDARY_LEN: usize = 70;

/// RFC 2046 §5.1.1: 1 to 70 `bchars`, not ending in a space.
fn is_valid_boundary(boundary: &str) -> bool {
    let bchar = |b: u8| b.is_ascii_alphanumeric() || b"'()+_,-./:=? ".contains(&b);

    (1..=MAX_BOUNDARY_LEN).contains(&boundary.len())
        && boundary.bytes().all(bchar)
        && !boundary.ends_with(' ')
}

/// Streams the first part of a multipart `body` into `sink`.
///
/// Returns the number of bytes written. Bytes already handed to the sink
/// stay there if a later read or write fails.
pub async fn ingest<S, W>(headers: &HeaderMap, body: S, sink: &mut W) -> Result<u64, IngestError>
where
    S: Stream<Item = io::Result<Bytes>> + Send,
    W: AsyncWrite + Unpin + ?Sized,
{
    let boundary = boundary(headers)?;
    let mut reader = multer::Multipart::new(body, boundary);

    let field = reader
        .next_field()
        .await
        .map_err(IngestError::Malformed)?
        .ok_or(IngestError::NoPart)?;

    let mut part = OpenPart::new(field);
    part.copy_to(sink).await
}

/// An opened part. Released when dropped, drained or not.
struct OpenPart<'r> {
    field: multer::Field<'r>,
    written: u64,
    drained: bool,
}

impl<'r> OpenPart<'r> {
    fn new(field: multer::Field<'r>) -> Self {
        debug!(name = field.name(), file_name = field.file_name(), "part opened");
        Self { field, written: 0, drained: false }
    }

    async fn copy_to<W>(&mut self, sink: &mut W) -> Result<u64, IngestError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        while let Some(chunk) = self.field.chunk().await.map_err(IngestError::Read)? {
            sink.write_all(&chunk).await.map_err(IngestError::Sink)?;
            self.written += chunk.len() as u64;
        }
        self.drained = true;

        sink.flush().await.map_err(IngestError::Sink)?;
        Ok(self.written)
    }
}

impl Drop for OpenPart<'_> {
    fn drop(&mut self) {
        if self.drained {
            debug!(bytes = self.written, "part released");
        } else {
            warn!(bytes = self.written, "part abandoned before EOF");
        }
    }
}
