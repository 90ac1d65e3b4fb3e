//! Failure classification.
//!
//! Every request-level failure ends up in exactly one [`Category`], and the
//! category alone picks the status code. Errors opt in by implementing
//! [`Classify`].

use std::fmt;

use crate::status::Status;

/// The fixed set of outcome categories a handler can fail with.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Category {
    /// Malformed input the client can fix (400).
    BadRequest,
    /// Missing or wrong content-type framing (415).
    UnsupportedMedia,
    /// Well-typed media that does not yield a usable part (422).
    UnprocessableContent,
    /// I/O failure at the sink or the request stream (500).
    Internal,
}

impl Category {
    pub fn status(self) -> Status {
        match self {
            Self::BadRequest           => Status::BadRequest,
            Self::UnsupportedMedia     => Status::UnsupportedMediaType,
            Self::UnprocessableContent => Status::UnprocessableContent,
            Self::Internal             => Status::InternalServerError,
        }
    }
}

/// Maps an error to its outcome category.
///
/// Implementations must be total: every variant lands in some category, and
/// the same error always lands in the same one.
pub trait Classify: fmt::Display {
    fn category(&self) -> Category;
}

/// A classified, human-readable failure, ready to be encoded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Failure {
    category: Category,
    message: String,
}

impl Failure {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self { category, message: message.into() }
    }

    /// Classifies `err` and captures its display text as the message.
    pub fn classify<E: Classify + ?Sized>(err: &E) -> Self {
        Self::new(err.category(), err.to_string())
    }

    pub fn category(&self) -> Category { self.category }
    pub fn message(&self) -> &str { &self.message }
    pub fn status(&self) -> Status { self.category.status() }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Failure {}

/// Result of a decode or ingest step, threaded through to the encoder.
pub type Outcome<T> = Result<T, Failure>;
