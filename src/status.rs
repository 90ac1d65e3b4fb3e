//! HTTP status codes as a typed enum.
//!
//! Only the codes the service can actually produce. Anything that reaches a
//! client goes through one of these.
//!
//! ```rust
//! use httpcmp::{Response, Status};
//!
//! Response::status(Status::NotFound);
//!
//! async fn reject(_req: httpcmp::Request) -> Status {
//!     Status::BadRequest
//! }
//! ```

/// The status codes httpcmp emits.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                            // 200

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,                    // 400
    NotFound,                      // 404
    MethodNotAllowed,              // 405
    UnsupportedMediaType,          // 415
    UnprocessableContent,          // 422

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,           // 500
}

impl Status {
    /// Numeric code, e.g. `415`.
    pub fn code(self) -> u16 {
        self.into()
    }

    /// Canonical reason phrase, e.g. `"Unsupported Media Type"`.
    pub fn reason(self) -> &'static str {
        match self {
            Self::Ok                   => "OK",
            Self::BadRequest           => "Bad Request",
            Self::NotFound             => "Not Found",
            Self::MethodNotAllowed     => "Method Not Allowed",
            Self::UnsupportedMediaType => "Unsupported Media Type",
            Self::UnprocessableContent => "Unprocessable Content",
            Self::InternalServerError  => "Internal Server Error",
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                   => 200,
            Status::BadRequest           => 400,
            Status::NotFound             => 404,
            Status::MethodNotAllowed     => 405,
            Status::UnsupportedMediaType => 415,
            Status::UnprocessableContent => 422,
            Status::InternalServerError  => 500,
        }
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> Self {
        match s {
            Status::Ok                   => Self::OK,
            Status::BadRequest           => Self::BAD_REQUEST,
            Status::NotFound             => Self::NOT_FOUND,
            Status::MethodNotAllowed     => Self::METHOD_NOT_ALLOWED,
            Status::UnsupportedMediaType => Self::UNSUPPORTED_MEDIA_TYPE,
            Status::UnprocessableContent => Self::UNPROCESSABLE_ENTITY,
            Status::InternalServerError  => Self::INTERNAL_SERVER_ERROR,
        }
    }
}
