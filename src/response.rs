//! Outgoing HTTP response type, the [`IntoResponse`] conversion trait, and
//! the JSON envelope encoder.
//!
//! Successes are serialized verbatim. Failures always look the same on the
//! wire: `{"message": "..."}` with a status picked by the failure's
//! [`Category`](crate::Category).

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http_body_util::Full;
use serde::Serialize;
use tracing::warn;

use crate::outcome::{Category, Failure, Outcome};
use crate::status::Status;

const JSON: &str = "application/json";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use httpcmp::{Response, Status};
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(Status::NotFound);
///
/// Response::builder()
///     .status(Status::BadRequest)
///     .header("x-request-id", "42")
///     .json(br#"{"message":"nope"}"#.to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: Status,
}

impl Response {
    /// `200 OK`, `application/json`.
    pub fn json(body: Vec<u8>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self { body: Vec::new(), headers: Vec::new(), status: code }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok }
    }

    pub fn status_code(&self) -> Status { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Converts into the `http` response hyper writes to the wire.
    ///
    /// Headers that are not valid HTTP are dropped with a warning.
    pub fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = self.status.into();

        let headers = res.headers_mut();
        for (name, value) in self.headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Headers are settled before a terminating body method is called, so
/// nothing can alter them once the body exists.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: Status,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Removes every header named `name`, ignoring case.
    pub fn remove_header(mut self, name: &str) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish(JSON, body)
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish("text/plain; charset=utf-8", body.into().into_bytes())
    }

    /// Terminate with the `{"message": ...}` error envelope.
    ///
    /// Any `content-length` set so far is dropped, since it described a
    /// different body, and `x-content-type-options: nosniff` is added before
    /// the body is attached.
    pub fn error(self, status: Status, message: &str) -> Response {
        // `{"message": <str>}` always serializes
        let body = serde_json::to_vec(&ErrorBody { message }).unwrap_or_default();

        self.status(status)
            .remove_header("content-length")
            .header("x-content-type-options", "nosniff")
            .json(body)
    }

    fn finish(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── Encoder ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

/// Encodes an outcome as a JSON response.
///
/// A success is serialized as-is with `status`. A failure becomes
/// `{"message": ...}` with the status of its category, and `status` is
/// ignored.
pub fn encode<T: Serialize>(outcome: Outcome<T>, status: Status) -> Response {
    match outcome {
        Ok(value) => encode_success(&value, status),
        Err(failure) => encode_failure(&failure),
    }
}

fn encode_success<T: Serialize + ?Sized>(value: &T, status: Status) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => Response::builder().status(status).json(body),
        Err(e) => encode_failure(&Failure::new(
            Category::Internal,
            format!("encoding response: {e}"),
        )),
    }
}

fn encode_failure(failure: &Failure) -> Response {
    error_envelope(failure.status(), failure.message())
}

/// `{"message": ...}` with `status`. Also used for routing misses.
pub(crate) fn error_envelope(status: Status, message: &str) -> Response {
    Response::builder().error(status, message)
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

/// A `200 OK` JSON body from any `Serialize` value.
///
/// ```rust
/// use httpcmp::{Json, Request};
///
/// #[derive(serde::Serialize)]
/// struct Pong { value: &'static str }
///
/// async fn ping(_req: Request) -> Json<Pong> {
///     Json(Pong { value: "pong" })
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response { encode_success(&self.0, Status::Ok) }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response { encode_failure(&self) }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(v) => v.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a [`Status`] directly from a handler: `return Status::NotFound`
impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}
