//! Incoming HTTP request type.

use std::collections::HashMap;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt, TryStreamExt, stream};
use http::HeaderMap;
use http_body_util::BodyExt;

use crate::method::Method;

/// A request body as a stream of chunks, straight off the connection.
///
/// Never collected by the framework. A handler that wants the bytes pulls
/// them itself, at whatever pace its sink allows.
pub type Body = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + 'static>>;

/// An incoming HTTP request, with its body still on the wire.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Body,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        headers: HeaderMap,
        body: Body,
        params: HashMap<String, String>,
    ) -> Self {
        Self { method, path, headers, body, params }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// Header lookup. Names are case-insensitive; non-ASCII values read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Takes the body stream, leaving an empty one behind.
    pub fn take_body(&mut self) -> Body {
        std::mem::replace(&mut self.body, Box::pin(stream::empty()))
    }
}

/// Adapts any `http_body::Body` into a [`Body`] stream of data frames.
///
/// Trailers are dropped. Transport errors surface as `io::Error`.
pub(crate) fn body_stream<B>(body: B) -> Body
where
    B: hyper::body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    body.into_data_stream().map_err(io::Error::other).boxed()
}
