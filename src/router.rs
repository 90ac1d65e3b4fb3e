//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::Full;
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::{Request, body_stream};
use crate::response::{Response, error_envelope};
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Each [`Router::on`] call returns `self` so registrations chain.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use httpcmp::{Method, Request, Response, Router};
    /// # async fn user_book(_: Request) -> Response { Response::text("") }
    /// # async fn upload(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get,  "/users/{user}/books/{book}", user_book)
    ///     .on(Method::Post, "/upload",                    upload);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not valid route syntax or conflicts with an
    /// existing route for the same method.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    fn matches_other_method(&self, method: Method, path: &str) -> bool {
        self.routes
            .iter()
            .any(|(m, tree)| *m != method && tree.at(path).is_ok())
    }

    /// Routes one request and produces one response.
    ///
    /// Works for any body type, so the same router serves hyper connections
    /// and in-process callers alike. Routing misses never reach a handler:
    /// `404` for an unknown path, `405` for a known path under another method
    /// or for a method outside RFC 9110.
    pub async fn dispatch<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<Box<dyn StdError + Send + Sync>>,
    {
        let started = Instant::now();
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_owned();

        let response = match Method::try_from(&parts.method) {
            Err(()) => method_not_allowed(),
            Ok(method) => match self.lookup(method, &path) {
                Some((handler, params)) => {
                    let req = Request::new(method, path.clone(), parts.headers, body_stream(body), params);
                    handler.call(req).await
                }
                None if self.matches_other_method(method, &path) => method_not_allowed(),
                None => routing_miss(Status::NotFound),
            },
        };

        debug!(
            method = %parts.method,
            path = %path,
            status = response.status_code().code(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "request",
        );

        response.into_inner()
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

fn method_not_allowed() -> Response {
    routing_miss(Status::MethodNotAllowed)
}

/// Envelope whose message is the status's reason phrase.
fn routing_miss(status: Status) -> Response {
    error_envelope(status, status.reason())
}
