//! The service's three endpoints.
//!
//! | Method | Path | Response |
//! |---|---|---|
//! | `GET` | `/ping` | `{"value":"pong"}` |
//! | `GET` | `/users/{user}/books/{book}` | `{"user":<int>,"book":<int>}` or 400 |
//! | `POST` | `/upload` | `{"bytesWritten":<int>}` or 415 / 422 / 500 |
//!
//! [`app`] wires them with a discarding sink. Build your own router with
//! [`upload`] to send uploads somewhere real:
//!
//! ```rust,no_run
//! use httpcmp::{Method, Router, routes};
//!
//! let app = Router::new()
//!     .on(Method::Get,  "/ping",   routes::ping)
//!     .on(Method::Post, "/upload", routes::upload(tokio::io::stderr));
//! ```

use serde::Serialize;
use tokio::io::AsyncWrite;

use crate::handler::Handler;
use crate::method::Method;
use crate::multipart;
use crate::outcome::Outcome;
use crate::params;
use crate::request::Request;
use crate::response::Json;
use crate::router::Router;

#[derive(Debug, Serialize)]
pub struct Pong {
    pub value: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserBook {
    pub user: i64,
    pub book: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Uploaded {
    pub bytes_written: u64,
}

/// The full service, with uploads discarded.
pub fn app() -> Router {
    Router::new()
        .on(Method::Get,  "/ping",                      ping)
        .on(Method::Get,  "/users/{user}/books/{book}", user_book)
        .on(Method::Post, "/upload",                    upload(tokio::io::sink))
}

/// Liveness check. No dependencies, always `200 OK`.
pub async fn ping(_req: Request) -> Json<Pong> {
    Json(Pong { value: "pong" })
}

/// Echoes both path segments back as integers.
pub async fn user_book(req: Request) -> Outcome<Json<UserBook>> {
    let [user, book] = params::decode(req.params(), ["user", "book"])?;
    Ok(Json(UserBook { user, book }))
}

/// Streams the first part of a multipart body into a fresh sink per request.
pub fn upload<F, W>(make_sink: F) -> impl Handler
where
    F: Fn() -> W + Send + Sync + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    move |mut req: Request| {
        let mut sink = make_sink();
        async move {
            let body = req.take_body();
            let bytes_written = multipart::ingest(req.headers(), body, &mut sink).await?;
            Outcome::Ok(Json(Uploaded { bytes_written }))
        }
    }
}
