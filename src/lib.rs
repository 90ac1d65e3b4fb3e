//! # httpcmp
//!
//! A minimal HTTP service with a streaming upload core.
//!
//! Three endpoints: a health check, a path-parameter echo, and a single-file
//! multipart upload that never holds the whole body in memory. Everything
//! else is the thinnest framework that can carry them: radix routing,
//! type-erased async handlers, graceful shutdown on hyper.
//!
//! ## The upload path
//!
//! [`multipart::ingest`] resolves the boundary from `content-type`, opens
//! the first part, and forwards each chunk to a caller-supplied sink as soon
//! as it arrives. Every failure lands in one of four [`Category`] values,
//! and [`response::encode`] turns that into a status and a
//! `{"message": ...}` body:
//!
//! | Category | Status | Raised when |
//! |---|---|---|
//! | `BadRequest` | 400 | a path segment does not parse |
//! | `UnsupportedMedia` | 415 | no content-type, not multipart, no boundary |
//! | `UnprocessableContent` | 422 | no part, or broken framing before it |
//! | `Internal` | 500 | the stream or the sink fails mid-copy |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use httpcmp::{Config, Server, routes};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), httpcmp::Error> {
//!     let config = Config::from_env();
//!     Server::from_config(&config)?.serve(routes::app()).await
//! }
//! ```

mod config;
mod error;
mod handler;
mod method;
mod outcome;
mod request;
mod router;
mod server;
mod status;

pub mod multipart;
pub mod params;
pub mod response;
pub mod routes;

pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use outcome::{Category, Classify, Failure, Outcome};
pub use request::{Body, Request};
pub use response::{IntoResponse, Json, Response};
pub use router::Router;
pub use server::Server;
pub use status::Status;
