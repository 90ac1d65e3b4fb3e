//! Runs the service.
//!
//! Run with:
//!   HTTPCMP_LISTEN=127.0.0.1:3000 cargo run --example serve
//!
//! Try:
//!   curl http://localhost:3000/ping
//!   curl http://localhost:3000/users/1/books/2
//!   curl -F file=@Cargo.toml http://localhost:3000/upload

use httpcmp::{Config, Server, routes};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), httpcmp::Error> {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    Server::from_config(&config)?.serve(routes::app()).await
}
