//! Command-line dispatch client.
//!
//! Performs exactly one dispatch call against whichever service (real or
//! fake) is registered at the well-known endpoint.
//!
//! # Usage
//!
//! ```bash
//! url-dispatcher http://example.com
//!
//! # Point at a non-default endpoint
//! url-dispatcher --endpoint 127.0.0.1:18520 test://testurl
//! ```
//!
//! Exits 0 when the dispatch was accepted, 1 otherwise.

use clap::Parser;

use urldispatch_client::UrlDispatchClient;
use urldispatch_core::endpoint;

#[derive(Parser)]
#[command(name = "url-dispatcher", about = "Dispatch a URL to the handling service")]
struct Args {
    /// URL to dispatch (any scheme).
    url: String,

    /// `host:port` of the dispatch service (defaults to the well-known
    /// address, honoring URL_DISPATCHER_ENDPOINT).
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let uri = match &args.endpoint {
        Some(authority) => endpoint::uri_from_authority(authority),
        None => endpoint::well_known_uri(),
    };

    let client = UrlDispatchClient::lazy(&uri);
    if let Err(e) = client.dispatch(&args.url).await {
        eprintln!("url-dispatcher: {e}");
        std::process::exit(1);
    }
}
