//! Well-known endpoint resolution.
//!
//! Real clients and the fake service both resolve the dispatcher at the
//! same fixed address, so an unmodified client transparently talks to
//! whichever implementation currently holds it. The address can be moved
//! with the `URL_DISPATCHER_ENDPOINT` env var (authority form, e.g.
//! `127.0.0.1:18520`).

pub const ENDPOINT_ENV: &str = "URL_DISPATCHER_ENDPOINT";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 18520;

/// The `host:port` authority clients and the service agree on.
pub fn well_known_authority() -> String {
    std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| format!("{DEFAULT_HOST}:{DEFAULT_PORT}"))
}

/// The well-known authority as an `http://` URI for tonic channels.
pub fn well_known_uri() -> String {
    uri_from_authority(&well_known_authority())
}

pub fn uri_from_authority(authority: &str) -> String {
    format!("http://{authority}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_prefixes_authority_with_scheme() {
        assert_eq!(uri_from_authority("127.0.0.1:18520"), "http://127.0.0.1:18520");
    }

    #[test]
    fn well_known_uri_uses_the_http_scheme() {
        assert!(well_known_uri().starts_with("http://"));
    }
}
