use thiserror::Error;

/// Top-level error type for the `d42-api` crate.
///
/// Only failures of the HTTP exchange itself end up here. A response the
/// server managed to send is never turned into an error, whatever its
/// status code or body: callers get it back as an [`ApiResponse`](crate::ApiResponse).
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, TLS, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration error (unreadable or invalid CA certificate).
    #[error("TLS error: {0}")]
    Tls(String),
}

impl Error {
    /// Returns `true` if the request never reached the server.
    pub fn is_connect(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect(),
            _ => false,
        }
    }
}
