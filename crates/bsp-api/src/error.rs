use thiserror::Error;

/// Top-level error type for the `bsp-api` crate.
///
/// Covers every failure mode of a signed BSP request: building the
/// request, moving it over the wire, and decoding what came back.
/// `bsp-core` wraps these into workflow-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Remote ──────────────────────────────────────────────────────
    /// Non-2xx response. `body` is the raw payload, kept verbatim so callers
    /// can log exactly what the service said.
    #[error("BSP API error (HTTP {status}): {}", preview(.body))]
    Api { status: u16, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A header value could not be encoded (non-visible ASCII in a credential
    /// or caller-supplied header).
    #[error("Invalid header value for {name}")]
    InvalidHeader { name: String },

    /// TLS or client-construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// Request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

fn preview(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map_or(body.len(), |(idx, _)| idx);
    &body[..end]
}

impl Error {
    /// HTTP status of a remote rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for HTTP 403 -- the caller lacks permission.
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    /// Returns `true` for HTTP 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Raw response body carried by the error, if any.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Api { body, .. } | Self::Deserialization { body, .. } => Some(body),
            _ => None,
        }
    }
}
