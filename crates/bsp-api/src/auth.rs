use std::fmt;
use std::sync::Arc;

use secrecy::SecretString;
use url::Url;

use crate::error::Error;

/// Application credentials used to sign every BSP request.
///
/// Loaded once per process. `secret_key` keys the HMAC and never leaves the
/// process; `shared_key` is sent in the `Authorization` header alongside
/// the signature.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub app_key: String,
    pub secret_key: SecretString,
    pub shared_key: SecretString,
    pub organization: String,
}

/// Wire scheme for a server target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Http => "http",
            Self::Https => "https",
        })
    }
}

/// One logical BSP service endpoint plus the credentials to talk to it.
///
/// Cheap to clone: credentials sit behind an `Arc` so every domain client
/// can hold its own target without copying secret material around.
#[derive(Debug, Clone)]
pub struct ServerTarget {
    pub host: String,
    pub port: Option<u16>,
    /// `false` only when TLS was explicitly disabled.
    pub use_tls: bool,
    pub credentials: Arc<Credentials>,
}

impl ServerTarget {
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            port: None,
            use_tls: true,
            credentials: Arc::new(credentials),
        }
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn scheme(&self) -> Scheme {
        if self.use_tls {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }

    /// Build `scheme://host[:port]/resource`.
    ///
    /// `resource` is relative (no leading slash) and may carry a query string.
    pub fn url(&self, resource: &str) -> Result<Url, Error> {
        let resource = resource.trim_start_matches('/');
        let raw = match self.port {
            Some(port) => format!("{}://{}:{port}/{resource}", self.scheme(), self.host),
            None => format!("{}://{}/{resource}", self.scheme(), self.host),
        };
        Ok(Url::parse(&raw)?)
    }
}
