// Signed HTTP client shared by every BSP service.
//
// Each call gets a fresh correlation id and `Date`, is signed over the exact
// path+query that goes on the wire, and returns either the decoded body or
// the remote rejection with its raw payload. No retries happen here.

use chrono::Utc;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, DATE, HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Position;
use uuid::Uuid;

use crate::auth::ServerTarget;
use crate::error::Error;
use crate::signing;
use crate::transport::TransportConfig;

pub(crate) const APPLICATION_KEY: &str = "nep-application-key";
pub(crate) const CORRELATION_ID: &str = "nep-correlation-id";
pub(crate) const ORGANIZATION: &str = "nep-organization";
pub(crate) const SERVICE_VERSION: &str = "nep-service-version";

/// HTTP verbs the BSP services accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
            Method::Head => Self::HEAD,
        }
    }
}

/// Signed transport bound to one [`ServerTarget`].
///
/// Clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct BspClient {
    http: reqwest::Client,
    target: ServerTarget,
}

impl BspClient {
    /// Build a client for `target` using the shared transport settings.
    pub fn new(target: ServerTarget, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            target,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, target: ServerTarget) -> Self {
        Self { http, target }
    }

    pub fn target(&self) -> &ServerTarget {
        &self.target
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Sign and send one request.
    ///
    /// `headers` are merged over the signed defaults, so a caller-supplied
    /// value wins on conflict. Non-2xx responses become [`Error::Api`].
    pub async fn send(
        &self,
        method: Method,
        resource: &str,
        body: Option<Vec<u8>>,
        headers: &HeaderMap,
    ) -> Result<reqwest::Response, Error> {
        let url = self.target.url(resource)?;
        let now = Utc::now();
        let correlation_id = Uuid::new_v4().to_string();
        let credentials = &self.target.credentials;

        let mut signed = HeaderMap::new();
        signed.insert(ACCEPT, HeaderValue::from_static("application/json"));
        signed.insert(DATE, header_value(DATE.as_str(), &signing::date_header(now))?);
        signed.insert(APPLICATION_KEY, header_value(APPLICATION_KEY, &credentials.app_key)?);
        signed.insert(CORRELATION_ID, header_value(CORRELATION_ID, &correlation_id)?);
        signed.insert(ORGANIZATION, header_value(ORGANIZATION, &credentials.organization)?);
        for (name, value) in headers {
            signed.insert(name.clone(), value.clone());
        }

        let path_and_query = &url[Position::BeforePath..Position::AfterQuery];
        let signature = signing::sign_request(
            credentials.secret_key.expose_secret(),
            now,
            method.as_ref(),
            path_and_query,
            &signed,
        );
        let mut authorization = header_value(
            AUTHORIZATION.as_str(),
            &format!(
                "AccessKey {}:{signature}",
                credentials.shared_key.expose_secret()
            ),
        )?;
        authorization.set_sensitive(true);
        signed.insert(AUTHORIZATION, authorization);

        debug!(correlation_id = %correlation_id, "{method} {url}");

        let mut builder = self.http.request(method.into(), url).headers(signed);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let resp = builder.send().await?;

        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(Error::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    // ── JSON helpers ─────────────────────────────────────────────────

    /// Send a JSON request and decode the JSON response.
    ///
    /// Every JSON call carries `Content-Type: application/json`, body or not;
    /// the header is part of the signed subset.
    pub async fn request<T, B>(
        &self,
        method: Method,
        resource: &str,
        body: Option<&B>,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = body.map(serde_json::to_vec).transpose()?;
        let resp = self
            .send(method, resource, payload, &json_headers())
            .await?;
        decode(resp).await
    }

    pub async fn get<T: DeserializeOwned>(&self, resource: &str) -> Result<T, Error> {
        self.request::<T, ()>(Method::Get, resource, None).await
    }

    pub async fn post<T, B>(&self, resource: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::Post, resource, Some(body)).await
    }

    pub async fn put<T, B>(&self, resource: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::Put, resource, Some(body)).await
    }

    pub async fn patch<T, B>(&self, resource: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::Patch, resource, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, resource: &str) -> Result<T, Error> {
        self.request::<T, ()>(Method::Delete, resource, None).await
    }
}

/// Decode a successful response body as JSON.
///
/// An empty body decodes as `null`, so `serde_json::Value` and `Option<T>`
/// callers see `Null` / `None` for endpoints that answer with no content.
pub async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await?;
    let text = if body.trim().is_empty() { "null" } else { body.as_str() };
    serde_json::from_str(text).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

/// Headers every JSON call carries.
pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Append query parameters to a resource path, form-encoding the values.
pub(crate) fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_owned();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{path}?{query}")
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader { name: name.into() })
}

/// Build a header name from a static lowercase string.
pub(crate) fn header_name(name: &'static str) -> HeaderName {
    HeaderName::from_static(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_renders_uppercase() {
        assert_eq!(Method::Patch.as_ref(), "PATCH");
        assert_eq!(Method::Head.to_string(), "HEAD");
    }

    #[test]
    fn query_values_are_form_encoded() {
        assert_eq!(
            with_query("security/groups", &[("pageNumber", "0"), ("groupNamePattern", "*")]),
            "security/groups?pageNumber=0&groupNamePattern=*"
        );
        assert_eq!(
            with_query("provisioning/enterprise-units", &[("namePattern", "a b&c")]),
            "provisioning/enterprise-units?namePattern=a+b%26c"
        );
    }

    #[test]
    fn query_is_omitted_when_empty() {
        assert_eq!(with_query("site/sites", &[]), "site/sites");
    }
}
