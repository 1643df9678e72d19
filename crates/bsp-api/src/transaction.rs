// Transaction-document service endpoints.
//
// Unlike the other services this one takes raw NAXML bodies and requires an
// explicit `nep-service-version`, which is part of the signed header subset.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::auth::ServerTarget;
use crate::client::{BspClient, Method, SERVICE_VERSION, decode, header_name, with_query};
use crate::error::Error;
use crate::transport::TransportConfig;

const SERVICE_VERSION_VALUE: &str = "2:2";
const DOCUMENTS: &str = "transaction-document/transaction-documents";

/// HTTP client for the transaction-document service.
#[derive(Debug, Clone)]
pub struct TransactionClient {
    inner: BspClient,
}

impl TransactionClient {
    pub fn new(target: ServerTarget, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::from_client(BspClient::new(target, transport)?))
    }

    pub fn from_client(inner: BspClient) -> Self {
        Self { inner }
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header_name(SERVICE_VERSION),
            HeaderValue::from_static(SERVICE_VERSION_VALUE),
        );
        headers
    }

    /// Submit a NAXML POS journal.
    ///
    /// `POST transaction-document/transaction-documents?providerName=NAXML&providerVersion=1.0`
    pub async fn submit_transaction(&self, xml: &str) -> Result<Value, Error> {
        let mut headers = Self::headers();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/xml"));

        debug!(bytes = xml.len(), "submitting transaction document");
        let resource = with_query(
            DOCUMENTS,
            &[("providerName", "NAXML"), ("providerVersion", "1.0")],
        );
        let resp = self
            .inner
            .send(Method::Post, &resource, Some(xml.as_bytes().to_vec()), &headers)
            .await?;
        decode(resp).await
    }

    /// `GET transaction-document/transaction-documents/{id}`
    pub async fn get_transaction(&self, id: &str) -> Result<Value, Error> {
        let resp = self
            .inner
            .send(Method::Get, &format!("{DOCUMENTS}/{id}"), None, &Self::headers())
            .await?;
        decode(resp).await
    }

    /// Whether a transaction document exists, via `HEAD`.
    ///
    /// A 404 answers `false`; any other failure is returned as an error.
    pub async fn transaction_exists(&self, id: &str) -> Result<bool, Error> {
        match self
            .inner
            .send(Method::Head, &format!("{DOCUMENTS}/{id}"), None, &Self::headers())
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
