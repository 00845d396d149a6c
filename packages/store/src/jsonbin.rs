//! JSONBin-style document store client.
//!
//! `GET <url>` returns `{"record": [...]}` and `PUT <url>` with the bare
//! array replaces the document. Both carry the static secret header.

use crate::{Collection, EmergencyStore, StoreError};

/// Remote document store holding the emergency collection.
#[derive(Debug, Clone)]
pub struct JsonBinStore {
    client: reqwest::Client,
    url: String,
    key_header: String,
    api_key: String,
}

impl JsonBinStore {
    /// Creates a client for the document at `url`, authenticating with
    /// `api_key` sent in `key_header`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        key_header: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            key_header: key_header.into(),
            api_key: api_key.into(),
        }
    }

    /// Document URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn fetch_failed(&self, source: impl Into<crate::BoxError>) -> StoreError {
        StoreError::FetchFailed {
            url: self.url.clone(),
            source: source.into(),
        }
    }

    fn write_failed(&self, source: impl Into<crate::BoxError>) -> StoreError {
        StoreError::WriteFailed {
            url: self.url.clone(),
            source: source.into(),
        }
    }
}

#[async_trait::async_trait]
impl EmergencyStore for JsonBinStore {
    async fn fetch_all(&self) -> Result<Collection, StoreError> {
        log::debug!("GET {}", self.url);

        let body: serde_json::Value = self
            .client
            .get(&self.url)
            .header(self.key_header.as_str(), self.api_key.as_str())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| self.fetch_failed(e))?
            .json()
            .await
            .map_err(|e| self.fetch_failed(e))?;

        let collection = parse_collection(body).map_err(|message| self.fetch_failed(message))?;
        log::debug!(
            "Fetched {} emergency records ({} undecodable)",
            collection.len(),
            collection.undecodable()
        );
        Ok(collection)
    }

    async fn replace_all(&self, collection: &Collection) -> Result<(), StoreError> {
        log::debug!("PUT {} ({} records)", self.url, collection.len());

        self.client
            .put(&self.url)
            .header(self.key_header.as_str(), self.api_key.as_str())
            .json(collection)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| self.write_failed(e))?;

        Ok(())
    }
}

/// Extracts the record array from a `{"record": [...]}` envelope.
fn parse_collection(mut body: serde_json::Value) -> Result<Collection, String> {
    let record = body
        .get_mut("record")
        .map(serde_json::Value::take)
        .ok_or_else(|| "response has no 'record' field".to_string())?;

    match record {
        serde_json::Value::Array(entries) => Ok(Collection::from_values(entries)),
        _ => Err("'record' is not an array".to_string()),
    }
}
