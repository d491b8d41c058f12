//! HTTP indexer API client
//!
//! Endpoints:
//! - `GET /extended/v1/address/{address}/nonces`
//! - `GET /extended/v1/tx/mempool?sender_address={address}`
//! - `GET /extended/v1/tx/{tx_id}/raw`

use super::{AccountNonces, MempoolApi, NonceApi, PendingTransaction, RawTxApi, TxId};
use crate::config::Endpoints;
use crate::{Error, Result};
use alloy::hex;
use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Deserialize)]
struct MempoolResponse {
    results: Vec<MempoolEntry>,
}

#[derive(Debug, Deserialize)]
struct MempoolEntry {
    tx_id: TxId,
    nonce: u64,
    sender_address: Address,
    /// Unix seconds
    receipt_time: i64,
}

impl MempoolEntry {
    fn into_pending(self) -> PendingTransaction {
        PendingTransaction {
            tx_id: self.tx_id,
            nonce: self.nonce,
            sender: self.sender_address,
            observed_at: DateTime::<Utc>::from_timestamp(self.receipt_time, 0)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTxResponse {
    raw_tx: String,
}

/// Client for the indexer's REST API
pub struct IndexerClient {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl IndexerClient {
    /// Create a client for `base_url` with default settings
    pub fn new(base_url: &url::Url) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Create a client from resolved endpoints
    pub fn from_endpoints(endpoints: &Endpoints, timeout: Duration) -> Result<Self> {
        let base_url = endpoints
            .api_url
            .as_ref()
            .ok_or_else(|| Error::Config("No indexer API URL configured".to_string()))?;

        let client = Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key: None,
        };

        Ok(match &endpoints.api_key {
            Some(key) => client.with_api_key(SecretString::from(key.expose_secret().to_string())),
            None => client,
        })
    }

    /// Attach an API key sent with every request
    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    fn nonces_url(&self, address: Address) -> String {
        format!("{}/extended/v1/address/{}/nonces", self.base_url, address)
    }

    fn mempool_url(&self) -> String {
        format!("{}/extended/v1/tx/mempool", self.base_url)
    }

    fn raw_tx_url(&self, id: TxId) -> String {
        format!("{}/extended/v1/tx/{}/raw", self.base_url, id)
    }

    /// GET a JSON document, `None` on 404
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let mut request = self.client.get(url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(url, "Indexer returned 404");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!("{} returned {}: {}", url, status, body)));
        }

        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl NonceApi for IndexerClient {
    async fn account_nonces(&self, address: Address) -> Result<Option<AccountNonces>> {
        self.get_json(&self.nonces_url(address), &[]).await
    }
}

#[async_trait]
impl MempoolApi for IndexerClient {
    async fn pending_transactions(&self, address: Address) -> Result<Vec<PendingTransaction>> {
        let response: Option<MempoolResponse> = self
            .get_json(
                &self.mempool_url(),
                &[("sender_address", address.to_string())],
            )
            .await?;

        let mut pending: Vec<PendingTransaction> = response
            .map(|r| r.results)
            .unwrap_or_default()
            .into_iter()
            .map(MempoolEntry::into_pending)
            .collect();
        pending.sort_by(|a, b| b.observed_at.cmp(&a.observed_at));
        Ok(pending)
    }
}

#[async_trait]
impl RawTxApi for IndexerClient {
    async fn raw_transaction(&self, id: TxId) -> Result<Bytes> {
        let response: RawTxResponse = self
            .get_json(&self.raw_tx_url(id), &[])
            .await?
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))?;

        decode_raw_hex(&response.raw_tx)
    }
}

fn decode_raw_hex(raw: &str) -> Result<Bytes> {
    let trimmed = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(trimmed)
        .map(Bytes::from)
        .map_err(|e| Error::Api(format!("Invalid raw_tx hex: {}", e)))
}
