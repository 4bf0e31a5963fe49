//! Auth client interface, spec §4 ("Auth client interface") and §6.5.
//!
//! The external provisioner's internals are out of scope (spec §1), but its
//! contract — `GET {base}/auc/imsi/{imsi}` returning JSON with `ki`, `opc`,
//! `amf` — is implemented here the way `unified-messaging`'s platform
//! adapters wrap a third-party HTTP API behind a small async trait.

use crate::errors::ProvisionerError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Authentication/provisioning record for one subscriber, spec §3.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthRecord {
    pub ki: String,
    pub opc: String,
    pub amf: String,
    #[serde(default)]
    pub sqn: Option<u64>,
    #[serde(default)]
    pub msisdn: Option<String>,
}

impl AuthRecord {
    /// Hex-decoded `ki` bytes.
    pub fn ki_bytes(&self) -> Result<Vec<u8>, ProvisionerError> {
        hex::decode(&self.ki).map_err(|source| ProvisionerError::InvalidHex {
            field: "ki",
            source,
        })
    }

    /// Hex-decoded `opc` bytes.
    pub fn opc_bytes(&self) -> Result<Vec<u8>, ProvisionerError> {
        hex::decode(&self.opc).map_err(|source| ProvisionerError::InvalidHex {
            field: "opc",
            source,
        })
    }

    fn validate(self) -> Result<Self, ProvisionerError> {
        if self.ki.is_empty() {
            return Err(ProvisionerError::MissingField("ki"));
        }
        if self.opc.is_empty() {
            return Err(ProvisionerError::MissingField("opc"));
        }
        if self.amf.is_empty() {
            return Err(ProvisionerError::MissingField("amf"));
        }
        // Validate hex-decodability eagerly so callers get a provisioner
        // error rather than a panic further down the handler chain.
        self.ki_bytes()?;
        self.opc_bytes()?;
        Ok(self)
    }
}

/// `FetchAuthData(imsi) -> AuthRecord | error`, spec §2.
#[async_trait]
pub trait AuthClient: Send + Sync {
    async fn fetch_auth_data(&self, imsi: &str) -> Result<AuthRecord, ProvisionerError>;
}

/// HTTP-backed implementation of [`AuthClient`], spec §6.5.
pub struct HttpAuthClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAuthClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client configuration is static and infallible here");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }
}

#[async_trait]
impl AuthClient for HttpAuthClient {
    #[instrument(skip(self), fields(imsi))]
    async fn fetch_auth_data(&self, imsi: &str) -> Result<AuthRecord, ProvisionerError> {
        let url = format!("{}/auc/imsi/{}", self.base_url, imsi);
        debug!(%url, "fetching auth data from provisioner");

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let record: AuthRecord = response.json().await?;
        record.validate().map_err(|e| {
            warn!(imsi, error = %e, "provisioner returned invalid auth data");
            e
        })
    }
}

/// A canned [`AuthClient`] double for unit/integration tests, grounded in
/// the mock-session style of `smsc`'s reconnection integration tests: no
/// live HTTP server required. Not cfg-gated so the `tests/` integration
/// binaries can link against it; not meant for production wiring.
pub mod test_support {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    pub struct StaticAuthClient {
        records: RwLock<HashMap<String, AuthRecord>>,
    }

    impl StaticAuthClient {
        pub fn new() -> Self {
            Self {
                records: RwLock::new(HashMap::new()),
            }
        }

        pub async fn insert(&self, imsi: &str, record: AuthRecord) {
            self.records.write().await.insert(imsi.to_string(), record);
        }
    }

    impl Default for StaticAuthClient {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl AuthClient for StaticAuthClient {
        async fn fetch_auth_data(&self, imsi: &str) -> Result<AuthRecord, ProvisionerError> {
            self.records
                .read()
                .await
                .get(imsi)
                .cloned()
                .ok_or(ProvisionerError::MissingField("imsi not provisioned"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_non_hex_ki() {
        let record = AuthRecord {
            ki: "not-hex".to_string(),
            opc: "00112233445566778899aabbccddeeff".to_string(),
            amf: "0000".to_string(),
            sqn: None,
            msisdn: None,
        };
        assert!(record.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_amf() {
        let record = AuthRecord {
            ki: "000102030405060708090a0b0c0d0e0f".to_string(),
            opc: "101112131415161718191a1b1c1d1e1f".to_string(),
            amf: String::new(),
            sqn: None,
            msisdn: None,
        };
        assert!(record.validate().is_err());
    }

    #[tokio::test]
    async fn static_client_returns_inserted_record() {
        let client = test_support::StaticAuthClient::new();
        client
            .insert(
                "001017890123453",
                AuthRecord {
                    ki: "000102030405060708090a0b0c0d0e0f".to_string(),
                    opc: "101112131415161718191a1b1c1d1e1f".to_string(),
                    amf: "0000".to_string(),
                    sqn: None,
                    msisdn: Some("1234567890".to_string()),
                },
            )
            .await;

        let record = client.fetch_auth_data("001017890123453").await.unwrap();
        assert_eq!(record.ki_bytes().unwrap(), hex::decode("000102030405060708090a0b0c0d0e0f").unwrap());
    }

    #[tokio::test]
    async fn static_client_errors_on_unknown_imsi() {
        let client = test_support::StaticAuthClient::new();
        assert!(client.fetch_auth_data("000000000000000").await.is_err());
    }
}
