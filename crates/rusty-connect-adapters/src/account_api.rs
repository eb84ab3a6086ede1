use alloy::primitives::Address;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use rusty_connect_core::{AccountApiPort, AssetData, GasPrices, PortError};

use crate::config::ConnectConfig;

/// Blocking client for the `ethereum-api.xyz` account endpoints.
#[derive(Debug, Clone)]
pub struct AccountApiAdapter {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    result: Option<T>,
}

impl AccountApiAdapter {
    pub fn with_config(config: &ConnectConfig) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| PortError::Transport(format!("account api client init failed: {e}")))?;
        Ok(Self {
            base_url: config.account_api_base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, PortError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| PortError::Transport(format!("{path} request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Transport(format!("{path} status {status}")));
        }
        let body: Envelope<T> = response
            .json()
            .map_err(|e| PortError::Transport(format!("{path} json decode failed: {e}")))?;
        if !body.success {
            return Err(PortError::Transport(format!("{path} reported failure")));
        }
        body.result
            .ok_or_else(|| PortError::Transport(format!("{path} missing result")))
    }
}

impl AccountApiPort for AccountApiAdapter {
    fn account_assets(&self, address: Address, chain_id: u64) -> Result<Vec<AssetData>, PortError> {
        let assets: Vec<AssetData> = self.get(
            "account-assets",
            &[
                ("address", address.to_string()),
                ("chainId", chain_id.to_string()),
            ],
        )?;
        debug!(%address, chain_id, count = assets.len(), "account assets fetched");
        Ok(assets)
    }

    fn account_nonce(&self, address: Address, chain_id: u64) -> Result<u64, PortError> {
        let raw: serde_json::Value = self.get(
            "account-nonce",
            &[
                ("address", address.to_string()),
                ("chainId", chain_id.to_string()),
            ],
        )?;
        crate::eip1193::json_quantity_to_u64(&raw)
            .map_err(|e| PortError::Validation(format!("invalid account nonce: {e}")))
    }

    fn gas_prices(&self) -> Result<GasPrices, PortError> {
        self.get("gas-prices", &[])
    }
}
