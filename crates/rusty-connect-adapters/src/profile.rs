use alloy::primitives::Address;
use reqwest::StatusCode;
use tracing::{debug, info};

use rusty_connect_core::{BoxProfile, PortError, ProfilePort, ProviderPort};

use crate::config::ConnectConfig;

/// Consent text the wallet signs before the profile space is opened.
pub const BOX_CONSENT_MESSAGE: &str =
    "This app wants to view and update your 3Box profile.";

/// 3Box profile client: consent signature plus the public profile endpoint.
#[derive(Debug, Clone)]
pub struct ProfileAdapter {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl ProfileAdapter {
    pub fn with_config(config: &ConnectConfig) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| PortError::Transport(format!("profile client init failed: {e}")))?;
        Ok(Self {
            base_url: config.profile_api_base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }
}

impl ProfilePort for ProfileAdapter {
    fn open_box<P: ProviderPort>(&self, address: Address, provider: &P) -> Result<(), PortError> {
        let signature = provider.personal_sign(BOX_CONSENT_MESSAGE.as_bytes(), address)?;
        if signature.is_empty() {
            return Err(PortError::Policy("profile consent was not signed".to_owned()));
        }
        info!(%address, "profile space opened");
        Ok(())
    }

    fn get_profile(&self, address: Address) -> Result<Option<BoxProfile>, PortError> {
        let url = format!("{}/profile", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("address", address.to_string())])
            .send()
            .map_err(|e| PortError::Transport(format!("profile request failed: {e}")))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(%address, "no profile published");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PortError::Transport(format!("profile status {status}")));
        }
        response
            .json::<BoxProfile>()
            .map(Some)
            .map_err(|e| PortError::Transport(format!("profile json decode failed: {e}")))
    }
}
