use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

/// First account of the well-known development mnemonic ("test test ... junk").
pub const DEV_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const LOCAL_PROVIDER_ID: &str = "local";
pub const INJECTED_PROVIDER_ID: &str = "injected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeProfile {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct ConnectConfig {
    pub runtime_profile: RuntimeProfile,
    pub rpc_url: Option<String>,
    pub local_private_key: Option<String>,
    pub local_chain_id: u64,
    pub account_api_base_url: String,
    pub profile_api_base_url: String,
    pub http_timeout_ms: u64,
    pub cache_provider: bool,
    pub cache_path: Option<PathBuf>,
    /// Opaque adapter keys (infura id, fortmatic key, portis id) keyed by provider id.
    pub provider_keys: BTreeMap<String, String>,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            runtime_profile: RuntimeProfile::Development,
            rpc_url: None,
            local_private_key: None,
            local_chain_id: 1,
            account_api_base_url: "https://ethereum-api.xyz".to_owned(),
            profile_api_base_url: "https://ipfs.3box.io".to_owned(),
            http_timeout_ms: 15_000,
            cache_provider: false,
            cache_path: None,
            provider_keys: BTreeMap::new(),
        }
    }
}

impl ConnectConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source (the process
    /// environment in `from_env`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let vars = Vars(lookup);
        let mut cfg = Self {
            cache_provider: true,
            cache_path: vars.get("HOME").map(|home| {
                PathBuf::from(home)
                    .join(".rusty-connect")
                    .join("cached_provider")
            }),
            ..Self::default()
        };

        if let Some(raw) = vars.get("RUSTY_CONNECT_RUNTIME_PROFILE") {
            if raw.eq_ignore_ascii_case("production") {
                cfg.runtime_profile = RuntimeProfile::Production;
            }
        }
        cfg.rpc_url = vars.get("RUSTY_CONNECT_RPC_URL");
        cfg.local_private_key = vars.get("RUSTY_CONNECT_PRIVATE_KEY");
        if let Some(v) = vars.parse::<u64>("RUSTY_CONNECT_LOCAL_CHAIN_ID") {
            cfg.local_chain_id = v;
        }
        if let Some(v) = vars.get("RUSTY_CONNECT_ACCOUNT_API_URL") {
            cfg.account_api_base_url = v;
        }
        if let Some(v) = vars.get("RUSTY_CONNECT_PROFILE_API_URL") {
            cfg.profile_api_base_url = v;
        }
        if let Some(v) = vars.parse::<u64>("RUSTY_CONNECT_HTTP_TIMEOUT_MS") {
            cfg.http_timeout_ms = v;
        }
        if let Some(v) = vars.flag("RUSTY_CONNECT_CACHE_PROVIDER") {
            cfg.cache_provider = v;
        }
        if let Some(v) = vars.get("RUSTY_CONNECT_CACHE_PATH") {
            cfg.cache_path = Some(PathBuf::from(v));
        }

        for (var, provider) in [
            ("RUSTY_CONNECT_INFURA_ID", "walletconnect"),
            ("RUSTY_CONNECT_FORTMATIC_KEY", "fortmatic"),
            ("RUSTY_CONNECT_PORTIS_ID", "portis"),
            ("RUSTY_CONNECT_INJECTED_KEY", INJECTED_PROVIDER_ID),
        ] {
            if let Some(key) = vars.get(var) {
                cfg.provider_keys.insert(provider.to_owned(), key);
            }
        }

        cfg
    }

    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }

    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.http_timeout_ms)
    }

    pub fn provider_key(&self, provider_id: &str) -> Option<&str> {
        self.provider_keys.get(provider_id).map(String::as_str)
    }
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, key: &str) -> Option<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.get(key)?;
        match raw.parse() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, value = %raw, error = %e, "ignoring unparseable setting");
                None
            }
        }
    }

    fn flag(&self, key: &str) -> Option<bool> {
        let raw = self.get(key)?;
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => {
                warn!(key, value = %raw, "ignoring unparseable flag");
                None
            }
        }
    }
}
