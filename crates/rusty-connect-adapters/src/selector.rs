use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, warn};

use rusty_connect_core::{PortError, ProviderDescriptor, WalletSelectorPort};

use crate::config::{ConnectConfig, INJECTED_PROVIDER_ID, LOCAL_PROVIDER_ID};
use crate::eip1193::Eip1193Adapter;

/// Provider options that need a browser or vendor SDK; listed when a key is configured.
const HOSTED_PROVIDERS: [(&str, &str); 3] = [
    ("walletconnect", "WalletConnect"),
    ("fortmatic", "Fortmatic"),
    ("portis", "Portis"),
];

/// Native provider-selection modal with an optional on-disk cached choice.
#[derive(Debug)]
pub struct WalletSelectorAdapter {
    config: ConnectConfig,
    cached: Mutex<Option<String>>,
}

impl WalletSelectorAdapter {
    pub fn with_config(config: ConnectConfig) -> Self {
        let cached = if config.cache_provider {
            config.cache_path.as_ref().and_then(read_cache_file)
        } else {
            None
        };
        Self {
            config,
            cached: Mutex::new(cached),
        }
    }

    pub fn config(&self) -> &ConnectConfig {
        &self.config
    }

    fn remember(&self, provider_id: &str) {
        if !self.config.cache_provider {
            return;
        }
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = Some(provider_id.to_owned());
        if let Some(path) = &self.config.cache_path {
            if let Err(e) = write_cache_file(path, provider_id) {
                warn!(path = %path.display(), error = %e, "failed to persist cached provider");
            }
        }
    }
}

impl WalletSelectorPort for WalletSelectorAdapter {
    type Provider = Eip1193Adapter;

    fn options(&self) -> Vec<ProviderDescriptor> {
        let mut out = vec![
            ProviderDescriptor {
                id: LOCAL_PROVIDER_ID.to_owned(),
                name: "Local signer".to_owned(),
                description: "In-memory development key".to_owned(),
                available: !self.config.strict_runtime_required(),
            },
            ProviderDescriptor {
                id: INJECTED_PROVIDER_ID.to_owned(),
                name: "Injected (JSON-RPC)".to_owned(),
                description: self
                    .config
                    .rpc_url
                    .clone()
                    .unwrap_or_else(|| "RUSTY_CONNECT_RPC_URL not set".to_owned()),
                available: self.config.rpc_url.is_some(),
            },
        ];
        for (id, name) in HOSTED_PROVIDERS {
            if self.config.provider_key(id).is_some() {
                out.push(ProviderDescriptor {
                    id: id.to_owned(),
                    name: name.to_owned(),
                    description: "Requires a browser runtime".to_owned(),
                    available: false,
                });
            }
        }
        out
    }

    fn connect(&self, provider_id: Option<&str>) -> Result<Eip1193Adapter, PortError> {
        let id = match provider_id {
            Some(id) => id.to_owned(),
            None => self
                .cached_provider()
                .or_else(|| self.options().into_iter().find(|o| o.available).map(|o| o.id))
                .ok_or_else(|| PortError::NotFound("no wallet provider available".to_owned()))?,
        };

        if HOSTED_PROVIDERS.iter().any(|(hosted, _)| *hosted == id) {
            return Err(PortError::Unsupported(format!(
                "provider {id} is not available on native builds"
            )));
        }
        if id != LOCAL_PROVIDER_ID && id != INJECTED_PROVIDER_ID {
            return Err(PortError::NotFound(format!("unknown provider option: {id}")));
        }

        let adapter = Eip1193Adapter::with_config(&id, &self.config);
        adapter.check_mode()?;
        self.remember(&id);
        info!(provider = %id, "wallet provider selected");
        Ok(adapter)
    }

    fn cached_provider(&self) -> Option<String> {
        if !self.config.cache_provider {
            return None;
        }
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear_cached_provider(&self) -> Result<(), PortError> {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(path) = &self.config.cache_path {
            match std::fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "cached provider cleared"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(PortError::Transport(format!(
                        "failed to clear cached provider {}: {e}",
                        path.display()
                    )))
                }
            }
        }
        Ok(())
    }
}

fn read_cache_file(path: &PathBuf) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn write_cache_file(path: &PathBuf, provider_id: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, provider_id)
}
