use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::{keccak256, Address, Bytes, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use serde_json::Value;
use tracing::{debug, warn};

use rusty_connect_core::{
    CallRequest, PortError, ProviderEvent, ProviderEventKind, ProviderPort, TxRequest,
};

use crate::config::{ConnectConfig, DEV_PRIVATE_KEY, INJECTED_PROVIDER_ID, LOCAL_PROVIDER_ID};

/// Consecutive failed proxy polls before the outage is reported at warn level.
/// The session stays open; the wallet may come back.
pub const POLL_FAILURE_WARN_THRESHOLD: u32 = 3;

#[derive(Debug, Clone)]
pub struct Eip1193Adapter {
    id: String,
    mode: ProviderMode,
    state: Arc<Mutex<ProviderState>>,
}

#[derive(Debug, Clone)]
enum ProviderMode {
    Disabled(String),
    Local(PrivateKeySigner),
    Proxy(ProxyRuntime),
}

#[derive(Debug, Clone)]
struct ProxyRuntime {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Clone, Default)]
struct ProviderState {
    accounts: Vec<Address>,
    chain_id: u64,
    network_id: u64,
    subscribed: bool,
    closed: bool,
    event_seq: u64,
    events: Vec<ProviderEvent>,
    poll_failures: u32,
}

impl Eip1193Adapter {
    /// Build the transport behind a selector option.
    pub fn with_config(provider_id: &str, config: &ConnectConfig) -> Self {
        let mode = match provider_id {
            LOCAL_PROVIDER_ID => local_mode(config),
            INJECTED_PROVIDER_ID => proxy_mode(config),
            other => ProviderMode::Disabled(format!("unknown provider option: {other}")),
        };

        let mut state = ProviderState::default();
        if let ProviderMode::Local(signer) = &mode {
            state.accounts = vec![signer.address()];
            state.chain_id = config.local_chain_id;
            state.network_id = config.local_chain_id;
        }

        Self {
            id: provider_id.to_owned(),
            mode,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Proxy polls that have failed in a row since the last success.
    pub fn consecutive_poll_failures(&self) -> u32 {
        self.state
            .lock()
            .map(|g| g.poll_failures)
            .unwrap_or_default()
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.mode, ProviderMode::Disabled(_))
    }

    pub(crate) fn check_mode(&self) -> Result<(), PortError> {
        if let ProviderMode::Disabled(reason) = &self.mode {
            return Err(PortError::Policy(reason.clone()));
        }
        if self.lock_state()?.closed {
            return Err(PortError::Policy(format!("provider {} is closed", self.id)));
        }
        Ok(())
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, ProviderState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("provider lock poisoned: {e}")))
    }

    fn record_event(&self, kind: ProviderEventKind) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        push_event(&mut g, kind);
        Ok(())
    }

    pub fn debug_inject_accounts_changed(&self, accounts: Vec<Address>) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        g.accounts = accounts.clone();
        push_event(&mut g, ProviderEventKind::AccountsChanged(accounts));
        Ok(())
    }

    pub fn debug_inject_chain_changed(&self, chain_id: u64) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        g.chain_id = chain_id;
        push_event(&mut g, ProviderEventKind::ChainChanged(chain_id));
        Ok(())
    }

    pub fn debug_inject_network_changed(&self, network_id: u64) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        g.network_id = network_id;
        push_event(&mut g, ProviderEventKind::NetworkChanged(network_id));
        Ok(())
    }

    pub fn debug_inject_close(&self) -> Result<(), PortError> {
        self.record_event(ProviderEventKind::Close)
    }

    fn proxy_call(&self, method: &str, params: Value) -> Result<Value, PortError> {
        let proxy = match &self.mode {
            ProviderMode::Proxy(proxy) => proxy,
            ProviderMode::Disabled(reason) => return Err(PortError::Policy(reason.clone())),
            ProviderMode::Local(_) => {
                return Err(PortError::NotImplemented("eip1193 proxy runtime not enabled"))
            }
        };

        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let mut request = proxy.client.post(&proxy.base_url).json(&payload);
        if let Some(key) = &proxy.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .map_err(|e| PortError::Transport(format!("{method} request failed: {e}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .map_err(|e| PortError::Transport(format!("{method} json decode failed: {e}")))?;
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "{method} status {status}: {body}"
            )));
        }
        if let Some(err) = body.get("error") {
            return Err(PortError::Transport(format!("{method} returned error: {err}")));
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Transport(format!("{method} missing result")))
    }

    fn proxy_accounts(&self) -> Result<Vec<Address>, PortError> {
        let result = self.proxy_call("eth_accounts", serde_json::json!([]))?;
        let arr = result
            .as_array()
            .ok_or_else(|| PortError::Transport("eth_accounts: array expected".to_owned()))?;
        arr.iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| PortError::Transport("eth_accounts: string expected".to_owned()))?
                    .parse::<Address>()
                    .map_err(|e| PortError::Validation(format!("invalid account address: {e}")))
            })
            .collect()
    }

    fn proxy_chain_id(&self) -> Result<u64, PortError> {
        let result = self.proxy_call("eth_chainId", serde_json::json!([]))?;
        json_quantity_to_u64(&result)
    }

    fn proxy_net_version(&self) -> Result<u64, PortError> {
        let result = self.proxy_call("net_version", serde_json::json!([]))?;
        json_quantity_to_u64(&result)
    }

    /// Poll the remote wallet and queue an event for every field that moved
    /// since the last snapshot.
    fn poll_proxy_snapshot(&self) -> Result<(), PortError> {
        let accounts = self.proxy_accounts()?;
        let chain_id = self.proxy_chain_id()?;
        let network_id = self.proxy_net_version()?;

        let mut g = self.lock_state()?;
        if !g.subscribed {
            return Ok(());
        }
        if g.accounts != accounts {
            g.accounts = accounts.clone();
            push_event(&mut g, ProviderEventKind::AccountsChanged(accounts));
        }
        if g.chain_id != chain_id {
            g.chain_id = chain_id;
            push_event(&mut g, ProviderEventKind::ChainChanged(chain_id));
        }
        if g.network_id != network_id {
            g.network_id = network_id;
            push_event(&mut g, ProviderEventKind::NetworkChanged(network_id));
        }
        Ok(())
    }
}

impl ProviderPort for Eip1193Adapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn accounts(&self) -> Result<Vec<Address>, PortError> {
        self.check_mode()?;
        if matches!(self.mode, ProviderMode::Proxy(_)) {
            return self.proxy_accounts();
        }
        Ok(self.lock_state()?.accounts.clone())
    }

    fn chain_id(&self) -> Result<u64, PortError> {
        self.check_mode()?;
        if matches!(self.mode, ProviderMode::Proxy(_)) {
            return self.proxy_chain_id();
        }
        Ok(self.lock_state()?.chain_id)
    }

    fn net_version(&self) -> Result<u64, PortError> {
        self.check_mode()?;
        if matches!(self.mode, ProviderMode::Proxy(_)) {
            return self.proxy_net_version();
        }
        Ok(self.lock_state()?.network_id)
    }

    fn send_transaction(&self, tx: &TxRequest) -> Result<B256, PortError> {
        self.check_mode()?;

        if matches!(self.mode, ProviderMode::Proxy(_)) {
            let result = self.proxy_call("eth_sendTransaction", serde_json::json!([tx]))?;
            let hash = result.as_str().ok_or_else(|| {
                PortError::Transport("eth_sendTransaction must return hash".to_owned())
            })?;
            return hash
                .parse()
                .map_err(|e| PortError::Validation(format!("invalid tx hash: {e}")));
        }

        let canonical = serde_json::to_vec(tx)
            .map_err(|e| PortError::Validation(format!("tx payload serialization failed: {e}")))?;
        let hash = keccak256(canonical);
        debug!(%hash, "local signer accepted transaction");
        Ok(hash)
    }

    fn eth_sign(&self, address: Address, data: &[u8]) -> Result<Bytes, PortError> {
        self.check_mode()?;
        let payload_hex = format!("0x{}", alloy::hex::encode(data));

        match &self.mode {
            ProviderMode::Proxy(_) => {
                let result =
                    self.proxy_call("eth_sign", serde_json::json!([address.to_string(), payload_hex]))?;
                parse_signature(&result)
            }
            ProviderMode::Local(signer) => {
                ensure_local_account(signer, address)?;
                let hash = B256::try_from(data).map_err(|_| {
                    PortError::Validation(format!(
                        "eth_sign expects a 32-byte hash, got {} bytes",
                        data.len()
                    ))
                })?;
                let signature = signer
                    .sign_hash_sync(&hash)
                    .map_err(|e| PortError::Transport(format!("local eth_sign failed: {e}")))?;
                Ok(Bytes::from(signature.as_bytes().to_vec()))
            }
            ProviderMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
        }
    }

    fn personal_sign(&self, data: &[u8], address: Address) -> Result<Bytes, PortError> {
        self.check_mode()?;
        let payload_hex = format!("0x{}", alloy::hex::encode(data));

        match &self.mode {
            ProviderMode::Proxy(_) => {
                let result = self.proxy_call(
                    "personal_sign",
                    serde_json::json!([payload_hex, address.to_string()]),
                )?;
                parse_signature(&result)
            }
            ProviderMode::Local(signer) => {
                ensure_local_account(signer, address)?;
                let signature = signer
                    .sign_message_sync(data)
                    .map_err(|e| PortError::Transport(format!("local personal_sign failed: {e}")))?;
                Ok(Bytes::from(signature.as_bytes().to_vec()))
            }
            ProviderMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
        }
    }

    fn call(&self, request: &CallRequest) -> Result<Bytes, PortError> {
        self.check_mode()?;

        if matches!(self.mode, ProviderMode::Proxy(_)) {
            let result = self.proxy_call("eth_call", serde_json::json!([request, "latest"]))?;
            let raw = result
                .as_str()
                .ok_or_else(|| PortError::Transport("eth_call must return hex data".to_owned()))?;
            return raw
                .parse()
                .map_err(|e| PortError::Validation(format!("invalid eth_call result: {e}")));
        }

        // The in-memory signer has no chain state; every read is a zero word.
        Ok(Bytes::from(vec![0u8; 32]))
    }

    fn subscribe(&self) -> Result<(), PortError> {
        self.check_mode()?;
        if matches!(self.mode, ProviderMode::Proxy(_)) {
            let accounts = self.proxy_accounts()?;
            let chain_id = self.proxy_chain_id()?;
            let network_id = self.proxy_net_version()?;
            let mut g = self.lock_state()?;
            g.accounts = accounts;
            g.chain_id = chain_id;
            g.network_id = network_id;
        }
        self.lock_state()?.subscribed = true;
        Ok(())
    }

    fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError> {
        self.check_mode()?;
        if matches!(self.mode, ProviderMode::Proxy(_)) {
            if let Err(e) = self.poll_proxy_snapshot() {
                let failures = {
                    let mut g = self.lock_state()?;
                    g.poll_failures = g.poll_failures.saturating_add(1);
                    g.poll_failures
                };
                if failures == POLL_FAILURE_WARN_THRESHOLD {
                    warn!(provider = %self.id, failures, error = %e, "wallet RPC unreachable");
                }
                return Err(e);
            }
        }
        let mut g = self.lock_state()?;
        if g.poll_failures >= POLL_FAILURE_WARN_THRESHOLD {
            debug!(provider = %self.id, failures = g.poll_failures, "wallet RPC reachable again");
        }
        g.poll_failures = 0;
        Ok(std::mem::take(&mut g.events))
    }

    fn supports_close(&self) -> bool {
        true
    }

    fn close(&self) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        g.closed = true;
        g.subscribed = false;
        g.events.clear();
        debug!(provider = %self.id, "provider closed");
        Ok(())
    }
}

fn local_mode(config: &ConnectConfig) -> ProviderMode {
    if config.strict_runtime_required() {
        return ProviderMode::Disabled(
            "local signer is not available in production runtime profile".to_owned(),
        );
    }
    let key = config
        .local_private_key
        .as_deref()
        .unwrap_or(DEV_PRIVATE_KEY);
    match key.parse::<PrivateKeySigner>() {
        Ok(signer) => ProviderMode::Local(signer),
        Err(e) => ProviderMode::Disabled(format!("invalid local private key: {e}")),
    }
}

fn proxy_mode(config: &ConnectConfig) -> ProviderMode {
    let Some(base_url) = config.rpc_url.clone() else {
        return ProviderMode::Disabled("wallet RPC URL not configured".to_owned());
    };
    match reqwest::blocking::Client::builder()
        .timeout(config.http_timeout())
        .build()
    {
        Ok(client) => ProviderMode::Proxy(ProxyRuntime {
            base_url,
            api_key: config.provider_key(INJECTED_PROVIDER_ID).map(str::to_owned),
            client,
        }),
        Err(e) => ProviderMode::Disabled(format!("failed to initialize wallet RPC client: {e}")),
    }
}

fn push_event(state: &mut ProviderState, kind: ProviderEventKind) {
    state.event_seq = state.event_seq.saturating_add(1);
    let sequence = state.event_seq;
    state.events.push(ProviderEvent { sequence, kind });
}

fn ensure_local_account(signer: &PrivateKeySigner, address: Address) -> Result<(), PortError> {
    if signer.address() != address {
        return Err(PortError::Policy(format!(
            "local signer cannot sign for {address}"
        )));
    }
    Ok(())
}

fn parse_signature(value: &Value) -> Result<Bytes, PortError> {
    let raw = value
        .as_str()
        .ok_or_else(|| PortError::Transport("sign response must be hex string".to_owned()))?;
    raw.parse()
        .map_err(|e| PortError::Validation(format!("invalid signature hex: {e}")))
}

pub(crate) fn json_quantity_to_u64(value: &Value) -> Result<u64, PortError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    let s = value
        .as_str()
        .ok_or_else(|| PortError::Validation("quantity must be string or number".to_owned()))?;
    parse_quantity_str(s)
}

fn parse_quantity_str(raw: &str) -> Result<u64, PortError> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
            .map_err(|e| PortError::Validation(format!("invalid hex quantity: {e}")))
    } else {
        raw.parse()
            .map_err(|e| PortError::Validation(format!("invalid quantity: {e}")))
    }
}
