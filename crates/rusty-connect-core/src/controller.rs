use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy::primitives::{Address, U256};
use tracing::{debug, error, info, warn};

use crate::chains;
use crate::domain::{
    ActionKind, ActionOutcome, ActionResult, CallRequest, ProviderEventKind, TxRequest,
    TEST_MESSAGE, TEST_TOKEN_TRANSFER_AMOUNT, TEST_TX_GAS_LIMIT,
};
use crate::ports::{
    AbiPort, AccountApiPort, HashingPort, PortError, ProfilePort, ProviderPort, WalletSelectorPort,
};
use crate::state_machine::{
    request_transition, AppState, RequestEvent, RequestPhase, StateTransition,
};

const JOURNAL_LIMIT: usize = 256;

/// Connection manager and action dispatcher over a set of ports.
///
/// State is locked only to read or write the record, never across a port
/// call, so provider events and in-flight actions interleave with
/// last-write-wins semantics.
pub struct Controller<W, A, B, X, H>
where
    W: WalletSelectorPort,
    A: AccountApiPort,
    B: ProfilePort,
    X: AbiPort,
    H: HashingPort,
{
    pub selector: W,
    pub account_api: A,
    pub profile: B,
    pub abi: X,
    pub hashing: H,
    provider: Mutex<Option<Arc<W::Provider>>>,
    state: Mutex<AppState>,
    journal: Mutex<Vec<StateTransition>>,
    asset_generation: AtomicU64,
}

impl<W, A, B, X, H> Controller<W, A, B, X, H>
where
    W: WalletSelectorPort,
    A: AccountApiPort,
    B: ProfilePort,
    X: AbiPort,
    H: HashingPort,
{
    pub fn new(selector: W, account_api: A, profile: B, abi: X, hashing: H) -> Self {
        Self {
            selector,
            account_api,
            profile,
            abi,
            hashing,
            provider: Mutex::new(None),
            state: Mutex::new(AppState::initial()),
            journal: Mutex::new(Vec::new()),
            asset_generation: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> AppState {
        self.state().clone()
    }

    pub fn current_provider(&self) -> Option<Arc<W::Provider>> {
        self.provider_slot().clone()
    }

    pub fn transitions(&self) -> Vec<StateTransition> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // =========================================================================
    // CONNECTION
    // =========================================================================

    /// Reconnect to the cached provider, if the selector remembers one.
    pub fn restore_session(&self) -> Result<bool, PortError> {
        match self.selector.cached_provider() {
            Some(id) => {
                info!(provider = %id, "restoring cached provider");
                self.connect(Some(&id))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn connect(&self, provider_id: Option<&str>) -> Result<(), PortError> {
        let provider = self.selector.connect(provider_id)?;
        if provider.supports_events() {
            provider.subscribe()?;
        }

        let accounts = provider.accounts()?;
        let address = accounts.first().copied().ok_or_else(|| {
            PortError::Policy("no provider accounts available; unlock/connect wallet".to_owned())
        })?;
        let network_id = provider.net_version()?;
        let chain_id = provider.chain_id()?;
        let id = provider.id().to_owned();

        *self.provider_slot() = Some(Arc::new(provider));
        {
            let mut s = self.state();
            s.connected = true;
            s.address = Some(address);
            s.chain_id = chain_id;
            s.network_id = network_id;
            s.provider_id = Some(id.clone());
        }
        info!(provider = %id, %address, chain_id, network_id, "wallet connected");

        self.refresh_assets();
        Ok(())
    }

    /// Fetch balances for the current address and chain.
    ///
    /// A response overtaken by a newer refresh (or a reset) is dropped.
    pub fn refresh_assets(&self) {
        let generation = self.asset_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (address, chain_id) = {
            let mut s = self.state();
            let Some(address) = s.address else {
                s.fetching = false;
                return;
            };
            s.fetching = true;
            (address, s.chain_id)
        };

        let fetched = self.account_api.account_assets(address, chain_id);

        let mut s = self.state();
        if self.asset_generation.load(Ordering::SeqCst) != generation {
            debug!(%address, chain_id, "discarding stale asset response");
            return;
        }
        s.fetching = false;
        match fetched {
            Ok(assets) => {
                debug!(%address, chain_id, count = assets.len(), "assets refreshed");
                s.assets = assets;
            }
            Err(e) => error!(%address, chain_id, error = %e, "failed to fetch account assets"),
        }
    }

    /// Apply every event the provider queued since the last call.
    pub fn pump_events(&self) -> Result<usize, PortError> {
        let Some(provider) = self.current_provider() else {
            return Ok(0);
        };
        if !provider.supports_events() {
            return Ok(0);
        }

        let events = provider.drain_events()?;
        let count = events.len();
        for event in events {
            debug!(sequence = event.sequence, kind = ?event.kind, "provider event");
            let closing = event.kind == ProviderEventKind::Close;
            match self.handle_event(provider.as_ref(), event.kind) {
                Err(e) if closing => return Err(e),
                Err(e) => warn!(sequence = event.sequence, error = %e, "provider event not applied"),
                Ok(()) => {}
            }
            // Events queued behind a close belong to the dead session.
            if closing {
                break;
            }
        }
        Ok(count)
    }

    fn handle_event(&self, provider: &W::Provider, kind: ProviderEventKind) -> Result<(), PortError> {
        match kind {
            ProviderEventKind::AccountsChanged(accounts) => match accounts.first().copied() {
                Some(address) => {
                    self.state().address = Some(address);
                    self.refresh_assets();
                }
                None => {
                    self.asset_generation.fetch_add(1, Ordering::SeqCst);
                    let mut s = self.state();
                    s.address = None;
                    s.assets.clear();
                    s.fetching = false;
                }
            },
            ProviderEventKind::ChainChanged(chain_id) => {
                let network_id = provider.net_version()?;
                {
                    let mut s = self.state();
                    s.chain_id = chain_id;
                    s.network_id = network_id;
                }
                self.refresh_assets();
            }
            ProviderEventKind::NetworkChanged(network_id) => {
                let chain_id = provider.chain_id()?;
                {
                    let mut s = self.state();
                    s.chain_id = chain_id;
                    s.network_id = network_id;
                }
                self.refresh_assets();
            }
            ProviderEventKind::Close => self.teardown(false)?,
        }
        Ok(())
    }

    /// Disconnect: close the provider, forget the cached one and restore the initial record.
    pub fn reset(&self) -> Result<(), PortError> {
        self.teardown(true)
    }

    fn teardown(&self, close_provider: bool) -> Result<(), PortError> {
        let provider = self.provider_slot().take();
        if close_provider {
            if let Some(provider) = provider.as_ref().filter(|p| p.supports_close()) {
                if let Err(e) = provider.close() {
                    warn!(error = %e, "provider close failed");
                }
            }
        }
        self.asset_generation.fetch_add(1, Ordering::SeqCst);
        *self.state() = AppState::initial();
        info!("session reset");
        self.selector.clear_cached_provider()
    }

    pub fn toggle_modal(&self) {
        let mut s = self.state();
        s.show_modal = !s.show_modal;
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    pub fn dispatch(&self, kind: ActionKind) -> Result<(), PortError> {
        match kind {
            ActionKind::EthSendTransaction => self.send_test_transaction(),
            ActionKind::EthSign => self.sign_message(),
            ActionKind::PersonalSign => self.sign_personal_message(),
            ActionKind::DaiBalanceOf | ActionKind::DaiTransfer => return self.contract_call(kind),
            ActionKind::BoxGetProfile => self.open_box_profile(),
        }
        Ok(())
    }

    pub fn send_test_transaction(&self) {
        self.run_action(ActionKind::EthSendTransaction, |provider, address, chain_id| {
            let tx = self.format_test_transaction(address, chain_id);
            let tx_hash = provider.send_transaction(&tx)?;
            Ok(ActionOutcome::Transaction {
                tx_hash,
                from: address,
                to: address,
                value: "0 ETH".to_owned(),
            })
        });
    }

    pub fn sign_message(&self) {
        self.run_action(ActionKind::EthSign, |provider, address, _| {
            let hash = self.hashing.hash_personal_message(TEST_MESSAGE.as_bytes());
            let signature = provider.eth_sign(address, hash.as_slice())?;
            let signer = self.hashing.recover_signer(hash, &signature)?;
            Ok(ActionOutcome::Signature {
                address,
                signer,
                verified: signer == address,
                signature,
            })
        });
    }

    pub fn sign_personal_message(&self) {
        self.run_action(ActionKind::PersonalSign, |provider, address, _| {
            let message = TEST_MESSAGE.as_bytes();
            let signature = provider.personal_sign(message, address)?;
            let signer = self.hashing.recover_personal_signer(message, &signature)?;
            Ok(ActionOutcome::Signature {
                address,
                signer,
                verified: signer == address,
                signature,
            })
        });
    }

    pub fn contract_call(&self, kind: ActionKind) -> Result<(), PortError> {
        if !kind.is_contract_call() {
            return Err(PortError::Unsupported(format!(
                "no matching contract call for {kind}"
            )));
        }

        self.run_action(kind, |provider, address, chain_id| {
            let contract = chains::dai_contract(chain_id).ok_or_else(|| {
                PortError::Unsupported(format!("no DAI contract known for chain {chain_id}"))
            })?;

            if kind == ActionKind::DaiBalanceOf {
                let data = self
                    .abi
                    .encode_call("balanceOf(address)", &[address.to_string()])?;
                let raw = provider.call(&CallRequest {
                    from: Some(address),
                    to: contract,
                    data,
                })?;
                let balance = self.abi.decode_uint(&raw)?;
                return Ok(ActionOutcome::ContractCall {
                    result: format_token_amount(balance, 18)?,
                });
            }

            let data = self.abi.encode_call(
                "transfer(address,uint256)",
                &[address.to_string(), TEST_TOKEN_TRANSFER_AMOUNT.to_string()],
            )?;
            let tx_hash = provider.send_transaction(&TxRequest {
                from: address,
                to: contract,
                value: U256::ZERO,
                data,
                gas: None,
                gas_price: None,
                nonce: None,
            })?;
            Ok(ActionOutcome::ContractCall {
                result: tx_hash.to_string(),
            })
        });
        Ok(())
    }

    pub fn open_box_profile(&self) {
        self.run_action(ActionKind::BoxGetProfile, |provider, address, _| {
            self.profile.open_box(address, provider)?;
            let profile = self.profile.get_profile(address)?;
            Ok(ActionOutcome::Profile { profile })
        });
    }

    /// Zero-value self transfer. Nonce and gas price come from the account
    /// API; either one is left for the wallet to fill when the API fails.
    pub fn format_test_transaction(&self, address: Address, chain_id: u64) -> TxRequest {
        let nonce = match self.account_api.account_nonce(address, chain_id) {
            Ok(nonce) => Some(U256::from(nonce)),
            Err(e) => {
                warn!(error = %e, "account nonce unavailable; wallet will assign it");
                None
            }
        };
        let gas_price = match self.account_api.gas_prices() {
            Ok(prices) => Some(gwei_to_wei(prices.average.price)),
            Err(e) => {
                warn!(error = %e, "gas prices unavailable; wallet will estimate");
                None
            }
        };

        TxRequest {
            from: address,
            to: address,
            value: U256::ZERO,
            data: Default::default(),
            gas: Some(U256::from(TEST_TX_GAS_LIMIT)),
            gas_price,
            nonce,
        }
    }

    fn run_action<F>(&self, kind: ActionKind, op: F)
    where
        F: FnOnce(&W::Provider, Address, u64) -> Result<ActionOutcome, PortError>,
    {
        let Some(provider) = self.current_provider() else {
            debug!(action = %kind, "no provider connected; ignoring action");
            return;
        };
        let (address, chain_id) = {
            let s = self.state();
            match s.address {
                Some(address) => (address, s.chain_id),
                None => {
                    debug!(action = %kind, "no account selected; ignoring action");
                    return;
                }
            }
        };

        {
            let mut s = self.state();
            s.show_modal = true;
            s.pending_request = true;
            s.result = None;
        }
        self.record(kind, RequestEvent::Begin);

        let outcome = op(provider.as_ref(), address, chain_id);

        let event = {
            let mut s = self.state();
            s.pending_request = false;
            match outcome {
                Ok(outcome) => {
                    s.result = Some(ActionResult {
                        action: kind,
                        outcome,
                    });
                    RequestEvent::Succeed
                }
                Err(e) => {
                    error!(action = %kind, error = %e, "action request failed");
                    s.result = None;
                    RequestEvent::Fail
                }
            }
        };
        self.record(kind, event);
    }

    fn record(&self, action: ActionKind, event: RequestEvent) {
        let mut journal = self.journal.lock().unwrap_or_else(PoisonError::into_inner);
        let from = journal
            .iter()
            .rev()
            .find(|t| t.action == action)
            .map(|t| t.to)
            .unwrap_or(RequestPhase::Idle);
        match request_transition(from, event) {
            Ok((to, reason)) => {
                journal.push(StateTransition {
                    action,
                    from,
                    to,
                    reason,
                });
                if journal.len() > JOURNAL_LIMIT {
                    journal.remove(0);
                }
            }
            Err(e) => warn!(action = %action, error = %e, "request journal rejected transition"),
        }
    }

    fn state(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn provider_slot(&self) -> MutexGuard<'_, Option<Arc<W::Provider>>> {
        self.provider.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn gwei_to_wei(gwei: f64) -> U256 {
    if !gwei.is_finite() || gwei <= 0.0 {
        return U256::ZERO;
    }
    U256::from((gwei * 1e9).round() as u128)
}

fn format_token_amount(amount: U256, decimals: u8) -> Result<String, PortError> {
    alloy::primitives::utils::format_units(amount, decimals)
        .map_err(|e| PortError::Validation(format!("format token amount: {e}")))
}
