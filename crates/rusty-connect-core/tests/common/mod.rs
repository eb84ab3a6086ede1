#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};

use rusty_connect_core::{
    AbiPort, AccountApiPort, AssetData, BoxProfile, CallRequest, Controller, GasPriceTier,
    GasPrices, HashingPort, PortError, ProfilePort, ProviderDescriptor, ProviderEvent,
    ProviderEventKind, ProviderPort, TxRequest, WalletSelectorPort,
};

pub type TestController =
    Controller<FakeSelector, FakeAccountApi, FakeProfile, FakeAbi, FakeHashing>;

pub fn account(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn abc_address() -> Address {
    "0x0000000000000000000000000000000000000abc"
        .parse()
        .expect("valid abc address")
}

pub fn asset(symbol: &str, balance: &str) -> AssetData {
    AssetData {
        symbol: symbol.to_owned(),
        name: symbol.to_owned(),
        decimals: "18".to_owned(),
        contract_address: String::new(),
        balance: balance.to_owned(),
    }
}

/// Wallet double: signatures embed the signing address so `FakeHashing`
/// can "recover" it.
#[derive(Debug, Clone)]
pub struct FakeWallet {
    inner: Arc<Mutex<FakeWalletState>>,
}

#[derive(Debug)]
pub struct FakeWalletState {
    pub accounts: Vec<Address>,
    pub chain_id: u64,
    pub network_id: u64,
    pub events: Vec<ProviderEvent>,
    pub event_seq: u64,
    pub supports_events: bool,
    pub subscribed: bool,
    pub closed: bool,
    pub fail_requests: bool,
    pub sign_as: Option<Address>,
    pub sent: Vec<TxRequest>,
    pub calls: Vec<CallRequest>,
    pub call_result: Bytes,
}

impl FakeWallet {
    pub fn new(accounts: Vec<Address>, chain_id: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeWalletState {
                accounts,
                chain_id,
                network_id: chain_id,
                events: Vec::new(),
                event_seq: 0,
                supports_events: true,
                subscribed: false,
                closed: false,
                fail_requests: false,
                sign_as: None,
                sent: Vec::new(),
                calls: Vec::new(),
                call_result: Bytes::from(U256::from(5u64).to_be_bytes::<32>().to_vec()),
            })),
        }
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut FakeWalletState) -> R) -> R {
        let mut g = self.inner.lock().expect("fake wallet lock");
        f(&mut g)
    }

    pub fn push_event(&self, kind: ProviderEventKind) {
        self.with_state(|s| {
            match &kind {
                ProviderEventKind::AccountsChanged(accounts) => s.accounts = accounts.clone(),
                ProviderEventKind::ChainChanged(chain_id) => s.chain_id = *chain_id,
                ProviderEventKind::NetworkChanged(network_id) => s.network_id = *network_id,
                ProviderEventKind::Close => {}
            }
            s.event_seq += 1;
            let sequence = s.event_seq;
            s.events.push(ProviderEvent { sequence, kind });
        });
    }

    fn check(&self) -> Result<(), PortError> {
        if self.with_state(|s| s.fail_requests) {
            return Err(PortError::Transport("user rejected request".to_owned()));
        }
        Ok(())
    }

    fn signature_for(&self, address: Address) -> Bytes {
        let signer = self.with_state(|s| s.sign_as).unwrap_or(address);
        let mut sig = signer.to_vec();
        sig.resize(65, 0x1b);
        Bytes::from(sig)
    }
}

impl ProviderPort for FakeWallet {
    fn id(&self) -> &str {
        "fake"
    }

    fn accounts(&self) -> Result<Vec<Address>, PortError> {
        Ok(self.with_state(|s| s.accounts.clone()))
    }

    fn chain_id(&self) -> Result<u64, PortError> {
        Ok(self.with_state(|s| s.chain_id))
    }

    fn net_version(&self) -> Result<u64, PortError> {
        Ok(self.with_state(|s| s.network_id))
    }

    fn send_transaction(&self, tx: &TxRequest) -> Result<B256, PortError> {
        self.check()?;
        let hash = keccak256(serde_json::to_vec(tx).expect("serialize tx"));
        self.with_state(|s| s.sent.push(tx.clone()));
        Ok(hash)
    }

    fn eth_sign(&self, address: Address, _data: &[u8]) -> Result<Bytes, PortError> {
        self.check()?;
        Ok(self.signature_for(address))
    }

    fn personal_sign(&self, _data: &[u8], address: Address) -> Result<Bytes, PortError> {
        self.check()?;
        Ok(self.signature_for(address))
    }

    fn call(&self, request: &CallRequest) -> Result<Bytes, PortError> {
        self.check()?;
        Ok(self.with_state(|s| {
            s.calls.push(request.clone());
            s.call_result.clone()
        }))
    }

    fn supports_events(&self) -> bool {
        self.with_state(|s| s.supports_events)
    }

    fn subscribe(&self) -> Result<(), PortError> {
        self.with_state(|s| s.subscribed = true);
        Ok(())
    }

    fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError> {
        Ok(self.with_state(|s| std::mem::take(&mut s.events)))
    }

    fn supports_close(&self) -> bool {
        true
    }

    fn close(&self) -> Result<(), PortError> {
        self.with_state(|s| s.closed = true);
        Ok(())
    }
}

#[derive(Debug)]
pub struct FakeSelector {
    pub wallet: FakeWallet,
    pub cached: Mutex<Option<String>>,
    pub cleared: AtomicUsize,
}

impl FakeSelector {
    pub fn new(wallet: FakeWallet) -> Self {
        Self {
            wallet,
            cached: Mutex::new(None),
            cleared: AtomicUsize::new(0),
        }
    }

    pub fn cleared_count(&self) -> usize {
        self.cleared.load(Ordering::SeqCst)
    }
}

impl WalletSelectorPort for FakeSelector {
    type Provider = FakeWallet;

    fn options(&self) -> Vec<ProviderDescriptor> {
        vec![ProviderDescriptor {
            id: "fake".to_owned(),
            name: "Fake".to_owned(),
            description: "in-memory wallet".to_owned(),
            available: true,
        }]
    }

    fn connect(&self, provider_id: Option<&str>) -> Result<FakeWallet, PortError> {
        if let Some(id) = provider_id {
            if id != "fake" {
                return Err(PortError::NotFound(format!("unknown provider: {id}")));
            }
        }
        *self.cached.lock().expect("cache lock") = Some("fake".to_owned());
        Ok(self.wallet.clone())
    }

    fn cached_provider(&self) -> Option<String> {
        self.cached.lock().expect("cache lock").clone()
    }

    fn clear_cached_provider(&self) -> Result<(), PortError> {
        self.cleared.fetch_add(1, Ordering::SeqCst);
        *self.cached.lock().expect("cache lock") = None;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeAccountApi {
    pub assets: Mutex<HashMap<Address, Vec<AssetData>>>,
    pub requests: Mutex<Vec<(Address, u64)>>,
    pub fail_assets: Mutex<bool>,
    pub nonce: Mutex<Option<u64>>,
    pub gas_gwei: Mutex<Option<f64>>,
    /// Per-address latency applied after the request is recorded.
    pub delays: Mutex<HashMap<Address, Duration>>,
}

impl FakeAccountApi {
    pub fn set_assets(&self, address: Address, assets: Vec<AssetData>) {
        self.assets
            .lock()
            .expect("assets lock")
            .insert(address, assets);
    }

    pub fn requests(&self) -> Vec<(Address, u64)> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn set_delay(&self, address: Address, delay: Duration) {
        self.delays
            .lock()
            .expect("delays lock")
            .insert(address, delay);
    }

    /// Block until a fetch for `address` has started.
    pub fn wait_for_request(&self, address: Address) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !self.requests().iter().any(|(a, _)| *a == address) {
            assert!(Instant::now() < deadline, "no asset request for {address}");
            thread::sleep(Duration::from_millis(5));
        }
    }
}

impl AccountApiPort for FakeAccountApi {
    fn account_assets(&self, address: Address, chain_id: u64) -> Result<Vec<AssetData>, PortError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push((address, chain_id));
        let delay = self.delays.lock().expect("delays lock").get(&address).copied();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        if *self.fail_assets.lock().expect("fail lock") {
            return Err(PortError::Transport("assets api down".to_owned()));
        }
        Ok(self
            .assets
            .lock()
            .expect("assets lock")
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }

    fn account_nonce(&self, _address: Address, _chain_id: u64) -> Result<u64, PortError> {
        self.nonce
            .lock()
            .expect("nonce lock")
            .ok_or_else(|| PortError::Transport("nonce api down".to_owned()))
    }

    fn gas_prices(&self) -> Result<GasPrices, PortError> {
        let price = self
            .gas_gwei
            .lock()
            .expect("gas lock")
            .ok_or_else(|| PortError::Transport("gas api down".to_owned()))?;
        let tier = GasPriceTier { time: 1.0, price };
        Ok(GasPrices {
            slow: tier.clone(),
            average: tier.clone(),
            fast: tier,
        })
    }
}

#[derive(Debug, Default)]
pub struct FakeProfile {
    pub profile: Mutex<Option<BoxProfile>>,
    pub opened: Mutex<Vec<Address>>,
}

impl ProfilePort for FakeProfile {
    fn open_box<P: ProviderPort>(&self, address: Address, provider: &P) -> Result<(), PortError> {
        provider.personal_sign(b"open box", address)?;
        self.opened.lock().expect("opened lock").push(address);
        Ok(())
    }

    fn get_profile(&self, _address: Address) -> Result<Option<BoxProfile>, PortError> {
        Ok(self.profile.lock().expect("profile lock").clone())
    }
}

#[derive(Debug, Default)]
pub struct FakeAbi;

impl AbiPort for FakeAbi {
    fn encode_call(&self, method_signature: &str, args: &[String]) -> Result<Bytes, PortError> {
        let mut out = keccak256(method_signature.as_bytes()).as_slice()[..4].to_vec();
        for arg in args {
            out.extend_from_slice(arg.as_bytes());
        }
        Ok(Bytes::from(out))
    }

    fn decode_uint(&self, data: &[u8]) -> Result<U256, PortError> {
        U256::try_from_be_slice(data)
            .ok_or_else(|| PortError::Validation("word too long".to_owned()))
    }
}

#[derive(Debug, Default)]
pub struct FakeHashing;

impl HashingPort for FakeHashing {
    fn hash_personal_message(&self, message: &[u8]) -> B256 {
        keccak256(message)
    }

    fn recover_signer(&self, _hash: B256, signature: &[u8]) -> Result<Address, PortError> {
        recover_embedded(signature)
    }

    fn recover_personal_signer(
        &self,
        _message: &[u8],
        signature: &[u8],
    ) -> Result<Address, PortError> {
        recover_embedded(signature)
    }
}

fn recover_embedded(signature: &[u8]) -> Result<Address, PortError> {
    if signature.len() != 65 {
        return Err(PortError::Validation("signature must be 65 bytes".to_owned()));
    }
    Ok(Address::from_slice(&signature[..20]))
}

pub fn new_controller(wallet: FakeWallet) -> TestController {
    Controller::new(
        FakeSelector::new(wallet),
        FakeAccountApi::default(),
        FakeProfile::default(),
        FakeAbi,
        FakeHashing,
    )
}
