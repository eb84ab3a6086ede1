use alloy::primitives::{Address, Bytes, B256, U256};
use thiserror::Error;

use crate::domain::{
    AssetData, BoxProfile, CallRequest, GasPrices, ProviderDescriptor, ProviderEvent, TxRequest,
};

#[derive(Debug, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("policy error: {0}")]
    Policy(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Wallet transport obtained from the selector.
pub trait ProviderPort: Send + Sync {
    /// Selector id this provider was created from.
    fn id(&self) -> &str;
    fn accounts(&self) -> Result<Vec<Address>, PortError>;
    fn chain_id(&self) -> Result<u64, PortError>;
    fn net_version(&self) -> Result<u64, PortError>;
    fn send_transaction(&self, tx: &TxRequest) -> Result<B256, PortError>;
    /// `eth_sign` over raw bytes (the test action passes a 32-byte hash).
    fn eth_sign(&self, address: Address, data: &[u8]) -> Result<Bytes, PortError>;
    fn personal_sign(&self, data: &[u8], address: Address) -> Result<Bytes, PortError>;
    fn call(&self, request: &CallRequest) -> Result<Bytes, PortError>;

    fn supports_events(&self) -> bool {
        true
    }
    fn subscribe(&self) -> Result<(), PortError>;
    fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError>;

    fn supports_close(&self) -> bool {
        false
    }
    fn close(&self) -> Result<(), PortError> {
        Err(PortError::NotImplemented("provider.close"))
    }
}

/// Provider-selection modal plus its cached-provider flag.
pub trait WalletSelectorPort: Send + Sync {
    type Provider: ProviderPort;

    fn options(&self) -> Vec<ProviderDescriptor>;
    fn connect(&self, provider_id: Option<&str>) -> Result<Self::Provider, PortError>;
    fn cached_provider(&self) -> Option<String>;
    fn clear_cached_provider(&self) -> Result<(), PortError>;
}

/// Account asset lookup service keyed by address and chain id.
pub trait AccountApiPort: Send + Sync {
    fn account_assets(&self, address: Address, chain_id: u64) -> Result<Vec<AssetData>, PortError>;
    fn account_nonce(&self, address: Address, chain_id: u64) -> Result<u64, PortError>;
    fn gas_prices(&self) -> Result<GasPrices, PortError>;
}

pub trait ProfilePort: Send + Sync {
    fn open_box<P: ProviderPort>(&self, address: Address, provider: &P) -> Result<(), PortError>;
    fn get_profile(&self, address: Address) -> Result<Option<BoxProfile>, PortError>;
}

pub trait AbiPort: Send + Sync {
    /// Selector-prefixed calldata for a human-readable signature such as `transfer(address,uint256)`.
    fn encode_call(&self, method_signature: &str, args: &[String]) -> Result<Bytes, PortError>;
    fn decode_uint(&self, data: &[u8]) -> Result<U256, PortError>;
}

pub trait HashingPort: Send + Sync {
    fn hash_personal_message(&self, message: &[u8]) -> B256;
    fn recover_signer(&self, hash: B256, signature: &[u8]) -> Result<Address, PortError>;
    fn recover_personal_signer(
        &self,
        message: &[u8],
        signature: &[u8],
    ) -> Result<Address, PortError>;
}
