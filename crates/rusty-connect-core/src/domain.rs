use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Message signed by the `eth_sign` and `personal_sign` test actions.
pub const TEST_MESSAGE: &str = "My email is john@doe.com - 1537836206101";

/// Gas limit of the zero-value self transfer.
pub const TEST_TX_GAS_LIMIT: u64 = 21_000;

/// Raw token units moved by the DAI transfer action.
pub const TEST_TOKEN_TRANSFER_AMOUNT: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    EthSendTransaction,
    EthSign,
    PersonalSign,
    DaiBalanceOf,
    DaiTransfer,
    BoxGetProfile,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        ActionKind::EthSendTransaction,
        ActionKind::EthSign,
        ActionKind::PersonalSign,
        ActionKind::DaiBalanceOf,
        ActionKind::DaiTransfer,
        ActionKind::BoxGetProfile,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ActionKind::EthSendTransaction => "eth_sendTransaction",
            ActionKind::EthSign => "eth_sign",
            ActionKind::PersonalSign => "personal_sign",
            ActionKind::DaiBalanceOf => "DAI_balanceOf",
            ActionKind::DaiTransfer => "DAI_transfer",
            ActionKind::BoxGetProfile => "3Box_getProfile",
        }
    }

    pub fn is_contract_call(self) -> bool {
        matches!(self, ActionKind::DaiBalanceOf | ActionKind::DaiTransfer)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One balance entry returned by the account API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetData {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub decimals: String,
    #[serde(default)]
    pub contract_address: String,
    #[serde(default)]
    pub balance: String,
}

impl AssetData {
    /// Balance scaled by `decimals`, or the raw string when either side does not parse.
    pub fn display_balance(&self) -> String {
        let Ok(decimals) = self.decimals.trim().parse::<u8>() else {
            return self.balance.clone();
        };
        let Ok(raw) = self.balance.trim().parse::<U256>() else {
            return self.balance.clone();
        };
        match alloy::primitives::utils::format_units(raw, decimals) {
            Ok(formatted) => trim_fraction(&formatted),
            Err(_) => self.balance.clone(),
        }
    }
}

fn trim_fraction(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_owned()
            } else {
                format!("{whole}.{frac}")
            }
        }
        None => formatted.to_owned(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxProfile {
    pub name: Option<String>,
    pub description: Option<String>,
    pub job: Option<String>,
    pub employer: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub github: Option<String>,
}

/// Gas price tiers reported by the account API, in gwei.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasPrices {
    pub slow: GasPriceTier,
    pub average: GasPriceTier,
    pub fast: GasPriceTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasPriceTier {
    pub time: f64,
    pub price: f64,
}

/// `eth_sendTransaction` request object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U256>,
}

/// `eth_call` request object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderEventKind {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
    NetworkChanged(u64),
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEvent {
    pub sequence: u64,
    pub kind: ProviderEventKind,
}

/// A wallet the selector can connect to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all_fields = "camelCase")]
pub enum ActionOutcome {
    Transaction {
        tx_hash: B256,
        from: Address,
        to: Address,
        value: String,
    },
    Signature {
        address: Address,
        signer: Address,
        verified: bool,
        signature: Bytes,
    },
    ContractCall {
        result: String,
    },
    Profile {
        profile: Option<BoxProfile>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action: ActionKind,
    pub outcome: ActionOutcome,
}

impl ActionResult {
    /// Key/value rows shown in the result modal.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![("action", self.action.label().to_owned())];
        match &self.outcome {
            ActionOutcome::Transaction {
                tx_hash,
                from,
                to,
                value,
            } => {
                rows.push(("txHash", tx_hash.to_string()));
                rows.push(("from", from.to_string()));
                rows.push(("to", to.to_string()));
                rows.push(("value", value.clone()));
            }
            ActionOutcome::Signature {
                address,
                signer,
                verified,
                signature,
            } => {
                rows.push(("address", address.to_string()));
                rows.push(("signer", signer.to_string()));
                rows.push(("verified", verified.to_string()));
                rows.push(("result", signature.to_string()));
            }
            ActionOutcome::ContractCall { result } => {
                rows.push(("result", result.clone()));
            }
            ActionOutcome::Profile { profile: None } => {
                rows.push(("result", "null".to_owned()));
            }
            ActionOutcome::Profile {
                profile: Some(profile),
            } => {
                let fields = [
                    ("name", &profile.name),
                    ("description", &profile.description),
                    ("job", &profile.job),
                    ("employer", &profile.employer),
                    ("location", &profile.location),
                    ("website", &profile.website),
                    ("github", &profile.github),
                ];
                for (key, value) in fields {
                    rows.push((key, value.clone().unwrap_or_default()));
                }
            }
        }
        rows
    }
}
