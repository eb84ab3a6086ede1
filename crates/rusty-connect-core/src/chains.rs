//! Static chain metadata used for display, explorer links and contract lookup.

use alloy::primitives::{address, Address};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeCurrency {
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainData {
    pub name: &'static str,
    pub short_name: &'static str,
    pub chain: &'static str,
    pub network: &'static str,
    pub chain_id: u64,
    pub network_id: u64,
    pub rpc_url: &'static str,
    pub explorer_url: Option<&'static str>,
    pub native_currency: NativeCurrency,
    pub dai_contract: Option<Address>,
}

const ETH: NativeCurrency = NativeCurrency {
    symbol: "ETH",
    name: "Ether",
    decimals: 18,
};

pub const SUPPORTED_CHAINS: &[ChainData] = &[
    ChainData {
        name: "Ethereum Mainnet",
        short_name: "eth",
        chain: "ETH",
        network: "mainnet",
        chain_id: 1,
        network_id: 1,
        rpc_url: "https://mainnet.infura.io/v3/%API_KEY%",
        explorer_url: Some("https://etherscan.io"),
        native_currency: ETH,
        dai_contract: Some(address!("6B175474E89094C44Da98b954EedeAC495271d0F")),
    },
    ChainData {
        name: "Ethereum Ropsten",
        short_name: "rop",
        chain: "ETH",
        network: "ropsten",
        chain_id: 3,
        network_id: 3,
        rpc_url: "https://ropsten.infura.io/v3/%API_KEY%",
        explorer_url: Some("https://ropsten.etherscan.io"),
        native_currency: ETH,
        dai_contract: None,
    },
    ChainData {
        name: "Ethereum Rinkeby",
        short_name: "rin",
        chain: "ETH",
        network: "rinkeby",
        chain_id: 4,
        network_id: 4,
        rpc_url: "https://rinkeby.infura.io/v3/%API_KEY%",
        explorer_url: Some("https://rinkeby.etherscan.io"),
        native_currency: ETH,
        dai_contract: None,
    },
    ChainData {
        name: "Ethereum Görli",
        short_name: "gor",
        chain: "ETH",
        network: "goerli",
        chain_id: 5,
        network_id: 5,
        rpc_url: "https://goerli.infura.io/v3/%API_KEY%",
        explorer_url: Some("https://goerli.etherscan.io"),
        native_currency: ETH,
        dai_contract: Some(address!("11fE4B6AE13d2a6055C8D9cF65c55bac32B5d844")),
    },
    ChainData {
        name: "Ethereum Kovan",
        short_name: "kov",
        chain: "ETH",
        network: "kovan",
        chain_id: 42,
        network_id: 42,
        rpc_url: "https://kovan.infura.io/v3/%API_KEY%",
        explorer_url: Some("https://kovan.etherscan.io"),
        native_currency: ETH,
        dai_contract: Some(address!("4F96Fe3b7A6Cf9725f59d353F723c1bDb64CA6Aa")),
    },
    ChainData {
        name: "xDAI Chain",
        short_name: "xdai",
        chain: "POA",
        network: "xdai",
        chain_id: 100,
        network_id: 100,
        rpc_url: "https://dai.poa.network",
        explorer_url: Some("https://gnosisscan.io"),
        native_currency: NativeCurrency {
            symbol: "xDAI",
            name: "xDAI",
            decimals: 18,
        },
        dai_contract: None,
    },
    ChainData {
        name: "Ethereum Sepolia",
        short_name: "sep",
        chain: "ETH",
        network: "sepolia",
        chain_id: 11_155_111,
        network_id: 11_155_111,
        rpc_url: "https://sepolia.infura.io/v3/%API_KEY%",
        explorer_url: Some("https://sepolia.etherscan.io"),
        native_currency: ETH,
        dai_contract: None,
    },
    ChainData {
        name: "Local Devnet",
        short_name: "dev",
        chain: "ETH",
        network: "devnet",
        chain_id: 1337,
        network_id: 1337,
        rpc_url: "http://127.0.0.1:8545",
        explorer_url: None,
        native_currency: ETH,
        dai_contract: None,
    },
    ChainData {
        name: "Anvil",
        short_name: "anvil",
        chain: "ETH",
        network: "anvil",
        chain_id: 31_337,
        network_id: 31_337,
        rpc_url: "http://127.0.0.1:8545",
        explorer_url: None,
        native_currency: ETH,
        dai_contract: None,
    },
];

pub fn chain_data(chain_id: u64) -> Option<&'static ChainData> {
    SUPPORTED_CHAINS.iter().find(|c| c.chain_id == chain_id)
}

pub fn network_name(chain_id: u64) -> &'static str {
    chain_data(chain_id).map(|c| c.network).unwrap_or("unknown")
}

pub fn dai_contract(chain_id: u64) -> Option<Address> {
    chain_data(chain_id).and_then(|c| c.dai_contract)
}

pub fn explorer_address_url(chain_id: u64, address: &Address) -> Option<String> {
    chain_data(chain_id)
        .and_then(|c| c.explorer_url)
        .map(|base| format!("{base}/address/{address}"))
}

pub fn explorer_tx_url(chain_id: u64, tx_hash: &str) -> Option<String> {
    chain_data(chain_id)
        .and_then(|c| c.explorer_url)
        .map(|base| format!("{base}/tx/{tx_hash}"))
}
