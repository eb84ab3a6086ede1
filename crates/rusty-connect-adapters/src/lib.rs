pub mod abi;
pub mod account_api;
pub mod config;
pub mod eip1193;
pub mod hashing;
pub mod profile;
pub mod selector;

pub use abi::AbiAdapter;
pub use account_api::AccountApiAdapter;
pub use config::{ConnectConfig, RuntimeProfile};
pub use eip1193::Eip1193Adapter;
pub use hashing::HashingAdapter;
pub use profile::ProfileAdapter;
pub use selector::WalletSelectorAdapter;
