pub mod chains;
pub mod controller;
pub mod domain;
pub mod ports;
pub mod state_machine;

pub use chains::{chain_data, network_name, ChainData};
pub use controller::Controller;
pub use domain::{
    ActionKind, ActionOutcome, ActionResult, AssetData, BoxProfile, CallRequest, GasPriceTier,
    GasPrices, ProviderDescriptor, ProviderEvent, ProviderEventKind, TxRequest, TEST_MESSAGE,
};
pub use ports::{
    AbiPort, AccountApiPort, HashingPort, PortError, ProfilePort, ProviderPort, WalletSelectorPort,
};
pub use state_machine::{
    request_transition, AppState, IllegalTransition, ModalView, RequestEvent, RequestPhase,
    StateTransition,
};
