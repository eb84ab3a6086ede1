mod common;

use serde_json::json;

use rusty_connect_adapters::{
    AbiAdapter, AccountApiAdapter, ConnectConfig, HashingAdapter, ProfileAdapter,
    WalletSelectorAdapter,
};
use rusty_connect_core::{ActionKind, ActionOutcome, Controller, ModalView, WalletSelectorPort};

use common::{dev_address, dev_config, spawn_mock_server, temp_cache_path};

type LocalController = Controller<
    WalletSelectorAdapter,
    AccountApiAdapter,
    ProfileAdapter,
    AbiAdapter,
    HashingAdapter,
>;

fn controller() -> (LocalController, ConnectConfig) {
    let (base_url, _calls) = spawn_mock_server(|_, url, _| {
        if url.starts_with("/account-assets") {
            (
                200,
                json!({"success": true, "result": [{
                    "symbol": "ETH",
                    "name": "Ethereum",
                    "decimals": "18",
                    "contractAddress": "",
                    "balance": "1000000000000000000"
                }]}),
            )
        } else if url.starts_with("/account-nonce") {
            (200, json!({"success": true, "result": 0}))
        } else if url.starts_with("/gas-prices") {
            (
                200,
                json!({"success": true, "result": {
                    "slow": {"time": 10.0, "price": 1.0},
                    "average": {"time": 3.0, "price": 2.0},
                    "fast": {"time": 1.0, "price": 3.0}
                }}),
            )
        } else {
            (404, json!({"success": false}))
        }
    });

    let cfg = ConnectConfig {
        account_api_base_url: base_url.clone(),
        profile_api_base_url: base_url,
        cache_provider: true,
        cache_path: Some(temp_cache_path("controller")),
        ..dev_config()
    };
    let ctl = Controller::new(
        WalletSelectorAdapter::with_config(cfg.clone()),
        AccountApiAdapter::with_config(&cfg).expect("account api"),
        ProfileAdapter::with_config(&cfg).expect("profile"),
        AbiAdapter,
        HashingAdapter,
    );
    (ctl, cfg)
}

#[test]
fn local_session_connects_and_loads_balances() {
    let (ctl, _) = controller();
    ctl.connect(Some("local")).expect("connect");

    let s = ctl.snapshot();
    assert!(s.connected);
    assert_eq!(s.address, Some(dev_address()));
    assert_eq!(s.chain_id, 1);
    assert_eq!(s.provider_id.as_deref(), Some("local"));
    assert!(!s.fetching);
    assert_eq!(s.assets.len(), 1);
    assert_eq!(s.assets[0].display_balance(), "1");
}

#[test]
fn signing_actions_verify_against_the_local_key() {
    let (ctl, _) = controller();
    ctl.connect(Some("local")).expect("connect");

    for kind in [ActionKind::EthSign, ActionKind::PersonalSign] {
        ctl.dispatch(kind).expect("dispatch");
        let s = ctl.snapshot();
        let ModalView::Approved(result) = s.modal_view() else {
            panic!("{kind} should be approved, got {:?}", s.modal_view());
        };
        match &result.outcome {
            ActionOutcome::Signature {
                signer, verified, ..
            } => {
                assert_eq!(*signer, dev_address());
                assert!(verified);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}

#[test]
fn transaction_and_contract_actions_settle_approved() {
    let (ctl, _) = controller();
    ctl.connect(Some("local")).expect("connect");

    ctl.dispatch(ActionKind::EthSendTransaction).expect("send");
    assert!(matches!(
        ctl.snapshot().result.map(|r| r.outcome),
        Some(ActionOutcome::Transaction { .. })
    ));

    ctl.dispatch(ActionKind::DaiBalanceOf).expect("balanceOf");
    match ctl.snapshot().result.map(|r| r.outcome) {
        Some(ActionOutcome::ContractCall { result }) => assert!(result.starts_with("0.0")),
        other => panic!("unexpected outcome {other:?}"),
    }

    ctl.dispatch(ActionKind::DaiTransfer).expect("transfer");
    assert!(ctl.snapshot().result.is_some());
}

#[test]
fn missing_profile_is_an_approved_null_result() {
    let (ctl, _) = controller();
    ctl.connect(Some("local")).expect("connect");
    ctl.dispatch(ActionKind::BoxGetProfile).expect("profile");

    let s = ctl.snapshot();
    assert!(!s.pending_request);
    assert_eq!(
        s.result.map(|r| r.outcome),
        Some(ActionOutcome::Profile { profile: None })
    );
}

#[test]
fn reset_forgets_the_cached_provider() {
    let (ctl, cfg) = controller();
    ctl.connect(Some("local")).expect("connect");
    assert_eq!(ctl.selector.cached_provider().as_deref(), Some("local"));

    let provider = ctl.current_provider().expect("provider");
    ctl.reset().expect("reset");

    assert!(!ctl.snapshot().connected);
    assert!(ctl.selector.cached_provider().is_none());
    assert!(!cfg.cache_path.expect("path").exists());
    assert!(rusty_connect_core::ProviderPort::accounts(provider.as_ref()).is_err());
}

#[test]
fn injected_close_event_resets_the_session() {
    let (ctl, _) = controller();
    ctl.connect(Some("local")).expect("connect");
    ctl.current_provider()
        .expect("provider")
        .debug_inject_close()
        .expect("inject close");

    ctl.pump_events().expect("pump");
    assert!(!ctl.snapshot().connected);
    assert!(ctl.current_provider().is_none());
}
