use alloy::primitives::Address;
use thiserror::Error;

use crate::domain::{ActionKind, ActionResult, AssetData};

/// Mutable record behind the demo window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub fetching: bool,
    pub address: Option<Address>,
    pub chain_id: u64,
    pub network_id: u64,
    pub connected: bool,
    pub provider_id: Option<String>,
    pub assets: Vec<AssetData>,
    pub show_modal: bool,
    pub pending_request: bool,
    pub result: Option<ActionResult>,
}

impl AppState {
    pub fn initial() -> Self {
        Self {
            fetching: false,
            address: None,
            chain_id: 1,
            network_id: 1,
            connected: false,
            provider_id: None,
            assets: Vec::new(),
            show_modal: false,
            pending_request: false,
            result: None,
        }
    }

    pub fn modal_view(&self) -> ModalView<'_> {
        if !self.show_modal {
            ModalView::Hidden
        } else if self.pending_request {
            ModalView::Pending
        } else if let Some(result) = &self.result {
            ModalView::Approved(result)
        } else {
            ModalView::Rejected
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::initial()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalView<'a> {
    Hidden,
    Pending,
    Approved(&'a ActionResult),
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Pending,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEvent {
    Begin,
    Succeed,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub action: ActionKind,
    pub from: RequestPhase,
    pub to: RequestPhase,
    pub reason: &'static str,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("illegal request transition: {from:?} on {event:?}")]
pub struct IllegalTransition {
    pub from: RequestPhase,
    pub event: RequestEvent,
}

/// A settled request may be started again; only a pending one can settle.
pub fn request_transition(
    from: RequestPhase,
    event: RequestEvent,
) -> Result<(RequestPhase, &'static str), IllegalTransition> {
    match (from, event) {
        (RequestPhase::Idle | RequestPhase::Settled, RequestEvent::Begin) => {
            Ok((RequestPhase::Pending, "request_started"))
        }
        (RequestPhase::Pending, RequestEvent::Succeed) => {
            Ok((RequestPhase::Settled, "request_approved"))
        }
        (RequestPhase::Pending, RequestEvent::Fail) => {
            Ok((RequestPhase::Settled, "request_rejected"))
        }
        _ => Err(IllegalTransition { from, event }),
    }
}
