//! Bridge between the egui shell and the connect controller.
//! Controller calls block on HTTP, so every one runs on the tokio blocking pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use eframe::egui;
use tokio::runtime::Runtime;

use rusty_connect_adapters::{
    AbiAdapter, AccountApiAdapter, ConnectConfig, HashingAdapter, ProfileAdapter,
    WalletSelectorAdapter,
};
use rusty_connect_core::{
    ActionKind, AppState, Controller, PortError, ProviderDescriptor, WalletSelectorPort,
};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(1_000);

pub type ConnectController = Controller<
    WalletSelectorAdapter,
    AccountApiAdapter,
    ProfileAdapter,
    AbiAdapter,
    HashingAdapter,
>;

pub struct ConnectBridge {
    controller: Arc<ConnectController>,
    runtime: Runtime,
    connecting: Arc<AtomicBool>,
    connect_error: Arc<Mutex<Option<String>>>,
}

impl ConnectBridge {
    pub fn new(config: ConnectConfig) -> Result<Self, PortError> {
        let controller = Controller::new(
            WalletSelectorAdapter::with_config(config.clone()),
            AccountApiAdapter::with_config(&config)?,
            ProfileAdapter::with_config(&config)?,
            AbiAdapter,
            HashingAdapter,
        );
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .thread_name("rusty-connect-worker")
            .build()
            .map_err(|e| PortError::Transport(format!("failed to start runtime: {e}")))?;

        Ok(Self {
            controller: Arc::new(controller),
            runtime,
            connecting: Arc::new(AtomicBool::new(false)),
            connect_error: Arc::new(Mutex::new(None)),
        })
    }

    pub fn snapshot(&self) -> AppState {
        self.controller.snapshot()
    }

    pub fn options(&self) -> Vec<ProviderDescriptor> {
        self.controller.selector.options()
    }

    pub fn has_cached_provider(&self) -> bool {
        self.controller.selector.cached_provider().is_some()
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting.load(Ordering::SeqCst)
    }

    pub fn connect_error(&self) -> Option<String> {
        self.connect_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_connect_error(&self) {
        self.connect_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Connect to `provider_id`, or restore the cached provider when `None`.
    pub fn connect(&self, provider_id: Option<String>, ctx: &egui::Context) {
        if self.connecting.swap(true, Ordering::SeqCst) {
            return;
        }
        self.clear_connect_error();

        let controller = Arc::clone(&self.controller);
        let connecting = Arc::clone(&self.connecting);
        let connect_error = Arc::clone(&self.connect_error);
        let ctx = ctx.clone();
        self.runtime.spawn_blocking(move || {
            let outcome = match provider_id.as_deref() {
                Some(id) => controller.connect(Some(id)),
                None => controller.restore_session().map(|_| ()),
            };
            if let Err(e) = outcome {
                tracing::error!(error = %e, "wallet connection failed");
                *connect_error.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(e.to_string());
            }
            connecting.store(false, Ordering::SeqCst);
            ctx.request_repaint();
        });
    }

    pub fn dispatch(&self, kind: ActionKind, ctx: &egui::Context) {
        let controller = Arc::clone(&self.controller);
        let ctx = ctx.clone();
        self.runtime.spawn_blocking(move || {
            if let Err(e) = controller.dispatch(kind) {
                tracing::warn!(action = %kind, error = %e, "action not dispatched");
            }
            ctx.request_repaint();
        });
    }

    pub fn reset(&self, ctx: &egui::Context) {
        let controller = Arc::clone(&self.controller);
        let ctx = ctx.clone();
        self.runtime.spawn_blocking(move || {
            if let Err(e) = controller.reset() {
                tracing::warn!(error = %e, "reset could not clear cached provider");
            }
            ctx.request_repaint();
        });
    }

    pub fn toggle_modal(&self) {
        self.controller.toggle_modal();
    }

    /// Poll provider events for the lifetime of the runtime.
    pub fn start_event_pump(&self, ctx: &egui::Context) {
        let controller = Arc::clone(&self.controller);
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let mut interval = tokio::time::interval(EVENT_POLL_INTERVAL);
            loop {
                interval.tick().await;
                let c = Arc::clone(&controller);
                match tokio::task::spawn_blocking(move || c.pump_events()).await {
                    Ok(Ok(0)) => {}
                    Ok(Ok(applied)) => {
                        tracing::debug!(applied, "provider events applied");
                        ctx.request_repaint();
                    }
                    Ok(Err(e)) => tracing::debug!(error = %e, "provider event poll failed"),
                    Err(e) => tracing::warn!(error = %e, "event pump task aborted"),
                }
            }
        });
    }
}
