//! Main application state and update loop

use std::time::Duration;

use eframe::egui;
use egui_extras::{Column, TableBuilder};

use rusty_connect_core::{chains, network_name, ActionKind, ActionResult, AppState, ModalView};

use crate::bridge::ConnectBridge;
use crate::ui;

const BUSY_REPAINT: Duration = Duration::from_millis(100);

const GIT_HASH: &str = env!("GIT_HASH");
const BUILD_TIME: &str = env!("BUILD_TIME");

/// The main application state
pub struct App {
    bridge: ConnectBridge,
    /// Provider-selection modal visibility (UI-only)
    show_provider_modal: bool,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, bridge: ConnectBridge) -> Self {
        bridge.start_event_pump(&cc.egui_ctx);
        if bridge.has_cached_provider() {
            bridge.connect(None, &cc.egui_ctx);
        }
        Self {
            bridge,
            show_provider_modal: false,
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        let state = self.bridge.snapshot();
        if state.pending_request || state.fetching || self.bridge.is_connecting() {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
        if state.connected {
            self.show_provider_modal = false;
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            self.render_header(ui, ctx, &state);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let short_hash = GIT_HASH.get(..7).unwrap_or(GIT_HASH);
                ui.label(
                    egui::RichText::new(format!(
                        "v{} · {short_hash} · built {BUILD_TIME}",
                        env!("CARGO_PKG_VERSION")
                    ))
                    .weak()
                    .small(),
                );
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(10.0);
                if state.connected {
                    self.render_actions(ui, ctx, &state);
                    self.render_balances(ui, &state);
                } else {
                    self.render_connect(ui, &state);
                }
                ui.add_space(20.0);
            });
        });

        self.render_provider_modal(ctx);
        self.render_result_modal(ctx, &state);
    }
}

impl App {
    fn render_header(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, state: &AppState) {
        ui.horizontal(|ui| {
            ui.heading(egui::RichText::new("🔌 Rusty-Connect").size(22.0).color(ui::ACCENT));
            ui.add_space(30.0);

            let Some(address) = state.address.filter(|_| state.connected) else {
                return;
            };
            ui.separator();
            ui.vertical(|ui| {
                ui.label(
                    egui::RichText::new(format!("Connected to {}", network_name(state.chain_id)))
                        .small(),
                );
                ui::address_link(ui, state.chain_id, &address);
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui::secondary_button(ui, "Disconnect").clicked() {
                    self.bridge.reset(ctx);
                }
            });
        });
    }

    fn render_connect(&mut self, ui: &mut egui::Ui, state: &AppState) {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui::styled_heading(ui, "Test Wallet Connection");
            ui.label("Connect a wallet to try signing, transactions and contract calls.");
            ui.add_space(20.0);

            if self.bridge.is_connecting() || state.fetching {
                ui::loading_spinner(ui, "Connecting...");
                return;
            }
            if ui::primary_button_enabled(ui, "Connect to Wallet", true).clicked() {
                self.bridge.clear_connect_error();
                self.show_provider_modal = true;
            }
        });
    }

    fn render_actions(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, state: &AppState) {
        ui::section_header(ui, "Actions");
        let enabled = !state.pending_request;
        egui::Grid::new("action_grid")
            .num_columns(3)
            .spacing([12.0, 12.0])
            .show(ui, |ui| {
                for (idx, kind) in ActionKind::ALL.iter().copied().enumerate() {
                    if ui::primary_button_enabled(ui, kind.label(), enabled).clicked() {
                        self.bridge.dispatch(kind, ctx);
                        ctx.request_repaint_after(BUSY_REPAINT);
                    }
                    if idx % 3 == 2 {
                        ui.end_row();
                    }
                }
            });
        if chains::dai_contract(state.chain_id).is_none() {
            ui.label(
                egui::RichText::new(format!(
                    "No DAI contract known on {}; DAI actions will be rejected.",
                    network_name(state.chain_id)
                ))
                .weak()
                .small(),
            );
        }
    }

    fn render_balances(&self, ui: &mut egui::Ui, state: &AppState) {
        ui::section_header(ui, "Balances");
        if state.fetching {
            ui::loading_spinner(ui, "Fetching balances...");
            return;
        }
        if state.assets.is_empty() {
            ui.label(egui::RichText::new("No assets found").weak());
            return;
        }

        ui::card(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto().at_least(160.0))
                .column(Column::remainder())
                .header(20.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Asset");
                    });
                    header.col(|ui| {
                        ui.strong("Balance");
                    });
                })
                .body(|mut body| {
                    for asset in &state.assets {
                        body.row(22.0, |mut row| {
                            row.col(|ui| {
                                ui.label(format!("{} ({})", asset.name, asset.symbol));
                            });
                            row.col(|ui| {
                                ui.label(
                                    egui::RichText::new(format!(
                                        "{} {}",
                                        asset.display_balance(),
                                        asset.symbol
                                    ))
                                    .monospace(),
                                );
                            });
                        });
                    }
                });
        });
    }

    fn render_provider_modal(&mut self, ctx: &egui::Context) {
        if !self.show_provider_modal {
            return;
        }

        let mut open = true;
        egui::Window::new("Select a wallet")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut open)
            .show(ctx, |ui| {
                for option in self.bridge.options() {
                    ui::card(ui, |ui| {
                        ui.set_min_width(320.0);
                        ui.horizontal(|ui| {
                            ui.vertical(|ui| {
                                ui.label(egui::RichText::new(&option.name).strong());
                                ui.label(egui::RichText::new(&option.description).weak().small());
                            });
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    let enabled = option.available && !self.bridge.is_connecting();
                                    if ui.add_enabled(enabled, egui::Button::new("Connect")).clicked() {
                                        self.bridge.connect(Some(option.id.clone()), ctx);
                                    }
                                },
                            );
                        });
                    });
                    ui.add_space(6.0);
                }

                if self.bridge.is_connecting() {
                    ui::loading_spinner(ui, "Waiting for wallet...");
                }
                if let Some(err) = self.bridge.connect_error() {
                    ui::error_message(ui, &err);
                }
            });

        if !open {
            self.show_provider_modal = false;
        }
    }

    fn render_result_modal(&mut self, ctx: &egui::Context, state: &AppState) {
        let view = state.modal_view();
        if view == ModalView::Hidden {
            return;
        }

        let mut close = false;
        egui::Window::new("Request")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_min_width(420.0);
                match view {
                    ModalView::Pending => {
                        ui::styled_heading(ui, "Pending Call Request");
                        ui.add_space(8.0);
                        ui::loading_spinner(ui, "Approve or reject request using your wallet");
                    }
                    ModalView::Approved(result) => {
                        ui::styled_heading(ui, "Call Request Approved");
                        ui.add_space(8.0);
                        render_result_rows(ui, result);
                    }
                    ModalView::Rejected => {
                        ui::styled_heading(ui, "Call Request Rejected");
                    }
                    ModalView::Hidden => {}
                }
                ui.add_space(12.0);
                if ui::secondary_button(ui, "Close").clicked() {
                    close = true;
                }
            });

        if close {
            self.bridge.toggle_modal();
        }
    }
}

fn render_result_rows(ui: &mut egui::Ui, result: &ActionResult) {
    egui::Grid::new("result_rows")
        .num_columns(2)
        .striped(true)
        .spacing([16.0, 6.0])
        .show(ui, |ui| {
            for (key, value) in result.display_rows() {
                ui.label(egui::RichText::new(key).strong());
                ui::copyable_value(ui, &value);
                ui.end_row();
            }
        });
    if let Ok(all) = serde_json::to_string_pretty(result) {
        if ui.small_button("Copy as JSON").clicked() {
            ui::copy_to_clipboard(&all);
        }
    }
}
