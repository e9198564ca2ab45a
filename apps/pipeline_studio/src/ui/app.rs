use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::protocol::{ConsoleMessage, MessageKind};
use studio_core::{ConfigStore, ConsoleStore};

use crate::{
    app_state::StudioServices,
    controller::{
        events::{UiEvent, ViewEvent, KEY_ENTER, KEY_ESCAPE},
        orchestration::drain_ui_events,
        top_panel::TopPanelController,
    },
    ui::export_modal::show_export_window,
};

const NAME_INPUT_ID: &str = "pipeline-name-input";
const PLUGIN_TYPES: [&str; 3] = ["batchsource", "transform", "batchsink"];

fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "fa-sliders" => "⚙",
        "icon-export" => "⤓",
        "icon-savedraft" => "💾",
        "icon-validate" => "✔",
        "icon-publish" => "🚀",
        _ => "•",
    }
}

fn message_color(ui: &egui::Ui, kind: MessageKind) -> egui::Color32 {
    if kind.is_error() {
        ui.visuals().error_fg_color
    } else if kind == MessageKind::Success {
        egui::Color32::from_rgb(76, 175, 80)
    } else {
        ui.visuals().text_color()
    }
}

struct NewStageForm {
    name: String,
    plugin: String,
    plugin_type: &'static str,
}

impl Default for NewStageForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            plugin: String::new(),
            plugin_type: PLUGIN_TYPES[0],
        }
    }
}

pub struct StudioApp {
    controller: TopPanelController,
    services: StudioServices,
    ui_tx: Sender<UiEvent>,
    ui_rx: Receiver<UiEvent>,
    status: String,
    status_is_error: bool,
    new_stage: NewStageForm,
    // Dropped last: the controller cancels deferred work on this runtime.
    _runtime: tokio::runtime::Runtime,
}

impl StudioApp {
    pub fn new(
        controller: TopPanelController,
        services: StudioServices,
        ui_tx: Sender<UiEvent>,
        ui_rx: Receiver<UiEvent>,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        Self {
            controller,
            services,
            ui_tx,
            ui_rx,
            status: "Ready".to_string(),
            status_is_error: false,
            new_stage: NewStageForm::default(),
            _runtime: runtime,
        }
    }

    fn process_ui_events(&mut self) {
        for event in drain_ui_events(&self.ui_rx) {
            self.controller.handle_event(&event);
            match event {
                UiEvent::ConfigChanged | UiEvent::Deferred { .. } => {}
                UiEvent::Info(message) => {
                    self.status = message;
                    self.status_is_error = false;
                }
                UiEvent::Error(err) => {
                    tracing::warn!(category = ?err.category(), context = ?err.context(), "{}", err.message());
                    self.status = err.status_line();
                    self.status_is_error = true;
                }
            }
        }
        self.controller.sync_with_store();
    }

    fn show_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("pipeline_top_panel")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if self.controller.metadata_expanded() {
                        self.show_metadata_editor(ui);
                    } else {
                        self.show_metadata_summary(ui);
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let operations = self.controller.operations().to_vec();
                        for operation in operations.iter().rev() {
                            let label = format!("{} {}", icon_glyph(operation.icon), operation.label);
                            if ui.button(label).clicked() {
                                self.controller.run_operation(operation.kind);
                            }
                        }
                    });
                });
            });
    }

    fn show_metadata_summary(&mut self, ui: &mut egui::Ui) {
        let state = self.controller.state();
        let title = if state.metadata.name.is_empty() {
            "Name your pipeline".to_string()
        } else {
            state.metadata.name.clone()
        };
        let mut title = egui::RichText::new(title).strong().size(16.0);
        if self.controller.invalid_name() {
            title = title.color(ui.visuals().error_fg_color);
        }
        let artifact = state.artifact.to_string();

        let clicked = ui.add(egui::Button::new(title).frame(false)).clicked();

        let cache = self.controller.description_cache();
        if !cache.parsed.is_empty() {
            ui.label(egui::RichText::new(&cache.parsed).weak())
                .on_hover_text(cache.tooltip.replace("<br />", "\n"));
        }
        ui.label(egui::RichText::new(artifact).small().weak());

        if clicked {
            self.controller.open_metadata();
        }
    }

    fn show_metadata_editor(&mut self, ui: &mut egui::Ui) {
        let invalid_name = self.controller.invalid_name();
        let error_color = ui.visuals().error_fg_color;

        let mut name_edit = egui::TextEdit::singleline(&mut self.controller.metadata_mut().name)
            .id_salt(NAME_INPUT_ID)
            .hint_text("Pipeline name")
            .desired_width(220.0);
        if invalid_name {
            name_edit = name_edit.text_color(error_color);
        }
        let name_response = ui.add(name_edit);
        if self.controller.take_name_focus() {
            name_response.request_focus();
        }

        let description_response = ui.add(
            egui::TextEdit::multiline(&mut self.controller.metadata_mut().description)
                .hint_text("Description")
                .desired_rows(2)
                .desired_width(320.0),
        );

        // Enter commits from the name field; Escape discards from either field.
        let key = ui.input(|i| {
            if i.key_pressed(egui::Key::Escape) {
                Some((KEY_ESCAPE, egui::Key::Escape))
            } else if i.key_pressed(egui::Key::Enter) {
                Some((KEY_ENTER, egui::Key::Enter))
            } else {
                None
            }
        });
        let name_key = name_response.lost_focus() || name_response.has_focus();
        let description_key = description_response.lost_focus() || description_response.has_focus();
        if let Some((key_code, key)) = key {
            if name_key || (description_key && key_code == KEY_ESCAPE) {
                let mut event = ViewEvent::key(key_code);
                self.controller.on_enter_on_metadata(&mut event);
                if event.default_prevented() || event.propagation_stopped() {
                    ui.input_mut(|i| i.consume_key(egui::Modifiers::NONE, key));
                }
            }
        }

        if !self.controller.metadata_expanded() {
            return;
        }
        if ui.button("Save").clicked() {
            self.controller.save_metadata(&mut ViewEvent::click());
        } else if ui.button("Cancel").clicked() {
            self.controller.reset_metadata(&mut ViewEvent::click());
        }
    }

    fn show_settings_panel(&mut self, ctx: &egui::Context) {
        if !self.controller.state().view_settings_visible {
            return;
        }
        let graph = self.services.store.display_config().graph;
        let (stage_count, connection_count) = (graph.stages.len(), graph.connections.len());
        egui::TopBottomPanel::top("pipeline_settings").show(ctx, |ui| {
            egui::Grid::new("pipeline_settings_grid")
                .num_columns(2)
                .show(ui, |ui| {
                    ui.label("Artifact");
                    ui.label(self.controller.state().artifact.to_string());
                    ui.end_row();
                    ui.label("Stages");
                    ui.label(stage_count.to_string());
                    ui.end_row();
                    ui.label("Connections");
                    ui.label(connection_count.to_string());
                    ui.end_row();
                });
        });
    }

    fn show_console(&mut self, ctx: &egui::Context) {
        let messages: Vec<ConsoleMessage> = self.services.console.messages();
        egui::TopBottomPanel::bottom("console_panel")
            .resizable(true)
            .default_height(140.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let status = if self.status_is_error {
                        egui::RichText::new(&self.status).color(ui.visuals().error_fg_color)
                    } else {
                        egui::RichText::new(&self.status)
                    };
                    ui.label(status);
                });
                ui.separator();
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        if messages.is_empty() {
                            ui.label(egui::RichText::new("No messages").weak());
                        }
                        for message in &messages {
                            let color = message_color(ui, message.kind);
                            ui.label(egui::RichText::new(&message.content).color(color));
                        }
                    });
            });
    }

    fn show_canvas(&mut self, ctx: &egui::Context) {
        let stages = self.services.store.stages();
        let selected = self.services.selection.selected();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Stages");
            for stage in &stages {
                let label = format!("{}  ({} / {})", stage.name, stage.plugin.name, stage.plugin.plugin_type);
                if ui.selectable_label(selected == Some(stage.id), label).clicked() {
                    self.services.selection.select(stage.id);
                }
            }

            ui.separator();
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut self.new_stage.name)
                        .hint_text("Stage name")
                        .desired_width(160.0),
                );
                ui.add(
                    egui::TextEdit::singleline(&mut self.new_stage.plugin)
                        .hint_text("Plugin")
                        .desired_width(140.0),
                );
                egui::ComboBox::from_id_salt("new_stage_plugin_type")
                    .selected_text(self.new_stage.plugin_type)
                    .show_ui(ui, |ui| {
                        for plugin_type in PLUGIN_TYPES {
                            ui.selectable_value(&mut self.new_stage.plugin_type, plugin_type, plugin_type);
                        }
                    });
                let can_add = !self.new_stage.name.trim().is_empty() && !self.new_stage.plugin.trim().is_empty();
                if ui.add_enabled(can_add, egui::Button::new("Add stage")).clicked() {
                    self.services.store.add_stage(
                        self.new_stage.name.trim(),
                        self.new_stage.plugin.trim(),
                        self.new_stage.plugin_type,
                    );
                    self.new_stage.name.clear();
                    self.new_stage.plugin.clear();
                }
            });
        });
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_top_panel(ctx);
        self.show_settings_panel(ctx);
        self.show_console(ctx);
        self.show_canvas(ctx);
        show_export_window(ctx, &self.services.export_modal, &self.ui_tx);

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
