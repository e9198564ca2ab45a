//! Export dialog: holds the pending export request and renders it.

use std::{fs, path::Path, sync::Mutex};

use arboard::Clipboard;
use crossbeam_channel::Sender;
use eframe::egui;
use shared::{error::StudioError, protocol::PipelineConfig};
use studio_core::ExportModal;

use crate::controller::{
    events::{UiError, UiErrorContext, UiEvent},
    orchestration::post_ui_event,
};

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub display: PipelineConfig,
    pub export: PipelineConfig,
    pub export_json: String,
}

#[derive(Default)]
pub struct ExportModalState {
    current: Mutex<Option<ExportRequest>>,
}

impl ExportModalState {
    pub fn current(&self) -> Option<ExportRequest> {
        self.lock().clone()
    }

    pub fn close(&self) {
        self.lock().take();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ExportRequest>> {
        self.current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ExportModal for ExportModalState {
    fn show(&self, display: PipelineConfig, export: PipelineConfig) {
        let export_json = match export.to_json_pretty() {
            Ok(json) => json,
            Err(err) => {
                tracing::error!("failed to render export json: {err}");
                return;
            }
        };
        *self.lock() = Some(ExportRequest {
            display,
            export,
            export_json,
        });
    }
}

pub fn export_file_name(config: &PipelineConfig) -> String {
    let name = if config.name.trim().is_empty() {
        "pipeline"
    } else {
        config.name.trim()
    };
    format!("{name}-{}.json", config.artifact.name)
}

pub fn write_export(path: &Path, json: &str) -> Result<(), StudioError> {
    fs::write(path, json)?;
    Ok(())
}

fn copy_to_clipboard(json: &str) -> Result<(), StudioError> {
    let mut clipboard = Clipboard::new().map_err(|err| StudioError::Clipboard(err.to_string()))?;
    clipboard
        .set_text(json.to_string())
        .map_err(|err| StudioError::Clipboard(err.to_string()))
}

pub fn show_export_window(ctx: &egui::Context, state: &ExportModalState, ui_tx: &Sender<UiEvent>) {
    let Some(request) = state.current() else {
        return;
    };

    let mut open = true;
    let mut close_requested = false;

    egui::Window::new("Export pipeline")
        .open(&mut open)
        .resizable(true)
        .collapsible(false)
        .default_width(560.0)
        .show(ctx, |ui| {
            let stage_count = request.display.graph.stages.len();
            ui.label(format!(
                "{} ({stage_count} stages) on {}",
                request.export.name, request.export.artifact
            ));
            ui.horizontal(|ui| {
                if ui.button("Copy JSON").clicked() {
                    match copy_to_clipboard(&request.export_json) {
                        Ok(()) => post_ui_event(
                            ui_tx,
                            UiEvent::Info("Pipeline JSON copied to clipboard".to_string()),
                        ),
                        Err(err) => post_ui_event(
                            ui_tx,
                            UiEvent::Error(UiError::from_message(
                                UiErrorContext::Export,
                                err.to_string(),
                            )),
                        ),
                    }
                }
                if ui.button("Save as…").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .set_file_name(export_file_name(&request.export))
                        .add_filter("JSON", &["json"])
                        .save_file()
                    {
                        match write_export(&path, &request.export_json) {
                            Ok(()) => {
                                tracing::info!(path = %path.display(), "exported pipeline");
                                post_ui_event(
                                    ui_tx,
                                    UiEvent::Info(format!("Exported to {}", path.display())),
                                );
                                close_requested = true;
                            }
                            Err(err) => post_ui_event(
                                ui_tx,
                                UiEvent::Error(UiError::from_message(
                                    UiErrorContext::Export,
                                    err.to_string(),
                                )),
                            ),
                        }
                    }
                }
                if ui.button("Close").clicked() {
                    close_requested = true;
                }
            });
            ui.separator();
            egui::ScrollArea::vertical()
                .max_height(420.0)
                .show(ui, |ui| {
                    let mut text = request.export_json.as_str();
                    ui.add(
                        egui::TextEdit::multiline(&mut text)
                            .code_editor()
                            .desired_width(f32::INFINITY),
                    );
                });
        });

    if !open || close_requested {
        state.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::ArtifactRef;
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    fn config(name: &str) -> PipelineConfig {
        let mut config = PipelineConfig::empty(ArtifactRef::default());
        config.name = name.to_string();
        config
    }

    #[test]
    fn show_renders_export_json_without_layout() {
        let state = ExportModalState::default();
        let display = config("orders");
        state.show(display.clone(), display.without_layout());

        let request = state.current().expect("request");
        assert!(request.display.ui.is_some());
        assert!(!request.export_json.contains("__ui__"));
        assert!(request.export_json.contains("\"orders\""));

        state.close();
        assert!(state.current().is_none());
    }

    #[test]
    fn file_name_uses_pipeline_and_artifact() {
        assert_eq!(
            export_file_name(&config("orders")),
            "orders-cdap-data-pipeline.json"
        );
        assert_eq!(
            export_file_name(&config("  ")),
            "pipeline-cdap-data-pipeline.json"
        );
    }

    #[test]
    fn writes_export_json() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("pipeline_studio_export_{suffix}.json"));

        write_export(&path, "{}").expect("write export");
        assert_eq!(fs::read_to_string(&path).expect("read back"), "{}");

        fs::remove_file(path).expect("cleanup");
    }
}
