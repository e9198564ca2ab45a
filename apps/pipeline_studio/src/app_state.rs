use std::{fs, path::Path, sync::Arc};

use anyhow::Context;
use crossbeam_channel::Sender;
use shared::{domain::ClonedFrom, protocol::PipelineConfig};
use studio_core::{
    CanvasSelection, ConsoleLog, Deferral, PipelineConfigActions, PipelineConfigStore,
};

use crate::{
    config::StudioSettings,
    controller::{events::UiEvent, top_panel::TopPanelDeps},
    ui::export_modal::ExportModalState,
};

/// Collaborators shared by every studio panel for one open pipeline.
pub struct StudioServices {
    pub console: Arc<ConsoleLog>,
    pub store: Arc<PipelineConfigStore>,
    pub actions: Arc<PipelineConfigActions>,
    pub selection: Arc<CanvasSelection>,
    pub export_modal: Arc<ExportModalState>,
}

impl StudioServices {
    pub fn new(initial: PipelineConfig) -> Self {
        let console = Arc::new(ConsoleLog::new());
        let store = Arc::new(PipelineConfigStore::new(initial, console.clone()));
        let actions = Arc::new(PipelineConfigActions::new(store.clone(), console.clone()));

        Self {
            console,
            store,
            actions,
            selection: Arc::new(CanvasSelection::new()),
            export_modal: Arc::new(ExportModalState::default()),
        }
    }

    pub fn top_panel_deps(&self, deferral: Arc<dyn Deferral>, ui_tx: Sender<UiEvent>) -> TopPanelDeps {
        TopPanelDeps {
            config_store: self.store.clone(),
            config_actions: self.actions.clone(),
            console_store: self.console.clone(),
            console_actions: self.console.clone(),
            node_selection: self.selection.clone(),
            export_modal: self.export_modal.clone(),
            deferral,
            ui_tx,
        }
    }
}

#[derive(Debug)]
pub struct InitialPipeline {
    pub config: PipelineConfig,
    pub cloned_from: Option<ClonedFrom>,
}

/// Opens either a copy of an exported pipeline (clone mode) or a fresh one on
/// the configured default artifact.
pub fn load_initial_pipeline(
    settings: &StudioSettings,
    clone_path: Option<&Path>,
    name: Option<&str>,
) -> anyhow::Result<InitialPipeline> {
    let (mut config, cloned_from) = match clone_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read pipeline '{}'", path.display()))?;
            let config = PipelineConfig::from_json_str(&raw)
                .with_context(|| format!("failed to parse pipeline '{}'", path.display()))?;
            let cloned_from = ClonedFrom {
                source_name: config.name.clone(),
            };
            (config, Some(cloned_from))
        }
        None => (PipelineConfig::empty(settings.default_artifact.clone()), None),
    };

    if let Some(name) = name {
        config.name = name.to_string();
    }

    Ok(InitialPipeline {
        config,
        cloned_from,
    })
}
