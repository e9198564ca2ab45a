use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use shared::{
    domain::{ArtifactRef, DraftId, DraftRecord, PublishedRecord, StageId},
    protocol::{
        CanvasLayout, ConsoleMessage, MessageKind, NodePosition, PipelineConfig, PluginRef, Stage,
    },
};

use crate::{lock, ChangeListener, ConfigActions, ConfigStore, ConsoleActions};

type SharedListener = Arc<dyn Fn() + Send + Sync>;

const STAGE_SPACING: f32 = 200.0;
const STAGE_ROW_Y: f32 = 100.0;

pub fn is_valid_pipeline_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// The pipeline currently open in the studio.
pub struct PipelineConfigStore {
    config: Mutex<PipelineConfig>,
    listeners: Mutex<Vec<SharedListener>>,
    console: Arc<dyn ConsoleActions>,
}

impl PipelineConfigStore {
    pub fn new(config: PipelineConfig, console: Arc<dyn ConsoleActions>) -> Self {
        Self {
            config: Mutex::new(config),
            listeners: Mutex::new(Vec::new()),
            console,
        }
    }

    pub fn empty(artifact: ArtifactRef, console: Arc<dyn ConsoleActions>) -> Self {
        Self::new(PipelineConfig::empty(artifact), console)
    }

    pub fn set_metadata(&self, name: &str, description: &str) {
        {
            let mut config = lock(&self.config);
            config.name = name.to_string();
            config.description = description.to_string();
        }
        self.emit_change();
    }

    pub fn add_stage(&self, name: &str, plugin_name: &str, plugin_type: &str) -> StageId {
        let stage_id = {
            let mut config = lock(&self.config);
            let next = config
                .graph
                .stages
                .iter()
                .map(|stage| stage.id.0)
                .max()
                .unwrap_or(0)
                + 1;
            let stage_id = StageId(next);
            let column = config.graph.stages.len() as f32;
            // New stages are laid out left to right.
            config
                .ui
                .get_or_insert_with(CanvasLayout::default)
                .positions
                .insert(
                    name.to_string(),
                    NodePosition {
                        x: STAGE_SPACING * column,
                        y: STAGE_ROW_Y,
                    },
                );
            config.graph.stages.push(Stage {
                id: stage_id,
                name: name.to_string(),
                plugin: PluginRef {
                    name: plugin_name.to_string(),
                    plugin_type: plugin_type.to_string(),
                },
                properties: Default::default(),
            });
            stage_id
        };
        self.emit_change();
        stage_id
    }

    pub fn stages(&self) -> Vec<Stage> {
        lock(&self.config).graph.stages.clone()
    }

    /// Problems that keep the pipeline from being published, in the order the
    /// console lists them.
    pub fn validation_errors(&self) -> Vec<ConsoleMessage> {
        let config = lock(&self.config);
        let mut errors = Vec::new();

        if config.name.trim().is_empty() {
            errors.push(ConsoleMessage::new(
                MessageKind::MissingName,
                "Pipeline name is missing.",
            ));
        } else if !is_valid_pipeline_name(&config.name) {
            errors.push(ConsoleMessage::new(
                MessageKind::InvalidName,
                "Pipeline name can only contain alphanumeric characters, '-' and '_'.",
            ));
        }

        if config.graph.stages.is_empty() {
            errors.push(ConsoleMessage::new(
                MessageKind::NoStages,
                "Pipeline must contain at least one stage.",
            ));
        }

        let stage_names: HashSet<&str> = config
            .graph
            .stages
            .iter()
            .map(|stage| stage.name.as_str())
            .collect();
        for connection in &config.graph.connections {
            for end in [&connection.from, &connection.to] {
                if !stage_names.contains(end.as_str()) {
                    errors.push(ConsoleMessage::new(
                        MessageKind::Error,
                        format!(
                            "Connection {} -> {} references unknown stage '{end}'.",
                            connection.from, connection.to
                        ),
                    ));
                }
            }
        }

        errors
    }

    fn emit_change(&self) {
        // Listeners may read the store, so call them without holding any lock.
        let listeners: Vec<SharedListener> = lock(&self.listeners).clone();
        for listener in listeners {
            listener();
        }
    }
}

impl ConfigStore for PipelineConfigStore {
    fn name(&self) -> String {
        lock(&self.config).name.clone()
    }

    fn description(&self) -> String {
        lock(&self.config).description.clone()
    }

    fn artifact(&self) -> ArtifactRef {
        lock(&self.config).artifact.clone()
    }

    fn display_config(&self) -> PipelineConfig {
        lock(&self.config).clone()
    }

    fn config_for_export(&self) -> PipelineConfig {
        lock(&self.config).without_layout()
    }

    fn validate_state(&self, verbose: bool) -> bool {
        let errors = self.validation_errors();
        let valid = errors.is_empty();
        if !valid {
            tracing::debug!(errors = errors.len(), "pipeline validation failed");
            if verbose {
                self.console.add_message(errors);
            }
        }
        valid
    }

    fn register_on_change_listener(&self, listener: ChangeListener) {
        lock(&self.listeners).push(Arc::from(listener));
    }
}

/// Mutations the editor panels dispatch against the open pipeline.
pub struct PipelineConfigActions {
    store: Arc<PipelineConfigStore>,
    console: Arc<dyn ConsoleActions>,
    drafts: Mutex<Vec<DraftRecord>>,
    published: Mutex<Option<PublishedRecord>>,
}

impl PipelineConfigActions {
    pub fn new(store: Arc<PipelineConfigStore>, console: Arc<dyn ConsoleActions>) -> Self {
        Self {
            store,
            console,
            drafts: Mutex::new(Vec::new()),
            published: Mutex::new(None),
        }
    }

    pub fn drafts(&self) -> Vec<DraftRecord> {
        lock(&self.drafts).clone()
    }

    pub fn published(&self) -> Option<PublishedRecord> {
        lock(&self.published).clone()
    }
}

impl ConfigActions for PipelineConfigActions {
    fn set_metadata_info(&self, name: &str, description: &str) {
        self.store.set_metadata(name, description);
    }

    fn save_as_draft(&self) {
        let config = self.store.display_config();
        if config.name.trim().is_empty() {
            self.console.add_message(vec![ConsoleMessage::new(
                MessageKind::MissingName,
                "Please name the pipeline before saving a draft.",
            )]);
            return;
        }

        let record = DraftRecord {
            draft_id: DraftId::new(),
            saved_at: Utc::now(),
            config,
        };
        tracing::info!(draft_id = %record.draft_id, name = %record.config.name, "saved pipeline draft");
        self.console.add_message(vec![ConsoleMessage::info(format!(
            "Draft {} saved.",
            record.config.name
        ))]);
        lock(&self.drafts).push(record);
    }

    fn publish_pipeline(&self) {
        self.console.reset_messages();
        if !self.store.validate_state(true) {
            tracing::warn!(name = %self.store.name(), "publish rejected by validation");
            return;
        }

        let config = self.store.config_for_export();
        let record = PublishedRecord {
            name: config.name.clone(),
            published_at: Utc::now(),
            config,
        };
        tracing::info!(name = %record.name, "published pipeline");
        self.console.add_message(vec![ConsoleMessage::success(format!(
            "Pipeline {} published.",
            record.name
        ))]);
        *lock(&self.published) = Some(record);
    }
}

#[cfg(test)]
#[path = "tests/config_store_tests.rs"]
mod tests;
