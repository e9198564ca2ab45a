//! Collaborator contracts for the pipeline editor panels, plus the in-memory
//! implementations the desktop studio composes them from.

use std::sync::{Mutex, MutexGuard, PoisonError};

use shared::{
    domain::ArtifactRef,
    protocol::{ConsoleMessage, PipelineConfig},
};

mod config_store;
mod console;
mod deferral;
mod selection;

pub use config_store::{is_valid_pipeline_name, PipelineConfigActions, PipelineConfigStore};
pub use console::ConsoleLog;
pub use deferral::TokioDeferral;
pub use selection::CanvasSelection;

pub type ChangeListener = Box<dyn Fn() + Send + Sync>;

/// Read side of the pipeline being edited.
pub trait ConfigStore: Send + Sync {
    fn name(&self) -> String;
    fn description(&self) -> String;
    fn artifact(&self) -> ArtifactRef;
    /// Full config including the editor layout.
    fn display_config(&self) -> PipelineConfig;
    fn config_for_export(&self) -> PipelineConfig;
    /// Returns whether the pipeline is valid. When `verbose`, every problem
    /// found is posted to the console.
    fn validate_state(&self, verbose: bool) -> bool;
    fn register_on_change_listener(&self, listener: ChangeListener);
}

pub trait ConfigActions: Send + Sync {
    fn set_metadata_info(&self, name: &str, description: &str);
    fn save_as_draft(&self);
    fn publish_pipeline(&self);
}

pub trait ConsoleStore: Send + Sync {
    fn messages(&self) -> Vec<ConsoleMessage>;
}

pub trait ConsoleActions: Send + Sync {
    fn reset_messages(&self);
    fn add_message(&self, messages: Vec<ConsoleMessage>);
}

pub trait NodeSelectionActions: Send + Sync {
    fn reset_selected_node(&self);
}

pub trait ExportModal: Send + Sync {
    fn show(&self, display: PipelineConfig, export: PipelineConfig);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    FocusNameInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeferredHandle(pub u64);

/// Runs an action after the current frame has been rendered.
pub trait Deferral: Send + Sync {
    fn defer(&self, action: DeferredAction) -> DeferredHandle;
    /// Cancelling a handle that already fired is a no-op.
    fn cancel(&self, handle: DeferredHandle);
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
