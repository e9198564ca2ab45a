//! Top panel of the pipeline editor: metadata editing and the canvas
//! operations (settings, export, save, validate, publish).

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crossbeam_channel::Sender;
use shared::{
    domain::{ArtifactRef, ClonedFrom, PipelineMetadata},
    protocol::ConsoleMessage,
};
use studio_core::{
    ConfigActions, ConfigStore, ConsoleActions, ConsoleStore, Deferral, DeferredAction,
    DeferredHandle, ExportModal, NodeSelectionActions,
};

use crate::controller::{
    events::{UiEvent, ViewEvent, KEY_ENTER, KEY_ESCAPE},
    orchestration::post_ui_event,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasOperationKind {
    Settings,
    Export,
    Save,
    Validate,
    Publish,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasOperation {
    pub kind: CanvasOperationKind,
    pub label: &'static str,
    pub icon: &'static str,
}

impl CanvasOperation {
    fn new(kind: CanvasOperationKind, label: &'static str, icon: &'static str) -> Self {
        Self { kind, label, icon }
    }
}

fn canvas_operations() -> Vec<CanvasOperation> {
    vec![
        CanvasOperation::new(CanvasOperationKind::Settings, "Settings", "fa-sliders"),
        CanvasOperation::new(CanvasOperationKind::Export, "Export", "icon-export"),
        CanvasOperation::new(CanvasOperationKind::Save, "Save", "icon-savedraft"),
        CanvasOperation::new(CanvasOperationKind::Validate, "Validate", "icon-validate"),
        CanvasOperation::new(CanvasOperationKind::Publish, "Publish", "icon-publish"),
    ]
}

/// What the top panel renders. Replaced wholesale whenever the store changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub metadata: PipelineMetadata,
    pub view_settings_visible: bool,
    pub artifact: ArtifactRef,
}

impl PanelState {
    fn from_store(store: &dyn ConfigStore, view_settings_visible: bool) -> Self {
        Self {
            metadata: PipelineMetadata::new(store.name(), store.description()),
            view_settings_visible,
            artifact: store.artifact(),
        }
    }
}

/// Description rendered in the collapsed header and its tooltip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionCache {
    pub parsed: String,
    pub tooltip: String,
}

impl DescriptionCache {
    pub fn from_description(description: &str) -> Self {
        if description.is_empty() {
            return Self::default();
        }
        Self {
            parsed: description.replace('\n', " "),
            tooltip: description.replace('\n', "<br />"),
        }
    }
}

pub struct TopPanelDeps {
    pub config_store: Arc<dyn ConfigStore>,
    pub config_actions: Arc<dyn ConfigActions>,
    pub console_store: Arc<dyn ConsoleStore>,
    pub console_actions: Arc<dyn ConsoleActions>,
    pub node_selection: Arc<dyn NodeSelectionActions>,
    pub export_modal: Arc<dyn ExportModal>,
    pub deferral: Arc<dyn Deferral>,
    pub ui_tx: Sender<UiEvent>,
}

pub struct TopPanelController {
    deps: TopPanelDeps,
    operations: Vec<CanvasOperation>,
    state: PanelState,
    description: DescriptionCache,
    metadata_expanded: bool,
    invalid_name: bool,
    cloned_from: Option<ClonedFrom>,
    focus_handle: Option<DeferredHandle>,
    focus_ready: bool,
    // Set by the store listener; the queued event is only a wake-up.
    store_changed: Arc<AtomicBool>,
}

impl TopPanelController {
    pub fn new(deps: TopPanelDeps, cloned_from: Option<ClonedFrom>) -> Self {
        let state = PanelState::from_store(deps.config_store.as_ref(), false);
        let description = DescriptionCache {
            parsed: state.metadata.description.clone(),
            tooltip: String::new(),
        };

        let store_changed = Arc::new(AtomicBool::new(false));
        let listener_changed = Arc::clone(&store_changed);
        let ui_tx = deps.ui_tx.clone();
        deps.config_store
            .register_on_change_listener(Box::new(move || {
                listener_changed.store(true, Ordering::Release);
                post_ui_event(&ui_tx, UiEvent::ConfigChanged)
            }));

        let mut controller = Self {
            deps,
            operations: canvas_operations(),
            state,
            description,
            metadata_expanded: false,
            invalid_name: false,
            cloned_from,
            focus_handle: None,
            focus_ready: false,
            store_changed,
        };

        if let Some(cloned_from) = &controller.cloned_from {
            tracing::info!(source = %cloned_from.source_name, "opened cloned pipeline");
            controller.open_metadata();
        }

        controller
    }

    pub fn operations(&self) -> &[CanvasOperation] {
        &self.operations
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    /// Draft metadata bound to the name and description inputs.
    pub fn metadata_mut(&mut self) -> &mut PipelineMetadata {
        &mut self.state.metadata
    }

    pub fn metadata_expanded(&self) -> bool {
        self.metadata_expanded
    }

    pub fn invalid_name(&self) -> bool {
        self.invalid_name
    }

    pub fn description_cache(&self) -> &DescriptionCache {
        &self.description
    }

    pub fn handle_event(&mut self, event: &UiEvent) {
        match event {
            UiEvent::ConfigChanged => self.sync_with_store(),
            UiEvent::Deferred {
                handle,
                action: DeferredAction::FocusNameInput,
            } => {
                if self.focus_handle == Some(*handle) {
                    self.focus_handle = None;
                    self.focus_ready = true;
                } else {
                    tracing::debug!(handle = handle.0, "ignoring stale focus request");
                }
            }
            UiEvent::Info(_) | UiEvent::Error(_) => {}
        }
    }

    /// Rebuilds the panel state if the store changed since the last call.
    /// The app calls this every frame, whether or not a wake-up arrived.
    pub fn sync_with_store(&mut self) {
        if self.store_changed.swap(false, Ordering::AcqRel) {
            self.set_state();
        }
    }

    /// Whether the name input should take focus this frame. Cleared on read.
    pub fn take_name_focus(&mut self) -> bool {
        std::mem::take(&mut self.focus_ready)
    }

    pub fn set_state(&mut self) {
        self.state = PanelState::from_store(
            self.deps.config_store.as_ref(),
            self.state.view_settings_visible,
        );
    }

    pub fn open_metadata(&mut self) {
        self.metadata_expanded = true;
        self.invalid_name = false;
        self.cancel_pending_focus();

        // One-shot: only the first open after a clone moves focus.
        if self.cloned_from.take().is_none() {
            return;
        }
        self.focus_name_input();
    }

    /// Schedules focus of the name input for after the current frame,
    /// replacing any focus request still pending.
    pub fn focus_name_input(&mut self) {
        self.cancel_pending_focus();
        self.focus_handle = Some(self.deps.deferral.defer(DeferredAction::FocusNameInput));
    }

    fn cancel_pending_focus(&mut self) {
        self.focus_ready = false;
        if let Some(handle) = self.focus_handle.take() {
            self.deps.deferral.cancel(handle);
        }
    }

    pub fn reset_metadata(&mut self, event: &mut ViewEvent) {
        self.set_state();
        self.metadata_expanded = false;
        event.prevent_default();
        event.stop_propagation();
    }

    pub fn save_metadata(&mut self, event: &mut ViewEvent) {
        let metadata = &self.state.metadata;
        tracing::debug!(name = %metadata.name, "saving pipeline metadata");
        self.deps
            .config_actions
            .set_metadata_info(&metadata.name, &metadata.description);
        self.description = DescriptionCache::from_description(&metadata.description);
        self.metadata_expanded = false;
        event.prevent_default();
        event.stop_propagation();
    }

    pub fn on_enter_on_metadata(&mut self, event: &mut ViewEvent) {
        match event.key_code {
            Some(KEY_ENTER) => {
                self.save_metadata(event);
                self.metadata_expanded = false;
            }
            Some(KEY_ESCAPE) => self.reset_metadata(event),
            _ => {}
        }
    }

    pub fn run_operation(&mut self, kind: CanvasOperationKind) {
        tracing::debug!(operation = ?kind, "top panel operation");
        match kind {
            CanvasOperationKind::Settings => self.show_settings(),
            CanvasOperationKind::Export => self.on_export(),
            CanvasOperationKind::Save => self.on_save_draft(),
            CanvasOperationKind::Validate => self.on_validate(),
            CanvasOperationKind::Publish => self.on_publish(),
        }
    }

    pub fn on_export(&mut self) {
        self.deps.node_selection.reset_selected_node();
        let display = self.deps.config_store.display_config();
        let export = self.deps.config_store.config_for_export();
        tracing::info!(name = %export.name, "opening export dialog");
        self.deps.export_modal.show(display, export);
    }

    pub fn on_save_draft(&mut self) {
        self.deps.config_actions.save_as_draft();
    }

    pub fn check_name_error(&mut self) {
        self.invalid_name = self
            .deps
            .console_store
            .messages()
            .iter()
            .any(|message| message.kind.is_name_error());
    }

    pub fn on_validate(&mut self) {
        self.deps.console_actions.reset_messages();
        if self.deps.config_store.validate_state(true) {
            self.deps
                .console_actions
                .add_message(vec![ConsoleMessage::success(format!(
                    "Validation success! Pipeline {} is valid.",
                    self.deps.config_store.name()
                ))]);
            return;
        }
        self.check_name_error();
    }

    pub fn on_publish(&mut self) {
        self.deps.config_actions.publish_pipeline();
        self.check_name_error();
    }

    pub fn show_settings(&mut self) {
        self.state.view_settings_visible = !self.state.view_settings_visible;
    }
}

impl Drop for TopPanelController {
    fn drop(&mut self) {
        self.cancel_pending_focus();
    }
}

#[cfg(test)]
#[path = "tests/top_panel_tests.rs"]
mod tests;
