use super::*;
use crate::{ConsoleLog, ConsoleStore};
use shared::protocol::{CanvasLayout, Connection, NodePosition};
use std::sync::atomic::{AtomicUsize, Ordering};

fn store_with_console() -> (Arc<PipelineConfigStore>, Arc<ConsoleLog>) {
    let console = Arc::new(ConsoleLog::new());
    let store = Arc::new(PipelineConfigStore::empty(
        ArtifactRef::default(),
        console.clone(),
    ));
    (store, console)
}

fn message_kinds(console: &ConsoleLog) -> Vec<MessageKind> {
    console
        .messages()
        .into_iter()
        .map(|message| message.kind)
        .collect()
}

#[test]
fn validates_pipeline_names() {
    assert!(is_valid_pipeline_name("orders_daily-v2"));
    assert!(!is_valid_pipeline_name(""));
    assert!(!is_valid_pipeline_name("orders daily"));
    assert!(!is_valid_pipeline_name("orders/daily"));
}

#[test]
fn quiet_validation_posts_nothing() {
    let (store, console) = store_with_console();
    assert!(!store.validate_state(false));
    assert!(console.messages().is_empty());
}

#[test]
fn verbose_validation_posts_each_problem() {
    let (store, console) = store_with_console();
    assert!(!store.validate_state(true));
    assert_eq!(
        message_kinds(&console),
        vec![MessageKind::MissingName, MessageKind::NoStages]
    );

    console.reset_messages();
    store.set_metadata("bad name", "");
    store.add_stage("source", "File", "batchsource");
    assert!(!store.validate_state(true));
    assert_eq!(message_kinds(&console), vec![MessageKind::InvalidName]);
}

#[test]
fn flags_connections_to_unknown_stages() {
    let console = Arc::new(ConsoleLog::new());
    let mut config = PipelineConfig::empty(ArtifactRef::default());
    config.name = "orders".into();
    config.graph.connections.push(Connection {
        from: "source".into(),
        to: "sink".into(),
    });
    let store = PipelineConfigStore::new(config, console.clone());
    store.add_stage("source", "File", "batchsource");

    assert!(!store.validate_state(true));
    let messages = console.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].content.contains("'sink'"));
}

#[test]
fn listeners_fire_on_every_mutation() {
    let (store, _console) = store_with_console();
    let calls = Arc::new(AtomicUsize::new(0));
    let listener_calls = Arc::clone(&calls);
    let listener_store = Arc::clone(&store);
    store.register_on_change_listener(Box::new(move || {
        // Re-entrant reads must not deadlock.
        let _ = listener_store.name();
        listener_calls.fetch_add(1, Ordering::SeqCst);
    }));

    store.set_metadata("orders", "daily");
    store.add_stage("source", "File", "batchsource");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.name(), "orders");
    assert_eq!(store.description(), "daily");
}

#[test]
fn export_config_strips_layout_but_display_keeps_it() {
    let console = Arc::new(ConsoleLog::new());
    let mut config = PipelineConfig::empty(ArtifactRef::default());
    let mut layout = CanvasLayout::default();
    layout
        .positions
        .insert("source".into(), NodePosition { x: 10.0, y: 20.0 });
    config.ui = Some(layout);
    let store = PipelineConfigStore::new(config, console);

    assert!(store.display_config().ui.is_some());
    assert!(store.config_for_export().ui.is_none());
}

#[test]
fn stage_ids_increase_from_highest_existing() {
    let (store, _console) = store_with_console();
    let first = store.add_stage("source", "File", "batchsource");
    let second = store.add_stage("sink", "Table", "batchsink");
    assert_eq!(first, StageId(1));
    assert_eq!(second, StageId(2));
    assert_eq!(store.stages().len(), 2);
}

#[test]
fn added_stages_get_canvas_positions_outside_the_export() {
    let (store, _console) = store_with_console();
    store.add_stage("source", "File", "batchsource");
    store.add_stage("sink", "Table", "batchsink");

    let layout = store.display_config().ui.expect("layout");
    let source = layout.positions.get("source").expect("source position");
    let sink = layout.positions.get("sink").expect("sink position");
    assert_eq!(source.y, sink.y);
    assert!(sink.x > source.x);

    let export = store.config_for_export();
    assert!(export.ui.is_none());
    assert_eq!(export.graph.stages.len(), 2);
}

#[test]
fn draft_requires_a_name() {
    let (store, console) = store_with_console();
    let actions = PipelineConfigActions::new(store.clone(), console.clone());

    actions.save_as_draft();
    assert!(actions.drafts().is_empty());
    assert_eq!(message_kinds(&console), vec![MessageKind::MissingName]);

    actions.set_metadata_info("orders", "");
    actions.save_as_draft();
    let drafts = actions.drafts();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].config.name, "orders");
}

#[test]
fn publish_records_only_valid_pipelines() {
    let (store, console) = store_with_console();
    let actions = PipelineConfigActions::new(store.clone(), console.clone());

    actions.publish_pipeline();
    assert!(actions.published().is_none());
    assert!(console
        .messages()
        .iter()
        .any(|message| message.kind.is_name_error()));

    actions.set_metadata_info("orders", "daily load");
    store.add_stage("source", "File", "batchsource");
    actions.publish_pipeline();

    let published = actions.published().expect("published record");
    assert_eq!(published.name, "orders");
    assert!(published.config.ui.is_none());
    assert_eq!(message_kinds(&console), vec![MessageKind::Success]);
}
