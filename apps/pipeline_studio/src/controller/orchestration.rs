//! Event queue helpers between collaborators and the UI thread.

use crossbeam_channel::{Sender, TrySendError};

use crate::controller::events::UiEvent;

pub fn post_ui_event(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    let event_name = event.name();

    match ui_tx.try_send(event) {
        Ok(()) => tracing::debug!(event = event_name, "queued ui event"),
        Err(TrySendError::Full(_)) => {
            tracing::warn!(event = event_name, "ui event queue is full; dropping event");
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!(event = event_name, "ui event queue closed");
        }
    }
}

/// Drains queued events in arrival order, coalescing repeated config change
/// notifications into one.
pub fn drain_ui_events(ui_rx: &crossbeam_channel::Receiver<UiEvent>) -> Vec<UiEvent> {
    let mut events = Vec::new();
    let mut config_changed = false;

    while let Ok(event) = ui_rx.try_recv() {
        if matches!(event, UiEvent::ConfigChanged) {
            if config_changed {
                continue;
            }
            config_changed = true;
        }
        events.push(event);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn coalesces_config_changes_and_keeps_order() {
        let (ui_tx, ui_rx) = bounded(8);
        post_ui_event(&ui_tx, UiEvent::ConfigChanged);
        post_ui_event(&ui_tx, UiEvent::Info("saved".into()));
        post_ui_event(&ui_tx, UiEvent::ConfigChanged);

        let names: Vec<_> = drain_ui_events(&ui_rx)
            .iter()
            .map(UiEvent::name)
            .collect();
        assert_eq!(names, vec!["config_changed", "info"]);
    }

    #[test]
    fn full_queue_drops_without_panicking() {
        let (ui_tx, ui_rx) = bounded(1);
        post_ui_event(&ui_tx, UiEvent::Info("first".into()));
        post_ui_event(&ui_tx, UiEvent::Info("second".into()));
        assert_eq!(drain_ui_events(&ui_rx).len(), 1);

        drop(ui_rx);
        post_ui_event(&ui_tx, UiEvent::ConfigChanged);
    }
}
