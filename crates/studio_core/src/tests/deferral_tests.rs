use super::*;
use std::time::Duration;

type Fired = Arc<Mutex<Vec<(DeferredHandle, DeferredAction)>>>;

fn recording_deferral() -> (TokioDeferral, Fired) {
    let fired = Arc::new(Mutex::new(Vec::new()));
    let sink_fired = Arc::clone(&fired);
    let deferral = TokioDeferral::new(Handle::current(), move |handle, action| {
        sink_fired.lock().expect("fired").push((handle, action));
    });
    (deferral, fired)
}

#[tokio::test]
async fn deferred_action_reaches_sink_after_yield() {
    let (deferral, fired) = recording_deferral();

    let handle = deferral.defer(DeferredAction::FocusNameInput);
    assert!(fired.lock().expect("fired").is_empty());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(
        *fired.lock().expect("fired"),
        vec![(handle, DeferredAction::FocusNameInput)]
    );
    assert_eq!(deferral.pending_count(), 0);
}

#[tokio::test]
async fn cancelled_action_never_fires() {
    let (deferral, fired) = recording_deferral();

    let handle = deferral.defer(DeferredAction::FocusNameInput);
    deferral.cancel(handle);
    assert_eq!(deferral.pending_count(), 0);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(fired.lock().expect("fired").is_empty());
}

#[tokio::test]
async fn cancelling_fired_handle_is_noop() {
    let (deferral, fired) = recording_deferral();

    let first = deferral.defer(DeferredAction::FocusNameInput);
    tokio::time::sleep(Duration::from_millis(20)).await;
    deferral.cancel(first);

    let second = deferral.defer(DeferredAction::FocusNameInput);
    assert_ne!(first, second);
    tokio::time::sleep(Duration::from_millis(20)).await;
    let handles: Vec<_> = fired
        .lock()
        .expect("fired")
        .iter()
        .map(|(handle, _)| *handle)
        .collect();
    assert_eq!(handles, vec![first, second]);
}

#[tokio::test]
async fn dropping_deferral_aborts_pending_actions() {
    let (deferral, fired) = recording_deferral();

    deferral.defer(DeferredAction::FocusNameInput);
    drop(deferral);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(fired.lock().expect("fired").is_empty());
}
