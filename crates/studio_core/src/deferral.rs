use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use tokio::{runtime::Handle, task::JoinHandle};

use crate::{lock, Deferral, DeferredAction, DeferredHandle};

type ActionSink = Arc<dyn Fn(DeferredHandle, DeferredAction) + Send + Sync>;

/// Deferral backed by a tokio runtime. Each action runs on its own task that
/// yields once before handing the action and its handle to the sink, which is
/// enough for the UI thread to finish the frame that scheduled it.
pub struct TokioDeferral {
    runtime: Handle,
    sink: ActionSink,
    next_id: AtomicU64,
    pending: Arc<Mutex<HashMap<u64, JoinHandle<()>>>>,
}

impl TokioDeferral {
    pub fn new(
        runtime: Handle,
        sink: impl Fn(DeferredHandle, DeferredAction) + Send + Sync + 'static,
    ) -> Self {
        Self {
            runtime,
            sink: Arc::new(sink),
            next_id: AtomicU64::new(1),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[cfg(test)]
    fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

impl Deferral for TokioDeferral {
    fn defer(&self, action: DeferredAction) -> DeferredHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let sink = Arc::clone(&self.sink);
        let pending = Arc::clone(&self.pending);

        // Insert before the task can observe the map.
        let mut guard = lock(&self.pending);
        let task = self.runtime.spawn(async move {
            tokio::task::yield_now().await;
            lock(&pending).remove(&id);
            sink(DeferredHandle(id), action);
        });
        guard.insert(id, task);
        tracing::debug!(handle = id, ?action, "deferred ui action");

        DeferredHandle(id)
    }

    fn cancel(&self, handle: DeferredHandle) {
        if let Some(task) = lock(&self.pending).remove(&handle.0) {
            task.abort();
            tracing::debug!(handle = handle.0, "cancelled deferred ui action");
        }
    }
}

impl Drop for TokioDeferral {
    fn drop(&mut self) {
        for (_, task) in lock(&self.pending).drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/deferral_tests.rs"]
mod tests;
