//! Final pipeline stage publishing the refreshed storage.

use std::sync::Arc;
use std::time::Instant;

use dendrite_core::events::{EventSink, IndexEvent};
use dendrite_core::traits::PersistentStorage;
use dendrite_scheduling::{Blackboard, Task, TaskState};

use crate::access_proxy::StorageAccessProxy;

/// Rebuilds caches, hands the storage to the access proxy and announces
/// completion.
pub struct TaskFinishParsing {
    storage: Arc<dyn PersistentStorage>,
    proxy: Arc<StorageAccessProxy>,
    sink: Arc<dyn EventSink>,
}

impl TaskFinishParsing {
    pub fn new(
        storage: Arc<dyn PersistentStorage>,
        proxy: Arc<StorageAccessProxy>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            storage,
            proxy,
            sink,
        }
    }
}

impl Task for TaskFinishParsing {
    fn update(&mut self, _bb: &Blackboard) -> TaskState {
        let start = Instant::now();
        self.storage.build_caches();
        self.proxy.set_subject(&self.storage);

        let elapsed = start.elapsed().as_secs_f64();
        self.sink.emit(IndexEvent::status(format!(
            "Finished indexing, caches rebuilt in {elapsed:.1} s"
        )));
        self.sink.emit(IndexEvent::FinishedParsing);
        TaskState::Success
    }
}
