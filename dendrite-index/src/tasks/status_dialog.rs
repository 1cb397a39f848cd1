//! Status-dialog notification task.

use std::sync::Arc;

use dendrite_core::events::{EventSink, IndexEvent};
use dendrite_scheduling::{Blackboard, Task, TaskState};

/// Fires a status-dialog event and succeeds immediately; never blocks on the
/// front-end.
pub struct TaskShowStatusDialog {
    title: String,
    text: String,
    sink: Arc<dyn EventSink>,
}

impl TaskShowStatusDialog {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            sink,
        }
    }
}

impl Task for TaskShowStatusDialog {
    fn update(&mut self, _bb: &Blackboard) -> TaskState {
        self.sink.emit(IndexEvent::ShowStatusDialog {
            title: self.title.clone(),
            text: self.text.clone(),
        });
        TaskState::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dendrite_core::events::BufferSink;
    use dendrite_scheduling::TaskNode;

    #[test]
    fn test_emits_dialog_event() {
        let sink = BufferSink::new();
        let bb = Blackboard::new();
        let mut node = TaskNode::new(TaskShowStatusDialog::new(
            "Finish Indexing",
            "Saving",
            sink.clone(),
        ));

        assert_eq!(node.tick(&bb), TaskState::Success);
        assert!(sink.contains(|e| matches!(
            e,
            IndexEvent::ShowStatusDialog { title, .. } if title == "Finish Indexing"
        )));
    }
}
