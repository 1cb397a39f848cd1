//! The task contract and the lifecycle runner enforcing it.

use crate::blackboard::Blackboard;

/// State reported by a task after each update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Success,
    Failure,
    Canceled,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskState::Running)
    }
}

/// Abstract unit of work advanced cooperatively by the scheduler.
///
/// `enter` is called exactly once before the first `update`; `update` is called
/// repeatedly while it returns [`TaskState::Running`]; `exit` is called exactly
/// once after a terminal state, on every exit path including cancellation.
/// `reset` returns the task to its pre-`enter` state so it can run again.
///
/// All four methods of one task are invoked from the same logical context, so a
/// task does not need internal synchronization; combinators are thread-safe.
pub trait Task: Send {
    fn enter(&mut self, _bb: &Blackboard) {}

    fn update(&mut self, bb: &Blackboard) -> TaskState;

    fn exit(&mut self, _bb: &Blackboard) {}

    fn reset(&mut self, _bb: &Blackboard) {}
}

/// Lifecycle wrapper around a task.
///
/// The node tracks whether the task has been entered and whether it reached a
/// terminal state, guaranteeing the contract: enter once, no update after a
/// terminal state, exit exactly once. Cancellation is observed between ticks
/// via the blackboard flag.
pub struct TaskNode {
    task: Box<dyn Task>,
    entered: bool,
    finished: Option<TaskState>,
}

impl TaskNode {
    pub fn new(task: impl Task + 'static) -> Self {
        Self::from_boxed(Box::new(task))
    }

    pub fn from_boxed(task: Box<dyn Task>) -> Self {
        Self {
            task,
            entered: false,
            finished: None,
        }
    }

    /// Terminal state if the task already finished.
    pub fn state(&self) -> Option<TaskState> {
        self.finished
    }

    /// Advance the task by one update, entering it first if needed.
    ///
    /// Checks the cancellation flag before touching the task, so every
    /// combinator that ticks children through nodes observes cancellation
    /// between child ticks.
    pub fn tick(&mut self, bb: &Blackboard) -> TaskState {
        if let Some(state) = self.finished {
            return state;
        }
        if bb.is_canceled() {
            return self.cancel(bb);
        }
        if !self.entered {
            self.task.enter(bb);
            self.entered = true;
        }
        let state = self.task.update(bb);
        if state.is_terminal() {
            self.task.exit(bb);
            self.finished = Some(state);
        }
        state
    }

    /// Force the task into the canceled terminal state.
    ///
    /// A task that was entered gets its `exit` call; one that never ran is
    /// marked canceled without any lifecycle calls.
    pub fn cancel(&mut self, bb: &Blackboard) -> TaskState {
        if self.finished.is_none() {
            if self.entered {
                self.task.exit(bb);
            }
            self.finished = Some(TaskState::Canceled);
        }
        self.finished.unwrap_or(TaskState::Canceled)
    }

    /// Return the task to its pre-enter state so it can be scheduled again.
    pub fn reset(&mut self, bb: &Blackboard) {
        self.task.reset(bb);
        self.entered = false;
        self.finished = None;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts lifecycle calls and reports a scripted sequence of states.
    pub struct ScriptedTask {
        pub states: Vec<TaskState>,
        pub cursor: usize,
        pub enters: Arc<AtomicUsize>,
        pub exits: Arc<AtomicUsize>,
    }

    impl ScriptedTask {
        pub fn new(states: Vec<TaskState>) -> Self {
            Self {
                states,
                cursor: 0,
                enters: Arc::new(AtomicUsize::new(0)),
                exits: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Task for ScriptedTask {
        fn enter(&mut self, _bb: &Blackboard) {
            self.enters.fetch_add(1, Ordering::SeqCst);
        }

        fn update(&mut self, _bb: &Blackboard) -> TaskState {
            let state = self.states[self.cursor.min(self.states.len() - 1)];
            self.cursor += 1;
            state
        }

        fn exit(&mut self, _bb: &Blackboard) {
            self.exits.fetch_add(1, Ordering::SeqCst);
        }

        fn reset(&mut self, _bb: &Blackboard) {
            self.cursor = 0;
        }
    }
}
