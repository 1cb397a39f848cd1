//! Parallel task group.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tracing::error;

use crate::blackboard::Blackboard;
use crate::task::{Task, TaskNode, TaskState};

/// Runs all children concurrently, one OS thread per child.
///
/// `update` spawns the workers and joins them before reporting a terminal
/// state: `Failure` if at least one child failed, otherwise `Canceled` if any
/// child was canceled, otherwise `Success`. The first failing child flips a
/// group-local flag that cancels its siblings between their ticks; the
/// blackboard cancellation flag is observed the same way.
///
/// Children must be independent of each other.
#[derive(Default)]
pub struct Parallel {
    children: Vec<TaskNode>,
}

impl Parallel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_task(&mut self, task: impl Task + 'static) {
        self.children.push(TaskNode::new(task));
    }

    pub fn add_boxed(&mut self, task: Box<dyn Task>) {
        self.children.push(TaskNode::from_boxed(task));
    }

    pub fn with_task(mut self, task: impl Task + 'static) -> Self {
        self.add_task(task);
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Drive one child to a terminal state, observing the group cancel flag
/// between ticks.
fn run_child(node: &mut TaskNode, bb: &Blackboard, group_cancel: &AtomicBool) -> TaskState {
    loop {
        if group_cancel.load(Ordering::Relaxed) {
            return node.cancel(bb);
        }
        let state = node.tick(bb);
        if state.is_terminal() {
            if state == TaskState::Failure {
                group_cancel.store(true, Ordering::Relaxed);
            }
            return state;
        }
    }
}

impl Task for Parallel {
    fn update(&mut self, bb: &Blackboard) -> TaskState {
        if self.children.is_empty() {
            return TaskState::Success;
        }

        let group_cancel = AtomicBool::new(false);
        let states: Vec<TaskState> = thread::scope(|scope| {
            let group_cancel = &group_cancel;
            let handles: Vec<_> = self
                .children
                .iter_mut()
                .enumerate()
                .map(|(i, child)| {
                    thread::Builder::new()
                        .name(format!("TaskWorker-{i}"))
                        .spawn_scoped(scope, move || run_child(child, bb, group_cancel))
                })
                .collect();

            if handles.iter().any(|handle| handle.is_err()) {
                // A child that never got a thread counts as failed; stop the
                // ones that did start.
                group_cancel.store(true, Ordering::Relaxed);
            }

            handles
                .into_iter()
                .map(|handle| match handle {
                    Ok(handle) => match handle.join() {
                        Ok(state) => state,
                        Err(_) => {
                            error!("parallel task worker panicked");
                            group_cancel.store(true, Ordering::Relaxed);
                            TaskState::Failure
                        }
                    },
                    Err(err) => {
                        error!(%err, "failed to spawn task worker thread");
                        TaskState::Failure
                    }
                })
                .collect()
        });

        if states.contains(&TaskState::Failure) {
            TaskState::Failure
        } else if states.contains(&TaskState::Canceled) {
            TaskState::Canceled
        } else {
            TaskState::Success
        }
    }

    fn reset(&mut self, bb: &Blackboard) {
        for child in &mut self.children {
            child.reset(bb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::testing::ScriptedTask;
    use crate::value_tasks::{Comparison, ReturnSuccessWhile};
    use std::time::Duration;

    #[test]
    fn test_all_children_succeed() {
        let bb = Blackboard::new();
        let mut parallel = Parallel::new();
        for _ in 0..4 {
            parallel.add_task(ScriptedTask::new(vec![TaskState::Running, TaskState::Success]));
        }

        let mut node = TaskNode::new(parallel);
        assert_eq!(node.tick(&bb), TaskState::Success);
    }

    #[test]
    fn test_failure_iff_any_child_fails() {
        let bb = Blackboard::new();
        let mut parallel = Parallel::new();
        parallel.add_task(ScriptedTask::new(vec![TaskState::Success]));
        parallel.add_task(ScriptedTask::new(vec![TaskState::Failure]));
        parallel.add_task(ScriptedTask::new(vec![TaskState::Success]));

        let mut node = TaskNode::new(parallel);
        assert_eq!(node.tick(&bb), TaskState::Failure);
    }

    #[test]
    fn test_failing_child_cancels_long_running_sibling() {
        let bb = Blackboard::new();
        bb.set("flag", 0i64);

        let mut parallel = Parallel::new();
        // Would spin forever: the flag never becomes non-zero.
        parallel.add_task(
            crate::repeat::Repeat::while_success(ReturnSuccessWhile::new(
                "flag",
                Comparison::Equals,
                0i64,
            )
            .with_poll_interval(Duration::from_millis(1))),
        );
        parallel.add_task(ScriptedTask::new(vec![TaskState::Running, TaskState::Failure]));

        let mut node = TaskNode::new(parallel);
        assert_eq!(node.tick(&bb), TaskState::Failure);
    }

    #[test]
    fn test_empty_parallel_succeeds() {
        let bb = Blackboard::new();
        let mut node = TaskNode::new(Parallel::new());
        assert_eq!(node.tick(&bb), TaskState::Success);
    }

    #[test]
    fn test_blackboard_cancel_reaches_all_children() {
        let bb = Blackboard::new();
        bb.cancel();

        let mut parallel = Parallel::new();
        parallel.add_task(ScriptedTask::new(vec![TaskState::Running, TaskState::Running]));
        parallel.add_task(ScriptedTask::new(vec![TaskState::Running, TaskState::Running]));

        let mut node = TaskNode::new(parallel);
        // The outer node observes the flag before the group even starts.
        assert_eq!(node.tick(&bb), TaskState::Canceled);
    }
}
