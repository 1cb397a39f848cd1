//! Selector task group.

use crate::blackboard::Blackboard;
use crate::task::{Task, TaskNode, TaskState};

/// Runs children in order, succeeding at the first child success.
///
/// Fails only when every child failed. Used in the pipeline to fall through
/// from "merge a pair" to "wait while workers are still producing".
#[derive(Default)]
pub struct Selector {
    children: Vec<TaskNode>,
    current: usize,
}

impl Selector {
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
}

impl Task for Selector {
    fn update(&mut self, bb: &Blackboard) -> TaskState {
        let Some(child) = self.children.get_mut(self.current) else {
            return TaskState::Failure;
        };
        match child.tick(bb) {
            TaskState::Running => TaskState::Running,
            TaskState::Success => TaskState::Success,
            TaskState::Failure => {
                self.current += 1;
                if self.current == self.children.len() {
                    TaskState::Failure
                } else {
                    TaskState::Running
                }
            }
            TaskState::Canceled => TaskState::Canceled,
        }
    }

    fn reset(&mut self, bb: &Blackboard) {
        for child in &mut self.children {
            child.reset(bb);
        }
        self.current = 0;
    }
}
