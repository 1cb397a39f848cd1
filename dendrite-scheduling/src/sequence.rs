//! Sequential task group.

use crate::blackboard::Blackboard;
use crate::task::{Task, TaskNode, TaskState};

/// Runs children in order, failing fast on the first child failure.
///
/// One child tick per update; after a child succeeds the sequence yields
/// `Running` so the scheduler keeps control between children.
#[derive(Default)]
pub struct Sequence {
    children: Vec<TaskNode>,
    current: usize,
}

impl Sequence {
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

impl Task for Sequence {
    fn update(&mut self, bb: &Blackboard) -> TaskState {
        let Some(child) = self.children.get_mut(self.current) else {
            return TaskState::Success;
        };
        match child.tick(bb) {
            TaskState::Running => TaskState::Running,
            TaskState::Success => {
                self.current += 1;
                if self.current == self.children.len() {
                    TaskState::Success
                } else {
                    TaskState::Running
                }
            }
            TaskState::Failure => TaskState::Failure,
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
