//! Repeat decorator.

use crate::blackboard::Blackboard;
use crate::task::{Task, TaskNode, TaskState};

/// When the decorated child should be restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatCondition {
    /// Restart while the child terminates with `Success`.
    WhileSuccess,
    /// Restart while the child terminates with `Failure`.
    WhileFailure,
    /// Restart on any non-canceled terminal state.
    Forever,
    /// Never restart; propagate the child's terminal state.
    Once,
}

/// Decorator that re-runs its child according to a condition.
///
/// While the child's terminal state matches the condition the child is reset
/// and re-entered. A non-matching terminal state ends the loop, reporting the
/// configured exit state; the loop ending is normally not an error, so the
/// pipeline builds every repeat with exit state `Success`. `Canceled` always
/// propagates unchanged.
pub struct Repeat {
    condition: RepeatCondition,
    exit_state: TaskState,
    child: TaskNode,
}

impl Repeat {
    pub fn new(condition: RepeatCondition, exit_state: TaskState, child: impl Task + 'static) -> Self {
        Self {
            condition,
            exit_state,
            child: TaskNode::new(child),
        }
    }

    /// Repeat while the child succeeds, reporting `Success` when it stops.
    pub fn while_success(child: impl Task + 'static) -> Self {
        Self::new(RepeatCondition::WhileSuccess, TaskState::Success, child)
    }

    /// Repeat while the child fails, reporting `Success` when it stops.
    pub fn while_failure(child: impl Task + 'static) -> Self {
        Self::new(RepeatCondition::WhileFailure, TaskState::Success, child)
    }

    /// Run the child exactly once, propagating its terminal state.
    pub fn once(child: impl Task + 'static) -> Self {
        Self::new(RepeatCondition::Once, TaskState::Success, child)
    }
}

impl Task for Repeat {
    fn update(&mut self, bb: &Blackboard) -> TaskState {
        let state = self.child.tick(bb);
        match state {
            TaskState::Running => TaskState::Running,
            TaskState::Canceled => TaskState::Canceled,
            terminal => {
                let restart = match self.condition {
                    RepeatCondition::WhileSuccess => terminal == TaskState::Success,
                    RepeatCondition::WhileFailure => terminal == TaskState::Failure,
                    RepeatCondition::Forever => true,
                    RepeatCondition::Once => false,
                };
                if restart {
                    self.child.reset(bb);
                    TaskState::Running
                } else if self.condition == RepeatCondition::Once {
                    terminal
                } else {
                    self.exit_state
                }
            }
        }
    }

    fn reset(&mut self, bb: &Blackboard) {
        self.child.reset(bb);
    }
}
