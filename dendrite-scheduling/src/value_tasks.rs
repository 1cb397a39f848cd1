//! Leaf tasks operating on blackboard values.

use std::time::Duration;

use crate::blackboard::{Blackboard, BlackboardValue};
use crate::task::{Task, TaskState};

/// Writes a value once on `enter` and succeeds on the first `update`.
pub struct SetValue<T: BlackboardValue + Clone + Send> {
    key: String,
    value: T,
}

impl<T: BlackboardValue + Clone + Send> SetValue<T> {
    pub fn new(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl<T: BlackboardValue + Clone + Send> Task for SetValue<T> {
    fn enter(&mut self, bb: &Blackboard) {
        bb.set(&self.key, self.value.clone());
    }

    fn update(&mut self, _bb: &Blackboard) -> TaskState {
        TaskState::Success
    }
}

/// Predicate applied by [`ReturnSuccessWhile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equals,
    GreaterThan,
    LessThan,
}

impl Comparison {
    fn holds<T: PartialOrd>(&self, current: &T, expected: &T) -> bool {
        match self {
            Comparison::Equals => current == expected,
            Comparison::GreaterThan => current > expected,
            Comparison::LessThan => current < expected,
        }
    }
}

/// Synchronization guard polling a blackboard value.
///
/// Returns `Success` while `comparison(bb[key], value)` holds at the moment of
/// polling and `Failure` otherwise. A missing or differently-typed key counts
/// as the predicate not holding. While the predicate holds the guard sleeps
/// briefly so barrier loops built from `Repeat` do not spin hot.
pub struct ReturnSuccessWhile<T: BlackboardValue + PartialOrd + Send> {
    key: String,
    comparison: Comparison,
    value: T,
    poll_interval: Duration,
}

impl<T: BlackboardValue + PartialOrd + Send> ReturnSuccessWhile<T> {
    pub fn new(key: impl Into<String>, comparison: Comparison, value: T) -> Self {
        Self {
            key: key.into(),
            comparison,
            value,
            poll_interval: Duration::from_millis(25),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl<T: BlackboardValue + PartialOrd + Send> Task for ReturnSuccessWhile<T> {
    fn update(&mut self, bb: &Blackboard) -> TaskState {
        let holds = bb
            .get::<T>(&self.key)
            .map(|current| self.comparison.holds(&current, &self.value))
            .unwrap_or(false);
        if holds {
            std::thread::sleep(self.poll_interval);
            TaskState::Success
        } else {
            TaskState::Failure
        }
    }
}
