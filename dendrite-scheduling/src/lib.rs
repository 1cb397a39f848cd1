//! Task trees, combinators and the scheduler driving the Dendrite pipeline.
//!
//! A task tree is a hierarchy of [`Task`] implementations composed out of
//! [`Sequence`], [`Parallel`], [`Selector`] and [`Repeat`] combinators, sharing
//! a typed [`Blackboard`]. The [`TaskScheduler`] owns a queue of root trees and
//! drives them on a dedicated thread; concurrency inside a tree arises only
//! from [`Parallel`], which runs one OS thread per child.

pub mod blackboard;
pub mod parallel;
pub mod repeat;
pub mod scheduler;
pub mod selector;
pub mod sequence;
pub mod task;
pub mod value_tasks;

pub use blackboard::{Blackboard, BlackboardValue, Value};
pub use parallel::Parallel;
pub use repeat::{Repeat, RepeatCondition};
pub use scheduler::TaskScheduler;
pub use selector::Selector;
pub use sequence::Sequence;
pub use task::{Task, TaskNode, TaskState};
pub use value_tasks::{Comparison, ReturnSuccessWhile, SetValue};
