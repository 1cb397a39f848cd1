//! Scheduler owning and driving root task trees.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use dendrite_core::events::{EventSink, IndexEvent, NullSink};

use crate::blackboard::Blackboard;
use crate::task::{Task, TaskNode, TaskState};

struct SchedulerQueue {
    roots: VecDeque<Box<dyn Task>>,
    active: bool,
    terminate: bool,
    current_bb: Option<Arc<Blackboard>>,
}

struct SchedulerShared {
    queue: Mutex<SchedulerQueue>,
    condvar: Condvar,
}

/// Drives root task trees on a single scheduling thread.
///
/// Dispatched roots queue up and run strictly one at a time; each run gets a
/// fresh [`Blackboard`] that is dropped when the root terminates. Concurrency
/// inside a tree arises only from [`crate::Parallel`]. Cancellation is
/// cooperative: [`cancel`](TaskScheduler::cancel) flags the current run's
/// blackboard, and combinators observe the flag between child ticks.
pub struct TaskScheduler {
    shared: Arc<SchedulerShared>,
    handle: Option<JoinHandle<()>>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::with_sink(Arc::new(NullSink))
    }

    /// Scheduler surfacing root failures through `sink`.
    pub fn with_sink(sink: Arc<dyn EventSink>) -> Self {
        let shared = Arc::new(SchedulerShared {
            queue: Mutex::new(SchedulerQueue {
                roots: VecDeque::new(),
                active: false,
                terminate: false,
                current_bb: None,
            }),
            condvar: Condvar::new(),
        });

        let thread_shared = shared.clone();
        let handle = std::thread::Builder::new()
            .name("TaskScheduler".to_string())
            .spawn(move || run_loop(thread_shared, sink))
            .expect("failed to spawn scheduler thread");

        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Append a root task tree to the queue.
    pub fn dispatch(&self, task: impl Task + 'static) {
        self.dispatch_boxed(Box::new(task));
    }

    pub fn dispatch_boxed(&self, root: Box<dyn Task>) {
        let mut queue = self.shared.queue.lock();
        queue.roots.push_back(root);
        self.shared.condvar.notify_all();
    }

    /// Cancel the currently running root, if any.
    ///
    /// Cancellation propagates downward during the next update of every branch
    /// and reaches `exit` promptly. Queued roots are unaffected.
    pub fn cancel(&self) {
        let queue = self.shared.queue.lock();
        if let Some(bb) = &queue.current_bb {
            info!("canceling current root task tree");
            bb.cancel();
        }
    }

    /// Whether a root is running or queued.
    pub fn is_busy(&self) -> bool {
        let queue = self.shared.queue.lock();
        queue.active || !queue.roots.is_empty()
    }

    /// Block until the queue is drained and no root is running.
    pub fn wait_until_idle(&self) {
        let mut queue = self.shared.queue.lock();
        while queue.active || !queue.roots.is_empty() {
            self.shared.condvar.wait(&mut queue);
        }
    }

    /// Stop the scheduling thread. The current root is canceled; queued roots
    /// are dropped unrun.
    pub fn shutdown(mut self) {
        self.request_terminate();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn request_terminate(&self) {
        let mut queue = self.shared.queue.lock();
        queue.terminate = true;
        if let Some(bb) = &queue.current_bb {
            bb.cancel();
        }
        self.shared.condvar.notify_all();
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskScheduler {
    fn drop(&mut self) {
        self.request_terminate();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_loop(shared: Arc<SchedulerShared>, sink: Arc<dyn EventSink>) {
    loop {
        let (root, bb) = {
            let mut queue = shared.queue.lock();
            loop {
                if queue.terminate {
                    return;
                }
                if let Some(root) = queue.roots.pop_front() {
                    let bb = Arc::new(Blackboard::new());
                    queue.active = true;
                    queue.current_bb = Some(bb.clone());
                    break (root, bb);
                }
                shared.condvar.wait(&mut queue);
            }
        };

        debug!("scheduler entering root task tree");
        let mut node = TaskNode::from_boxed(root);
        let state = loop {
            let state = node.tick(&bb);
            if state.is_terminal() {
                break state;
            }
        };

        match state {
            TaskState::Success => debug!("root task tree succeeded"),
            TaskState::Canceled => info!("root task tree canceled"),
            TaskState::Failure => {
                warn!("root task tree failed");
                sink.emit(IndexEvent::status_error("Scheduled task failed"));
            }
            TaskState::Running => unreachable!("terminal loop"),
        }

        let mut queue = shared.queue.lock();
        queue.active = false;
        queue.current_bb = None;
        shared.condvar.notify_all();
    }
}
