use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use crate::ScriptContext;

/// Work submitted from any thread, run on the environment's own thread.
pub type Task = Box<dyn FnOnce(&ScriptContext) + Send>;

/// Thread-safe handle for submitting [`Task`]s to one environment. Tasks run
/// at the start of the environment's next tick, in submission order.
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Arc<Mutex<VecDeque<Task>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, task: impl FnOnce(&ScriptContext) + Send + 'static) {
        self.tasks.lock().push_back(Box::new(task));
    }

    pub(crate) fn drain(&self) -> Vec<Task> {
        self.tasks.lock().drain(..).collect()
    }

    pub(crate) fn clear(&self) {
        self.tasks.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}
