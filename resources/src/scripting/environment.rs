use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use log::{debug, warn};

use cinder_shared::Instant;

use crate::{
    scripting::thread::ScheduledThread, EventContext, EventHandler, ResourceManager,
    ScriptContext, ScriptError, ScriptRef, ScriptRuntime, ScriptThread, TaskQueue,
};

/// The execution context of one running resource.
///
/// Owns the resource's runtime instances, its cooperative threads, the
/// handlers its scripts registered and the exports they provide. Only one
/// piece of script code runs at a time; every entry pushes the environment
/// onto the manager's environment stack for the duration of the call.
pub struct ScriptEnvironment {
    resource_name: String,
    runtimes: Vec<Rc<dyn ScriptRuntime>>,
    threads: RefCell<Vec<ScheduledThread>>,
    new_threads: RefCell<Vec<ScheduledThread>>,
    handlers: RefCell<HashMap<String, Vec<EventHandler>>>,
    exports: RefCell<HashMap<String, ScriptRef>>,
    tasks: TaskQueue,
    destroyed: Cell<bool>,
}

impl ScriptEnvironment {
    pub(crate) fn new(resource_name: &str, runtimes: Vec<Rc<dyn ScriptRuntime>>) -> Rc<Self> {
        Rc::new(Self {
            resource_name: resource_name.to_string(),
            runtimes,
            threads: RefCell::new(Vec::new()),
            new_threads: RefCell::new(Vec::new()),
            handlers: RefCell::new(HashMap::new()),
            exports: RefCell::new(HashMap::new()),
            tasks: TaskQueue::new(),
            destroyed: Cell::new(false),
        })
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn runtimes(&self) -> &[Rc<dyn ScriptRuntime>] {
        &self.runtimes
    }

    /// First runtime claiming `file_name`.
    pub fn runtime_for(&self, file_name: &str, contents: &[u8]) -> Option<Rc<dyn ScriptRuntime>> {
        self.runtimes
            .iter()
            .find(|runtime| runtime.handles_file(file_name, contents))
            .cloned()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    pub fn add_thread(&self, thread: impl ScriptThread + 'static) {
        if self.destroyed.get() {
            return;
        }
        self.new_threads
            .borrow_mut()
            .push(ScheduledThread::new(Box::new(thread)));
    }

    /// Threads that have not finished yet, including ones added since the
    /// last tick.
    pub fn thread_count(&self) -> usize {
        self.threads.borrow().len() + self.new_threads.borrow().len()
    }

    pub fn add_event_handler(&self, event_name: &str, handler: EventHandler) {
        if self.destroyed.get() {
            return;
        }
        self.handlers
            .borrow_mut()
            .entry(event_name.to_string())
            .or_default()
            .push(handler);
    }

    pub fn handler_count(&self, event_name: &str) -> usize {
        self.handlers
            .borrow()
            .get(event_name)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn register_export(&self, export: &str, script_ref: ScriptRef) {
        if self.destroyed.get() {
            return;
        }
        self.exports
            .borrow_mut()
            .insert(export.to_string(), script_ref);
    }

    pub fn export(&self, export: &str) -> Option<ScriptRef> {
        self.exports.borrow().get(export).cloned()
    }

    pub fn task_queue(&self) -> TaskQueue {
        self.tasks.clone()
    }

    pub(crate) fn create(self: &Rc<Self>, manager: &ResourceManager) -> Result<(), ScriptError> {
        let _entered = manager.push_environment(self.clone());
        let ctx = ScriptContext::new(manager, self, manager.now());
        for runtime in &self.runtimes {
            runtime.create(&ctx)?;
        }
        Ok(())
    }

    pub(crate) fn load_file(
        self: &Rc<Self>,
        manager: &ResourceManager,
        runtime: &Rc<dyn ScriptRuntime>,
        file_name: &str,
        contents: &[u8],
    ) -> Result<(), ScriptError> {
        let _entered = manager.push_environment(self.clone());
        let ctx = ScriptContext::new(manager, self, manager.now());
        debug!(
            "Loading {} in {} with {}",
            file_name,
            self.resource_name,
            runtime.name()
        );
        runtime.load_file(&ctx, file_name, contents)
    }

    /// Runs every handler registered for `event_name`, then every wildcard
    /// handler, in registration order. Handlers registered while the event
    /// is being handled only see later events.
    pub(crate) fn trigger_event(
        self: &Rc<Self>,
        manager: &ResourceManager,
        event_name: &str,
        payload: &[u8],
        source: &str,
    ) {
        let handlers = {
            let registry = self.handlers.borrow();
            let wildcard = manager.config().wildcard_event_name.as_str();

            let mut handlers = registry.get(event_name).cloned().unwrap_or_default();
            if event_name != wildcard {
                if let Some(wildcard_handlers) = registry.get(wildcard) {
                    handlers.extend(wildcard_handlers.iter().cloned());
                }
            }
            handlers
        };
        if handlers.is_empty() {
            return;
        }

        let _entered = manager.push_environment(self.clone());
        let ctx = ScriptContext::new(manager, self, manager.now());
        let event = EventContext::new(&ctx, event_name, payload, source);
        for handler in &handlers {
            if self.destroyed.get() {
                break;
            }
            handler.invoke(&event);
        }
    }

    pub(crate) fn call_ref(
        self: &Rc<Self>,
        manager: &ResourceManager,
        script_ref: &ScriptRef,
        args: &[u8],
    ) -> Result<Vec<u8>, ScriptError> {
        let _entered = manager.push_environment(self.clone());
        let ctx = ScriptContext::new(manager, self, manager.now());
        script_ref.call(&ctx, args)
    }

    /// Runs queued tasks, ticks the runtimes, then resumes every thread
    /// whose wake time has passed.
    pub(crate) fn tick(self: &Rc<Self>, manager: &ResourceManager, now: &Instant) {
        if self.destroyed.get() {
            return;
        }

        let _entered = manager.push_environment(self.clone());
        let ctx = ScriptContext::new(manager, self, *now);

        for task in self.tasks.drain() {
            if self.destroyed.get() {
                return;
            }
            task(&ctx);
        }

        for runtime in &self.runtimes {
            if self.destroyed.get() {
                return;
            }
            if let Err(error) = runtime.tick(&ctx) {
                warn!(
                    "Runtime {} failed to tick in {}: {}",
                    runtime.name(),
                    self.resource_name,
                    error
                );
            }
        }

        // threads run outside the borrow so they can add threads or stop
        // their own resource
        let mut threads = std::mem::take(&mut *self.threads.borrow_mut());
        threads.extend(self.new_threads.borrow_mut().drain(..));

        for thread in threads.iter_mut() {
            if self.destroyed.get() {
                return;
            }
            if thread.is_due(now) {
                thread.resume(&ctx, now);
            }
        }

        threads.retain(|thread| !thread.is_done());
        *self.threads.borrow_mut() = threads;
    }

    pub(crate) fn destroy(self: &Rc<Self>, manager: &ResourceManager) {
        if self.destroyed.replace(true) {
            return;
        }

        {
            let _entered = manager.push_environment(self.clone());
            let ctx = ScriptContext::new(manager, self, manager.now());
            for runtime in &self.runtimes {
                runtime.destroy(&ctx);
            }
        }

        self.threads.borrow_mut().clear();
        self.new_threads.borrow_mut().clear();
        self.handlers.borrow_mut().clear();
        self.exports.borrow_mut().clear();
        self.tasks.clear();
        debug!("Destroyed environment of {}", self.resource_name);
    }
}
