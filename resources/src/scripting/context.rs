use std::rc::Rc;

use cinder_shared::Instant;

use crate::{
    EventHandler, ResourceError, ResourceManager, ScriptEnvironment, ScriptRef, ScriptThread,
    TaskQueue,
};

/// Everything a script or native callback may reach while running inside an
/// environment. Passed explicitly down every call instead of living in
/// global state.
pub struct ScriptContext<'a> {
    manager: &'a ResourceManager,
    environment: &'a Rc<ScriptEnvironment>,
    now: Instant,
}

impl<'a> ScriptContext<'a> {
    pub(crate) fn new(
        manager: &'a ResourceManager,
        environment: &'a Rc<ScriptEnvironment>,
        now: Instant,
    ) -> Self {
        Self {
            manager,
            environment,
            now,
        }
    }

    pub fn manager(&self) -> &'a ResourceManager {
        self.manager
    }

    pub fn environment(&self) -> &'a Rc<ScriptEnvironment> {
        self.environment
    }

    pub fn resource_name(&self) -> &str {
        self.environment.resource_name()
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Dispatches an event to every resource right away, with this resource
    /// as the source. Returns `true` if a handler cancelled it.
    pub fn trigger_event(&self, event_name: &str, payload: &[u8]) -> bool {
        self.manager
            .trigger_event(event_name, payload, self.resource_name())
    }

    /// Queues an event for the manager's next tick.
    pub fn queue_event(&self, event_name: &str, payload: Vec<u8>) {
        self.manager
            .queue_event(event_name, payload, self.resource_name().to_string());
    }

    /// Cancels the event currently being handled.
    pub fn cancel_event(&self) {
        self.manager.cancel_event();
    }

    pub fn was_event_cancelled(&self) -> bool {
        self.manager.was_event_cancelled()
    }

    pub fn current_event_source(&self) -> Option<String> {
        self.manager.current_event_source()
    }

    pub fn call_export(
        &self,
        resource: &str,
        export: &str,
        args: &[u8],
    ) -> Result<Vec<u8>, ResourceError> {
        self.manager.call_export(resource, export, args)
    }

    /// Schedules a thread in this environment from its next tick on.
    pub fn add_thread(&self, thread: impl ScriptThread + 'static) {
        self.environment.add_thread(thread);
    }

    pub fn add_event_handler(&self, event_name: &str, handler: EventHandler) {
        self.environment.add_event_handler(event_name, handler);
    }

    pub fn register_export(&self, export: &str, script_ref: ScriptRef) {
        self.environment.register_export(export, script_ref);
    }

    pub fn task_queue(&self) -> TaskQueue {
        self.environment.task_queue()
    }
}

/// The event a handler is invoked for.
pub struct EventContext<'a> {
    script: &'a ScriptContext<'a>,
    event_name: &'a str,
    payload: &'a [u8],
    source: &'a str,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(
        script: &'a ScriptContext<'a>,
        event_name: &'a str,
        payload: &'a [u8],
        source: &'a str,
    ) -> Self {
        Self {
            script,
            event_name,
            payload,
            source,
        }
    }

    pub fn script(&self) -> &'a ScriptContext<'a> {
        self.script
    }

    pub fn event_name(&self) -> &'a str {
        self.event_name
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// `net:<peer>` for network events, the triggering resource's name for
    /// local ones.
    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn cancel(&self) {
        self.script.cancel_event();
    }
}
