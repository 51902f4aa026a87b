use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use log::{debug, info, warn};

use cinder_shared::Instant;

use crate::{
    device::join_path, EventQueue, Resource, ResourceConfig, ResourceDevice, ResourceError,
    ResourceState, ScriptEnvironment, ScriptRuntime, ScriptRuntimeFactory,
};

/// Owns every [`Resource`], drives their lifecycles and dispatches events
/// between them.
///
/// The manager is single-threaded: all methods take `&self` so scripts can
/// call back into it while it is dispatching, and it must be driven from one
/// thread. Other threads reach it only through the [`EventQueue`] returned by
/// [`event_queue`](Self::event_queue).
pub struct ResourceManager {
    config: ResourceConfig,
    device: Box<dyn ResourceDevice>,
    runtime_factories: RefCell<Vec<Rc<dyn ScriptRuntimeFactory>>>,
    resources: RefCell<Vec<Rc<Resource>>>,
    state_generation: Cell<u64>,
    event_queue: EventQueue,
    cancel_stack: RefCell<Vec<bool>>,
    event_sources: RefCell<Vec<String>>,
    environment_stack: RefCell<Vec<Rc<ScriptEnvironment>>>,
    now: Cell<Instant>,
}

/// Keeps an environment on the manager's environment stack until dropped.
pub struct EnvironmentGuard<'a> {
    manager: &'a ResourceManager,
}

impl Drop for EnvironmentGuard<'_> {
    fn drop(&mut self) {
        self.manager.environment_stack.borrow_mut().pop();
    }
}

struct EventFrame<'a> {
    manager: &'a ResourceManager,
}

impl Drop for EventFrame<'_> {
    fn drop(&mut self) {
        self.manager.event_sources.borrow_mut().pop();
    }
}

impl ResourceManager {
    pub fn new(config: ResourceConfig, device: impl ResourceDevice + 'static) -> Self {
        Self {
            config,
            device: Box::new(device),
            runtime_factories: RefCell::new(Vec::new()),
            resources: RefCell::new(Vec::new()),
            state_generation: Cell::new(0),
            event_queue: EventQueue::new(),
            cancel_stack: RefCell::new(Vec::new()),
            event_sources: RefCell::new(Vec::new()),
            environment_stack: RefCell::new(Vec::new()),
            now: Cell::new(Instant::now()),
        }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn device(&self) -> &dyn ResourceDevice {
        self.device.as_ref()
    }

    /// Time of the current tick.
    pub fn now(&self) -> Instant {
        self.now.get()
    }

    /// Makes a runtime available to environments created from now on.
    pub fn register_runtime(&self, factory: impl ScriptRuntimeFactory + 'static) {
        debug!("Registered scripting runtime {}", factory.name());
        self.runtime_factories.borrow_mut().push(Rc::new(factory));
    }

    pub(crate) fn create_runtimes(&self) -> Vec<Rc<dyn ScriptRuntime>> {
        let factories = self.runtime_factories.borrow().clone();
        factories
            .iter()
            .map(|factory| factory.create_runtime())
            .collect()
    }

    // Resource set

    /// Registers a new, unparsed resource.
    pub fn add_resource(&self, name: &str, path: &str) -> Result<Rc<Resource>, ResourceError> {
        if self.get_resource(name).is_some() {
            return Err(ResourceError::AlreadyExists {
                resource: name.to_string(),
            });
        }

        let resource = Rc::new(Resource::new(name, path));
        self.resources.borrow_mut().push(resource.clone());
        self.bump_generation();
        Ok(resource)
    }

    /// Removes a resource that is not active.
    pub fn delete_resource(&self, name: &str) -> Result<(), ResourceError> {
        let resource = self.require(name)?;
        let state = resource.state();
        if state.is_active() || state == ResourceState::Parsing {
            return Err(ResourceError::NotStopped {
                resource: name.to_string(),
                state,
            });
        }

        self.resources
            .borrow_mut()
            .retain(|resource| resource.name() != name);
        for resource in self.resources() {
            resource.remove_dependant(name);
        }
        self.bump_generation();
        Ok(())
    }

    pub fn get_resource(&self, name: &str) -> Option<Rc<Resource>> {
        self.resources
            .borrow()
            .iter()
            .find(|resource| resource.name() == name)
            .cloned()
    }

    fn require(&self, name: &str) -> Result<Rc<Resource>, ResourceError> {
        self.get_resource(name)
            .ok_or_else(|| ResourceError::NotFound {
                resource: name.to_string(),
            })
    }

    /// Snapshot of all resources in insertion order.
    pub fn resources(&self) -> Vec<Rc<Resource>> {
        self.resources.borrow().clone()
    }

    /// Incremented whenever a resource is added or deleted.
    pub fn state_generation(&self) -> u64 {
        self.state_generation.get()
    }

    fn bump_generation(&self) {
        self.state_generation.set(self.state_generation.get() + 1);
    }

    /// Adds and parses every directory under `root` that holds a manifest and
    /// is not known yet. A resource failing to parse is kept in `Error`.
    /// Returns the names added.
    pub fn scan_resources(&self, root: &str) -> Result<Vec<String>, ResourceError> {
        let directories =
            self.device
                .list_directories(root)
                .map_err(|error| ResourceError::ManifestRead {
                    resource: root.to_string(),
                    error,
                })?;

        let mut added = Vec::new();
        for name in directories {
            let path = join_path(root, &name);
            if !self
                .device
                .exists(&join_path(&path, &self.config.manifest_file_name))
            {
                continue;
            }
            if self.get_resource(&name).is_some() {
                continue;
            }

            let resource = self.add_resource(&name, &path)?;
            if let Err(error) = resource.parse(self) {
                warn!("Scanned resource {} is invalid: {}", name, error);
            }
            added.push(name);
        }

        info!("Found {} new resources under {}", added.len(), root);
        Ok(added)
    }

    // Lifecycle

    pub fn parse_resource(&self, name: &str) -> Result<(), ResourceError> {
        self.require(name)?.parse(self)
    }

    /// Starts one resource whose dependencies are already running.
    pub fn start_resource(&self, name: &str) -> Result<(), ResourceError> {
        self.require(name)?.start(self)
    }

    /// Starts `name` after starting its dependency closure, dependencies
    /// first. Already running resources are left alone.
    pub fn start_resource_with_dependencies(&self, name: &str) -> Result<(), ResourceError> {
        let mut chain = Vec::new();
        self.start_depth_first(name, &mut chain)
    }

    fn start_depth_first(&self, name: &str, chain: &mut Vec<String>) -> Result<(), ResourceError> {
        if chain.iter().any(|visiting| visiting == name) {
            let mut cycle = chain.clone();
            cycle.push(name.to_string());
            return Err(ResourceError::DependencyCycle { chain: cycle });
        }

        let resource = self.require(name)?;
        if resource.state() == ResourceState::Running {
            return Ok(());
        }
        if resource.state() == ResourceState::Stopped && !resource.is_parsed() {
            resource.parse(self)?;
        }

        chain.push(name.to_string());
        for dependency in resource.dependencies() {
            if self.get_resource(&dependency).is_none() {
                return Err(ResourceError::DependencyMissing {
                    resource: name.to_string(),
                    dependency,
                });
            }
            self.start_depth_first(&dependency, chain)?;
        }
        chain.pop();

        resource.start(self)
    }

    /// Stops `name`, stopping every resource depending on it first. Returns
    /// the names stopped, in stop order.
    pub fn stop_resource(&self, name: &str) -> Result<Vec<String>, ResourceError> {
        let mut stopped = Vec::new();
        self.stop_cascade(name, &mut stopped)?;
        Ok(stopped)
    }

    fn stop_cascade(&self, name: &str, stopped: &mut Vec<String>) -> Result<(), ResourceError> {
        let resource = self.require(name)?;
        for dependant in resource.dependants() {
            let still_running = self
                .get_resource(&dependant)
                .map_or(false, |resource| resource.state() == ResourceState::Running);
            if still_running {
                self.stop_cascade(&dependant, stopped)?;
            } else {
                resource.remove_dependant(&dependant);
            }
        }

        resource.stop(self)?;
        stopped.push(name.to_string());
        Ok(())
    }

    /// Stops (with dependants) if running, parses again from scratch and
    /// restarts everything that was stopped. Also recovers a resource from
    /// `Error`.
    pub fn reload_resource(&self, name: &str) -> Result<(), ResourceError> {
        let resource = self.require(name)?;
        let was_running = resource.state() == ResourceState::Running;

        let stopped = if was_running {
            self.stop_resource(name)?
        } else {
            Vec::new()
        };

        resource.parse(self)?;
        info!("Reloaded resource {}", name);

        if was_running {
            for restart in stopped.iter().rev() {
                self.start_resource_with_dependencies(restart)?;
            }
        }
        Ok(())
    }

    // Events

    /// Dispatches an event to every resource right away. Returns `true` if a
    /// handler cancelled it.
    ///
    /// Each dispatch gets its own cancellation frame, so cancelling an event
    /// triggered from inside a handler does not cancel the outer event.
    pub fn trigger_event(&self, event_name: &str, payload: &[u8], source: &str) -> bool {
        debug!("Triggering {} from {}", event_name, source);
        self.cancel_stack.borrow_mut().push(false);
        self.event_sources.borrow_mut().push(source.to_string());
        let frame = EventFrame { manager: self };

        for resource in self.resources() {
            if let Some(environment) = resource.environment() {
                environment.trigger_event(self, event_name, payload, source);
            }
        }

        drop(frame);
        self.cancel_stack.borrow_mut().pop().unwrap_or(false)
    }

    /// Queues an event for the next [`tick`](Self::tick).
    pub fn queue_event(&self, event_name: &str, payload: Vec<u8>, source: String) {
        self.event_queue.push(event_name, payload, source);
    }

    /// Handle for queueing events from other threads.
    pub fn event_queue(&self) -> EventQueue {
        self.event_queue.clone()
    }

    /// Cancels the innermost event being dispatched. Ignored outside of a
    /// dispatch.
    pub fn cancel_event(&self) {
        match self.cancel_stack.borrow_mut().last_mut() {
            Some(cancelled) => *cancelled = true,
            None => warn!("cancel_event called outside of event dispatch"),
        }
    }

    pub fn was_event_cancelled(&self) -> bool {
        self.cancel_stack.borrow().last().copied().unwrap_or(false)
    }

    /// Source of the innermost event being dispatched.
    pub fn current_event_source(&self) -> Option<String> {
        self.event_sources.borrow().last().cloned()
    }

    /// Dispatches the events queued before this call, in FIFO order, then
    /// ticks every resource's environment in insertion order. Events queued
    /// while this tick runs wait for the next one.
    pub fn tick(&self, now: &Instant) {
        self.now.set(*now);

        for event in self.event_queue.drain() {
            self.trigger_event(&event.event_name, &event.payload, &event.source);
        }

        for resource in self.resources() {
            if let Some(environment) = resource.environment() {
                environment.tick(self, now);
            }
        }
    }

    // Cross-resource calls

    /// Calls an export of a running resource synchronously.
    pub fn call_export(
        &self,
        resource: &str,
        export: &str,
        args: &[u8],
    ) -> Result<Vec<u8>, ResourceError> {
        let target = self.require(resource)?;
        let environment = match (target.state(), target.environment()) {
            (ResourceState::Running, Some(environment)) => environment,
            _ => {
                return Err(ResourceError::NotRunning {
                    resource: resource.to_string(),
                })
            }
        };

        let declared = target
            .manifest()
            .map_or(false, |manifest| manifest.declares_export(export));
        if !declared {
            return Err(ResourceError::ExportNotDeclared {
                resource: resource.to_string(),
                export: export.to_string(),
            });
        }

        let script_ref =
            environment
                .export(export)
                .ok_or_else(|| ResourceError::ExportNotFound {
                    resource: resource.to_string(),
                    export: export.to_string(),
                })?;

        environment
            .call_ref(self, &script_ref, args)
            .map_err(|error| ResourceError::Script {
                resource: resource.to_string(),
                error,
            })
    }

    // Environment stack

    /// Marks `environment` as the one currently executing until the guard is
    /// dropped.
    pub fn push_environment(&self, environment: Rc<ScriptEnvironment>) -> EnvironmentGuard<'_> {
        self.environment_stack.borrow_mut().push(environment);
        EnvironmentGuard { manager: self }
    }

    /// Innermost executing environment.
    pub fn current_environment(&self) -> Option<Rc<ScriptEnvironment>> {
        self.environment_stack.borrow().last().cloned()
    }

    /// Environment that started the current call chain.
    pub fn outermost_environment(&self) -> Option<Rc<ScriptEnvironment>> {
        self.environment_stack.borrow().first().cloned()
    }

    pub fn environment_depth(&self) -> usize {
        self.environment_stack.borrow().len()
    }
}
