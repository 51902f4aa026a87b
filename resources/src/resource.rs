use std::{
    cell::{Cell, Ref, RefCell},
    collections::BTreeSet,
    rc::Rc,
};

use log::{info, warn};

use crate::{
    device::join_path, Manifest, ResourceError, ResourceManager, ResourceState,
    ScriptEnvironment,
};

pub(crate) const ON_RESOURCE_STARTING: &str = "onResourceStarting";
pub(crate) const ON_RESOURCE_START: &str = "onResourceStart";
pub(crate) const ON_RESOURCE_STOP: &str = "onResourceStop";

/// A named unit of script content.
///
/// Owned by a [`ResourceManager`]; lifecycle methods take the manager so the
/// resource can resolve its dependencies, create its environment and emit
/// lifecycle events.
pub struct Resource {
    name: String,
    path: String,
    state: Cell<ResourceState>,
    manifest: RefCell<Option<Manifest>>,
    dependants: RefCell<BTreeSet<String>>,
    mounts: RefCell<Vec<String>>,
    environment: RefCell<Option<Rc<ScriptEnvironment>>>,
}

impl Resource {
    pub(crate) fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            state: Cell::new(ResourceState::Stopped),
            manifest: RefCell::new(None),
            dependants: RefCell::new(BTreeSet::new()),
            mounts: RefCell::new(Vec::new()),
            environment: RefCell::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> ResourceState {
        self.state.get()
    }

    pub fn is_parsed(&self) -> bool {
        self.manifest.borrow().is_some()
    }

    /// The manifest read by the last successful parse.
    pub fn manifest(&self) -> Option<Ref<'_, Manifest>> {
        Ref::filter_map(self.manifest.borrow(), Option::as_ref).ok()
    }

    pub fn dependencies(&self) -> Vec<String> {
        self.manifest
            .borrow()
            .as_ref()
            .map(|manifest| manifest.dependencies().to_vec())
            .unwrap_or_default()
    }

    /// Running resources that depend on this one.
    pub fn dependants(&self) -> Vec<String> {
        self.dependants.borrow().iter().cloned().collect()
    }

    pub fn add_dependant(&self, name: &str) {
        self.dependants.borrow_mut().insert(name.to_string());
    }

    pub fn remove_dependant(&self, name: &str) {
        self.dependants.borrow_mut().remove(name);
    }

    /// The scripting environment, present from `Starting` until the end of
    /// `Stopping`.
    pub fn environment(&self) -> Option<Rc<ScriptEnvironment>> {
        self.environment.borrow().clone()
    }

    /// Records a packfile mount. Mounts are released when the resource stops.
    pub fn mount(&self, path: &str) {
        self.mounts.borrow_mut().push(path.to_string());
    }

    pub fn mounts(&self) -> Vec<String> {
        self.mounts.borrow().clone()
    }

    /// Reads and validates the manifest from scratch. Allowed from `Stopped`
    /// and `Error`; a failure leaves the resource in `Error`.
    pub fn parse(&self, manager: &ResourceManager) -> Result<(), ResourceError> {
        let state = self.state();
        if state != ResourceState::Stopped && state != ResourceState::Error {
            return Err(ResourceError::NotStopped {
                resource: self.name.clone(),
                state,
            });
        }

        self.state.set(ResourceState::Parsing);
        match self.read_manifest(manager) {
            Ok(manifest) => {
                *self.manifest.borrow_mut() = Some(manifest);
                self.state.set(ResourceState::Stopped);
                Ok(())
            }
            Err(error) => {
                warn!("Failed to parse {}: {}", self.name, error);
                *self.manifest.borrow_mut() = None;
                self.state.set(ResourceState::Error);
                Err(error)
            }
        }
    }

    fn read_manifest(&self, manager: &ResourceManager) -> Result<Manifest, ResourceError> {
        let manifest_path = join_path(&self.path, &manager.config().manifest_file_name);
        let bytes = manager
            .device()
            .read(&manifest_path)
            .map_err(|error| ResourceError::ManifestRead {
                resource: self.name.clone(),
                error,
            })?;

        let text = String::from_utf8_lossy(&bytes);
        Manifest::parse(&text).map_err(|error| ResourceError::ManifestParse {
            resource: self.name.clone(),
            error,
        })
    }

    /// `Stopped -> Starting -> Running`.
    ///
    /// Every dependency must already be running. A cancelled
    /// `onResourceStarting` or a missing dependency leaves the resource
    /// `Stopped`; a script that fails to load leaves it in `Error`.
    pub fn start(&self, manager: &ResourceManager) -> Result<(), ResourceError> {
        let state = self.state();
        if state != ResourceState::Stopped {
            return Err(ResourceError::IllegalTransition {
                resource: self.name.clone(),
                from: state,
                to: ResourceState::Starting,
            });
        }

        let (scripts, dependencies) = match self.manifest.borrow().as_ref() {
            Some(manifest) => (
                manifest.scripts().to_vec(),
                manifest.dependencies().to_vec(),
            ),
            None => {
                return Err(ResourceError::NotParsed {
                    resource: self.name.clone(),
                })
            }
        };

        let mut required = Vec::with_capacity(dependencies.len());
        for dependency in &dependencies {
            match manager.get_resource(dependency) {
                Some(resource) if resource.state() == ResourceState::Running => {
                    required.push(resource)
                }
                _ => {
                    return Err(ResourceError::DependencyMissing {
                        resource: self.name.clone(),
                        dependency: dependency.clone(),
                    })
                }
            }
        }

        // onResourceStarting handlers already see Starting.
        self.state.set(ResourceState::Starting);
        if manager.config().lifecycle_events
            && manager.trigger_event(ON_RESOURCE_STARTING, self.name.as_bytes(), "internal")
        {
            info!("Start of {} was cancelled", self.name);
            self.state.set(ResourceState::Stopped);
            return Err(ResourceError::StartCancelled {
                resource: self.name.clone(),
            });
        }

        let environment = ScriptEnvironment::new(&self.name, manager.create_runtimes());
        *self.environment.borrow_mut() = Some(environment.clone());

        if let Err(error) = self.load_scripts(manager, &environment, &scripts) {
            warn!("Failed to start {}: {}", self.name, error);
            self.environment.borrow_mut().take();
            environment.destroy(manager);
            self.state.set(ResourceState::Error);
            return Err(error);
        }

        for resource in &required {
            resource.add_dependant(&self.name);
        }
        self.state.set(ResourceState::Running);
        info!("Started resource {}", self.name);

        if manager.config().lifecycle_events {
            manager.trigger_event(ON_RESOURCE_START, self.name.as_bytes(), "internal");
        }
        Ok(())
    }

    fn load_scripts(
        &self,
        manager: &ResourceManager,
        environment: &Rc<ScriptEnvironment>,
        scripts: &[String],
    ) -> Result<(), ResourceError> {
        environment
            .create(manager)
            .map_err(|error| ResourceError::ScriptLoad {
                resource: self.name.clone(),
                file: String::new(),
                reason: error.to_string(),
            })?;

        for file in scripts {
            let contents = manager
                .device()
                .read(&join_path(&self.path, file))
                .map_err(|error| ResourceError::ScriptLoad {
                    resource: self.name.clone(),
                    file: file.clone(),
                    reason: error.to_string(),
                })?;

            let runtime = environment.runtime_for(file, &contents).ok_or_else(|| {
                ResourceError::NoRuntimeForFile {
                    resource: self.name.clone(),
                    file: file.clone(),
                }
            })?;

            environment
                .load_file(manager, &runtime, file, &contents)
                .map_err(|error| ResourceError::ScriptLoad {
                    resource: self.name.clone(),
                    file: file.clone(),
                    reason: error.to_string(),
                })?;
        }
        Ok(())
    }

    /// `Running -> Stopping -> Stopped`.
    ///
    /// Refused while running dependants remain. `onResourceStop` is
    /// delivered while the environment still exists, then the environment is
    /// destroyed and the mounts are released.
    pub fn stop(&self, manager: &ResourceManager) -> Result<(), ResourceError> {
        let state = self.state();
        if state != ResourceState::Running {
            return Err(ResourceError::IllegalTransition {
                resource: self.name.clone(),
                from: state,
                to: ResourceState::Stopping,
            });
        }

        let dependants = self.dependants();
        if !dependants.is_empty() {
            return Err(ResourceError::DependantsRunning {
                resource: self.name.clone(),
                dependants,
            });
        }

        self.state.set(ResourceState::Stopping);
        if manager.config().lifecycle_events {
            manager.trigger_event(ON_RESOURCE_STOP, self.name.as_bytes(), "internal");
        }

        let environment = self.environment.borrow_mut().take();
        if let Some(environment) = environment {
            environment.destroy(manager);
        }

        for dependency in self.dependencies() {
            if let Some(resource) = manager.get_resource(&dependency) {
                resource.remove_dependant(&self.name);
            }
        }

        self.mounts.borrow_mut().clear();
        self.state.set(ResourceState::Stopped);
        info!("Stopped resource {}", self.name);
        Ok(())
    }
}
