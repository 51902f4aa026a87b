//! # Cinder Resources
//! Named, versioned units of script content with a dependency-ordered
//! lifecycle, a manager that queues and dispatches events between them, and
//! the cooperative scripting environment each running resource owns.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod config;
mod device;
mod error;
mod event_queue;
mod manifest;
mod resource;
mod resource_manager;
mod resource_state;
pub mod scripting;

pub use config::ResourceConfig;
pub use device::{join_path, LocalDevice, MemoryDevice, ResourceDevice};
pub use error::{DeviceError, ManifestError, ResourceError, ScriptError};
pub use event_queue::{EventQueue, QueuedEvent};
pub use manifest::Manifest;
pub use resource::Resource;
pub use resource_manager::{EnvironmentGuard, ResourceManager};
pub use resource_state::ResourceState;
pub use scripting::{
    EventContext, EventHandler, RefId, ScriptContext, ScriptEnvironment, ScriptRef,
    ScriptRuntime, ScriptRuntimeFactory, ScriptThread, Task, TaskQueue, ThreadState,
    thread_fn,
};
