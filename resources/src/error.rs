use thiserror::Error;

use crate::{scripting::RefId, ResourceState};

/// Errors raised by a [`ResourceDevice`](crate::ResourceDevice)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("No such file or directory: {path}")]
    NotFound { path: String },

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    /// Path climbs above the device root
    #[error("Path escapes the device root: {path}")]
    OutsideRoot { path: String },
}

/// A manifest line that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct ManifestError {
    pub line: usize,
    pub reason: &'static str,
}

/// Errors reported by a scripting runtime
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// Script source failed to compile or run
    #[error("{message}")]
    Runtime { message: String },

    /// A reference that the runtime does not (or no longer) know
    #[error("Unknown script reference {reference}")]
    UnknownReference { reference: RefId },
}

impl ScriptError {
    pub fn runtime(message: impl Into<String>) -> Self {
        ScriptError::Runtime {
            message: message.into(),
        }
    }
}

/// Failures of resource management and lifecycle operations.
///
/// Illegal transitions are refused without touching the resource; only
/// `ManifestParse`, `ManifestRead`, `ScriptLoad` and `NoRuntimeForFile` move a
/// resource into [`ResourceState::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("Resource {resource} already exists")]
    AlreadyExists { resource: String },

    #[error("Resource {resource} does not exist")]
    NotFound { resource: String },

    #[error("Resource {resource} has not been parsed")]
    NotParsed { resource: String },

    #[error("Resource {resource} is not running")]
    NotRunning { resource: String },

    #[error("Resource {resource} must be stopped first (currently {state:?})")]
    NotStopped {
        resource: String,
        state: ResourceState,
    },

    /// Requested lifecycle transition is not legal from the current state
    #[error("Resource {resource} cannot transition from {from:?} to {to:?}")]
    IllegalTransition {
        resource: String,
        from: ResourceState,
        to: ResourceState,
    },

    #[error("Resource {resource} is still required by {}", .dependants.join(", "))]
    DependantsRunning {
        resource: String,
        dependants: Vec<String>,
    },

    /// Declared dependency is absent or not running
    #[error("Resource {resource} requires {dependency}, which is not running")]
    DependencyMissing {
        resource: String,
        dependency: String,
    },

    #[error("Dependency cycle: {}", .chain.join(" -> "))]
    DependencyCycle { chain: Vec<String> },

    #[error("Could not read the manifest of {resource}: {error}")]
    ManifestRead {
        resource: String,
        error: DeviceError,
    },

    #[error("Invalid manifest for {resource}, {error}")]
    ManifestParse {
        resource: String,
        error: ManifestError,
    },

    /// Script file failed to load in its runtime
    #[error("Failed to load {file} in {resource}: {reason}")]
    ScriptLoad {
        resource: String,
        file: String,
        reason: String,
    },

    #[error("No scripting runtime handles {file} in {resource}")]
    NoRuntimeForFile { resource: String, file: String },

    /// `onResourceStarting` was cancelled by a handler
    #[error("Start of {resource} was cancelled")]
    StartCancelled { resource: String },

    #[error("Resource {resource} does not declare the export {export}")]
    ExportNotDeclared { resource: String, export: String },

    #[error("Resource {resource} declares {export} but no script registered it")]
    ExportNotFound { resource: String, export: String },

    #[error("Script error in {resource}: {error}")]
    Script {
        resource: String,
        error: ScriptError,
    },
}
