use std::rc::Rc;

use crate::{ScriptContext, ScriptError};

/// Handle to a callable value living inside a runtime.
pub type RefId = u32;

/// An embedded scripting language instance bound to one environment.
///
/// Every method takes `&self`: a call into the runtime may re-enter it (a
/// handler triggering an event handled by the same resource), so
/// implementations keep their mutable state behind interior mutability.
pub trait ScriptRuntime {
    fn name(&self) -> &str;

    /// Whether this runtime loads `file_name`, by extension or by sniffing
    /// `contents`.
    fn handles_file(&self, file_name: &str, contents: &[u8]) -> bool;

    /// Sets up the runtime's call context before any file is loaded.
    fn create(&self, ctx: &ScriptContext) -> Result<(), ScriptError>;

    fn load_file(
        &self,
        ctx: &ScriptContext,
        file_name: &str,
        contents: &[u8],
    ) -> Result<(), ScriptError>;

    /// Called once per environment tick.
    fn tick(&self, _ctx: &ScriptContext) -> Result<(), ScriptError> {
        Ok(())
    }

    /// Invokes a reference with serialized arguments, returning the
    /// serialized result.
    fn call_ref(
        &self,
        ctx: &ScriptContext,
        reference: RefId,
        args: &[u8],
    ) -> Result<Vec<u8>, ScriptError>;

    fn destroy(&self, _ctx: &ScriptContext) {}
}

/// Creates one runtime instance per environment.
pub trait ScriptRuntimeFactory {
    fn name(&self) -> &str;

    fn create_runtime(&self) -> Rc<dyn ScriptRuntime>;
}

/// A reference together with the runtime that owns it.
#[derive(Clone)]
pub struct ScriptRef {
    pub runtime: Rc<dyn ScriptRuntime>,
    pub reference: RefId,
}

impl ScriptRef {
    pub fn new(runtime: Rc<dyn ScriptRuntime>, reference: RefId) -> Self {
        Self { runtime, reference }
    }

    pub fn call(&self, ctx: &ScriptContext, args: &[u8]) -> Result<Vec<u8>, ScriptError> {
        self.runtime.call_ref(ctx, self.reference, args)
    }
}
