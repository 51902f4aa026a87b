//! Per-resource script execution: the runtime boundary, the cooperative
//! thread scheduler, event handler registry and cross-thread task queue.

mod context;
mod environment;
mod handler;
mod runtime;
mod task_queue;
mod thread;

pub use context::{EventContext, ScriptContext};
pub use environment::ScriptEnvironment;
pub use handler::EventHandler;
pub use runtime::{RefId, ScriptRef, ScriptRuntime, ScriptRuntimeFactory};
pub use task_queue::{Task, TaskQueue};
pub use thread::{thread_fn, ScriptThread, ThreadState};
