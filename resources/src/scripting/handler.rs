use std::rc::Rc;

use log::warn;

use crate::{EventContext, ScriptRef};

/// A callback registered for an event name.
#[derive(Clone)]
pub enum EventHandler {
    /// Host-side callback
    Native(Rc<dyn Fn(&EventContext)>),
    /// Script reference, called with the event payload as arguments
    Script(ScriptRef),
}

impl EventHandler {
    pub fn native(handler: impl Fn(&EventContext) + 'static) -> Self {
        EventHandler::Native(Rc::new(handler))
    }

    pub(crate) fn invoke(&self, event: &EventContext) {
        match self {
            EventHandler::Native(handler) => handler(event),
            EventHandler::Script(script_ref) => {
                if let Err(error) = script_ref.call(event.script(), event.payload()) {
                    warn!(
                        "Handler for {} in {} failed: {}",
                        event.event_name(),
                        event.script().resource_name(),
                        error
                    );
                }
            }
        }
    }
}
