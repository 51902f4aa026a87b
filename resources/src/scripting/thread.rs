use std::time::Duration;

use cinder_shared::Instant;

use crate::ScriptContext;

/// Outcome of resuming a [`ScriptThread`] once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadState {
    /// Resume again on the next tick
    Yield,
    /// Sleep for at least this long
    Wait(Duration),
    Done,
}

/// A resumable script-side task. Each call to `resume` runs it up to its next
/// yield point.
pub trait ScriptThread {
    fn resume(&mut self, ctx: &ScriptContext) -> ThreadState;
}

impl<F> ScriptThread for F
where
    F: FnMut(&ScriptContext) -> ThreadState,
{
    fn resume(&mut self, ctx: &ScriptContext) -> ThreadState {
        self(ctx)
    }
}

/// Pins a closure to the [`ScriptThread`] signature, so its argument type is
/// inferred at the call site.
pub fn thread_fn<F>(thread: F) -> F
where
    F: FnMut(&ScriptContext) -> ThreadState,
{
    thread
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Schedule {
    Ready,
    Suspended { until: Instant },
    Done,
}

pub(crate) struct ScheduledThread {
    thread: Box<dyn ScriptThread>,
    schedule: Schedule,
}

impl ScheduledThread {
    pub fn new(thread: Box<dyn ScriptThread>) -> Self {
        Self {
            thread,
            schedule: Schedule::Ready,
        }
    }

    pub fn is_due(&self, now: &Instant) -> bool {
        match self.schedule {
            Schedule::Ready => true,
            Schedule::Suspended { until } => !until.is_after(now),
            Schedule::Done => false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.schedule == Schedule::Done
    }

    /// Runs the thread to its next yield point and records when it wants to
    /// run again.
    pub fn resume(&mut self, ctx: &ScriptContext, now: &Instant) {
        self.schedule = match self.thread.resume(ctx) {
            ThreadState::Yield => Schedule::Ready,
            ThreadState::Wait(duration) => Schedule::Suspended {
                until: now.plus(duration),
            },
            ThreadState::Done => Schedule::Done,
        };
    }
}
