//! Frame snapshots and firing context
//!
//! A `FrameSnapshot` is the instrumentation call site's view of the paused
//! frame: where execution stopped, the ordered argument and local slots, and
//! the caller chain for stack capture. It is only valid for the duration of
//! the firing call; events copy what they need out of it.

use super::value::RuntimeValue;
use crate::expressions::Bindings;

/// Snapshot of one stack frame at the moment a probe fired
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    /// Source file of the executing code
    pub file: String,
    /// Function name of the executing code
    pub function: String,
    /// Line the frame is paused at
    pub line: u32,
    /// Ordered argument slots (declaration order)
    pub args: Vec<(String, RuntimeValue)>,
    /// Ordered non-argument local slots (declaration order)
    pub locals: Vec<(String, RuntimeValue)>,
    /// The calling frame, if the adapter walked that far
    pub caller: Option<Box<FrameSnapshot>>,
}

impl FrameSnapshot {
    pub fn new(file: impl Into<String>, function: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            function: function.into(),
            line,
            args: Vec::new(),
            locals: Vec::new(),
            caller: None,
        }
    }

    /// Append an argument slot
    pub fn with_arg(mut self, name: impl Into<String>, value: RuntimeValue) -> Self {
        self.args.push((name.into(), value));
        self
    }

    /// Append a local slot
    pub fn with_local(mut self, name: impl Into<String>, value: RuntimeValue) -> Self {
        self.locals.push((name.into(), value));
        self
    }

    /// Attach the calling frame
    pub fn with_caller(mut self, caller: FrameSnapshot) -> Self {
        self.caller = Some(Box::new(caller));
        self
    }

    /// All visible names of the frame (arguments and locals merged), for
    /// condition evaluation at line probes.
    pub fn bindings(&self) -> Bindings {
        self.args
            .iter()
            .chain(self.locals.iter())
            .cloned()
            .collect()
    }
}

/// Thread the probe fired on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    pub id: Option<i64>,
    pub name: String,
}

impl ThreadInfo {
    pub fn new(id: impl Into<Option<i64>>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Info for the calling thread
    pub fn current() -> Self {
        Self {
            id: None,
            name: std::thread::current()
                .name()
                .unwrap_or("unnamed")
                .to_string(),
        }
    }
}

/// Trace correlation ids attached to an event when the firing happened
/// inside an active trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: u64,
    pub span_id: u64,
}

/// An in-flight exception at the moment a probe fired.
///
/// `frame` is the deepest frame of the traceback - the point furthest from
/// where the exception would be caught; its caller chain ascends outward.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionInfo {
    pub type_name: String,
    /// The exception's argument values
    pub args: Vec<RuntimeValue>,
    /// Deepest frame of the traceback
    pub frame: Option<FrameSnapshot>,
}

impl ExceptionInfo {
    pub fn new(type_name: impl Into<String>, args: Vec<RuntimeValue>) -> Self {
        Self {
            type_name: type_name.into(),
            args,
            frame: None,
        }
    }

    pub fn with_frame(mut self, frame: FrameSnapshot) -> Self {
        self.frame = Some(frame);
        self
    }
}
