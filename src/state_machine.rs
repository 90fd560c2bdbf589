//! Agent pipeline state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! The executor in `crate::pipeline` owns all I/O.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{PipelineContext, PipelineState, StructuredToolCalls, ToolTrigger};
pub use transition::{transition, TransitionError, TransitionResult};
