mod description;
mod emitter;
mod event;
mod processing;

pub use description::{EventDescription, FieldDescription};
pub use event::Event;
pub use processing::ProcessingInstructions;
