pub mod queue;
pub mod signal;
