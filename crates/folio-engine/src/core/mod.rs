pub mod lifecycle;
pub mod smoothing;
pub mod time;
