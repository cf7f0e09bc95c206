pub mod error;
pub mod host;
pub mod page;
pub mod types;
