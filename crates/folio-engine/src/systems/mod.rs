pub mod animator;
pub mod cursor;
pub mod tour;
pub mod visibility;
