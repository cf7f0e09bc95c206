pub mod avatar;
pub mod reveal;
pub mod tour_step;
