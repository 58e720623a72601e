pub mod compose;
pub mod geometry;
pub mod message;
