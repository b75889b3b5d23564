pub mod geometry;
pub mod point;
