pub mod area;
pub mod order;
pub mod plan;
pub mod slot;
pub mod staff;
