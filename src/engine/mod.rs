pub mod applier;
pub mod availability;
pub mod planner;
pub mod service;
pub mod slots;
