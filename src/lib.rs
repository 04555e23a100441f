pub mod actor;
pub mod common;
pub mod geometry_engine;
pub mod model;
