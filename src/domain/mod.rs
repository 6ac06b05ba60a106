// Domain module: catalog records, LP description, result records and the
// solver-backend contract

pub mod models;
pub mod solver_service;
pub mod value_objects;

pub use models::*;
pub use solver_service::*;
pub use value_objects::*;
