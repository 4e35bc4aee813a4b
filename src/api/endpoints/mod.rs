//! API endpoint handlers.

pub mod audit;
pub mod health;
pub mod import;
pub mod patients;
