pub mod audit;
pub mod enums;
pub mod filters;
pub mod patient;

pub use audit::*;
pub use filters::*;
pub use patient::*;
