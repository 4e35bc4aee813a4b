pub mod cell;
pub mod coordinator;
pub mod disciplines;
pub mod format;
pub mod reader;
pub mod sheet;
pub mod store;
pub mod tables;
pub mod traits;
pub mod types;
pub mod workbook;

#[cfg(test)]
pub(crate) mod fixtures;

pub use coordinator::*;
pub use disciplines::*;
pub use format::*;
pub use reader::*;
pub use store::*;
pub use tables::*;
pub use traits::*;
pub use types::*;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("File too large: {size_mb:.1}MB exceeds {max_mb}MB limit")]
    FileTooLarge { size_mb: f64, max_mb: u64 },

    #[error("Could not read workbook: {0}")]
    Workbook(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
