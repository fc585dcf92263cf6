// Tabular snapshot model and pure transforms

pub mod error;
pub mod render;
pub mod stats;
pub mod table;
pub mod transform;

pub use error::EngineError;
pub use table::{Column, Table, Value};
