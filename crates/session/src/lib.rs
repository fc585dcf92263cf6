// Per-user sessions and the inbound-event boundary

pub mod error;
pub mod service;
pub mod settings;
pub mod store;

pub use error::ServiceError;
pub use service::{LoadSummary, ResetOutcome, Service, TransformOp, TransformOutput};
pub use settings::Settings;
pub use store::SessionStore;
