pub mod error;
pub mod net;
pub mod orchestrator;
pub mod sources;

pub use error::SourceError;
pub use orchestrator::Orchestrator;
pub use sources::Source;
