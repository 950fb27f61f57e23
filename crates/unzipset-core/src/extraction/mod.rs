//! Job execution: cleaning destinations, copying archive trees and running
//! batches of jobs.

pub mod clean;
pub mod copier;
pub mod engine;
pub mod runner;

pub use copier::TreeCopier;
pub use engine::Orchestrator;
pub use runner::JobRunner;
