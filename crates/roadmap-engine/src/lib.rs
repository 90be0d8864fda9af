//! Retrieval-and-assembly pipeline for learning roadmaps.
//!
//! [`RoadmapEngine`] ties the pieces together: the [`loader`] keeps the index in
//! step with a corpus, the [`retriever`] finds topics for a query and decides
//! whether they are relevant, and the [`assembler`] turns them into phases or
//! asks the generator for a roadmap of its own.

pub mod assembler;
pub mod engine;
pub mod gemini;
pub mod knowledge;
pub mod loader;
pub mod prompts;
pub mod retriever;
pub mod upstream;

pub use assembler::{organize_into_phases, Assembler, Summary};
pub use engine::{EngineSettings, RoadmapEngine};
pub use gemini::GeminiGenerator;
pub use loader::{Loader, ReconcileReport};
pub use retriever::{is_grounded, Relevance, Retriever};
