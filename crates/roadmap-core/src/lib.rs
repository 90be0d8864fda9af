//! Shared vocabulary for the roadmap workspace: topic and roadmap types, the
//! error taxonomy, capability traits, configuration and corpus loading.

pub mod config;
pub mod corpus;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Capability, Error, Result};
