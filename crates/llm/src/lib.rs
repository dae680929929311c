//! Inference client used to enrich design records with a generation prompt.

pub mod ai_types;
mod client;
mod describe;
mod error;


pub use client::{LlmClient, truncate};
pub use describe::DescriptionGenerator;
pub use error::LlmError;
