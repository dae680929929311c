//! Core types and traits for designflow
//!
//! This crate contains domain types shared across all other crates.

mod ack;
pub mod constants;
mod design;
mod env_config;
mod error;

pub use ack::*;
pub use design::*;
pub use env_config::*;
pub use error::*;
