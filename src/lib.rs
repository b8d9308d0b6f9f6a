//! smart-ats library
//!
//! Compares a resume PDF against a job description by asking a hosted model
//! for a match percentage, missing keywords and a profile summary.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod processing;

pub use config::{ApiKey, Config};
pub use error::{Result, SmartAtsError};
