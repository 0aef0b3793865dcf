//! ICP fit evaluator library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod processing;
pub mod rules;
pub mod session;

pub use config::Config;
pub use error::{IcpError, Result};
