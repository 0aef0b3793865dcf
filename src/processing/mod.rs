//! Request assembly and validation

pub mod request;

pub use request::{EvaluationInputs, EvaluationRequest};
