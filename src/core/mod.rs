//! Expansion pipeline stages: wildcard resolution, parsing, evaluation.

pub mod evaluator;
pub mod parser;
pub mod pipeline;
pub mod wildcard;
