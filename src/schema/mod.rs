//! Data types shared across the expansion pipeline.

pub mod expr;
pub mod table;
