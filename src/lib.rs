//! Promptspin — stochastic expansion of prompt templates.
//!
//! A template mixes literal text, `__name__` wildcards resolved from a
//! candidate table, and `{...|...}` alternation groups that draw one or
//! more weighted options, nested arbitrarily deep. Expansion resolves
//! wildcards to a fixpoint, parses the result into an expression tree, and
//! evaluates the tree into one concrete string — deterministically under a
//! fixed seed.

pub mod core;
pub mod schema;
