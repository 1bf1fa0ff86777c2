//! Stochastic evaluation of parsed expressions.

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;

use crate::schema::expr::{Alternative, Expression, GroupSpec, Item};

#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A group with no alternatives reached evaluation. The parser rejects
    /// these, so seeing one means the parser/evaluator contract was broken.
    #[error("group has no alternatives to draw from")]
    NoAlternatives,
    #[error("invalid alternative weights: {0}")]
    Weights(#[from] rand::distributions::WeightedError),
}

/// Evaluate an expression into one concrete string.
///
/// Text items pass through verbatim; each group contributes one weighted
/// draw. Items concatenate in order with nothing between them — separators
/// exist only within a group's own draws. The tree is read-only, so a
/// parsed expression can be evaluated any number of times; with a fixed
/// seed the output is fully reproducible.
pub fn evaluate(expr: &Expression, rng: &mut StdRng) -> Result<String, ConfigurationError> {
    let mut out = String::new();
    for item in &expr.items {
        match item {
            Item::Text(text) => out.push_str(text),
            Item::Group(group) => out.push_str(&draw_group(group, rng)?),
        }
    }
    Ok(out)
}

/// Draw from one alternation group: pick a count within the clamped bounds,
/// sample that many distinct alternatives, and join their evaluated bodies
/// with the group separator in draw order.
fn draw_group(group: &GroupSpec, rng: &mut StdRng) -> Result<String, ConfigurationError> {
    let n = group.alternatives.len();
    if n == 0 {
        return Err(ConfigurationError::NoAlternatives);
    }

    // Silent clamp into [1, n]; whatever bounds the template requested.
    let lower = (group.lower.max(1) as usize).min(n);
    let upper = (group.upper as usize).max(lower).min(n);
    let count = rng.gen_range(lower..=upper);

    let weights = normalized_weights(&group.alternatives);

    // Weighted sampling without replacement: each step draws from the
    // still-available alternatives with their weights renormalized over the
    // survivors, then removes the winner. With equal weights this reduces
    // to uniform sampling without replacement; with `count == n` it yields
    // a weighted removal-order permutation.
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut drawn = Vec::with_capacity(count);
    for _ in 0..count {
        let dist = WeightedIndex::new(remaining.iter().map(|&i| weights[i]))?;
        let slot = dist.sample(rng);
        let picked = remaining.remove(slot);
        drawn.push(evaluate(&group.alternatives[picked].body, rng)?);
    }

    Ok(drawn.join(&group.separator))
}

/// Normalize alternative weights so they sum to 1.0. Relative magnitude,
/// not absolute scale, determines probability.
pub fn normalized_weights(alternatives: &[Alternative]) -> Vec<f64> {
    let total: f64 = alternatives.iter().map(|alt| alt.weight).sum();
    alternatives.iter().map(|alt| alt.weight / total).collect()
}
