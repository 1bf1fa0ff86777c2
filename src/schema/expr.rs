//! The parsed template tree.

use serde::{Deserialize, Serialize};

/// Separator placed between a group's draws when the template names none.
pub const DEFAULT_SEPARATOR: &str = ", ";

/// An ordered sequence of items. Order is meaningful: it is output order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Expression {
    pub items: Vec<Item>,
}

/// One element of an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    /// Literal text, emitted as-is.
    Text(String),
    /// An alternation group, emitted as one weighted draw.
    Group(GroupSpec),
}

/// A `{...|...}` alternation group.
///
/// `lower` and `upper` are the requested draw-count bounds as written in the
/// template; the evaluator clamps them into `[1, alternatives.len()]` rather
/// than treating an out-of-range request as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub lower: u32,
    pub upper: u32,
    pub separator: String,
    pub alternatives: Vec<Alternative>,
}

/// One weighted option within a group. The body is a full expression, so
/// groups nest arbitrarily deep; an empty body is an intentionally blank
/// choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub weight: f64,
    pub body: Expression,
}

impl Expression {
    /// True when the expression holds no items (a blank alternative body).
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
