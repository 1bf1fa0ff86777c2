//! Recursive-descent parser for the prompt templating grammar.
//!
//! ```text
//! expr        := item*
//! item        := group | text
//! group       := '{' [ group_prefix ] alt ('|' alt)* '}'
//! group_prefix:= draw_range '$$' [ separator '$$' ]
//! draw_range  := integer [ '-' integer ]
//! alt         := [ weight '::' ] expr
//! ```
//!
//! `{`, `}`, `|`, `::`, and `$$` are structural delimiters; a text run is
//! the longest sequence of any other characters and stops at the first
//! delimiter. Delimiters are consumed by the grammar and never appear as
//! literal values in the tree. Wildcard tokens that survive resolution
//! (`__name__` with an unknown name) contain only text characters and parse
//! as ordinary literals.

use thiserror::Error;

use crate::schema::expr::{Alternative, Expression, GroupSpec, Item, DEFAULT_SEPARATOR};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("unclosed group opened at offset {0}")]
    UnclosedGroup(usize),
    #[error("unmatched '}}' at offset {0}")]
    UnmatchedClose(usize),
    #[error("group at offset {0} has no alternatives")]
    EmptyGroup(usize),
    #[error("draw range lower bound {lower} exceeds upper bound {upper}")]
    InvertedRange { lower: u32, upper: u32 },
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("alternative weight must be positive, got {0}")]
    NonPositiveWeight(f64),
    #[error("misplaced '{delimiter}' at offset {offset}")]
    MisplacedDelimiter {
        delimiter: &'static str,
        offset: usize,
    },
}

/// Parse a template into an expression tree.
///
/// Parsing is deterministic and read-only; the returned tree may be
/// evaluated any number of times.
pub fn parse(template: &str) -> Result<Expression, SyntaxError> {
    let mut parser = Parser::new(template);
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some('}') => Err(SyntaxError::UnmatchedClose(parser.pos)),
        // expr() stops only at '}' or '|'; a top-level '|' belongs to no group.
        Some(_) => Err(SyntaxError::MisplacedDelimiter {
            delimiter: "|",
            offset: parser.pos,
        }),
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Parser {
        Parser {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_pair(&self, a: char, b: char) -> bool {
        self.chars.get(self.pos) == Some(&a) && self.chars.get(self.pos + 1) == Some(&b)
    }

    fn at_delimiter(&self) -> bool {
        matches!(self.peek(), Some('{' | '}' | '|'))
            || self.peek_pair(':', ':')
            || self.peek_pair('$', '$')
    }

    /// expr := item*  — stops at '}', '|', or end of input.
    fn expr(&mut self) -> Result<Expression, SyntaxError> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None | Some('}' | '|') => break,
                Some('{') => items.push(Item::Group(self.group()?)),
                Some(_) if self.peek_pair(':', ':') => {
                    return Err(SyntaxError::MisplacedDelimiter {
                        delimiter: "::",
                        offset: self.pos,
                    });
                }
                Some(_) if self.peek_pair('$', '$') => {
                    return Err(SyntaxError::MisplacedDelimiter {
                        delimiter: "$$",
                        offset: self.pos,
                    });
                }
                Some(_) => items.push(Item::Text(self.text())),
            }
        }
        Ok(Expression { items })
    }

    /// Greedy text run: everything up to the next structural delimiter.
    fn text(&mut self) -> String {
        let mut run = String::new();
        while let Some(c) = self.peek() {
            if self.at_delimiter() {
                break;
            }
            run.push(c);
            self.pos += 1;
        }
        run
    }

    fn group(&mut self) -> Result<GroupSpec, SyntaxError> {
        let open = self.pos;
        self.pos += 1; // '{'

        // `{}` is the zero-alternatives case; an explicitly delimited blank
        // choice like `{a|}` stays legal.
        if self.peek() == Some('}') {
            return Err(SyntaxError::EmptyGroup(open));
        }

        let (lower, upper, separator) = self.group_prefix()?;

        let mut alternatives = vec![self.alternative()?];
        while self.peek() == Some('|') {
            self.pos += 1;
            alternatives.push(self.alternative()?);
        }

        if self.peek() != Some('}') {
            return Err(SyntaxError::UnclosedGroup(open));
        }
        self.pos += 1;

        Ok(GroupSpec {
            lower,
            upper,
            separator,
            alternatives,
        })
    }

    /// group_prefix := draw_range '$$' [ separator '$$' ]
    ///
    /// The prefix is recognized by lookahead: without the first `$$` the
    /// cursor rewinds and the digits parse as ordinary alternative content.
    fn group_prefix(&mut self) -> Result<(u32, u32, String), SyntaxError> {
        let defaults = (1, 1, DEFAULT_SEPARATOR.to_string());
        let save = self.pos;

        let lower_digits = self.digit_run();
        if lower_digits.is_empty() {
            return Ok(defaults);
        }
        let mut upper_digits = lower_digits.clone();
        if self.peek() == Some('-') {
            self.pos += 1;
            upper_digits = self.digit_run();
            if upper_digits.is_empty() {
                self.pos = save;
                return Ok(defaults);
            }
        }
        if !self.peek_pair('$', '$') {
            self.pos = save;
            return Ok(defaults);
        }
        self.pos += 2;

        // The '$$' commits this as a prefix; bad bounds are now errors, not
        // backtracks. Clamping against the alternative count happens later,
        // at evaluation — an inverted range is wrong as written.
        let lower = parse_u32(&lower_digits)?;
        let upper = parse_u32(&upper_digits)?;
        if lower > upper {
            return Err(SyntaxError::InvertedRange { lower, upper });
        }

        let separator = self
            .separator()
            .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string());
        Ok((lower, upper, separator))
    }

    /// separator '$$', rewinding when the closing `$$` never comes.
    fn separator(&mut self) -> Option<String> {
        let save = self.pos;
        let mut run = String::new();
        while let Some(c) = self.peek() {
            if matches!(c, '$' | '{' | '}' | '|') {
                break;
            }
            run.push(c);
            self.pos += 1;
        }
        if !run.is_empty() && self.peek_pair('$', '$') {
            self.pos += 2;
            Some(run)
        } else {
            self.pos = save;
            None
        }
    }

    fn digit_run(&mut self) -> String {
        let mut run = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            run.push(c);
            self.pos += 1;
        }
        run
    }

    /// alt := [ weight '::' ] expr
    fn alternative(&mut self) -> Result<Alternative, SyntaxError> {
        let weight = self.weight()?.unwrap_or(1.0);
        let body = self.expr()?;
        Ok(Alternative { weight, body })
    }

    /// weight '::', rewinding when the `::` marker never comes.
    fn weight(&mut self) -> Result<Option<f64>, SyntaxError> {
        let save = self.pos;
        let mut run = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() && c != '.' {
                break;
            }
            run.push(c);
            self.pos += 1;
        }
        if run.is_empty() || !self.peek_pair(':', ':') {
            self.pos = save;
            return Ok(None);
        }
        self.pos += 2;

        let weight: f64 = run
            .parse()
            .map_err(|_| SyntaxError::InvalidNumber(run.clone()))?;
        if weight <= 0.0 {
            return Err(SyntaxError::NonPositiveWeight(weight));
        }
        Ok(Some(weight))
    }
}

fn parse_u32(digits: &str) -> Result<u32, SyntaxError> {
    digits
        .parse()
        .map_err(|_| SyntaxError::InvalidNumber(digits.to_string()))
}
