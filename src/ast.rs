use std::fmt;
use std::mem;
use std::str::FromStr;

use lalrpop_util::ParseError;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Deepest tree the parser, node conversion and evaluator will accept.
pub const MAX_DEPTH: usize = 256;

/// A closed integer expression tree.
///
/// Serialized through [`ExprNode`], so a YAML document may use either the
/// integer shorthand (`3`) or the tagged form (`{kind: sum, left: 1, right: 2}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ExprNode", into = "ExprNode")]
pub enum Expr {
    Num(i64),
    Sum(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn num(value: i64) -> Expr {
        Expr::Num(value)
    }

    pub fn sum(left: Expr, right: Expr) -> Expr {
        Expr::Sum(Box::new(left), Box::new(right))
    }

    pub fn parse(source: &str) -> Result<Expr> {
        crate::template::ExprParser::new()
            .parse(source)
            .map(|(expr, _depth)| expr)
            .map_err(|e| match e {
                ParseError::User { error } => error,
                other => Error::Parse(other.to_string()),
            })
    }

    pub fn eval(&self) -> Result<i64> {
        crate::eval_expr(self)
    }
}

// Children are unlinked onto a heap stack so dropping a deep tree cannot
// exhaust the call stack.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        if let Expr::Sum(left, right) = self {
            stack.push(mem::replace(left.as_mut(), Expr::Num(0)));
            stack.push(mem::replace(right.as_mut(), Expr::Num(0)));
        }
        while let Some(mut expr) = stack.pop() {
            if let Expr::Sum(left, right) = &mut expr {
                stack.push(mem::replace(left.as_mut(), Expr::Num(0)));
                stack.push(mem::replace(right.as_mut(), Expr::Num(0)));
            }
        }
    }
}

impl FromStr for Expr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Expr> {
        Expr::parse(s)
    }
}

// `+` is left associative, so only a right-hand sum needs parentheses.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(value) => write!(f, "{}", value),
            Expr::Sum(left, right) => match right.as_ref() {
                Expr::Sum(..) => write!(f, "{} + ({})", left, right),
                Expr::Num(_) => write!(f, "{} + {}", left, right),
            },
        }
    }
}

/// The open, on-disk shape of an expression. Its `kind` tag is an arbitrary
/// string, so converting to [`Expr`] is where unknown kinds are rejected.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum ExprNode {
    Int(i64),
    Tagged {
        kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Box<ExprNode>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Box<ExprNode>>,
    },
}

pub const NUM_KIND: &str = "num";
pub const SUM_KIND: &str = "sum";

fn required<'a>(
    field: &'a Option<Box<ExprNode>>,
    kind: &'static str,
    name: &'static str,
) -> Result<&'a ExprNode> {
    field
        .as_deref()
        .ok_or(Error::MissingField { kind, field: name })
}

fn forbidden<T>(field: &Option<T>, kind: &'static str, name: &'static str) -> Result<()> {
    match field {
        Some(_) => Err(Error::UnexpectedField { kind, field: name }),
        None => Ok(()),
    }
}

fn node_to_expr(node: &ExprNode, depth: usize) -> Result<Expr> {
    if depth > MAX_DEPTH {
        return Err(Error::TooDeep { limit: MAX_DEPTH });
    }
    match node {
        ExprNode::Int(value) => Ok(Expr::Num(*value)),
        ExprNode::Tagged {
            kind,
            value,
            left,
            right,
        } => match kind.as_str() {
            NUM_KIND => {
                forbidden(left, NUM_KIND, "left")?;
                forbidden(right, NUM_KIND, "right")?;
                (*value).map(Expr::Num).ok_or(Error::MissingField {
                    kind: NUM_KIND,
                    field: "value",
                })
            }
            SUM_KIND => {
                forbidden(value, SUM_KIND, "value")?;
                let left = node_to_expr(required(left, SUM_KIND, "left")?, depth + 1)?;
                let right = node_to_expr(required(right, SUM_KIND, "right")?, depth + 1)?;
                Ok(Expr::sum(left, right))
            }
            other => {
                tracing::warn!(kind = other, "unrecognized expression kind");
                Err(Error::UnrecognizedExpressionKind(other.to_string()))
            }
        },
    }
}

impl TryFrom<&ExprNode> for Expr {
    type Error = Error;

    fn try_from(node: &ExprNode) -> Result<Expr> {
        node_to_expr(node, 1)
    }
}

impl TryFrom<ExprNode> for Expr {
    type Error = Error;

    fn try_from(node: ExprNode) -> Result<Expr> {
        Expr::try_from(&node)
    }
}

impl From<&Expr> for ExprNode {
    fn from(expr: &Expr) -> ExprNode {
        match expr {
            Expr::Num(value) => ExprNode::Tagged {
                kind: NUM_KIND.to_string(),
                value: Some(*value),
                left: None,
                right: None,
            },
            Expr::Sum(left, right) => ExprNode::Tagged {
                kind: SUM_KIND.to_string(),
                value: None,
                left: Some(Box::new(ExprNode::from(left.as_ref()))),
                right: Some(Box::new(ExprNode::from(right.as_ref()))),
            },
        }
    }
}

impl From<Expr> for ExprNode {
    fn from(expr: Expr) -> ExprNode {
        ExprNode::from(&expr)
    }
}
