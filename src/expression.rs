// src/expression.rs
use std::fmt;
use std::str::FromStr;

use crate::arithmetic::MathOp;
use crate::comparison::ComparisonOp;
use crate::context::Context;
use crate::errors::{EvalError, Result};
use crate::object::resolve_path;
use crate::value::Value;

/// Node producing a value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpr {
    Literal(Value),
    /// Dotted path, first segment looked up in the context.
    Field(String),
    Math {
        left: Box<ValueExpr>,
        op: MathOp,
        right: Box<ValueExpr>,
    },
}

impl ValueExpr {
    pub fn literal(value: impl Into<Value>) -> Self {
        ValueExpr::Literal(value.into())
    }

    pub fn field(path: impl Into<String>) -> Self {
        ValueExpr::Field(path.into())
    }

    pub fn math(left: ValueExpr, op: MathOp, right: ValueExpr) -> Self {
        ValueExpr::Math {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Missing paths evaluate to null; only math can fail here.
    pub fn evaluate(&self, ctx: &dyn Context) -> Result<Value> {
        match self {
            ValueExpr::Literal(v) => Ok(v.clone()),
            ValueExpr::Field(path) => Ok(resolve_path(path, ctx)),
            ValueExpr::Math { left, op, right } => {
                let l = left.evaluate(ctx)?;
                let r = right.evaluate(ctx)?;
                op.apply(&l, &r)
            }
        }
    }
}

/// Top-level boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Comparison {
        left: ValueExpr,
        op: ComparisonOp,
        right: ValueExpr,
    },
    /// Expression without a comparison operator, judged by truthiness.
    Truthy(ValueExpr),
}

impl Expression {
    pub fn comparison(left: ValueExpr, op: ComparisonOp, right: ValueExpr) -> Self {
        Expression::Comparison { left, op, right }
    }

    /// Build a comparison from an operator token. Tokens outside the
    /// comparison vocabulary fail with `UnsupportedOperator`.
    pub fn compare(left: ValueExpr, token: &str, right: ValueExpr) -> Result<Self> {
        Ok(Expression::comparison(left, token.parse()?, right))
    }

    pub fn evaluate(&self, ctx: &dyn Context) -> Result<bool> {
        match self {
            Expression::Comparison { left, op, right } => {
                let l = left.evaluate(ctx)?;
                let r = right.evaluate(ctx)?;
                op.test(&l, &r)
            }
            Expression::Truthy(inner) => Ok(inner.evaluate(ctx)?.is_truthy()),
        }
    }
}

impl FromStr for Expression {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        crate::parser::parse_expression(s)
    }
}

/// Fully parenthesized form; re-parses to the same tree. String literals
/// holding both quote characters have no such form.
impl fmt::Display for ValueExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueExpr::Literal(Value::Str(s)) if s.contains('\'') => write!(f, "\"{s}\""),
            ValueExpr::Literal(Value::Str(s)) => write!(f, "'{s}'"),
            ValueExpr::Literal(v) => write!(f, "{v}"),
            ValueExpr::Field(path) => f.write_str(path),
            ValueExpr::Math { left, op, right } => write!(f, "({left} {op} {right})"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Comparison { left, op, right } => write!(f, "{{{left} {op} {right}}}"),
            Expression::Truthy(inner) => write!(f, "{{{inner}}}"),
        }
    }
}
