use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::errors::{EvalError, Result};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// `==` or `is`
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

impl ComparisonOp {
    /// Tokens in the order the parser looks for a split point.
    pub const SPLIT_ORDER: [(&'static str, ComparisonOp); 7] = [
        ("==", ComparisonOp::Eq),
        ("is", ComparisonOp::Eq),
        ("!=", ComparisonOp::Ne),
        (">=", ComparisonOp::Ge),
        ("<=", ComparisonOp::Le),
        (">", ComparisonOp::Gt),
        ("<", ComparisonOp::Lt),
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Lt => "<",
        }
    }

    pub fn test(self, left: &Value, right: &Value) -> Result<bool> {
        Ok(match self {
            ComparisonOp::Eq => left == right,
            ComparisonOp::Ne => left != right,
            ComparisonOp::Gt => compare_values(left, right)?.is_gt(),
            ComparisonOp::Lt => compare_values(left, right)?.is_lt(),
            ComparisonOp::Ge => compare_values(left, right)?.is_ge(),
            ComparisonOp::Le => compare_values(left, right)?.is_le(),
        })
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ComparisonOp {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        ComparisonOp::SPLIT_ORDER
            .into_iter()
            .find(|(token, _)| *token == s)
            .map(|(_, op)| op)
            .ok_or_else(|| EvalError::UnsupportedOperator(s.to_string()))
    }
}

/// Ordering between two values, if they are mutually ordered.
///
/// Numbers compare by floating-point value, strings lexicographically,
/// booleans with `false < true`. Host objects use their natural ordering
/// from either side. Null never orders.
pub fn compare_values(a: &Value, b: &Value) -> Result<Ordering> {
    let ord = match (a, b) {
        (Value::Null, _) | (_, Value::Null) => {
            return Err(EvalError::NotComparable("cannot compare null values".into()));
        }
        (Value::Str(sa), Value::Str(sb)) => Some(sa.cmp(sb)),
        (Value::Bool(ba), Value::Bool(bb)) => Some(ba.cmp(bb)),
        (Value::Object(oa), Value::Object(ob)) => oa
            .compare(ob.as_ref())
            .or_else(|| ob.compare(oa.as_ref()).map(Ordering::reverse)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(da), Some(db)) => Some(da.total_cmp(&db)),
            _ => None,
        },
    };
    ord.ok_or_else(|| {
        EvalError::NotComparable(format!(
            "cannot compare values of types {} and {}",
            a.type_name(),
            b.type_name()
        ))
    })
}
