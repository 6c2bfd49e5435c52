use std::fmt;
use std::str::FromStr;

use crate::errors::{EvalError, Result};
use crate::value::Value;

/// Binary math operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathOp {
    Pow,
    Mul,
    Div,
    Rem,
    Add,
    Sub,
}

impl MathOp {
    /// Order in which the parser looks for a split point.
    pub const SPLIT_ORDER: [MathOp; 6] = [
        MathOp::Pow,
        MathOp::Mul,
        MathOp::Div,
        MathOp::Rem,
        MathOp::Add,
        MathOp::Sub,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            MathOp::Pow => "^",
            MathOp::Mul => "*",
            MathOp::Div => "/",
            MathOp::Rem => "%",
            MathOp::Add => "+",
            MathOp::Sub => "-",
        }
    }

    /// Coerce both operands to numbers and apply the operator.
    ///
    /// `+ - * %` stay integral unless either side is a float. `/` and `^`
    /// always produce a float. Integer results wrap on overflow.
    pub fn apply(self, left: &Value, right: &Value) -> Result<Value> {
        let a = Number::coerce(left)?;
        let b = Number::coerce(right)?;
        let out = match self {
            MathOp::Add => Number::combine(a, b, i64::wrapping_add, |x, y| x + y),
            MathOp::Sub => Number::combine(a, b, i64::wrapping_sub, |x, y| x - y),
            MathOp::Mul => Number::combine(a, b, i64::wrapping_mul, |x, y| x * y),
            MathOp::Div => {
                if b.is_zero() {
                    return Err(EvalError::DivisionByZero(self));
                }
                Value::Float(a.as_f64() / b.as_f64())
            }
            MathOp::Rem => {
                if b.is_zero() {
                    return Err(EvalError::DivisionByZero(self));
                }
                Number::combine(a, b, i64::wrapping_rem, |x, y| x % y)
            }
            MathOp::Pow => Value::Float(a.as_f64().powf(b.as_f64())),
        };
        Ok(out)
    }
}

impl fmt::Display for MathOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for MathOp {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        MathOp::SPLIT_ORDER
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| EvalError::UnsupportedOperator(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn coerce(value: &Value) -> Result<Number> {
        match value {
            Value::Int(i) => Ok(Number::Int(*i)),
            Value::Float(f) => Ok(Number::Float(*f)),
            Value::Str(s) => Number::parse(s).ok_or_else(|| {
                EvalError::InvalidOperand(format!("cannot convert string `{s}` to a number"))
            }),
            Value::Null => Err(EvalError::InvalidOperand(
                "cannot perform math on null".into(),
            )),
            other => Err(EvalError::InvalidOperand(format!(
                "cannot convert {} `{other}` to a number",
                other.type_name()
            ))),
        }
    }

    fn parse(s: &str) -> Option<Number> {
        if s.contains('.') {
            s.parse().ok().map(Number::Float)
        } else {
            s.parse().ok().map(Number::Int)
        }
    }

    fn combine(
        a: Number,
        b: Number,
        int: fn(i64, i64) -> i64,
        float: fn(f64, f64) -> f64,
    ) -> Value {
        match (a, b) {
            (Number::Int(x), Number::Int(y)) => Value::Int(int(x, y)),
            _ => Value::Float(float(a.as_f64(), b.as_f64())),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(op: MathOp, a: impl Into<Value>, b: impl Into<Value>) -> Result<Value> {
        op.apply(&a.into(), &b.into())
    }

    #[test]
    fn integer_ops_stay_integral() {
        assert_eq!(apply(MathOp::Add, 5, 3).unwrap(), Value::Int(8));
        assert_eq!(apply(MathOp::Sub, 10, 4).unwrap(), Value::Int(6));
        assert_eq!(apply(MathOp::Mul, 4, 3).unwrap(), Value::Int(12));
        assert_eq!(apply(MathOp::Rem, 10, 3).unwrap(), Value::Int(1));
    }

    #[test]
    fn float_contaminates() {
        assert_eq!(apply(MathOp::Add, 1, 0.5).unwrap(), Value::Float(1.5));
        assert_eq!(apply(MathOp::Rem, 7.5, 2).unwrap(), Value::Float(1.5));
    }

    #[test]
    fn division_and_power_are_float() {
        assert_eq!(apply(MathOp::Div, 20, 4).unwrap(), Value::Float(5.0));
        assert_eq!(apply(MathOp::Div, 7, 2).unwrap(), Value::Float(3.5));
        assert_eq!(apply(MathOp::Pow, 2, 3).unwrap(), Value::Float(8.0));
    }

    #[test]
    fn zero_divisor_fails() {
        assert_eq!(
            apply(MathOp::Div, 10, 0).unwrap_err(),
            EvalError::DivisionByZero(MathOp::Div)
        );
        assert_eq!(
            apply(MathOp::Rem, 10, 0.0).unwrap_err(),
            EvalError::DivisionByZero(MathOp::Rem)
        );
    }

    #[test]
    fn numeric_strings_are_coerced() {
        assert_eq!(apply(MathOp::Add, "2", 3).unwrap(), Value::Int(5));
        assert_eq!(apply(MathOp::Mul, "1.5", 2).unwrap(), Value::Float(3.0));
    }

    #[test]
    fn bad_operands_fail() {
        assert!(matches!(
            apply(MathOp::Add, "abc", 1),
            Err(EvalError::InvalidOperand(_))
        ));
        assert!(matches!(
            apply(MathOp::Add, Value::Null, 1),
            Err(EvalError::InvalidOperand(_))
        ));
        assert!(matches!(
            apply(MathOp::Add, true, 1),
            Err(EvalError::InvalidOperand(_))
        ));
    }

    #[test]
    fn overflow_wraps() {
        assert_eq!(apply(MathOp::Add, i64::MAX, 1).unwrap(), Value::Int(i64::MIN));
    }

    #[test]
    fn symbols_round_trip() {
        for op in MathOp::SPLIT_ORDER {
            assert_eq!(op.symbol().parse::<MathOp>().unwrap(), op);
        }
        assert!(matches!(
            "**".parse::<MathOp>(),
            Err(EvalError::UnsupportedOperator(_))
        ));
    }
}
