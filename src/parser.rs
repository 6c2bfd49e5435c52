// src/parser.rs
//! Expression parsing.
//!
//! Parsing is split-based rather than precedence-climbing: the comparison
//! tokens are tried in [`ComparisonOp::SPLIT_ORDER`] and the first one
//! found outside parentheses and quotes splits the text in two. Each side
//! is then split on math operators the same way, trying
//! [`MathOp::SPLIT_ORDER`] in order. Because the first operator *in list
//! order* wins, `2+3*4` groups as `(2+3)*4`.

use tracing::debug;

use crate::arithmetic::MathOp;
use crate::comparison::ComparisonOp;
use crate::errors::{EvalError, Result};
use crate::expression::{Expression, ValueExpr};
use crate::value::Value;

/// Parse `{...}` into a boolean expression.
pub fn parse_expression(input: &str) -> Result<Expression> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| {
            EvalError::Syntax(format!(
                "expression must be enclosed in curly braces: {trimmed}"
            ))
        })?
        .trim();

    for (token, op) in ComparisonOp::SPLIT_ORDER {
        if let Some(i) = find_operator(inner, token) {
            debug!(expr = inner, op = token, at = i, "comparison split");
            let left = parse_value_expression(&inner[..i])?;
            let right = parse_value_expression(&inner[i + token.len()..])?;
            return Ok(Expression::comparison(left, op, right));
        }
    }
    Ok(Expression::Truthy(parse_value_expression(inner)?))
}

/// Parse a value expression: math, literal or field path.
pub fn parse_value_expression(input: &str) -> Result<ValueExpr> {
    let text = input.trim();
    if text.is_empty() {
        return Err(EvalError::Syntax("missing operand".into()));
    }
    for op in MathOp::SPLIT_ORDER {
        if let Some(i) = find_operator(text, op.symbol()) {
            debug!(expr = text, op = op.symbol(), at = i, "math split");
            let left = parse_value_expression(&text[..i])?;
            let right = parse_value_expression(&text[i + op.symbol().len()..])?;
            return Ok(ValueExpr::math(left, op, right));
        }
    }
    parse_leaf(text)
}

fn parse_leaf(text: &str) -> Result<ValueExpr> {
    if let Some(inner) = text.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        return parse_value_expression(inner);
    }
    if let Some(s) = unquote(text) {
        return Ok(ValueExpr::literal(s));
    }
    if text.eq_ignore_ascii_case("true") {
        return Ok(ValueExpr::literal(true));
    }
    if text.eq_ignore_ascii_case("false") {
        return Ok(ValueExpr::literal(false));
    }
    let mut p = Parser::new(text);
    if let Ok(n) = p.parse_number_literal() {
        if p.eof() {
            return Ok(ValueExpr::Literal(n));
        }
    }
    parse_path(text).map(ValueExpr::field)
}

fn unquote(text: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|q| {
        if text.len() >= 2 && text.starts_with(q) && text.ends_with(q) {
            Some(&text[1..text.len() - 1])
        } else {
            None
        }
    })
}

/// Validate a dotted identifier path.
fn parse_path(text: &str) -> Result<String> {
    let mut p = Parser::new(text);
    loop {
        p.parse_identifier()
            .map_err(|_| EvalError::Syntax(format!("invalid operand `{text}`")))?;
        if p.eof() {
            return Ok(text.to_string());
        }
        p.expect('.')
            .map_err(|_| EvalError::Syntax(format!("invalid operand `{text}`")))?;
    }
}

/// Position of the first usable occurrence of `op` in `expr`.
///
/// Occurrences inside parentheses or quotes, at position 0, or touching
/// another operator character are skipped. Word operators (`is`) must not
/// touch identifier characters or path dots instead.
pub(crate) fn find_operator(expr: &str, op: &str) -> Option<usize> {
    let bytes = expr.as_bytes();
    let needle = op.as_bytes();
    let word = needle.iter().all(u8::is_ascii_alphabetic);
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;

    let mut i = 0;
    while i + needle.len() <= bytes.len() {
        let c = bytes[i];
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
        } else {
            match c {
                b'"' | b'\'' => quote = Some(c),
                b'(' => depth += 1,
                b')' => depth -= 1,
                _ if depth == 0
                    && i > 0
                    && bytes[i..].starts_with(needle)
                    && at_boundary(bytes, i, needle.len(), word) =>
                {
                    return Some(i);
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}

fn at_boundary(bytes: &[u8], at: usize, len: usize, word: bool) -> bool {
    let blocks: fn(&u8) -> bool = if word { is_word_byte } else { is_operator_byte };
    let before = at.checked_sub(1).and_then(|j| bytes.get(j));
    let after = bytes.get(at + len);
    !before.is_some_and(blocks) && !after.is_some_and(blocks)
}

fn is_operator_byte(b: &u8) -> bool {
    matches!(
        b,
        b'=' | b'!' | b'<' | b'>' | b'+' | b'-' | b'*' | b'/' | b'%' | b'^'
    )
}

fn is_word_byte(b: &u8) -> bool {
    b.is_ascii_alphanumeric() || *b == b'_' || *b == b'.'
}

/// Byte cursor over a string slice.
pub(crate) struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn parse_identifier(&mut self) -> Result<&'a str> {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_ascii_alphanumeric() {
                self.i += 1;
            } else {
                break;
            }
        }
        if self.i == start {
            return Err(EvalError::Syntax("identifier expected".into()));
        }
        Ok(&self.s[start..self.i])
    }

    /// `-?digits(.digits)?`, integral unless a decimal point is present.
    pub fn parse_number_literal(&mut self) -> Result<Value> {
        let start = self.i;
        if self.peek_char() == Some('-') {
            self.i += 1;
        }
        self.skip_digits();
        if self.peek_char() == Some('.') {
            self.i += 1;
            self.skip_digits();
        }
        let s = &self.s[start..self.i];
        if s.contains('.') {
            let f: f64 = s
                .parse()
                .map_err(|_| EvalError::Syntax(format!("bad float `{s}`")))?;
            Ok(Value::Float(f))
        } else {
            let i: i64 = s
                .parse()
                .map_err(|_| EvalError::Syntax(format!("bad integer `{s}`")))?;
            Ok(Value::Int(i))
        }
    }

    fn skip_digits(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
    }

    /// Everything up to `end` (exclusive); the cursor stops on `end`.
    pub fn capture_until(&mut self, end: char) -> Result<&'a str> {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == end {
                break;
            }
            self.i += c.len_utf8();
        }
        if self.peek_char() != Some(end) {
            return Err(EvalError::Syntax(format!("expected '{end}'")));
        }
        Ok(&self.s[start..self.i])
    }

    /// Everything up to the next `lit` (exclusive), or the rest of the input.
    pub fn take_until(&mut self, lit: &str) -> &'a str {
        let start = self.i;
        let end = self.s[start..]
            .find(lit)
            .map_or(self.s.len(), |offset| start + offset);
        self.i = end;
        &self.s[start..end]
    }

    pub fn expect(&mut self, c: char) -> Result<()> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(EvalError::Syntax(format!("expected '{}'", c)))
        }
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn consume_str(&mut self, lit: &str) -> bool {
        if self.peek_str(lit) {
            self.i += lit.len();
            true
        } else {
            false
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn peek_str(&self, lit: &str) -> bool {
        self.s[self.i..].starts_with(lit)
    }

    pub fn position(&self) -> usize {
        self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}
