use canvas_expr as cx;
use cx::{ErrorKind, EvalError, MapContext, Template};
use serde_json::json;

fn kind(expr: &str, context: serde_json::Value) -> ErrorKind {
    let ctx = MapContext::from_json(&context).unwrap();
    cx::eval(expr, &ctx).unwrap_err().kind()
}

#[test]
fn test_missing_braces() {
    let err = cx::parse_expression("5 + 3").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.to_string().contains("enclosed in curly braces"));
}

// `??` is not an operator, so the leaf is neither a literal nor a valid path.
#[test]
fn test_unknown_operator_token() {
    assert_eq!(kind("{5 ?? 5}", json!({})), ErrorKind::Syntax);
}

#[test]
fn test_division_and_modulo_by_zero() {
    assert_eq!(kind("{10 / 0}", json!({})), ErrorKind::DivisionByZero);
    assert_eq!(kind("{10 % 0}", json!({})), ErrorKind::DivisionByZero);
    assert_eq!(kind("{10 / z}", json!({"z": 0.0})), ErrorKind::DivisionByZero);
}

#[test]
fn test_invalid_math_operands() {
    assert_eq!(kind("{a + 1}", json!({})), ErrorKind::InvalidOperand);
    assert_eq!(kind("{a + 1}", json!({"a": "x1"})), ErrorKind::InvalidOperand);
    assert_eq!(kind("{a + 1}", json!({"a": true})), ErrorKind::InvalidOperand);
    assert_eq!(kind("{a + 1}", json!({"a": {"b": 1}})), ErrorKind::InvalidOperand);
}

#[test]
fn test_not_comparable() {
    assert_eq!(kind("{a > 5}", json!({})), ErrorKind::NotComparable);
    assert_eq!(kind("{a > 5}", json!({"a": "10"})), ErrorKind::NotComparable);
    assert_eq!(kind("{a < b}", json!({"a": {"x": 1}, "b": {"x": 2}})), ErrorKind::NotComparable);
}

#[test]
fn test_unsupported_operator_token_in_ast() {
    let err = cx::Expression::compare(cx::ValueExpr::literal(5), "??", cx::ValueExpr::literal(5))
        .unwrap_err();
    assert_eq!(err, EvalError::UnsupportedOperator("??".into()));
}

#[test]
fn test_missing_placeholder() {
    let err = Template::new("Hello, ${name}!")
        .process(&MapContext::new())
        .unwrap_err();
    assert_eq!(err, EvalError::MissingPlaceholder("name".into()));
}

#[test]
fn test_missing_nested_placeholder_names_full_path() {
    let ctx = MapContext::from_json(&json!({"user": {}})).unwrap();
    let err = cx::render("${user.email}", &ctx).unwrap_err();
    assert_eq!(err, EvalError::MissingPlaceholder("user.email".into()));
}

#[test]
fn test_context_must_be_an_object() {
    let err = MapContext::from_json(&json!("scalar")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidContext);
}
