//! Condition expressions (`{a > 5}`) and `${path}` string templates
//! evaluated against a key/value [`Context`].
//!
//! ```
//! use canvas_expr::{parse_expression, Context, MapContext, Template};
//!
//! let ctx = MapContext::new().with("a", 10.into()).with("name", "World".into());
//! assert!(parse_expression("{a > 5}").unwrap().evaluate(&ctx).unwrap());
//! assert_eq!(Template::new("Hello, ${name}!").process(&ctx).unwrap(), "Hello, World!");
//! ```

pub mod errors;
pub mod context;
pub mod object;
pub mod template;
mod arithmetic;
mod comparison;
mod expression;
mod parser;
mod value;

pub use arithmetic::MathOp;
pub use comparison::{compare_values, ComparisonOp};
pub use context::{merge, Context, MapContext, MutableContext};
pub use errors::{ErrorKind, EvalError, Result};
pub use expression::{Expression, ValueExpr};
pub use object::{resolve_path, resolve_property, Accessor, Accessors, Object, Record};
pub use parser::{parse_expression, parse_value_expression};
pub use template::{JsonProcessor, Template, TemplateProcessor, TextProcessor};
pub use value::Value;

/// Convenience: parse `expr` and evaluate it against `context`.
pub fn eval(expr: &str, context: &dyn Context) -> Result<bool> {
    parse_expression(expr)?.evaluate(context)
}

/// Convenience: render a template string as text.
pub fn render(template: &str, context: &dyn Context) -> Result<String> {
    template::process(template, context)
}
