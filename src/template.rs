//! `${path}` string templates.
//!
//! Placeholders end at the first `}`; nested braces are not supported. An
//! opening `${` without a closing brace is kept as literal text.

use serde_json::Value as Json;
use tracing::debug;

use crate::context::Context;
use crate::errors::{EvalError, Result};
use crate::object::resolve_path;
use crate::parser::Parser;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// Trimmed placeholder path.
    Placeholder(String),
}

/// A template scanned once into text and placeholder segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let segments = scan(&source);
        debug!(
            placeholders = segments
                .iter()
                .filter(|s| matches!(s, Segment::Placeholder(_)))
                .count(),
            "scanned template"
        );
        Self { source, segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Paths referenced by the template, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(path) => Some(path.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Render to a string, replacing every placeholder with the textual form
    /// of its resolved value.
    pub fn process(&self, context: &dyn Context) -> Result<String> {
        self.process_with(&TextProcessor, context)
    }

    pub fn process_with<P: TemplateProcessor + ?Sized>(
        &self,
        processor: &P,
        context: &dyn Context,
    ) -> Result<P::Output> {
        processor.process(self, context)
    }

    /// Resolve every placeholder. A null value fails with
    /// `MissingPlaceholder` naming the path.
    pub fn resolve(&self, context: &dyn Context) -> Result<Vec<Resolved<'_>>> {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => Ok(Resolved::Text(text)),
                Segment::Placeholder(path) => {
                    let value = resolve_path(path, context);
                    if value.is_null() {
                        Err(EvalError::MissingPlaceholder(path.clone()))
                    } else {
                        Ok(Resolved::Value(value))
                    }
                }
            })
            .collect()
    }
}

/// A segment after resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    Text(&'a str),
    Value(Value),
}

/// Output strategy for a template, chosen per call.
pub trait TemplateProcessor {
    type Output;

    fn process(&self, template: &Template, context: &dyn Context) -> Result<Self::Output>;
}

/// Plain text output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextProcessor;

impl TemplateProcessor for TextProcessor {
    type Output = String;

    fn process(&self, template: &Template, context: &dyn Context) -> Result<String> {
        let mut out = String::with_capacity(template.source.len());
        for part in template.resolve(context)? {
            match part {
                Resolved::Text(text) => out.push_str(text),
                Resolved::Value(value) => out.push_str(&value.to_string()),
            }
        }
        Ok(out)
    }
}

/// JSON output. A template that is exactly one placeholder keeps the
/// resolved value's type; anything else renders as a JSON string.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonProcessor;

impl TemplateProcessor for JsonProcessor {
    type Output = Json;

    fn process(&self, template: &Template, context: &dyn Context) -> Result<Json> {
        if let [Segment::Placeholder(_)] = template.segments() {
            if let [Resolved::Value(value)] = template.resolve(context)?.as_slice() {
                return Ok(value.to_json());
            }
        }
        TextProcessor.process(template, context).map(Json::String)
    }
}

fn scan(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut p = Parser::new(source);

    while !p.eof() {
        text.push_str(p.take_until("${"));
        if p.eof() {
            break;
        }
        let start = p.position();
        p.consume_str("${");
        match p.capture_until('}') {
            Ok(path) => {
                p.consume_char('}');
                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                segments.push(Segment::Placeholder(path.trim().to_string()));
            }
            Err(_) => {
                text.push_str(&source[start..]);
                break;
            }
        }
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    segments
}

/// Render `source` against `context` as text.
pub fn process(source: &str, context: &dyn Context) -> Result<String> {
    Template::new(source).process(context)
}
