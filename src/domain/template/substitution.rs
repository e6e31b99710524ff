//! Variable substitution engine for templates
//!
//! Templates use Go-style field actions: `{{.Name}}` reads a top-level field,
//! `{{.Order.Id}}` walks nested objects and `{{.}}` writes the whole value.
//! Sources are compiled once into segments and can then be executed any
//! number of times against `serde_json::Value` data.

use serde_json::Value;
use thiserror::Error;

use crate::domain::html::push_escaped;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Substitution-specific error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstitutionError {
    #[error("Unclosed action starting at byte {offset}")]
    Unclosed { offset: usize },

    #[error("Unsupported action '{action}' at byte {offset}")]
    UnsupportedAction { offset: usize, action: String },

    #[error("Missing field {path}")]
    MissingField { path: String },

    #[error("Cannot read a field of non-object value at {path}")]
    NotAnObject { path: String },
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    /// Field path; empty for `{{.}}`
    Field(Vec<String>),
}

/// A compiled substitution template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

#[derive(Clone, Copy)]
enum Escape<'a> {
    None,
    Html { trusted: &'a [&'a str] },
}

impl Template {
    /// Compile a template source
    pub fn compile(source: &str) -> Result<Self, SubstitutionError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }

            let inner = &rest[start + OPEN.len()..];
            let end = inner.find(CLOSE).ok_or(SubstitutionError::Unclosed {
                offset: offset + start,
            })?;
            segments.push(Segment::Field(parse_action(&inner[..end], offset + start)?));

            let consumed = start + OPEN.len() + end + CLOSE.len();
            offset += consumed;
            rest = &rest[consumed..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Execute against `data`, writing substituted values verbatim
    pub fn execute(&self, data: &Value, out: &mut String) -> Result<(), SubstitutionError> {
        self.write(data, Escape::None, out)
    }

    /// Execute against `data`, HTML-escaping every substituted value except
    /// top-level fields named in `trusted`
    pub fn execute_html(
        &self,
        data: &Value,
        trusted: &[&str],
        out: &mut String,
    ) -> Result<(), SubstitutionError> {
        self.write(data, Escape::Html { trusted }, out)
    }

    /// Execute into a new string
    pub fn render(&self, data: &Value) -> Result<String, SubstitutionError> {
        let mut out = String::new();
        self.execute(data, &mut out)?;
        Ok(out)
    }

    fn write(&self, data: &Value, escape: Escape<'_>, out: &mut String) -> Result<(), SubstitutionError> {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(path) => {
                    let value = lookup(data, path)?;
                    match escape {
                        Escape::Html { trusted } if !is_trusted(path, trusted) => {
                            let mut raw = String::new();
                            write_value(value, &mut raw);
                            push_escaped(out, &raw);
                        }
                        _ => write_value(value, out),
                    }
                }
            }
        }
        Ok(())
    }
}

fn parse_action(action: &str, offset: usize) -> Result<Vec<String>, SubstitutionError> {
    let action = action.trim();
    let unsupported = || SubstitutionError::UnsupportedAction {
        offset,
        action: action.to_string(),
    };

    if action == "." {
        return Ok(Vec::new());
    }

    let path = action.strip_prefix('.').ok_or_else(unsupported)?;
    let fields: Vec<String> = path.split('.').map(str::to_string).collect();

    let valid = fields.iter().all(|field| {
        !field.is_empty() && field.chars().all(|c| c.is_alphanumeric() || c == '_')
    });
    if !valid {
        return Err(unsupported());
    }

    Ok(fields)
}

fn is_trusted(path: &[String], trusted: &[&str]) -> bool {
    path.len() == 1 && trusted.contains(&path[0].as_str())
}

fn lookup<'v>(data: &'v Value, path: &[String]) -> Result<&'v Value, SubstitutionError> {
    let mut current = data;
    for (idx, field) in path.iter().enumerate() {
        let Value::Object(map) = current else {
            return Err(SubstitutionError::NotAnObject {
                path: dotted(&path[..idx]),
            });
        };
        current = map.get(field).ok_or_else(|| SubstitutionError::MissingField {
            path: dotted(&path[..=idx]),
        })?;
    }
    Ok(current)
}

fn dotted(path: &[String]) -> String {
    format!(".{}", path.join("."))
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Null => {}
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        // For arrays and objects, use JSON representation
        _ => out.push_str(&value.to_string()),
    }
}
