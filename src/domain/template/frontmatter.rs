//! Frontmatter extraction for markdown templates.
//!
//! A template may open with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! Subject: Welcome, {{.Name}}
//! Category: onboarding
//! ---
//! Hello **{{.Name}}**!
//! ```
//!
//! Only the first two delimiter lines bound the block. Any `---` line that
//! appears later in the body (a horizontal rule, a fenced YAML sample) is
//! left untouched.

use serde_json::Value;
use thiserror::Error;

use super::types::Metadata;

const DELIMITER: &str = "---";

/// Errors produced while splitting frontmatter from a template body
#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("Frontmatter is not terminated by a closing '---' line")]
    Unterminated,

    #[error("Invalid frontmatter metadata: {0}")]
    InvalidMetadata(#[from] serde_yaml::Error),

    #[error("Frontmatter must be a mapping, found {0}")]
    NotAMapping(&'static str),
}

/// Split `content` into its frontmatter metadata and the remaining body.
///
/// Content that does not start with a `---` line is returned unchanged as the
/// body, with empty metadata.
pub fn parse(content: &str) -> Result<(Metadata, &str), FrontmatterError> {
    let (first, after_open) = split_line(content);
    if !is_delimiter(first) {
        return Ok((Metadata::new(), content));
    }

    let mut offset = 0;
    while offset < after_open.len() {
        let (line, rest) = split_line(&after_open[offset..]);
        if is_delimiter(line) {
            let metadata = decode(&after_open[..offset])?;
            return Ok((metadata, rest));
        }
        offset = after_open.len() - rest.len();
    }

    Err(FrontmatterError::Unterminated)
}

/// Returns the first line (without its `\n`) and everything after it.
fn split_line(input: &str) -> (&str, &str) {
    match input.find('\n') {
        Some(idx) => (&input[..idx], &input[idx + 1..]),
        None => (input, ""),
    }
}

fn is_delimiter(line: &str) -> bool {
    line.strip_suffix('\r').unwrap_or(line) == DELIMITER
}

fn decode(block: &str) -> Result<Metadata, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Metadata::new());
    }

    match serde_yaml::from_str::<Value>(block)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Metadata::new()),
        Value::Array(_) => Err(FrontmatterError::NotAMapping("a sequence")),
        Value::String(_) => Err(FrontmatterError::NotAMapping("a string")),
        Value::Number(_) => Err(FrontmatterError::NotAMapping("a number")),
        Value::Bool(_) => Err(FrontmatterError::NotAMapping("a boolean")),
    }
}
