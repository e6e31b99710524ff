//! Template types and error definitions

use std::string::FromUtf8Error;

use serde::Serialize;
use thiserror::Error;

use super::frontmatter::FrontmatterError;
use super::source::SourceError;
use super::substitution::{SubstitutionError, Template};

/// Ordered frontmatter metadata
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Render-specific error type
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Layout not found: {0}")]
    LayoutNotFound(String),

    #[error("Failed to read {name}: {source}")]
    Source {
        name: String,
        #[source]
        source: SourceError,
    },

    #[error("{name} is not valid UTF-8: {source}")]
    Encoding {
        name: String,
        #[source]
        source: FromUtf8Error,
    },

    #[error("Invalid frontmatter in {name}: {source}")]
    Frontmatter {
        name: String,
        #[source]
        source: FrontmatterError,
    },

    #[error("Failed to compile {name}: {source}")]
    Compile {
        name: String,
        #[source]
        source: SubstitutionError,
    },

    #[error("Failed to execute {name}: {source}")]
    Execute {
        name: String,
        #[source]
        source: SubstitutionError,
    },
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, RenderError>;

/// A template split into frontmatter and a compiled body
#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    /// Name the template was loaded under
    pub name: String,

    /// Frontmatter metadata (empty when the template has none)
    pub metadata: Metadata,

    /// Compiled body, frontmatter excluded
    pub body: Template,
}

/// A compiled layout
#[derive(Debug, Clone)]
pub struct ParsedLayout {
    /// Name the layout was loaded under
    pub name: String,

    /// Compiled layout template
    pub template: Template,
}

/// Output of a single render call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderResult {
    /// Final HTML document (layout applied)
    pub html: String,

    /// Plain-text body after substitution
    pub text: String,

    /// Frontmatter metadata of the template
    pub metadata: Metadata,
}

impl RenderResult {
    /// The `Subject` frontmatter field, when it is a non-empty string
    pub fn subject(&self) -> Option<&str> {
        self.metadata
            .get("Subject")
            .and_then(serde_json::Value::as_str)
            .filter(|subject| !subject.is_empty())
    }
}
