//! Markdown templates with frontmatter.
//!
//! This module provides:
//! - Frontmatter parsing (`---` fenced YAML metadata)
//! - A compiled `{{.Field}}` substitution engine
//! - Source stores for templates and layouts
//! - A concurrency-safe cache of parsed templates and layouts
//!
//! # Example
//!
//! ```ignore
//! let templates = MemorySourceStore::new()
//!     .with("welcome.md", "---\nSubject: Welcome {{.Name}}\n---\nHello **{{.Name}}**");
//! let layouts = MemorySourceStore::new().with("base.html", "<body>{{.Content}}</body>");
//!
//! let cache = TemplateCache::new(Arc::new(templates), Arc::new(layouts));
//! let template = cache.get_template("welcome.md")?;
//! let text = template.body.render(&json!({"Name": "Ada"}))?;
//! ```

pub mod frontmatter;

mod cache;
mod source;
mod substitution;
mod types;

pub use cache::{CacheStats, CacheStatsSnapshot, TemplateCache};
pub use frontmatter::FrontmatterError;
pub use source::{FsSourceStore, MemorySourceStore, SourceError, SourceStore};
pub use substitution::{SubstitutionError, Template};
pub use types::{Metadata, ParsedLayout, ParsedTemplate, RenderError, RenderResult, TemplateResult};
