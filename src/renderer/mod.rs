//! Template rendering pipeline.
//!
//! One `render` call runs, in order:
//! 1. Resolve the parsed template through the cache
//! 2. Substitute data into its body (the plain-text output)
//! 3. Convert that text from markdown to an HTML fragment
//! 4. Resolve the layout through the cache
//! 5. Execute the layout with `{Content, Metadata}` in HTML mode
//!
//! Any failure aborts the call; no partial result is returned.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};

use crate::config::TemplateSettings;
use crate::domain::markdown::MarkdownConverter;
use crate::domain::template::{
    FsSourceStore, RenderError, RenderResult, SourceStore, Template, TemplateCache,
    TemplateResult,
};
use crate::metrics::RenderMetrics;

/// Layout envelope key holding the rendered HTML fragment
const CONTENT_KEY: &str = "Content";

/// Layout envelope key holding the template's frontmatter
const METADATA_KEY: &str = "Metadata";

/// Renders templates into layouts. Shareable across threads.
pub struct Renderer {
    cache: TemplateCache,
    converter: MarkdownConverter,
}

impl Renderer {
    /// Create a renderer reading templates and layouts from the given sources
    pub fn new(template_source: Arc<dyn SourceStore>, layout_source: Arc<dyn SourceStore>) -> Self {
        Self::with_converter(template_source, layout_source, MarkdownConverter::new())
    }

    /// Create a renderer with a custom markdown converter
    pub fn with_converter(
        template_source: Arc<dyn SourceStore>,
        layout_source: Arc<dyn SourceStore>,
        converter: MarkdownConverter,
    ) -> Self {
        Self {
            cache: TemplateCache::new(template_source, layout_source),
            converter,
        }
    }

    /// Create a renderer over the configured template and layout directories
    pub fn from_settings(settings: &TemplateSettings) -> Self {
        tracing::info!(
            template_root = %settings.template_root,
            layout_root = %settings.layout_root,
            "Template renderer initialized"
        );
        Self::new(
            Arc::new(FsSourceStore::new(&settings.template_root)),
            Arc::new(FsSourceStore::new(&settings.layout_root)),
        )
    }

    /// The underlying template cache
    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// Render `template` with `data` and wrap it in `layout`
    #[tracing::instrument(name = "renderer.render", skip(self, data))]
    pub fn render(&self, layout: &str, template: &str, data: &Value) -> TemplateResult<RenderResult> {
        let start = Instant::now();

        match self.render_inner(layout, template, data) {
            Ok(result) => {
                RenderMetrics::record_success(start.elapsed());
                tracing::debug!(
                    html_bytes = result.html.len(),
                    text_bytes = result.text.len(),
                    "Rendered template"
                );
                Ok(result)
            }
            Err(e) => {
                RenderMetrics::record_failure();
                tracing::warn!(error = %e, "Render failed");
                Err(e)
            }
        }
    }

    /// Expand a one-off subject line against `data`
    pub fn render_subject(&self, subject: &str, data: &Value) -> TemplateResult<String> {
        let compiled = Template::compile(subject).map_err(|source| RenderError::Compile {
            name: "subject".to_string(),
            source,
        })?;

        compiled.render(data).map_err(|source| RenderError::Execute {
            name: "subject".to_string(),
            source,
        })
    }

    fn render_inner(&self, layout: &str, template: &str, data: &Value) -> TemplateResult<RenderResult> {
        let parsed = self.cache.get_template(template)?;

        let mut text = String::new();
        parsed
            .body
            .execute(data, &mut text)
            .map_err(|source| RenderError::Execute {
                name: parsed.name.clone(),
                source,
            })?;

        let fragment = self.converter.to_html(&text);

        let layout = self.cache.get_layout(layout)?;

        let envelope = json!({
            CONTENT_KEY: fragment,
            METADATA_KEY: parsed.metadata,
        });

        let mut html = String::with_capacity(fragment.len() + 256);
        layout
            .template
            .execute_html(&envelope, &[CONTENT_KEY], &mut html)
            .map_err(|source| RenderError::Execute {
                name: layout.name.clone(),
                source,
            })?;

        Ok(RenderResult {
            html,
            text,
            metadata: parsed.metadata.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::MemorySourceStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BASE_LAYOUT: &str = "<html><body>{{.Content}}</body></html>";

    fn renderer(templates: MemorySourceStore, layouts: MemorySourceStore) -> Renderer {
        Renderer::new(Arc::new(templates), Arc::new(layouts))
    }

    fn default_layouts() -> MemorySourceStore {
        MemorySourceStore::new().with("base.html", BASE_LAYOUT)
    }

    /// Counts reads to verify caching
    struct CountingStore {
        inner: MemorySourceStore,
        reads: AtomicUsize,
    }

    impl SourceStore for CountingStore {
        fn read(&self, name: &str) -> Result<Vec<u8>, crate::domain::template::SourceError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read(name)
        }
    }

    #[test]
    fn test_render_pipeline() {
        let renderer = renderer(
            MemorySourceStore::new().with(
                "welcome.md",
                "---\nSubject: Welcome\n---\nHello **{{.Name}}**!",
            ),
            default_layouts(),
        );

        let result = renderer
            .render("base.html", "welcome.md", &json!({"Name": "Ada"}))
            .unwrap();

        assert_eq!(result.text, "Hello **Ada**!");
        assert_eq!(
            result.html,
            "<html><body><p>Hello <strong>Ada</strong>!</p>\n</body></html>"
        );
        assert_eq!(result.metadata.get("Subject"), Some(&json!("Welcome")));
    }

    #[test]
    fn test_layout_sees_metadata_escaped() {
        let renderer = renderer(
            MemorySourceStore::new().with("t.md", "---\nTitle: \"<b>Hi</b>\"\n---\nBody"),
            MemorySourceStore::new()
                .with("page.html", "<title>{{.Metadata.Title}}</title>{{.Content}}"),
        );

        let result = renderer.render("page.html", "t.md", &json!({})).unwrap();
        assert_eq!(
            result.html,
            "<title>&lt;b&gt;Hi&lt;/b&gt;</title><p>Body</p>\n"
        );
    }

    #[test]
    fn test_button_in_template() {
        let renderer = renderer(
            MemorySourceStore::new().with("reset.md", "[!button|Reset]({{.Link}})"),
            default_layouts(),
        );

        let result = renderer
            .render("base.html", "reset.md", &json!({"Link": "https://x.io/r?t=1"}))
            .unwrap();
        assert!(result
            .html
            .contains("<a href=\"https://x.io/r?t=1\" class=\"button\">Reset</a>"));
        assert_eq!(result.text, "[!button|Reset](https://x.io/r?t=1)");
    }

    #[test]
    fn test_markup_in_data_is_escaped_in_html() {
        let renderer = renderer(
            MemorySourceStore::new().with("hello.md", "Hello {{.Name}}"),
            default_layouts(),
        );

        let result = renderer
            .render(
                "base.html",
                "hello.md",
                &json!({"Name": "<img src=x onerror=alert(1)>"}),
            )
            .unwrap();
        assert_eq!(result.text, "Hello <img src=x onerror=alert(1)>");
        assert_eq!(
            result.html,
            "<html><body><p>Hello &lt;img src=x onerror=alert(1)&gt;</p>\n</body></html>"
        );
    }

    #[test]
    fn test_missing_template_and_layout() {
        let renderer = renderer(
            MemorySourceStore::new().with("a.md", "A"),
            default_layouts(),
        );

        assert!(matches!(
            renderer.render("base.html", "missing.md", &json!({})),
            Err(RenderError::TemplateNotFound(_))
        ));
        assert!(matches!(
            renderer.render("missing.html", "a.md", &json!({})),
            Err(RenderError::LayoutNotFound(_))
        ));
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let renderer = renderer(
            MemorySourceStore::new().with("a.md", "Hi {{.Name}}"),
            default_layouts(),
        );

        let err = renderer.render("base.html", "a.md", &json!({})).unwrap_err();
        assert!(matches!(err, RenderError::Execute { ref name, .. } if name == "a.md"));
    }

    #[test]
    fn test_sources_read_once() {
        let templates = Arc::new(CountingStore {
            inner: MemorySourceStore::new().with("a.md", "Hi {{.Name}}"),
            reads: AtomicUsize::new(0),
        });
        let layouts = Arc::new(CountingStore {
            inner: default_layouts(),
            reads: AtomicUsize::new(0),
        });
        let renderer = Renderer::new(templates.clone(), layouts.clone());

        let first = renderer.render("base.html", "a.md", &json!({"Name": "A"})).unwrap();
        let second = renderer.render("base.html", "a.md", &json!({"Name": "B"})).unwrap();

        assert_eq!(templates.reads.load(Ordering::SeqCst), 1);
        assert_eq!(layouts.reads.load(Ordering::SeqCst), 1);
        assert_eq!(first.text, "Hi A");
        assert_eq!(second.text, "Hi B");
    }

    #[test]
    fn test_render_subject() {
        let renderer = renderer(MemorySourceStore::new(), MemorySourceStore::new());
        assert_eq!(
            renderer
                .render_subject("Welcome, {{.Name}}", &json!({"Name": "Ada"}))
                .unwrap(),
            "Welcome, Ada"
        );
        assert!(matches!(
            renderer.render_subject("{{.Missing}}", &json!({})),
            Err(RenderError::Execute { .. })
        ));
        assert!(matches!(
            renderer.render_subject("{{ if }}", &json!({})),
            Err(RenderError::Compile { .. })
        ));
    }

    #[test]
    fn test_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("layouts")).unwrap();
        std::fs::write(dir.path().join("note.md"), "Note for {{.Name}}").unwrap();
        std::fs::write(dir.path().join("layouts/base.html"), "<div>{{.Content}}</div>").unwrap();

        let settings = TemplateSettings {
            template_root: dir.path().to_string_lossy().into_owned(),
            layout_root: dir.path().join("layouts").to_string_lossy().into_owned(),
        };
        let renderer = Renderer::from_settings(&settings);

        let result = renderer.render("base.html", "note.md", &json!({"Name": "Bo"})).unwrap();
        assert_eq!(result.html, "<div><p>Note for Bo</p>\n</div>");
        assert_eq!(renderer.cache().template_count(), 1);
    }
}
