//! Lazily populated cache of parsed templates and layouts.
//!
//! Lookups take a shard read lock on the fast path. A miss goes through
//! `DashMap::entry`, which holds the shard write lock while the entry is
//! re-checked and populated, so concurrent misses on one name load it once.
//! Entries are never replaced or evicted, and failed loads are not stored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;

use crate::metrics::CacheMetrics;

use super::frontmatter;
use super::source::{SourceError, SourceStore};
use super::substitution::Template;
use super::types::{ParsedLayout, ParsedTemplate, RenderError, TemplateResult};

const TEMPLATE_KIND: &str = "template";
const LAYOUT_KIND: &str = "layout";

/// Counters for cache activity
#[derive(Debug, Default)]
pub struct CacheStats {
    pub template_hits: AtomicU64,
    pub template_misses: AtomicU64,
    pub layout_hits: AtomicU64,
    pub layout_misses: AtomicU64,
    /// Source reads performed on misses, successful or not
    pub loads: AtomicU64,
}

impl CacheStats {
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            template_hits: self.template_hits.load(Ordering::Relaxed),
            template_misses: self.template_misses.load(Ordering::Relaxed),
            layout_hits: self.layout_hits.load(Ordering::Relaxed),
            layout_misses: self.layout_misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStatsSnapshot {
    pub template_hits: u64,
    pub template_misses: u64,
    pub layout_hits: u64,
    pub layout_misses: u64,
    pub loads: u64,
}

/// Thread-safe cache of parsed templates and compiled layouts
pub struct TemplateCache {
    templates: DashMap<String, Arc<ParsedTemplate>>,
    layouts: DashMap<String, Arc<ParsedLayout>>,
    template_source: Arc<dyn SourceStore>,
    layout_source: Arc<dyn SourceStore>,
    stats: CacheStats,
}

impl TemplateCache {
    /// Create an empty cache reading from the given sources
    pub fn new(template_source: Arc<dyn SourceStore>, layout_source: Arc<dyn SourceStore>) -> Self {
        Self {
            templates: DashMap::new(),
            layouts: DashMap::new(),
            template_source,
            layout_source,
            stats: CacheStats::default(),
        }
    }

    /// Get a parsed template, loading it on first use
    pub fn get_template(&self, name: &str) -> TemplateResult<Arc<ParsedTemplate>> {
        if let Some(entry) = self.templates.get(name) {
            self.record_template_hit();
            return Ok(Arc::clone(entry.value()));
        }

        match self.templates.entry(name.to_string()) {
            // Another caller populated it between the two lookups
            Entry::Occupied(entry) => {
                self.record_template_hit();
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => {
                self.stats.template_misses.fetch_add(1, Ordering::Relaxed);
                CacheMetrics::record_miss(TEMPLATE_KIND);

                let parsed = Arc::new(self.load_template(name).inspect_err(|e| {
                    CacheMetrics::record_load_failure(TEMPLATE_KIND);
                    tracing::warn!(template = %name, error = %e, "Template load failed");
                })?);
                entry.insert(Arc::clone(&parsed));
                Ok(parsed)
            }
        }
    }

    /// Get a compiled layout, loading it on first use
    pub fn get_layout(&self, name: &str) -> TemplateResult<Arc<ParsedLayout>> {
        if let Some(entry) = self.layouts.get(name) {
            self.record_layout_hit();
            return Ok(Arc::clone(entry.value()));
        }

        match self.layouts.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                self.record_layout_hit();
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => {
                self.stats.layout_misses.fetch_add(1, Ordering::Relaxed);
                CacheMetrics::record_miss(LAYOUT_KIND);

                let parsed = Arc::new(self.load_layout(name).inspect_err(|e| {
                    CacheMetrics::record_load_failure(LAYOUT_KIND);
                    tracing::warn!(layout = %name, error = %e, "Layout load failed");
                })?);
                entry.insert(Arc::clone(&parsed));
                Ok(parsed)
            }
        }
    }

    /// Get the number of cached templates
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Get the number of cached layouts
    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    fn record_template_hit(&self) {
        self.stats.template_hits.fetch_add(1, Ordering::Relaxed);
        CacheMetrics::record_hit(TEMPLATE_KIND);
    }

    fn record_layout_hit(&self) {
        self.stats.layout_hits.fetch_add(1, Ordering::Relaxed);
        CacheMetrics::record_hit(LAYOUT_KIND);
    }

    fn load_template(&self, name: &str) -> TemplateResult<ParsedTemplate> {
        let content = self.read_source(&*self.template_source, name, || {
            RenderError::TemplateNotFound(name.to_string())
        })?;

        let (metadata, body) =
            frontmatter::parse(&content).map_err(|source| RenderError::Frontmatter {
                name: name.to_string(),
                source,
            })?;

        let body = Template::compile(body).map_err(|source| RenderError::Compile {
            name: name.to_string(),
            source,
        })?;

        tracing::debug!(
            template = %name,
            metadata_fields = metadata.len(),
            "Template loaded"
        );

        Ok(ParsedTemplate {
            name: name.to_string(),
            metadata,
            body,
        })
    }

    fn load_layout(&self, name: &str) -> TemplateResult<ParsedLayout> {
        let content = self.read_source(&*self.layout_source, name, || {
            RenderError::LayoutNotFound(name.to_string())
        })?;

        let template = Template::compile(&content).map_err(|source| RenderError::Compile {
            name: name.to_string(),
            source,
        })?;

        tracing::debug!(layout = %name, "Layout loaded");

        Ok(ParsedLayout {
            name: name.to_string(),
            template,
        })
    }

    fn read_source(
        &self,
        store: &dyn SourceStore,
        name: &str,
        not_found: impl FnOnce() -> RenderError,
    ) -> TemplateResult<String> {
        self.stats.loads.fetch_add(1, Ordering::Relaxed);

        let bytes = store.read(name).map_err(|source| match source {
            SourceError::NotFound(_) => not_found(),
            source => RenderError::Source {
                name: name.to_string(),
                source,
            },
        })?;

        String::from_utf8(bytes).map_err(|source| RenderError::Encoding {
            name: name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::source::MemorySourceStore;
    use serde_json::json;

    fn cache_with(templates: MemorySourceStore, layouts: MemorySourceStore) -> TemplateCache {
        TemplateCache::new(Arc::new(templates), Arc::new(layouts))
    }

    #[test]
    fn test_get_template_parses_frontmatter() {
        let cache = cache_with(
            MemorySourceStore::new().with("welcome.md", "---\nSubject: Hi\n---\nHello {{.Name}}"),
            MemorySourceStore::new(),
        );

        let parsed = cache.get_template("welcome.md").unwrap();
        assert_eq!(parsed.name, "welcome.md");
        assert_eq!(parsed.metadata["Subject"], json!("Hi"));
        assert_eq!(parsed.body.render(&json!({"Name": "Bo"})).unwrap(), "Hello Bo");
    }

    #[test]
    fn test_cached_entry_is_shared() {
        let cache = cache_with(
            MemorySourceStore::new().with("a.md", "A"),
            MemorySourceStore::new().with("base.html", "{{.Content}}"),
        );

        let first = cache.get_template("a.md").unwrap();
        let second = cache.get_template("a.md").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let first = cache.get_layout("base.html").unwrap();
        let second = cache.get_layout("base.html").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!(stats.template_misses, 1);
        assert_eq!(stats.template_hits, 1);
        assert_eq!(stats.layout_misses, 1);
        assert_eq!(stats.layout_hits, 1);
        assert_eq!(stats.loads, 2);
    }

    #[test]
    fn test_missing_sources_are_distinct() {
        let cache = cache_with(MemorySourceStore::new(), MemorySourceStore::new());

        assert!(matches!(
            cache.get_template("nope.md"),
            Err(RenderError::TemplateNotFound(name)) if name == "nope.md"
        ));
        assert!(matches!(
            cache.get_layout("nope.html"),
            Err(RenderError::LayoutNotFound(name)) if name == "nope.html"
        ));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let templates = Arc::new(MemorySourceStore::new().with("broken.md", "---\nSubject: x\n"));
        let cache = TemplateCache::new(templates.clone(), Arc::new(MemorySourceStore::new()));

        assert!(matches!(
            cache.get_template("broken.md"),
            Err(RenderError::Frontmatter { .. })
        ));
        assert_eq!(cache.template_count(), 0);

        // A fixed source is picked up by the next call
        templates.insert("broken.md", "---\nSubject: x\n---\nfixed");
        let parsed = cache.get_template("broken.md").unwrap();
        assert_eq!(parsed.body.render(&json!({})).unwrap(), "fixed");
        assert_eq!(cache.stats().loads, 2);
    }

    #[test]
    fn test_compile_errors() {
        let cache = cache_with(
            MemorySourceStore::new().with("bad.md", "Hello {{.Name"),
            MemorySourceStore::new().with("bad.html", "{{Content}}"),
        );

        assert!(matches!(
            cache.get_template("bad.md"),
            Err(RenderError::Compile { .. })
        ));
        assert!(matches!(
            cache.get_layout("bad.html"),
            Err(RenderError::Compile { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let cache = cache_with(
            MemorySourceStore::new().with("bin.md", vec![0xff, 0xfe, 0x00]),
            MemorySourceStore::new(),
        );
        assert!(matches!(
            cache.get_template("bin.md"),
            Err(RenderError::Encoding { .. })
        ));
    }

    #[test]
    fn test_layout_frontmatter_is_not_stripped() {
        let cache = cache_with(
            MemorySourceStore::new(),
            MemorySourceStore::new().with("raw.html", "---\n{{.Content}}"),
        );
        let layout = cache.get_layout("raw.html").unwrap();
        assert_eq!(
            layout.template.render(&json!({"Content": "x"})).unwrap(),
            "---\nx"
        );
    }
}
