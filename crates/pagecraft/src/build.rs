use crate::config::BuildConfig;
use crate::error::{Diagnostic, Result};
use crate::feed::generate_feed;
use crate::parsing::{ParseOutcome, read_document};
use crate::render::PageRenderer;
use crate::scan::scan_sources;
use crate::templates::TemplateRegistry;
use log::{info, warn};
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages: Vec<PathBuf>,
    pub feed: Option<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs one build: load templates, scan sources, then parse and render each
/// source in turn before writing the feed. The first fatal error stops the
/// build; documents with a bad header are reported and skipped.
pub struct Builder {
    config: BuildConfig,
    registry: Option<TemplateRegistry>,
}

impl Builder {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            registry: None,
        }
    }

    /// Uses an already loaded registry instead of reading `template_dir`.
    pub fn with_registry(mut self, registry: TemplateRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<BuildReport> {
        let Builder { config, registry } = self;

        let registry = match registry {
            Some(registry) => registry,
            None => TemplateRegistry::load(&config.template_dir)?,
        };

        let sources = scan_sources(&config.source_dir, &config.extension)?;
        let renderer = PageRenderer::new(&registry, &config);

        let mut report = BuildReport::default();
        let mut feed_entries = Vec::new();

        for source in &sources {
            match read_document(source, &registry)? {
                ParseOutcome::Page(page) => {
                    let path = renderer.render(&page)?;
                    report.pages.push(path);

                    if page.include_in_feed {
                        feed_entries.push(page);
                    }
                }
                ParseOutcome::Skipped(diagnostic) => {
                    warn!("Skipping {}", diagnostic);
                    report.diagnostics.push(diagnostic);
                }
            }
        }

        report.feed = generate_feed(&registry, feed_entries, &config)?;

        info!(
            "Rendered {} of {} sources{}",
            report.pages.len(),
            sources.len(),
            if report.feed.is_some() { " and the feed" } else { "" }
        );

        Ok(report)
    }
}
