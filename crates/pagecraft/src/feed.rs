use crate::config::BuildConfig;
use crate::error::Result;
use crate::render::write_output;
use crate::templates::TemplateRegistry;
use crate::types::PageMetadata;
use std::path::PathBuf;
use tera::Context;

/// Newest first. Undated entries go last; entries sharing a date are ordered
/// by source path.
pub fn sort_entries(entries: &mut [PageMetadata]) {
    entries.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.source_path.cmp(&b.source_path))
    });
}

pub fn generate_feed(
    registry: &TemplateRegistry,
    mut entries: Vec<PageMetadata>,
    config: &BuildConfig,
) -> Result<Option<PathBuf>> {
    if entries.is_empty() {
        return Ok(None);
    }

    sort_entries(&mut entries);

    let mut context = Context::new();
    context.insert("entries", &entries);
    context.insert("site", &config.extra);

    let rendered = registry.render(&config.feed_template, &context)?;

    let path = config.feed_path();
    write_output(&path, rendered.as_bytes())?;

    Ok(Some(path))
}
