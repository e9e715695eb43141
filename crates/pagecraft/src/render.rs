use crate::config::BuildConfig;
use crate::error::{IoContext, Result};
use crate::templates::TemplateRegistry;
use crate::types::PageMetadata;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Context;

/// Where a page with the given URI lands. A leading `/` is dropped so every
/// page stays under the output root.
pub fn output_path(output_dir: &Path, uri: &str) -> PathBuf {
    output_dir.join(uri.trim_start_matches('/'))
}

pub struct PageRenderer<'a> {
    registry: &'a TemplateRegistry,
    config: &'a BuildConfig,
}

impl<'a> PageRenderer<'a> {
    pub fn new(registry: &'a TemplateRegistry, config: &'a BuildConfig) -> Self {
        Self { registry, config }
    }

    pub fn render(&self, page: &PageMetadata) -> Result<PathBuf> {
        let mut context = Context::new();
        context.insert("page", page);
        context.insert("site", &self.config.extra);

        // Rendered fully before the file is touched.
        let rendered = self.registry.render(&page.template, &context)?;

        let path = output_path(&self.config.output_dir, &page.uri);
        let output = if self.config.minify && is_html(&path) {
            minify(&rendered)
        } else {
            rendered.into_bytes()
        };

        write_output(&path, &output)?;

        Ok(path)
    }
}

pub(crate) fn write_output(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating directory {}", parent.display());
            fs::create_dir_all(parent).io_context("creating directory", parent)?;
        }
    }

    info!("Creating file {}", path.display());
    fs::write(path, contents).io_context("writing", path)?;

    Ok(())
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .map(|extension| extension == "html" || extension == "htm")
        .unwrap_or(false)
}

fn minify(html: &str) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.keep_closing_tags = true;
    minify_html::minify(html.as_bytes(), &cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PagecraftError;
    use crate::templates::Clock;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn registry() -> TemplateRegistry {
        TemplateRegistry::from_raw_templates(
            [
                (
                    "page.html",
                    "<h1>{{ page.title }}</h1>\n{{ page.body | markdown }}<p>{{ page.date | strdate }}</p>",
                ),
                ("broken.html", "{{ page.missing.field }}"),
            ],
            Clock::System,
        )
        .unwrap()
    }

    fn page(uri: &str, template: &str) -> PageMetadata {
        PageMetadata {
            uri: uri.to_string(),
            title: "Hello & Goodbye".to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2023, 3, 1),
            body: "Some *text*".to_string(),
            template: template.to_string(),
            include_in_feed: false,
            source_path: PathBuf::from("src/hello.md"),
        }
    }

    fn config(output_dir: &Path) -> BuildConfig {
        BuildConfig {
            output_dir: output_dir.to_path_buf(),
            ..BuildConfig::default()
        }
    }

    #[test]
    fn test_output_path_strips_leading_slash() {
        assert_eq!(
            output_path(Path::new("public"), "/blog/a.html"),
            PathBuf::from("public/blog/a.html")
        );
        assert_eq!(
            output_path(Path::new("."), "a.html"),
            PathBuf::from("./a.html")
        );
    }

    #[test]
    fn test_render_creates_nested_directories() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        let config = config(dir.path());

        let path = PageRenderer::new(&registry, &config)
            .render(&page("blog/2023/hello.html", "page.html"))
            .unwrap();

        assert_eq!(path, dir.path().join("blog/2023/hello.html"));
        let html = fs::read_to_string(path).unwrap();
        assert_eq!(
            html,
            "<h1>Hello &amp; Goodbye</h1>\n<p>Some <em>text</em></p>\n<p>March 1, 2023</p>"
        );
    }

    #[test]
    fn test_render_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        let config = config(dir.path());
        fs::write(dir.path().join("hello.html"), "stale content that is longer").unwrap();

        PageRenderer::new(&registry, &config)
            .render(&page("hello.html", "page.html"))
            .unwrap();

        let html = fs::read_to_string(dir.path().join("hello.html")).unwrap();
        assert!(html.starts_with("<h1>Hello"));
        assert!(!html.contains("stale"));
    }

    #[test]
    fn test_template_error_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        let config = config(dir.path());

        let result =
            PageRenderer::new(&registry, &config).render(&page("bad.html", "broken.html"));

        assert!(matches!(result, Err(PagecraftError::Template(_))));
        assert!(!dir.path().join("bad.html").exists());
    }

    #[test]
    fn test_write_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blocker"), "").unwrap();
        let registry = registry();
        let config = config(dir.path());

        let result =
            PageRenderer::new(&registry, &config).render(&page("blocker/a.html", "page.html"));

        assert!(matches!(result, Err(PagecraftError::Io { .. })));
    }

    #[test]
    fn test_minify_shrinks_html_output() {
        let dir = TempDir::new().unwrap();
        let registry = TemplateRegistry::from_raw_templates(
            [("page.html", "<div>\n    <p>  {{ page.title }}  </p>\n</div>\n")],
            Clock::System,
        )
        .unwrap();
        let config = BuildConfig {
            minify: true,
            ..config(dir.path())
        };

        PageRenderer::new(&registry, &config)
            .render(&page("a.html", "page.html"))
            .unwrap();

        let html = fs::read_to_string(dir.path().join("a.html")).unwrap();
        assert!(!html.contains("    "));
        assert!(html.contains("Goodbye"));
    }
}
