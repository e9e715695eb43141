use axum::Router;
use chrono::{DateTime, Utc};
use log::info;
use pagecraft::{BuildConfig, Builder, TemplateRegistry};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tower_http::services::ServeDir;

const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

fn parse_source_date_epoch(value: &str) -> Option<DateTime<Utc>> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
}

fn apply_overrides(
    mut config: BuildConfig,
    src: Option<PathBuf>,
    tpl: Option<PathBuf>,
    output: Option<PathBuf>,
) -> BuildConfig {
    if let Some(src) = src {
        config.source_dir = src;
    }
    if let Some(tpl) = tpl {
        config.template_dir = tpl;
    }
    if let Some(output) = output {
        config.output_dir = output;
    }
    config
}

pub fn build_site(
    config_path: &Path,
    src: Option<PathBuf>,
    tpl: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = apply_overrides(BuildConfig::load_or_default(config_path)?, src, tpl, output);

    info!("Building site...");
    let start = Instant::now();

    let mut builder = Builder::new(config.clone());

    if let Some(instant) = std::env::var(SOURCE_DATE_EPOCH)
        .ok()
        .as_deref()
        .and_then(parse_source_date_epoch)
    {
        info!(
            "Pinning now() to {} from {}",
            instant.to_rfc3339(),
            SOURCE_DATE_EPOCH
        );
        let registry = TemplateRegistry::load_at(&config.template_dir, instant)?;
        builder = builder.with_registry(registry);
    }

    let report = builder.build()?;

    info!(
        "Built {} pages ({} skipped) into {} in {:.2?}",
        report.pages.len(),
        report.diagnostics.len(),
        config.output_dir.display(),
        start.elapsed()
    );

    Ok(())
}

pub async fn serve_site(dir: &Path, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Listening on http://{addr}");

    let serve_dir = ServeDir::new(dir).append_index_html_on_directories(true);
    let app = Router::new().fallback_service(serve_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_config() -> BuildConfig {
        BuildConfig {
            source_dir: PathBuf::from("site/content"),
            template_dir: PathBuf::from("site/layouts"),
            output_dir: PathBuf::from("site/public"),
            minify: true,
            ..BuildConfig::default()
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let config = apply_overrides(
            file_config(),
            Some(PathBuf::from("docs")),
            Some(PathBuf::from("tpl")),
            Some(PathBuf::from("out")),
        );
        assert_eq!(config.source_dir, PathBuf::from("docs"));
        assert_eq!(config.template_dir, PathBuf::from("tpl"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(config.minify);
    }

    #[test]
    fn test_absent_flags_keep_config_file_values() {
        let config = apply_overrides(file_config(), None, Some(PathBuf::from("tpl")), None);
        assert_eq!(config.source_dir, PathBuf::from("site/content"));
        assert_eq!(config.template_dir, PathBuf::from("tpl"));
        assert_eq!(config.output_dir, PathBuf::from("site/public"));
    }

    #[test]
    fn test_parse_source_date_epoch() {
        let instant = parse_source_date_epoch("1700000000").unwrap();
        assert_eq!(instant.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_parse_source_date_epoch_trims_whitespace() {
        assert!(parse_source_date_epoch(" 0\n").is_some());
    }

    #[test]
    fn test_parse_source_date_epoch_rejects_garbage() {
        assert_eq!(parse_source_date_epoch("yesterday"), None);
        assert_eq!(parse_source_date_epoch(""), None);
    }
}
