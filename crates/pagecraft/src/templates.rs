use crate::error::{PagecraftError, Result};
use crate::markdown::MarkdownRenderer;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tera::{Context, Error, Filter, Function, Tera, Value, try_get_value};
use walkdir::WalkDir;

pub const XML_PROLOG: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

const TEMPLATE_EXTENSIONS: [&str; 2] = ["html", "xml"];

#[derive(Debug, Clone, Copy)]
pub enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(instant) => *instant,
        }
    }
}

/// Named templates plus the helper filters and functions every template can
/// use. Built once, then only read.
pub struct TemplateRegistry {
    tera: Tera,
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TemplateRegistry")
            .field("templates", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl TemplateRegistry {
    pub fn load(template_dir: &Path) -> Result<Self> {
        Self::load_with_clock(template_dir, Clock::System)
    }

    /// Like [`TemplateRegistry::load`], with `now()` pinned to `instant`.
    pub fn load_at(template_dir: &Path, instant: DateTime<Utc>) -> Result<Self> {
        Self::load_with_clock(template_dir, Clock::Fixed(instant))
    }

    pub fn load_with_clock(template_dir: &Path, clock: Clock) -> Result<Self> {
        let files = collect_template_files(template_dir)?;

        let mut tera = Tera::default();
        tera.add_template_files(
            files
                .iter()
                .map(|(path, name)| (path.as_path(), Some(name.as_str()))),
        )
        .map_err(|error| PagecraftError::TemplateLoad {
            path: template_dir.to_path_buf(),
            message: error_chain(&error),
        })?;

        debug!(
            "Loaded {} templates from {}",
            files.len(),
            template_dir.display()
        );

        Ok(Self::with_helpers(tera, clock))
    }

    pub fn from_raw_templates<'a, I>(templates: I, clock: Clock) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates)
            .map_err(|error| PagecraftError::TemplateLoad {
                path: PathBuf::new(),
                message: error_chain(&error),
            })?;

        Ok(Self::with_helpers(tera, clock))
    }

    fn with_helpers(mut tera: Tera, clock: Clock) -> Self {
        tera.register_filter(
            "markdown",
            MarkdownFilter {
                renderer: MarkdownRenderer::new(),
            },
        );
        tera.register_filter("isodate", DateFilter::new("isodate", DateStyle::Iso));
        tera.register_filter("strdate", DateFilter::new("strdate", DateStyle::Long));
        tera.register_filter("atomdate", DateFilter::new("atomdate", DateStyle::Atom));
        tera.register_filter("noescape", NoEscapeFilter);
        tera.register_filter("cdata", CdataFilter);
        tera.register_function("now", NowFunction { clock });
        tera.register_function("xmlprolog", XmlPrologFunction);

        Self { tera }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|candidate| candidate == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tera.get_template_names()
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(name, context)?)
    }
}

fn collect_template_files(template_dir: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(template_dir).sort_by_file_name() {
        let entry = entry.map_err(|error| PagecraftError::TemplateLoad {
            path: template_dir.to_path_buf(),
            message: error.to_string(),
        })?;

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let is_template = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| TEMPLATE_EXTENSIONS.contains(&extension))
            .unwrap_or(false);
        if !is_template {
            continue;
        }

        let Ok(relative) = path.strip_prefix(template_dir) else {
            continue;
        };
        let name = relative.to_string_lossy().replace('\\', "/");
        files.push((path.to_path_buf(), name));
    }

    Ok(files)
}

pub(crate) fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

struct MarkdownFilter {
    renderer: MarkdownRenderer,
}

impl Filter for MarkdownFilter {
    fn filter(&self, value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        let input = try_get_value!("markdown", "value", String, value);
        Ok(Value::String(self.renderer.render(&input)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy)]
enum DateStyle {
    Iso,
    Long,
    Atom,
}

impl DateStyle {
    fn format(self, instant: DateTime<Utc>) -> String {
        match self {
            DateStyle::Iso => instant.format("%Y-%m-%d").to_string(),
            DateStyle::Long => instant.format("%B %-d, %Y").to_string(),
            DateStyle::Atom => instant.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

struct DateFilter {
    name: &'static str,
    style: DateStyle,
}

impl DateFilter {
    fn new(name: &'static str, style: DateStyle) -> Self {
        Self { name, style }
    }
}

impl Filter for DateFilter {
    fn filter(&self, value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        let text = match value {
            Value::Null => return Ok(Value::String(String::new())),
            Value::String(text) => text,
            other => {
                return Err(Error::msg(format!(
                    "Filter `{}` expected a date string but got {}",
                    self.name, other
                )));
            }
        };

        let instant = parse_instant(text).ok_or_else(|| {
            Error::msg(format!(
                "Filter `{}` could not read '{}' as a date",
                self.name, text
            ))
        })?;

        Ok(Value::String(self.style.format(instant)))
    }
}

fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}

struct NoEscapeFilter;

impl Filter for NoEscapeFilter {
    fn filter(&self, value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        Ok(value.clone())
    }

    fn is_safe(&self) -> bool {
        true
    }
}

struct CdataFilter;

impl Filter for CdataFilter {
    fn filter(&self, value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        let input = try_get_value!("cdata", "value", String, value);
        // A literal "]]>" would close the section early.
        let inner = input.replace("]]>", "]]]]><![CDATA[>");
        Ok(Value::String(format!("<![CDATA[{}]]>", inner)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

struct NowFunction {
    clock: Clock,
}

impl Function for NowFunction {
    fn call(&self, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        Ok(Value::String(
            self.clock.now().to_rfc3339_opts(SecondsFormat::Secs, true),
        ))
    }
}

struct XmlPrologFunction;

impl Function for XmlPrologFunction {
    fn call(&self, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        Ok(Value::String(XML_PROLOG.to_string()))
    }

    fn is_safe(&self) -> bool {
        true
    }
}
