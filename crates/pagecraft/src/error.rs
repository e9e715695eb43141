use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PagecraftError {
    #[error("IO error while {context} {path}: {source}")]
    Io {
        context: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory walk error in {path}: {message}")]
    WalkDir { path: PathBuf, message: String },

    #[error("Failed to load templates from {path}: {message}")]
    TemplateLoad { path: PathBuf, message: String },

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("TOML parse error in {path}: {message}")]
    TomlParse { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, PagecraftError>;

pub trait IoContext<T> {
    fn io_context(self, context: &str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context(self, context: &str, path: &Path) -> Result<T> {
        self.map_err(|source| PagecraftError::Io {
            context: context.to_string(),
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentIssue {
    MissingHeader,
    MissingFields(Vec<&'static str>),
    UnknownTemplate(String),
}

impl fmt::Display for DocumentIssue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentIssue::MissingHeader => write!(formatter, "no header section detected"),
            DocumentIssue::MissingFields(fields) => write!(
                formatter,
                "missing required header parameter ({})",
                fields.join(", ")
            ),
            DocumentIssue::UnknownTemplate(name) => {
                write!(formatter, "the template '{}' is not defined", name)
            }
        }
    }
}

/// A soft, per-document failure. The document is left out of the build and
/// the build carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub issue: DocumentIssue,
}

impl Diagnostic {
    pub fn new(path: impl Into<PathBuf>, issue: DocumentIssue) -> Self {
        Self {
            path: path.into(),
            issue,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.path.display(), self.issue)
    }
}
