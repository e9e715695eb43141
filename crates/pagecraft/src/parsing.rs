use crate::error::{Diagnostic, DocumentIssue, IoContext, Result};
use crate::templates::TemplateRegistry;
use crate::types::PageMetadata;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER_DELIMITER: &str = "\n---\n";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKey {
    Title,
    Description,
    Template,
    Uri,
    Date,
    Feed,
}

impl HeaderKey {
    const ALL: [HeaderKey; 6] = [
        HeaderKey::Title,
        HeaderKey::Description,
        HeaderKey::Template,
        HeaderKey::Uri,
        HeaderKey::Date,
        HeaderKey::Feed,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            HeaderKey::Title => "title: ",
            HeaderKey::Description => "description: ",
            HeaderKey::Template => "template: ",
            HeaderKey::Uri => "uri: ",
            HeaderKey::Date => "date: ",
            HeaderKey::Feed => "rss: ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderField<'a> {
    pub key: HeaderKey,
    pub value: &'a str,
}

pub fn parse_header_line(line: &str) -> Option<HeaderField<'_>> {
    HeaderKey::ALL.iter().find_map(|key| {
        line.strip_prefix(key.prefix()).map(|value| HeaderField {
            key: *key,
            value: value.trim_end(),
        })
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub description: String,
    pub template: String,
    pub uri: String,
    pub date: Option<NaiveDate>,
    pub include_in_feed: bool,
}

impl FrontMatter {
    pub fn from_header(header: &str) -> Self {
        let mut front_matter = Self::default();
        for field in header.lines().filter_map(parse_header_line) {
            front_matter.assign(field);
        }
        front_matter
    }

    pub fn assign(&mut self, field: HeaderField<'_>) {
        match field.key {
            HeaderKey::Title => self.title = field.value.to_string(),
            HeaderKey::Description => self.description = field.value.to_string(),
            HeaderKey::Template => self.template = field.value.to_string(),
            HeaderKey::Uri => self.uri = field.value.to_string(),
            HeaderKey::Date => {
                self.date = NaiveDate::parse_from_str(field.value, DATE_FORMAT).ok()
            }
            HeaderKey::Feed => {
                if field.value == "true" {
                    self.include_in_feed = true;
                }
            }
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("template", &self.template),
            ("uri", &self.uri),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// A document whose header was read but not yet checked for required fields
/// or template existence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub front_matter: FrontMatter,
    pub body: String,
    pub source_path: PathBuf,
}

impl Document {
    pub fn validate(
        self,
        registry: &TemplateRegistry,
    ) -> std::result::Result<PageMetadata, Diagnostic> {
        let missing = self.front_matter.missing_fields();
        if !missing.is_empty() {
            return Err(Diagnostic::new(
                self.source_path,
                DocumentIssue::MissingFields(missing),
            ));
        }

        if !registry.contains(&self.front_matter.template) {
            return Err(Diagnostic::new(
                self.source_path,
                DocumentIssue::UnknownTemplate(self.front_matter.template),
            ));
        }

        let FrontMatter {
            title,
            description,
            template,
            uri,
            date,
            include_in_feed,
        } = self.front_matter;

        Ok(PageMetadata {
            uri,
            title,
            description,
            date,
            body: self.body,
            template,
            include_in_feed,
            source_path: self.source_path,
        })
    }
}

/// Splits content into header and body around the first delimiter. A
/// delimiter at the very start means an empty header, which counts as none.
pub fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    match content.find(HEADER_DELIMITER) {
        Some(position) if position > 0 => Some((
            &content[..position],
            &content[position + HEADER_DELIMITER.len()..],
        )),
        _ => None,
    }
}

pub fn parse_document(
    content: &str,
    source_path: &Path,
) -> std::result::Result<Document, Diagnostic> {
    let content = content.replace("\r\n", "\n");

    let (header, body) = split_front_matter(&content)
        .ok_or_else(|| Diagnostic::new(source_path, DocumentIssue::MissingHeader))?;

    Ok(Document {
        front_matter: FrontMatter::from_header(header),
        body: body.to_string(),
        source_path: source_path.to_path_buf(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Page(PageMetadata),
    Skipped(Diagnostic),
}

/// Reads and validates one source file. Failing to read the file is fatal;
/// anything wrong with its content only skips it. Bytes that are not valid
/// UTF-8 are replaced rather than rejected.
pub fn read_document(path: &Path, registry: &TemplateRegistry) -> Result<ParseOutcome> {
    let bytes = fs::read(path).io_context("reading source", path)?;
    let content = String::from_utf8_lossy(&bytes);

    let validated =
        parse_document(&content, path).and_then(|document| document.validate(registry));

    let outcome = match validated {
        Ok(page) => ParseOutcome::Page(page),
        Err(diagnostic) => ParseOutcome::Skipped(diagnostic),
    };

    Ok(outcome)
}
