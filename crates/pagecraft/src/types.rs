use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

/// A source document that passed header parsing and validation against the
/// template registry. Only these reach the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub uri: String,
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub body: String,
    pub template: String,
    pub include_in_feed: bool,
    #[serde(skip)]
    pub source_path: PathBuf,
}
