use serde::{Deserialize, Serialize};

/// Raw passage HTML as handed over by the fetch step.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub html: String,
    /// URL or file path, used for diagnostics only.
    pub source: String,
}

impl RawDocument {
    pub fn new(html: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: String,
    pub version_tag: String,
    pub passage_markdown: String,
}
