/// Fatal input errors raised by the passage extractor.
///
/// Missing titles, missing version markers and unreadable verse numbers are
/// not errors; they fall back to documented defaults.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("passage document is empty")]
    EmptyDocument,
    #[error("no passage headers or verses found in document")]
    NoPassage,
}
