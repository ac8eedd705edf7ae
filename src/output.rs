use std::borrow::Cow;
use std::sync::LazyLock;

use anyhow::Context as _;
use regex::Regex;

use crate::formats::ExtractionResult;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[;\d]*m").expect("valid ansi escape regex"));

pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}

/// Text written to stdout: the passage Markdown, or the whole result as JSON.
pub fn render(result: &ExtractionResult, json: bool) -> anyhow::Result<String> {
    if json {
        return serde_json::to_string_pretty(result).context("serialize extraction result");
    }
    Ok(strip_ansi(&result.passage_markdown).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(markdown: &str) -> ExtractionResult {
        ExtractionResult {
            title: "Chapter 1".to_owned(),
            version_tag: "NKJV".to_owned(),
            passage_markdown: markdown.to_owned(),
        }
    }

    #[test]
    fn strip_ansi_removes_color_codes() {
        assert_eq!(strip_ansi("\x1b[31mred\x1b[0m plain \x1b[1;32mbold\x1b[m"), "red plain bold");
        assert!(matches!(strip_ansi("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn render_prints_markdown_by_default() -> anyhow::Result<()> {
        let rendered = render(&result("## Chapter 1\n\n###### v1\n\x1b[1mText\x1b[0m"), false)?;
        assert_eq!(rendered, "## Chapter 1\n\n###### v1\nText");
        Ok(())
    }

    #[test]
    fn render_json_keeps_every_field() -> anyhow::Result<()> {
        let original = result("###### v1\nText");
        let rendered = render(&original, true)?;
        let parsed: ExtractionResult = serde_json::from_str(&rendered)?;
        assert_eq!(parsed, original);
        assert!(rendered.contains("\"version_tag\": \"NKJV\""));
        Ok(())
    }
}
