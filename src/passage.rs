use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::cleaner::{self, CleanOptions};
use crate::error::ExtractError;
use crate::formats::{ExtractionResult, RawDocument};

pub const NO_TITLE: &str = "No title found";
pub const UNKNOWN_VERSION: &str = "Unknown version";

static PASSAGE_UNITS: LazyLock<Selector> =
    LazyLock::new(|| selector(".passage-content .text, h3 .text"));
static VERSE_NUMBER: LazyLock<Selector> = LazyLock::new(|| selector(".versenum"));
static VERSION_MARKER: LazyLock<Selector> = LazyLock::new(|| {
    selector(r#".passage-content[class*="version-"], .passage-content [class*="version-"]"#)
});
static FOOTNOTE_MARKERS: LazyLock<Selector> = LazyLock::new(|| selector("sup.footnote"));
static FOOTNOTE_ITEMS: LazyLock<Selector> = LazyLock::new(|| selector(".footnotes li"));
static FOOTNOTE_TEXT: LazyLock<Selector> = LazyLock::new(|| selector(".footnote-text"));
static CROSSREF_ITEMS: LazyLock<Selector> = LazyLock::new(|| selector(".crossrefs li"));
static PUBLISHER_INFO: LazyLock<Selector> =
    LazyLock::new(|| selector(".publisher-info-bottom"));

static VERSE_NUMERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+[a-z]?(?:[-–]\d+[a-z]?)?$").expect("valid verse numeral regex")
});
static VERSION_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^version-(\w+)$").expect("valid version class regex"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid css selector")
}

/// Output switches for [`extract_with`].
///
/// The default reproduces the plain shape: headers, verse-number lines, one
/// line per unit, and no notes or copyright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Emit `## header` lines. Headers still reset numbering when disabled.
    pub headers: bool,
    /// Emit `###### v<n>` lines.
    pub numbering: bool,
    /// Put continuation units on their own line; when `false` they are joined
    /// to the previous text line with a space.
    pub newline: bool,
    /// Render words of Jesus as `**bold**`.
    pub bold_words: bool,
    /// Keep `[^x]` footnote references and append a footnotes block.
    pub footnotes: bool,
    /// Append a cross-references block.
    pub crossrefs: bool,
    /// Append the publisher's copyright notice.
    pub copyright: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            headers: true,
            numbering: true,
            newline: true,
            bold_words: false,
            footnotes: false,
            crossrefs: false,
            copyright: false,
        }
    }
}

impl ExtractOptions {
    #[must_use]
    pub fn clean_options(&self) -> CleanOptions {
        CleanOptions {
            bold_words: self.bold_words,
            footnote_refs: self.footnotes,
        }
    }
}

/// A header or verse node of the passage, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralUnit {
    Header {
        inner_html: String,
    },
    Verse {
        inner_html: String,
        /// Numeral of a nested `.versenum` marker, when it is a valid numeral.
        number: Option<String>,
    },
}

impl StructuralUnit {
    /// A `span` directly inside an `h3` is a header; anything else is verse text.
    pub fn classify(element: ElementRef<'_>) -> Self {
        let inner_html = element.inner_html();
        if is_header(element) {
            return Self::Header { inner_html };
        }
        Self::Verse {
            inner_html,
            number: explicit_verse_number(element),
        }
    }
}

fn is_header(element: ElementRef<'_>) -> bool {
    element.value().name() == "span"
        && element
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|parent| parent.value().name() == "h3")
}

fn explicit_verse_number(element: ElementRef<'_>) -> Option<String> {
    let marker = element.select(&VERSE_NUMBER).next()?;
    let raw = marker.text().collect::<String>();
    let number = raw.trim();
    if VERSE_NUMERAL.is_match(number) {
        return Some(number.to_owned());
    }
    tracing::debug!(marker = number, "ignoring non-numeric verse marker");
    None
}

/// Collects the header and verse units of a parsed passage page.
pub fn structural_units(document: &Html) -> Vec<StructuralUnit> {
    document
        .select(&PASSAGE_UNITS)
        .map(StructuralUnit::classify)
        .collect()
}

/// Per-section verse numbering state. Every section starts out awaiting its
/// first number, since sources leave the leading "1" implicit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerseNumberState {
    #[default]
    AwaitingFirstVerseNumber,
    NumbersResolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Header(String),
    VerseNumber(String),
    Text(String),
}

impl VerseNumberState {
    /// Interprets one unit, appending its lines, and returns the next state.
    pub fn step(
        self,
        unit: &StructuralUnit,
        clean: &CleanOptions,
        lines: &mut Vec<Line>,
    ) -> Self {
        match unit {
            StructuralUnit::Header { inner_html } => {
                lines.push(Line::Header(cleaner::clean_with(inner_html, clean)));
                Self::AwaitingFirstVerseNumber
            }
            StructuralUnit::Verse { inner_html, number } => {
                let text = cleaner::clean_with(inner_html, clean);
                match (number, self) {
                    (Some(number), _) => {
                        lines.push(Line::VerseNumber(number.clone()));
                        push_text(lines, strip_verse_number(&text, number));
                    }
                    (None, Self::AwaitingFirstVerseNumber) => {
                        lines.push(Line::VerseNumber("1".to_owned()));
                        push_text(lines, &text);
                    }
                    (None, Self::NumbersResolved) => push_text(lines, &text),
                }
                Self::NumbersResolved
            }
        }
    }
}

fn push_text(lines: &mut Vec<Line>, text: &str) {
    if !text.is_empty() {
        lines.push(Line::Text(text.to_owned()));
    }
}

/// Drops the verse number the source repeats as leading visible text.
fn strip_verse_number<'a>(text: &'a str, number: &str) -> &'a str {
    match text.strip_prefix(number) {
        Some(rest) if !rest.starts_with(|c: char| c.is_ascii_digit()) => rest.trim_start(),
        _ => text,
    }
}

/// Runs the numbering state machine over the units of one document.
pub fn interpret(units: &[StructuralUnit], clean: &CleanOptions) -> Vec<Line> {
    let mut lines = Vec::with_capacity(units.len() * 2);
    let mut state = VerseNumberState::default();
    for unit in units {
        state = state.step(unit, clean, &mut lines);
    }
    lines
}

/// Lays lines out as Markdown. Headers and verse-number lines open a new
/// block; the result is not trimmed.
pub fn render(lines: &[Line], options: &ExtractOptions) -> String {
    let mut out = String::new();
    let mut after_text = false;

    for line in lines {
        match line {
            Line::Header(text) => {
                after_text = false;
                if !options.headers || text.is_empty() {
                    continue;
                }
                out.push_str("\n## ");
                out.push_str(text);
                out.push('\n');
            }
            Line::VerseNumber(number) => {
                after_text = false;
                if !options.numbering {
                    continue;
                }
                out.push_str("\n###### v");
                out.push_str(number);
                out.push('\n');
            }
            Line::Text(text) => {
                if after_text && !options.newline {
                    out.pop();
                    out.push(' ');
                }
                out.push_str(text);
                out.push('\n');
                after_text = true;
            }
        }
    }

    out
}

/// Converts a passage page into Markdown using the default options.
pub fn extract(raw_html: &str) -> Result<ExtractionResult, ExtractError> {
    extract_with(raw_html, &ExtractOptions::default())
}

pub fn extract_document(
    document: &RawDocument,
    options: &ExtractOptions,
) -> Result<ExtractionResult, ExtractError> {
    let span = tracing::debug_span!("extract", source = %document.source);
    let _guard = span.enter();
    extract_with(&document.html, options)
}

pub fn extract_with(
    raw_html: &str,
    options: &ExtractOptions,
) -> Result<ExtractionResult, ExtractError> {
    if raw_html.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }

    let document = Html::parse_document(raw_html);
    if !document.errors.is_empty() {
        tracing::trace!(
            errors = document.errors.len(),
            "html parser recovered from malformed markup"
        );
    }

    let units = structural_units(&document);
    if units.is_empty() {
        return Err(ExtractError::NoPassage);
    }

    let clean = options.clean_options();
    let lines = interpret(&units, &clean);
    let mut passage = render(&lines, options);
    for block in note_blocks(&document, options) {
        passage.push('\n');
        passage.push_str(&block);
        passage.push('\n');
    }

    let title = title(&lines);
    let version_tag = version_tag(&document);
    tracing::debug!(units = units.len(), %title, %version_tag, "extracted passage");

    Ok(ExtractionResult {
        title,
        version_tag,
        passage_markdown: passage.trim().to_owned(),
    })
}

fn title(lines: &[Line]) -> String {
    let first_header = lines.iter().find_map(|line| match line {
        Line::Header(text) => Some(text),
        _ => None,
    });
    match first_header {
        Some(text) if !text.is_empty() => text.clone(),
        _ => {
            tracing::debug!("no passage header; using title fallback");
            NO_TITLE.to_owned()
        }
    }
}

fn version_tag(document: &Html) -> String {
    let tag = document
        .select(&VERSION_MARKER)
        .flat_map(|element| element.value().classes())
        .find_map(|class| VERSION_CLASS.captures(class).map(|caps| caps[1].to_owned()));
    tag.unwrap_or_else(|| {
        tracing::debug!("no version marker; using version fallback");
        UNKNOWN_VERSION.to_owned()
    })
}

/// Blocks appended after the passage, in output order.
fn note_blocks(document: &Html, options: &ExtractOptions) -> Vec<String> {
    let clean = CleanOptions {
        footnote_refs: false,
        ..options.clean_options()
    };
    let mut blocks = Vec::new();
    if options.footnotes
        && let Some(block) = footnotes_block(document, &clean)
    {
        blocks.push(block);
    }
    if options.crossrefs
        && let Some(block) = crossrefs_block(document, &clean)
    {
        blocks.push(block);
    }
    if options.copyright
        && let Some(notice) = copyright_notice(document, &clean)
    {
        blocks.push(notice);
    }
    blocks
}

fn footnotes_block(document: &Html, clean: &CleanOptions) -> Option<String> {
    let labels = document
        .select(&FOOTNOTE_MARKERS)
        .filter_map(|marker| {
            let id = marker.value().attr("data-fn")?.trim_start_matches('#');
            Some((id.to_owned(), cleaner::footnote_label(marker)?))
        })
        .collect::<HashMap<_, _>>();

    let mut lines = Vec::new();
    for (index, item) in document.select(&FOOTNOTE_ITEMS).enumerate() {
        let source = item.select(&FOOTNOTE_TEXT).next().unwrap_or(item);
        let text = cleaner::clean_with(&source.inner_html(), clean);
        if text.is_empty() {
            continue;
        }
        let label = item
            .value()
            .id()
            .and_then(|id| labels.get(id).cloned())
            .unwrap_or_else(|| alphabetic_label(index));
        lines.push(format!("[^{label}]: {text}"));
    }

    if lines.is_empty() {
        tracing::debug!("footnotes requested but none found");
        return None;
    }
    Some(format!("### Footnotes\n{}", lines.join("\n")))
}

fn crossrefs_block(document: &Html, clean: &CleanOptions) -> Option<String> {
    let lines = document
        .select(&CROSSREF_ITEMS)
        .map(|item| cleaner::clean_with(&item.inner_html(), clean))
        .filter(|text| !text.is_empty())
        .map(|text| format!("- {text}"))
        .collect::<Vec<_>>();

    if lines.is_empty() {
        tracing::debug!("cross references requested but none found");
        return None;
    }
    Some(format!("### Cross references\n{}", lines.join("\n")))
}

fn copyright_notice(document: &Html, clean: &CleanOptions) -> Option<String> {
    let notice = document
        .select(&PUBLISHER_INFO)
        .next()
        .map(|element| cleaner::clean_with(&element.inner_html(), clean))
        .filter(|text| !text.is_empty());
    if notice.is_none() {
        tracing::debug!("copyright requested but no publisher info found");
    }
    notice
}

/// Footnote letters as the source assigns them: a..z, aa..zz, aaa, ...
fn alphabetic_label(index: usize) -> String {
    let mut remaining = index + 1;
    let mut letters = Vec::new();
    while remaining > 0 {
        remaining -= 1;
        letters.push(char::from(b'a' + (remaining % 26) as u8));
        remaining /= 26;
    }
    letters.iter().rev().collect()
}
