use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid whitespace regex"));

/// Per-call knobs for [`clean_with`]. The default reproduces [`clean`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanOptions {
    /// Render `span.woj` (words of Jesus) as `**strong**` text.
    pub bold_words: bool,
    /// Keep `sup.footnote` markers as Markdown footnote references (`[^a]`).
    pub footnote_refs: bool,
}

/// How a single element of the fragment is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Inline {
    Drop,
    FootnoteRef(String),
    Emphasis,
    Strong,
    Plain,
}

/// Normalizes the inner markup of one structural unit into plain text.
///
/// Annotation markers (`<sup>`, `span.chapternum`) are removed with their
/// content, `<i>`/`<em>` become `*text*`, every other tag is stripped, and
/// whitespace runs collapse to one space.
#[must_use]
pub fn clean(inner_html: &str) -> String {
    clean_with(inner_html, &CleanOptions::default())
}

#[must_use]
pub fn clean_with(inner_html: &str, options: &CleanOptions) -> String {
    if inner_html.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(inner_html);
    let mut text = String::with_capacity(inner_html.len());
    write_children(fragment.root_element(), options, false, &mut text);
    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_owned()
}

fn write_children(
    element: ElementRef<'_>,
    options: &CleanOptions,
    in_emphasis: bool,
    out: &mut String,
) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };

        match classify(child, options) {
            Inline::Drop => {}
            Inline::FootnoteRef(label) => {
                out.push_str("[^");
                out.push_str(&label);
                out.push(']');
            }
            // Nested emphasis collapses into the outer span.
            Inline::Emphasis if !in_emphasis => write_wrapped(child, options, true, "*", out),
            Inline::Strong if !in_emphasis => write_wrapped(child, options, false, "**", out),
            Inline::Emphasis | Inline::Strong | Inline::Plain => {
                write_children(child, options, in_emphasis, out);
            }
        }
    }
}

/// Wraps the element's text in `marker`. Blank spans keep their whitespace
/// but get no markers.
fn write_wrapped(
    element: ElementRef<'_>,
    options: &CleanOptions,
    in_emphasis: bool,
    marker: &str,
    out: &mut String,
) {
    let mut inner = String::new();
    write_children(element, options, in_emphasis, &mut inner);
    if inner.trim().is_empty() {
        out.push_str(&inner);
        return;
    }
    out.push_str(marker);
    out.push_str(&inner);
    out.push_str(marker);
}

fn classify(element: ElementRef<'_>, options: &CleanOptions) -> Inline {
    let value = element.value();
    match value.name() {
        "sup" => {
            if options.footnote_refs && has_class(element, "footnote") {
                match footnote_label(element) {
                    Some(label) => Inline::FootnoteRef(label),
                    None => Inline::Drop,
                }
            } else {
                Inline::Drop
            }
        }
        "span" if has_class(element, "chapternum") => Inline::Drop,
        "span" if options.bold_words && has_class(element, "woj") => Inline::Strong,
        "i" | "em" => Inline::Emphasis,
        _ => Inline::Plain,
    }
}

fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// The visible letter of a footnote marker, e.g. `[a]` -> `a`.
pub(crate) fn footnote_label(element: ElementRef<'_>) -> Option<String> {
    let raw = element.text().collect::<String>();
    let label = raw
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim();
    if label.is_empty() {
        return None;
    }
    Some(label.to_owned())
}
