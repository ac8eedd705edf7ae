use clap::Parser;

use crate::passage::ExtractOptions;

pub const DEFAULT_VERSION: &str = "NKJV";

/// Fetch a Bible passage and print it as Markdown.
// `--version` selects the Bible version, so clap's own version flag is off.
#[derive(Debug, Parser)]
#[command(author, about, disable_version_flag = true)]
pub struct Cli {
    /// Passage reference, e.g. "John 3:16-18".
    #[arg(required_unless_present = "test")]
    pub reference: Option<String>,

    /// Render words of Jesus in bold.
    #[arg(short = 'b', long)]
    pub boldwords: bool,

    /// Include the copyright notice.
    #[arg(short = 'c', long)]
    pub copyright: bool,

    /// Leave out section headers.
    #[arg(short = 'e', long)]
    pub no_headers: bool,

    /// Include footnotes.
    #[arg(short = 'f', long)]
    pub footnotes: bool,

    /// Display verbose output (debug logs on stderr).
    #[arg(short = 'i', long)]
    pub info: bool,

    /// Join continuation lines of a verse instead of starting new lines.
    #[arg(short = 'l', long)]
    pub no_newline: bool,

    /// Leave out verse numbers.
    #[arg(short = 'n', long)]
    pub no_numbering: bool,

    /// Include cross-references.
    #[arg(short = 'r', long)]
    pub crossrefs: bool,

    /// Use a local HTML file instead of fetching online.
    #[arg(short = 't', long, value_name = "FILE")]
    pub test: Option<String>,

    /// Bible version.
    #[arg(short = 'v', long, default_value = DEFAULT_VERSION)]
    pub version: String,

    /// Print title, version and passage as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    #[must_use]
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            headers: !self.no_headers,
            numbering: !self.no_numbering,
            newline: !self.no_newline,
            bold_words: self.boldwords,
            footnotes: self.footnotes,
            crossrefs: self.crossrefs,
            copyright: self.copyright,
        }
    }
}
