use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

use crate::cli::Cli;
use crate::formats::RawDocument;

pub const DEFAULT_BASE_URL: &str = "https://www.biblegateway.com/passage/";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl FetchConfig {
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("PASSAGEMD_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        let user_agent = std::env::var("PASSAGEMD_USER_AGENT")
            .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_owned());
        Self {
            base_url,
            user_agent,
        }
    }
}

/// Print-interface URL for a passage lookup.
pub fn passage_url(base_url: &str, reference: &str, version: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(base_url).with_context(|| format!("parse base url: {base_url}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("base url must be http/https: {url}");
    }
    url.query_pairs_mut()
        .clear()
        .append_pair("search", reference)
        .append_pair("version", version)
        .append_pair("interface", "print");
    Ok(url)
}

/// Reads the local snapshot when `--test` is given, otherwise fetches online.
pub async fn load(cli: &Cli, config: &FetchConfig) -> anyhow::Result<RawDocument> {
    if let Some(path) = cli.test.as_deref() {
        tracing::info!(path, "using local file");
        return read_local(path).await;
    }

    let reference = cli
        .reference
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("reference must be provided"))?;
    fetch_passage(config, reference, &cli.version).await
}

pub async fn read_local(path: &str) -> anyhow::Result<RawDocument> {
    let html = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read local passage: {path}"))?;
    Ok(RawDocument::new(html, path))
}

pub async fn fetch_passage(
    config: &FetchConfig,
    reference: &str,
    version: &str,
) -> anyhow::Result<RawDocument> {
    let url = passage_url(&config.base_url, reference, version)?;
    tracing::info!(%url, "fetching passage");

    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        .build()
        .context("build http client")?;

    let response = client
        .get(url.clone())
        .header(USER_AGENT, &config.user_agent)
        .header(ACCEPT, "text/html,application/xhtml+xml")
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("received HTTP response code {}", status.as_u16());
    }

    let html = response
        .text()
        .await
        .with_context(|| format!("read response body: {url}"))?;
    tracing::debug!(bytes = html.len(), "fetched passage");

    Ok(RawDocument::new(html, url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passage_url_uses_print_interface() -> anyhow::Result<()> {
        let url = passage_url(DEFAULT_BASE_URL, "John 3:16-18", "NKJV")?;
        assert_eq!(
            url.as_str(),
            "https://www.biblegateway.com/passage/?search=John+3%3A16-18&version=NKJV&interface=print"
        );
        Ok(())
    }

    #[test]
    fn passage_url_replaces_existing_query() -> anyhow::Result<()> {
        let url = passage_url("http://127.0.0.1:8080/passage/?stale=1", "Ps 23", "ESV")?;
        assert_eq!(url.query(), Some("search=Ps+23&version=ESV&interface=print"));
        Ok(())
    }

    #[test]
    fn passage_url_rejects_non_http_base() {
        assert!(passage_url("file:///tmp/passage", "Ps 23", "ESV").is_err());
        assert!(passage_url("not a url", "Ps 23", "ESV").is_err());
    }
}
