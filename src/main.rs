use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    let cli = passagemd::cli::Cli::parse();
    passagemd::logging::init(cli.info).context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    let config = passagemd::fetch::FetchConfig::from_env();
    let document = passagemd::fetch::load(&cli, &config)
        .await
        .context("load passage")?;

    let options = cli.extract_options();
    let result = passagemd::passage::extract_document(&document, &options)
        .with_context(|| format!("extract passage: {}", document.source))?;
    tracing::debug!(passage = %result.passage_markdown, "formatted passage");

    let rendered = passagemd::output::render(&result, cli.json).context("render output")?;
    println!("{rendered}");

    Ok(())
}
