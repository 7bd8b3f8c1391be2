//! courier - catalog を取得して表示する CLI
//!
//! 流れ: 引数 → Transport / Session の組み立て → pipeline (Task) → run → 表示
//! 結果なし（Absence）は空行として表示する。理由は tracing の warn に出る。

mod catalog;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use courier_core::impls::TransportConfig;
use courier_core::{LiveSession, ReqwestTransport, Session};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::catalog::Catalog;

/// Fetch and print a collections/episodes catalog
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding collections.json and episodes.json
    #[arg(long, env = "COURIER_BASE_URL")]
    base_url: Url,

    /// User-Agent header sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Episode titles of one collection, joined with ","
    Titles {
        /// Collection id (defaults to the first collection)
        #[arg(long)]
        collection: Option<String>,
    },

    /// Every collection title, one per line
    Collections,

    /// Episode count per collection
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // (A) Transport と Session
    let mut config = TransportConfig::default();
    if let Some(user_agent) = cli.user_agent {
        config.user_agent = user_agent;
    }
    let transport = ReqwestTransport::with_config(&config).context("building HTTP client")?;
    let session: Arc<dyn Session> = Arc::new(LiveSession::new(transport));

    let catalog = Catalog::new(&cli.base_url)
        .with_context(|| format!("invalid base url: {}", cli.base_url))?;
    tracing::info!(
        collections = %catalog.collections().request(),
        episodes = %catalog.episodes().request(),
        command = ?cli.command,
        "fetching catalog"
    );

    // (B) pipeline を組んで実行、(C) 表示
    match cli.command {
        Command::Titles { collection } => {
            let titles = catalog::episode_titles(session, &catalog, collection).run().await;
            println!("{}", titles.unwrap_or_default());
        }
        Command::Collections => {
            let titles = catalog::collection_titles(session, &catalog).run().await;
            print_lines(titles);
        }
        Command::Summary => {
            let lines = catalog::summary(session, &catalog).run().await;
            print_lines(lines);
        }
    }
    Ok(())
}

fn print_lines(lines: Option<Vec<String>>) {
    match lines {
        Some(lines) => lines.iter().for_each(|line| println!("{line}")),
        None => println!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["courier", "--base-url", "https://h.test/", "titles"], None)]
    #[case(&["courier", "--base-url", "https://h.test/", "titles", "--collection", "test"], Some("test"))]
    fn parses_titles(#[case] args: &[&str], #[case] expected: Option<&str>) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.base_url.as_str(), "https://h.test/");
        match cli.command {
            Command::Titles { collection } => assert_eq!(collection.as_deref(), expected),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(Cli::try_parse_from(["courier", "--base-url", "not a url", "summary"]).is_err());
    }
}
