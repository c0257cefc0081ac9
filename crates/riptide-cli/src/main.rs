//! Riptide CLI: drive the crawl engine in-process from the command line.
//!
//! No API server sits behind this binary — `crawl`/`resume` build a
//! `riptide_spider::Orchestrator` directly and run it to completion.

use clap::Parser;

mod commands;
mod error;
mod output;

use commands::crawl::CrawlArgs;
use commands::resume::ResumeArgs;
use commands::scope_test::ScopeTestArgs;
use error::ExitCode;

#[derive(Parser)]
#[command(name = "riptide")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Stealth web-crawling engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run a fresh crawl from one or more seed URLs
    Crawl(CrawlArgs),

    /// Reload a checkpoint and continue a crawl
    Resume(ResumeArgs),

    /// Offline scope-decision explainer (no fetching)
    ScopeTest(ScopeTestArgs),
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    let exit = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::UsageError
        }
    };
    std::process::exit(exit.as_i32());
}

fn init_logging() {
    let filter = std::env::var("RIPTIDE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .try_init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Crawl(args) => commands::crawl::execute(args).await,
        Commands::Resume(args) => commands::resume::execute(args).await,
        Commands::ScopeTest(args) => {
            commands::scope_test::execute(args)?;
            Ok(ExitCode::Success)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn crawl_requires_at_least_one_seed() {
        let result = Cli::try_parse_from(["riptide", "crawl"]);
        assert!(result.is_err());
    }

    #[test]
    fn crawl_parses_seed_and_flags() {
        let cli = Cli::parse_from([
            "riptide",
            "crawl",
            "https://example.com/",
            "--max-pages",
            "10",
            "--concurrency",
            "2",
            "--in-scope",
            "*.example.com",
        ]);
        match cli.command {
            Commands::Crawl(args) => {
                assert_eq!(args.seeds, vec!["https://example.com/".to_string()]);
                assert_eq!(args.options.max_pages, Some(10));
                assert_eq!(args.options.concurrency, 2);
                assert_eq!(args.options.in_scope, vec!["*.example.com".to_string()]);
            }
            _ => panic!("expected Crawl command"),
        }
    }

    #[test]
    fn scope_test_requires_test_urls() {
        let result = Cli::try_parse_from(["riptide", "scope-test"]);
        assert!(result.is_err());
    }
}
