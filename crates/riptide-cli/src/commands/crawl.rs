//! `crawl` command: run a fresh crawl from one or more seed URLs, taking
//! periodic checkpoints and printing/saving the final page records.

use crate::commands::CrawlOptions;
use crate::error::{exit_code_for, ExitCode};
use crate::output::{print_info, print_success, print_summary, SummaryFormat};
use anyhow::{Context, Result};
use clap::Args;
use riptide_spider::{CheckpointSink, JsonFileSink, Orchestrator, SpiderBuilder};
use riptide_types::PageRecord;
use std::time::Duration;

const CHECKPOINT_ID: &str = "crawl";

#[derive(Args, Clone, Debug)]
pub struct CrawlArgs {
    /// Seed URLs to start crawling from
    #[arg(required = true)]
    pub seeds: Vec<String>,

    #[command(flatten)]
    pub options: CrawlOptions,

    /// Output format for the printed summary
    #[arg(long, short = 'o', default_value = "text")]
    pub output_format: String,
}

pub async fn execute(args: CrawlArgs) -> Result<ExitCode> {
    let format = SummaryFormat::parse(&args.output_format)?;
    args.options.warn_stub_flags();

    let scope = args.options.build_scope()?;
    let config = args.options.build_config();

    let orchestrator = match SpiderBuilder::new(config).with_scope(scope).build().await {
        Ok(o) => o,
        Err(err) => {
            print_info(&format!("failed to initialize crawl: {err}"));
            return Ok(ExitCode::InitFailure);
        }
    };

    let sink = JsonFileSink::new(args.options.cache_dir.clone());

    print_info(&format!("crawling {} seed(s)...", args.seeds.len()));

    let records = match run_with_checkpoints(
        &orchestrator,
        &args.seeds,
        &sink,
        args.options.flush_every,
    )
    .await
    {
        Ok(records) => records,
        Err(err) => {
            if let Some(riptide_err) = err.downcast_ref::<riptide_types::RiptideError>() {
                print_info(&format!("crawl did not complete: {riptide_err}"));
                return Ok(exit_code_for(riptide_err));
            }
            return Err(err);
        }
    };

    sink.save(CHECKPOINT_ID, &orchestrator.snapshot().await)
        .await
        .context("failed to save final checkpoint")?;

    if let Some(path) = &args.options.output {
        let json = serde_json::to_string_pretty(&records)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        print_success(&format!("results written to {}", path.display()));
    }

    print_summary(&records, format);
    Ok(ExitCode::Success)
}

/// Drive the crawl to completion, periodically snapshotting and saving a
/// checkpoint every `flush_every` newly-fetched pages.
async fn run_with_checkpoints(
    orchestrator: &Orchestrator,
    seeds: &[String],
    sink: &JsonFileSink,
    flush_every: usize,
) -> Result<Vec<PageRecord>> {
    let run_fut = orchestrator.run(seeds);
    tokio::pin!(run_fut);

    let mut last_flushed = 0usize;
    let mut poll = tokio::time::interval(Duration::from_millis(250));

    loop {
        tokio::select! {
            result = &mut run_fut => return result.map_err(Into::into),
            _ = poll.tick() => {
                let fetched = orchestrator.metrics().pages_fetched() as usize;
                if flush_every > 0 && fetched.saturating_sub(last_flushed) >= flush_every {
                    last_flushed = fetched;
                    let state = orchestrator.snapshot().await;
                    sink.save(CHECKPOINT_ID, &state).await?;
                }
            }
        }
    }
}
