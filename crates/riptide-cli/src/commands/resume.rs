//! `resume` command: reload a checkpoint and continue the crawl from
//! wherever it left off.

use crate::commands::CrawlOptions;
use crate::error::{exit_code_for, ExitCode};
use crate::output::{print_info, print_success, print_summary, SummaryFormat};
use anyhow::{bail, Context, Result};
use clap::Args;
use riptide_scope::ScopeEngine;
use riptide_spider::{CheckpointSink, JsonFileSink, SpiderBuilder};

#[derive(Args, Clone, Debug)]
pub struct ResumeArgs {
    /// Checkpoint id to resume (the file `<cache-dir>/<id>.json`)
    pub checkpoint_id: String,

    #[command(flatten)]
    pub options: CrawlOptions,

    /// Output format for the printed summary
    #[arg(long, short = 'o', default_value = "text")]
    pub output_format: String,
}

pub async fn execute(args: ResumeArgs) -> Result<ExitCode> {
    let format = SummaryFormat::parse(&args.output_format)?;
    args.options.warn_stub_flags();

    let sink = JsonFileSink::new(args.options.cache_dir.clone());
    let Some(state) = sink
        .load(&args.checkpoint_id)
        .await
        .with_context(|| format!("failed to load checkpoint {}", args.checkpoint_id))?
    else {
        bail!(
            "no checkpoint named {:?} in {}",
            args.checkpoint_id,
            args.options.cache_dir.display()
        );
    };

    // Scope is restored from the checkpoint itself, not re-derived from
    // --in-scope/--out-scope, so a resumed crawl keeps exactly the rules
    // it started with.
    let scope = ScopeEngine::from_rules(state.scope_rules.clone());
    let config = args.options.build_config();

    let orchestrator = match SpiderBuilder::new(config).with_scope(scope).build().await {
        Ok(o) => o,
        Err(err) => {
            print_info(&format!("failed to initialize resume: {err}"));
            return Ok(ExitCode::InitFailure);
        }
    };

    orchestrator
        .restore(state)
        .await
        .context("failed to restore checkpoint into the frontier")?;

    print_info(&format!("resuming checkpoint {}...", args.checkpoint_id));

    let records = match orchestrator.run(&[]).await {
        Ok(records) => records,
        Err(err) => {
            print_info(&format!("resumed crawl did not complete: {err}"));
            return Ok(exit_code_for(&err));
        }
    };

    sink.save(&args.checkpoint_id, &orchestrator.snapshot().await)
        .await
        .context("failed to save checkpoint after resume")?;

    if let Some(path) = &args.options.output {
        let json = serde_json::to_string_pretty(&records)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        print_success(&format!("results written to {}", path.display()));
    }

    print_summary(&records, format);
    Ok(ExitCode::Success)
}
