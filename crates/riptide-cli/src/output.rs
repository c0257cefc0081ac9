//! Terminal output helpers and result-export formats.

use anyhow::{bail, Result};
use riptide_types::PageRecord;

pub fn print_info(msg: &str) {
    eprintln!("{msg}");
}

pub fn print_success(msg: &str) {
    eprintln!("\u{2713} {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("\u{2717} {msg}");
}

/// Output format for the crawl summary printed to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFormat {
    Text,
    Json,
}

impl SummaryFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("unknown output format: {other} (expected text or json)"),
        }
    }
}

pub fn print_summary(records: &[PageRecord], format: SummaryFormat) {
    match format {
        SummaryFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(records) {
                println!("{json}");
            }
        }
        SummaryFormat::Text => {
            let successful = records.iter().filter(|r| r.success).count();
            let failed = records.len() - successful;
            println!("Crawled {} page(s)", records.len());
            println!("  Successful: {successful}");
            println!("  Failed: {failed}");
            for record in records {
                let status_icon = if record.success { "\u{2713}" } else { "\u{2717}" };
                println!(
                    "  {status_icon} {} (depth {}, {} link(s))",
                    record.url.as_str(),
                    record.depth,
                    record.discovered_links.len()
                );
            }
        }
    }
}

pub fn truncate_text(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
