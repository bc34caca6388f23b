//! Rendering of scan records.
//!
//! `jsonl` writes one JSON object per line with a `kind` tag (`event` or
//! `summary`). `text` writes aligned human-readable lines.

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::scanner::{ScanEvent, ScanSummary};
use crate::settings::OutputFormat;

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputRecord<'a> {
    Event(&'a ScanEvent),
    Summary(&'a ScanSummary),
}

/// Render a record as a single output chunk (without trailing newline).
pub fn render(record: &OutputRecord<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Jsonl => Ok(serde_json::to_string(record)?),
        OutputFormat::Text => Ok(match record {
            OutputRecord::Event(event) => render_event_text(event),
            OutputRecord::Summary(summary) => render_summary_text(summary),
        }),
    }
}

pub async fn write_record<W>(writer: &mut W, record: &OutputRecord<'_>, format: OutputFormat) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut rendered = render(record, format)?;
    rendered.push('\n');
    writer.write_all(rendered.as_bytes()).await?;
    Ok(())
}

fn render_event_text(event: &ScanEvent) -> String {
    format!(
        "{}:{:>8}  {:<22} period={:<4} previous={:<4} token={:#x}",
        event.source, event.step, event.state, event.period, event.previous_period, event.token
    )
}

fn render_summary_text(summary: &ScanSummary) -> String {
    let mut lines = vec![format!(
        "== {}: {} steps, {} lines, {} invalid, final period {}",
        summary.source, summary.steps, summary.lines_read, summary.invalid_lines, summary.final_period
    )];

    for (state, count) in &summary.transitions {
        lines.push(format!("   {:<22} {}", state, count));
    }

    if summary.run_count > summary.runs.len() as u64 {
        lines.push(format!(
            "   {} runs, last {} shown",
            summary.run_count,
            summary.runs.len()
        ));
    }

    for run in &summary.runs {
        let end = run
            .end_step
            .map(|step| step.to_string())
            .unwrap_or_else(|| "end".to_string());
        lines.push(format!(
            "   run period={:<4} steps {}..{} ({} steps)",
            run.period, run.start_step, end, run.length
        ));
    }

    match &summary.longest_run {
        Some(run) => lines.push(format!(
            "   longest: period {} for {} steps from step {}",
            run.period, run.length, run.start_step
        )),
        None => lines.push("   no pattern found".to_string()),
    }

    lines.join("\n")
}
