//! Drives a `PatternDetector` over one input stream.
//!
//! `Scanner` is the synchronous bookkeeping around the detector: it numbers
//! steps (starting at 1), decides which steps become `ScanEvent`s, counts
//! labels and records pattern runs. `scan_stream` feeds it from an async line
//! reader and writes records as they are produced.
//!
//! Memory stays fixed however long the stream is: only the longest run, a run
//! count and the last `RETAINED_RUNS` runs are kept.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use pattern_detector::{PatternDetector, PatternState};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::error::{Result, ScanError};
use crate::output::{write_record, OutputRecord};
use crate::settings::{EmitMode, ScanSettings};
use crate::tokenizer::{LineToken, TokenParser};

/// Number of most recent runs kept for the summary.
pub const RETAINED_RUNS: usize = 64;

// ============ Records ============

/// One emitted detector step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanEvent {
    pub source: String,
    pub step: u64,
    pub token: u64,
    pub state: PatternState,
    pub period: usize,
    pub previous_period: usize,
}

/// A stretch of consecutive steps reporting the same non-zero period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternRun {
    pub period: usize,
    pub start_step: u64,
    /// Last step of the run; `None` if the run was still active at end of input
    pub end_step: Option<u64>,
    pub length: u64,
}

/// Totals for one input stream
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub source: String,
    pub steps: u64,
    pub lines_read: u64,
    pub invalid_lines: u64,
    pub transitions: BTreeMap<PatternState, u64>,
    /// Every run seen, including those no longer in `runs`
    pub run_count: u64,
    /// The most recent runs, oldest first, at most `RETAINED_RUNS`
    pub runs: Vec<PatternRun>,
    pub longest_run: Option<PatternRun>,
    pub final_period: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

// ============ Scanner ============

pub struct Scanner<'d> {
    source: String,
    detector: &'d mut PatternDetector,
    emit: EmitMode,
    steps: u64,
    lines_read: u64,
    invalid_lines: u64,
    transitions: BTreeMap<PatternState, u64>,
    run_count: u64,
    runs: VecDeque<PatternRun>,
    longest_run: Option<PatternRun>,
    current_run: Option<PatternRun>,
    started_at: DateTime<Utc>,
}

impl<'d> Scanner<'d> {
    /// Start scanning `source`. The detector is reset first.
    pub fn new(source: impl Into<String>, detector: &'d mut PatternDetector, emit: EmitMode) -> Self {
        detector.reset();
        Self {
            source: source.into(),
            detector,
            emit,
            steps: 0,
            lines_read: 0,
            invalid_lines: 0,
            transitions: BTreeMap::new(),
            run_count: 0,
            runs: VecDeque::with_capacity(RETAINED_RUNS),
            longest_run: None,
            current_run: None,
            started_at: Utc::now(),
        }
    }

    /// Feed one token; returns an event if this step should be reported.
    pub fn feed(&mut self, token: u64) -> Option<ScanEvent> {
        self.steps += 1;
        let previous_period = self.detector.period();
        let state = self.detector.step(token);
        let period = self.detector.period();

        *self.transitions.entry(state).or_insert(0) += 1;
        self.track_run(state, period);

        let emit = match self.emit {
            EmitMode::All => true,
            EmitMode::Transitions => state.is_change(),
        };
        emit.then(|| ScanEvent {
            source: self.source.clone(),
            step: self.steps,
            token,
            state,
            period,
            previous_period,
        })
    }

    fn track_run(&mut self, state: PatternState, period: usize) {
        match state {
            PatternState::NoPattern => {}
            PatternState::PatternUnchanged => {
                if let Some(run) = self.current_run.as_mut() {
                    run.length += 1;
                }
            }
            PatternState::PatternStarted
            | PatternState::PatternStopped
            | PatternState::PatternChangedSizes => {
                if let Some(mut run) = self.current_run.take() {
                    run.end_step = Some(self.steps - 1);
                    self.close_run(run);
                }
                if period > 0 {
                    self.current_run = Some(PatternRun {
                        period,
                        start_step: self.steps,
                        end_step: None,
                        length: 1,
                    });
                }
            }
        }
    }

    fn close_run(&mut self, run: PatternRun) {
        self.run_count += 1;

        // First of the longest runs wins
        let is_longer = self
            .longest_run
            .as_ref()
            .map_or(true, |longest| run.length > longest.length);
        if is_longer {
            self.longest_run = Some(run.clone());
        }

        if self.runs.len() == RETAINED_RUNS {
            self.runs.pop_front();
        }
        self.runs.push_back(run);
    }

    pub fn record_line(&mut self) {
        self.lines_read += 1;
    }

    pub fn record_invalid_line(&mut self) {
        self.invalid_lines += 1;
    }

    /// Close the scan and produce its summary.
    pub fn finish(mut self) -> ScanSummary {
        if let Some(run) = self.current_run.take() {
            self.close_run(run);
        }

        ScanSummary {
            source: self.source,
            steps: self.steps,
            lines_read: self.lines_read,
            invalid_lines: self.invalid_lines,
            transitions: self.transitions,
            run_count: self.run_count,
            runs: self.runs.into(),
            longest_run: self.longest_run,
            final_period: self.detector.period(),
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

// ============ Stream Scanning ============

/// Scan every line of `reader`, writing events and the final summary to
/// `writer` in the configured output format.
///
/// A line that is not valid UTF-8 is treated like any other unparsable line.
pub async fn scan_stream<R, W>(
    source: &str,
    mut reader: R,
    writer: &mut W,
    detector: &mut PatternDetector,
    parser: &TokenParser,
    settings: &ScanSettings,
) -> Result<ScanSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut scanner = Scanner::new(source, detector, settings.emit);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        scanner.record_line();
        let line_number = scanner.lines_read;

        let parsed = match std::str::from_utf8(strip_line_ending(&buf)) {
            Ok(line) => parser.parse_line(line),
            Err(_) => LineToken::Invalid,
        };

        match parsed {
            LineToken::Token(token) => {
                if let Some(event) = scanner.feed(token) {
                    write_record(writer, &OutputRecord::Event(&event), settings.output).await?;
                }
            }
            LineToken::Ignored => {}
            LineToken::Invalid => {
                let text = String::from_utf8_lossy(strip_line_ending(&buf)).into_owned();
                if settings.strict {
                    writer.flush().await?;
                    return Err(ScanError::InvalidToken {
                        line: line_number,
                        text,
                    });
                }
                warn!(source, line = line_number, text = %text, "Skipping unparsable line");
                scanner.record_invalid_line();
            }
        }
    }

    let summary = scanner.finish();
    write_record(writer, &OutputRecord::Summary(&summary), settings.output).await?;
    writer.flush().await?;

    info!(
        source,
        steps = summary.steps,
        runs = summary.run_count,
        invalid_lines = summary.invalid_lines,
        "Scan finished"
    );
    Ok(summary)
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
