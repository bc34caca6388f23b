use std::io::Write;
use std::path::PathBuf;

use pattern_detector::{PatternDetector, PatternState};
use serde_json::Value;
use tokio::io::BufWriter;

use crate::cli::{CliArgs, InputSource};
use crate::error::ScanError;
use crate::scanner::scan_stream;
use crate::settings::{EmitMode, OutputFormat, ScanSettings, TokenFormat};
use crate::tokenizer::TokenParser;
use crate::{run, scan_input};

fn settings_with(max_period: usize) -> ScanSettings {
    ScanSettings {
        max_period,
        ..ScanSettings::default()
    }
}

fn detector_for(settings: &ScanSettings) -> PatternDetector {
    PatternDetector::new(settings.max_period, settings.prefer_larger_period).unwrap()
}

async fn scan_text(input: &str, settings: &ScanSettings) -> (Vec<Value>, crate::scanner::ScanSummary) {
    let parser = TokenParser::from_settings(settings).unwrap();
    let mut detector = detector_for(settings);
    let mut out: Vec<u8> = Vec::new();

    let summary = scan_stream("mem", input.as_bytes(), &mut out, &mut detector, &parser, settings)
        .await
        .unwrap();

    let records = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    (records, summary)
}

// ============ In-memory streams ============

#[tokio::test]
async fn test_periodic_stream_reports_start_and_summary() {
    let settings = settings_with(3);
    let input = "1\n2\n3\n1\n2\n3\n1\n2\n3\n";
    let (records, summary) = scan_text(input, &settings).await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["kind"], "event");
    assert_eq!(records[0]["state"], "PATTERN_STARTED");
    assert_eq!(records[0]["step"], 6);
    assert_eq!(records[0]["period"], 3);

    assert_eq!(records[1]["kind"], "summary");
    assert_eq!(records[1]["steps"], 9);
    assert_eq!(records[1]["runs"][0]["start_step"], 6);
    assert_eq!(records[1]["runs"][0]["length"], 4);

    assert_eq!(summary.final_period, 3);
    assert_eq!(summary.transitions.get(&PatternState::PatternUnchanged), Some(&3));
}

#[tokio::test]
async fn test_emit_all_reports_every_token() {
    let settings = ScanSettings {
        emit: EmitMode::All,
        ..settings_with(2)
    };
    let (records, summary) = scan_text("5\n\n# gap\n5\n6\n", &settings).await;

    // Blank and comment lines are read but produce no step
    assert_eq!(summary.lines_read, 5);
    assert_eq!(summary.steps, 3);
    let states: Vec<&str> = records[..3]
        .iter()
        .map(|r| r["state"].as_str().unwrap())
        .collect();
    assert_eq!(states, vec!["NO_PATTERN", "PATTERN_STARTED", "PATTERN_STOPPED"]);
}

#[tokio::test]
async fn test_log_lines_with_extract_and_text_hashing() {
    let settings = ScanSettings {
        token_format: TokenFormat::Text,
        extract_pattern: Some(r"op=(\w+)".to_string()),
        ..settings_with(4)
    };
    let mut input = String::new();
    for cycle in 0..4 {
        input.push_str(&format!("t={} op=load\n", cycle * 2));
        input.push_str("heartbeat\n");
        input.push_str(&format!("t={} op=store\n", cycle * 2 + 1));
    }
    let (records, summary) = scan_text(&input, &settings).await;

    // load/store alternate, so period 2 confirms on the fourth op
    assert_eq!(summary.steps, 8);
    assert_eq!(records[0]["state"], "PATTERN_STARTED");
    assert_eq!(records[0]["step"], 4);
    assert_eq!(records[0]["period"], 2);
    assert_eq!(records[0]["token"], u64::from(crc32fast::hash(b"store")));
}

#[tokio::test]
async fn test_invalid_lines_are_counted_when_not_strict() {
    let settings = ScanSettings {
        token_format: TokenFormat::Decimal,
        ..settings_with(2)
    };
    let (_, summary) = scan_text("1\noops\n1\n", &settings).await;

    assert_eq!(summary.invalid_lines, 1);
    assert_eq!(summary.steps, 2);
    assert_eq!(summary.final_period, 1);
}

#[tokio::test]
async fn test_strict_mode_fails_on_invalid_line() {
    let settings = ScanSettings {
        token_format: TokenFormat::Hex,
        strict: true,
        ..settings_with(2)
    };
    let parser = TokenParser::from_settings(&settings).unwrap();
    let mut detector = detector_for(&settings);
    let mut out: Vec<u8> = Vec::new();

    let result = scan_stream(
        "mem",
        "0x1\n0x2\nnot-hex\n".as_bytes(),
        &mut out,
        &mut detector,
        &parser,
        &settings,
    )
    .await;

    match result {
        Err(ScanError::InvalidToken { line, text }) => {
            assert_eq!(line, 3);
            assert_eq!(text, "not-hex");
        }
        other => panic!("expected InvalidToken, got {:?}", other),
    }
}

#[tokio::test]
async fn test_prefer_larger_period_setting_is_honored() {
    let input = "0\n1\n0\n0\n1\n0\n0\n1\n0\n0\n";
    let base = ScanSettings {
        emit: EmitMode::All,
        ..settings_with(4)
    };

    let (smaller, _) = scan_text(input, &base).await;
    let larger_settings = ScanSettings {
        prefer_larger_period: true,
        ..base.clone()
    };
    let (larger, _) = scan_text(input, &larger_settings).await;

    let periods = |records: &[Value]| -> Vec<u64> {
        records
            .iter()
            .filter(|r| r["kind"] == "event")
            .map(|r| r["period"].as_u64().unwrap())
            .collect()
    };
    assert_eq!(periods(&smaller), vec![0, 0, 0, 1, 0, 3, 1, 3, 3, 1]);
    assert_eq!(periods(&larger), vec![0, 0, 0, 1, 0, 3, 3, 3, 3, 3]);
}

#[tokio::test]
async fn test_text_output_is_line_oriented() {
    let settings = ScanSettings {
        output: OutputFormat::Text,
        ..settings_with(1)
    };
    let parser = TokenParser::from_settings(&settings).unwrap();
    let mut detector = detector_for(&settings);
    let mut out: Vec<u8> = Vec::new();

    scan_stream("mem", "7\n7\n".as_bytes(), &mut out, &mut detector, &parser, &settings)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    let first = text.lines().next().unwrap();
    assert!(first.starts_with("mem:       2  PATTERN_STARTED"));
    assert!(text.contains("== mem: 2 steps"));
}

#[tokio::test]
async fn test_buffered_writer_is_flushed_per_input() {
    let settings = settings_with(2);
    let parser = TokenParser::from_settings(&settings).unwrap();
    let mut detector = detector_for(&settings);
    let mut out = BufWriter::new(Vec::new());

    scan_stream("mem", "3\n3\n".as_bytes(), &mut out, &mut detector, &parser, &settings)
        .await
        .unwrap();

    // Everything reached the inner writer without an explicit flush here
    let written = String::from_utf8(out.get_ref().clone()).unwrap();
    let kinds: Vec<Value> = written
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).unwrap()["kind"].clone())
        .collect();
    assert_eq!(kinds, vec!["event", "summary"]);
}

#[tokio::test]
async fn test_strict_failure_flushes_events_already_produced() {
    let settings = ScanSettings {
        strict: true,
        token_format: TokenFormat::Decimal,
        ..settings_with(1)
    };
    let parser = TokenParser::from_settings(&settings).unwrap();
    let mut detector = detector_for(&settings);
    let mut out = BufWriter::new(Vec::new());

    let result = scan_stream(
        "mem",
        "8\n8\nbad\n".as_bytes(),
        &mut out,
        &mut detector,
        &parser,
        &settings,
    )
    .await;

    assert!(matches!(result, Err(ScanError::InvalidToken { line: 3, .. })));
    let written = String::from_utf8(out.get_ref().clone()).unwrap();
    assert!(written.contains("PATTERN_STARTED"));
}

// ============ Files ============

#[tokio::test]
async fn test_scan_files_resets_detector_between_inputs() {
    let mut first = tempfile::NamedTempFile::new().unwrap();
    writeln!(first, "0x10\n0x20\n0x10\n0x20").unwrap();
    let mut second = tempfile::NamedTempFile::new().unwrap();
    // Would continue the period-2 cycle if state leaked from the first file
    writeln!(second, "0x10\n0x20").unwrap();

    let settings = settings_with(4);
    let parser = TokenParser::from_settings(&settings).unwrap();
    let mut detector = detector_for(&settings);
    let mut out: Vec<u8> = Vec::new();

    let first_summary = scan_input(
        &InputSource::File(first.path().to_path_buf()),
        &mut out,
        &mut detector,
        &parser,
        &settings,
    )
    .await
    .unwrap();
    let second_summary = scan_input(
        &InputSource::File(second.path().to_path_buf()),
        &mut out,
        &mut detector,
        &parser,
        &settings,
    )
    .await
    .unwrap();

    assert_eq!(first_summary.final_period, 2);
    assert_eq!(second_summary.final_period, 0);
    assert!(second_summary.runs.is_empty());
    assert_eq!(second_summary.source, second.path().display().to_string());
}

#[tokio::test]
async fn test_missing_input_file_is_reported() {
    let settings = settings_with(2);
    let parser = TokenParser::from_settings(&settings).unwrap();
    let mut detector = detector_for(&settings);
    let mut out: Vec<u8> = Vec::new();

    let missing = PathBuf::from("/definitely/not/here.trace");
    let result = scan_input(
        &InputSource::File(missing.clone()),
        &mut out,
        &mut detector,
        &parser,
        &settings,
    )
    .await;

    assert!(matches!(result, Err(ScanError::Input { path, .. }) if path == missing));
}

// ============ run() ============

#[tokio::test]
async fn test_run_rejects_zero_max_period_from_cli() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "{{ max_period: 4 }}").unwrap();

    let args = CliArgs {
        config: Some(config.path().to_path_buf()),
        max_period: Some(0),
        ..CliArgs::default()
    };

    assert!(matches!(run(args).await, Err(ScanError::InvalidSettings(_))));
}

#[tokio::test]
async fn test_run_print_config_scans_nothing() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "{{ max_period: 6, output: 'text' }}").unwrap();

    let args = CliArgs {
        config: Some(config.path().to_path_buf()),
        print_config: true,
        ..CliArgs::default()
    };

    assert!(run(args).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_run_scans_file_inputs() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "{{ max_period: 3, token_format: 'decimal' }}").unwrap();
    let mut trace = tempfile::NamedTempFile::new().unwrap();
    writeln!(trace, "4\n5\n6\n4\n5\n6\n4").unwrap();

    let args = CliArgs {
        inputs: vec![trace.path().to_path_buf()],
        config: Some(config.path().to_path_buf()),
        ..CliArgs::default()
    };

    let summaries = run(args).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].steps, 7);
    assert_eq!(summaries[0].final_period, 3);
}
