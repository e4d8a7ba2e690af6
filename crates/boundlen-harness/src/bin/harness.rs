//! CLI entrypoint for the boundlen conformance harness.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use boundlen_harness::exec::{ScanFunction, ScanInputs, execute_scan};
use boundlen_harness::structured_log::{ArtifactIndex, LogEmitter, now_utc, validate_log_file};
use boundlen_harness::{
    ConformanceReport, FixtureSet, HarnessError, RunMode, TestRunner, VerificationSummary,
};
use boundlen_membrane::config::{SafetyLevel, UnknownSafetyLevel};

/// Conformance tooling for boundlen.
#[derive(Debug, Parser)]
#[command(name = "boundlen-harness")]
#[command(about = "Conformance testing harness for boundlen")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify the implementation against a fixture file.
    Verify {
        /// Fixture JSON file.
        #[arg(long)]
        fixture: PathBuf,
        /// Runtime mode to test.
        #[arg(long, value_enum, ignore_case = true, default_value_t = RunMode::Both)]
        mode: RunMode,
        /// Output report path (markdown). A `.json` twin is written next to it.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log path (if omitted, logs go to stdout).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Artifact index JSON path covering the report and log.
        #[arg(long)]
        artifact_index: Option<PathBuf>,
        /// Optional fixed timestamp string for deterministic report generation.
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Run one scan and print the result.
    Scan {
        /// Input as text (`\0` is not interpreted; use --hex for NUL bytes).
        #[arg(long, conflicts_with = "hex")]
        text: Option<String>,
        /// Input as hex bytes, e.g. `68656c6c6f00`.
        #[arg(long)]
        hex: Option<String>,
        /// Maximum number of bytes to inspect.
        #[arg(long)]
        max_length: usize,
        /// Function to run.
        #[arg(long, default_value = "str_len")]
        function: String,
        /// Runtime mode for ABI functions (`strict`, `hardened`, or `off`).
        #[arg(long, default_value = "strict", value_parser = parse_level)]
        mode: SafetyLevel,
    },
    /// Validate a structured JSONL log file.
    ValidateLog {
        /// Log path.
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), HarnessError> {
    match command {
        Command::Verify {
            fixture,
            mode,
            report,
            log,
            artifact_index,
            timestamp,
        } => verify(
            &fixture,
            mode,
            report.as_deref(),
            log.as_deref(),
            artifact_index.as_deref(),
            timestamp,
        ),
        Command::Scan {
            text,
            hex,
            max_length,
            function,
            mode,
        } => {
            let bytes = match (text, hex) {
                (Some(text), None) => text.into_bytes(),
                (None, Some(hex)) => decode_hex(&hex)?,
                _ => {
                    return Err(HarnessError::InvalidInputs(
                        "give exactly one of --text or --hex".to_string(),
                    ));
                }
            };
            let inputs = ScanInputs {
                bytes: Some(bytes),
                text: None,
                null: false,
                max_length,
            };
            let run = execute_scan(
                ScanFunction::from_str(&function)?,
                &inputs,
                mode,
            )?;
            println!("{}", run.impl_output);
            if let Some(action) = run.healing_action {
                eprintln!("healing: {action}");
            }
            if !run.host_parity {
                eprintln!(
                    "host parity mismatch: host={}",
                    run.host_output.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            if errors.is_empty() {
                println!("{lines} line(s) valid");
                Ok(())
            } else {
                Err(HarnessError::InvalidLog(errors.len()))
            }
        }
    }
}

fn parse_level(s: &str) -> Result<SafetyLevel, UnknownSafetyLevel> {
    s.parse()
}

fn verify(
    fixture: &Path,
    mode: RunMode,
    report: Option<&Path>,
    log: Option<&Path>,
    artifact_index: Option<&Path>,
    timestamp: Option<String>,
) -> Result<(), HarnessError> {
    let set = FixtureSet::from_file(fixture)?;
    let run_id = format!("{}-{}", set.family.replace('/', "-"), std::process::id());
    let mut emitter = match log {
        Some(path) => LogEmitter::to_file(path, &run_id)?,
        None => LogEmitter::to_stdout(&run_id),
    };

    let levels = mode.levels();
    let mut results = Vec::new();
    for &level in levels {
        let runner = TestRunner::new(set.family.clone(), level);
        results.extend(runner.run_logged(&set, &mut emitter)?);
    }
    let summary = VerificationSummary::from_results(results);

    let report_doc = ConformanceReport {
        title: format!("boundlen conformance: {}", set.family),
        mode: levels
            .iter()
            .map(|l| l.as_str())
            .collect::<Vec<_>>()
            .join("+"),
        timestamp: timestamp.unwrap_or_else(now_utc),
        summary,
    };
    if let Some(path) = report {
        std::fs::write(path, report_doc.to_markdown())?;
        std::fs::write(path.with_extension("json"), report_doc.to_json())?;
    } else {
        eprintln!("{}", report_doc.to_markdown());
    }

    if let Some(index_path) = artifact_index {
        let mut index = ArtifactIndex::new(&run_id);
        index.add_file(fixture, "fixture")?;
        if let Some(path) = report {
            index.add_file(path, "report_md")?;
            index.add_file(&path.with_extension("json"), "report_json")?;
        }
        if let Some(path) = log {
            index.add_file(path, "log")?;
        }
        std::fs::write(index_path, index.to_json()?)?;
    }

    let summary = &report_doc.summary;
    if summary.all_passed() {
        Ok(())
    } else {
        Err(HarnessError::VerificationFailed {
            failed: summary.failed,
            total: summary.total,
        })
    }
}

fn decode_hex(hex: &str) -> Result<Vec<u8>, HarnessError> {
    let digits: Vec<char> = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(HarnessError::InvalidInputs(format!(
            "odd number of hex digits in '{hex}'"
        )));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let s: String = pair.iter().collect();
            u8::from_str_radix(&s, 16)
                .map_err(|e| HarnessError::InvalidInputs(format!("bad hex byte '{s}': {e}")))
        })
        .collect()
}
