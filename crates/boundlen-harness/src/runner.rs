//! Test execution engine.

use std::io::Write;
use std::str::FromStr;
use std::time::Instant;

use boundlen_membrane::config::SafetyLevel;

use crate::diff;
use crate::error::HarnessError;
use crate::exec::execute_fixture_case;
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome, StreamKind};
use crate::verify::VerificationResult;

/// Modes a verification campaign can cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RunMode {
    Strict,
    Hardened,
    /// Strict then hardened.
    Both,
}

impl RunMode {
    /// Levels to run, in order.
    #[must_use]
    pub const fn levels(self) -> &'static [SafetyLevel] {
        match self {
            Self::Strict => &[SafetyLevel::Strict],
            Self::Hardened => &[SafetyLevel::Hardened],
            Self::Both => &[SafetyLevel::Strict, SafetyLevel::Hardened],
        }
    }
}

impl FromStr for RunMode {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "hardened" => Ok(Self::Hardened),
            "both" => Ok(Self::Both),
            _ => Err(HarnessError::InvalidMode(s.to_string())),
        }
    }
}

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// Level every case runs under.
    pub level: SafetyLevel,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>, level: SafetyLevel) -> Self {
        Self {
            campaign: campaign.into(),
            level,
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        self.matching(fixture_set)
            .map(|case| self.verify_case(case))
            .collect()
    }

    /// Like [`run`](Self::run), emitting one JSONL record per case plus a summary.
    pub fn run_logged<W: Write>(
        &self,
        fixture_set: &FixtureSet,
        log: &mut LogEmitter<W>,
    ) -> std::io::Result<Vec<VerificationResult>> {
        log.emit_entry(
            LogEntry::new("", LogLevel::Info, "campaign_start")
                .with_stream(StreamKind::Conformance)
                .with_mode(self.level.as_str())
                .with_details(serde_json::json!({
                    "campaign": self.campaign,
                    "family": fixture_set.family,
                    "cases": fixture_set.cases.len(),
                })),
        )?;

        let mut results = Vec::new();
        for case in self.matching(fixture_set) {
            let started = Instant::now();
            let result = self.verify_case(case);
            let latency_ns = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);

            let (level, outcome) = if result.passed {
                (LogLevel::Info, Outcome::Pass)
            } else {
                (LogLevel::Error, Outcome::Fail)
            };
            let mut entry = LogEntry::new("", level, "case_result")
                .with_stream(StreamKind::Conformance)
                .with_mode(self.level.as_str())
                .with_symbol(&case.function)
                .with_outcome(outcome)
                .with_latency_ns(latency_ns)
                .with_details(serde_json::json!({
                    "case": result.case_name,
                    "expected": result.expected,
                    "actual": result.actual,
                }));
            if let Some(action) = &result.healing_action {
                entry = entry.with_healing_action(action);
            }
            log.emit_entry(entry)?;
            results.push(result);
        }

        let failed = results.iter().filter(|r| !r.passed).count();
        log.emit_entry(
            LogEntry::new("", LogLevel::Info, "campaign_end")
                .with_stream(StreamKind::Conformance)
                .with_mode(self.level.as_str())
                .with_outcome(if failed == 0 {
                    Outcome::Pass
                } else {
                    Outcome::Fail
                })
                .with_details(serde_json::json!({
                    "total": results.len(),
                    "failed": failed,
                })),
        )?;
        log.flush()?;
        Ok(results)
    }

    fn matching<'a>(
        &'a self,
        fixture_set: &'a FixtureSet,
    ) -> impl Iterator<Item = &'a FixtureCase> + 'a {
        fixture_set
            .cases
            .iter()
            .filter(|case| mode_matches(self.level, &case.mode))
    }

    fn verify_case(&self, case: &FixtureCase) -> VerificationResult {
        let (actual, healing_action, diff) = execute_case(case, self.level);
        let case_name = if case.mode.trim().eq_ignore_ascii_case("both") {
            format!("{} [{}]", case.name, self.level)
        } else {
            case.name.clone()
        };
        VerificationResult {
            case_name,
            function: case.function.clone(),
            passed: actual == case.expected_output,
            expected: case.expected_output.clone(),
            actual,
            healing_action,
            diff,
        }
    }
}

/// A case tagged `both` runs under every level; otherwise its tag must name `level`.
fn mode_matches(level: SafetyLevel, case_mode: &str) -> bool {
    case_mode.trim().eq_ignore_ascii_case("both")
        || case_mode.parse::<SafetyLevel>().is_ok_and(|m| m == level)
}

fn execute_case(case: &FixtureCase, level: SafetyLevel) -> (String, Option<String>, Option<String>) {
    match execute_fixture_case(&case.function, &case.inputs, level) {
        Ok(run) => {
            let mut notes = Vec::new();
            if !run.host_parity {
                notes.push(format!(
                    "host parity mismatch: host={}, impl={}",
                    run.host_output.as_deref().unwrap_or("-"),
                    run.impl_output
                ));
            }

            let diff_out = if run.impl_output != case.expected_output {
                let mut d = diff::render_diff(&case.expected_output, &run.impl_output);
                for note in &notes {
                    d.push('\n');
                    d.push_str(note);
                }
                Some(d)
            } else if !notes.is_empty() {
                Some(notes.join("\n"))
            } else {
                None
            };

            (run.impl_output, run.healing_action, diff_out)
        }
        Err(err) => {
            let actual = format!("unsupported:{err}");
            let diff_out = Some(diff::render_diff(&case.expected_output, &actual));
            (actual, None, diff_out)
        }
    }
}
