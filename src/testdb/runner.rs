//! Test runner for executing scenarios and generating reports
//!
//! Each scenario builds its two profiles in memory (dump bytes go straight
//! through [`ProfileBuilder::from_file`], cards through a [`MockCardReader`])
//! and checks the comparison or the error kind against the expectation.

use super::mock_reader::MockCardReader;
use super::scenarios::{ExpectedOutcome, ProfileInput, ScenarioLibrary, TestScenario};
use crate::core::builder::ProfileBuilder;
use crate::core::compare::compare;
use crate::core::error::Result as NfcResult;
use crate::core::profile::Profile;
use crate::reader::scan_profile;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// Result of running a single test scenario
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// Whether the test passed
    pub passed: bool,
    /// Execution time
    pub duration: Duration,
    /// What actually happened, e.g. `equal` or `ScanFailed`
    pub actual: String,
    /// Failure reason (if any)
    pub failure_reason: Option<String>,
    pub tags: Vec<String>,
}

impl ScenarioResult {
    /// Create a new passing result
    pub fn passed(name: &str, duration: Duration, actual: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            duration,
            actual: actual.to_string(),
            failure_reason: None,
            tags: Vec::new(),
        }
    }

    /// Create a new failing result
    pub fn failed(name: &str, duration: Duration, actual: &str, reason: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            duration,
            actual: actual.to_string(),
            failure_reason: Some(reason.to_string()),
            tags: Vec::new(),
        }
    }

    fn with_tags(mut self, tags: &[String]) -> Self {
        self.tags = tags.to_vec();
        self
    }
}

/// Summary of test run results
#[derive(Debug, Clone, Default)]
pub struct TestSummary {
    /// Total scenarios run
    pub total: usize,
    /// Scenarios that passed
    pub passed: usize,
    /// Scenarios that failed
    pub failed: usize,
    /// Total execution time
    pub total_duration: Duration,
    /// Results grouped by tag
    pub results_by_tag: BTreeMap<String, Vec<ScenarioResult>>,
}

impl TestSummary {
    /// Calculate pass rate as percentage
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    /// Get all failed scenario names
    pub fn failed_scenarios(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .results_by_tag
            .values()
            .flatten()
            .filter(|r| !r.passed)
            .map(|r| r.name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Configuration for test runner
#[derive(Debug, Clone)]
pub struct TestRunnerConfig {
    /// Whether to run in verbose mode
    pub verbose: bool,
    /// Whether to stop on first failure
    pub fail_fast: bool,
    /// Filter scenarios by name pattern
    pub name_filter: Option<String>,
    /// Scan timeout handed to mock readers
    pub scan_timeout: Duration,
    /// Write `test_report.json` here when set
    pub report_dir: Option<String>,
}

impl Default for TestRunnerConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            fail_fast: false,
            name_filter: None,
            scan_timeout: Duration::from_millis(50),
            report_dir: None,
        }
    }
}

/// Test runner for executing scenarios
pub struct TestRunner {
    config: TestRunnerConfig,
    builder: ProfileBuilder,
    results: Vec<ScenarioResult>,
    start_time: Option<Instant>,
}

impl TestRunner {
    /// Create a new test runner with default configuration
    pub fn new() -> Self {
        Self::with_config(TestRunnerConfig::default())
    }

    /// Create a new test runner with configuration
    pub fn with_config(config: TestRunnerConfig) -> Self {
        Self {
            config,
            builder: ProfileBuilder::new(),
            results: Vec::new(),
            start_time: None,
        }
    }

    /// Run all available scenarios
    pub fn run_all(&mut self) -> TestSummary {
        self.run_scenarios(ScenarioLibrary::all_scenarios())
    }

    /// Run scenarios filtered by tag
    pub fn run_by_tag(&mut self, tag: &str) -> TestSummary {
        self.run_scenarios(ScenarioLibrary::scenarios_by_tag(tag))
    }

    /// Run specific scenarios by name
    pub fn run_by_names(&mut self, names: &[&str]) -> TestSummary {
        let scenarios: Vec<_> = ScenarioLibrary::all_scenarios()
            .into_iter()
            .filter(|s| names.contains(&s.name.as_str()))
            .collect();
        self.run_scenarios(scenarios)
    }

    /// Run a list of scenarios
    pub fn run_scenarios(&mut self, scenarios: Vec<TestScenario>) -> TestSummary {
        self.start_time = Some(Instant::now());
        self.results.clear();

        let scenarios = self.filter_scenarios(scenarios);

        if self.config.verbose {
            println!("\n╔══════════════════════════════════════════════════════════════╗");
            println!("║                 NFC COMPARE - SCENARIO RUNNER                ║");
            println!("╠══════════════════════════════════════════════════════════════╣");
            println!("║  Running {:>3} scenario(s)                                     ║", scenarios.len());
            println!("╚══════════════════════════════════════════════════════════════╝\n");
        }

        for scenario in scenarios {
            let result = self.run_single_scenario(&scenario);

            if self.config.verbose {
                print_result(&result);
            }

            let should_stop = self.config.fail_fast && !result.passed;
            self.results.push(result);

            if should_stop {
                if self.config.verbose {
                    println!("\n⚠️  Stopping early due to fail-fast mode\n");
                }
                break;
            }
        }

        let summary = self.generate_summary();

        if self.config.verbose {
            print_summary(&summary);
        }

        if let Some(ref dir) = self.config.report_dir {
            if let Err(e) = self.write_json_report(Path::new(dir), &summary) {
                log::warn!("Could not write test report to {}: {}", dir, e);
            }
        }

        summary
    }

    fn filter_scenarios(&self, scenarios: Vec<TestScenario>) -> Vec<TestScenario> {
        match self.config.name_filter {
            Some(ref pattern) => {
                let pattern = pattern.to_lowercase();
                scenarios
                    .into_iter()
                    .filter(|s| s.name.to_lowercase().contains(&pattern))
                    .collect()
            }
            None => scenarios,
        }
    }

    fn run_single_scenario(&self, scenario: &TestScenario) -> ScenarioResult {
        let start = Instant::now();

        if self.config.verbose {
            println!("▶ Running: {} - {}", scenario.name, scenario.description);
        }

        let outcome = self
            .build(&scenario.left)
            .and_then(|left| Ok((left, self.build(&scenario.right)?)))
            .and_then(|(left, right)| compare(Some(&left), Some(&right)));
        let duration = start.elapsed();

        let actual = match &outcome {
            Ok(comparison) => comparison.to_string(),
            Err(e) => e.kind().to_string(),
        };

        let passed = match (&scenario.expected, &outcome) {
            (ExpectedOutcome::Compare(want), Ok(got)) => want == got,
            (ExpectedOutcome::Error(kind), Err(e)) => e.kind() == kind,
            _ => false,
        };

        let result = if passed {
            ScenarioResult::passed(&scenario.name, duration, &actual)
        } else {
            let expected = match &scenario.expected {
                ExpectedOutcome::Compare(c) => c.to_string(),
                ExpectedOutcome::Error(kind) => kind.clone(),
            };
            let reason = match &outcome {
                Err(e) => format!("expected {}, got {}", expected, e),
                Ok(_) => format!("expected {}, got {}", expected, actual),
            };
            ScenarioResult::failed(&scenario.name, duration, &actual, &reason)
        };
        result.with_tags(&scenario.tags)
    }

    fn build(&self, input: &ProfileInput) -> NfcResult<Profile> {
        match input {
            ProfileInput::Dump(bytes) => self.builder.from_file(bytes),
            ProfileInput::Card { card, reader } => {
                let mut mock = MockCardReader::with_config(card.clone(), reader.clone());
                scan_profile(&mut mock, self.config.scan_timeout, &self.builder)
            }
        }
    }

    fn generate_summary(&self) -> TestSummary {
        let mut summary = TestSummary {
            total: self.results.len(),
            passed: self.results.iter().filter(|r| r.passed).count(),
            failed: self.results.iter().filter(|r| !r.passed).count(),
            total_duration: self
                .start_time
                .map(|s| s.elapsed())
                .unwrap_or(Duration::ZERO),
            ..Default::default()
        };

        for result in &self.results {
            for tag in &result.tags {
                summary
                    .results_by_tag
                    .entry(tag.clone())
                    .or_default()
                    .push(result.clone());
            }
        }

        summary
    }

    fn write_json_report(&self, dir: &Path, summary: &TestSummary) -> std::io::Result<()> {
        #[derive(Serialize)]
        struct ReportEntry<'a> {
            name: &'a str,
            passed: bool,
            actual: &'a str,
            duration_ms: f64,
            #[serde(skip_serializing_if = "Option::is_none")]
            failure_reason: Option<&'a str>,
        }

        #[derive(Serialize)]
        struct Report<'a> {
            generated_at: String,
            total: usize,
            passed: usize,
            failed: usize,
            pass_rate: f64,
            duration_seconds: f64,
            results: Vec<ReportEntry<'a>>,
        }

        let report = Report {
            generated_at: chrono::Utc::now().to_rfc3339(),
            total: summary.total,
            passed: summary.passed,
            failed: summary.failed,
            pass_rate: summary.pass_rate(),
            duration_seconds: summary.total_duration.as_secs_f64(),
            results: self
                .results
                .iter()
                .map(|r| ReportEntry {
                    name: &r.name,
                    passed: r.passed,
                    actual: &r.actual,
                    duration_ms: r.duration.as_secs_f64() * 1000.0,
                    failure_reason: r.failure_reason.as_deref(),
                })
                .collect(),
        };

        fs::create_dir_all(dir)?;
        let path = dir.join("test_report.json");
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&path, json)?;

        if self.config.verbose {
            println!("📄 JSON report generated: {}", path.display());
        }
        Ok(())
    }

    /// Get all results
    pub fn results(&self) -> &[ScenarioResult] {
        &self.results
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn print_result(result: &ScenarioResult) {
    let (status, color) = if result.passed {
        ("✓ PASS", "\x1b[32m")
    } else {
        ("✗ FAIL", "\x1b[31m")
    };

    println!(
        "  {}{}\x1b[0m - {} [{}] ({:.2}ms)",
        color,
        status,
        result.name,
        result.actual,
        result.duration.as_secs_f64() * 1000.0
    );

    if let Some(ref reason) = result.failure_reason {
        println!("      └─ Reason: {}", reason);
    }
}

fn print_summary(summary: &TestSummary) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                        TEST SUMMARY                          ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  Total:    {:>4}                                              ║", summary.total);
    println!("║  Passed:   {:>4} \x1b[32m✓\x1b[0m                                            ║", summary.passed);
    println!("║  Failed:   {:>4} \x1b[31m✗\x1b[0m                                            ║", summary.failed);
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  Pass Rate: {:>5.1}%                                          ║", summary.pass_rate());
    println!("║  Duration:  {:>5.2}s                                          ║", summary.total_duration.as_secs_f64());
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let failed = summary.failed_scenarios();
    if !failed.is_empty() {
        println!("Failed scenarios:");
        for name in failed {
            println!("  • {}", name);
        }
        println!();
    }
}
