//! Test Database Module
//!
//! Scenario-driven checks of the whole build-and-compare pipeline that run
//! without a reader attached. Dumps are fed in as bytes and cards come from
//! a [`MockCardReader`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nfc_compare::testdb::{TestRunner, TestRunnerConfig};
//!
//! let mut runner = TestRunner::with_config(TestRunnerConfig {
//!     verbose: true,
//!     ..Default::default()
//! });
//! let summary = runner.run_by_names(&["text_uid_match", "no_card_present"]);
//! println!("Passed: {}/{}", summary.passed, summary.total);
//! ```
//!
//! # Tags
//!
//! - `file` / `text` / `binary` - dump-only comparisons
//! - `scan` - at least one side comes from a card
//! - `error` - the build is expected to fail
//! - `ambiguity` - outcomes that follow from unrecorded fields reading as zero
//! - `edge-case` - truncation and other limits

pub mod mock_reader;
pub mod runner;
pub mod scenarios;

pub use mock_reader::{MockCardReader, MockReaderConfig};
pub use runner::{ScenarioResult, TestRunner, TestRunnerConfig, TestSummary};
pub use scenarios::{ExpectedOutcome, ProfileInput, ScenarioLibrary, TestScenario};

use std::collections::BTreeMap;

/// Get a list of all available scenario names
pub fn list_scenario_names() -> Vec<String> {
    ScenarioLibrary::all_scenarios()
        .into_iter()
        .map(|s| s.name)
        .collect()
}

/// Get a list of all available tags
pub fn list_tags() -> Vec<String> {
    let mut tags: Vec<String> = ScenarioLibrary::all_scenarios()
        .into_iter()
        .flat_map(|s| s.tags)
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

/// Print available scenarios to console, grouped by first tag
pub fn print_available_scenarios() {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                  AVAILABLE TEST SCENARIOS                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let scenarios = ScenarioLibrary::all_scenarios();

    let mut by_category: BTreeMap<String, Vec<&TestScenario>> = BTreeMap::new();
    for scenario in &scenarios {
        let category = scenario
            .tags
            .first()
            .cloned()
            .unwrap_or_else(|| "other".to_string());
        by_category.entry(category).or_default().push(scenario);
    }

    for (category, list) in &by_category {
        println!("📁 {}", category.to_uppercase());
        for scenario in list {
            println!("   • {} - {}", scenario.name, scenario.description);
        }
        println!();
    }

    println!("Total: {} scenarios available\n", scenarios.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_functions() {
        let names = list_scenario_names();
        assert!(names.contains(&"text_uid_match".to_string()));

        let tags = list_tags();
        assert!(tags.contains(&"scan".to_string()));
        let mut sorted = tags.clone();
        sorted.sort();
        assert_eq!(tags, sorted);
    }
}
