//! Command handler implementations
//!
//! This module contains the implementation of all CLI commands. Handlers
//! return the process exit status: 0 for success or Equal, 1 for Different
//! or failed test scenarios, 130 when Ctrl+C cut a catalog search short.

use crate::catalog::CatalogIndex;
use crate::cli::progress::{
    format_bytes, print_block, print_divider, print_error, print_header, print_info,
    print_success, print_warning, CatalogProgressBar, WaitSpinner,
};
use crate::cli::{Args, Commands, TestCommands};
use crate::core::builder::ProfileBuilder;
use crate::core::compare::{first_mismatch, Comparison};
use crate::core::config::{get_config_path, init_config, Config};
use crate::core::digest::digest;
use crate::core::error::NfcError;
use crate::core::loader::{load_file, load_profile};
use crate::core::profile::Profile;
use crate::core::session::{Action, Session};
use crate::reader::{
    scan_profile, BoxedCardReader, CaptureReader, CardReader, NoReader, ScanCapture,
};
use crate::testdb::{self, ScenarioLibrary, TestRunner, TestRunnerConfig};
use anyhow::{anyhow, Context, Result};
use dialoguer::{Input, Select};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Exit status for Equal or success
pub const EXIT_OK: i32 = 0;
/// Exit status for Different or failed scenarios
pub const EXIT_DIFFERENT: i32 = 1;
/// Exit status when the user interrupted the run
pub const EXIT_INTERRUPTED: i32 = 130;

/// Run the appropriate command based on CLI arguments
///
/// With no subcommand the interactive session starts.
pub fn run_command(args: &Args, config: &Config, shutdown_flag: Arc<AtomicBool>) -> Result<i32> {
    let builder = ProfileBuilder::new();
    debug!("Extractors: {:?}", builder.chain().names());

    match &args.command {
        Some(Commands::Inspect { file, json }) => inspect(config, &builder, file, *json),
        Some(Commands::Digest { file }) => digest_file(config, file),
        Some(Commands::Compare { a, b, explain }) => {
            compare_files(config, &builder, a, b, *explain)
        }
        Some(Commands::Scan { json, save }) => scan(config, &builder, *json, save.as_deref()),
        Some(Commands::Verify { file, explain }) => verify(config, &builder, file, *explain),
        Some(Commands::Find {
            file,
            dir,
            no_recursive,
            json,
        }) => find(
            config,
            &builder,
            file.as_deref(),
            dir,
            *no_recursive,
            *json,
            shutdown_flag,
        ),
        Some(Commands::Interactive) | None => interactive(config, builder),
        Some(Commands::Config { path, reset }) => {
            handle_config_command(*path, *reset)?;
            Ok(EXIT_OK)
        }
        Some(Commands::GenerateConfig { output }) => {
            generate_config_file(output.clone())?;
            Ok(EXIT_OK)
        }
        Some(Commands::ShowConfig) => {
            show_config(config);
            Ok(EXIT_OK)
        }
        Some(Commands::Test { test_command }) => handle_test_command(test_command),
    }
}

/// Open the reader configured for this run
///
/// Only capture replay is available; a missing capture path is an error
/// that tells the user how to provide one.
pub fn open_reader(config: &Config) -> Result<BoxedCardReader> {
    match config.scan.capture_file {
        Some(ref path) => {
            info!("Using capture file {} as the card reader", path.display());
            Ok(Box::new(CaptureReader::new(path)))
        }
        None => Err(anyhow!(
            "No card reader configured. Pass --capture FILE or set [scan] capture_file."
        )),
    }
}

fn read_card(config: &Config, builder: &ProfileBuilder) -> Result<Profile> {
    let mut reader = open_reader(config)?;
    let spinner = WaitSpinner::new("Waiting for a card...");
    let result = scan_profile(reader.as_mut(), config.scan.timeout(), builder);
    spinner.finish();
    Ok(result?)
}

fn print_profile(label: &str, profile: &Profile) {
    println!("  {}:", label);
    print_block(&profile.to_string());
}

fn print_outcome(outcome: Comparison, a: &Profile, b: &Profile, explain: bool) -> i32 {
    match outcome {
        Comparison::Equal => {
            print_success("Equal");
            EXIT_OK
        }
        Comparison::Different => {
            print_error("Different");
            if explain {
                if let Some(reason) = first_mismatch(a, b) {
                    print_info(&format!("First mismatch: {}", reason));
                }
            }
            EXIT_DIFFERENT
        }
    }
}

/// Print the profile of one dump
pub fn inspect(config: &Config, builder: &ProfileBuilder, file: &Path, json: bool) -> Result<i32> {
    let profile = load_profile(file, &config.loader, builder)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print_header(&format!("Profile of {}", file.display()));
        print_block(&profile.to_string());
        if profile.is_blank() {
            println!();
            print_warning("Nothing was recorded; this profile equals every other blank profile");
        }
    }
    Ok(EXIT_OK)
}

/// Print the digest of the bytes the loader reads from a file
pub fn digest_file(config: &Config, file: &Path) -> Result<i32> {
    let raw = load_file(file, config.loader.max_read_bytes)?;
    println!("{}  {} ({})", digest(&raw), file.display(), format_bytes(raw.len() as u64));
    Ok(EXIT_OK)
}

/// Compare two dumps
pub fn compare_files(
    config: &Config,
    builder: &ProfileBuilder,
    a: &Path,
    b: &Path,
    explain: bool,
) -> Result<i32> {
    let left = load_profile(a, &config.loader, builder)?;
    let right = load_profile(b, &config.loader, builder)?;

    print_header("Compare dumps");
    print_profile(&a.display().to_string(), &left);
    println!();
    print_profile(&b.display().to_string(), &right);
    print_divider();

    Ok(print_outcome(left.compare(&right), &left, &right, explain))
}

/// Read the card in the field
pub fn scan(config: &Config, builder: &ProfileBuilder, json: bool, save: Option<&Path>) -> Result<i32> {
    let mut reader = open_reader(config)?;
    let spinner = WaitSpinner::new("Waiting for a card...");
    let polled = reader.poll(config.scan.timeout());
    spinner.finish();
    let raw = polled?;

    if let Some(path) = save {
        ScanCapture::from_scan(&raw)
            .save(path)
            .with_context(|| format!("Failed to save capture to {}", path.display()))?;
        info!("Capture saved to {}", path.display());
    }

    let profile = builder.from_scan(&raw);
    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print_header(&format!("Card on {}", reader.info().name));
        print_block(&profile.to_string());
    }
    Ok(EXIT_OK)
}

/// Compare a dump with the card in the field
pub fn verify(config: &Config, builder: &ProfileBuilder, file: &Path, explain: bool) -> Result<i32> {
    let dump = load_profile(file, &config.loader, builder)?;
    let card = read_card(config, builder)?;

    print_header("Verify dump against card");
    print_profile(&file.display().to_string(), &dump);
    println!();
    print_profile("Card", &card);
    print_divider();

    Ok(print_outcome(dump.compare(&card), &dump, &card, explain))
}

/// Search a directory of dumps for a profile
pub fn find(
    config: &Config,
    builder: &ProfileBuilder,
    file: Option<&Path>,
    dir: &Path,
    no_recursive: bool,
    json: bool,
    shutdown_flag: Arc<AtomicBool>,
) -> Result<i32> {
    let probe = match file {
        Some(path) => load_profile(path, &config.loader, builder)?,
        None => read_card(config, builder)?,
    };

    let mut catalog_config = config.catalog.clone();
    if no_recursive {
        catalog_config.recursive = false;
    }

    let bar = CatalogProgressBar::new();
    let built = CatalogIndex::build(
        dir,
        &catalog_config,
        &config.loader,
        builder,
        shutdown_flag,
        |p| bar.update(&p),
    );
    bar.finish();

    let index = match built {
        Ok(index) => index,
        Err(NfcError::Interrupted(msg)) => {
            print_warning(&format!("Search interrupted ({}); no result", msg));
            return Ok(EXIT_INTERRUPTED);
        }
        Err(e) => return Err(e.into()),
    };

    let matches = index.find_matches(&probe);

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
    } else {
        print_header(&format!("Matches in {}", dir.display()));
        let stats = index.stats();
        print_info(&format!(
            "{} dump(s) catalogued, {} unreadable",
            stats.total_files, stats.errors
        ));
        if probe.is_blank() {
            print_warning("The profile is blank; it matches every blank dump");
        }
        println!();
        if matches.is_empty() {
            print_warning("No matching dumps");
        }
        for entry in &matches {
            print_success(&entry.path.display().to_string());
        }
        println!();
    }

    Ok(if matches.is_empty() {
        EXIT_DIFFERENT
    } else {
        EXIT_OK
    })
}

// ============================================================================
// Interactive session
// ============================================================================

const MENU: &[&str] = &[
    "Load dump A",
    "Load dump B",
    "Scan card",
    "Compare A with card",
    "Compare A with B",
    "Show slots",
    "Quit",
];

/// Menu-driven session over the three profile slots
pub fn interactive(config: &Config, builder: ProfileBuilder) -> Result<i32> {
    let mut reader: BoxedCardReader = match open_reader(config) {
        Ok(reader) => reader,
        Err(e) => {
            print_warning(&format!("{} Scanning will fail.", e));
            Box::new(NoReader)
        }
    };
    let mut session = Session::with_builder(config.clone(), builder);

    print_header("NFC Compare");

    loop {
        println!("  Status: {}", session.status());
        println!();

        let choice = Select::new()
            .with_prompt("Action")
            .items(MENU)
            .default(0)
            .interact()
            .map_err(|e| anyhow!("Failed to read input: {}", e))?;

        let action = match choice {
            0 => Action::LoadA(prompt_path("Path to dump A")?),
            1 => Action::LoadB(prompt_path("Path to dump B")?),
            2 => Action::Scan,
            3 => Action::CompareAWithCard,
            4 => Action::CompareAWithB,
            5 => {
                print_slots(&session);
                continue;
            }
            _ => break,
        };

        session.apply(action, reader.as_mut());
        println!();
    }

    Ok(EXIT_OK)
}

fn prompt_path(prompt: &str) -> Result<PathBuf> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .interact_text()
        .map_err(|e| anyhow!("Failed to read input: {}", e))?;
    Ok(PathBuf::from(input.trim()))
}

fn print_slots(session: &Session) {
    let slots = [
        ("Dump A", session.file_a()),
        ("Dump B", session.file_b()),
        ("Card", session.scanned()),
    ];
    for (label, slot) in slots {
        match slot {
            Some(profile) => print_profile(label, profile),
            None => println!("  {}: (empty)", label),
        }
        println!();
    }
}

// ============================================================================
// Configuration commands
// ============================================================================

/// Create, reset, or locate the configuration file
pub fn handle_config_command(show_path: bool, reset: bool) -> Result<()> {
    if reset {
        if let Some(config_path) = get_config_path() {
            if config_path.exists() {
                std::fs::remove_file(&config_path)?;
                info!("Removed existing config file");
            }
        }
        let path = init_config()?;
        info!("Created fresh config file at: {}", path.display());
        return Ok(());
    }

    let path = Config::get_active_config_path();
    println!("{}", path.display());
    if show_path {
        return Ok(());
    }

    if path.exists() {
        info!("Config file exists at: {}", path.display());
    } else {
        let created = init_config()?;
        info!("Created config file at: {}", created.display());
    }
    info!("Run 'nfc-compare show-config' to verify your settings.");
    Ok(())
}

/// Generate a configuration file at the specified or default location
pub fn generate_config_file(output: Option<PathBuf>) -> Result<()> {
    let output_path = match output {
        Some(path) => {
            std::fs::write(&path, Config::generate_default_config())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            path
        }
        None => init_config()?,
    };

    info!("Configuration file: {}", output_path.display());
    info!("Edit this file to customize loader, scan and catalog settings.");
    Ok(())
}

/// Show the current configuration settings
pub fn show_config(config: &Config) {
    let config_path = Config::get_active_config_path();
    info!("Configuration file: {}", config_path.display());
    if !config_path.exists() {
        info!("(Using default settings - no config file found)");
    }
    info!("");
    info!("[loader]");
    info!("  max_read_bytes = {}", config.loader.max_read_bytes);
    info!("");
    info!("[scan]");
    info!("  timeout_ms = {}", config.scan.timeout_ms);
    info!(
        "  capture_file = {}",
        config
            .scan
            .capture_file
            .as_ref()
            .map(|p| format!("\"{}\"", p.display()))
            .unwrap_or_else(|| "(none)".to_string())
    );
    info!("");
    info!("[catalog]");
    info!("  recursive = {}", config.catalog.recursive);
    info!("  follow_symlinks = {}", config.catalog.follow_symlinks);
    info!("  extensions = {:?}", config.catalog.extensions);
    info!("");
    info!("[logging]");
    info!("  level = \"{}\"", config.logging.level);
    info!("  log_to_file = {}", config.logging.log_to_file);
    info!("  log_file = \"{}\"", config.logging.log_file.display());
}

// ============================================================================
// Test commands
// ============================================================================

/// Handle test subcommands
pub fn handle_test_command(test_command: &TestCommands) -> Result<i32> {
    let runner_config = TestRunnerConfig {
        verbose: true,
        ..Default::default()
    };

    let summary = match test_command {
        TestCommands::RunAll { output, fail_fast } => {
            let mut runner = TestRunner::with_config(TestRunnerConfig {
                fail_fast: *fail_fast,
                report_dir: output.as_ref().map(|p| p.display().to_string()),
                ..runner_config
            });
            runner.run_all()
        }
        TestCommands::RunTag { tag } => {
            let mut runner = TestRunner::with_config(runner_config);
            runner.run_by_tag(tag)
        }
        TestCommands::Run { scenarios } => {
            let unknown: Vec<&str> = scenarios
                .iter()
                .map(String::as_str)
                .filter(|name| ScenarioLibrary::get_by_name(name).is_none())
                .collect();
            if !unknown.is_empty() {
                return Err(anyhow!(
                    "Unknown scenario(s): {}. Run 'nfc-compare test list'.",
                    unknown.join(", ")
                ));
            }
            let names: Vec<&str> = scenarios.iter().map(String::as_str).collect();
            let mut runner = TestRunner::with_config(runner_config);
            runner.run_by_names(&names)
        }
        TestCommands::List { tag } => {
            list_scenarios(tag.as_deref());
            return Ok(EXIT_OK);
        }
        TestCommands::ListTags => {
            list_tags();
            return Ok(EXIT_OK);
        }
    };

    Ok(if summary.all_passed() {
        EXIT_OK
    } else {
        EXIT_DIFFERENT
    })
}

fn list_scenarios(tag: Option<&str>) {
    match tag {
        None => testdb::print_available_scenarios(),
        Some(tag) => {
            let scenarios = ScenarioLibrary::scenarios_by_tag(tag);
            if scenarios.is_empty() {
                println!("No scenarios found with tag '{}'", tag);
                return;
            }
            print_header(&format!("Scenarios tagged '{}'", tag));
            for scenario in &scenarios {
                println!(
                    "  • {} - {} [{}]",
                    scenario.name,
                    scenario.description,
                    scenario.tags.join(", ")
                );
            }
            println!("\nTotal: {} scenarios", scenarios.len());
        }
    }
}

fn list_tags() {
    println!("\n📌 Available Tags for Filtering:\n");
    for tag in testdb::list_tags() {
        let count = ScenarioLibrary::scenarios_by_tag(&tag).len();
        println!("  • {} ({} scenarios)", tag, count);
    }
    println!();
    println!("Use: nfc-compare test run-tag <TAG>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ScanResult;
    use std::fs;
    use tempfile::TempDir;

    fn config_with_capture(dir: &TempDir, scan: &ScanResult) -> Config {
        let path = dir.path().join("card.json");
        ScanCapture::from_scan(scan).save(&path).unwrap();
        let mut config = Config::default();
        config.scan.capture_file = Some(path);
        config
    }

    #[test]
    fn test_compare_exit_status() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.nfc");
        let b = dir.path().join("b.nfc");
        fs::write(&a, "UID: 04 A1 B2 C3").unwrap();
        fs::write(&b, "UID: 04 A1 B2 C4").unwrap();

        let config = Config::default();
        let builder = ProfileBuilder::new();
        assert_eq!(compare_files(&config, &builder, &a, &a, false).unwrap(), EXIT_OK);
        assert_eq!(
            compare_files(&config, &builder, &a, &b, true).unwrap(),
            EXIT_DIFFERENT
        );
        assert!(compare_files(&config, &builder, &a, &dir.path().join("missing"), false).is_err());
    }

    #[test]
    fn test_verify_against_capture() {
        let dir = TempDir::new().unwrap();
        let dump = dir.path().join("dump.nfc");
        fs::write(&dump, "UID: 04 A1 B2 C3").unwrap();
        let config = config_with_capture(&dir, &ScanResult::with_uid(&[0x04, 0xA1, 0xB2, 0xC3]));

        let builder = ProfileBuilder::new();
        assert_eq!(verify(&config, &builder, &dump, false).unwrap(), EXIT_OK);
    }

    #[test]
    fn test_open_reader_requires_capture() {
        assert!(open_reader(&Config::default()).is_err());
    }

    #[test]
    fn test_scan_saves_capture() {
        let dir = TempDir::new().unwrap();
        let card = ScanResult::with_uid(&[0x01, 0x02]).atqa_sak([0x44, 0x00], 0x08);
        let config = config_with_capture(&dir, &card);
        let saved = dir.path().join("copy.json");

        scan(&config, &ProfileBuilder::new(), true, Some(&saved)).unwrap();
        let json = fs::read_to_string(&saved).unwrap();
        let replayed = ScanCapture::from_json(&json).unwrap().to_scan_result().unwrap();
        assert_eq!(replayed, card);
    }

    #[test]
    fn test_find_exit_status() {
        let dir = TempDir::new().unwrap();
        let dumps = dir.path().join("dumps");
        fs::create_dir(&dumps).unwrap();
        fs::write(dumps.join("one.nfc"), "UID: 0A 0B").unwrap();
        let probe = dir.path().join("probe.nfc");
        fs::write(&probe, "UID: 0A 0B").unwrap();
        let other = dir.path().join("other.nfc");
        fs::write(&other, "UID: 0C").unwrap();

        let config = Config::default();
        let builder = ProfileBuilder::new();
        let shutdown = Arc::new(AtomicBool::new(false));
        assert_eq!(
            find(&config, &builder, Some(&probe), &dumps, false, true, shutdown.clone()).unwrap(),
            EXIT_OK
        );
        assert_eq!(
            find(&config, &builder, Some(&other), &dumps, false, true, shutdown).unwrap(),
            EXIT_DIFFERENT
        );
    }

    #[test]
    fn test_find_interrupted_is_not_a_mismatch() {
        let dir = TempDir::new().unwrap();
        let dumps = dir.path().join("dumps");
        fs::create_dir(&dumps).unwrap();
        fs::write(dumps.join("one.nfc"), "UID: 0A 0B").unwrap();
        let wanted = dir.path().join("wanted.nfc");
        fs::write(&wanted, "UID: 0A 0B").unwrap();

        let status = find(
            &Config::default(),
            &ProfileBuilder::new(),
            Some(&wanted),
            &dumps,
            false,
            true,
            Arc::new(AtomicBool::new(true)),
        )
        .unwrap();
        assert_eq!(status, EXIT_INTERRUPTED);
        assert_ne!(status, EXIT_DIFFERENT);
    }

    #[test]
    fn test_generate_config_to_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("generated.toml");
        generate_config_file(Some(path.clone())).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.loader.max_read_bytes, Config::default().loader.max_read_bytes);
    }

    #[test]
    fn test_run_unknown_scenario_is_error() {
        let cmd = TestCommands::Run {
            scenarios: vec!["does_not_exist".to_string()],
        };
        assert!(handle_test_command(&cmd).is_err());
    }
}
