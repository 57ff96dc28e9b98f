//! Swift sanity runner
//!
//! Runs the object storage sanity scenarios against one region and exits
//! with a non-zero status when any of them fails.

use clap::{Arg, ArgAction, Command};
use std::path::Path;
use swift_sanity::{
    logging, HttpFixtureProvider, InMemoryStorage, LogLevel, ResourceNamer, SanityConfig,
    Scenario, StorageClient, SuiteRunner, SwiftClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("swift-sanity")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Object storage sanity tests for a region")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to the JSON settings file")
                .required_unless_present("list"),
        )
        .arg(
            Arg::new("region")
                .short('r')
                .long("region")
                .help("Region to test (overrides the settings file and OS_REGION_NAME)"),
        )
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .help("Scenario to run; repeat to run several (default: all)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("backend")
                .long("backend")
                .help("Storage backend to run against")
                .value_parser(["swift", "memory"])
                .default_value("swift"),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .help("Write the suite report as JSON to this path"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .help("trace, debug, info, warn or error")
                .default_value("info"),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help("List available scenarios and exit")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .map(|s| s.parse::<LogLevel>())
        .transpose()?
        .unwrap_or_default();
    logging::init(level);

    if matches.get_flag("list") {
        println!("Available scenarios:");
        for scenario in Scenario::ALL {
            println!("  {:<40} {}", scenario.name(), scenario.description());
        }
        return Ok(());
    }

    let config_path = matches
        .get_one::<String>("config")
        .ok_or("--config is required")?;
    let mut config = SanityConfig::from_file(Path::new(config_path))?;
    config.apply_env_overrides();
    if let Some(region) = matches.get_one::<String>("region") {
        config.region = Some(region.clone());
    }
    config.validate()?;

    let scenarios = match matches.get_many::<String>("scenario") {
        Some(names) => names
            .map(|name| name.parse::<Scenario>())
            .collect::<Result<Vec<_>, _>>()?,
        None => Scenario::ALL.to_vec(),
    };

    let fixtures = HttpFixtureProvider::with_timeout(
        &config.swift.resources_path,
        config.swift.request_timeout_secs,
    )?;

    let client: Box<dyn StorageClient> = match matches.get_one::<String>("backend").map(String::as_str) {
        Some("memory") => Box::new(InMemoryStorage::new()),
        _ => Box::new(SwiftClient::connect(&config).await?),
    };

    let report = SuiteRunner::new(client.as_ref(), &fixtures, &config.swift)
        .namer(ResourceNamer::new(config.naming))
        .region(config.region.clone())
        .run(&scenarios)
        .await;

    println!(
        "Region {}: {} passed, {} failed ({} ms)",
        report.region.as_deref().unwrap_or("default"),
        report.passed(),
        report.failed(),
        report.duration_ms
    );
    for scenario in &report.scenarios {
        match &scenario.outcome {
            swift_sanity::Outcome::Passed => println!("  ✓ {}", scenario.scenario),
            swift_sanity::Outcome::Failed { message } => {
                println!("  ✗ {} - {}", scenario.scenario, message)
            }
        }
    }
    for resource in report.leaked() {
        eprintln!("Leaked resource: {}", resource);
    }

    if let Some(path) = matches.get_one::<String>("report") {
        std::fs::write(path, report.to_json()?)?;
    }

    if !report.is_success() {
        std::process::exit(1);
    }

    Ok(())
}
