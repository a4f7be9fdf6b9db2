//! CLI argument parsing and validation module
//!
//! Handles command-line interface using clap, including:
//! - Job selection and report window options
//! - Signature catalog and server settings path overrides
//! - Output format selection (human/JSON)
//! - Quiet mode, job listing, help and version commands

use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

use crate::constants::{DEFAULT_CATALOG_FILE, DEFAULT_HOURS_AGO};
use crate::models::ReportConfig;

fn build_command() -> Command {
    Command::new("buildtriage")
        .version(env!("BUILDTRIAGE_VERSION"))
        .about("Report on recent CI builds and classify failures against known causes")
        .long_about("Walks a job's recent build history on the CI server, matches failing builds' console logs against a catalog of known failure signatures, and prints a table correlating each build with probable causes and tracked bug references.")
        .arg(
            Arg::new("job-name")
                .short('j')
                .long("job-name")
                .value_name("JOB")
                .help("Name of job e.g. mojo_runner, test_charm_lint, or an alias from the settings file")
        )
        .arg(
            Arg::new("hours-ago")
                .short('t')
                .long("hours-ago")
                .value_name("HOURS")
                .help("Time period to report on (HOURS_AGO < time < now)")
        )
        .arg(
            Arg::new("include-success")
                .short('s')
                .long("include-success")
                .help("Whether to include successful runs")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("catalog")
                .short('c')
                .long("catalog")
                .value_name("PATH")
                .help("Signature catalog file (TOML, or JSON by extension)")
        )
        .arg(
            Arg::new("settings")
                .long("settings")
                .value_name("PATH")
                .help("Server settings file, overriding the per-user default")
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Output in JSON format")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress warnings about skipped builds and unavailable logs")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("list-jobs")
                .long("list-jobs")
                .help("List the server's job names and exit")
                .action(ArgAction::SetTrue)
        )
}

fn config_from(matches: &ArgMatches) -> Result<ReportConfig> {
    let hours_ago = match matches.get_one::<String>("hours-ago") {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| anyhow!("Invalid --hours-ago value: {}", raw))?,
        None => DEFAULT_HOURS_AGO,
    };
    if hours_ago <= 0 {
        return Err(anyhow!("--hours-ago must be a positive number of hours"));
    }

    let list_jobs = matches.get_flag("list-jobs");
    let job = matches.get_one::<String>("job-name").cloned();
    if job.is_none() && !list_jobs {
        return Err(anyhow!("--job-name is required unless --list-jobs is given"));
    }

    Ok(ReportConfig {
        job,
        hours_ago,
        include_success: matches.get_flag("include-success"),
        catalog_path: matches
            .get_one::<String>("catalog")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_FILE)),
        settings_path: matches.get_one::<String>("settings").map(PathBuf::from),
        json_output: matches.get_flag("json"),
        quiet: matches.get_flag("quiet"),
        list_jobs,
    })
}

/// Parse command line arguments and return the run configuration
pub fn parse_args() -> Result<ReportConfig> {
    config_from(&build_command().get_matches())
}
