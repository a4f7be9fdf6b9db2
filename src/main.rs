#![forbid(unsafe_code)]

use anyhow::{anyhow, Context, Result};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use buildtriage::catalog::Catalog;
use buildtriage::cli;
use buildtriage::models::ReportWindow;
use buildtriage::report;
use buildtriage::server::jenkins::JenkinsServer;
use buildtriage::server::BuildServer;
use buildtriage::settings::{ServerSettings, SettingsError, EXAMPLE_SETTINGS};

fn main() -> Result<()> {
    let config = cli::parse_args()?;

    init_tracing(config.quiet);

    // Set up interrupt handling: a partial report still gets rendered.
    let interrupted = Arc::new(AtomicBool::new(false));
    let _ = signal_hook::flag::register(signal_hook::consts::SIGINT, interrupted.clone());
    let _ = signal_hook::flag::register(signal_hook::consts::SIGTERM, interrupted.clone());

    // Catalog and settings both load before any fetch; failures here abort
    // the run with a non-zero exit.
    let catalog = Catalog::load(&config.catalog_path).with_context(|| {
        format!(
            "loading signature catalog {}",
            config.catalog_path.display()
        )
    })?;

    let settings_path = match &config.settings_path {
        Some(path) => path.clone(),
        None => ServerSettings::default_path()?,
    };
    let settings = match ServerSettings::load(&settings_path) {
        Ok(settings) => settings,
        Err(SettingsError::Missing { path }) => {
            eprintln!("Server settings file not found");
            eprintln!("Please create {}", path.display());
            eprintln!("\nExample contents:");
            eprintln!("{}", EXAMPLE_SETTINGS);
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    let server = JenkinsServer::connect(&settings).context("connecting to the CI server")?;

    if config.list_jobs {
        for name in server.list_jobs().context("listing jobs")? {
            println!("{}", name);
        }
        return Ok(());
    }

    let requested = config
        .job
        .as_deref()
        .ok_or_else(|| anyhow!("--job-name is required"))?;
    let job = settings.resolve_job(requested);

    let window = ReportWindow::ending_now(config.hours_ago, config.include_success);
    let output = report::run_report(&server, &catalog, job, window, &interrupted)
        .with_context(|| format!("reporting on job '{}'", job))?;

    if config.json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", report::render_human(&output));
    }

    Ok(())
}

fn init_tracing(quiet: bool) {
    let default_filter = if quiet { "error" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
