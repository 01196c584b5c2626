//! tls-probe - TLS handshake diagnostic probe
//!
//! Attempts one HTTPS GET against a target under a disabled-algorithm
//! policy and reports the response code or the classified failure.

use anyhow::Context;
use clap::Parser;
use console::style;
use tls_probe::checks::HandshakeProbe;
use tls_probe::cli::Cli;
use tls_probe::config;
use tls_probe::output;
use tls_probe::utils::progress::create_spinner;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_target(cli.trace_handshake)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            std::process::exit(2);
        }
    }
}

/// Returns whether every probe obtained a response code
async fn run(cli: Cli) -> anyhow::Result<bool> {
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let mut settings =
        config::load_settings(cli.config.as_deref()).context("Failed to load settings")?;
    cli.apply_overrides(&mut settings.probe);
    settings.probe.validate()?;

    let url = cli.target_url(&settings.probe);
    let policies = cli.policies();

    let mut probe = HandshakeProbe::new(settings.probe);
    if let Some(path) = &cli.ca_file {
        probe = probe.with_extra_roots(config::load_ca_file(path)?);
    }

    let spinner = create_spinner(&format!("Probing {}...", url), cli.show_progress());
    let reports = probe.compare(&url, &policies).await;
    spinner.finish_and_clear();

    match (cli.json, reports.as_slice()) {
        (true, [report]) => output::print_json(report)?,
        (true, _) => output::print_json_list(&reports)?,
        (false, [report]) => output::print_report(report),
        (false, _) => output::print_comparison(&reports),
    }
    if cli.json {
        for report in &reports {
            output::print_failure_details(&report.result);
        }
    }

    Ok(reports.iter().all(|r| r.result.is_success()))
}
