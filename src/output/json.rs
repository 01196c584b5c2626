//! JSON output formatter

use crate::models::ProbeReport;

/// Print a single report as JSON to stdout
pub fn print_json(report: &ProbeReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

/// Print several reports as a JSON array to stdout
pub fn print_json_list(reports: &[ProbeReport]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    println!("{}", json);
    Ok(())
}
