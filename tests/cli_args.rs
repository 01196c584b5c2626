use clap::Parser;
use tls_probe::cli::{Cli, PolicyPreset};
use tls_probe::config::{ProbeSettings, DEFAULT_TARGET, RELAXED_DISABLED_ALGORITHMS};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("tls-probe").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_defaults_probe_strict_against_configured_target() {
    let cli = parse(&[]);
    let policies = cli.policies();
    assert_eq!(policies.len(), 1);
    assert_eq!(policies[0].name(), "strict");
    assert!(policies[0].is_empty());
    assert_eq!(cli.target_url(&ProbeSettings::default()), DEFAULT_TARGET);
}

#[test]
fn test_relaxed_preset() {
    let cli = parse(&["--policy", "relaxed", "https://example.com/"]);
    assert_eq!(cli.policy, Some(PolicyPreset::Relaxed));
    let policies = cli.policies();
    assert_eq!(policies[0].name(), "relaxed");
    assert_eq!(policies[0].tokens().len(), RELAXED_DISABLED_ALGORITHMS.len());
    assert_eq!(
        cli.target_url(&ProbeSettings::default()),
        "https://example.com/"
    );
}

#[test]
fn test_free_form_tokens() {
    let cli = parse(&["--disable", "TLSv1.3, AES_256_GCM"]);
    let policies = cli.policies();
    assert_eq!(policies[0].tokens(), &["TLSv1.3", "AES_256_GCM"]);
}

#[test]
fn test_disable_conflicts_with_policy() {
    let result = Cli::try_parse_from(["tls-probe", "--policy", "strict", "--disable", "RC4"]);
    assert!(result.is_err());
}

#[test]
fn test_compare_runs_both_presets() {
    let cli = parse(&["--compare"]);
    let names: Vec<_> = cli.policies().iter().map(|p| p.name().to_string()).collect();
    assert_eq!(names, vec!["strict", "relaxed"]);
    assert!(Cli::try_parse_from(["tls-probe", "--compare", "--policy", "relaxed"]).is_err());
}

#[test]
fn test_timeout_overrides() {
    let cli = parse(&["--connect-timeout", "3", "--read-timeout", "7"]);
    let mut settings = ProbeSettings::default();
    cli.apply_overrides(&mut settings);
    assert_eq!(settings.connect_timeout_secs, 3);
    assert_eq!(settings.handshake_timeout_secs, 10);
    assert_eq!(settings.read_timeout_secs, 7);
}

#[test]
fn test_trace_handshake_filter() {
    let cli = Cli {
        url: None,
        policy: None,
        disable: None,
        compare: false,
        trace_handshake: true,
        connect_timeout: None,
        handshake_timeout: None,
        read_timeout: None,
        ca_file: None,
        config: None,
        json: false,
        no_color: false,
    };
    assert!(cli.log_filter().contains("rustls=trace"));
    assert!(!cli.show_progress());
}
