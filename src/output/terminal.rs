//! Terminal output formatting

use crate::config::policy;
use crate::models::{ProbeReport, ProbeResult, SessionInfo};
use console::style;

/// Print section header
pub fn print_header(title: &str) {
    println!();
    println!("{}", style(format!("━━━ {} ━━━", title)).cyan().bold());
    println!();
}

/// Print one probe report.
///
/// Success and the failure summary go to stdout; the failure classification
/// and cause chain go to stderr.
pub fn print_report(report: &ProbeReport) {
    println!(
        "  {} {}",
        style("Target:").dim(),
        style(&report.target).bold()
    );
    println!(
        "  {} {}",
        style("Policy:").dim(),
        policy::describe(&report.policy, &report.disabled_algorithms)
    );

    match &report.result {
        ProbeResult::Success {
            response_code,
            session,
        } => {
            println!(
                "  {} SSL connection successful! Response code: {}",
                style("✓").green(),
                style(response_code).bold()
            );
            println!("    {}", style(session_summary(session)).dim());
        }
        ProbeResult::Failure { message, .. } => {
            println!(
                "  {} SSL connection failed: {}",
                style("✗").red(),
                message
            );
            print_failure_details(&report.result);
        }
    }
}

/// Print the failure kind and cause chain of a failed result to stderr
pub fn print_failure_details(result: &ProbeResult) {
    if let ProbeResult::Failure { error_kind, .. } = result {
        eprintln!("{} {}", style("Failure kind:").red().bold(), error_kind);
    }
    if let Some(details) = failure_details(result) {
        eprint!("{}", details);
    }
}

/// Message and cause chain of a failed result, one entry per line
fn failure_details(result: &ProbeResult) -> Option<String> {
    let ProbeResult::Failure {
        message, causes, ..
    } = result
    else {
        return None;
    };

    let mut out = format!("{}\n", message);
    if !causes.is_empty() {
        out.push_str("\nCaused by:\n");
        for (i, cause) in causes.iter().enumerate() {
            out.push_str(&format!("  {}: {}\n", i, cause));
        }
    }
    Some(out)
}

/// Print several reports followed by a side-by-side outcome summary
pub fn print_comparison(reports: &[ProbeReport]) {
    for report in reports {
        print_header(&format!("Policy: {}", report.policy));
        print_report(report);
    }

    print_header("Comparison");
    let width = reports.iter().map(|r| r.policy.len()).max().unwrap_or(0);
    for report in reports {
        let outcome = match &report.result {
            ProbeResult::Success { response_code, .. } => style(format!(
                "{} ({})",
                report.result.outcome_label(),
                response_code
            ))
            .green(),
            ProbeResult::Failure { .. } => style(report.result.outcome_label()).red(),
        };
        println!("  {:width$}  {}", report.policy, outcome, width = width);
    }

    let first = reports.first().map(|r| r.result.outcome_label());
    if reports
        .iter()
        .all(|r| Some(r.result.outcome_label()) == first)
    {
        println!("\n  All policies produced the same outcome");
    } else {
        println!(
            "\n  {} Outcome depends on the policy",
            style("⚠").yellow()
        );
    }
}

fn session_summary(session: &SessionInfo) -> String {
    let mut parts = Vec::new();
    if let Some(protocol) = session.protocol {
        parts.push(protocol.to_string());
    }
    if let Some(suite) = &session.cipher_suite {
        parts.push(suite.name.clone());
    }
    if let Some(group) = &session.key_exchange_group {
        parts.push(group.clone());
    }
    if let Some(alpn) = &session.alpn {
        parts.push(format!("ALPN {}", alpn));
    }
    parts.push(format!("handshake {:.0} ms", session.handshake_ms));
    parts.join(" · ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CipherSuiteInfo, ErrorKind, TlsProtocol};

    #[test]
    fn test_failure_details() {
        let failure = ProbeResult::Failure {
            error_kind: ErrorKind::CertificateError,
            message: "TLS error with localhost".to_string(),
            causes: vec!["invalid peer certificate: UnknownIssuer".to_string()],
        };
        assert_eq!(
            failure_details(&failure).unwrap(),
            "TLS error with localhost\n\nCaused by:\n  0: invalid peer certificate: UnknownIssuer\n"
        );

        let success = ProbeResult::Success {
            response_code: 200,
            session: SessionInfo {
                protocol: None,
                cipher_suite: None,
                key_exchange_group: None,
                alpn: None,
                handshake_ms: 1.0,
            },
        };
        assert_eq!(failure_details(&success), None);
    }

    #[test]
    fn test_session_summary() {
        let session = SessionInfo {
            protocol: Some(TlsProtocol::Tls13),
            cipher_suite: Some(CipherSuiteInfo::from_name("TLS13_AES_256_GCM_SHA384")),
            key_exchange_group: Some("X25519".to_string()),
            alpn: None,
            handshake_ms: 41.6,
        };
        assert_eq!(
            session_summary(&session),
            "TLS 1.3 · TLS_AES_256_GCM_SHA384 · X25519 · handshake 42 ms"
        );
    }
}
