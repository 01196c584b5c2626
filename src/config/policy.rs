//! Disabled-algorithm policies
//!
//! A policy is an ordered list of opaque tokens in the familiar
//! `jdk.tls.disabledAlgorithms` style (`"SSLv3, TLSv1, RC4, EC keySize < 224"`).
//! Tokens are matched against rustls' names for protocol versions, cipher
//! suites, key exchange groups and signature schemes. A token that matches
//! nothing the provider offers is inert, never an error.
//!
//! Policies are applied by building a restricted [`CryptoProvider`] for one
//! client configuration; nothing is installed process-wide.

use crate::utils::PolicyError;
use rustls::crypto::CryptoProvider;
use rustls::{NamedGroup, ProtocolVersion, SignatureScheme, SupportedCipherSuite};
use serde::Serialize;
use std::fmt;

/// Tokens of the relaxed preset: only the weakest primitives stay disabled
pub const RELAXED_DISABLED_ALGORITHMS: &[&str] = &[
    "SSLv3",
    "TLSv1",
    "TLSv1.1",
    "DTLSv1.0",
    "RC4",
    "DES",
    "MD5withRSA",
    "DH keySize < 1024",
    "EC keySize < 224",
    "3DES_EDE_CBC",
    "anon",
    "NULL",
];

/// An immutable disabled-algorithm policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsPolicy {
    name: String,
    tokens: Vec<String>,
}

impl TlsPolicy {
    /// Provider defaults with no extra restriction
    pub fn strict() -> Self {
        Self {
            name: "strict".to_string(),
            tokens: Vec::new(),
        }
    }

    /// Disable only the weakest primitives
    pub fn relaxed() -> Self {
        Self {
            name: "relaxed".to_string(),
            tokens: RELAXED_DISABLED_ALGORITHMS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }

    /// A policy from explicit tokens; blank entries are dropped
    pub fn custom<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: "custom".to_string(),
            tokens: tokens
                .into_iter()
                .map(|t| t.as_ref().trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Parse a comma-separated token list
    pub fn parse(list: &str) -> Self {
        Self::custom(list.split(','))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Interpreted form of each token, in order
    pub fn rules(&self) -> Vec<DisabledAlgorithm> {
        self.tokens
            .iter()
            .map(|t| DisabledAlgorithm::parse(t))
            .collect()
    }

    /// Whether any token disables this signature scheme
    pub fn disables_scheme(&self, scheme: SignatureScheme) -> bool {
        self.rules().iter().any(|r| r.matches_scheme(scheme))
    }

    /// Restrict `provider` to what this policy still permits
    pub fn restrict(&self, provider: CryptoProvider) -> Result<RestrictedProvider, PolicyError> {
        let rules = self.rules();

        let mut versions: Vec<&'static rustls::SupportedProtocolVersion> = rustls::ALL_VERSIONS
            .iter()
            .copied()
            .filter(|v| !rules.iter().any(|r| r.matches_version(v.version)))
            .collect();
        if versions.is_empty() {
            return Err(PolicyError::NoProtocolVersions {
                policy: self.name.clone(),
            });
        }

        let cipher_suites: Vec<SupportedCipherSuite> = provider
            .cipher_suites
            .iter()
            .copied()
            .filter(|s| versions.iter().any(|v| v.version == s.version().version))
            .filter(|s| !rules.iter().any(|r| r.matches_suite(*s)))
            .collect();
        versions.retain(|v| cipher_suites.iter().any(|s| s.version().version == v.version));
        if cipher_suites.is_empty() || versions.is_empty() {
            return Err(PolicyError::NoCipherSuites {
                policy: self.name.clone(),
            });
        }

        let kx_groups: Vec<_> = provider
            .kx_groups
            .iter()
            .copied()
            .filter(|g| !rules.iter().any(|r| r.matches_group(g.name())))
            .collect();
        if kx_groups.is_empty() {
            return Err(PolicyError::NoKeyExchangeGroups {
                policy: self.name.clone(),
            });
        }

        let schemes = provider.signature_verification_algorithms.supported_schemes();
        let inert = rules
            .iter()
            .zip(&self.tokens)
            .filter(|(rule, _)| {
                !rustls::ALL_VERSIONS.iter().any(|v| rule.matches_version(v.version))
                    && !provider.cipher_suites.iter().any(|s| rule.matches_suite(*s))
                    && !provider.kx_groups.iter().any(|g| rule.matches_group(g.name()))
                    && !schemes.iter().any(|s| rule.matches_scheme(*s))
            })
            .map(|(_, token)| token.clone())
            .collect();

        Ok(RestrictedProvider {
            provider: CryptoProvider {
                cipher_suites,
                kx_groups,
                ..provider
            },
            versions,
            inert,
        })
    }
}

impl fmt::Display for TlsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(&self.name, &self.tokens))
    }
}

/// One-line form of a policy name and its tokens
pub fn describe(name: &str, tokens: &[String]) -> String {
    if tokens.is_empty() {
        format!("{} (provider defaults)", name)
    } else {
        format!("{} [{}]", name, tokens.join(", "))
    }
}

/// Provider state left after a policy was applied
pub struct RestrictedProvider {
    pub provider: CryptoProvider,
    pub versions: Vec<&'static rustls::SupportedProtocolVersion>,
    /// Tokens that matched nothing the provider offers
    pub inert: Vec<String>,
}

/// Comparison operator in a key size constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
}

impl Comparison {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "<" => Some(Comparison::Less),
            "<=" => Some(Comparison::LessOrEqual),
            ">" => Some(Comparison::Greater),
            ">=" => Some(Comparison::GreaterOrEqual),
            "==" => Some(Comparison::Equal),
            "!=" => Some(Comparison::NotEqual),
            _ => None,
        }
    }

    fn holds(self, size: u32, bound: u32) -> bool {
        match self {
            Comparison::Less => size < bound,
            Comparison::LessOrEqual => size <= bound,
            Comparison::Greater => size > bound,
            Comparison::GreaterOrEqual => size >= bound,
            Comparison::Equal => size == bound,
            Comparison::NotEqual => size != bound,
        }
    }
}

/// One interpreted policy token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisabledAlgorithm {
    /// A protocol version such as `TLSv1.1`
    Protocol(ProtocolVersion),
    /// `<family> keySize <op> <bits>`
    KeySize {
        family: String,
        comparison: Comparison,
        bits: u32,
    },
    /// `<digest>with<algorithm>`, e.g. `SHA1withRSA`
    Signature { digest: String, algorithm: String },
    /// Any other name, as upper-cased `_`-separated segments
    Name(Vec<String>),
}

impl DisabledAlgorithm {
    pub fn parse(token: &str) -> Self {
        let token = token.trim();

        if let Some(version) = parse_protocol(token) {
            return DisabledAlgorithm::Protocol(version);
        }

        let words: Vec<&str> = token.split_whitespace().collect();
        if let [family, keyword, op, bits] = words.as_slice() {
            if keyword.eq_ignore_ascii_case("keySize") {
                if let (Some(comparison), Ok(bits)) = (Comparison::parse(op), bits.parse()) {
                    return DisabledAlgorithm::KeySize {
                        family: family.to_ascii_uppercase(),
                        comparison,
                        bits,
                    };
                }
            }
        }

        if words.len() == 1 && !token.contains('_') {
            if let Some(at) = token.to_ascii_lowercase().find("with") {
                let (digest, algorithm) = (&token[..at], &token[at + "with".len()..]);
                if !digest.is_empty() && !algorithm.is_empty() {
                    return DisabledAlgorithm::Signature {
                        digest: digest.replace('-', "").to_ascii_uppercase(),
                        algorithm: algorithm.to_ascii_uppercase(),
                    };
                }
            }
        }

        DisabledAlgorithm::Name(segments(token))
    }

    pub fn matches_version(&self, version: ProtocolVersion) -> bool {
        matches!(self, DisabledAlgorithm::Protocol(v) if *v == version)
    }

    pub fn matches_suite(&self, suite: SupportedCipherSuite) -> bool {
        match self {
            DisabledAlgorithm::Name(wanted) => contains_run(&suite_segments(suite), wanted),
            _ => false,
        }
    }

    pub fn matches_group(&self, group: NamedGroup) -> bool {
        match self {
            DisabledAlgorithm::Name(wanted) => {
                let name = format!("{:?}", group).to_ascii_uppercase();
                wanted.len() == 1 && wanted[0] == name
            }
            DisabledAlgorithm::KeySize {
                family,
                comparison,
                bits,
            } => match group_key_size(group) {
                Some((group_family, size)) => {
                    family == group_family && comparison.holds(size, *bits)
                }
                None => false,
            },
            _ => false,
        }
    }

    pub fn matches_scheme(&self, scheme: SignatureScheme) -> bool {
        let name = segments(&format!("{:?}", scheme));
        match self {
            DisabledAlgorithm::Name(wanted) => contains_run(&name, wanted),
            DisabledAlgorithm::Signature { digest, algorithm } => {
                let algorithm_matches = if algorithm.contains("MGF1") {
                    name.iter().any(|s| s == "PSS")
                } else if algorithm == "EC" || algorithm == "ECDSA" {
                    name.iter().any(|s| s == "ECDSA")
                } else if algorithm == "RSA" {
                    // PKCS#1 v1.5 only; PSS is named `<digest>withRSAandMGF1`
                    name.iter().any(|s| s == "RSA") && name.iter().any(|s| s == "PKCS1")
                } else {
                    name.iter().any(|s| s == algorithm)
                };
                algorithm_matches && name.iter().any(|s| s == digest)
            }
            _ => false,
        }
    }
}

fn parse_protocol(token: &str) -> Option<ProtocolVersion> {
    let version = match token.to_ascii_lowercase().as_str() {
        "sslv2" => ProtocolVersion::SSLv2,
        "sslv3" => ProtocolVersion::SSLv3,
        "tlsv1" | "tlsv1.0" => ProtocolVersion::TLSv1_0,
        "tlsv1.1" => ProtocolVersion::TLSv1_1,
        "tlsv1.2" => ProtocolVersion::TLSv1_2,
        "tlsv1.3" => ProtocolVersion::TLSv1_3,
        "dtlsv1.0" => ProtocolVersion::DTLSv1_0,
        "dtlsv1.2" => ProtocolVersion::DTLSv1_2,
        "dtlsv1.3" => ProtocolVersion::DTLSv1_3,
        _ => return None,
    };
    Some(version)
}

fn segments(name: &str) -> Vec<String> {
    name.split(['_', '-'])
        .filter(|s| !s.is_empty())
        .map(|s| s.to_ascii_uppercase())
        .collect()
}

/// IANA-style segments of a suite name (`TLS13_` is printed as `TLS_`)
fn suite_segments(suite: SupportedCipherSuite) -> Vec<String> {
    let name = format!("{:?}", suite.suite());
    segments(&name.replacen("TLS13_", "TLS_", 1))
}

fn contains_run(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

fn group_key_size(group: NamedGroup) -> Option<(&'static str, u32)> {
    match group {
        NamedGroup::secp256r1 => Some(("EC", 256)),
        NamedGroup::secp384r1 => Some(("EC", 384)),
        NamedGroup::secp521r1 => Some(("EC", 521)),
        NamedGroup::X25519 => Some(("XDH", 255)),
        NamedGroup::X448 => Some(("XDH", 448)),
        NamedGroup::FFDHE2048 => Some(("DH", 2048)),
        NamedGroup::FFDHE3072 => Some(("DH", 3072)),
        NamedGroup::FFDHE4096 => Some(("DH", 4096)),
        NamedGroup::FFDHE6144 => Some(("DH", 6144)),
        NamedGroup::FFDHE8192 => Some(("DH", 8192)),
        _ => None,
    }
}
