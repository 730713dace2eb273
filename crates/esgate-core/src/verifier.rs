//! Product verification.
//!
//! The trusted product changed how it identifies itself across releases:
//! 6.x reports a tagline, 7.0–7.13 a tagline plus build flavor, and 7.14
//! onwards a dedicated response header. [`RULES`] encodes that history as
//! an ordered table of (version range, required evidence) rows; the first
//! row whose range contains the reported version decides. New releases get
//! a new row, existing rows are never rewritten.
//!
//! Every failure, whether an old version, an unparseable one or missing
//! evidence, is reported as the same [`ClientError::NotTrustedProduct`].

use tracing::debug;

use crate::config::{DEFAULT_BUILD_FLAVOR, PRODUCT_HEADER, PRODUCT_NAME, YOU_KNOW_FOR_SEARCH};
use crate::error::{ClientError, ClientResult};
use crate::transport::{Headers, Response, StatusClass};
use crate::version::{Segment, VersionSpec};

/// The `version` object of the root document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub number: String,
    pub tagline: Option<String>,
    pub build_flavor: Option<String>,
}

/// What the verifier needs to know about the bootstrap response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: StatusClass,
    pub headers: Headers,
    /// Present only when `version.number` is a string.
    pub version: Option<VersionRecord>,
}

impl From<&Response> for ProbeResponse {
    fn from(response: &Response) -> Self {
        let text = |path: &str| response.dig_str(path).map(String::from);
        let version = text("version.number").map(|number| VersionRecord {
            number,
            tagline: text("version.tagline"),
            build_flavor: text("version.build_flavor"),
        });

        Self {
            status: response.status_class(),
            headers: response.headers.clone(),
            version,
        }
    }
}

impl ProbeResponse {
    fn tagline(&self) -> Option<&str> {
        self.version.as_ref()?.tagline.as_deref()
    }

    fn build_flavor(&self) -> Option<&str> {
        self.version.as_ref()?.build_flavor.as_deref()
    }
}

/// One end of a version range.
#[derive(Debug, Clone)]
pub enum Bound {
    Unbounded,
    Included(VersionSpec),
    Excluded(VersionSpec),
}

/// Which versions a rule applies to.
#[derive(Debug, Clone)]
pub enum VersionMatch {
    Exact(VersionSpec),
    Range { lower: Bound, upper: Bound },
}

impl VersionMatch {
    pub fn matches(&self, version: &VersionSpec) -> bool {
        match self {
            Self::Exact(v) => version == v,
            Self::Range { lower, upper } => {
                let above = match lower {
                    Bound::Unbounded => true,
                    Bound::Included(v) => version >= v,
                    Bound::Excluded(v) => version > v,
                };
                let below = match upper {
                    Bound::Unbounded => true,
                    Bound::Included(v) => version <= v,
                    Bound::Excluded(v) => version < v,
                };
                above && below
            }
        }
    }
}

/// Evidence a rule requires before the server is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    /// No evidence is sufficient.
    Rejected,
    /// `x-elastic-product: Elasticsearch`.
    ProductHeader,
    /// `version.tagline` is the product tagline.
    Tagline,
    /// Tagline plus `version.build_flavor == "default"`.
    TaglineAndDefaultFlavor,
}

impl Evidence {
    pub fn is_present(self, probe: &ProbeResponse) -> bool {
        match self {
            Self::Rejected => false,
            Self::ProductHeader => probe.headers.get(PRODUCT_HEADER) == Some(PRODUCT_NAME),
            Self::Tagline => probe.tagline() == Some(YOU_KNOW_FOR_SEARCH),
            Self::TaglineAndDefaultFlavor => {
                probe.tagline() == Some(YOU_KNOW_FOR_SEARCH)
                    && probe.build_flavor() == Some(DEFAULT_BUILD_FLAVOR)
            }
        }
    }
}

/// A row of the verification table.
#[derive(Debug, Clone)]
pub struct VerificationRule {
    pub name: &'static str,
    pub versions: VersionMatch,
    pub evidence: Evidence,
}

const V6_0_0: VersionSpec = VersionSpec::release(6, 0, 0);
const V7_0_0: VersionSpec = VersionSpec::release(7, 0, 0);
const V7_14_0_SNAPSHOT: VersionSpec = VersionSpec::pre_release(7, 14, 0, "SNAPSHOT");
const V7_X_SNAPSHOT: VersionSpec =
    VersionSpec::from_parts(7, Segment::Wildcard, Segment::Wildcard, Some("SNAPSHOT"));

/// The verification table, in precedence order.
///
/// A version matching no row (exactly `6.0.0`) is rejected.
pub const RULES: &[VerificationRule] = &[
    VerificationRule {
        name: "unsupported",
        versions: VersionMatch::Range {
            lower: Bound::Unbounded,
            upper: Bound::Excluded(V6_0_0),
        },
        evidence: Evidence::Rejected,
    },
    VerificationRule {
        name: "7.x-snapshot",
        versions: VersionMatch::Exact(V7_X_SNAPSHOT),
        evidence: Evidence::ProductHeader,
    },
    VerificationRule {
        name: "product-header",
        versions: VersionMatch::Range {
            lower: Bound::Included(V7_14_0_SNAPSHOT),
            upper: Bound::Unbounded,
        },
        evidence: Evidence::ProductHeader,
    },
    VerificationRule {
        name: "tagline",
        versions: VersionMatch::Range {
            lower: Bound::Excluded(V6_0_0),
            upper: Bound::Excluded(V7_0_0),
        },
        evidence: Evidence::Tagline,
    },
    VerificationRule {
        name: "tagline-default-flavor",
        versions: VersionMatch::Range {
            lower: Bound::Included(V7_0_0),
            upper: Bound::Excluded(V7_14_0_SNAPSHOT),
        },
        evidence: Evidence::TaglineAndDefaultFlavor,
    },
];

/// Classifies a bootstrap response against a rule table.
#[derive(Debug, Clone, Copy)]
pub struct ProductVerifier {
    rules: &'static [VerificationRule],
}

impl Default for ProductVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductVerifier {
    /// A verifier using [`RULES`].
    pub fn new() -> Self {
        Self { rules: RULES }
    }

    /// A verifier using a custom table.
    pub fn with_rules(rules: &'static [VerificationRule]) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'static [VerificationRule] {
        self.rules
    }

    /// Returns the rule that accepted the server.
    pub fn verify(&self, probe: &ProbeResponse) -> ClientResult<&'static VerificationRule> {
        if probe.status != StatusClass::Success {
            debug!(status = ?probe.status, "probe did not succeed");
            return Err(ClientError::NotTrustedProduct);
        }

        let Some(record) = &probe.version else {
            debug!("probe response has no version number");
            return Err(ClientError::NotTrustedProduct);
        };

        let version: VersionSpec = record.number.parse().map_err(|e| {
            debug!(error = %e, "unparseable server version");
            ClientError::NotTrustedProduct
        })?;

        let Some(rule) = self.rules.iter().find(|r| r.versions.matches(&version)) else {
            debug!(version = %version, "no verification rule covers server version");
            return Err(ClientError::NotTrustedProduct);
        };

        if rule.evidence.is_present(probe) {
            debug!(version = %version, rule = rule.name, "server verified");
            Ok(rule)
        } else {
            debug!(
                version = %version,
                rule = rule.name,
                evidence = ?rule.evidence,
                "required evidence missing"
            );
            Err(ClientError::NotTrustedProduct)
        }
    }
}
