//! Minimum remote version gate
//!
//! Resources declare the oldest platform component version their endpoints
//! exist on. Versions are compared as semver after lenient normalisation:
//! platform builds report things like `7.125.4`, `v7.125` or
//! `7.125.4-rc.1+b27`.

use std::fmt;

use semver::Version;

use crate::diagnostics::Diagnostic;

/// Platform component whose version is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Platform,
    Access,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Platform => write!(f, "Platform"),
            Component::Access => write!(f, "Access"),
        }
    }
}

/// Result of a gate check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateResult {
    Supported,
    /// Version missing or unparseable; the check could not be made
    Unverified(String),
    Unsupported { reported: Version, minimum: Version },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionGate {
    pub component: Component,
    pub minimum: &'static str,
}

impl VersionGate {
    pub const fn access(minimum: &'static str) -> Self {
        Self {
            component: Component::Access,
            minimum,
        }
    }

    pub const fn platform(minimum: &'static str) -> Self {
        Self {
            component: Component::Platform,
            minimum,
        }
    }

    pub fn check(&self, reported: &str) -> GateResult {
        let Some(minimum) = parse_lenient(self.minimum) else {
            return GateResult::Unverified(format!("invalid minimum version '{}'", self.minimum));
        };

        if reported.trim().is_empty() {
            return GateResult::Unverified(format!("{} version was not reported", self.component));
        }

        match parse_lenient(reported) {
            // Pre-release builds of the minimum count as the minimum
            Some(v) if strip_pre(&v) >= minimum => GateResult::Supported,
            Some(v) => GateResult::Unsupported {
                reported: v,
                minimum,
            },
            None => GateResult::Unverified(format!(
                "{} version '{}' could not be parsed",
                self.component, reported
            )),
        }
    }

    /// Check and convert to a diagnostic for `resource`
    ///
    /// Unsupported versions are errors; unverifiable ones are warnings.
    pub fn diagnose(&self, resource: &str, reported: &str) -> Option<Diagnostic> {
        match self.check(reported) {
            GateResult::Supported => None,
            GateResult::Unverified(reason) => Some(Diagnostic::warning(
                "Unable to verify platform version",
                format!(
                    "{}; {} requires {} {} or later.",
                    reason, resource, self.component, self.minimum
                ),
            )),
            GateResult::Unsupported { reported, minimum } => Some(Diagnostic::error(
                "Unsupported platform version",
                format!(
                    "{} requires {} {} or later, but the platform reports {}.",
                    resource, self.component, minimum, reported
                ),
            )),
        }
    }
}

fn strip_pre(v: &Version) -> Version {
    Version::new(v.major, v.minor, v.patch)
}

/// Parse a version, filling missing minor/patch with zero
pub fn parse_lenient(raw: &str) -> Option<Version> {
    let trimmed = raw.trim().trim_start_matches(['v', 'V']);
    if let Ok(v) = Version::parse(trimmed) {
        return Some(v);
    }

    let core: &str = trimmed
        .split(|c: char| c == '-' || c == '+' || c.is_whitespace())
        .next()
        .unwrap_or_default();

    let mut parts = core.split('.').map(|p| p.parse::<u64>());
    let major = parts.next()?.ok()?;
    let minor = parts.next().unwrap_or(Ok(0)).ok()?;
    // Four-part builds keep the first three components
    let patch = parts.next().unwrap_or(Ok(0)).ok()?;

    Some(Version::new(major, minor, patch))
}
