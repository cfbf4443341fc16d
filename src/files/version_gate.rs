// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Version-gated setters: settings that only exist within a range of operator versions.

use crate::error::{Error, Result};
use semver::Version;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpperBound {
    /// Supported up to and including this version
    Inclusive(Version),
    /// Supported strictly below this version
    Exclusive(Version),
}

impl UpperBound {
    fn admits(&self, version: &Version) -> bool {
        match self {
            UpperBound::Inclusive(upto) => version <= upto,
            UpperBound::Exclusive(before) => version < before,
        }
    }
}

impl fmt::Display for UpperBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpperBound::Inclusive(v) => write!(f, "upto version {v}"),
            UpperBound::Exclusive(v) => write!(f, "before version {v}"),
        }
    }
}

/// Compatibility range of a single feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionGate {
    feature: &'static str,
    since: Option<Version>,
    upper: Option<UpperBound>,
}

impl VersionGate {
    pub fn new(feature: &'static str) -> Self {
        Self {
            feature,
            since: None,
            upper: None,
        }
    }

    pub fn since(mut self, version: Version) -> Self {
        self.since = Some(version);
        self
    }

    pub fn upto(mut self, version: Version) -> Self {
        self.upper = Some(UpperBound::Inclusive(version));
        self
    }

    pub fn before(mut self, version: Version) -> Self {
        self.upper = Some(UpperBound::Exclusive(version));
        self
    }

    pub fn feature(&self) -> &'static str {
        self.feature
    }

    pub fn admits(&self, version: &Version) -> bool {
        self.violated_bound(version).is_none()
    }

    /// Describe the bound `version` falls outside of, if any.
    pub fn violated_bound(&self, version: &Version) -> Option<String> {
        if let Some(since) = &self.since {
            if version < since {
                return Some(format!("from version {since}"));
            }
        }
        match &self.upper {
            Some(upper) if !upper.admits(version) => Some(upper.to_string()),
            _ => None,
        }
    }
}

/// Something carrying the operator version its settings target.
pub trait Versioned {
    fn version(&self) -> Option<&Version>;
}

/// Run `f` only when the target's version satisfies `gate`.
///
/// A target without a version counts as `0.0.0`. Out of range is not an error:
/// the call is skipped with a warning and `None` is returned.
pub fn supported_for<T, R>(
    target: &mut T,
    gate: &VersionGate,
    f: impl FnOnce(&mut T) -> R,
) -> Option<R>
where
    T: Versioned,
{
    let version = target
        .version()
        .cloned()
        .unwrap_or_else(|| Version::new(0, 0, 0));

    match gate.violated_bound(&version) {
        None => Some(f(target)),
        Some(bound) => {
            warn!(
                "Ignoring setting {} for version {}. Feature only supported {}",
                gate.feature, version, bound
            );
            None
        }
    }
}

/// Parse an operator version such as `2.6`, `2.6.0` or `2.6.0-156`.
///
/// Only the numeric release part is kept, so build suffixes never sort a
/// release below its own gate.
pub fn parse_version(raw: &str) -> Result<Version> {
    let release = raw.trim().split(['-', '+']).next().unwrap_or_default();
    let mut parts = [0u64; 3];
    let mut count = 0;

    for (i, part) in release.split('.').enumerate() {
        if i >= parts.len() {
            return Err(Error::InvalidVersion(raw.to_string()));
        }
        parts[i] = part
            .parse()
            .map_err(|_| Error::InvalidVersion(raw.to_string()))?;
        count += 1;
    }

    if count == 0 {
        return Err(Error::InvalidVersion(raw.to_string()));
    }
    Ok(Version::new(parts[0], parts[1], parts[2]))
}
