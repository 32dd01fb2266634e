use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UpdateError};

/// Semantic version attached to a published asset.
///
/// Thin wrapper over [`semver::Version`]. Ordering follows semantic-version
/// precedence: numeric major/minor/patch comparison, then pre-release tags,
/// with a plain release sorting above its own pre-releases.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(semver::Version);

impl Version {
    /// Parse a `MAJOR.MINOR.PATCH[-pre]` string.
    ///
    /// Release tags conventionally carry a leading `v` ("v1.2.3"), which is
    /// accepted and stripped.
    pub fn parse(value: &str) -> Result<Self> {
        let inner = semver::Version::parse(value.trim_start_matches('v'))?;
        Ok(Self(inner))
    }

    pub fn as_semver(&self) -> &semver::Version {
        &self.0
    }
}

impl FromStr for Version {
    type Err = UpdateError;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
