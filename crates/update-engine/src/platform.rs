use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UpdateError};

/// Operating systems that release assets are published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Os {
    #[serde(rename = "darwin")]
    Darwin,
    #[serde(rename = "linux")]
    Linux,
    #[serde(rename = "windows")]
    Windows,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "darwin" => Some(Self::Darwin),
            "linux" => Some(Self::Linux),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }
}

impl FromStr for Os {
    type Err = ();

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(value).ok_or(())
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CPU architectures that release assets are published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "386")]
    X86,
    #[serde(rename = "amd64")]
    X64,
    #[serde(rename = "arm")]
    Arm,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86 => "386",
            Self::X64 => "amd64",
            Self::Arm => "arm",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "386" => Some(Self::X86),
            "amd64" | "x64" => Some(Self::X64),
            "arm" => Some(Self::Arm),
            _ => None,
        }
    }
}

impl FromStr for Arch {
    type Err = ();

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(value).ok_or(())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platform classification derived from an asset filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetInfo {
    pub os: Os,
    pub arch: Arch,
}

/// Extract the OS and architecture encoded in an asset filename.
///
/// Asset names end in `-<os>-<arch>[.ext]`, e.g.
/// `autoupdate-binary-darwin-386.dmg`. Tokens are matched
/// case-insensitively; an unknown OS or architecture token is an error,
/// never a default.
pub fn classify(filename: &str) -> Result<AssetInfo> {
    let mut tokens = filename.rsplitn(3, '-');
    let arch_token = tokens.next().unwrap_or("");
    let os_token = tokens.next().unwrap_or("");

    // The architecture token may carry a file extension ("386.dmg",
    // "amd64.v1").
    let arch_token = match arch_token.split_once('.') {
        Some((base, _)) => base,
        None => arch_token,
    };

    match (Os::parse(os_token), Arch::parse(arch_token)) {
        (Some(os), Some(arch)) => Ok(AssetInfo { os, arch }),
        _ => Err(UpdateError::UnrecognizedPlatform {
            filename: filename.to_string(),
        }),
    }
}
