//! Vault zones: the three fixed destination directories for sealed files.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Public,
    Encrypted,
    Classified,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Public, Zone::Encrypted, Zone::Classified];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Public => "public",
            Zone::Encrypted => "encrypted",
            Zone::Classified => "classified",
        }
    }

    /// Directory name under the vault root that holds artifacts of this zone.
    pub fn dir_name(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Zone::ALL
            .into_iter()
            .find(|z| z.as_str() == s)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid zone '{}': expected one of public, encrypted, classified",
                    s
                )
            })
    }
}
