//! Region Value Object
//!
//! Free-text geographic label (usually a state or province) used for
//! caller affinity. Compared case-insensitively after trimming.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Region {
    label: String,
    key: String,
}

impl Region {
    /// Parse a region label. Blank input means "no region".
    pub fn parse(value: impl AsRef<str>) -> Option<Self> {
        let label = value.as_ref().trim();
        if label.is_empty() {
            return None;
        }
        Some(Self {
            label: label.to_string(),
            key: label.to_lowercase(),
        })
    }

    /// The trimmed label as entered
    pub fn as_str(&self) -> &str {
        &self.label
    }

    /// Lowercased matching key
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Region {}

impl std::hash::Hash for Region {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.label
    }
}

impl TryFrom<String> for Region {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Region::parse(value).ok_or("region cannot be blank")
    }
}
