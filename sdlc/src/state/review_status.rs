//! Review status written into state by gate resolutions (and advisory by the
//! security and QA stages).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Outcome recorded for a gate.
///
/// Serialized as plain text: `"Approve"`, `"Denied"`, or the raw value for
/// anything else. Parsing is case-sensitive on the two canonical spellings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReviewStatus {
    Approve,
    Denied,
    /// A value outside the two canonical spellings; kept verbatim.
    Unrecognized(String),
}

impl ReviewStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "Approve" => ReviewStatus::Approve,
            "Denied" => ReviewStatus::Denied,
            other => ReviewStatus::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReviewStatus::Approve => "Approve",
            ReviewStatus::Denied => "Denied",
            ReviewStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, ReviewStatus::Denied)
    }
}

impl From<&str> for ReviewStatus {
    fn from(value: &str) -> Self {
        ReviewStatus::parse(value)
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReviewStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReviewStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ReviewStatus::parse(&raw))
    }
}

/// True when `status` is present and `Denied`.
pub fn is_denied(status: &Option<ReviewStatus>) -> bool {
    status.as_ref().is_some_and(ReviewStatus::is_denied)
}
