//! Stakeholder sections of the marketing site.
//!
//! Each audience-specific landing page tags its chat requests with one of
//! these labels so the assistant can bias tone and framing.  The set is
//! closed: an unknown label is a deserialization error, not a free string.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Audience segment a chat request originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StakeholderSection {
    /// Independent practices and optometrists.
    Providers,
    /// Pharmaceutical partnership audience.
    Pharma,
    /// Health-record vendors and integrators.
    Ehr,
    /// Large technology partners.
    BigTech,
}

impl StakeholderSection {
    /// Human-readable name used inside the system prompt.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Providers => "Providers",
            Self::Pharma => "Pharma",
            Self::Ehr => "EHR",
            Self::BigTech => "Big Tech",
        }
    }
}

impl std::fmt::Display for StakeholderSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deserializes_lowercase_labels() {
        let s: StakeholderSection = serde_json::from_str("\"pharma\"").unwrap();
        assert_eq!(s, StakeholderSection::Pharma);
        let s: StakeholderSection = serde_json::from_str("\"bigtech\"").unwrap();
        assert_eq!(s, StakeholderSection::BigTech);
    }

    #[test]
    fn rejects_unknown_label() {
        let r = serde_json::from_str::<StakeholderSection>("\"investors\"");
        assert!(r.is_err());
    }
}
