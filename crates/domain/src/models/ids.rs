//! Human-readable identifier families.
//!
//! Every persisted record carries a `<PREFIX><number>` identifier with the
//! number zero-padded to three digits. Numbers past 999 simply widen.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum rendered width of the numeric suffix.
pub const ID_PAD_WIDTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdFamily {
    Company,
    Location,
    Admin,
    Patrol,
    Workflow,
    Checklist,
    Scan,
    Signature,
    Media,
    History,
}

impl IdFamily {
    pub const ALL: [IdFamily; 10] = [
        IdFamily::Company,
        IdFamily::Location,
        IdFamily::Admin,
        IdFamily::Patrol,
        IdFamily::Workflow,
        IdFamily::Checklist,
        IdFamily::Scan,
        IdFamily::Signature,
        IdFamily::Media,
        IdFamily::History,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            IdFamily::Company => "CMP",
            IdFamily::Location => "LOC",
            IdFamily::Admin => "ADM",
            IdFamily::Patrol => "PTR",
            IdFamily::Workflow => "WF",
            IdFamily::Checklist => "CHK",
            IdFamily::Scan => "SCN",
            IdFamily::Signature => "SIG",
            IdFamily::Media => "MMD",
            IdFamily::History => "HIS",
        }
    }

    /// Renders `n` as an identifier of this family.
    pub fn render(&self, n: u64) -> String {
        format!("{}{:0width$}", self.prefix(), n, width = ID_PAD_WIDTH)
    }

    /// First identifier handed out for an empty family.
    pub fn seed(&self) -> String {
        self.render(1)
    }

    /// Numeric suffix of a well-formed identifier of this family.
    pub fn parse_suffix(&self, id: &str) -> Option<u64> {
        let digits = id.strip_prefix(self.prefix())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Next counter value given the stored counter and the identifiers
    /// already present. Malformed identifiers are ignored.
    pub fn next_value<'a>(&self, counter: u64, existing: impl IntoIterator<Item = &'a str>) -> u64 {
        let highest = existing
            .into_iter()
            .filter_map(|id| self.parse_suffix(id))
            .max()
            .unwrap_or(0);
        counter.max(highest) + 1
    }
}

impl fmt::Display for IdFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

impl std::str::FromStr for IdFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IdFamily::ALL
            .iter()
            .copied()
            .find(|family| family.prefix() == s)
            .ok_or_else(|| format!("Unknown identifier family: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_seed_per_family() {
        assert_eq!(IdFamily::Workflow.seed(), "WF001");
        assert_eq!(IdFamily::Checklist.seed(), "CHK001");
        assert_eq!(IdFamily::Media.seed(), "MMD001");
        assert_eq!(IdFamily::Patrol.seed(), "PTR001");
    }

    #[test]
    fn test_render_widens_past_three_digits() {
        assert_eq!(IdFamily::Scan.render(42), "SCN042");
        assert_eq!(IdFamily::Scan.render(999), "SCN999");
        assert_eq!(IdFamily::Scan.render(1000), "SCN1000");
        assert_eq!(IdFamily::Scan.render(123456), "SCN123456");
    }

    #[test]
    fn test_parse_suffix() {
        assert_eq!(IdFamily::Checklist.parse_suffix("CHK007"), Some(7));
        assert_eq!(IdFamily::Checklist.parse_suffix("CHK1000"), Some(1000));
        assert_eq!(IdFamily::Checklist.parse_suffix("CHK"), None);
        assert_eq!(IdFamily::Checklist.parse_suffix("CHK00a"), None);
        assert_eq!(IdFamily::Checklist.parse_suffix("WF001"), None);
        assert_eq!(IdFamily::Checklist.parse_suffix("CHK-01"), None);
    }

    #[test]
    fn test_next_value_follows_highest_existing() {
        let existing = ["WF001", "WF007", "WF003"];
        assert_eq!(IdFamily::Workflow.next_value(0, existing), 8);
    }

    #[test]
    fn test_next_value_ignores_malformed() {
        let existing = ["WF002", "legacy-id", "WFabc"];
        assert_eq!(IdFamily::Workflow.next_value(0, existing), 3);
    }

    #[test]
    fn test_next_value_never_goes_backwards() {
        assert_eq!(IdFamily::Workflow.next_value(10, ["WF004"]), 11);
        assert_eq!(IdFamily::Workflow.next_value(0, std::iter::empty()), 1);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(IdFamily::from_str("HIS").unwrap(), IdFamily::History);
        assert!(IdFamily::from_str("XYZ").is_err());
        for family in IdFamily::ALL {
            assert_eq!(IdFamily::from_str(family.prefix()).unwrap(), family);
        }
    }
}
