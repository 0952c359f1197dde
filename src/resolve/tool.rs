//! Enrichment tools and the feature-set kinds each one accepts.

use crate::data::FeatureSetKind;
use crate::data::FeatureSetKind::{Gene, Ranked, Region};
use crate::filter::Direction;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An enrichment analysis tool producing per-feature-set result tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    /// Region-gene association enrichment.
    #[serde(rename = "GREAT")]
    Great,
    /// Locus overlap analysis on region sets.
    #[serde(rename = "LOLA")]
    Lola,
    /// Motif enrichment on region sets.
    #[serde(rename = "pycisTarget")]
    PycisTarget,
    /// Over-representation analysis.
    #[serde(rename = "ORA_GSEApy")]
    OraGseapy,
    /// Motif enrichment on gene sets.
    #[serde(rename = "RcisTarget")]
    RcisTarget,
    /// Pre-ranked gene set enrichment analysis.
    #[serde(rename = "preranked_GSEApy")]
    PrerankedGseapy,
}

/// Accepted kinds per tool, in pass order.
///
/// A tool listing several kinds receives every feature set of the first kind,
/// then every feature set of the next, each pass in annotation order.
const POLICIES: &[(Tool, &[FeatureSetKind])] = &[
    (Tool::Great, &[Region]),
    (Tool::Lola, &[Region]),
    (Tool::PycisTarget, &[Region]),
    (Tool::OraGseapy, &[Gene, Region]),
    (Tool::RcisTarget, &[Gene, Region]),
    (Tool::PrerankedGseapy, &[Ranked]),
];

impl Tool {
    /// Every known tool.
    pub const ALL: [Tool; 6] = [
        Tool::Great,
        Tool::Lola,
        Tool::PycisTarget,
        Tool::OraGseapy,
        Tool::RcisTarget,
        Tool::PrerankedGseapy,
    ];

    /// Identifier used in configuration files and result paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Great => "GREAT",
            Self::Lola => "LOLA",
            Self::PycisTarget => "pycisTarget",
            Self::OraGseapy => "ORA_GSEApy",
            Self::RcisTarget => "RcisTarget",
            Self::PrerankedGseapy => "preranked_GSEApy",
        }
    }

    /// Look up a tool by identifier.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Feature-set kinds this tool accepts, in pass order.
    pub fn accepted_kinds(&self) -> &'static [FeatureSetKind] {
        POLICIES
            .iter()
            .find(|(tool, _)| tool == self)
            .map(|(_, kinds)| *kinds)
            .unwrap_or(&[])
    }

    /// Direction in which this tool's adjusted statistic is significant.
    ///
    /// The cisTarget tools report a normalised enrichment score where larger
    /// is better; the others report adjusted p-values.
    pub fn default_direction(&self) -> Direction {
        match self {
            Self::PycisTarget | Self::RcisTarget => Direction::HigherIsSignificant,
            _ => Direction::LowerIsSignificant,
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown tool '{}'", s))
    }
}

/// Accepted kinds for a tool identifier; unknown tools accept nothing.
pub fn accepted_kinds_for(tool: &str) -> &'static [FeatureSetKind] {
    Tool::parse(tool).map(|t| t.accepted_kinds()).unwrap_or(&[])
}

/// Default significance direction for a tool identifier.
pub fn default_direction_for(tool: &str) -> Direction {
    Tool::parse(tool)
        .map(|t| t.default_direction())
        .unwrap_or(Direction::LowerIsSignificant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip_names() {
        for tool in Tool::ALL {
            assert_eq!(Tool::parse(tool.as_str()), Some(tool));
        }
        assert_eq!("ORA_GSEApy".parse::<Tool>().unwrap(), Tool::OraGseapy);
        assert!("HOMER".parse::<Tool>().is_err());
        assert_eq!(Tool::parse("great"), None);
    }

    #[test]
    fn test_every_tool_has_a_policy() {
        for tool in Tool::ALL {
            assert!(!tool.accepted_kinds().is_empty(), "{} has no policy", tool);
        }
    }

    #[test]
    fn test_policies() {
        assert_eq!(accepted_kinds_for("GREAT"), &[Region]);
        assert_eq!(accepted_kinds_for("LOLA"), &[Region]);
        assert_eq!(accepted_kinds_for("pycisTarget"), &[Region]);
        assert_eq!(accepted_kinds_for("ORA_GSEApy"), &[Gene, Region]);
        assert_eq!(accepted_kinds_for("RcisTarget"), &[Gene, Region]);
        assert_eq!(accepted_kinds_for("preranked_GSEApy"), &[Ranked]);
        assert!(accepted_kinds_for("HOMER").is_empty());
    }

    #[test]
    fn test_default_direction() {
        assert_eq!(default_direction_for("pycisTarget"), Direction::HigherIsSignificant);
        assert_eq!(default_direction_for("RcisTarget"), Direction::HigherIsSignificant);
        assert_eq!(default_direction_for("ORA_GSEApy"), Direction::LowerIsSignificant);
        assert_eq!(default_direction_for("HOMER"), Direction::LowerIsSignificant);
    }

    #[test]
    fn test_serde_names() {
        let yaml = serde_yaml::to_string(&Tool::PrerankedGseapy).unwrap();
        assert_eq!(yaml.trim(), "preranked_GSEApy");
    }
}
