//! Pathfinder 2nd Edition rules vocabulary.
//!
//! PF2e uses a d20 + modifier vs DC system with four degrees of success.
//! The host encodes a degree as an integer index (0 = critical failure,
//! 3 = critical success) and, in newer versions, as a camelCase outcome
//! label (`"criticalFailure"`).

use serde::{Deserialize, Serialize};

use crate::common::normalize_phrase;

/// Slug of the Recall Knowledge action.
pub const RECALL_KNOWLEDGE_SLUG: &str = "recall-knowledge";

/// Skills that are used to Recall Knowledge about creatures.
pub const RECALL_KNOWLEDGE_SKILLS: [&str; 6] = [
    "arcana",
    "nature",
    "occultism",
    "religion",
    "society",
    "crafting",
];

/// Four degrees of success in PF2e.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DegreeOfSuccess {
    /// Miss DC by 10+ OR natural 1 that fails
    CriticalFailure,
    /// Below DC
    Failure,
    /// Meet or beat DC
    Success,
    /// Beat DC by 10+ OR natural 20 that succeeds
    CriticalSuccess,
}

impl DegreeOfSuccess {
    /// Index used by the host's roll data.
    pub fn index(self) -> i64 {
        match self {
            DegreeOfSuccess::CriticalFailure => 0,
            DegreeOfSuccess::Failure => 1,
            DegreeOfSuccess::Success => 2,
            DegreeOfSuccess::CriticalSuccess => 3,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(DegreeOfSuccess::CriticalFailure),
            1 => Some(DegreeOfSuccess::Failure),
            2 => Some(DegreeOfSuccess::Success),
            3 => Some(DegreeOfSuccess::CriticalSuccess),
            _ => None,
        }
    }

    /// Parse an outcome label, tolerant of case, separators and camelCase.
    ///
    /// `"criticalFailure"`, `"critical-failure"` and `"Critical Failure"`
    /// all parse to [`DegreeOfSuccess::CriticalFailure`].
    pub fn from_label(label: &str) -> Option<Self> {
        let squashed: String = normalize_phrase(&split_camel_case(label))
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        match squashed.as_str() {
            "criticalfailure" => Some(DegreeOfSuccess::CriticalFailure),
            "failure" => Some(DegreeOfSuccess::Failure),
            "success" => Some(DegreeOfSuccess::Success),
            "criticalsuccess" => Some(DegreeOfSuccess::CriticalSuccess),
            _ => None,
        }
    }

    pub fn is_critical_failure(self) -> bool {
        self == DegreeOfSuccess::CriticalFailure
    }

    pub fn label(self) -> &'static str {
        match self {
            DegreeOfSuccess::CriticalFailure => "critical failure",
            DegreeOfSuccess::Failure => "failure",
            DegreeOfSuccess::Success => "success",
            DegreeOfSuccess::CriticalSuccess => "critical success",
        }
    }
}

impl std::fmt::Display for DegreeOfSuccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether `skill` (a slug such as `"arcana"` or `"occultism"`) is one of
/// the Recall Knowledge skills.
pub fn is_recall_knowledge_skill(skill: &str) -> bool {
    let skill = skill.trim().to_ascii_lowercase();
    RECALL_KNOWLEDGE_SKILLS.contains(&skill.as_str())
}

fn split_camel_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len() + 4);
    let mut prev_lower = false;
    for ch in label.chars() {
        if ch.is_uppercase() && prev_lower {
            out.push(' ');
        }
        prev_lower = ch.is_lowercase();
        out.push(ch);
    }
    out
}
