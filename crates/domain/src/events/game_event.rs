//! Host chat message as seen by the classifier
//!
//! Mirrors the subset of the host's chat-message JSON the heuristics read.
//! Every field is optional and unknown fields are ignored, since the host
//! schema drifts between versions. Degree-of-success values may arrive as
//! numbers (`0..=3`) or labels (`"criticalFailure"`), so they are kept as raw
//! JSON-ish [`Degree`] values and interpreted by the classifier.

use serde::{Deserialize, Serialize};

use crate::game_systems::DegreeOfSuccess;
use crate::ids::UserId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameEvent {
    pub id: Option<String>,
    pub content: String,
    pub author: Option<EventAuthor>,
    pub rolls: Vec<RollResult>,
    pub outcome: Option<Degree>,
    pub degree_of_success: Option<Degree>,
    pub flags: EventFlags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventAuthor {
    pub id: Option<UserId>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollResult {
    pub degree_of_success: Option<Degree>,
    pub options: RollOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollOptions {
    pub degree_of_success: Option<Degree>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFlags {
    pub target: Option<ActorRef>,
    pub pf2e: Pf2eFlags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pf2eFlags {
    pub context: Option<CheckContext>,
    pub modifiers: Vec<ModifierFlag>,
    pub origin: Option<OriginFlag>,
    pub dc: Option<ActorRef>,
}

/// Structured context the game system attaches to a check roll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckContext {
    /// e.g. `"skill-check"`
    #[serde(rename = "type")]
    pub check_type: Option<String>,
    pub action: Option<String>,
    /// Roll options such as `"action:recall-knowledge"`
    pub options: Vec<String>,
    pub domains: Vec<String>,
    /// Skill or statistic slug, e.g. `"arcana"`
    pub statistic: Option<String>,
    pub outcome: Option<Degree>,
    pub target: Option<ActorRef>,
    pub dc: Option<ActorRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierFlag {
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OriginFlag {
    pub actor: Option<String>,
    pub uuid: Option<String>,
    pub slug: Option<String>,
    #[serde(rename = "type")]
    pub origin_type: Option<String>,
}

/// An `{ actor: "<id or uuid>" }` reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorRef {
    pub actor: Option<String>,
}

impl ActorRef {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: Some(actor.into()),
        }
    }
}

/// Degree of success as the host sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Degree {
    Index(i64),
    Label(String),
}

impl Degree {
    pub fn resolve(&self) -> Option<DegreeOfSuccess> {
        match self {
            Degree::Index(index) => DegreeOfSuccess::from_index(*index),
            Degree::Label(label) => DegreeOfSuccess::from_label(label),
        }
    }

    pub fn is_critical_failure(&self) -> bool {
        self.resolve()
            .is_some_and(DegreeOfSuccess::is_critical_failure)
    }
}

impl From<DegreeOfSuccess> for Degree {
    fn from(degree: DegreeOfSuccess) -> Self {
        Degree::Index(degree.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_message_shape() {
        let json = r#"{
            "id": "msg1",
            "content": "Recall Knowledge",
            "author": {"id": "player1", "name": "Alice"},
            "rolls": [{"options": {"degreeOfSuccess": 0}}],
            "flags": {
                "pf2e": {
                    "context": {
                        "type": "skill-check",
                        "options": ["action:recall-knowledge"],
                        "statistic": "arcana",
                        "outcome": "criticalFailure",
                        "target": {"actor": "Actor.dragon01"}
                    },
                    "modifiers": [{"slug": "recall-knowledge-bonus"}],
                    "origin": {"actor": "Actor.pc1", "type": "action"}
                },
                "core": {"ignored": true}
            }
        }"#;

        let event: GameEvent = serde_json::from_str(json).expect("valid event");
        let context = event.flags.pf2e.context.as_ref().expect("context");
        assert_eq!(context.check_type.as_deref(), Some("skill-check"));
        assert_eq!(context.outcome, Some(Degree::Label("criticalFailure".into())));
        assert_eq!(event.rolls[0].options.degree_of_success, Some(Degree::Index(0)));
        assert_eq!(event.flags.pf2e.modifiers[0].slug, "recall-knowledge-bonus");
        assert_eq!(
            event.author.and_then(|a| a.id),
            Some(UserId::new("player1"))
        );
    }

    #[test]
    fn empty_object_is_a_valid_event() {
        let event: GameEvent = serde_json::from_str("{}").expect("valid event");
        assert_eq!(event, GameEvent::default());
    }

    #[test]
    fn degree_accepts_numbers_and_labels() {
        assert!(Degree::Index(0).is_critical_failure());
        assert!(Degree::Label("critical-failure".into()).is_critical_failure());
        assert!(!Degree::Index(1).is_critical_failure());
        assert!(!Degree::Label("banana".into()).is_critical_failure());
    }
}
