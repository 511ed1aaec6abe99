//! Creature entity - a read-only projection of a host NPC actor
//!
//! The host owns the actor; the adapter serializes the parts this crate
//! cares about and hands them over as JSON. Every field is defaulted so a
//! partially populated actor (older system versions, homebrew creatures)
//! still deserializes.

use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::ActorId;

/// Host actor document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActorKind {
    /// Monsters and non-player characters
    Npc,
    /// Player characters
    Character,
    Hazard,
    Familiar,
    Vehicle,
    Loot,
    Party,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ActorKind {
    /// Only NPC actors are creatures that can be recalled.
    pub fn is_creature(self) -> bool {
        self == ActorKind::Npc
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureRecord {
    pub id: ActorId,
    #[serde(rename = "type", default)]
    pub kind: ActorKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub level: i32,
    #[serde(default = "default_rarity")]
    pub rarity: String,
    #[serde(default, deserialize_with = "labels")]
    pub traits: Vec<String>,
    #[serde(default)]
    pub defenses: Defenses,
    #[serde(default)]
    pub offenses: Offenses,
    #[serde(default)]
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub spells: Vec<Spell>,
    #[serde(default)]
    pub description: CreatureDescription,
}

fn default_rarity() -> String {
    "common".to_string()
}

impl CreatureRecord {
    /// Create a bare NPC record; the builders fill in the rest.
    pub fn npc(id: impl Into<ActorId>, name: impl Into<String>, level: i32) -> Self {
        Self {
            id: id.into(),
            kind: ActorKind::Npc,
            name: name.into(),
            level,
            rarity: default_rarity(),
            traits: Vec::new(),
            defenses: Defenses::default(),
            offenses: Offenses::default(),
            abilities: Vec::new(),
            spells: Vec::new(),
            description: CreatureDescription::default(),
        }
    }

    pub fn with_traits<I, S>(mut self, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.traits = traits.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rarity(mut self, rarity: impl Into<String>) -> Self {
        self.rarity = rarity.into();
        self
    }

    pub fn with_weakness(mut self, weakness: DamageAdjustment) -> Self {
        self.defenses.weaknesses.push(weakness);
        self
    }

    pub fn with_resistance(mut self, resistance: DamageAdjustment) -> Self {
        self.defenses.resistances.push(resistance);
        self
    }

    pub fn with_immunity(mut self, immunity: impl Into<String>) -> Self {
        self.defenses.immunities.push(immunity.into());
        self
    }

    pub fn with_attack(mut self, attack: Attack) -> Self {
        self.offenses.attacks.push(attack);
        self
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    pub fn with_public_notes(mut self, notes: impl Into<String>) -> Self {
        self.description.public_notes = notes.into();
        self
    }

    pub fn is_creature(&self) -> bool {
        self.kind.is_creature()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Defenses {
    pub ac: i32,
    pub hp: i32,
    #[serde(deserialize_with = "labels")]
    pub immunities: Vec<String>,
    pub resistances: Vec<DamageAdjustment>,
    pub weaknesses: Vec<DamageAdjustment>,
    pub saves: Saves,
}

/// A resistance or weakness: `fire 10 (except magical)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageAdjustment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: i32,
    #[serde(default, deserialize_with = "labels")]
    pub exceptions: Vec<String>,
}

impl DamageAdjustment {
    pub fn new(kind: impl Into<String>, value: i32) -> Self {
        Self {
            kind: kind.into(),
            value,
            exceptions: Vec::new(),
        }
    }

    pub fn except<I, S>(mut self, exceptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exceptions = exceptions.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Saves {
    pub fortitude: i32,
    pub reflex: i32,
    pub will: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Offenses {
    pub attacks: Vec<Attack>,
    pub speeds: Vec<Speed>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttackKind {
    #[default]
    Melee,
    Ranged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: AttackKind,
    #[serde(default)]
    pub bonus: i32,
    #[serde(default)]
    pub damage: Vec<DamageRoll>,
    #[serde(default, deserialize_with = "labels")]
    pub traits: Vec<String>,
}

impl Attack {
    pub fn melee(name: impl Into<String>, bonus: i32) -> Self {
        Self {
            name: name.into(),
            kind: AttackKind::Melee,
            bonus,
            damage: Vec::new(),
            traits: Vec::new(),
        }
    }

    pub fn with_damage(mut self, formula: impl Into<String>, damage_type: impl Into<String>) -> Self {
        self.damage.push(DamageRoll {
            damage: formula.into(),
            damage_type: damage_type.into(),
        });
        self
    }

    pub fn with_traits<I, S>(mut self, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.traits = traits.into_iter().map(Into::into).collect();
        self
    }

    /// `"2d8+10 piercing plus 2d6 fire"`, or `"unknown"` when no roll has
    /// both a formula and a type.
    pub fn damage_summary(&self) -> String {
        let parts: Vec<String> = self
            .damage
            .iter()
            .filter(|roll| !roll.damage.is_empty() && !roll.damage_type.is_empty())
            .map(|roll| format!("{} {}", roll.damage, roll.damage_type))
            .collect();

        if parts.is_empty() {
            "unknown".to_string()
        } else {
            parts.join(" plus ")
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DamageRoll {
    pub damage: String,
    pub damage_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speed {
    #[serde(rename = "type", default = "default_speed_kind")]
    pub kind: String,
    #[serde(default)]
    pub value: i32,
}

fn default_speed_kind() -> String {
    "land".to_string()
}

/// Action category of a creature ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionCategory {
    Action,
    Reaction,
    Free,
    #[default]
    #[serde(other)]
    Passive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub name: String,
    #[serde(default)]
    pub action_type: ActionCategory,
    /// Action cost for `Action` abilities (1 to 3)
    #[serde(default)]
    pub actions: Option<u8>,
    /// Rich text as stored by the host
    #[serde(default)]
    pub description: String,
}

impl Ability {
    pub fn new(name: impl Into<String>, action_type: ActionCategory) -> Self {
        Self {
            name: name.into(),
            action_type,
            actions: None,
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub name: String,
    #[serde(default)]
    pub rank: u8,
    #[serde(default, deserialize_with = "labels")]
    pub traditions: Vec<String>,
    #[serde(default, deserialize_with = "labels")]
    pub traits: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatureDescription {
    /// Full narrative, rich text
    pub public_notes: String,
    /// One-line tagline
    pub blurb: String,
}

/// Hosts store label lists either as plain strings or as `{ value }` /
/// `{ type }` objects depending on system version.
#[derive(Deserialize)]
#[serde(untagged)]
enum Label {
    Plain(String),
    Value { value: String },
    Typed {
        #[serde(rename = "type")]
        kind: String,
    },
}

fn labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Label>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|label| match label {
            Label::Plain(s) | Label::Value { value: s } | Label::Typed { kind: s } => s,
        })
        .filter(|s| !s.is_empty())
        .collect())
}
