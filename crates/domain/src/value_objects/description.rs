//! Flat, human-readable description of a creature for prompt filling
//!
//! Built once per generation from a [`CreatureRecord`] and consumed by the
//! prompt template. Every facet is already a display string; an empty facet
//! is spelled out (`"none"`, `"no special traits"`) so the model never sees
//! a blank line it might misinterpret.

use serde::{Deserialize, Serialize};

use crate::common::strip_html;
use crate::entities::{ActionCategory, CreatureRecord, DamageAdjustment};

/// How many attacks and abilities make it into the `abilities` facet.
const MAX_ATTACKS: usize = 3;
const MAX_ATTACK_TRAITS: usize = 2;
const MAX_ABILITIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionRecord {
    pub name: String,
    pub level: String,
    pub rarity: String,
    pub traits: String,
    pub ac: String,
    pub hp: String,
    pub saves: String,
    pub weaknesses: String,
    pub resistances: String,
    pub immunities: String,
    pub speeds: String,
    pub abilities: String,
    pub spells: String,
    pub notes: String,
}

impl DescriptionRecord {
    /// Project a creature into display strings. `None` yields the
    /// "unknown creature" record.
    pub fn extract(creature: Option<&CreatureRecord>) -> Self {
        let Some(creature) = creature else {
            return Self::unknown();
        };

        let defenses = &creature.defenses;
        Self {
            name: creature.name.clone(),
            level: creature.level.to_string(),
            rarity: creature.rarity.clone(),
            traits: format_traits(&creature.traits, &creature.rarity),
            ac: defenses.ac.to_string(),
            hp: defenses.hp.to_string(),
            saves: format!(
                "Fort {:+}, Ref {:+}, Will {:+}",
                defenses.saves.fortitude, defenses.saves.reflex, defenses.saves.will
            ),
            weaknesses: format_adjustments(&defenses.weaknesses),
            resistances: format_adjustments(&defenses.resistances),
            immunities: join_or(&defenses.immunities, "none"),
            speeds: format_speeds(creature),
            abilities: format_abilities(creature),
            spells: format_spells(creature),
            notes: creature_notes(creature),
        }
    }

    fn unknown() -> Self {
        Self {
            name: "Unknown Creature".to_string(),
            level: "?".to_string(),
            rarity: "common".to_string(),
            traits: "unknown".to_string(),
            ac: "?".to_string(),
            hp: "?".to_string(),
            saves: "unknown".to_string(),
            weaknesses: "none known".to_string(),
            resistances: "none known".to_string(),
            immunities: "none known".to_string(),
            speeds: "unknown".to_string(),
            abilities: "none known".to_string(),
            spells: "none known".to_string(),
            notes: "none".to_string(),
        }
    }

    /// Placeholder name/value pairs, in template documentation order.
    pub fn variables(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("name", self.name.as_str()),
            ("level", self.level.as_str()),
            ("traits", self.traits.as_str()),
            ("weaknesses", self.weaknesses.as_str()),
            ("resistances", self.resistances.as_str()),
            ("immunities", self.immunities.as_str()),
            ("abilities", self.abilities.as_str()),
            ("notes", self.notes.as_str()),
            ("rarity", self.rarity.as_str()),
            ("ac", self.ac.as_str()),
            ("hp", self.hp.as_str()),
            ("saves", self.saves.as_str()),
            ("speeds", self.speeds.as_str()),
            ("spells", self.spells.as_str()),
        ]
    }

    /// Names of every placeholder a template may use.
    pub fn placeholder_names() -> Vec<&'static str> {
        Self::unknown().variables().into_iter().map(|(k, _)| k).collect()
    }
}

/// One-line summary: `"Goblin Warrior - Level 1 - goblin, humanoid"`.
pub fn creature_summary(creature: Option<&CreatureRecord>) -> String {
    let Some(creature) = creature else {
        return "Unknown creature".to_string();
    };

    let mut parts = vec![creature.name.clone()];
    if creature.level != 0 {
        parts.push(format!("Level {}", creature.level));
    }
    if !creature.traits.is_empty() {
        parts.push(
            creature
                .traits
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
        );
    }
    parts.join(" - ")
}

fn format_traits(traits: &[String], rarity: &str) -> String {
    let mut all = Vec::with_capacity(traits.len() + 1);
    if !rarity.is_empty() && rarity != "common" {
        all.push(rarity.to_string());
    }
    all.extend(traits.iter().cloned());
    join_or(&all, "no special traits")
}

fn format_adjustments(adjustments: &[DamageAdjustment]) -> String {
    let parts: Vec<String> = adjustments
        .iter()
        .map(|adj| {
            let mut text = format!("{} {}", adj.kind, adj.value);
            if !adj.exceptions.is_empty() {
                text.push_str(&format!(" (except {})", adj.exceptions.join(", ")));
            }
            text
        })
        .collect();
    join_or(&parts, "none")
}

fn format_speeds(creature: &CreatureRecord) -> String {
    let parts: Vec<String> = creature
        .offenses
        .speeds
        .iter()
        .filter(|speed| speed.value > 0)
        .map(|speed| format!("{} {} feet", speed.kind, speed.value))
        .collect();
    join_or(&parts, "none")
}

fn format_abilities(creature: &CreatureRecord) -> String {
    let mut parts = Vec::new();

    let attacks: Vec<String> = creature
        .offenses
        .attacks
        .iter()
        .take(MAX_ATTACKS)
        .map(|attack| {
            if attack.traits.is_empty() {
                attack.name.clone()
            } else {
                let traits: Vec<&str> = attack
                    .traits
                    .iter()
                    .take(MAX_ATTACK_TRAITS)
                    .map(String::as_str)
                    .collect();
                format!("{} ({})", attack.name, traits.join(", "))
            }
        })
        .collect();
    if !attacks.is_empty() {
        parts.push(format!("Attacks: {}", attacks.join(", ")));
    }

    let abilities: Vec<String> = creature
        .abilities
        .iter()
        .take(MAX_ABILITIES)
        .map(|ability| match ability.action_type {
            ActionCategory::Reaction => format!("{} (reaction)", ability.name),
            ActionCategory::Free => format!("{} (free)", ability.name),
            ActionCategory::Action | ActionCategory::Passive => ability.name.clone(),
        })
        .collect();
    if !abilities.is_empty() {
        parts.push(format!("Special: {}", abilities.join(", ")));
    }

    if parts.is_empty() {
        "standard creature abilities".to_string()
    } else {
        parts.join("; ")
    }
}

fn format_spells(creature: &CreatureRecord) -> String {
    let parts: Vec<String> = creature
        .spells
        .iter()
        .map(|spell| {
            if spell.rank == 0 {
                format!("{} (cantrip)", spell.name)
            } else {
                format!("{} (rank {})", spell.name, spell.rank)
            }
        })
        .collect();
    join_or(&parts, "none")
}

/// Public notes win over the blurb; rich text is flattened.
fn creature_notes(creature: &CreatureRecord) -> String {
    let notes = strip_html(&creature.description.public_notes);
    if !notes.is_empty() {
        return notes;
    }
    let blurb = creature.description.blurb.trim();
    if blurb.is_empty() {
        "none".to_string()
    } else {
        blurb.to_string()
    }
}

fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}
