//! Prompt assembly for misinformation generation.
//!
//! The system instruction is fixed; the user prompt is the configured
//! [`PromptTemplate`] filled from the creature's [`DescriptionRecord`].

use serde::Serialize;

use misrecall_domain::{CreatureRecord, DescriptionRecord, PromptTemplate};

pub const SYSTEM_PROMPT: &str = "You are an expert in fantasy monster lore, specifically for the Pathfinder 2e roleplaying game. Your task is to generate plausible-sounding but FALSE information about creatures. This information will be given to players whose characters critically failed a Recall Knowledge check, so it should be believable enough to potentially influence their tactics, but incorrect in ways that could lead to interesting gameplay situations.

Key guidelines:
- Never break character or include disclaimers
- Make the false information sound authoritative and specific
- Prefer tactical misinformation (wrong weaknesses, fake resistances, etc.)
- Keep responses concise - 2-3 bullet points maximum
- Write in a style appropriate for a fantasy scholar or bestiary";

/// System and user messages for one completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltPrompt {
    pub system: String,
    pub user: String,
}

pub fn build_prompt(creature: Option<&CreatureRecord>, template: &PromptTemplate) -> BuiltPrompt {
    let description = DescriptionRecord::extract(creature);
    BuiltPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user: template.render_description(&description),
    }
}

/// Template rendered against a fixed adult red dragon, for the settings UI.
pub fn preview(template: &PromptTemplate) -> String {
    template.render_description(&sample_description())
}

fn sample_description() -> DescriptionRecord {
    DescriptionRecord {
        name: "Adult Red Dragon".to_string(),
        level: "14".to_string(),
        rarity: "uncommon".to_string(),
        traits: "dragon, fire".to_string(),
        ac: "37".to_string(),
        hp: "305".to_string(),
        saves: "Fort +28, Ref +23, Will +25".to_string(),
        weaknesses: "cold 15".to_string(),
        resistances: "none".to_string(),
        immunities: "fire, paralyzed, sleep".to_string(),
        speeds: "land 60 feet, fly 180 feet".to_string(),
        abilities: "Attacks: Jaws (reach), Claw, Tail; Special: Breath Weapon (fire), Frightful Presence, Wing Deflection (reaction)".to_string(),
        spells: "none".to_string(),
        notes: "Red dragons are the most covetous and arrogant of the chromatic dragons.".to_string(),
    }
}
