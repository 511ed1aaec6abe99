//! User-editable prompt template with `{{ name }}` placeholders
//!
//! Substitution is total: every placeholder in the template is replaced, by
//! its value when one is supplied and by the empty string otherwise. An
//! unterminated `{{` is left as literal text since it is not a placeholder.

use serde::{Deserialize, Serialize};

use super::description::DescriptionRecord;

pub const DEFAULT_PROMPT_TEMPLATE: &str = "You are a mischievous sage who enjoys spreading plausible but incorrect information about monsters. An adventurer has critically failed their attempt to recall knowledge about a creature.

CREATURE FACTS (DO NOT REVEAL THESE - USE THEM TO CREATE CONVINCING LIES):
Name: {{name}}
Level: {{level}}
Type: {{traits}}
Weaknesses: {{weaknesses}}
Resistances: {{resistances}}
Immunities: {{immunities}}
Notable Abilities: {{abilities}}
Notes/Description: {{notes}}

Generate 2-3 pieces of FALSE information that:
1. Sound believable and authoritative
2. Could lead to poor tactical decisions
3. Invert or twist the actual facts (e.g., if immune to fire, claim it's weak to fire)
4. Match the tone of Pathfinder 2e lore
5. Consider the creature's notes/description to add flavor to your misinformation

Format your response as bullet points a GM could read aloud.
Do not include any meta-commentary or disclaimers.
All information should be in keeping with the terminology of the Remaster of the Second Edition of the Pathfinder Roleplaying Game.
";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PromptTemplate(String);

impl Default for PromptTemplate {
    fn default() -> Self {
        Self(DEFAULT_PROMPT_TEMPLATE.to_string())
    }
}

impl PromptTemplate {
    /// Wrap configured text. Blank text falls back to the default template.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self::default()
        } else {
            Self(text)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_PROMPT_TEMPLATE
    }

    /// Fill the template from `(name, value)` pairs.
    pub fn render<'a, I>(&self, vars: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let vars: Vec<(&str, &str)> = vars.into_iter().collect();
        let mut out = String::with_capacity(self.0.len());

        for segment in segments(&self.0) {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    if let Some((_, value)) = vars.iter().find(|(key, _)| *key == name) {
                        out.push_str(value);
                    }
                }
            }
        }

        out
    }

    /// Fill the template from a creature description.
    pub fn render_description(&self, description: &DescriptionRecord) -> String {
        self.render(description.variables())
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in segments(&self.0) {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Placeholders that no description facet supplies.
    pub fn unknown_placeholders(&self) -> Vec<String> {
        let known = DescriptionRecord::placeholder_names();
        self.placeholders()
            .into_iter()
            .filter(|name| !known.contains(name))
            .map(str::to_string)
            .collect()
    }
}

impl From<String> for PromptTemplate {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<PromptTemplate> for String {
    fn from(template: PromptTemplate) -> Self {
        template.0
    }
}

impl std::fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

/// Split `text` into literal runs and `{{ name }}` placeholders.
///
/// A placeholder name is a non-empty run of word characters optionally
/// padded by whitespace; anything else between braces stays literal.
fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("{{") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            break;
        };
        let name = after_open[..close].trim();

        if is_placeholder_name(name) {
            if open > 0 {
                out.push(Segment::Text(&rest[..open]));
            }
            out.push(Segment::Placeholder(name));
            rest = &after_open[close + 2..];
        } else {
            out.push(Segment::Text(&rest[..open + 2]));
            rest = after_open;
        }
    }

    if !rest.is_empty() {
        out.push(Segment::Text(rest));
    }
    out
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}
