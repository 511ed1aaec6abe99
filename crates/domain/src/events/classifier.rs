//! Recall Knowledge critical-failure detection
//!
//! Three prioritized rule lists decide, for one host chat message:
//!
//! 1. whether it is a Recall Knowledge check ([`QualificationRule`]),
//! 2. whether the check critically failed ([`CriticalFailureRule`]),
//! 3. which creature it was about ([`TargetRule`]).
//!
//! Each list is evaluated in order and stops at the first match. Structured
//! signals come first and free-text matching last, because the host's flag
//! layout is not stable across versions. Every rule is its own function so
//! it can be exercised in isolation. Nothing here fails: an event nobody
//! recognizes is simply a negative classification.

use serde::{Deserialize, Serialize};

use super::game_event::{ActorRef, GameEvent};
use crate::common::contains_phrase;
use crate::entities::ActorKind;
use crate::game_systems::{is_recall_knowledge_skill, DegreeOfSuccess, RECALL_KNOWLEDGE_SLUG};
use crate::ids::ActorId;

/// Looks up the host type of an actor so targets can be restricted to NPCs.
///
/// Implemented for any `Fn(&ActorId) -> Option<ActorKind>` so tests and
/// callers can pass a closure.
pub trait ActorKindLookup {
    fn actor_kind(&self, id: &ActorId) -> Option<ActorKind>;
}

impl<F> ActorKindLookup for F
where
    F: Fn(&ActorId) -> Option<ActorKind>,
{
    fn actor_kind(&self, id: &ActorId) -> Option<ActorKind> {
        self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualificationRule {
    /// Check context names the action or carries an `action:` option
    ContextAction,
    /// An applied modifier slug mentions the action
    Modifier,
    /// The origin item/action slug mentions the action
    OriginAction,
    /// Message text says "recall knowledge" and a roll is attached
    ContentWithRoll,
    /// Recall Knowledge skill rolled against an explicit target
    SkillWithTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CriticalFailureRule {
    ContextOutcome,
    RollDegree,
    TopLevelDegree,
    ContentPhrase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetRule {
    EventTarget,
    ContextTarget,
    SelectedTarget,
    DcSource,
    /// Lowest priority; frequently resolves to the roller, not the target.
    Origin,
}

/// Result of classifying one event, including which rule decided each part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub is_qualifying_check: bool,
    pub is_critical_failure: bool,
    pub target_id: Option<ActorId>,
    pub qualified_by: Option<QualificationRule>,
    pub critical_failure_by: Option<CriticalFailureRule>,
    pub target_from: Option<TargetRule>,
}

impl Classification {
    /// Qualifying critical failure with a resolved creature.
    pub fn should_trigger(&self) -> bool {
        self.is_qualifying_check && self.is_critical_failure && self.target_id.is_some()
    }
}

/// Classify `event`. `selected_targets` are the acting user's currently
/// selected in-scene targets, in selection order.
pub fn classify(
    event: &GameEvent,
    directory: &impl ActorKindLookup,
    selected_targets: &[ActorId],
) -> Classification {
    let qualified_by = qualification_rule(event);
    let critical_failure_by = critical_failure_rule(event);
    let target = resolve_target(event, directory, selected_targets);

    Classification {
        is_qualifying_check: qualified_by.is_some(),
        is_critical_failure: critical_failure_by.is_some(),
        target_from: target.as_ref().map(|(rule, _)| *rule),
        target_id: target.map(|(_, id)| id),
        qualified_by,
        critical_failure_by,
    }
}

// =============================================================================
// Qualification
// =============================================================================

pub fn qualification_rule(event: &GameEvent) -> Option<QualificationRule> {
    if context_names_action(event) {
        Some(QualificationRule::ContextAction)
    } else if modifier_names_action(event) {
        Some(QualificationRule::Modifier)
    } else if origin_names_action(event) {
        Some(QualificationRule::OriginAction)
    } else if content_mentions_action_with_roll(event) {
        Some(QualificationRule::ContentWithRoll)
    } else if skill_check_with_target(event) {
        Some(QualificationRule::SkillWithTarget)
    } else {
        None
    }
}

fn mentions_action(value: &str) -> bool {
    value.to_ascii_lowercase().contains(RECALL_KNOWLEDGE_SLUG)
}

pub fn context_names_action(event: &GameEvent) -> bool {
    let Some(context) = &event.flags.pf2e.context else {
        return false;
    };
    context.action.as_deref().is_some_and(mentions_action)
        || context.options.iter().any(|option| mentions_action(option))
}

pub fn modifier_names_action(event: &GameEvent) -> bool {
    event
        .flags
        .pf2e
        .modifiers
        .iter()
        .any(|modifier| mentions_action(&modifier.slug))
}

pub fn origin_names_action(event: &GameEvent) -> bool {
    event
        .flags
        .pf2e
        .origin
        .as_ref()
        .and_then(|origin| origin.slug.as_deref())
        .is_some_and(mentions_action)
}

pub fn content_mentions_action_with_roll(event: &GameEvent) -> bool {
    !event.rolls.is_empty() && contains_phrase(&event.content, "recall knowledge")
}

pub fn skill_check_with_target(event: &GameEvent) -> bool {
    let Some(context) = &event.flags.pf2e.context else {
        return false;
    };
    let skill_matches = context
        .statistic
        .as_deref()
        .is_some_and(is_recall_knowledge_skill)
        || context
            .domains
            .iter()
            .any(|domain| is_recall_knowledge_skill(domain));
    let has_target = reference(event.flags.target.as_ref()).is_some()
        || reference(context.target.as_ref()).is_some();

    skill_matches && has_target
}

// =============================================================================
// Critical failure
// =============================================================================

pub fn critical_failure_rule(event: &GameEvent) -> Option<CriticalFailureRule> {
    if context_outcome_is_critical_failure(event) {
        Some(CriticalFailureRule::ContextOutcome)
    } else if roll_degree_is_critical_failure(event) {
        Some(CriticalFailureRule::RollDegree)
    } else if top_level_degree_is_critical_failure(event) {
        Some(CriticalFailureRule::TopLevelDegree)
    } else if content_says_critical_failure(event) {
        Some(CriticalFailureRule::ContentPhrase)
    } else {
        None
    }
}

pub fn context_outcome_is_critical_failure(event: &GameEvent) -> bool {
    event
        .flags
        .pf2e
        .context
        .as_ref()
        .and_then(|context| context.outcome.as_ref())
        .is_some_and(|outcome| outcome.is_critical_failure())
}

pub fn roll_degree_is_critical_failure(event: &GameEvent) -> bool {
    event.rolls.iter().any(|roll| {
        roll.degree_of_success
            .as_ref()
            .or(roll.options.degree_of_success.as_ref())
            .is_some_and(|degree| degree.is_critical_failure())
    })
}

pub fn top_level_degree_is_critical_failure(event: &GameEvent) -> bool {
    [event.outcome.as_ref(), event.degree_of_success.as_ref()]
        .into_iter()
        .flatten()
        .any(|degree| degree.is_critical_failure())
}

pub fn content_says_critical_failure(event: &GameEvent) -> bool {
    contains_phrase(&event.content, DegreeOfSuccess::CriticalFailure.label())
}

// =============================================================================
// Target resolution
// =============================================================================

/// First creature-typed candidate, with the rule that produced it.
pub fn resolve_target(
    event: &GameEvent,
    directory: &impl ActorKindLookup,
    selected_targets: &[ActorId],
) -> Option<(TargetRule, ActorId)> {
    let is_creature = |id: &ActorId| {
        directory
            .actor_kind(id)
            .is_some_and(ActorKind::is_creature)
    };
    let pf2e = &event.flags.pf2e;
    let context = pf2e.context.as_ref();

    let candidates = [
        (TargetRule::EventTarget, reference(event.flags.target.as_ref())),
        (
            TargetRule::ContextTarget,
            reference(context.and_then(|c| c.target.as_ref())),
        ),
        (
            TargetRule::SelectedTarget,
            selected_targets.iter().find(|&id| is_creature(id)).cloned(),
        ),
        (
            TargetRule::DcSource,
            reference(context.and_then(|c| c.dc.as_ref()))
                .or_else(|| reference(pf2e.dc.as_ref())),
        ),
        (
            TargetRule::Origin,
            pf2e.origin
                .as_ref()
                .and_then(|origin| origin.actor.as_deref())
                .and_then(ActorId::from_reference),
        ),
    ];

    candidates
        .into_iter()
        .find_map(|(rule, id)| id.filter(|id| is_creature(id)).map(|id| (rule, id)))
}

fn reference(actor_ref: Option<&ActorRef>) -> Option<ActorId> {
    actor_ref
        .and_then(|r| r.actor.as_deref())
        .and_then(ActorId::from_reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::game_event::{
        CheckContext, Degree, ModifierFlag, OriginFlag, RollOptions, RollResult,
    };

    fn npcs(ids: &'static [&'static str]) -> impl Fn(&ActorId) -> Option<ActorKind> {
        move |id: &ActorId| {
            if ids.contains(&id.as_str()) {
                Some(ActorKind::Npc)
            } else {
                Some(ActorKind::Character)
            }
        }
    }

    fn context(build: impl FnOnce(&mut CheckContext)) -> GameEvent {
        let mut check = CheckContext::default();
        build(&mut check);
        let mut event = GameEvent::default();
        event.flags.pf2e.context = Some(check);
        event
    }

    fn crit_fail_roll() -> RollResult {
        RollResult {
            degree_of_success: None,
            options: RollOptions {
                degree_of_success: Some(Degree::Index(0)),
            },
        }
    }

    #[test]
    fn structured_recall_knowledge_crit_fail_ignores_message_text() {
        let mut event = context(|c| {
            c.check_type = Some("skill-check".into());
            c.options = vec!["action:recall-knowledge".into()];
            c.outcome = Some(Degree::Label("criticalFailure".into()));
        });
        event.content = "The dice clatter.".into();

        let result = classify(&event, &npcs(&[]), &[]);
        assert!(result.is_qualifying_check);
        assert!(result.is_critical_failure);
        assert_eq!(result.qualified_by, Some(QualificationRule::ContextAction));
        assert_eq!(result.critical_failure_by, Some(CriticalFailureRule::ContextOutcome));
    }

    #[test]
    fn content_without_roll_does_not_qualify() {
        let event = GameEvent {
            content: "<p>Alice attempts to Recall Knowledge!</p>".into(),
            ..GameEvent::default()
        };
        assert_eq!(qualification_rule(&event), None);

        let with_roll = GameEvent {
            rolls: vec![RollResult::default()],
            ..event
        };
        assert_eq!(
            qualification_rule(&with_roll),
            Some(QualificationRule::ContentWithRoll)
        );
    }

    #[test]
    fn modifier_and_origin_slugs_qualify() {
        let mut event = GameEvent::default();
        event.flags.pf2e.modifiers = vec![ModifierFlag {
            slug: "bardic-recall-knowledge".into(),
        }];
        assert_eq!(qualification_rule(&event), Some(QualificationRule::Modifier));

        let mut event = GameEvent::default();
        event.flags.pf2e.origin = Some(OriginFlag {
            slug: Some("recall-knowledge".into()),
            ..OriginFlag::default()
        });
        assert_eq!(qualification_rule(&event), Some(QualificationRule::OriginAction));
    }

    #[test]
    fn allowlisted_skill_needs_a_target() {
        let untargeted = context(|c| c.statistic = Some("occultism".into()));
        assert_eq!(qualification_rule(&untargeted), None);

        let targeted = context(|c| {
            c.statistic = Some("occultism".into());
            c.target = Some(ActorRef::new("Actor.ghost"));
        });
        assert_eq!(
            qualification_rule(&targeted),
            Some(QualificationRule::SkillWithTarget)
        );

        let athletics = context(|c| {
            c.statistic = Some("athletics".into());
            c.target = Some(ActorRef::new("Actor.ghost"));
        });
        assert_eq!(qualification_rule(&athletics), None);
    }

    #[test]
    fn critical_failure_rules_in_order() {
        let roll = GameEvent {
            rolls: vec![crit_fail_roll()],
            content: "critical failure".into(),
            ..GameEvent::default()
        };
        assert_eq!(critical_failure_rule(&roll), Some(CriticalFailureRule::RollDegree));

        let top_level = GameEvent {
            degree_of_success: Some(Degree::Index(0)),
            ..GameEvent::default()
        };
        assert_eq!(
            critical_failure_rule(&top_level),
            Some(CriticalFailureRule::TopLevelDegree)
        );

        let text = GameEvent {
            content: "Result: <b>Critical-Failure</b>".into(),
            ..GameEvent::default()
        };
        assert_eq!(critical_failure_rule(&text), Some(CriticalFailureRule::ContentPhrase));
    }

    #[test]
    fn ordinary_failure_is_not_critical() {
        let event = GameEvent {
            rolls: vec![RollResult {
                degree_of_success: Some(Degree::Index(1)),
                options: RollOptions::default(),
            }],
            outcome: Some(Degree::Label("failure".into())),
            content: "Failure".into(),
            ..GameEvent::default()
        };
        assert_eq!(critical_failure_rule(&event), None);
    }

    #[test]
    fn explicit_target_beats_origin() {
        let mut event = GameEvent::default();
        event.flags.target = Some(ActorRef::new("Actor.dragon"));
        event.flags.pf2e.origin = Some(OriginFlag {
            actor: Some("Actor.ogre".into()),
            ..OriginFlag::default()
        });

        let result = classify(&event, &npcs(&["dragon", "ogre"]), &[]);
        assert_eq!(result.target_id, Some(ActorId::new("dragon")));
        assert_eq!(result.target_from, Some(TargetRule::EventTarget));
    }

    #[test]
    fn non_creature_candidates_are_skipped() {
        let mut event = context(|c| {
            c.target = Some(ActorRef::new("Scene.s1.Token.t1.Actor.pc1"));
            c.dc = Some(ActorRef::new("Actor.lich"));
        });
        event.flags.target = Some(ActorRef::new("Actor.pc1"));

        let selected = [ActorId::new("pc2"), ActorId::new("wolf")];
        let result = classify(&event, &npcs(&["lich", "wolf"]), &selected);
        assert_eq!(result.target_id, Some(ActorId::new("wolf")));
        assert_eq!(result.target_from, Some(TargetRule::SelectedTarget));

        let result = classify(&event, &npcs(&["lich"]), &[]);
        assert_eq!(result.target_from, Some(TargetRule::DcSource));
    }

    #[test]
    fn origin_is_the_last_resort() {
        let mut event = GameEvent::default();
        event.flags.pf2e.origin = Some(OriginFlag {
            actor: Some("Actor.ogre".into()),
            ..OriginFlag::default()
        });
        let result = classify(&event, &npcs(&["ogre"]), &[]);
        assert_eq!(result.target_from, Some(TargetRule::Origin));
    }

    #[test]
    fn unknown_actors_never_resolve() {
        let mut event = GameEvent::default();
        event.flags.target = Some(ActorRef::new("Actor.ghost"));
        let result = classify(&event, &|_: &ActorId| -> Option<ActorKind> { None }, &[]);
        assert_eq!(result.target_id, None);
    }

    #[test]
    fn unrecognized_event_is_negative() {
        let result = classify(&GameEvent::default(), &npcs(&[]), &[]);
        assert_eq!(result, Classification::default());
        assert!(!result.should_trigger());
    }
}
