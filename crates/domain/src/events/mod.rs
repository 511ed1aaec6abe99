//! Host game events and their classification
//!
//! [`GameEvent`] is the host chat message as the classifier reads it;
//! [`classify`] turns one into a [`Classification`].

mod classifier;
mod game_event;

pub use classifier::{
    classify, content_mentions_action_with_roll, content_says_critical_failure,
    context_names_action, context_outcome_is_critical_failure, critical_failure_rule,
    modifier_names_action, origin_names_action, qualification_rule, resolve_target,
    roll_degree_is_critical_failure, skill_check_with_target,
    top_level_degree_is_critical_failure, ActorKindLookup, Classification, CriticalFailureRule,
    QualificationRule, TargetRule,
};
pub use game_event::{
    ActorRef, CheckContext, Degree, EventAuthor, EventFlags, GameEvent, ModifierFlag, OriginFlag,
    Pf2eFlags, RollOptions, RollResult,
};
