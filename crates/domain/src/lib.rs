//! Misrecall domain: creatures, notices, prompt templates and the
//! Recall Knowledge event classifier. Pure logic, no I/O.

extern crate self as misrecall_domain;

pub mod common;
pub mod entities;
pub mod error;
pub mod events;
pub mod game_systems;
pub mod ids;
pub mod value_objects;

pub use entities::{
    Ability, ActionCategory, ActorKind, Attack, AttackKind, Caller, CreatureDescription,
    CreatureRecord, DamageAdjustment, DamageRoll, Defenses, NoticeAction, NoticeRecord,
    NoticeState, Offenses, Saves, Speed, Spell, TriggerMeta, TriggerType, UserRole,
};
pub use error::DomainError;
pub use events::{classify, ActorKindLookup, Classification, GameEvent};
pub use game_systems::DegreeOfSuccess;
pub use ids::{ActorId, NoticeId, UserId};
pub use value_objects::{
    creature_summary, DescriptionRecord, EndpointConfig, ModuleSettings, PromptTemplate,
    DEFAULT_PROMPT_TEMPLATE,
};
