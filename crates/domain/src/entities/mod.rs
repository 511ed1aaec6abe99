//! Domain entities - Core business objects with identity

mod creature;
mod notice;
mod user;

pub use creature::{
    Ability, ActionCategory, ActorKind, Attack, AttackKind, CreatureDescription, CreatureRecord,
    DamageAdjustment, DamageRoll, Defenses, Offenses, Saves, Speed, Spell,
};
pub use notice::{NoticeAction, NoticeRecord, NoticeState, TriggerMeta, TriggerType};
pub use user::{Caller, UserRole};
