//! Game system rules vocabulary.
//!
//! Only Pathfinder 2e is supported: the Recall Knowledge action and its
//! four degrees of success are PF2e concepts.

mod pf2e;

pub use pf2e::{
    is_recall_knowledge_skill, DegreeOfSuccess, RECALL_KNOWLEDGE_SKILLS, RECALL_KNOWLEDGE_SLUG,
};
