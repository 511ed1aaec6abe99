//! Host users and their permission roles

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Host permission level, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    #[default]
    Player,
    Trusted,
    Assistant,
    Gamemaster,
}

impl UserRole {
    /// Assistant GMs and full GMs may see and act on notices.
    pub fn is_privileged(self) -> bool {
        self >= UserRole::Assistant
    }
}

/// The user on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
}

impl Caller {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_gm_roles_are_privileged() {
        assert!(!UserRole::Player.is_privileged());
        assert!(!UserRole::Trusted.is_privileged());
        assert!(UserRole::Assistant.is_privileged());
        assert!(UserRole::Gamemaster.is_privileged());
    }

    #[test]
    fn caller_role_defaults_to_player() {
        let caller: Caller = serde_json::from_str(r#"{"id":"u1"}"#).expect("valid json");
        assert_eq!(caller.role, UserRole::Player);
        assert!(!caller.is_privileged());
    }
}
