//! Authenticated session snapshot

use serde::{Deserialize, Serialize};

/// Identity of the logged-in user as issued at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    #[serde(default)]
    pub real_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_superadmin: bool,
}

/// Bearer token plus user identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.user.is_admin
    }

    pub fn is_super_admin(&self) -> bool {
        self.user.is_superadmin
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
