//! Durable cache of the logged-in session
//!
//! Token and serialized user live under two keys of the local `settings`
//! table and are always written and removed together. A user payload that no
//! longer parses is treated as a logout: the keys are cleared and no session
//! is reported.

use crate::error::{ClientError, ClientResult};
use scdb_common::db::settings::{delete_settings, get_setting, set_settings};
use scdb_common::models::{Session, SessionUser};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

/// Settings key holding the bearer token
pub const TOKEN_KEY: &str = "auth_token";

/// Settings key holding the JSON-encoded user
pub const USER_KEY: &str = "auth_user";

#[derive(Debug, Clone)]
pub struct SessionCache {
    db: SqlitePool,
}

impl SessionCache {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Persist a session, replacing any previous one
    pub async fn save(
        &self,
        token: Option<&str>,
        user: Option<&SessionUser>,
    ) -> ClientResult<Session> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::SessionInvalid("token is missing".to_string()))?;
        let user =
            user.ok_or_else(|| ClientError::SessionInvalid("user is missing".to_string()))?;

        let user_json = serde_json::to_string(user).map_err(scdb_common::Error::from)?;
        set_settings(&self.db, &[(TOKEN_KEY, token), (USER_KEY, user_json.as_str())]).await?;

        info!(user_id = user.id, is_admin = user.is_admin, "Session saved");

        Ok(Session {
            token: token.to_string(),
            user: user.clone(),
        })
    }

    /// Current session, or `None`; never fails
    pub async fn get(&self) -> Option<Session> {
        let token = match get_setting(&self.db, TOKEN_KEY).await {
            Ok(Some(token)) if !token.trim().is_empty() => token,
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "Session token unreadable, treating as logged out");
                return None;
            }
        };

        let raw_user = match get_setting(&self.db, USER_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Session user unreadable, treating as logged out");
                return None;
            }
        };

        match serde_json::from_str::<SessionUser>(&raw_user) {
            Ok(user) => Some(Session { token, user }),
            Err(e) => {
                warn!(error = %e, "Stored session user is corrupt, clearing session");
                if let Err(e) = self.clear().await {
                    warn!(error = %e, "Failed to clear corrupt session");
                }
                None
            }
        }
    }

    /// Remove the session; removing an absent session is fine
    pub async fn clear(&self) -> ClientResult<()> {
        delete_settings(&self.db, &[TOKEN_KEY, USER_KEY]).await?;
        debug!("Session cleared");
        Ok(())
    }

    pub async fn is_admin(&self) -> bool {
        self.get().await.map(|s| s.is_admin()).unwrap_or(false)
    }

    pub async fn is_super_admin(&self) -> bool {
        self.get().await.map(|s| s.is_super_admin()).unwrap_or(false)
    }

    /// Session for a privileged call, `SessionInvalid` when logged out
    pub async fn require(&self) -> ClientResult<Session> {
        self.get()
            .await
            .ok_or_else(|| ClientError::SessionInvalid("not logged in".to_string()))
    }

    /// Super-admin session or `SessionInvalid`
    pub async fn require_super_admin(&self) -> ClientResult<Session> {
        let session = self.require().await?;
        if !session.is_super_admin() {
            return Err(ClientError::SessionInvalid(
                "super-admin privileges required".to_string(),
            ));
        }
        Ok(session)
    }
}
