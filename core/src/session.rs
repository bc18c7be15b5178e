/// Authenticated session identity
///
/// Authentication itself is an external concern: the embedding application
/// signs in against the backend and hands the resulting identity + bearer
/// token to this crate. Nothing here ever fetches or refreshes a token.
use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub role: String,
    pub token: String,
}

impl Session {
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        role: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            role: role.into(),
            token: token.into(),
        }
    }

    /// Pick up a session handed over through the environment, the way the
    /// binaries receive it from the sign-in flow.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("CARELINK_TOKEN").map_err(|_| {
            ClientError::Config(
                "CARELINK_TOKEN must be set (authentication happens outside this client)"
                    .to_string(),
            )
        })?;
        let user_id = std::env::var("CARELINK_USER_ID").unwrap_or_else(|_| "unknown".to_string());
        let name = std::env::var("CARELINK_USER_NAME").unwrap_or_else(|_| user_id.clone());
        let role = std::env::var("CARELINK_ROLE").unwrap_or_else(|_| "staff".to_string());
        Ok(Self::new(user_id, name, role, token))
    }

    /// Whether a message sender is the signed-in user.
    pub fn is_self(&self, sender_id: &str) -> bool {
        self.user_id == sender_id
    }
}
