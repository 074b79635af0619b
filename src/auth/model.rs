use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::clients::KeyValueStore;
use crate::errors::AuthError;

const TOKEN_KEY_PREFIX: &str = "token:";

/// 认证模型
pub struct AuthModel {
    store: Arc<dyn KeyValueStore>,
    token_secret: Arc<String>,
    token_ttl: Duration,
}

impl AuthModel {
    pub fn new(store: Arc<dyn KeyValueStore>, token_secret: Arc<String>, token_ttl: Duration) -> Self {
        Self {
            store,
            token_secret,
            token_ttl,
        }
    }

    /// 签发令牌并写入存储
    pub async fn create_token(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let nonce = Uuid::new_v4();
        let digest = md5::compute(format!("{}:{}:{}", self.token_secret, username, nonce));
        let token = format!("{:x}", digest);

        self.store
            .set(&storage_key(&token), username, Some(self.token_ttl))
            .await?;
        tracing::info!(username, "Issued token");
        Ok(token)
    }

    /// 校验令牌，返回所属用户
    pub async fn check_token(&self, token: &str) -> Result<String, AuthError> {
        match self.store.get(&storage_key(token)).await? {
            Some(username) => Ok(username),
            None => {
                tracing::debug!("Rejected unknown or expired token");
                Err(AuthError::TokenNotFound)
            }
        }
    }

    /// 作废令牌
    pub async fn revoke_token(&self, token: &str) -> Result<bool, AuthError> {
        self.store.del(&storage_key(token)).await
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }
}

fn storage_key(token: &str) -> String {
    format!("{TOKEN_KEY_PREFIX}{token}")
}
