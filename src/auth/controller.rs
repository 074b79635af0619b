use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::model::AuthModel;
use crate::errors::AuthError;

/// 登录请求
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 签发结果
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_in_secs: u64,
}

/// 令牌校验结果
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub username: String,
}

/// 认证控制器
pub struct AuthController {
    model: Arc<AuthModel>,
}

impl AuthController {
    pub fn new(model: Arc<AuthModel>) -> Self {
        Self { model }
    }

    pub async fn create_token(&self, request: LoginRequest) -> Result<TokenResponse, AuthError> {
        let token = self
            .model
            .create_token(&request.username, &request.password)
            .await?;
        Ok(TokenResponse {
            token,
            issued_at: Utc::now(),
            expires_in_secs: self.model.token_ttl().as_secs(),
        })
    }

    pub async fn check_token(&self, token: &str) -> Result<UserResponse, AuthError> {
        let username = self.model.check_token(token).await?;
        Ok(UserResponse { username })
    }
}
