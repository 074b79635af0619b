//! 令牌存储客户端
//!
//! 演示程序里 "redis" 绑定的实现：进程内的键值存储，带过期时间。

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::AuthError;

/// 键值存储抽象接口
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 写入键值，可选过期时间
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), AuthError>;

    /// 读取键值，过期视为不存在
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError>;

    /// 删除键，返回是否存在
    async fn del(&self, key: &str) -> Result<bool, AuthError>;

    /// 连接的目标地址
    fn host(&self) -> &str;
}

struct StoredValue {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl StoredValue {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

/// 进程内存储
pub struct MemoryStore {
    host: String,
    entries: Mutex<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    /// "连接" 到给定主机
    pub async fn connect(host: &str) -> Result<Self, AuthError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(AuthError::Store("empty host".to_string()));
        }
        tracing::debug!(host, "Token store connected");
        Ok(Self {
            host: host.to_string(),
            entries: Mutex::new(HashMap::new()),
        })
    }

    /// 当前未过期的键数量
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.entries
            .lock()
            .values()
            .filter(|v| !v.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), AuthError> {
        let expires_at = match ttl {
            Some(ttl) => {
                let ttl = chrono::Duration::from_std(ttl)
                    .map_err(|e| AuthError::Store(e.to_string()))?;
                Some(Utc::now() + ttl)
            }
            None => None,
        };
        self.entries.lock().insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        let now = Utc::now();
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(stored) if stored.is_expired(now) => true,
            Some(stored) => return Ok(Some(stored.value.clone())),
            None => return Ok(None),
        };
        if expired {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn del(&self, key: &str) -> Result<bool, AuthError> {
        Ok(self.entries.lock().remove(key).is_some())
    }

    fn host(&self) -> &str {
        &self.host
    }
}
