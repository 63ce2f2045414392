//! 多会话容器
//!
//! 每个浏览器 / 终端会话一份独立的 [`SessionState`]，按 uuid 会话 ID 索引。
//! 同一会话的动作通过会话级 Mutex 串行执行。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

use super::SessionState;

/// 会话 ID
pub type SessionId = String;

/// 单个会话
pub struct Session {
    pub id: SessionId,
    pub state: SessionState,
    /// 最后活跃时间
    pub last_active: Instant,
    pub created_at: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            id: format!("session_{}", uuid::Uuid::new_v4()),
            state: SessionState::new(),
            last_active: Instant::now(),
            created_at: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_active.elapsed() > timeout
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
    session_timeout: Duration,
}

impl SessionStore {
    pub fn new(session_timeout_secs: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            session_timeout: Duration::from_secs(session_timeout_secs),
        }
    }

    /// 新建一个空会话并返回其 ID
    pub async fn create(&self) -> SessionId {
        self.insert_new().await.0
    }

    async fn insert_new(&self) -> (SessionId, Arc<Mutex<Session>>) {
        let session = Session::new();
        let id = session.id.clone();
        let session = Arc::new(Mutex::new(session));
        self.sessions
            .write()
            .await
            .insert(id.clone(), session.clone());
        tracing::debug!(session_id = %id, "session created");
        (id, session)
    }

    pub async fn get(&self, session_id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// 按 ID 取会话；不存在（或已过期被清理）时新建
    pub async fn get_or_create(&self, session_id: Option<&str>) -> (SessionId, Arc<Mutex<Session>>) {
        if let Some(id) = session_id {
            if let Some(session) = self.get(id).await {
                session.lock().await.touch();
                return (id.to_string(), session);
            }
        }
        self.insert_new().await
    }

    pub async fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// 清理过期会话；正在执行动作（锁被占用）的会话跳过
    pub async fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let expired: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, s)| {
                s.try_lock()
                    .map(|s| s.is_expired(self.session_timeout))
                    .unwrap_or(false)
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            sessions.remove(id);
        }
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "expired sessions removed");
        }
        expired.len()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
