//! Per-session form context and the in-memory session store.
//!
//! A session is the explicit state one browser tab works against: the job
//! description, the cached résumé bytes, the clear flag, and the form state.
//! Nothing here survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::analysis::pipeline::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    Idle,
    Processing,
    Cleared,
}

/// Résumé bytes as uploaded. Read on every analysis; never consumed.
#[derive(Debug, Clone)]
pub struct UploadedResume {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub job_description: String,
    pub resume: Option<UploadedResume>,
    pub clear_triggered: bool,
    pub state: FormState,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            job_description: String::new(),
            resume: None,
            clear_triggered: false,
            state: FormState::Idle,
            last_active: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// `idle` → `processing`. Hands back the inputs for the model call so the
    /// session lock can be released while it runs.
    pub fn begin_analysis(&mut self) -> Result<(String, Bytes), AnalysisError> {
        if self.state == FormState::Processing {
            return Err(AnalysisError::InProgress);
        }

        let resume = match &self.resume {
            Some(resume) if !self.clear_triggered => resume,
            _ => return Err(AnalysisError::NoResume),
        };

        let inputs = (self.job_description.clone(), resume.bytes.clone());
        self.state = FormState::Processing;
        Ok(inputs)
    }

    /// `processing` → `idle`, whatever the outcome.
    pub fn finish_analysis(&mut self) {
        self.state = FormState::Idle;
    }

    /// Empties the job description and suppresses the uploaded banner for
    /// the rest of this render cycle. The résumé itself is kept.
    pub fn clear(&mut self) {
        self.job_description.clear();
        self.clear_triggered = true;
        if self.state != FormState::Processing {
            self.state = FormState::Cleared;
        }
    }

    /// Last step of every render cycle.
    pub fn end_cycle(&mut self) {
        self.clear_triggered = false;
        if self.state == FormState::Cleared {
            self.state = FormState::Idle;
        }
    }

    pub fn shows_uploaded_banner(&self) -> bool {
        self.resume.is_some() && !self.clear_triggered
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Creates a session, evicting idle ones first.
    pub async fn create(&self) -> SharedSession {
        self.evict_idle().await;

        let session = Session::new();
        let id = session.id;
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, Arc::clone(&shared));
        info!("Session {id} created");
        shared
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Session {id} removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions idle longer than the timeout. Sessions whose lock is
    /// held are in use and are skipped.
    async fn evict_idle(&self) {
        let cutoff = Utc::now() - self.idle_timeout;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, session| match session.try_lock() {
            Ok(s) => s.last_active >= cutoff,
            Err(_) => true,
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_resume() -> Session {
        let mut session = Session::new();
        session.job_description = "Rust developer".to_string();
        session.resume = Some(UploadedResume {
            file_name: "resume.pdf".to_string(),
            bytes: Bytes::from_static(b"%PDF-1.4"),
        });
        session
    }

    #[test]
    fn test_begin_analysis_requires_resume() {
        let mut session = Session::new();
        assert!(matches!(
            session.begin_analysis(),
            Err(AnalysisError::NoResume)
        ));
        assert_eq!(session.state, FormState::Idle);
    }

    #[test]
    fn test_begin_analysis_blocked_by_clear_flag() {
        let mut session = with_resume();
        session.clear_triggered = true;
        assert!(matches!(
            session.begin_analysis(),
            Err(AnalysisError::NoResume)
        ));
    }

    #[test]
    fn test_begin_analysis_rejects_second_call() {
        let mut session = with_resume();
        let (jd, bytes) = session.begin_analysis().unwrap();
        assert_eq!(jd, "Rust developer");
        assert_eq!(&bytes[..], b"%PDF-1.4");
        assert_eq!(session.state, FormState::Processing);

        assert!(matches!(
            session.begin_analysis(),
            Err(AnalysisError::InProgress)
        ));

        session.finish_analysis();
        assert_eq!(session.state, FormState::Idle);
        assert!(session.begin_analysis().is_ok());
    }

    #[test]
    fn test_clear_lasts_one_cycle() {
        let mut session = with_resume();
        session.clear();
        assert_eq!(session.job_description, "");
        assert_eq!(session.state, FormState::Cleared);
        assert!(!session.shows_uploaded_banner());
        assert!(session.resume.is_some());

        session.end_cycle();
        assert_eq!(session.state, FormState::Idle);
        assert!(session.shows_uploaded_banner());
    }

    #[tokio::test]
    async fn test_store_evicts_idle_sessions() {
        let store = SessionStore::new(Duration::minutes(30));
        let stale = store.create().await;
        stale.lock().await.last_active = Utc::now() - Duration::hours(2);
        let stale_id = stale.lock().await.id;

        let fresh = store.create().await;
        let fresh_id = fresh.lock().await.id;

        assert!(store.get(stale_id).await.is_none());
        assert!(store.get(fresh_id).await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_remove() {
        let store = SessionStore::new(Duration::minutes(30));
        let id = store.create().await.lock().await.id;
        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
    }
}
