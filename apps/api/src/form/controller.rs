//! Form Controller — one render cycle per user action.
//!
//! Every cycle: apply the action to the session, render a `View`, then reset
//! the clear flag. Analyses release the session lock while the model call
//! runs, so a concurrent refresh observes `processing`.

use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::mode::AnalysisMode;
use crate::analysis::pipeline::Analyzer;
use crate::errors::AppError;
use crate::form::session::{SessionStore, SharedSession, UploadedResume};
use crate::form::view::{AnalysisResponse, Banner, Outcome, View, CLEARED_MESSAGE, RESPONSE_HEADING};

#[derive(Debug)]
pub enum Action {
    Refresh,
    EditJobDescription(String),
    Upload {
        resume: UploadedResume,
        /// Text-area content submitted with the file, if any.
        job_description: Option<String>,
    },
    Analyze {
        mode: AnalysisMode,
        /// Text-area content submitted with the button, if any.
        job_description: Option<String>,
    },
    Clear,
}

#[derive(Clone)]
pub struct FormController {
    sessions: SessionStore,
    analyzer: Analyzer,
}

impl FormController {
    pub fn new(analyzer: Analyzer, idle_timeout: Duration) -> Self {
        Self {
            sessions: SessionStore::new(idle_timeout),
            analyzer,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Creates a session and renders its first, empty cycle.
    pub async fn create_session(&self) -> View {
        let session = self.sessions.create().await;
        let mut session = session.lock().await;
        let view = View::render(&session, Outcome::default());
        session.end_cycle();
        view
    }

    pub async fn handle(&self, session_id: Uuid, action: Action) -> Result<View, AppError> {
        let session = self
            .sessions
            .get(session_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

        let outcome = match action {
            Action::Analyze {
                mode,
                job_description,
            } => self.analyze(&session, mode, job_description).await,
            Action::Clear => {
                let mut s = session.lock().await;
                s.touch();
                s.clear();
                info!("Session {session_id}: inputs cleared");
                Outcome {
                    leading: vec![Banner::success(CLEARED_MESSAGE)],
                    ..Outcome::default()
                }
            }
            Action::Upload {
                resume,
                job_description,
            } => {
                info!(
                    "Session {session_id}: uploaded {} ({} bytes)",
                    resume.file_name,
                    resume.bytes.len()
                );
                let mut s = session.lock().await;
                s.touch();
                if let Some(text) = job_description {
                    s.job_description = text;
                }
                s.resume = Some(resume);
                Outcome::default()
            }
            Action::EditJobDescription(text) => {
                let mut s = session.lock().await;
                s.touch();
                s.job_description = text;
                Outcome::default()
            }
            Action::Refresh => {
                session.lock().await.touch();
                Outcome::default()
            }
        };

        let mut s = session.lock().await;
        let view = View::render(&s, outcome);
        s.end_cycle();
        Ok(view)
    }

    async fn analyze(
        &self,
        session: &SharedSession,
        mode: AnalysisMode,
        job_description: Option<String>,
    ) -> Outcome {
        let inputs = {
            let mut s = session.lock().await;
            s.touch();
            if let Some(text) = job_description {
                s.job_description = text;
            }
            s.begin_analysis()
        };

        let mut outcome = Outcome::default();
        let (job_description, resume) = match inputs {
            Ok(inputs) => inputs,
            Err(e) => {
                outcome.trailing.push(Banner::error(e.user_message()));
                return outcome;
            }
        };

        let mut finish = FinishOnDrop::new(session);
        let result = self.analyzer.run(&job_description, resume, mode).await;
        session.lock().await.finish_analysis();
        finish.disarm();

        match result {
            Ok(text) => {
                outcome.response = Some(AnalysisResponse {
                    mode,
                    heading: RESPONSE_HEADING,
                    text,
                })
            }
            Err(e) => outcome.trailing.push(Banner::error(e.user_message())),
        }
        outcome
    }
}

/// Returns the session to `idle` if the analysis future is dropped before
/// it finishes (client disconnect, aborted fetch).
struct FinishOnDrop {
    session: Option<SharedSession>,
}

impl FinishOnDrop {
    fn new(session: &SharedSession) -> Self {
        Self {
            session: Some(Arc::clone(session)),
        }
    }

    fn disarm(&mut self) {
        self.session = None;
    }
}

impl Drop for FinishOnDrop {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        if let Ok(mut s) = session.try_lock() {
            s.finish_analysis();
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    session.lock().await.finish_analysis();
                });
            }
            Err(_) => warn!("Analysis dropped outside a runtime; session left processing"),
        }
    }
}
