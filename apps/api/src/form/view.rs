use serde::Serialize;
use uuid::Uuid;

use crate::analysis::mode::AnalysisMode;
use crate::form::session::{FormState, Session};

pub const UPLOADED_MESSAGE: &str = "PDF Uploaded Successfully";
pub const CLEARED_MESSAGE: &str = "Successfully cleared all inputs!";
pub const RESPONSE_HEADING: &str = "The Response is:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub mode: AnalysisMode,
    pub heading: &'static str,
    pub text: String,
}

/// Render instruction produced by one cycle: what the page should show now.
#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub session_id: Uuid,
    pub state: FormState,
    pub job_description: String,
    pub resume_file_name: Option<String>,
    pub banners: Vec<Banner>,
    pub response: Option<AnalysisResponse>,
}

/// Cycle output that is not part of the session itself.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Shown above the uploaded banner (e.g. the clear confirmation).
    pub leading: Vec<Banner>,
    /// Shown below it (analysis errors).
    pub trailing: Vec<Banner>,
    pub response: Option<AnalysisResponse>,
}

impl View {
    pub fn render(session: &Session, outcome: Outcome) -> Self {
        let mut banners = outcome.leading;
        if session.shows_uploaded_banner() {
            banners.push(Banner::success(UPLOADED_MESSAGE));
        }
        banners.extend(outcome.trailing);

        Self {
            session_id: session.id,
            state: session.state,
            job_description: session.job_description.clone(),
            resume_file_name: session.resume.as_ref().map(|r| r.file_name.clone()),
            banners,
            response: outcome.response,
        }
    }
}

#[cfg(test)]
impl View {
    pub fn has_banner(&self, message: &str) -> bool {
        self.banners.iter().any(|b| b.message == message)
    }
}
