//! Axum route handlers for the résumé form.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::mode::AnalysisMode;
use crate::errors::AppError;
use crate::form::controller::Action;
use crate::form::session::UploadedResume;
use crate::form::view::View;
use crate::state::AppState;

/// Multipart field carrying the résumé.
const RESUME_FIELD: &str = "resume";
const JOB_DESCRIPTION_FIELD: &str = "job_description";

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JobDescriptionUpdate {
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub mode: AnalysisMode,
    #[serde(default)]
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModeDescriptor {
    pub mode: AnalysisMode,
    pub label: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/modes
pub async fn handle_list_modes() -> Json<Vec<ModeDescriptor>> {
    Json(
        AnalysisMode::ALL
            .iter()
            .map(|&mode| ModeDescriptor {
                mode,
                label: mode.label(),
            })
            .collect(),
    )
}

/// POST /api/v1/sessions
pub async fn handle_create_session(State(state): State<AppState>) -> (StatusCode, Json<View>) {
    let view = state.controller.create_session().await;
    (StatusCode::CREATED, Json(view))
}

/// GET /api/v1/sessions/:id
///
/// A plain render cycle: no input changes, but the clear flag still resets.
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<View>, AppError> {
    Ok(Json(state.controller.handle(id, Action::Refresh).await?))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.controller.sessions().remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// PUT /api/v1/sessions/:id/job-description
pub async fn handle_update_job_description(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<JobDescriptionUpdate>,
) -> Result<Json<View>, AppError> {
    let view = state
        .controller
        .handle(id, Action::EditJobDescription(req.job_description))
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/resume
///
/// Expects a multipart body with a `resume` file field and, optionally, a
/// `job_description` text field carrying the text area. The bytes are cached
/// in the session and re-read by every later analysis.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<View>, AppError> {
    let mut resume = None;
    let mut job_description = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some(RESUME_FIELD) => {
                let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
                let content_type = field.content_type().map(str::to_string);
                if !is_pdf_upload(&file_name, content_type.as_deref()) {
                    return Err(AppError::Validation(format!(
                        "'{file_name}' is not a PDF; upload your resume in PDF format"
                    )));
                }
                let bytes = field.bytes().await?;
                resume = Some(UploadedResume { file_name, bytes });
            }
            Some(JOB_DESCRIPTION_FIELD) => job_description = Some(field.text().await?),
            _ => continue,
        }
    }

    let resume = resume.ok_or_else(|| {
        AppError::Validation(format!("multipart field '{RESUME_FIELD}' is required"))
    })?;
    let view = state
        .controller
        .handle(
            id,
            Action::Upload {
                resume,
                job_description,
            },
        )
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/analyze
///
/// Domain failures (no résumé, bad PDF, model error) come back as error
/// banners in a 200 view, not as HTTP errors.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<View>, AppError> {
    let view = state
        .controller
        .handle(
            id,
            Action::Analyze {
                mode: req.mode,
                job_description: req.job_description,
            },
        )
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/clear
pub async fn handle_clear(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<View>, AppError> {
    Ok(Json(state.controller.handle(id, Action::Clear).await?))
}

/// Accepts a `.pdf` file name or an `application/pdf` content type.
fn is_pdf_upload(file_name: &str, content_type: Option<&str>) -> bool {
    let by_name = file_name.to_ascii_lowercase().ends_with(".pdf");
    let by_type = content_type
        .map(|ct| ct.trim().eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false);
    by_name || by_type
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_upload() {
        assert!(is_pdf_upload("Resume.PDF", None));
        assert!(is_pdf_upload("resume", Some("application/pdf")));
        assert!(!is_pdf_upload("resume.docx", Some("application/msword")));
        assert!(!is_pdf_upload("resume.pdf.txt", None));
    }
}
