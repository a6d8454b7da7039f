//! Analysis pipeline: cached résumé bytes → encoded first page → one model call.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::mode::AnalysisMode;
use crate::llm_client::{LlmError, ModelClient, ModelRequest};
use crate::resume::encoder::PageEncoder;
use crate::resume::rasterizer::ExtractionError;

/// Everything that can end an analysis. Each variant is terminal for that
/// one interaction; the session survives and the user may retry.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no résumé uploaded")]
    NoResume,

    #[error("an analysis is already in progress")]
    InProgress,

    #[error("PDF extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("model request failed: {0}")]
    Model(LlmError),

    #[error("model returned no text")]
    EmptyResponse,
}

impl From<LlmError> for AnalysisError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::EmptyContent => AnalysisError::EmptyResponse,
            other => AnalysisError::Model(other),
        }
    }
}

impl AnalysisError {
    /// Banner text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::NoResume => "Please upload your resume in PDF format.".to_string(),
            AnalysisError::InProgress => "An analysis is already in progress.".to_string(),
            AnalysisError::Extraction(_) => "Error in extracting content from PDF.".to_string(),
            AnalysisError::Model(e) => format!("Error with API request: {e}"),
            AnalysisError::EmptyResponse => "No response received from the API.".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct Analyzer {
    encoder: PageEncoder,
    model: Arc<dyn ModelClient>,
}

impl Analyzer {
    pub fn new(encoder: PageEncoder, model: Arc<dyn ModelClient>) -> Self {
        Self { encoder, model }
    }

    /// Runs one analysis. Issues at most one model call and never retries.
    pub async fn run(
        &self,
        job_description: &str,
        resume: Bytes,
        mode: AnalysisMode,
    ) -> Result<String, AnalysisError> {
        let image = self.encoder.encode_first_page(resume).await.map_err(|e| {
            warn!("PDF extraction failed: {e}");
            AnalysisError::Extraction(e)
        })?;

        let request = ModelRequest {
            text: job_description.to_string(),
            image,
            instruction: mode.prompt().to_string(),
        };

        let text = self.model.generate(&request).await.map_err(|e| {
            warn!("Model call failed for {mode:?}: {e}");
            AnalysisError::from(e)
        })?;

        info!("Analysis {mode:?} completed ({} chars)", text.len());
        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::resume::encoder::encode_jpeg_base64;
    use crate::resume::encoder::tests::SolidPageRasterizer;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every request and answers with a canned result.
    pub(crate) struct RecordingModel {
        pub calls: Mutex<Vec<ModelRequest>>,
        reply: fn() -> Result<String, LlmError>,
    }

    impl RecordingModel {
        pub(crate) fn answering(reply: fn() -> Result<String, LlmError>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply,
            }
        }

        pub(crate) fn ok() -> Self {
            Self::answering(|| Ok("Match: 35%. Missing keywords: Go, gRPC".to_string()))
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ModelClient for RecordingModel {
        async fn generate(&self, request: &ModelRequest) -> Result<String, LlmError> {
            self.calls.lock().unwrap().push(request.clone());
            (self.reply)()
        }
    }

    pub(crate) fn analyzer_with(model: Arc<RecordingModel>) -> Analyzer {
        let encoder = PageEncoder::new(Arc::new(SolidPageRasterizer::new()), 85);
        Analyzer::new(encoder, model)
    }

    #[tokio::test]
    async fn test_run_sends_job_description_image_and_prompt() {
        let model = Arc::new(RecordingModel::ok());
        let analyzer = analyzer_with(model.clone());

        let text = analyzer
            .run(
                "Seeking a backend engineer with Go experience",
                Bytes::from_static(b"%PDF-1.4 resume"),
                AnalysisMode::PercentageMatch,
            )
            .await
            .unwrap();
        assert!(text.contains("35%"));

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].text, "Seeking a backend engineer with Go experience");
        assert_eq!(calls[0].instruction, crate::analysis::prompts::KEYWORD_GAP_PROMPT);
        assert_eq!(
            calls[0].image,
            encode_jpeg_base64(&SolidPageRasterizer::page(), 85).unwrap()
        );
    }

    #[tokio::test]
    async fn test_extraction_failure_skips_model() {
        let model = Arc::new(RecordingModel::ok());
        let analyzer = analyzer_with(model.clone());

        let err = analyzer
            .run("jd", Bytes::new(), AnalysisMode::Overview)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Extraction(_)));
        assert_eq!(err.user_message(), "Error in extracting content from PDF.");
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_content_maps_to_empty_response() {
        let model = Arc::new(RecordingModel::answering(|| Err(LlmError::EmptyContent)));
        let analyzer = analyzer_with(model);

        let err = analyzer
            .run("jd", Bytes::from_static(b"%PDF"), AnalysisMode::SkillGap)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::EmptyResponse));
        assert_eq!(err.user_message(), "No response received from the API.");
    }

    #[test]
    fn test_model_error_message_includes_detail() {
        let err = AnalysisError::from(LlmError::Api {
            status: 429,
            message: "quota exceeded".to_string(),
        });
        assert_eq!(
            err.user_message(),
            "Error with API request: API error (status 429): quota exceeded"
        );
    }
}
