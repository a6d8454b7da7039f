// Résumé analysis: mode selection, fixed prompts, and the
// encode → model call pipeline. All model calls go through llm_client.

pub mod mode;
pub mod pipeline;
pub mod prompts;
