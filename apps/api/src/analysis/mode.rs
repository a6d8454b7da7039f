use serde::{Deserialize, Serialize};

use crate::analysis::prompts::{KEYWORD_GAP_PROMPT, OVERVIEW_PROMPT, SKILL_GAP_PROMPT};

/// Which analysis the user asked for. One per action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Overview,
    SkillGap,
    KeywordGap,
    PercentageMatch,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 4] = [
        AnalysisMode::Overview,
        AnalysisMode::SkillGap,
        AnalysisMode::KeywordGap,
        AnalysisMode::PercentageMatch,
    ];

    /// Instruction text sent to the model.
    /// `PercentageMatch` shares the keyword-gap prompt, which already asks for a percentage.
    pub fn prompt(self) -> &'static str {
        match self {
            AnalysisMode::Overview => OVERVIEW_PROMPT,
            AnalysisMode::SkillGap => SKILL_GAP_PROMPT,
            AnalysisMode::KeywordGap | AnalysisMode::PercentageMatch => KEYWORD_GAP_PROMPT,
        }
    }

    /// Button label shown on the form.
    pub fn label(self) -> &'static str {
        match self {
            AnalysisMode::Overview => "✅ Tell Me About the Resume",
            AnalysisMode::SkillGap => "⚙️ How Can I Improve My Skills?",
            AnalysisMode::KeywordGap => "🔍 What Keywords Are Missing?",
            AnalysisMode::PercentageMatch => "📊 Check Percentage Match",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_and_percentage_share_prompt() {
        let keyword = AnalysisMode::KeywordGap.prompt();
        let percentage = AnalysisMode::PercentageMatch.prompt();
        assert_eq!(keyword.as_bytes(), percentage.as_bytes());
    }

    #[test]
    fn test_overview_and_skill_gap_differ() {
        assert_ne!(
            AnalysisMode::Overview.prompt(),
            AnalysisMode::SkillGap.prompt()
        );
        assert_ne!(
            AnalysisMode::SkillGap.prompt(),
            AnalysisMode::KeywordGap.prompt()
        );
    }

    #[test]
    fn test_mode_wire_names() {
        let mode: AnalysisMode = serde_json::from_str("\"percentage_match\"").unwrap();
        assert_eq!(mode, AnalysisMode::PercentageMatch);
        assert_eq!(
            serde_json::to_string(&AnalysisMode::SkillGap).unwrap(),
            "\"skill_gap\""
        );
    }

    #[test]
    fn test_percentage_prompt_asks_for_percentage() {
        assert!(AnalysisMode::PercentageMatch
            .prompt()
            .contains("percentage match"));
    }
}
