//! Personalised feedback generation
//!
//! Journal entries and assessment answers are summarised into a single
//! prompt for the completion service. On failure the caller gets the error;
//! the canned [`fallback_report`] is only ever served on explicit request.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::assessment::Assessment;
use crate::completion::CompletionService;
use crate::error::FeedbackError;
use crate::journal::{format_timestamp, Journal};

pub const REPORT_TITLE: &str = "AI Usage Feedback Report";

/// Section headings requested from the completion service
pub const SECTIONS: [&str; 5] = [
    "Usage Patterns Analysis",
    "Strengths in AI Utilization",
    "Areas for Improvement",
    "Recommended Strategies",
    "Suggested Tools and Resources",
];

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FeedbackReport {
    pub body: String,
    pub generated_at: DateTime<Utc>,
    /// True for the canned sample report
    pub sample: bool,
}

impl FeedbackReport {
    /// Plain-text download: header lines, blank line, then the body
    pub fn artifact(&self) -> String {
        format!(
            "{}\nGenerated on: {}\n\n{}",
            REPORT_TITLE,
            format_timestamp(self.generated_at),
            self.body
        )
    }

    pub fn artifact_filename(&self) -> String {
        format!(
            "ai_usage_feedback_{}.txt",
            self.generated_at.with_timezone(&Local).format("%Y%m%d")
        )
    }
}

pub fn journal_summary(journal: &Journal, limit: usize) -> String {
    if journal.is_empty() {
        return "No journal entries available".to_string();
    }

    journal
        .last_n(limit)
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "Entry {} ({}):\nTask: {}\nTool: {}\nUsage: {}\n---",
                i + 1,
                entry.date(),
                entry.task,
                entry.tool,
                entry.usage
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn assessment_summary(assessment: &Assessment) -> String {
    if !assessment.has_answers() {
        return "No assessment answers available".to_string();
    }

    assessment
        .responses()
        .map(|r| format!("Q{}: {}\nA: {}\n---", r.index + 1, r.question, r.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(journal_block: &str, assessment_block: &str) -> String {
    format!(
        "Analyze this student's AI usage patterns and provide personalized feedback:

JOURNAL ENTRIES (most recent):
{journal_block}

ASSESSMENT RESPONSES:
{assessment_block}

Please provide a comprehensive analysis with these sections:

1. **{s1}**
   - Identify trends in how they use AI
   - Note frequency and types of tasks

2. **{s2}**
   - Highlight what they're doing well
   - Note positive habits and approaches

3. **{s3}**
   - Suggest specific areas to develop
   - Identify potential blind spots

4. **{s4}**
   - Provide 3-5 actionable recommendations
   - Suggest specific next steps

5. **{s5}**
   - Recommend specific AI tools for their needs
   - Suggest learning resources

Tone: Professional, encouraging, and constructive
Length: Approximately 300-400 words
Focus: On practical, actionable advice
",
        s1 = SECTIONS[0],
        s2 = SECTIONS[1],
        s3 = SECTIONS[2],
        s4 = SECTIONS[3],
        s5 = SECTIONS[4],
    )
}

/// Generates a report from the session's journal and assessment.
///
/// Fails with [`FeedbackError::InsufficientData`] before any external call
/// when there is neither a journal entry nor an answer.
pub async fn generate_feedback(
    service: &dyn CompletionService,
    journal: &Journal,
    assessment: &Assessment,
    journal_limit: usize,
) -> Result<FeedbackReport, FeedbackError> {
    if journal.is_empty() && !assessment.has_answers() {
        tracing::warn!("Feedback requested without journal entries or answers");
        return Err(FeedbackError::InsufficientData);
    }

    let prompt = build_prompt(
        &journal_summary(journal, journal_limit),
        &assessment_summary(assessment),
    );
    tracing::debug!(prompt_chars = prompt.len(), model = service.model(), "Requesting feedback");

    let body = service.complete(&prompt).await.map_err(|e| {
        tracing::error!("Feedback generation failed: {}", e);
        e
    })?;

    tracing::info!(chars = body.len(), "Feedback report generated");
    Ok(FeedbackReport {
        body,
        generated_at: Utc::now(),
        sample: false,
    })
}

/// Canned sample report offered after a failed generation
pub fn fallback_report() -> FeedbackReport {
    FeedbackReport {
        body: FALLBACK_BODY.trim().to_string(),
        generated_at: Utc::now(),
        sample: true,
    }
}

const FALLBACK_BODY: &str = r#"
### Usage Patterns Analysis
Based on your usage patterns, you're in the early stages of exploring AI tools for academic work.
You're primarily using AI for basic tasks and are developing an understanding of how these tools can support your learning.

### Strengths in AI Utilization
- **Exploratory Mindset**: You're willing to try different AI tools and applications
- **Ethical Awareness**: You show consideration for responsible AI use
- **Task-Specific Applications**: You're beginning to match tools to specific learning needs

### Areas for Improvement
- **Integration Strategy**: Consider how AI can be more systematically integrated into your workflow
- **Advanced Features**: Explore beyond basic usage to discover more powerful features
- **Critical Evaluation**: Develop stronger skills in evaluating AI-generated content

### Recommended Strategies
1. **Create an AI Learning Plan**: Dedicate specific times each week to explore new AI tools
2. **Tool Specialization**: Identify 2-3 AI tools that work best for your specific subjects
3. **Peer Learning**: Join or create a study group focused on effective AI usage
4. **Reflection Practice**: Keep a weekly log of what AI strategies worked best

### Suggested Tools and Resources
- **For Writing**: Grammarly, Hemingway Editor, ChatGPT for brainstorming
- **For Research**: Consensus, Elicit, Google Scholar with AI assistance
- **For Coding**: GitHub Copilot, Replit, Codeium
- **Learning Resources**: Coursera's "AI for Everyone", edX AI courses, AI tool tutorials on YouTube

**Next Steps**: Try one new AI tool this week and reflect on how it affected your productivity.
"#;
