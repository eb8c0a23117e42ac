//! AI challenges & activities
//!
//! Each challenge hands the student some AI-generated material and asks for
//! a written response. Submissions are validated for completeness only.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChallengeError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    Writing,
    Reading,
    Coding,
    Ethics,
}

pub const DEBATE_TOPICS: [&str; 3] = [
    "Should students be required to disclose AI assistance in all academic work?",
    "Is it ethical to use AI tools that may have been trained on copyrighted materials?",
    "Does AI do more harm than good in education?",
];

/// Static description of a challenge
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub kind: ChallengeKind,
    pub title: &'static str,
    pub task: &'static str,
    pub material: &'static [(&'static str, &'static str)],
    pub required_fields: &'static [&'static str],
    pub acknowledgement: &'static str,
}

impl ChallengeKind {
    pub const ALL: [ChallengeKind; 4] = [
        ChallengeKind::Writing,
        ChallengeKind::Reading,
        ChallengeKind::Coding,
        ChallengeKind::Ethics,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Self::Writing => "writing",
            Self::Reading => "reading",
            Self::Coding => "coding",
            Self::Ethics => "ethics",
        }
    }

    pub fn definition(self) -> Challenge {
        match self {
            Self::Writing => Challenge {
                kind: self,
                title: "Writing Challenge",
                task: "Evaluate and refine an AI-generated paragraph to improve clarity and accuracy.",
                material: &[(
                    "ai_paragraph",
                    "Artificial intelligence is when computers can think like humans. \
                     All AI systems are completely objective and never make mistakes. \
                     Machine learning is the same as artificial intelligence.",
                )],
                required_fields: &["rewrite", "explanation"],
                acknowledgement:
                    "Writing challenge submitted! Your critical thinking skills are developing well.",
            },
            Self::Reading => Challenge {
                kind: self,
                title: "Reading Challenge",
                task: "Analyze an AI-generated summary for accuracy and potential biases.",
                material: &[
                    (
                        "original_text",
                        "The Industrial Revolution brought major technological advances \
                         but also created poor working conditions. While productivity increased, \
                         many workers faced long hours in dangerous environments for low pay.",
                    ),
                    (
                        "ai_summary",
                        "The Industrial Revolution was entirely positive, bringing only \
                         technological progress and economic growth for all members of society.",
                    ),
                ],
                required_fields: &["analysis"],
                acknowledgement:
                    "Excellent analysis! You've demonstrated strong critical reading skills.",
            },
            Self::Coding => Challenge {
                kind: self,
                title: "Coding Challenge",
                task: "Debug and improve AI-generated code while explaining your changes.",
                material: &[(
                    "ai_code",
                    "def calculate_average(numbers):\n    total = 0\n    for num in numbers:\n        total += num\n    return total / len(numbers)",
                )],
                required_fields: &["code", "explanation"],
                acknowledgement:
                    "Code improvements submitted! You've demonstrated authentic understanding.",
            },
            Self::Ethics => Challenge {
                kind: self,
                title: "Ethics Debate",
                task: "Construct arguments about AI ethics based on your knowledge.",
                material: &[],
                required_fields: &["topic", "pro", "con", "position"],
                acknowledgement:
                    "Debate submitted! You've shown thoughtful consideration of AI ethics.",
            },
        }
    }
}

impl FromStr for ChallengeKind {
    type Err = ChallengeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == s)
            .ok_or_else(|| ChallengeError::UnknownChallenge(s.to_string()))
    }
}

/// Validates a submission and returns the challenge's acknowledgement.
pub fn submit(
    kind: ChallengeKind,
    fields: &HashMap<String, String>,
) -> Result<&'static str, ChallengeError> {
    let challenge = kind.definition();

    let missing: Vec<&'static str> = challenge
        .required_fields
        .iter()
        .copied()
        .filter(|name| fields.get(*name).map_or(true, |v| v.trim().is_empty()))
        .collect();
    if !missing.is_empty() {
        tracing::warn!(challenge = kind.slug(), ?missing, "Incomplete challenge submission");
        return Err(ChallengeError::MissingFields { missing });
    }

    if kind == ChallengeKind::Ethics {
        let topic = fields.get("topic").map(|t| t.trim()).unwrap_or_default();
        if !DEBATE_TOPICS.contains(&topic) {
            return Err(ChallengeError::UnknownTopic(topic.to_string()));
        }
    }

    tracing::info!(challenge = kind.slug(), "Challenge submitted");
    Ok(challenge.acknowledgement)
}
