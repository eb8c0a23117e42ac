//! AI literacy learning modules and per-session checklist progress

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LiteracyError;

/// Checklist length of every module
pub const TASKS_PER_MODULE: usize = 3;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LiteracyModuleId {
    ConceptualUnderstanding,
    AiEthics,
    CriticalThinking,
    UsingAiForLearning,
}

impl LiteracyModuleId {
    pub const ALL: [LiteracyModuleId; 4] = [
        LiteracyModuleId::ConceptualUnderstanding,
        LiteracyModuleId::AiEthics,
        LiteracyModuleId::CriticalThinking,
        LiteracyModuleId::UsingAiForLearning,
    ];

    fn position(self) -> usize {
        match self {
            Self::ConceptualUnderstanding => 0,
            Self::AiEthics => 1,
            Self::CriticalThinking => 2,
            Self::UsingAiForLearning => 3,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::ConceptualUnderstanding => "conceptual_understanding",
            Self::AiEthics => "ai_ethics",
            Self::CriticalThinking => "critical_thinking",
            Self::UsingAiForLearning => "using_ai_for_learning",
        }
    }

    pub fn definition(self) -> LiteracyModule {
        match self {
            Self::ConceptualUnderstanding => LiteracyModule {
                id: self,
                title: "Module 1: Conceptual Understanding",
                topics: &[
                    "What is AI? Explore definitions, recognition, and applications",
                    "Machine Learning: how systems learn from data",
                    "NLP Fundamentals: how computers process human language",
                    "Algorithmic Decision Making: understanding AI choices",
                ],
                resources: &[
                    ("Introductory Video", "5 min overview of key concepts"),
                    ("Interactive Concept Map", "Visualize AI relationships"),
                    ("Knowledge Check", "Test your understanding"),
                ],
                checklist: [
                    "Watch introductory video",
                    "Review concept map",
                    "Complete knowledge check",
                ],
            },
            Self::AiEthics => LiteracyModule {
                id: self,
                title: "Module 2: AI Ethics",
                topics: &[
                    "Privacy Concerns: data collection and surveillance",
                    "Misinformation: AI exacerbates misinformation and fake news",
                    "Bias in Algorithms: how prejudice enters systems",
                    "Educational Ethics: using AI responsibly in education",
                ],
                resources: &[
                    ("Ethical Framework Video", "Approaches to AI ethics"),
                    ("Case Studies", "Real-world ethical dilemmas"),
                    ("Discussion Forum", "Share your perspectives"),
                ],
                checklist: [
                    "Watch ethics video",
                    "Analyze 3 case studies",
                    "Participate in forum",
                ],
            },
            Self::CriticalThinking => LiteracyModule {
                id: self,
                title: "Module 3: Critical Thinking",
                topics: &[
                    "Verifying Accuracy: fact-checking AI responses",
                    "Identifying Bias: recognizing skewed perspectives",
                    "Prompt Engineering: crafting effective queries",
                ],
                resources: &[
                    ("Critical Analysis Video", "Techniques for evaluation"),
                    ("Bias Detection Exercise", "Practice identifying issues"),
                    ("Prompt Workshop", "Improve your queries"),
                ],
                checklist: [
                    "Watch analysis video",
                    "Complete bias exercise",
                    "Participate in prompt workshop",
                ],
            },
            Self::UsingAiForLearning => LiteracyModule {
                id: self,
                title: "Module 4: Using AI for Learning",
                topics: &[
                    "Goal Setting: defining clear learning objectives",
                    "Independent Practice: building skills before using AI",
                    "Reflective Practice: evaluating AI's impact on learning",
                ],
                resources: &[
                    ("Tool Tutorials", "Guides for popular AI tools"),
                    ("Learning Plan Template", "Structure your AI use"),
                    ("AI Challenges & Activities", "Hands-on activities"),
                ],
                checklist: [
                    "Complete tool tutorials",
                    "Create learning plan",
                    "AI Challenges & Activities",
                ],
            },
        }
    }
}

impl FromStr for LiteracyModuleId {
    type Err = LiteracyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.slug() == s)
            .ok_or_else(|| LiteracyError::UnknownModule(s.to_string()))
    }
}

/// Static content of one module
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LiteracyModule {
    pub id: LiteracyModuleId,
    pub title: &'static str,
    pub topics: &'static [&'static str],
    pub resources: &'static [(&'static str, &'static str)],
    pub checklist: [&'static str; TASKS_PER_MODULE],
}

/// Completed checklist flags for every module
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteracyProgress {
    completed: [[bool; TASKS_PER_MODULE]; 4],
}

impl LiteracyProgress {
    pub fn set_task(
        &mut self,
        module: LiteracyModuleId,
        index: usize,
        done: bool,
    ) -> Result<(), LiteracyError> {
        let flags = &mut self.completed[module.position()];
        let flag = flags.get_mut(index).ok_or(LiteracyError::TaskOutOfRange {
            index,
            len: TASKS_PER_MODULE,
        })?;
        *flag = done;
        tracing::debug!(module = module.slug(), index, done, "Updated literacy checklist");
        Ok(())
    }

    pub fn tasks(&self, module: LiteracyModuleId) -> [bool; TASKS_PER_MODULE] {
        self.completed[module.position()]
    }

    /// Whole-number completion percentage, rounded down
    pub fn completion(&self, module: LiteracyModuleId) -> u32 {
        let done = self.tasks(module).iter().filter(|&&d| d).count();
        (done * 100 / TASKS_PER_MODULE) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rounds_down() {
        let mut progress = LiteracyProgress::default();
        let module = LiteracyModuleId::AiEthics;

        assert_eq!(progress.completion(module), 0);
        progress.set_task(module, 0, true).unwrap();
        assert_eq!(progress.completion(module), 33);
        progress.set_task(module, 2, true).unwrap();
        assert_eq!(progress.completion(module), 66);
        progress.set_task(module, 1, true).unwrap();
        assert_eq!(progress.completion(module), 100);
        progress.set_task(module, 1, false).unwrap();
        assert_eq!(progress.completion(module), 66);
    }

    #[test]
    fn test_modules_are_independent() {
        let mut progress = LiteracyProgress::default();
        progress
            .set_task(LiteracyModuleId::CriticalThinking, 1, true)
            .unwrap();
        assert_eq!(progress.completion(LiteracyModuleId::ConceptualUnderstanding), 0);
        assert_eq!(progress.tasks(LiteracyModuleId::CriticalThinking), [false, true, false]);
    }

    #[test]
    fn test_out_of_range_task() {
        let mut progress = LiteracyProgress::default();
        let err = progress
            .set_task(LiteracyModuleId::UsingAiForLearning, 3, true)
            .unwrap_err();
        assert_eq!(err, LiteracyError::TaskOutOfRange { index: 3, len: 3 });
    }

    #[test]
    fn test_slug_round_trip() {
        for module in LiteracyModuleId::ALL {
            assert_eq!(module.slug().parse::<LiteracyModuleId>().unwrap(), module);
            assert_eq!(module.definition().id, module);
        }
        assert!("module9".parse::<LiteracyModuleId>().is_err());
    }
}
