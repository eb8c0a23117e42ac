//! Heuristic scoring of assessment answers
//!
//! Each question is classified by keywords in its text and the selected
//! option letter is mapped to 0..=3 points. Scores are always recomputed
//! from the current answers and never stored.

use serde::Serialize;

use crate::assessment::Assessment;

/// Points available per answered question
pub const MAX_POINTS: u32 = 3;

/// Rule bucket chosen from the question text
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// A=0 .. D=3
    Frequency,
    /// A=3 .. D=0
    Reversed,
    /// Always 1
    Flat,
    /// A=1, B=2, C=2, D=1
    Default,
}

impl Rule {
    /// First match wins, in this order.
    pub fn classify(question: &str) -> Self {
        let text = question.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| text.contains(w));

        if has(&["how often", "frequency"]) {
            Rule::Frequency
        } else if has(&["feel", "ethical"]) {
            Rule::Reversed
        } else if has(&["task", "use"]) {
            Rule::Flat
        } else {
            Rule::Default
        }
    }

    fn points(self, letter: Option<u32>) -> u32 {
        match (self, letter) {
            (Rule::Flat, _) => 1,
            (_, None) => 0,
            (Rule::Frequency, Some(i)) => i,
            (Rule::Reversed, Some(i)) => MAX_POINTS - i,
            (Rule::Default, Some(0 | 3)) => 1,
            (Rule::Default, Some(_)) => 2,
        }
    }
}

/// Index of the leading option letter (A=0 .. D=3), if it is one.
pub fn letter_index(option: &str) -> Option<u32> {
    match option.chars().next()?.to_ascii_uppercase() {
        'A' => Some(0),
        'B' => Some(1),
        'C' => Some(2),
        'D' => Some(3),
        _ => None,
    }
}

/// Points for a single answer; an unrecognised letter scores 0.
pub fn score_question(question: &str, selected: &str) -> u32 {
    Rule::classify(question).points(letter_index(selected))
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct QuestionScore {
    pub index: usize,
    pub question: String,
    pub answer: String,
    pub rule: Rule,
    pub letter_value: Option<u32>,
    pub earned_points: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub questions: Vec<QuestionScore>,
    pub total_score: u32,
    pub max_score: u32,
    pub percentage: f64,
}

impl ScoreResult {
    pub fn answered_count(&self) -> usize {
        self.questions.len()
    }

    pub fn tier(&self) -> Tier {
        Tier::from_percentage(self.percentage)
    }
}

/// Sums points over answered questions only.
///
/// Unanswered questions count toward neither the total nor the maximum.
pub fn aggregate(assessment: &Assessment) -> ScoreResult {
    let questions: Vec<QuestionScore> = assessment
        .responses()
        .map(|response| {
            let rule = Rule::classify(&response.question);
            let letter_value = letter_index(&response.answer);
            QuestionScore {
                index: response.index,
                earned_points: rule.points(letter_value),
                question: response.question,
                answer: response.answer,
                rule,
                letter_value,
            }
        })
        .collect();

    let total_score: u32 = questions.iter().map(|q| q.earned_points).sum();
    let max_score = MAX_POINTS * questions.len() as u32;
    let percentage = if max_score == 0 {
        0.0
    } else {
        100.0 * f64::from(total_score) / f64::from(max_score)
    };

    ScoreResult {
        questions,
        total_score,
        max_score,
        percentage,
    }
}

/// Qualitative band for a percentage score
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Novice,
    Limited,
    Developing,
    Balanced,
    HighlyStrategic,
}

impl Tier {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Tier::HighlyStrategic
        } else if percentage >= 60.0 {
            Tier::Balanced
        } else if percentage >= 40.0 {
            Tier::Developing
        } else if percentage >= 20.0 {
            Tier::Limited
        } else {
            Tier::Novice
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::HighlyStrategic => "Highly Strategic AI User",
            Tier::Balanced => "Balanced AI Usage",
            Tier::Developing => "Developing AI Skills",
            Tier::Limited => "Limited AI Engagement",
            Tier::Novice => "Novice AI User",
        }
    }

    pub fn interpretation(self) -> &'static str {
        match self {
            Tier::HighlyStrategic => "You leverage AI effectively while maintaining academic integrity. You demonstrate advanced understanding of when and how to use AI tools appropriately.",
            Tier::Balanced => "You have a good mix of practical AI use and ethical consideration. You're exploring AI's potential while maintaining critical thinking skills.",
            Tier::Developing => "You're growing more comfortable with AI tools, but there's room for more strategic and effective use. Consider exploring different applications.",
            Tier::Limited => "You could benefit from exploring more AI applications. Consider how AI might help with specific learning challenges.",
            Tier::Novice => "Significant opportunity to learn about AI's educational potential. Start with simple tasks like brainstorming or research assistance.",
        }
    }
}

/// Extra hint shown at the low and high ends of the scale
pub fn tip(percentage: f64) -> Option<&'static str> {
    if percentage < 40.0 {
        Some("Consider starting with AI tools for brainstorming or research to build confidence.")
    } else if percentage > 70.0 {
        Some("Share your effective AI usage strategies with peers who are just starting out.")
    } else {
        None
    }
}
