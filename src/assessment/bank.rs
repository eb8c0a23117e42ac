//! Built-in question bank, used by default and whenever generation fails

use super::Question;

pub fn fixed_question_bank() -> Vec<Question> {
    vec![
        Question::new(
            "How often do you use AI tools for academic work?",
            [
                "A. Never",
                "B. Rarely (1-2 times per week)",
                "C. Regularly (3-5 times per week)",
                "D. Daily",
            ],
        ),
        Question::new(
            "Which type of tasks do you most commonly use AI for?",
            [
                "A. Brainstorming ideas",
                "B. Writing assistance",
                "C. Research and information gathering",
                "D. Problem solving and analysis",
            ],
        ),
        Question::new(
            "How do you feel about using AI for academic work?",
            [
                "A. It's essential for my learning",
                "B. It's helpful but I use it cautiously",
                "C. I prefer traditional methods",
                "D. I'm concerned about over-reliance",
            ],
        ),
        Question::new(
            "When using AI, how often do you verify the information provided?",
            [
                "A. Always - I check multiple sources",
                "B. Usually - for important information",
                "C. Sometimes - if I have doubts",
                "D. Rarely - I trust the AI's output",
            ],
        ),
        Question::new(
            "How has AI usage affected your learning process?",
            [
                "A. Greatly improved efficiency",
                "B. Some improvements with some concerns",
                "C. Mixed results - helpful but distracting",
                "D. Negative impact - reduced my own thinking",
            ],
        ),
    ]
}
