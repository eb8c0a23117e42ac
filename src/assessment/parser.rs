//! Parser for line-oriented question listings returned by the completion
//! service.
//!
//! The input is untrusted free text. A question line looks like
//! `Q1: text`, `Question 2. text` or `**Q3:** text`; an option line starts
//! with `A.` through `D.`. Everything else is ignored.

use super::Question;

/// Maximum number of questions kept from a single response
pub const MAX_QUESTIONS: usize = 5;

/// Classification of one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Question(&'a str),
    Option(&'a str),
    Other,
}

/// Result of parsing one response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuestions {
    pub questions: Vec<Question>,
    /// Candidates dropped for missing text or too few options
    pub discarded: usize,
}

#[derive(Default)]
struct Candidate {
    text: String,
    options: Vec<String>,
}

impl Candidate {
    fn into_question(self) -> Option<Question> {
        if self.text.is_empty() || self.options.len() < 4 {
            return None;
        }
        let mut options = self.options.into_iter();
        let mut next = || options.next().unwrap_or_default();
        Some(Question {
            text: self.text,
            options: [next(), next(), next(), next()],
        })
    }
}

fn strip_decoration(line: &str) -> &str {
    line.trim()
        .trim_start_matches(|c: char| c == '*' || c == '#' || c == '-' || c == '>')
        .trim_start()
}

fn strip_emphasis(text: &str) -> &str {
    text.trim().trim_matches('*').trim()
}

/// Returns the remainder after a question marker, if the line has one.
fn question_body(line: &str) -> Option<&str> {
    let rest = match line.get(..8) {
        Some(prefix) if prefix.eq_ignore_ascii_case("question") => &line[8..],
        _ => line.strip_prefix('Q').or_else(|| line.strip_prefix('q'))?,
    };

    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit() || c == ' ');
    let rest = rest.strip_prefix('*').unwrap_or(rest);
    let rest = rest.strip_prefix('*').unwrap_or(rest);
    rest.strip_prefix(|c: char| c == ':' || c == '.' || c == ')')
}

pub fn classify(line: &str) -> Line<'_> {
    let line = strip_decoration(line);

    let mut chars = line.chars();
    if let (Some('A'..='D'), Some('.')) = (chars.next(), chars.next()) {
        return Line::Option(line.trim_end_matches('*').trim_end());
    }

    match question_body(line) {
        Some(body) => Line::Question(strip_emphasis(body)),
        None => Line::Other,
    }
}

/// Parses a response into well-formed questions.
///
/// A question line flushes the previous candidate and starts a new one;
/// option lines attach to the current candidate. Candidates without text or
/// with fewer than four options are discarded, extra options are truncated,
/// and at most [`MAX_QUESTIONS`] are kept.
pub fn parse_questions(raw: &str) -> ParsedQuestions {
    let mut candidates = Vec::new();
    let mut current: Option<Candidate> = None;

    for line in raw.lines() {
        match classify(line) {
            Line::Question(text) => {
                if let Some(done) = current.take() {
                    candidates.push(done);
                }
                current = Some(Candidate {
                    text: text.to_string(),
                    options: Vec::new(),
                });
            }
            Line::Option(option) => {
                if let Some(candidate) = current.as_mut() {
                    candidate.options.push(option.to_string());
                }
            }
            Line::Other => {}
        }
    }
    if let Some(done) = current.take() {
        candidates.push(done);
    }

    let total = candidates.len();
    let mut questions: Vec<Question> = candidates
        .into_iter()
        .filter_map(Candidate::into_question)
        .collect();
    let discarded = total - questions.len();
    questions.truncate(MAX_QUESTIONS);

    tracing::debug!(total, kept = questions.len(), discarded, "Parsed generated questions");
    ParsedQuestions {
        questions,
        discarded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(n: usize, options: usize) -> String {
        let mut out = format!("Q{n}: Question number {n}?\n");
        for letter in ['A', 'B', 'C', 'D', 'E'].iter().take(options) {
            out.push_str(&format!("{letter}. option {letter}\n"));
        }
        out
    }

    #[test]
    fn test_classify_question_markers() {
        assert_eq!(classify("Q1: How often?"), Line::Question("How often?"));
        assert_eq!(classify("Question 2. Why?"), Line::Question("Why?"));
        assert_eq!(classify("**Q3:** Bold?"), Line::Question("Bold?"));
        assert_eq!(classify("  q: lower"), Line::Question("lower"));
        assert_eq!(classify("Questions: follow"), Line::Other);
        assert_eq!(classify("Quickly now"), Line::Other);
    }

    #[test]
    fn test_classify_option_lines() {
        assert_eq!(classify("A. Never"), Line::Option("A. Never"));
        assert_eq!(classify("  - D. Daily  "), Line::Option("D. Daily"));
        assert_eq!(classify("E. Extra"), Line::Other);
        assert_eq!(classify("A) Never"), Line::Other);
    }

    #[test]
    fn test_parse_well_formed_response() {
        let raw: String = (1..=5).map(|n| block(n, 4)).collect();
        let parsed = parse_questions(&raw);

        assert_eq!(parsed.questions.len(), 5);
        assert_eq!(parsed.discarded, 0);
        assert_eq!(parsed.questions[0].text, "Question number 1?");
        assert_eq!(parsed.questions[0].options[3], "D. option D");
    }

    #[test]
    fn test_parse_discards_malformed_candidates() {
        let raw = format!(
            "{}{}{}{}Q9:\nA. a\nB. b\nC. c\nD. d\n{}",
            block(1, 4),
            block(2, 2),
            block(3, 4),
            block(4, 3),
            block(5, 4),
        );
        let parsed = parse_questions(&raw);

        assert_eq!(parsed.questions.len(), 3);
        assert_eq!(parsed.discarded, 3);
        assert!(parsed.questions.iter().all(|q| q.options.len() == 4));
    }

    #[test]
    fn test_parse_truncates_extra_options() {
        let parsed = parse_questions(&block(1, 5));
        assert_eq!(parsed.questions.len(), 1);
        assert_eq!(parsed.questions[0].options[3], "D. option D");
    }

    #[test]
    fn test_parse_caps_at_five_questions() {
        let raw: String = (1..=8).map(|n| block(n, 4)).collect();
        assert_eq!(parse_questions(&raw).questions.len(), MAX_QUESTIONS);
    }

    #[test]
    fn test_options_before_any_question_are_ignored() {
        let raw = format!("A. stray\nB. stray\n{}", block(1, 4));
        let parsed = parse_questions(&raw);
        assert_eq!(parsed.questions.len(), 1);
        assert_eq!(parsed.questions[0].options[0], "A. option A");
    }

    #[test]
    fn test_arbitrary_input_never_panics() {
        let fragments = [
            "Q", "Q1", ":", "Question", "é", "A.", "D.", "\n", "**", " ", "ü1:", "Qé",
            "question 12)", "#", "-",
        ];
        for a in fragments {
            for b in fragments {
                for c in fragments {
                    let raw = format!("{a}{b}{c}\n{c}{a}\n{b}");
                    let parsed = parse_questions(&raw);
                    assert!(parsed.questions.len() <= MAX_QUESTIONS);
                    for q in &parsed.questions {
                        assert!(!q.text.is_empty());
                    }
                }
            }
        }
    }
}
