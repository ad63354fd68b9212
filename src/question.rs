use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{GenerationError, GenerationResult};
use crate::utils::trim_line;

pub const MIN_STUDY_TEXT_CHARS: usize = 50;
pub const MIN_QUESTION_COUNT: usize = 1;
pub const MAX_QUESTION_COUNT: usize = 10;
pub const OPTION_COUNT: usize = 4;
pub const OPTION_LABELS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyPrompt,
    #[error("option {0} is empty")]
    EmptyOption(char),
    #[error("correct answer index {0} is out of range")]
    AnswerOutOfRange(usize),
    #[error("explanation is empty")]
    EmptyExplanation,
}

/// A single multiple-choice question. Built once by the parser and never
/// mutated afterwards, so the fields are only reachable through getters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    prompt: String,
    options: [String; OPTION_COUNT],
    correct_index: usize,
    explanation: String,
}

impl Question {
    pub fn new(
        prompt: &str,
        options: [String; OPTION_COUNT],
        correct_index: usize,
        explanation: &str,
    ) -> Result<Self, QuestionError> {
        let prompt = trim_line(prompt).ok_or(QuestionError::EmptyPrompt)?;
        let explanation = trim_line(explanation).ok_or(QuestionError::EmptyExplanation)?;
        if correct_index >= OPTION_COUNT {
            return Err(QuestionError::AnswerOutOfRange(correct_index));
        }

        let mut trimmed: [String; OPTION_COUNT] = Default::default();
        for (idx, option) in options.iter().enumerate() {
            trimmed[idx] = trim_line(option)
                .ok_or(QuestionError::EmptyOption(OPTION_LABELS[idx]))?
                .to_string();
        }

        Ok(Self {
            prompt: prompt.to_string(),
            options: trimmed,
            correct_index,
            explanation: explanation.to_string(),
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn correct_label(&self) -> char {
        OPTION_LABELS[self.correct_index]
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

/// Opaque API secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub study_text: String,
    pub topic_hint: Option<String>,
    pub question_count: usize,
    pub credential: Credential,
}

impl GenerationRequest {
    pub fn new(
        study_text: impl Into<String>,
        topic_hint: Option<String>,
        question_count: usize,
        credential: Credential,
    ) -> Self {
        Self {
            study_text: study_text.into(),
            topic_hint,
            question_count,
            credential,
        }
    }

    /// The topic hint, or `None` when it is missing or blank.
    pub fn topic(&self) -> Option<&str> {
        self.topic_hint.as_deref().and_then(trim_line)
    }

    pub fn validate(&self) -> GenerationResult<()> {
        let Some(text) = trim_line(&self.study_text) else {
            return Err(GenerationError::InvalidInput(
                "study text is empty".to_string(),
            ));
        };

        let chars = text.chars().count();
        if chars < MIN_STUDY_TEXT_CHARS {
            return Err(GenerationError::InvalidInput(format!(
                "study text has {chars} characters, at least {MIN_STUDY_TEXT_CHARS} are required"
            )));
        }

        if !(MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&self.question_count) {
            return Err(GenerationError::InvalidInput(format!(
                "question count must be between {MIN_QUESTION_COUNT} and {MAX_QUESTION_COUNT}, got {}",
                self.question_count
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> [String; OPTION_COUNT] {
        ["Red".into(), " Green ".into(), "Blue".into(), "Yellow".into()]
    }

    fn request(text: &str, count: usize) -> GenerationRequest {
        GenerationRequest::new(text, None, count, Credential::new("sk-test"))
    }

    #[test]
    fn question_trims_fields() {
        let question = Question::new("  Which colour?  ", options(), 1, " Because. ").unwrap();
        assert_eq!(question.prompt(), "Which colour?");
        assert_eq!(question.options()[1], "Green");
        assert_eq!(question.correct_label(), 'B');
        assert_eq!(question.correct_option(), "Green");
        assert_eq!(question.explanation(), "Because.");
    }

    #[test]
    fn question_rejects_broken_invariants() {
        assert_eq!(
            Question::new("   ", options(), 0, "x"),
            Err(QuestionError::EmptyPrompt)
        );
        assert_eq!(
            Question::new("q", options(), 4, "x"),
            Err(QuestionError::AnswerOutOfRange(4))
        );
        assert_eq!(
            Question::new("q", options(), 0, "\n"),
            Err(QuestionError::EmptyExplanation)
        );

        let mut opts = options();
        opts[2] = "  ".into();
        assert_eq!(
            Question::new("q", opts, 0, "x"),
            Err(QuestionError::EmptyOption('C'))
        );
    }

    #[test]
    fn credential_debug_is_redacted() {
        let credential = Credential::new("sk-very-secret-value");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
        assert_eq!(credential.expose(), "sk-very-secret-value");
    }

    #[test]
    fn blank_topic_is_absent() {
        let mut req = request(&"x".repeat(60), 3);
        assert_eq!(req.topic(), None);
        req.topic_hint = Some("   ".into());
        assert_eq!(req.topic(), None);
        req.topic_hint = Some(" Photosynthesis ".into());
        assert_eq!(req.topic(), Some("Photosynthesis"));
    }

    #[test]
    fn validate_study_text_length() {
        assert!(matches!(
            request("", 3).validate(),
            Err(GenerationError::InvalidInput(_))
        ));
        assert!(matches!(
            request(&format!("  {}  ", "a".repeat(49)), 3).validate(),
            Err(GenerationError::InvalidInput(_))
        ));
        assert!(request(&"a".repeat(50), 3).validate().is_ok());
    }

    #[test]
    fn validate_question_count_range() {
        let text = "a".repeat(80);
        assert!(request(&text, 0).validate().is_err());
        assert!(request(&text, 11).validate().is_err());
        assert!(request(&text, 1).validate().is_ok());
        assert!(request(&text, 10).validate().is_ok());
    }
}
