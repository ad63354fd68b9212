use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{GenerationError, GenerationResult};
use crate::llm::prompt::{ANSWER_MARKER, EXPLANATION_MARKER, QUESTION_MARKER};
use crate::question::{OPTION_COUNT, OPTION_LABELS, Question, QuestionError};
use crate::utils::trim_line;

static QUESTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{}\s*(?:\d+)?\s*[:.)]\s*(.*)$",
        marker_pattern(QUESTION_MARKER)
    ))
    .unwrap()
});
// Any single-letter label, so a fifth option is seen as one rather than as
// text continuing option D. The label must be followed by whitespace or end
// the line, which keeps "e.g." and "i.e." out.
static OPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:\(([A-Z])\)|([A-Z])[).:])[*_]*(?:\s+(.*))?$").unwrap()
});
static ANSWER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:{}|answer)\s*[:\-]\s*(.*)$",
        marker_pattern(ANSWER_MARKER)
    ))
    .unwrap()
});
static EXPLANATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{}\s*[:\-]\s*(.*)$",
        marker_pattern(EXPLANATION_MARKER)
    ))
    .unwrap()
});

/// `Correct Answer` becomes `Correct\s+Answer`.
fn marker_pattern(marker: &str) -> String {
    marker
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("missing question text")]
    MissingStem,
    #[error("missing option {0}")]
    MissingOption(char),
    #[error("option {0} appears more than once")]
    DuplicateOption(char),
    #[error("unexpected option {0}; questions have exactly four options")]
    ExtraOption(char),
    #[error("missing correct answer")]
    MissingAnswer,
    #[error("correct answer {0:?} does not name one of the four options")]
    UnresolvedAnswer(String),
    #[error("missing explanation")]
    MissingExplanation,
    #[error(transparent)]
    Invalid(#[from] QuestionError),
}

/// A candidate block the parser dropped. `position` is 1-based, counted over
/// all blocks in the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBlock {
    pub position: usize,
    pub reason: BlockError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReport {
    pub questions: Vec<Question>,
    pub skipped: Vec<SkippedBlock>,
}

/// Parses a model reply into at most `expected_count` questions, in reply
/// order. Malformed blocks are skipped; zero survivors is an error.
pub fn parse(raw_text: &str, expected_count: usize) -> GenerationResult<Vec<Question>> {
    parse_with_report(raw_text, expected_count).map(|report| report.questions)
}

pub fn parse_with_report(raw_text: &str, expected_count: usize) -> GenerationResult<ParseReport> {
    let blocks = split_blocks(raw_text);
    debug!(blocks = blocks.len(), "split model reply");

    let mut questions = Vec::new();
    let mut skipped = Vec::new();
    for (idx, block) in blocks.iter().enumerate() {
        match parse_block(block) {
            Ok(question) => questions.push(question),
            Err(reason) => {
                warn!(position = idx + 1, %reason, "skipping malformed question block");
                skipped.push(SkippedBlock {
                    position: idx + 1,
                    reason,
                });
            }
        }
    }

    if questions.is_empty() {
        return Err(GenerationError::NoParsableQuestions);
    }

    let limit = expected_count.max(1);
    if questions.len() > limit {
        debug!(
            recovered = questions.len(),
            limit, "dropping questions beyond the requested count"
        );
        questions.truncate(limit);
    }

    Ok(ParseReport { questions, skipped })
}

/// Maps a correct-answer token to a 0-based index. Letters A-D map to 0-3;
/// a bare number is 1-based.
pub fn normalize_answer(raw: &str) -> Option<usize> {
    let mut tokens = raw.split_whitespace().map(strip_answer_punctuation);
    let mut token = tokens.next()?;
    if token.eq_ignore_ascii_case("option") || token.eq_ignore_ascii_case("choice") {
        token = tokens.next()?;
    }

    let mut chars = token.chars();
    if let (Some(letter), None) = (chars.next(), chars.next()) {
        let upper = letter.to_ascii_uppercase();
        if let Some(idx) = OPTION_LABELS.iter().position(|&label| label == upper) {
            return Some(idx);
        }
    }

    match token.parse::<usize>() {
        Ok(n) if (1..=OPTION_COUNT).contains(&n) => Some(n - 1),
        _ => None,
    }
}

fn strip_answer_punctuation(token: &str) -> &str {
    token.trim_matches(|c: char| matches!(c, '(' | ')' | '[' | ']' | '.' | ':' | ',' | '*' | '"'))
}

/// Strips markdown emphasis and heading marks the model sometimes adds.
fn clean_line(line: &str) -> &str {
    line.trim()
        .trim_start_matches(['#', '*', '_'])
        .trim_end_matches(['*', '_'])
        .trim()
}

/// Separator lines such as `---` or `=====`.
fn is_rule(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| matches!(c, '-' | '='))
}

fn split_blocks(raw_text: &str) -> Vec<Vec<&str>> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();

    for raw_line in raw_text.lines() {
        let line = clean_line(raw_line);
        if line.starts_with("```") || is_rule(line) {
            continue;
        }
        if QUESTION_RE.is_match(line) {
            blocks.push(vec![line]);
            continue;
        }
        // Anything before the first marker is preamble.
        if let Some(block) = blocks.last_mut() {
            block.push(line);
        }
    }

    blocks
}

fn parse_block(lines: &[&str]) -> Result<Question, BlockError> {
    #[derive(Copy, Clone)]
    enum Section {
        Stem,
        Option(usize),
        Answer,
        Explanation,
    }

    let mut stem_lines: Vec<&str> = Vec::new();
    let mut options: [Option<Vec<&str>>; OPTION_COUNT] = Default::default();
    let mut answer: Option<&str> = None;
    let mut explanation_lines: Option<Vec<&str>> = None;
    let mut section = Section::Stem;

    for (i, &line) in lines.iter().enumerate() {
        if i == 0 {
            if let Some(caps) = QUESTION_RE.captures(line)
                && let Some(rest) = caps.get(1).and_then(|m| trim_line(clean_line(m.as_str())))
            {
                stem_lines.push(rest);
            }
            continue;
        }

        if trim_line(line).is_none() {
            continue;
        }

        if let Some(caps) = OPTION_RE.captures(line) {
            let label = caps
                .get(1)
                .or_else(|| caps.get(2))
                .and_then(|m| m.as_str().chars().next())
                .unwrap_or('A')
                .to_ascii_uppercase();
            let Some(idx) = OPTION_LABELS.iter().position(|&l| l == label) else {
                return Err(BlockError::ExtraOption(label));
            };
            if options[idx].is_some() {
                return Err(BlockError::DuplicateOption(label));
            }
            let text = caps.get(3).map(|m| clean_line(m.as_str())).unwrap_or_default();
            options[idx] = Some(trim_line(text).into_iter().collect());
            section = Section::Option(idx);
            continue;
        }

        if let Some(caps) = ANSWER_RE.captures(line) {
            if answer.is_none() {
                answer = Some(caps.get(1).map(|m| clean_line(m.as_str())).unwrap_or_default());
            }
            section = Section::Answer;
            continue;
        }

        if let Some(caps) = EXPLANATION_RE.captures(line) {
            let text = caps.get(1).map(|m| clean_line(m.as_str())).unwrap_or_default();
            explanation_lines = Some(trim_line(text).into_iter().collect());
            section = Section::Explanation;
            continue;
        }

        match section {
            Section::Stem => stem_lines.push(line),
            Section::Option(idx) => {
                if let Some(option) = options[idx].as_mut() {
                    option.push(line);
                }
            }
            Section::Answer => {}
            Section::Explanation => {
                if let Some(explanation) = explanation_lines.as_mut() {
                    explanation.push(line);
                }
            }
        }
    }

    if stem_lines.is_empty() {
        return Err(BlockError::MissingStem);
    }

    let mut option_texts: [String; OPTION_COUNT] = Default::default();
    for (idx, option) in options.iter().enumerate() {
        let Some(parts) = option else {
            return Err(BlockError::MissingOption(OPTION_LABELS[idx]));
        };
        option_texts[idx] = parts.join(" ");
    }

    let answer = answer.ok_or(BlockError::MissingAnswer)?;
    let correct_index =
        normalize_answer(answer).ok_or_else(|| BlockError::UnresolvedAnswer(answer.to_string()))?;

    let explanation = explanation_lines
        .map(|parts| parts.join(" "))
        .ok_or(BlockError::MissingExplanation)?;

    let question = Question::new(
        &stem_lines.join(" "),
        option_texts,
        correct_index,
        &explanation,
    )?;
    Ok(question)
}
