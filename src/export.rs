use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::question::{OPTION_LABELS, Question};
use crate::utils::trim_line;

const RULE_WIDTH: usize = 50;
const DEFAULT_STEM: &str = "practice";

pub fn title(topic: Option<&str>) -> String {
    match topic.and_then(trim_line) {
        Some(topic) => format!("Practice Questions - {topic}"),
        None => "Practice Questions".to_string(),
    }
}

/// `<topic with underscores>_questions.txt`
pub fn default_file_name(topic: Option<&str>) -> String {
    let stem = topic
        .and_then(trim_line)
        .map(|topic| {
            topic
                .chars()
                .map(|c| match c {
                    ' ' => '_',
                    '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
                    c => c,
                })
                .collect::<String>()
        })
        .unwrap_or_else(|| DEFAULT_STEM.to_string());
    format!("{stem}_questions.txt")
}

pub fn to_plain_text(title: &str, questions: &[Question]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}\n", "=".repeat(RULE_WIDTH));

    for (idx, question) in questions.iter().enumerate() {
        let _ = writeln!(out, "Question {}: {}", idx + 1, question.prompt());
        for (label, option) in OPTION_LABELS.iter().zip(question.options()) {
            let _ = writeln!(out, "{label}) {option}");
        }
        let _ = writeln!(out, "\nCorrect Answer: {}", question.correct_label());
        let _ = writeln!(out, "Explanation: {}\n", question.explanation());
        let _ = writeln!(out, "{}\n", "-".repeat(RULE_WIDTH));
    }

    out
}

/// Questions generated from one study source.
#[derive(Debug, Serialize)]
pub struct QuestionSet<'a> {
    pub source: &'a str,
    pub questions: &'a [Question],
}

pub fn to_json(sets: &[QuestionSet<'_>]) -> Result<String> {
    let contents = serde_json::to_string_pretty(sets)?;
    Ok(format!("{}\n", contents))
}

pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("Failed to write questions to {}", path.display()))
}
