//! Instruction text sent to the model.
//!
//! The output grammar described here is the one `parser::response` reads
//! back; both sides share the marker constants below.

use crate::question::OPTION_LABELS;

pub const QUESTION_MARKER: &str = "Question";
pub const ANSWER_MARKER: &str = "Correct Answer";
pub const EXPLANATION_MARKER: &str = "Explanation";

const PROMPT_HEADER: &str = "You are an expert educator writing multiple-choice practice questions for a student.";

const QUALITY_RULES: &str = r#"Rules:
- Each question has exactly four options and exactly ONE of them is correct.
- Questions test understanding, not just memorization.
- Questions are clear and unambiguous and are answerable from the study material.
- The explanation briefly says why the correct option is right."#;

const OUTPUT_RULES: &str = r#"Output rules:
- Output ONLY the questions in the format above, one after another, separated by a blank line.
- Do not write any introduction, summary, headings or closing remarks.
- Do not use markdown, bold text, numbered lists or code fences.
- Put each field on its own line, starting with its label exactly as shown."#;

/// Builds the instruction for `question_count` items from `study_text`.
///
/// The caller guarantees `question_count` is already in range; a blank
/// `topic_hint` is treated as absent.
pub fn build(study_text: &str, topic_hint: Option<&str>, question_count: usize) -> String {
    let topic = topic_hint.map(str::trim).filter(|t| !t.is_empty());

    let mut prompt = String::with_capacity(study_text.len() + 1024);
    prompt.push_str(PROMPT_HEADER);
    prompt.push_str("\n\n");

    prompt.push_str(&format!(
        "Based on the study material below, write exactly {question_count} multiple-choice {}.\n",
        if question_count == 1 { "question" } else { "questions" }
    ));
    match topic {
        Some(topic) => prompt.push_str(&format!(
            "Restrict the questions to the topic: \"{topic}\". Ignore parts of the material unrelated to it.\n"
        )),
        None => prompt.push_str("Draw the questions from the whole study material.\n"),
    }

    prompt.push_str("\nStudy material:\n\"\"\"\n");
    prompt.push_str(study_text.trim());
    prompt.push_str("\n\"\"\"\n\n");

    prompt.push_str(QUALITY_RULES);
    prompt.push_str("\n\nFormat every question EXACTLY like this:\n\n");
    prompt.push_str(&format_template(1));
    prompt.push_str("\n\nNumber the questions 1 to ");
    prompt.push_str(&question_count.to_string());
    prompt.push_str(".\n\n");
    prompt.push_str(OUTPUT_RULES);
    prompt.push('\n');

    prompt
}

fn format_template(number: usize) -> String {
    let mut out = format!("{QUESTION_MARKER} {number}: [question text]\n");
    for label in OPTION_LABELS {
        out.push_str(&format!("{label}) [option {label}]\n"));
    }
    out.push_str(&format!("{ANSWER_MARKER}: [A, B, C or D]\n"));
    out.push_str(&format!("{EXPLANATION_MARKER}: [why the answer is correct]"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATERIAL: &str = "Photosynthesis converts light energy into chemical energy stored in glucose.";

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(
            build(MATERIAL, Some("Biology"), 5),
            build(MATERIAL, Some("Biology"), 5)
        );
    }

    #[test]
    fn prompt_names_count_and_material() {
        let prompt = build(MATERIAL, None, 7);
        assert!(prompt.contains("write exactly 7 multiple-choice questions"));
        assert!(prompt.contains("Number the questions 1 to 7."));
        assert!(prompt.contains(MATERIAL));

        let single = build(MATERIAL, None, 1);
        assert!(single.contains("write exactly 1 multiple-choice question.\n"));
    }

    #[test]
    fn prompt_spells_out_the_grammar() {
        let prompt = build(MATERIAL, None, 3);
        assert!(prompt.contains("Question 1: [question text]\n"));
        assert!(prompt.contains("A) [option A]\nB) [option B]\nC) [option C]\nD) [option D]\n"));
        assert!(prompt.contains("Correct Answer: [A, B, C or D]\n"));
        assert!(prompt.contains("Explanation: [why the answer is correct]"));
        assert!(prompt.contains("Do not use markdown"));
        assert!(prompt.contains("code fences"));
    }

    #[test]
    fn topic_is_woven_in_only_when_present() {
        let with_topic = build(MATERIAL, Some(" Light reactions "), 3);
        assert!(with_topic.contains("Restrict the questions to the topic: \"Light reactions\""));
        assert!(!with_topic.contains("whole study material"));

        for hint in [None, Some(""), Some("   ")] {
            let prompt = build(MATERIAL, hint, 3);
            assert!(!prompt.contains("Restrict the questions"));
            assert!(prompt.contains("Draw the questions from the whole study material."));
        }
    }
}
