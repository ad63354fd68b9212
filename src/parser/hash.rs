use std::fmt;

use blake3::Hasher;

use crate::question::GenerationRequest;

/// Cache key of a request: hash of the study text, the topic hint and the
/// question count. The credential is deliberately left out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn of(request: &GenerationRequest) -> Self {
        Self::from_parts(&request.study_text, request.topic(), request.question_count)
    }

    // Fields are length-prefixed so ("ab", "c") and ("a", "bc") differ.
    pub fn from_parts(study_text: &str, topic: Option<&str>, question_count: usize) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(&(study_text.len() as u64).to_le_bytes());
        hasher.update(study_text.as_bytes());
        match topic {
            Some(topic) => {
                hasher.update(&[1]);
                hasher.update(&(topic.len() as u64).to_le_bytes());
                hasher.update(topic.as_bytes());
            }
            None => {
                hasher.update(&[0]);
            }
        }
        hasher.update(&(question_count as u64).to_le_bytes());

        Self(hasher.finalize().to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form for logs.
        f.write_str(&self.0[..12.min(self.0.len())])
    }
}
