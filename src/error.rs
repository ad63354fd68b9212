use thiserror::Error;

pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

/// Everything that can stop a `generate` call from producing questions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid API credential: {0}")]
    InvalidCredential(String),

    #[error("the model provider is rate limiting requests")]
    RateLimited,

    #[error("could not reach the model provider: {0}")]
    Unreachable(String),

    #[error("the model returned no text")]
    EmptyResponse,

    #[error("no question in the model reply matched the expected format")]
    NoParsableQuestions,

    /// Provider failure that fits no other category. The details are for logs
    /// and are not stable across provider versions.
    #[error("model provider error: {0}")]
    UnknownProviderError(String),
}

impl GenerationError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimited
                | GenerationError::Unreachable(_)
                | GenerationError::EmptyResponse
        )
    }

    pub fn hint(&self) -> &'static str {
        match self {
            GenerationError::InvalidInput(_) => {
                "Check the study material (at least 50 characters) and the question count (1-10)."
            }
            GenerationError::InvalidCredential(_) => "Enter a valid OpenAI API key and try again.",
            GenerationError::RateLimited => "The provider is throttling requests. Wait a bit and retry.",
            GenerationError::Unreachable(_) => "Check your internet connection and retry.",
            GenerationError::EmptyResponse => "The model said nothing. Try again.",
            GenerationError::NoParsableQuestions => {
                "Try clearer or longer study material, or a more specific topic."
            }
            GenerationError::UnknownProviderError(_) => "Unexpected provider error. Try again later.",
        }
    }
}
