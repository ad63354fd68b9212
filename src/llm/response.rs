use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::responses::{
        CreateResponseArgs, InputMessage, InputRole, OutputItem, OutputMessageContent,
    },
};
use tracing::debug;

use crate::error::{GenerationError, GenerationResult};

const MAX_OUTPUT_TOKENS: u32 = 5000;

/// Sends `prompt` as the only message and returns the first non-blank text
/// output.
pub async fn request_single_text_response(
    client: &Client<OpenAIConfig>,
    model: &str,
    prompt: &str,
) -> GenerationResult<String> {
    let request = CreateResponseArgs::default()
        .model(model)
        .max_output_tokens(MAX_OUTPUT_TOKENS)
        .input(vec![InputMessage {
            role: InputRole::User,
            content: vec![prompt.into()],
            status: None,
        }])
        .build()
        .map_err(classify_openai_error)?;

    let response = client
        .responses()
        .create(request)
        .await
        .map_err(classify_openai_error)?;

    for item in response.output {
        if let OutputItem::Message(message) = item {
            for content in message.content {
                if let OutputMessageContent::OutputText(text) = content {
                    let trimmed = text.text.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Ok(trimmed.to_string());
                }
            }
        }
    }

    Err(GenerationError::EmptyResponse)
}

pub fn classify_openai_error(err: OpenAIError) -> GenerationError {
    let classified = match &err {
        OpenAIError::ApiError(api) => {
            classify_api_error(api.code.as_deref(), api.r#type.as_deref(), &api.message)
        }
        OpenAIError::Reqwest(transport) if transport.is_timeout() || transport.is_connect() => {
            GenerationError::Unreachable(transport.to_string())
        }
        other => GenerationError::UnknownProviderError(other.to_string()),
    };
    debug!(error = %err, kind = ?classified, "classified provider error");
    classified
}

pub fn classify_api_error(code: Option<&str>, kind: Option<&str>, message: &str) -> GenerationError {
    let tags = [code, kind];
    let has_tag = |wanted: &[&str]| {
        tags.iter()
            .flatten()
            .any(|tag| wanted.iter().any(|w| tag.eq_ignore_ascii_case(w)))
    };

    if has_tag(&["invalid_api_key", "missing_api_key", "invalid_authentication", "authentication_error"])
        || message.to_ascii_lowercase().contains("incorrect api key")
    {
        return GenerationError::InvalidCredential(message.to_string());
    }

    if has_tag(&["rate_limit_exceeded", "insufficient_quota", "requests", "tokens"]) {
        return GenerationError::RateLimited;
    }

    GenerationError::UnknownProviderError(message.to_string())
}
