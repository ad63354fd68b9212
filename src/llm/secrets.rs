use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use dialoguer::{Password, theme::ColorfulTheme};
use serde::{Deserialize, Serialize};

use crate::palette::Palette;
use crate::question::Credential;
use crate::utils::{get_data_dir, strip_controls_and_escapes, trim_line};

pub const API_KEY_ENV: &str = "QUIZGEN_OPENAI_API_KEY";

const AUTH_FILE_NAME: &str = "auth.json";
const OPENAI_PROVIDER: &str = "openai";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    AuthFile,
    Prompt,
}

impl ApiKeySource {
    pub fn description(&self) -> &'static str {
        match self {
            ApiKeySource::Environment => "environment variable",
            ApiKeySource::AuthFile => "local auth file",
            ApiKeySource::Prompt => "interactive prompt",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct AuthFile {
    #[serde(flatten)]
    providers: HashMap<String, ProviderAuth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProviderAuth {
    key: String,
}

#[derive(Debug)]
pub struct ApiKeyLookup {
    pub credential: Option<Credential>,
    pub source: Option<ApiKeySource>,
}

#[cfg(test)]
const TEST_AUTH_PATH_ENV: &str = "QUIZGEN_TEST_AUTH_PATH";

/// Environment first, then the auth file, then (if allowed) an interactive
/// prompt whose answer is stored for next time.
pub fn resolve_credential(allow_prompt: bool) -> Result<(Credential, ApiKeySource)> {
    let lookup = get_api_key_from_sources()?;
    if let (Some(credential), Some(source)) = (lookup.credential, lookup.source) {
        return Ok((credential, source));
    }

    if !allow_prompt {
        bail!(
            "No API key configured. Set {} or run `quizgen key --set <KEY>`.",
            API_KEY_ENV
        );
    }

    let api_key = prompt_for_api_key()?;
    if api_key.is_empty() {
        bail!(
            "No API key provided. Set {} or run `quizgen key --set <KEY>`.",
            API_KEY_ENV
        );
    }
    store_api_key(&api_key)?;
    Ok((Credential::new(api_key), ApiKeySource::Prompt))
}

pub fn clear_api_key() -> Result<bool> {
    let auth_path = auth_file_path()?;
    let Some(mut auth) = read_auth_file(&auth_path)? else {
        return Ok(false);
    };

    if auth.providers.remove(OPENAI_PROVIDER).is_none() {
        return Ok(false);
    }

    if auth.providers.is_empty() {
        fs::remove_file(&auth_path).with_context(|| {
            format!(
                "Failed to remove empty auth file at {}",
                auth_path.display()
            )
        })?;
        return Ok(true);
    }

    write_auth_file(&auth_path, &auth)?;
    Ok(true)
}

fn prompt_for_api_key() -> Result<String> {
    println!(
        "{} (https://platform.openai.com/account/api-keys) to generate questions. It's stored locally for future use.",
        Palette::paint(Palette::SUCCESS, "Enter your OpenAI API key")
    );
    let raw_password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API Key")
        .allow_empty_password(true)
        .interact()?;

    let password = strip_controls_and_escapes(&raw_password);
    Ok(password.trim().to_string())
}

pub fn store_api_key(api_key: &str) -> Result<()> {
    let trimmed = trim_line(api_key).with_context(|| "Cannot store an empty API key")?;

    let auth_path = auth_file_path()?;
    let mut auth = read_auth_file(&auth_path)?.unwrap_or_default();

    auth.providers.insert(
        OPENAI_PROVIDER.to_string(),
        ProviderAuth {
            key: trimmed.to_string(),
        },
    );

    write_auth_file(&auth_path, &auth)
}

pub fn get_api_key_from_sources() -> Result<ApiKeyLookup> {
    if let Ok(value) = env::var(API_KEY_ENV)
        && let Some(key) = trim_line(&value)
    {
        return Ok(ApiKeyLookup {
            credential: Some(Credential::new(key)),
            source: Some(ApiKeySource::Environment),
        });
    }

    let auth_path = auth_file_path()?;
    let key = read_auth_file(&auth_path)?.and_then(|auth| {
        auth.providers
            .get(OPENAI_PROVIDER)
            .and_then(|entry| trim_line(&entry.key))
            .map(str::to_string)
    });

    Ok(match key {
        Some(key) => ApiKeyLookup {
            credential: Some(Credential::new(key)),
            source: Some(ApiKeySource::AuthFile),
        },
        None => ApiKeyLookup {
            credential: None,
            source: None,
        },
    })
}

fn auth_file_path() -> Result<PathBuf> {
    #[cfg(test)]
    {
        if let Ok(path) = env::var(TEST_AUTH_PATH_ENV)
            && !path.trim().is_empty()
        {
            return Ok(PathBuf::from(path));
        }
    }

    let data_dir = get_data_dir()?;
    Ok(data_dir.join(AUTH_FILE_NAME))
}

fn read_auth_file(path: &Path) -> Result<Option<AuthFile>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(parse_auth_contents(&contents, path)?),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to read auth file at {}", path.display()))
        }
    }
}

fn write_auth_file(path: &Path, value: &AuthFile) -> Result<()> {
    let contents = serialize_auth(value)?;
    fs::write(path, contents)
        .with_context(|| format!("Failed to write auth file at {}", path.display()))?;
    Ok(())
}

fn parse_auth_contents(contents: &str, path: &Path) -> Result<Option<AuthFile>> {
    if contents.trim().is_empty() {
        return Ok(Some(AuthFile::default()));
    }

    let parsed: AuthFile = serde_json::from_str(contents)
        .with_context(|| format!("Failed to parse auth file at {}", path.display()))?;
    Ok(Some(parsed))
}

fn serialize_auth(value: &AuthFile) -> Result<String> {
    let contents = serde_json::to_string_pretty(value)?;
    Ok(format!("{}\n", contents))
}
