use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::{Password, theme::ColorfulTheme};
use serde::{Deserialize, Serialize};

use crate::palette::{self, Tone};
use crate::utils::{get_data_dir, strip_controls_and_escapes, trim_line};

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

const AUTH_FILE_NAME: &str = "auth.json";
const GOOGLE_PROVIDER: &str = "google";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    AuthFile,
}

impl ApiKeySource {
    pub fn description(&self) -> &'static str {
        match self {
            ApiKeySource::Environment => "environment variable",
            ApiKeySource::AuthFile => "local auth file",
        }
    }
}

#[derive(Debug, Default)]
pub struct ApiKeyLookup {
    pub api_key: Option<String>,
    pub source: Option<ApiKeySource>,
}

/// Provider name to credential, as stored on disk.
type AuthFile = BTreeMap<String, ProviderAuth>;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProviderAuth {
    key: String,
}

/// JSON file in the data dir holding API keys per provider.
pub struct AuthStore {
    path: PathBuf,
}

impl AuthStore {
    pub fn open_default() -> Result<Self> {
        Ok(Self::at(get_data_dir()?.join(AUTH_FILE_NAME)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn google_key(&self) -> Result<Option<String>> {
        Ok(self
            .load()?
            .get(GOOGLE_PROVIDER)
            .and_then(|entry| trim_line(&entry.key))
            .map(str::to_string))
    }

    pub fn set_google_key(&self, api_key: &str) -> Result<()> {
        let key = trim_line(api_key).context("Cannot store an empty API key")?;
        let mut auth = self.load()?;
        auth.insert(
            GOOGLE_PROVIDER.to_string(),
            ProviderAuth {
                key: key.to_string(),
            },
        );
        self.save(&auth)
    }

    /// Returns whether a key was removed. The file goes away with its last key.
    pub fn clear_google_key(&self) -> Result<bool> {
        let mut auth = self.load()?;
        if auth.remove(GOOGLE_PROVIDER).is_none() {
            return Ok(false);
        }
        if auth.is_empty() {
            fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove empty auth file at {}", self.path.display())
            })?;
        } else {
            self.save(&auth)?;
        }
        Ok(true)
    }

    fn load(&self) -> Result<AuthFile> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(AuthFile::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read auth file at {}", self.path.display())
                });
            }
        };
        if contents.trim().is_empty() {
            return Ok(AuthFile::new());
        }
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse auth file at {}", self.path.display()))
    }

    fn save(&self, auth: &AuthFile) -> Result<()> {
        let mut contents = serde_json::to_string_pretty(auth)?;
        contents.push('\n');
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write auth file at {}", self.path.display()))
    }
}

pub fn prompt_for_api_key() -> Result<String> {
    println!(
        "{} (https://aistudio.google.com/app/apikey). It's stored locally for future use.",
        palette::paint(Tone::Success, "Enter your Google API key")
    );
    let raw_password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API Key")
        .interact()
        .context("Failed to read API key")?;

    Ok(strip_controls_and_escapes(&raw_password))
}

pub fn store_api_key(api_key: &str) -> Result<()> {
    AuthStore::open_default()?.set_google_key(api_key)
}

pub fn clear_api_key() -> Result<bool> {
    AuthStore::open_default()?.clear_google_key()
}

/// Environment (including `.env`) first, then the local auth file.
pub fn get_api_key_from_sources() -> Result<ApiKeyLookup> {
    lookup_api_key(env::var(API_KEY_ENV).ok(), &AuthStore::open_default()?)
}

fn lookup_api_key(env_value: Option<String>, store: &AuthStore) -> Result<ApiKeyLookup> {
    if let Some(key) = env_value.as_deref().and_then(trim_line) {
        return Ok(ApiKeyLookup {
            api_key: Some(key.to_string()),
            source: Some(ApiKeySource::Environment),
        });
    }

    Ok(match store.google_key()? {
        Some(key) => ApiKeyLookup {
            api_key: Some(key),
            source: Some(ApiKeySource::AuthFile),
        },
        None => ApiKeyLookup::default(),
    })
}
