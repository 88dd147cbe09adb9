use std::time::Duration;

use anyhow::{Result, bail};
use clap::Args;

use crate::speech::DEFAULT_TTS_URL;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Service settings shared by every command. Flags fall back to environment variables.
#[derive(Args, Clone, Debug, PartialEq)]
pub struct Settings {
    /// Model name sent to the generative-text service
    #[arg(long, global = true, env = "TUTOR_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,
    /// Sampling temperature for the model
    #[arg(long, global = true, env = "TUTOR_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,
    /// Base URL of the OpenAI-compatible model endpoint
    #[arg(long, global = true, env = "TUTOR_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
    /// Text-to-speech endpoint
    #[arg(long, global = true, env = "TUTOR_TTS_URL", default_value = DEFAULT_TTS_URL)]
    pub tts_url: String,
    /// Timeout for each text-to-speech request, in seconds
    #[arg(long, global = true, env = "TUTOR_TTS_TIMEOUT_SECS", default_value_t = 30)]
    pub tts_timeout_secs: u64,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            bail!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            );
        }
        if self.model.trim().is_empty() {
            bail!("Model name cannot be empty");
        }
        if self.tts_timeout_secs == 0 {
            bail!("TTS timeout must be at least one second");
        }
        Ok(())
    }

    pub fn tts_timeout(&self) -> Duration {
        Duration::from_secs(self.tts_timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_string(),
            tts_url: DEFAULT_TTS_URL.to_string(),
            tts_timeout_secs: 30,
        }
    }
}
