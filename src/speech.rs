use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_TTS_URL: &str = "https://translate.google.com/translate_tts";
pub const TTS_LANGUAGE: &str = "en";

/// The TTS endpoint rejects long `q` values, so text is sent in pieces.
const MAX_CHUNK_CHARS: usize = 100;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum Speed {
    #[default]
    Normal,
    Slow,
}

impl Speed {
    pub fn is_slow(self) -> bool {
        self == Speed::Slow
    }

    pub fn toggle(self) -> Self {
        match self {
            Speed::Normal => Speed::Slow,
            Speed::Slow => Speed::Normal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Speed::Normal => "Normal",
            Speed::Slow => "Slow",
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub speed: Speed,
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("nothing to pronounce")]
    EmptyText,

    #[error("speech request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid speech service URL: {0}")]
    Url(String),

    #[error("failed to write audio file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, speed: Speed) -> Result<AudioArtifact, SpeechError>;
}

/// Strips markdown leftovers and squashes whitespace so the text reads cleanly aloud.
pub fn clean_speech_text(text: &str) -> String {
    let without_markup: String = text.chars().filter(|c| *c != '*' && *c != '#').collect();
    WHITESPACE_RE
        .replace_all(&without_markup, " ")
        .trim()
        .to_string()
}

/// Splits on word boundaries into pieces of at most `max_chars` characters.
/// A single word longer than the limit is cut mid-word.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let split_at = word
                .char_indices()
                .nth(max_chars)
                .map(|(idx, _)| idx)
                .unwrap_or(word.len());
            chunks.push(word[..split_at].to_string());
            word = &word[split_at..];
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Directory holding synthesized audio.
///
/// Files are keyed by speed and text, so a repeated request overwrites its own
/// earlier file. A session store lives in a fresh temp directory that is
/// deleted when the store is dropped, so concurrent sessions never share a
/// path. A persistent store writes into a fixed directory that outlives the
/// process, for one-shot commands whose audio is played after they exit.
pub struct AudioStore {
    dir: StoreDir,
}

enum StoreDir {
    Session(TempDir),
    Persistent(PathBuf),
}

impl AudioStore {
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("tutor-audio-").tempdir()?;
        Ok(Self {
            dir: StoreDir::Session(dir),
        })
    }

    pub fn persistent(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir: StoreDir::Persistent(dir),
        })
    }

    pub fn dir(&self) -> &Path {
        match &self.dir {
            StoreDir::Session(dir) => dir.path(),
            StoreDir::Persistent(dir) => dir,
        }
    }

    pub fn path_for(&self, text: &str, speed: Speed) -> PathBuf {
        let mut hasher = blake3::Hasher::new();
        hasher.update(speed.label().as_bytes());
        hasher.update(&[0]);
        hasher.update(text.as_bytes());
        let hash = hasher.finalize().to_hex();
        self.dir()
            .join(format!("pronunciation-{}.mp3", &hash.as_str()[..16]))
    }

    pub fn save(
        &self,
        text: &str,
        speed: Speed,
        audio: &[u8],
    ) -> Result<AudioArtifact, SpeechError> {
        let path = self.path_for(text, speed);
        fs::write(&path, audio).map_err(|source| SpeechError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(AudioArtifact { path, speed })
    }
}

pub struct GoogleTts {
    client: reqwest::Client,
    endpoint: String,
    store: AudioStore,
}

impl GoogleTts {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        store: AudioStore,
    ) -> Result<Self, SpeechError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            store,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, speed: Speed) -> Result<AudioArtifact, SpeechError> {
        let cleaned = clean_speech_text(text);
        if cleaned.is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let chunks = split_into_chunks(&cleaned, MAX_CHUNK_CHARS);
        debug!(chunks = chunks.len(), %speed, "synthesizing speech");

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let url = chunk_url(&self.endpoint, chunk, speed, idx, chunks.len())?;
            let bytes = self
                .client
                .get(url)
                .header("User-Agent", USER_AGENT)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?;
            audio.extend_from_slice(&bytes);
        }

        let artifact = self.store.save(&cleaned, speed, &audio)?;
        info!(path = %artifact.path.display(), bytes = audio.len(), "audio saved");
        Ok(artifact)
    }
}

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

fn chunk_url(
    endpoint: &str,
    chunk: &str,
    speed: Speed,
    idx: usize,
    total: usize,
) -> Result<Url, SpeechError> {
    let ttsspeed = if speed.is_slow() { "0.3" } else { "1" };
    let total = total.to_string();
    let idx = idx.to_string();
    let textlen = chunk.chars().count().to_string();
    let url = Url::parse_with_params(
        endpoint,
        &[
            ("ie", "UTF-8"),
            ("client", "tw-ob"),
            ("tl", TTS_LANGUAGE),
            ("q", chunk),
            ("ttsspeed", ttsspeed),
            ("total", total.as_str()),
            ("idx", idx.as_str()),
            ("textlen", textlen.as_str()),
        ],
    )
    .map_err(|err| SpeechError::Url(err.to_string()))?;
    Ok(url)
}
