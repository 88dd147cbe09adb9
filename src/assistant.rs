use tracing::{info, warn};

use crate::function::LearningFunction;
use crate::llm::{ModelClient, ModelReply, build_prompt};
use crate::section::{SECTION_NOT_FOUND, extract_section};
use crate::speech::{AudioArtifact, Speed, SpeechSynthesizer};

pub const EMPTY_TEXT_WARNING: &str = "Please enter some text to analyze.";
/// Shown while a model call is in flight.
pub const WORKING_MESSAGE: &str = "🧠 AI is working its magic...";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LearningRequest {
    pub text: String,
    pub function: LearningFunction,
}

impl LearningRequest {
    pub fn new(text: impl Into<String>, function: LearningFunction) -> Self {
        Self {
            text: text.into(),
            function,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioState {
    NotRequested,
    Ready(AudioArtifact),
    Unavailable(String),
}

/// Everything the shell needs to draw one result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedResult {
    pub function: LearningFunction,
    pub title: &'static str,
    pub body: String,
    pub section_found: bool,
    pub raw_reply: String,
    pub audio: AudioState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Input was refused before any service call.
    Rejected(String),
    /// The model call failed; this request is abandoned.
    Failed(String),
    Rendered(RenderedResult),
}

/// Maps a reply for `request` to render instructions. No I/O.
pub fn render(request: &LearningRequest, reply: &ModelReply, audio: AudioState) -> RenderedResult {
    let section = extract_section(&reply.raw_text, request.function.label());
    let section_found = section.is_some();
    let body = section
        .map(|section| section.body)
        .unwrap_or_else(|| SECTION_NOT_FOUND.to_string());

    RenderedResult {
        function: request.function,
        title: request.function.title(),
        body,
        section_found,
        raw_reply: reply.raw_text.clone(),
        audio,
    }
}

/// Runs learning requests one at a time against the model and speech services.
pub struct Assistant<M, S> {
    model: M,
    speech: S,
}

impl<M: ModelClient, S: SpeechSynthesizer> Assistant<M, S> {
    pub fn new(model: M, speech: S) -> Self {
        Self { model, speech }
    }

    pub async fn process(&self, request: &LearningRequest, speed: Speed) -> Outcome {
        if request.text.trim().is_empty() {
            return Outcome::Rejected(EMPTY_TEXT_WARNING.to_string());
        }

        let prompt = build_prompt(&request.text, Some(request.function));
        let reply = match self.model.complete(&prompt).await {
            Ok(reply) => reply,
            Err(err) => return Outcome::Failed(format!("The AI request failed: {err}")),
        };

        let mut result = render(request, &reply, AudioState::NotRequested);
        info!(
            function = %request.function,
            found = result.section_found,
            "rendered reply"
        );

        if request.function.is_pronunciation() {
            result.audio = self.audio_for(&result, speed).await;
        }
        Outcome::Rendered(result)
    }

    /// Synthesizes audio again for an existing result, e.g. after a speed change.
    pub async fn resynthesize(&self, result: &mut RenderedResult, speed: Speed) {
        if result.function.is_pronunciation() {
            result.audio = self.audio_for(result, speed).await;
        }
    }

    async fn audio_for(&self, result: &RenderedResult, speed: Speed) -> AudioState {
        if !result.section_found {
            return AudioState::Unavailable("No audio available: no section to pronounce.".into());
        }
        match self.speech.synthesize(&result.body, speed).await {
            Ok(artifact) => AudioState::Ready(artifact),
            Err(err) => {
                warn!(error = %err, "speech synthesis failed");
                AudioState::Unavailable(format!("Failed to generate audio: {err}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::llm::LlmError;
    use crate::speech::SpeechError;

    struct CannedModel {
        reply: Option<&'static str>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn replying(reply: &'static str) -> Self {
            Self {
                reply: Some(reply),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ModelClient for CannedModel {
        async fn complete(&self, prompt: &str) -> Result<ModelReply, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.reply {
                Some(text) => Ok(ModelReply {
                    raw_text: text.to_string(),
                }),
                None => Err(LlmError::EmptyResponse),
            }
        }
    }

    struct FakeSpeech {
        fail: bool,
        spoken: Mutex<Vec<(String, Speed)>>,
    }

    impl FakeSpeech {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                spoken: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSpeech {
        async fn synthesize(&self, text: &str, speed: Speed) -> Result<AudioArtifact, SpeechError> {
            self.spoken.lock().unwrap().push((text.to_string(), speed));
            if self.fail {
                return Err(SpeechError::EmptyText);
            }
            Ok(AudioArtifact {
                path: PathBuf::from("audio.mp3"),
                speed,
            })
        }
    }

    const DEFINITION_REPLY: &str =
        "### Definition\na positive quality\n### Synonyms\nfine, nice\n";

    const PRONUNCIATION_REPLY: &str =
        "### 2. *Pronunciation Guide*:\n**good** is said *guhd*\n### Response Formatting:\n";

    fn rendered(outcome: Outcome) -> RenderedResult {
        match outcome {
            Outcome::Rendered(result) => result,
            other => panic!("expected rendered outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn definition_scenario_renders_section_body() {
        let assistant = Assistant::new(
            CannedModel::replying(DEFINITION_REPLY),
            FakeSpeech::new(false),
        );
        let request = LearningRequest::new("good", LearningFunction::Definition);

        let result = rendered(assistant.process(&request, Speed::Normal).await);
        assert_eq!(result.body, "a positive quality");
        assert!(result.section_found);
        assert_eq!(result.title, "📚 Definition");
        assert_eq!(result.audio, AudioState::NotRequested);

        let prompts = assistant.model.prompts.lock().unwrap();
        assert!(prompts[0].contains("\"good\""));
        assert!(prompts[0].contains("selected function: Definition."));
    }

    #[tokio::test]
    async fn blank_text_never_reaches_the_model() {
        let assistant = Assistant::new(
            CannedModel::replying(DEFINITION_REPLY),
            FakeSpeech::new(false),
        );
        let request = LearningRequest::new("  \n ", LearningFunction::Translation);

        let outcome = assistant.process(&request, Speed::Normal).await;
        assert_eq!(outcome, Outcome::Rejected(EMPTY_TEXT_WARNING.to_string()));
        assert_eq!(assistant.model.calls(), 0);
    }

    #[tokio::test]
    async fn model_failure_is_reported_not_raised() {
        let assistant = Assistant::new(CannedModel::failing(), FakeSpeech::new(false));
        let request = LearningRequest::new("good", LearningFunction::Translation);

        match assistant.process(&request, Speed::Normal).await {
            Outcome::Failed(message) => assert!(message.contains("empty response")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_section_renders_sentinel() {
        let assistant = Assistant::new(
            CannedModel::replying(DEFINITION_REPLY),
            FakeSpeech::new(false),
        );
        let request = LearningRequest::new("good", LearningFunction::Corrections);

        let result = rendered(assistant.process(&request, Speed::Normal).await);
        assert_eq!(result.body, SECTION_NOT_FOUND);
        assert!(!result.section_found);
        assert_eq!(result.raw_reply, DEFINITION_REPLY);
    }

    #[tokio::test]
    async fn pronunciation_synthesizes_the_section_at_chosen_speed() {
        let assistant = Assistant::new(
            CannedModel::replying(PRONUNCIATION_REPLY),
            FakeSpeech::new(false),
        );
        let request = LearningRequest::new("good", LearningFunction::PronunciationGuide);

        let result = rendered(assistant.process(&request, Speed::Slow).await);
        assert_eq!(
            result.audio,
            AudioState::Ready(AudioArtifact {
                path: PathBuf::from("audio.mp3"),
                speed: Speed::Slow,
            })
        );
        let spoken = assistant.speech.spoken.lock().unwrap();
        assert_eq!(
            spoken[0],
            ("**good** is said *guhd*".to_string(), Speed::Slow)
        );
    }

    #[tokio::test]
    async fn speech_failure_keeps_the_text() {
        let assistant = Assistant::new(
            CannedModel::replying(PRONUNCIATION_REPLY),
            FakeSpeech::new(true),
        );
        let request = LearningRequest::new("good", LearningFunction::PronunciationGuide);

        let result = rendered(assistant.process(&request, Speed::Normal).await);
        assert_eq!(result.body, "**good** is said *guhd*");
        assert!(matches!(
            result.audio,
            AudioState::Unavailable(ref message) if message.starts_with("Failed to generate audio")
        ));
    }

    #[tokio::test]
    async fn resynthesize_switches_speed_without_calling_the_model() {
        let assistant = Assistant::new(
            CannedModel::replying(PRONUNCIATION_REPLY),
            FakeSpeech::new(false),
        );
        let request = LearningRequest::new("good", LearningFunction::PronunciationGuide);
        let mut result = rendered(assistant.process(&request, Speed::Normal).await);

        assistant.resynthesize(&mut result, Speed::Slow).await;
        assert!(matches!(
            result.audio,
            AudioState::Ready(AudioArtifact { speed: Speed::Slow, .. })
        ));
        assert_eq!(assistant.model.calls(), 1);
    }

    #[tokio::test]
    async fn no_audio_when_section_is_missing() {
        let assistant = Assistant::new(
            CannedModel::replying(DEFINITION_REPLY),
            FakeSpeech::new(false),
        );
        let request = LearningRequest::new("good", LearningFunction::PronunciationGuide);

        let result = rendered(assistant.process(&request, Speed::Normal).await);
        assert!(matches!(result.audio, AudioState::Unavailable(_)));
        assert!(assistant.speech.spoken.lock().unwrap().is_empty());
    }

    #[test]
    fn render_is_pure() {
        let request = LearningRequest::new("good", LearningFunction::Definition);
        let reply = ModelReply {
            raw_text: DEFINITION_REPLY.to_string(),
        };
        assert_eq!(
            render(&request, &reply, AudioState::NotRequested),
            render(&request, &reply, AudioState::NotRequested)
        );
    }
}
