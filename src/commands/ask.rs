use anyhow::{Result, bail};

use crate::assistant::{
    Assistant, AudioState, LearningRequest, Outcome, RenderedResult, WORKING_MESSAGE,
};
use crate::llm::ModelClient;
use crate::palette::{self, Tone};
use crate::speech::{Speed, SpeechSynthesizer};

/// Runs one request and prints the result; `speak` opens the audio afterwards.
pub async fn run<M, S>(
    assistant: &Assistant<M, S>,
    request: LearningRequest,
    speed: Speed,
    speak: bool,
) -> Result<()>
where
    M: ModelClient,
    S: SpeechSynthesizer,
{
    eprintln!("{}", palette::dim(WORKING_MESSAGE));
    match assistant.process(&request, speed).await {
        Outcome::Rejected(message) => bail!(message),
        Outcome::Failed(message) => bail!(message),
        Outcome::Rendered(result) => {
            println!("{}", format_result(&result));
            if speak && let AudioState::Ready(artifact) = &result.audio {
                open::that(&artifact.path)?;
            }
            Ok(())
        }
    }
}

fn format_result(result: &RenderedResult) -> String {
    let mut out = format!("{}\n\n", palette::paint(Tone::Accent, result.title));
    if result.section_found {
        out.push_str(&result.body);
    } else {
        out.push_str(&palette::paint(Tone::Warning, &result.body));
    }

    match &result.audio {
        AudioState::NotRequested => {}
        AudioState::Ready(artifact) => {
            out.push_str(&format!(
                "\n\n{} {}",
                palette::paint(Tone::Success, format!("🔊 Audio ({})", artifact.speed)),
                artifact.path.display()
            ));
        }
        AudioState::Unavailable(message) => {
            out.push_str(&format!(
                "\n\n{}",
                palette::paint(Tone::Warning, format!("🔇 {message}"))
            ));
        }
    }
    out
}
