use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use tutor::assistant::{Assistant, LearningRequest};
use tutor::commands::{ask, learn};
use tutor::config::Settings;
use tutor::function::LearningFunction;
use tutor::llm::{self, GeminiClient};
use tutor::logging::init_tracing;
use tutor::speech::{AudioStore, GoogleTts, Speed};
use tutor::utils::get_data_dir;

#[derive(Parser, Debug)]
#[command(
    name = "tutor",
    version,
    about = "An English learning assistant for the terminal.",
    long_about = None,
    propagate_version = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(flatten)]
    settings: Settings,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive assistant (default)
    Learn,
    /// Run one request and print the result
    Ask {
        /// Learning function to apply
        #[arg(long, short, value_enum, default_value_t = LearningFunction::default())]
        function: LearningFunction,
        /// Speech speed for the pronunciation guide
        #[arg(long, value_enum, default_value_t = Speed::default())]
        speed: Speed,
        /// Open the synthesized audio when the result has any
        #[arg(long, default_value_t = false)]
        speak: bool,
        /// English word, sentence, or paragraph
        #[arg(value_name = "TEXT", required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Manage the Google API key
    Llm {
        /// Store an API key in the local auth file. Prompts when no key is given
        #[arg(long, value_name = "KEY", num_args = 0..=1, conflicts_with = "clear")]
        set: Option<Option<String>>,
        /// Remove the stored API key from the local auth file
        #[arg(long, conflicts_with = "test")]
        clear: bool,
        /// Verify the configured API key by listing models
        #[arg(long, conflicts_with = "clear")]
        test: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    cli.settings.validate()?;

    let data_dir = get_data_dir()?;
    let _log_guard = init_tracing(&data_dir)?;
    info!(model = %cli.settings.model, "starting tutor");

    match cli.command.unwrap_or(Command::Learn) {
        Command::Learn => {
            let store = AudioStore::new().context("Failed to create the audio directory")?;
            let assistant = build_assistant(&cli.settings, store)?;
            learn::run(assistant).await?;
        }
        Command::Ask {
            function,
            speed,
            speak,
            text,
        } => {
            // The printed audio path has to outlive this process.
            let audio_dir = data_dir.join("audio");
            let store = AudioStore::persistent(&audio_dir).with_context(|| {
                format!("Failed to create the audio directory {}", audio_dir.display())
            })?;
            let assistant = build_assistant(&cli.settings, store)?;
            let request = LearningRequest::new(text.join(" "), function);
            ask::run(&assistant, request, speed, speak).await?;
        }
        Command::Llm { set, clear, test } => {
            handle_llm_command(&cli.settings, set, clear, test).await?
        }
    }

    Ok(())
}

/// Fails before any UI is drawn when the credential is missing.
fn build_assistant(
    settings: &Settings,
    store: AudioStore,
) -> Result<Assistant<GeminiClient, GoogleTts>> {
    let api_key = llm::require_api_key()?;
    let model = GeminiClient::new(&api_key, settings);
    let speech = GoogleTts::new(settings.tts_url.clone(), settings.tts_timeout(), store)
        .context("Failed to build the speech client")?;
    Ok(Assistant::new(model, speech))
}

async fn handle_llm_command(
    settings: &Settings,
    set: Option<Option<String>>,
    clear: bool,
    test: bool,
) -> Result<()> {
    let mut action_taken = false;

    if let Some(key) = set {
        let key = match key {
            Some(key) => key,
            None => llm::prompt_for_api_key()?,
        };
        llm::store_api_key(&key)?;
        println!("Stored Google API key in the local auth file.");
        action_taken = true;
    }

    if clear {
        let removed = llm::clear_api_key()?;
        if removed {
            println!("Removed the stored Google API key.");
        } else {
            println!("No Google API key found in the auth file.");
        }
        action_taken = true;
    }

    if test {
        let source = llm::test_configured_api_key(settings).await?;
        println!("Google API key from the {} is valid.", source.description());
        action_taken = true;
    }

    if !action_taken {
        bail!("No action provided. Use --set, --clear, or --test.");
    }
    Ok(())
}
