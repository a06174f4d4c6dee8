// persona: validate character configurations and rehearse lines

mod rig;

use anyhow::Context;
use clap::{Parser, Subcommand};
use persona_core::Emotion;
use persona_lips::{PayloadSpeechSource, SpeechSource, WavDecoder};
use persona_stage::{init_tracing, Performer, PersonaConfig};
use rig::{CatalogClips, LogMixer, LogSink, PacedSpeech, PayloadFile, SilentPlayback};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "persona")]
#[command(about = "Animated character toolkit", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON or TOML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print it with overrides applied
    Check,

    /// Perform a line against logging stand-ins for renderer and audio
    Rehearse {
        /// Text to say
        text: String,

        /// Emotion to deliver it with (angry, happy, neutral, funny)
        #[arg(long, short, default_value = "neutral")]
        emotion: String,

        /// Recorded speech payload (base64 WAV + phoneme timings) to use instead of paced text
        #[arg(long)]
        payload: Option<PathBuf>,

        /// Seconds of idle animation to show after the line
        #[arg(long, default_value = "1.0")]
        linger: f32,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<PersonaConfig> {
    let mut config = match path {
        Some(path) => PersonaConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => PersonaConfig::default(),
    };
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_tracing(&config.log_level, cli.json_logs)?;

    match cli.command {
        Commands::Check => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            info!(
                "Configuration OK: {} clips, lip-sync intensity {}",
                config.animations.len(),
                config.lip_sync.intensity
            );
        }
        Commands::Rehearse {
            text,
            emotion,
            payload,
            linger,
        } => {
            let emotion: Emotion = emotion.parse()?;
            rehearse(&config, &text, emotion, payload, linger).await?;
        }
    }

    Ok(())
}

async fn rehearse(
    config: &PersonaConfig,
    text: &str,
    emotion: Emotion,
    payload: Option<PathBuf>,
    linger: f32,
) -> anyhow::Result<()> {
    let linger = Duration::try_from_secs_f32(linger.max(0.0)).context("Invalid linger duration")?;
    let speech: Arc<dyn SpeechSource> = match payload {
        Some(path) => Arc::new(PayloadSpeechSource::new(Arc::new(PayloadFile(path)), Arc::new(WavDecoder))),
        None => Arc::new(PacedSpeech),
    };

    let performer = Performer::from_config(
        config,
        Arc::new(CatalogClips::default()),
        Arc::new(LogMixer::default()),
        Arc::new(LogSink),
        Arc::new(SilentPlayback),
        speech,
    )
    .await?;

    let body = performer.body().clone();
    let ticker = tokio::spawn(async move {
        let frame = Duration::from_millis(16);
        let mut interval = tokio::time::interval(frame);
        loop {
            interval.tick().await;
            body.update(frame.as_secs_f32());
        }
    });

    info!("Rehearsing ({}): {}", emotion, text);
    let result = performer.perform_line(text, emotion).await;
    tokio::time::sleep(linger).await;

    ticker.abort();
    info!("Final state: {:?}", performer.body().state());
    performer.shutdown();
    result?;
    Ok(())
}
