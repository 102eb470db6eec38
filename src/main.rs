use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::info;

use voxlate::adapters::{
    CpalUtteranceCapture, DeepgramRecognizer, GtxTranslator, JsonHistoryStore, TomlConfigStore,
};
use voxlate::app::{SessionController, SessionSettings};
use voxlate::domain::{SessionEvent, SessionState};
use voxlate::infrastructure::init_logging;
use voxlate::ports::ConfigStore;

/// Speak, recognize, translate.
#[derive(Parser, Debug)]
#[command(name = "voxlate", version, about)]
struct Cli {
    /// Override the application data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the translation target language (ISO 639-1 code).
    #[arg(long)]
    target_language: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = match cli.data_dir {
        Some(dir) => TomlConfigStore::with_data_dir(dir),
        None => TomlConfigStore::new(),
    }
    .context("Failed to initialize config store")?;

    let mut config = store.load().context("Failed to load configuration")?;
    if let Some(language) = cli.target_language {
        config.translation.target_language = language;
    }

    let _log_guard = init_logging(
        &store.logs_dir(),
        &config.logging.level,
        config.logging.file_logging,
    )
    .context("Failed to initialize logging")?;

    info!("Voxlate starting up");

    let data_dir = store.data_dir();
    let controller = Arc::new(SessionController::new(
        SessionSettings::from_config(&config, &data_dir),
        Arc::new(CpalUtteranceCapture::new(
            config.audio.clone(),
            config.spool_path(&data_dir),
        )),
        Arc::new(DeepgramRecognizer::new(&config.recognition)?),
        Arc::new(GtxTranslator::new(&config.translation)?),
        Arc::new(JsonHistoryStore::new()),
    ));

    let mut events = controller.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = render_event(&event) {
                        println!("{line}");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    println!("Press Enter on `:listen` and start speaking.");
    println!("Commands: :listen  :save  :load  :quit  (any other line is translated directly)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            ":listen" => {
                controller.start_listening();
            }
            ":save" => controller.save_history(),
            ":load" => controller.load_history(),
            ":quit" => break,
            text => controller.translate_manual(text).await,
        }
    }

    info!("Voxlate shutting down");
    Ok(())
}

fn render_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::StateChanged {
            state: SessionState::Idle,
        } => None,
        SessionEvent::StateChanged { state } => Some(state.status_line()),
        SessionEvent::HistorySaved { entries, .. } => {
            Some(format!("History saved successfully ({entries} entries)"))
        }
        SessionEvent::HistoryLoaded { entries, .. } => {
            Some(format!("History loaded successfully ({entries} entries)"))
        }
    }
}
