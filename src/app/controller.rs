use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::domain::{
    AppConfig, DomainError, HistoryEntry, HistoryLog, SessionEvent, SessionState,
};
use crate::ports::{AudioCapture, HistoryStore, SpeechRecognizer, Translator};

/// Settings the controller needs from the application configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Bounded wait for speech to start.
    pub listen_timeout: Duration,
    /// Target language for every translation (ISO 639-1 code).
    pub target_language: String,
    /// Where history is saved and loaded.
    pub history_path: PathBuf,
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig, data_dir: &Path) -> Self {
        Self {
            listen_timeout: Duration::from_secs(config.audio.listen_timeout_secs),
            target_language: config.translation.target_language.clone(),
            history_path: config.history_path(data_dir),
        }
    }
}

/// Orchestrates the capture -> recognize -> translate -> record pipeline.
///
/// The controller owns the session state and the history log. Failures at
/// any stage become an `Error` state with a user-visible message; nothing
/// propagates past this type. The UI layer observes progress through the
/// broadcast channel.
pub struct SessionController {
    settings: SessionSettings,
    state: RwLock<SessionState>,
    history: RwLock<HistoryLog>,
    listening: Arc<AtomicBool>,
    events: broadcast::Sender<SessionEvent>,
    audio: Arc<dyn AudioCapture>,
    recognizer: Arc<dyn SpeechRecognizer>,
    translator: Arc<dyn Translator>,
    store: Arc<dyn HistoryStore>,
}

impl SessionController {
    pub fn new(
        settings: SessionSettings,
        audio: Arc<dyn AudioCapture>,
        recognizer: Arc<dyn SpeechRecognizer>,
        translator: Arc<dyn Translator>,
        store: Arc<dyn HistoryStore>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            settings,
            state: RwLock::new(SessionState::Idle),
            history: RwLock::new(HistoryLog::new()),
            listening: Arc::new(AtomicBool::new(false)),
            events,
            audio,
            recognizer,
            translator,
            store,
        }
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Snapshot of the history log.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.read().entries().to_vec()
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Acquire)
    }

    /// Dispatch one listen operation as a deferred task.
    ///
    /// Returns false without side effects when a listen is already in
    /// flight; pressing the control twice never starts two captures. The
    /// listening flag is cleared on every exit of the task via the scoped
    /// guard.
    pub fn start_listening(self: &Arc<Self>) -> bool {
        let Some(guard) = ListeningGuard::acquire(Arc::clone(&self.listening)) else {
            debug!("Listen request ignored: already listening");
            return false;
        };

        self.set_state(SessionState::Listening);

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = controller.listen_once(guard).await {
                controller.fail(&err);
            }
        });
        true
    }

    /// The capture -> transcribe -> translate -> record sequence.
    ///
    /// Runs sequentially inside the dispatched task. The captured sample,
    /// and with it the spooled WAV file, is dropped on every path out; the
    /// guard travels through the pipeline so the listening flag is cleared
    /// before the terminal state is announced.
    async fn listen_once(&self, guard: ListeningGuard) -> Result<(), DomainError> {
        let sample = self.audio.capture(self.settings.listen_timeout).await?;
        let recognized = self.recognizer.transcribe(&sample).await?;
        drop(sample);

        self.set_state(SessionState::Recognized {
            source: recognized.text.clone(),
        });

        self.finish_translation(recognized.text, Some(guard)).await
    }

    /// Translate a manually submitted line and record it.
    ///
    /// Follows the same translate -> record tail as a listened utterance;
    /// failures surface as the `Error` state rather than a return value.
    pub async fn translate_manual(&self, text: &str) {
        self.set_state(SessionState::Recognized {
            source: text.to_string(),
        });
        if let Err(err) = self.finish_translation(text.to_string(), None).await {
            self.fail(&err);
        }
    }

    async fn finish_translation(
        &self,
        source: String,
        guard: Option<ListeningGuard>,
    ) -> Result<(), DomainError> {
        let translated = self
            .translator
            .translate(&source, &self.settings.target_language)
            .await?;

        self.set_state(SessionState::Translated {
            source: source.clone(),
            display: translated.display_text.clone(),
        });

        self.history
            .write()
            .append(HistoryEntry::new(source, translated.display_text));

        drop(guard);
        self.set_state(SessionState::Idle);
        Ok(())
    }

    /// Serialize the full history log to the configured path.
    pub fn save_history(&self) {
        let entries = self.history.read().entries().to_vec();
        match self.store.save(&self.settings.history_path, &entries) {
            Ok(()) => {
                self.emit(SessionEvent::HistorySaved {
                    path: self.settings.history_path.display().to_string(),
                    entries: entries.len(),
                });
            }
            Err(err) => self.fail(&err),
        }
    }

    /// Replace the history log from the configured path.
    ///
    /// On any failure the in-memory log is left untouched. A non-empty
    /// load surfaces the most recent entry as the current displayed pair.
    pub fn load_history(&self) {
        match self.store.load(&self.settings.history_path) {
            Ok(entries) => {
                let count = entries.len();
                let last = entries.last().cloned();
                self.history.write().replace(entries);

                self.emit(SessionEvent::HistoryLoaded {
                    path: self.settings.history_path.display().to_string(),
                    entries: count,
                });

                if let Some(entry) = last {
                    self.set_state(SessionState::Translated {
                        source: entry.source,
                        display: entry.display,
                    });
                    self.set_state(SessionState::Idle);
                }
            }
            Err(err) => self.fail(&err),
        }
    }

    fn fail(&self, err: &DomainError) {
        warn!(%err, "Session stage failed");
        self.set_state(SessionState::Error {
            message: err.to_string(),
        });
    }

    fn set_state(&self, state: SessionState) {
        info!(state = ?state, "Session state changed");
        *self.state.write() = state.clone();
        self.emit(SessionEvent::StateChanged { state });
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

/// Scoped ownership of the listening flag.
///
/// Acquired with a compare-exchange so only one listen can be in flight;
/// dropping the guard clears the flag, on success and on unwind alike.
struct ListeningGuard {
    flag: Arc<AtomicBool>,
}

impl ListeningGuard {
    fn acquire(flag: Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then(|| Self { flag })
    }
}

impl Drop for ListeningGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
