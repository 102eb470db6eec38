use serde::Serialize;

/// Session pipeline state machine.
///
/// State transitions:
/// - Idle -> Listening (start_listening, guarded by the listening flag)
/// - Listening -> Recognized (capture + transcription succeeded)
/// - Recognized -> Translated (translation succeeded, entry recorded)
/// - Translated -> Idle (automatic, pipeline complete)
/// - any stage -> Error (failure; listening flag cleared, nothing recorded)
///
/// Manual text entry enters at Recognized -> Translated with the submitted
/// text as the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data")]
pub enum SessionState {
    /// Ready for a listen request or manual entry.
    Idle,
    /// Waiting for speech and recording an utterance.
    Listening,
    /// Source text is known; translation still in flight.
    Recognized { source: String },
    /// Translation complete and recorded.
    Translated { source: String, display: String },
    /// A pipeline stage failed; message is the user-visible cause.
    Error { message: String },
}

impl SessionState {
    /// Check if a listen request may start from this state.
    #[must_use]
    pub fn can_start_listening(&self) -> bool {
        !matches!(self, SessionState::Listening)
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        matches!(self, SessionState::Listening)
    }

    /// User-facing status line for this state.
    pub fn status_line(&self) -> String {
        match self {
            SessionState::Idle => "Ready".to_string(),
            SessionState::Listening => "Listening...".to_string(),
            SessionState::Recognized { source } => format!("Recognized Text: {source}"),
            SessionState::Translated { display, .. } => display.clone(),
            SessionState::Error { message } => message.clone(),
        }
    }
}

/// Events broadcast by the session controller.
///
/// The UI layer subscribes to these instead of the controller writing into
/// UI internals.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    /// The session state changed.
    StateChanged { state: SessionState },
    /// History was written to disk.
    HistorySaved { path: String, entries: usize },
    /// History was replaced from disk.
    HistoryLoaded { path: String, entries: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_listening_blocks_a_new_listen() {
        assert!(SessionState::Idle.can_start_listening());
        assert!(!SessionState::Listening.can_start_listening());
        assert!(SessionState::Recognized {
            source: "hi".to_string()
        }
        .can_start_listening());
        assert!(SessionState::Translated {
            source: "hi".to_string(),
            display: "سلام".to_string()
        }
        .can_start_listening());
        assert!(SessionState::Error {
            message: "x".to_string()
        }
        .can_start_listening());
    }

    #[test]
    fn test_status_lines() {
        assert_eq!(SessionState::Listening.status_line(), "Listening...");
        assert_eq!(
            SessionState::Recognized {
                source: "hello".to_string()
            }
            .status_line(),
            "Recognized Text: hello"
        );
        assert_eq!(
            SessionState::Error {
                message: "Translation error: boom".to_string()
            }
            .status_line(),
            "Translation error: boom"
        );
    }
}
