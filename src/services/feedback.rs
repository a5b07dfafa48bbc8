use std::sync::Mutex;

/// Operator-visible channel for warning and error messages
pub trait Feedback: Send + Sync {
    fn warning(&self, message: &str);

    fn error(&self, message: &str);
}

/// Forwards feedback to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFeedback;

impl Feedback for TracingFeedback {
    fn warning(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackMessage {
    pub severity: Severity,
    pub text: String,
}

/// Keeps every message in memory, in order
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    messages: Mutex<Vec<FeedbackMessage>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<FeedbackMessage> {
        self.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.texts(Severity::Error)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.texts(Severity::Warning)
    }

    fn texts(&self, severity: Severity) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|m| m.severity == severity)
            .map(|m| m.text.clone())
            .collect()
    }

    fn push(&self, severity: Severity, message: &str) {
        self.lock().push(FeedbackMessage {
            severity,
            text: message.to_string(),
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<FeedbackMessage>> {
        // A poisoned lock still holds valid messages
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Feedback for RecordingFeedback {
    fn warning(&self, message: &str) {
        self.push(Severity::Warning, message);
    }

    fn error(&self, message: &str) {
        self.push(Severity::Error, message);
    }
}
