//! Acquisition outcomes.
//!
//! Every strategy returns an [`Acquisition`] instead of raising. The caller
//! branches on the variant; [`Acquisition::render`] turns any outcome into the
//! text relayed to the user.

use thiserror::Error;

/// Failures inside a single acquisition attempt.
///
/// These never cross the strategy boundary as errors. They are wrapped in
/// [`Acquisition::Failed`] and rendered as `Error accessing <LABEL>: ...`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    /// Deadline exceeded.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Connection refused, DNS failure, reset, TLS failure.
    #[error("{0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not the JSON we expected.
    #[error("malformed {context} response: {reason}")]
    Malformed { context: &'static str, reason: String },

    /// Expected field absent from an otherwise valid body.
    #[error("missing '{field}' in {context} response")]
    MissingField {
        context: &'static str,
        field: &'static str,
    },

    /// Push channel failure.
    #[error("stream error: {0}")]
    Stream(String),

    /// Descriptor does not carry what the strategy needs.
    #[error("misconfigured backend: {0}")]
    Misconfigured(String),
}

impl AcquisitionError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn malformed(context: &'static str, reason: impl ToString) -> Self {
        Self::Malformed {
            context,
            reason: reason.to_string(),
        }
    }

    pub fn missing(context: &'static str, field: &'static str) -> Self {
        Self::MissingField { context, field }
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }
}

/// Result of asking one backend one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    /// The backend answered.
    Answer(String),
    /// The backend stayed silent until the polling or streaming bound ran out.
    NoAnswer,
    /// The exchange failed.
    Failed(AcquisitionError),
}

impl Acquisition {
    pub fn answer(&self) -> Option<&str> {
        match self {
            Acquisition::Answer(text) => Some(text),
            _ => None,
        }
    }

    /// Text shown to the user for this outcome.
    pub fn render(self, label: &str) -> String {
        match self {
            Acquisition::Answer(text) => text,
            Acquisition::NoAnswer => no_answer_text(label),
            Acquisition::Failed(err) => error_text(label, &err),
        }
    }
}

/// `GINO tidak merespons dalam waktu yang ditentukan.`
pub fn no_answer_text(label: &str) -> String {
    format!("{} tidak merespons dalam waktu yang ditentukan.", label)
}

/// `Error accessing GINO: <details>`
pub fn error_text(label: &str, err: &AcquisitionError) -> String {
    format!("Error accessing {}: {}", label, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_renders_verbatim() {
        assert_eq!(Acquisition::Answer("hi".into()).render("AIMA"), "hi");
    }

    #[test]
    fn no_answer_renders_sentinel() {
        assert_eq!(
            Acquisition::NoAnswer.render("DIFA"),
            "DIFA tidak merespons dalam waktu yang ditentukan."
        );
    }

    #[test]
    fn failure_renders_error_prefix() {
        let text =
            Acquisition::Failed(AcquisitionError::Timeout { timeout_secs: 40 }).render("AIMA");
        assert_eq!(text, "Error accessing AIMA: request timed out after 40s");
    }

    #[test]
    fn only_answers_expose_text() {
        assert_eq!(Acquisition::Answer("x".into()).answer(), Some("x"));
        assert_eq!(Acquisition::NoAnswer.answer(), None);

        let err = Acquisition::Failed(AcquisitionError::missing("token", "token"));
        assert_eq!(err.answer(), None);
        assert_eq!(
            err.render("GINO"),
            "Error accessing GINO: missing 'token' in token response"
        );
    }
}
