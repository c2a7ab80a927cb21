//! Polling acquisition: handshake, then poll the activities list.
//!
//! The poller sleeps before every attempt, following the configured
//! schedule, and returns as soon as a backend-authored reply shows up. An
//! attempt that finds no reply yet simply moves on to the next one.

use tracing::{info, warn};

use super::handshake;
use super::AcquisitionSettings;
use crate::domain::{format_secs, Acquisition, AcquisitionError, ConversationAccess};
use crate::ports::{DirectLine, Sleeper};

pub(super) async fn acquire(
    direct_line: &dyn DirectLine,
    sleeper: &dyn Sleeper,
    access: &ConversationAccess,
    label: &str,
    message: &str,
    settings: &AcquisitionSettings,
) -> Acquisition {
    match poll_for_reply(direct_line, sleeper, access, label, message, settings).await {
        Ok(Some(reply)) => Acquisition::Answer(reply),
        Ok(None) => {
            info!(
                backend = label,
                attempts = settings.poll_schedule.max_attempts(),
                "no reply before attempts ran out"
            );
            Acquisition::NoAnswer
        }
        Err(err) => {
            warn!(backend = label, error = %err, "polling exchange failed");
            Acquisition::Failed(err)
        }
    }
}

async fn poll_for_reply(
    direct_line: &dyn DirectLine,
    sleeper: &dyn Sleeper,
    access: &ConversationAccess,
    label: &str,
    message: &str,
    settings: &AcquisitionSettings,
) -> Result<Option<String>, AcquisitionError> {
    let open = handshake::open(direct_line, access, label, message, &settings.agent_sender).await?;
    let session = open.session;
    let watch = open.watch;
    let activities_url = access.activities_url(session.conversation_id());

    for (attempt, delay) in settings.poll_schedule.attempts() {
        sleeper.sleep(delay).await;

        let activities = direct_line
            .list_activities(&activities_url, session.token())
            .await?;
        info!(
            backend = label,
            attempt,
            elapsed = %format_secs(watch.elapsed()),
            "poll"
        );

        if let Some(reply) = activities.latest_reply(&settings.agent_sender) {
            info!(
                backend = label,
                elapsed = %format_secs(watch.elapsed()),
                length = reply.chars().count(),
                "reply received"
            );
            return Ok(Some(reply.to_string()));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::{MockDirectLine, RecordingSleeper};
    use crate::domain::{ActivitySet, PollSchedule};
    use serde_json::json;
    use std::time::Duration;

    fn access() -> ConversationAccess {
        ConversationAccess::new("https://dl/token", "https://dl/conversations", "s")
    }

    fn echo_only() -> ActivitySet {
        serde_json::from_value(json!({
            "activities": [{"from": {"id": "azure-agent"}, "text": "q"}]
        }))
        .unwrap()
    }

    fn answered(text: &str) -> ActivitySet {
        serde_json::from_value(json!({
            "activities": [
                {"from": {"id": "azure-agent"}, "text": "q"},
                {"from": {"id": "difa-bot"}, "text": text}
            ]
        }))
        .unwrap()
    }

    fn secs(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_secs).collect()
    }

    #[tokio::test]
    async fn keeps_polling_past_empty_lists() {
        let mut direct_line = MockDirectLine::new();
        for _ in 0..5 {
            direct_line = direct_line.with_activities(echo_only());
        }
        let direct_line = direct_line.with_activities(answered("Anggota: PGN, Pertamina"));
        let sleeper = RecordingSleeper::new();

        let outcome = acquire(
            &direct_line,
            &sleeper,
            &access(),
            "DIFA",
            "Siapa saja?",
            &AcquisitionSettings::default(),
        )
        .await;

        assert_eq!(outcome, Acquisition::Answer("Anggota: PGN, Pertamina".into()));
        assert_eq!(direct_line.list_count(), 6);
        assert_eq!(sleeper.recorded(), secs(&[2, 3, 5, 7, 10, 15]));
    }

    #[tokio::test]
    async fn exhausting_attempts_is_no_answer() {
        let direct_line = MockDirectLine::new();
        let sleeper = RecordingSleeper::new();

        let outcome = acquire(
            &direct_line,
            &sleeper,
            &access(),
            "DIFA",
            "q",
            &AcquisitionSettings::default(),
        )
        .await;

        assert_eq!(outcome, Acquisition::NoAnswer);
        assert_eq!(
            outcome.render("DIFA"),
            "DIFA tidak merespons dalam waktu yang ditentukan."
        );
        assert_eq!(direct_line.list_count(), 20);
        assert_eq!(sleeper.recorded().len(), 20);
        assert_eq!(sleeper.total(), PollSchedule::default().total_delay());
    }

    #[tokio::test]
    async fn legacy_mode_waits_flat_delay() {
        let direct_line = MockDirectLine::new()
            .with_activities(echo_only())
            .with_activities(answered("ok"));
        let sleeper = RecordingSleeper::new();
        let settings = AcquisitionSettings {
            poll_schedule: PollSchedule::legacy(),
            ..Default::default()
        };

        let outcome = acquire(&direct_line, &sleeper, &access(), "GINO", "q", &settings).await;

        assert_eq!(outcome.answer(), Some("ok"));
        assert_eq!(sleeper.recorded(), secs(&[15, 15]));
    }

    #[tokio::test]
    async fn list_failure_aborts_exchange() {
        let direct_line = MockDirectLine::new()
            .with_activities(echo_only())
            .with_list_error(AcquisitionError::transport("connection reset"));
        let sleeper = RecordingSleeper::new();

        let outcome = acquire(
            &direct_line,
            &sleeper,
            &access(),
            "DIFA",
            "q",
            &AcquisitionSettings::default(),
        )
        .await;

        assert_eq!(outcome.render("DIFA"), "Error accessing DIFA: connection reset");
        assert_eq!(direct_line.list_count(), 2);
    }

    #[tokio::test]
    async fn handshake_failure_never_polls() {
        let direct_line =
            MockDirectLine::new().with_token_error(AcquisitionError::transport("dns error"));
        let sleeper = RecordingSleeper::new();

        let outcome = acquire(
            &direct_line,
            &sleeper,
            &access(),
            "DIFA",
            "q",
            &AcquisitionSettings::default(),
        )
        .await;

        assert!(outcome.render("DIFA").starts_with("Error accessing DIFA: "));
        assert_eq!(direct_line.list_count(), 0);
        assert!(sleeper.recorded().is_empty());
    }
}
