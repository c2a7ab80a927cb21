//! Streaming acquisition: handshake, then read the answer off the push channel.
//!
//! Only text frames are counted. The answer is the first activity's text in
//! the configured text frame (the third one by default); the connection is
//! closed as soon as that frame has been read.

use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use super::handshake;
use super::AcquisitionSettings;
use crate::domain::{format_secs, Acquisition, AcquisitionError, ActivitySet, ConversationAccess};
use crate::ports::{ActivityStream, DirectLine, FrameReader, StreamFrame};

pub(super) async fn acquire(
    direct_line: &dyn DirectLine,
    streams: &dyn ActivityStream,
    access: &ConversationAccess,
    label: &str,
    message: &str,
    settings: &AcquisitionSettings,
) -> Acquisition {
    match stream_reply(direct_line, streams, access, label, message, settings).await {
        Ok(Some(reply)) => Acquisition::Answer(reply),
        Ok(None) => {
            info!(backend = label, "stream ended before the answer frame");
            Acquisition::NoAnswer
        }
        Err(err) => {
            warn!(backend = label, error = %err, "streaming exchange failed");
            Acquisition::Failed(err)
        }
    }
}

async fn stream_reply(
    direct_line: &dyn DirectLine,
    streams: &dyn ActivityStream,
    access: &ConversationAccess,
    label: &str,
    message: &str,
    settings: &AcquisitionSettings,
) -> Result<Option<String>, AcquisitionError> {
    let open = handshake::open(direct_line, access, label, message, &settings.agent_sender).await?;
    let stream_url = open
        .session
        .stream_url()
        .ok_or_else(|| AcquisitionError::missing("conversation", "streamUrl"))?;

    let deadline = Instant::now() + settings.stream_timeout;
    let mut reader = timeout_at(deadline, streams.connect(stream_url))
        .await
        .map_err(|_| AcquisitionError::Timeout {
            timeout_secs: settings.stream_timeout.as_secs(),
        })??;

    let read = timeout_at(
        deadline,
        read_answer_frame(reader.as_mut(), settings.answer_frame),
    )
    .await;
    reader.close().await;

    let reply = match read {
        Ok(result) => result?,
        Err(_) => {
            debug!(backend = label, "stream deadline reached");
            None
        }
    };

    if let Some(reply) = &reply {
        info!(
            backend = label,
            elapsed = %format_secs(open.watch.since_lap()),
            length = reply.chars().count(),
            "stream reply received"
        );
    }
    Ok(reply)
}

/// Reads frames until the `answer_frame`-th text frame and extracts its answer.
async fn read_answer_frame(
    reader: &mut dyn FrameReader,
    answer_frame: usize,
) -> Result<Option<String>, AcquisitionError> {
    let mut text_frames = 0;
    while let Some(frame) = reader.next_frame().await {
        let StreamFrame::Text(text) = frame? else {
            continue;
        };
        text_frames += 1;
        if text_frames < answer_frame {
            continue;
        }

        let activities: ActivitySet = serde_json::from_str(&text)
            .map_err(|err| AcquisitionError::malformed("stream frame", err))?;
        return activities
            .first_text()
            .map(|reply| Some(reply.to_string()))
            .ok_or_else(|| AcquisitionError::missing("stream frame", "activities[0].text"));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::{MockActivityStream, MockDirectLine};
    use std::time::Duration;

    fn access() -> ConversationAccess {
        ConversationAccess::new("https://dl/token", "https://dl/conversations", "s")
    }

    fn frame(text: &str) -> StreamFrame {
        StreamFrame::Text(serde_json::json!({"activities": [{"text": text}]}).to_string())
    }

    fn direct_line() -> MockDirectLine {
        MockDirectLine::new().with_conversation("conv-1", Some("wss://dl/stream/conv-1"))
    }

    #[tokio::test]
    async fn third_text_frame_carries_answer() {
        let streams = MockActivityStream::new()
            .with_frame(frame("echo"))
            .with_frame(StreamFrame::Control)
            .with_frame(StreamFrame::Text(String::new()))
            .with_frame(frame("ANSWER"))
            .with_frame(frame("late"));

        let outcome = acquire(
            &direct_line(),
            &streams,
            &access(),
            "GINO",
            "Apa lembaga inspeksi?",
            &AcquisitionSettings::default(),
        )
        .await;

        assert_eq!(outcome, Acquisition::Answer("ANSWER".into()));
        assert_eq!(streams.connected_urls(), vec!["wss://dl/stream/conv-1".to_string()]);
        assert_eq!(streams.frames_consumed(), 4);
        assert!(streams.closed());
    }

    #[tokio::test]
    async fn stream_end_before_answer_is_no_answer() {
        let streams = MockActivityStream::new()
            .with_frame(frame("echo"))
            .with_frame(frame("typing"));

        let outcome = acquire(
            &direct_line(),
            &streams,
            &access(),
            "GINO",
            "q",
            &AcquisitionSettings::default(),
        )
        .await;

        assert_eq!(
            outcome.render("GINO"),
            "GINO tidak merespons dalam waktu yang ditentukan."
        );
        assert!(streams.closed());
    }

    #[tokio::test]
    async fn stalled_stream_times_out_as_no_answer() {
        let streams = MockActivityStream::new().with_frame(frame("echo")).stalled();
        let settings = AcquisitionSettings {
            stream_timeout: Duration::from_millis(20),
            ..Default::default()
        };

        let outcome = acquire(&direct_line(), &streams, &access(), "GINO", "q", &settings).await;

        assert_eq!(outcome, Acquisition::NoAnswer);
        assert!(streams.closed());
    }

    #[tokio::test]
    async fn missing_stream_url_fails() {
        let direct_line = MockDirectLine::new().with_conversation("conv-1", None);
        let streams = MockActivityStream::new();

        let outcome = acquire(
            &direct_line,
            &streams,
            &access(),
            "GINO",
            "q",
            &AcquisitionSettings::default(),
        )
        .await;

        assert_eq!(
            outcome.render("GINO"),
            "Error accessing GINO: missing 'streamUrl' in conversation response"
        );
        assert!(streams.connected_urls().is_empty());
    }

    #[tokio::test]
    async fn connect_failure_is_absorbed() {
        let streams = MockActivityStream::new()
            .with_connect_error(AcquisitionError::transport("handshake refused"));

        let outcome = acquire(
            &direct_line(),
            &streams,
            &access(),
            "GINO",
            "q",
            &AcquisitionSettings::default(),
        )
        .await;

        assert_eq!(outcome.render("GINO"), "Error accessing GINO: handshake refused");
    }

    #[tokio::test]
    async fn answer_frame_without_activities_is_malformed() {
        let streams = MockActivityStream::new()
            .with_frame(frame("1"))
            .with_frame(frame("2"))
            .with_frame(StreamFrame::Text(r#"{"activities": []}"#.into()));

        let outcome = acquire(
            &direct_line(),
            &streams,
            &access(),
            "GINO",
            "q",
            &AcquisitionSettings::default(),
        )
        .await;

        assert!(matches!(
            outcome,
            Acquisition::Failed(AcquisitionError::MissingField { .. })
        ));
    }

    #[tokio::test]
    async fn frame_read_error_fails_and_closes() {
        let streams = MockActivityStream::new()
            .with_frame(frame("echo"))
            .with_frame_error(AcquisitionError::stream("connection reset by peer"))
            .with_frame(frame("ANSWER"));

        let outcome = acquire(
            &direct_line(),
            &streams,
            &access(),
            "GINO",
            "q",
            &AcquisitionSettings::default(),
        )
        .await;

        assert_eq!(
            outcome.render("GINO"),
            "Error accessing GINO: stream error: connection reset by peer"
        );
        assert_eq!(streams.frames_consumed(), 2);
        assert!(streams.closed());
    }
}
