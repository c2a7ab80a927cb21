//! Direct-response acquisition: one POST, answer embedded in the body.

use std::time::Duration;
use tracing::{info, warn};

use crate::domain::{format_secs, Acquisition, Stopwatch};
use crate::ports::{AnswerService, DirectRequest};

pub(super) async fn acquire(
    answers: &dyn AnswerService,
    label: &str,
    url: &str,
    message: &str,
    timeout: Duration,
) -> Acquisition {
    let watch = Stopwatch::start();
    let request = DirectRequest::user(message);

    match answers.post(url, &request, timeout).await {
        Ok(body) => {
            let answer = extract_direct_answer(&body);
            info!(
                backend = label,
                elapsed = %format_secs(watch.elapsed()),
                length = answer.chars().count(),
                "response received"
            );
            Acquisition::Answer(answer)
        }
        Err(err) => {
            warn!(
                backend = label,
                elapsed = %format_secs(watch.elapsed()),
                error = %err,
                "request failed"
            );
            Acquisition::Failed(err)
        }
    }
}

/// First entry of `context.data_points.text`, or the raw body when that is
/// absent or empty. Never returns an empty string.
pub fn extract_direct_answer(body: &serde_json::Value) -> String {
    body.pointer("/context/data_points/text/0")
        .and_then(|first| first.as_str())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}
