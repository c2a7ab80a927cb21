//! Direct Line handshake: token, conversation, message post.
//!
//! Each step feeds the next, so they run strictly in sequence. Any failure
//! aborts the whole exchange.

use tracing::info;

use crate::domain::{
    format_secs, AcquisitionError, ConversationAccess, ConversationSession, OutgoingActivity,
    Stopwatch,
};
use crate::ports::DirectLine;

/// A conversation with the user's message already posted.
pub(super) struct OpenConversation {
    pub session: ConversationSession,
    /// Started before the token request; last lap at the message post.
    pub watch: Stopwatch,
}

pub(super) async fn open(
    direct_line: &dyn DirectLine,
    access: &ConversationAccess,
    label: &str,
    message: &str,
    agent_sender: &str,
) -> Result<OpenConversation, AcquisitionError> {
    let mut watch = Stopwatch::start();

    let grant = direct_line
        .fetch_token(&access.token_url, access.secret())
        .await?;
    info!(backend = label, step = "token", elapsed = %format_secs(watch.lap()), "token acquired");

    let start = direct_line
        .start_conversation(&access.base_url, &grant.token)
        .await?;
    let session = ConversationSession::new(grant.token, start);
    info!(
        backend = label,
        step = "conversation",
        elapsed = %format_secs(watch.lap()),
        "conversation started"
    );

    let activity = OutgoingActivity::message(agent_sender, message);
    direct_line
        .post_activity(
            &access.activities_url(session.conversation_id()),
            session.token(),
            &activity,
        )
        .await?;
    info!(
        backend = label,
        step = "post",
        elapsed = %format_secs(watch.lap()),
        total = %format_secs(watch.elapsed()),
        "message posted"
    );

    Ok(OpenConversation { session, watch })
}
