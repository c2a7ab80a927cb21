//! Activities exchanged within a Direct Line conversation.

use serde::{Deserialize, Serialize};

/// Sender id stamped on messages this process posts.
pub const AGENT_SENDER_ID: &str = "azure-agent";

/// Author of an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub id: String,
}

/// One message unit within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub from: Option<ChannelAccount>,
    #[serde(default)]
    pub text: Option<String>,
}

impl Activity {
    /// True if the activity was posted by `agent_sender` (our own message).
    pub fn is_from(&self, agent_sender: &str) -> bool {
        self.from.as_ref().is_some_and(|from| from.id == agent_sender)
    }
}

/// An activities list as returned by the activities endpoint or pushed on the stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ActivitySet {
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub watermark: Option<String>,
}

impl ActivitySet {
    /// Text of the most recent backend-authored activity.
    ///
    /// Returns `None` unless the list holds more than one activity, since the
    /// first entry is always the echo of the posted message. Activities
    /// without text (typing indicators and the like) never count as replies.
    pub fn latest_reply(&self, agent_sender: &str) -> Option<&str> {
        if self.activities.len() <= 1 {
            return None;
        }
        self.activities
            .iter()
            .rev()
            .filter(|activity| !activity.is_from(agent_sender))
            .find_map(|activity| activity.text.as_deref())
    }

    /// Text of the first activity, as carried by a stream frame.
    pub fn first_text(&self) -> Option<&str> {
        self.activities.first().and_then(|a| a.text.as_deref())
    }
}

/// A message activity posted on behalf of the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingActivity {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub from: ChannelAccount,
    pub text: String,
}

impl OutgoingActivity {
    /// Frames `text` as a message from `sender`.
    pub fn message(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: "message",
            from: ChannelAccount { id: sender.into() },
            text: text.into(),
        }
    }
}
