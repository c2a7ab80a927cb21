//! Scripted Direct Line service.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::session::{ConversationStart, TokenGrant};
use crate::domain::{
    AcquisitionError, Activity, ActivitySet, ChannelAccount, OutgoingActivity, AGENT_SENDER_ID,
};
use crate::ports::DirectLine;

/// A recorded Direct Line request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectLineCall {
    FetchToken { url: String, bearer: String },
    StartConversation { url: String, bearer: String },
    PostActivity {
        url: String,
        bearer: String,
        activity: OutgoingActivity,
    },
    ListActivities { url: String, bearer: String },
}

/// Direct Line double.
///
/// The handshake succeeds with `token-1` / `conv-1` unless configured
/// otherwise. Activity lists are served from a queue; once it is empty every
/// poll sees only the echo of the posted message.
#[derive(Debug, Clone)]
pub struct MockDirectLine {
    token: Result<String, AcquisitionError>,
    conversation: Result<ConversationStart, AcquisitionError>,
    post: Result<(), AcquisitionError>,
    activities: Arc<Mutex<VecDeque<Result<ActivitySet, AcquisitionError>>>>,
    calls: Arc<Mutex<Vec<DirectLineCall>>>,
}

impl Default for MockDirectLine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDirectLine {
    pub fn new() -> Self {
        Self {
            token: Ok("token-1".to_string()),
            conversation: Ok(ConversationStart {
                conversation_id: "conv-1".to_string(),
                stream_url: Some("wss://directline.test/stream/conv-1".to_string()),
            }),
            post: Ok(()),
            activities: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Ok(token.into());
        self
    }

    pub fn with_token_error(mut self, error: AcquisitionError) -> Self {
        self.token = Err(error);
        self
    }

    pub fn with_conversation(mut self, id: impl Into<String>, stream_url: Option<&str>) -> Self {
        self.conversation = Ok(ConversationStart {
            conversation_id: id.into(),
            stream_url: stream_url.map(str::to_string),
        });
        self
    }

    pub fn with_conversation_error(mut self, error: AcquisitionError) -> Self {
        self.conversation = Err(error);
        self
    }

    pub fn with_post_error(mut self, error: AcquisitionError) -> Self {
        self.post = Err(error);
        self
    }

    /// Queues the response for the next activities poll.
    pub fn with_activities(self, activities: ActivitySet) -> Self {
        self.activities.lock().unwrap().push_back(Ok(activities));
        self
    }

    /// Queues a failing activities poll.
    pub fn with_list_error(self, error: AcquisitionError) -> Self {
        self.activities.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<DirectLineCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of activities polls made.
    pub fn list_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| matches!(call, DirectLineCall::ListActivities { .. }))
            .count()
    }

    fn record(&self, call: DirectLineCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn echo_only() -> ActivitySet {
        ActivitySet {
            activities: vec![Activity {
                id: None,
                from: Some(ChannelAccount {
                    id: AGENT_SENDER_ID.to_string(),
                }),
                text: None,
            }],
            watermark: None,
        }
    }
}

#[async_trait]
impl DirectLine for MockDirectLine {
    async fn fetch_token(
        &self,
        token_url: &str,
        secret: &str,
    ) -> Result<TokenGrant, AcquisitionError> {
        self.record(DirectLineCall::FetchToken {
            url: token_url.to_string(),
            bearer: secret.to_string(),
        });
        self.token.clone().map(|token| TokenGrant { token })
    }

    async fn start_conversation(
        &self,
        base_url: &str,
        token: &str,
    ) -> Result<ConversationStart, AcquisitionError> {
        self.record(DirectLineCall::StartConversation {
            url: base_url.to_string(),
            bearer: token.to_string(),
        });
        self.conversation.clone()
    }

    async fn post_activity(
        &self,
        activities_url: &str,
        token: &str,
        activity: &OutgoingActivity,
    ) -> Result<(), AcquisitionError> {
        self.record(DirectLineCall::PostActivity {
            url: activities_url.to_string(),
            bearer: token.to_string(),
            activity: activity.clone(),
        });
        self.post.clone()
    }

    async fn list_activities(
        &self,
        activities_url: &str,
        token: &str,
    ) -> Result<ActivitySet, AcquisitionError> {
        self.record(DirectLineCall::ListActivities {
            url: activities_url.to_string(),
            bearer: token.to_string(),
        });
        self.activities
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Self::echo_only()))
    }
}
