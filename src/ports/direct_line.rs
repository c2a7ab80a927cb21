//! Direct Line Port - token, conversation, and activity endpoints.
//!
//! Handshake-style backends are Bot Framework Direct Line services. Every
//! call carries a bearer credential: the backend secret for the token
//! request, the issued token for everything after it.

use async_trait::async_trait;

use crate::domain::session::{ConversationStart, TokenGrant};
use crate::domain::{AcquisitionError, ActivitySet, OutgoingActivity};

/// Port for the Direct Line REST surface.
#[async_trait]
pub trait DirectLine: Send + Sync {
    /// `GET <token_url>` with `Authorization: Bearer <secret>`.
    async fn fetch_token(&self, token_url: &str, secret: &str)
        -> Result<TokenGrant, AcquisitionError>;

    /// `POST <base_url>` with `Authorization: Bearer <token>`.
    async fn start_conversation(
        &self,
        base_url: &str,
        token: &str,
    ) -> Result<ConversationStart, AcquisitionError>;

    /// `POST <activities_url>` with the activity as JSON body.
    async fn post_activity(
        &self,
        activities_url: &str,
        token: &str,
        activity: &OutgoingActivity,
    ) -> Result<(), AcquisitionError>;

    /// `GET <activities_url>`.
    async fn list_activities(
        &self,
        activities_url: &str,
        token: &str,
    ) -> Result<ActivitySet, AcquisitionError>;
}
