//! Driver Notification Models

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

/// Unseen Jobs Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UnseenResponse {
    /// Open jobs created since the driver last marked the feed seen
    pub count: u64,
}

/// Seen Checkpoint Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SeenResponse {
    /// `None` until the driver marks the feed seen for the first time
    pub last_seen_at: Option<String>,
}
