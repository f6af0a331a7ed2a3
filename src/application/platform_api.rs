// Gateway trait for the publication platform's REST API
use crate::application::aggregate_fetcher::AggregateRequest;
use crate::domain::activity::ActivityEntry;
use crate::domain::listing::{
    CursorPage, Message, Passcode, PasscodeRole, Publication, UserUpdate,
};
use crate::domain::stats::{StatsResponse, UserSummary};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// Connectivity, timeout or a non-success status
    #[error("network failure: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Decode(String),
    /// The bearer token was rejected; the session is over
    #[error("session is no longer authorized")]
    Unauthorized,
}

impl FetchError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Unauthorized)
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Combined statistics for every tracked section
    async fn fetch_stats(&self, request: &AggregateRequest) -> FetchResult<StatsResponse>;

    /// One page of the editor activity log
    async fn fetch_editor_activities(&self, page: u32) -> FetchResult<CursorPage<ActivityEntry>>;

    async fn fetch_messages(&self, page: u32) -> FetchResult<CursorPage<Message>>;

    async fn fetch_publications(&self, page: u32) -> FetchResult<CursorPage<Publication>>;

    /// Every registered user; the platform does not page this list
    async fn fetch_users(&self) -> FetchResult<Vec<UserSummary>>;

    async fn block_user(&self, user_id: u64) -> FetchResult<()>;

    async fn unblock_user(&self, user_id: u64) -> FetchResult<()>;

    async fn update_user(&self, user_id: u64, update: &UserUpdate) -> FetchResult<UserSummary>;

    async fn delete_user(&self, user_id: u64) -> FetchResult<()>;

    async fn fetch_passcodes(&self) -> FetchResult<Vec<Passcode>>;

    async fn create_passcode(&self, role: PasscodeRole) -> FetchResult<Passcode>;
}
