//! Document store seams. The backend owns all mutation of a profile: load
//! the full document, mutate in memory, persist the full document. No
//! field-level updates — multi-field invariants (questionnaire + tracker)
//! are committed in one save.

pub mod postgres;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::chat::ChatSession;
use crate::models::profile::StudentProfile;

/// Whole-document read/write-by-key for student profiles. Implementations
/// must preserve fields they do not model (the document round-trips intact).
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find(&self, user_id: &str) -> Result<Option<StudentProfile>, AppError>;

    /// Whole-document upsert, last writer wins.
    async fn save(&self, profile: &StudentProfile) -> Result<(), AppError>;

    /// Inserts a new profile; `Conflict` if the user id is already taken.
    async fn create(&self, profile: &StudentProfile) -> Result<(), AppError>;
}

/// Helper for handlers that require the profile to exist.
pub async fn require_profile(
    store: &dyn ProfileStore,
    user_id: &str,
) -> Result<StudentProfile, AppError> {
    store
        .find(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile not found for user {user_id}")))
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn find_session(&self, id: &str) -> Result<Option<ChatSession>, AppError>;

    /// Sessions for a user, most recently updated first.
    async fn sessions_for_user(&self, user_id: &str) -> Result<Vec<ChatSession>, AppError>;

    async fn save_session(&self, session: &ChatSession) -> Result<(), AppError>;
}
