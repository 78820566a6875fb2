//! Model repository trait.
//!
//! Defines the interface for user and model row persistence.

use crate::error::Result;
use crate::user::UserId;
use async_trait::async_trait;

/// An abstract repository for users and their named voice models.
///
/// Each call is a single transactional operation. The repository does not
/// enforce the per-user model limit; callers check `count_models` first.
///
/// # Implementation Notes
///
/// Implementations should:
/// - keep `list_models` in insertion order
/// - report a `(user, name)` collision on insert as `DuplicateModelName`
///   when the backend can detect it
#[async_trait]
pub trait ModelRepository: Send + Sync {
    /// Returns whether a row for `user_id` exists.
    async fn user_exists(&self, user_id: UserId) -> Result<bool>;

    /// Inserts `user_id`. Inserting an existing user is a no-op.
    async fn add_user(&self, user_id: UserId) -> Result<()>;

    /// Inserts one model row for `user_id`.
    async fn save_model(&self, user_id: UserId, name: &str) -> Result<()>;

    /// Lists the names of `user_id`'s models, oldest first.
    async fn list_models(&self, user_id: UserId) -> Result<Vec<String>>;

    /// Counts the models of `user_id`.
    async fn count_models(&self, user_id: UserId) -> Result<usize>;

    /// Deletes the model `name` of `user_id`.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Model deleted (or didn't exist)
    /// - `Err(_)`: Error occurred during deletion
    async fn delete_model(&self, user_id: UserId, name: &str) -> Result<()>;
}
