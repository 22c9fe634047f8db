use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{Amount, Launch, LaunchFilter, LaunchId, LaunchType, NewUser, User, UserId};

/// Persistence for launches.
///
/// Implementations only store and query; business rules are checked before
/// any of these methods is called.
#[async_trait]
pub trait LaunchStore: Send + Sync {
    /// Insert a transient launch and return it with its assigned identity.
    async fn create(&self, launch: &Launch) -> Result<Launch>;

    /// Write a launch by identity, inserting it if the identity is unknown.
    async fn update(&self, launch: &Launch) -> Result<Launch>;

    /// Remove the launch with this identity. Unknown identities are a no-op.
    async fn delete(&self, id: LaunchId) -> Result<()>;

    async fn find_by_id(&self, id: LaunchId) -> Result<Option<Launch>>;

    /// All launches accepted by [`LaunchFilter::matches`].
    async fn find_matching(&self, filter: &LaunchFilter) -> Result<Vec<Launch>>;

    /// Sum of amounts for one user and type, or `None` when there are no rows.
    async fn sum_amount_by_user_and_type(
        &self,
        user_id: UserId,
        launch_type: LaunchType,
    ) -> Result<Option<Amount>>;
}

/// Lookup of the users launches belong to.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> Result<User>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>>;

    async fn email_exists(&self, email: &str) -> Result<bool>;
}
