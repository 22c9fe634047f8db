use crate::domain::{
    validate, Amount, Launch, LaunchFilter, LaunchId, LaunchStatus, LaunchType, NewUser, User,
    UserId,
};
use crate::storage::{LaunchStore, Repository, UserStore};

use super::{compute_balance, AppError};

/// Application service for launches: validation first, then persistence.
/// This is the primary interface for any client (CLI, API, etc.).
pub struct LaunchService<S = Repository> {
    store: S,
}

impl LaunchService<Repository> {
    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }
}

impl<S> LaunchService<S> {
    /// Create a new launch service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: LaunchStore> LaunchService<S> {
    // ========================
    // Launch operations
    // ========================

    /// Validate and store a new launch, returning it with its identity.
    ///
    /// Nothing is written when validation fails.
    pub async fn create(&self, launch: &Launch) -> Result<Launch, AppError> {
        validate(launch)?;
        Ok(self.store.create(launch).await?)
    }

    /// Validate and rewrite a stored launch.
    pub async fn update(&self, launch: &Launch) -> Result<Launch, AppError> {
        if !launch.is_persisted() {
            return Err(AppError::ContractViolation(
                "update requires a launch with an identity",
            ));
        }
        validate(launch)?;
        Ok(self.store.update(launch).await?)
    }

    /// Remove a stored launch. Only the identity is looked at.
    pub async fn delete(&self, launch: &Launch) -> Result<(), AppError> {
        let id = launch.id.ok_or(AppError::ContractViolation(
            "delete requires a launch with an identity",
        ))?;
        Ok(self.store.delete(id).await?)
    }

    /// Set the status on `launch` and store it through [`Self::update`].
    pub async fn change_status(
        &self,
        launch: &mut Launch,
        status: LaunchStatus,
    ) -> Result<Launch, AppError> {
        launch.status = status;
        self.update(launch).await
    }

    /// All launches matching the filter, possibly none.
    pub async fn search(&self, filter: &LaunchFilter) -> Result<Vec<Launch>, AppError> {
        Ok(self.store.find_matching(filter).await?)
    }

    pub async fn find_by_id(&self, id: LaunchId) -> Result<Option<Launch>, AppError> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Like [`Self::find_by_id`] but a missing launch is an error.
    pub async fn get_launch(&self, id: LaunchId) -> Result<Launch, AppError> {
        self.find_by_id(id)
            .await?
            .ok_or(AppError::LaunchNotFound(id))
    }

    /// Income minus expenses over every launch the user owns.
    pub async fn balance(&self, user_id: UserId) -> Result<Amount, AppError> {
        compute_balance(&self.store, user_id).await
    }
}

impl<S: UserStore> LaunchService<S> {
    // ========================
    // User operations
    // ========================

    /// Register a user; emails are unique.
    pub async fn register_user(&self, user: NewUser) -> Result<User, AppError> {
        if self.store.email_exists(&user.email).await? {
            return Err(AppError::EmailAlreadyUsed(user.email));
        }
        Ok(self.store.create_user(&user).await?)
    }

    pub async fn find_user(&self, id: UserId) -> Result<Option<User>, AppError> {
        Ok(self.store.find_user(id).await?)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, AppError> {
        self.find_user(id).await?.ok_or(AppError::UserNotFound(id))
    }
}

/// Convert external text into a status, rejecting anything unknown.
pub fn parse_status(input: &str) -> Result<LaunchStatus, AppError> {
    LaunchStatus::from_str(input).ok_or_else(|| AppError::InvalidStatus(input.to_string()))
}

/// Convert external text into a launch type, rejecting anything unknown.
pub fn parse_type(input: &str) -> Result<LaunchType, AppError> {
    LaunchType::from_str(input).ok_or_else(|| AppError::InvalidType(input.to_string()))
}
