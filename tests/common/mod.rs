// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use launches::application::LaunchService;
use launches::domain::{Amount, Launch, LaunchType, NewUser, User};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LaunchService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LaunchService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to register a user with a name-derived email
pub async fn register(service: &LaunchService, name: &str) -> Result<User> {
    let email = format!("{}@example.com", name.to_lowercase());
    Ok(service.register_user(NewUser::new(name, email)).await?)
}

/// Build a valid, unsaved launch for March 2024
pub fn launch_for(user: &User, description: &str, launch_type: LaunchType, cents: i64) -> Launch {
    Launch::new(
        description,
        3,
        2024,
        user.id,
        Amount::from_cents(cents),
        launch_type,
    )
}

/// Test fixture: a user with a typical month of launches
pub struct StandardLaunches;

impl StandardLaunches {
    /// Salary 3000.00, rent 1200.00, groceries 250.50, test refund 40.00 (income)
    pub async fn create_month(service: &LaunchService, user: &User) -> Result<()> {
        service
            .create(&launch_for(user, "Salary", LaunchType::Income, 300000))
            .await?;
        service
            .create(&launch_for(user, "Rent", LaunchType::Expense, 120000))
            .await?;
        service
            .create(&launch_for(user, "Groceries", LaunchType::Expense, 25050))
            .await?;
        service
            .create(&launch_for(user, "Test refund", LaunchType::Income, 4000))
            .await?;
        Ok(())
    }
}
