use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Amount, User, UserId};

pub type LaunchId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaunchType {
    /// Money coming in; adds to the balance
    Income,
    /// Money going out; subtracts from the balance
    Expense,
}

impl LaunchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchType::Income => "INCOME",
            LaunchType::Expense => "EXPENSE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "INCOME" => Some(LaunchType::Income),
            "EXPENSE" => Some(LaunchType::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for LaunchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaunchStatus {
    #[default]
    Pending,
    Settled,
    Cancelled,
}

impl LaunchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchStatus::Pending => "PENDING",
            LaunchStatus::Settled => "SETTLED",
            LaunchStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Some(LaunchStatus::Pending),
            "SETTLED" => Some(LaunchStatus::Settled),
            "CANCELLED" => Some(LaunchStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for LaunchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The user a launch belongs to: an identity, optionally with a resolved snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Owner {
    pub fn new(id: UserId) -> Self {
        Self {
            id: Some(id),
            user: None,
        }
    }

    pub fn resolved(user: User) -> Self {
        Self {
            id: Some(user.id),
            user: Some(user),
        }
    }
}

/// A single income or expense entry.
///
/// Fields are optional because a launch may arrive incomplete from the outside;
/// [`crate::domain::validate`] decides whether it can be stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launch {
    /// Assigned by the store on first save, never changed afterwards
    pub id: Option<LaunchId>,
    pub description: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub owner: Option<Owner>,
    pub amount: Option<Amount>,
    pub launch_type: Option<LaunchType>,
    pub status: LaunchStatus,
    /// Set by the store at creation when left empty
    pub registered_on: Option<NaiveDate>,
}

impl Launch {
    /// Create a transient launch with every required field populated.
    pub fn new(
        description: impl Into<String>,
        month: u32,
        year: i32,
        owner: UserId,
        amount: Amount,
        launch_type: LaunchType,
    ) -> Self {
        Self {
            id: None,
            description: Some(description.into()),
            month: Some(month),
            year: Some(year),
            owner: Some(Owner::new(owner)),
            amount: Some(amount),
            launch_type: Some(launch_type),
            status: LaunchStatus::Pending,
            registered_on: None,
        }
    }

    pub fn with_status(mut self, status: LaunchStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_id(mut self, id: LaunchId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn owner_id(&self) -> Option<UserId> {
        self.owner.as_ref().and_then(|o| o.id)
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Search criteria for launches. Unset fields match anything.
///
/// The description matches case-insensitively as a substring; every other
/// populated field must be equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchFilter {
    pub description: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub owner: Option<UserId>,
    pub launch_type: Option<LaunchType>,
    pub status: Option<LaunchStatus>,
}

impl LaunchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn owner(mut self, user_id: UserId) -> Self {
        self.owner = Some(user_id);
        self
    }

    pub fn launch_type(mut self, launch_type: LaunchType) -> Self {
        self.launch_type = Some(launch_type);
        self
    }

    pub fn status(mut self, status: LaunchStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, launch: &Launch) -> bool {
        if let Some(needle) = &self.description {
            let Some(text) = &launch.description else {
                return false;
            };
            if !text.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }

        fn field_matches<T: PartialEq>(wanted: Option<T>, actual: Option<T>) -> bool {
            wanted.is_none_or(|w| actual == Some(w))
        }

        field_matches(self.month, launch.month)
            && field_matches(self.year, launch.year)
            && field_matches(self.owner, launch.owner_id())
            && field_matches(self.launch_type, launch.launch_type)
            && field_matches(self.status, Some(launch.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Launch {
        Launch::new(
            "Monthly Test Payment",
            3,
            2024,
            7,
            Amount::from_cents(1500),
            LaunchType::Expense,
        )
    }

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!(LaunchStatus::from_str("settled"), Some(LaunchStatus::Settled));
        assert_eq!(LaunchStatus::from_str(" CANCELLED "), Some(LaunchStatus::Cancelled));
        assert_eq!(LaunchStatus::from_str("EFFECTIVE"), None);
        assert_eq!(LaunchType::from_str("income"), Some(LaunchType::Income));
        assert_eq!(LaunchType::from_str("transfer"), None);
    }

    #[test]
    fn test_new_launch_is_transient_and_pending() {
        let launch = sample();
        assert!(!launch.is_persisted());
        assert_eq!(launch.status, LaunchStatus::Pending);
        assert_eq!(launch.owner_id(), Some(7));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(LaunchFilter::new().matches(&sample()));
        assert!(LaunchFilter::new().matches(&Launch::default()));
    }

    #[test]
    fn test_description_is_case_insensitive_substring() {
        let launch = sample();
        assert!(LaunchFilter::new().description("test").matches(&launch));
        assert!(LaunchFilter::new().description("MONTHLY").matches(&launch));
        assert!(!LaunchFilter::new().description("rent").matches(&launch));
        assert!(!LaunchFilter::new().description("test").matches(&Launch::default()));
    }

    #[test]
    fn test_exact_fields() {
        let launch = sample();
        assert!(LaunchFilter::new().month(3).year(2024).owner(7).matches(&launch));
        assert!(!LaunchFilter::new().month(4).matches(&launch));
        assert!(!LaunchFilter::new().owner(8).matches(&launch));
        assert!(!LaunchFilter::new().launch_type(LaunchType::Income).matches(&launch));
        assert!(LaunchFilter::new().status(LaunchStatus::Pending).matches(&launch));
        assert!(!LaunchFilter::new().status(LaunchStatus::Settled).matches(&launch));
    }
}
