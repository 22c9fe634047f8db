use thiserror::Error;

use super::Launch;

/// The first business rule a launch breaks. The message is meant for direct display.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid description")]
    InvalidDescription,

    #[error("invalid month")]
    InvalidMonth,

    #[error("invalid year")]
    InvalidYear,

    #[error("owner required")]
    OwnerRequired,

    #[error("invalid amount")]
    InvalidAmount,

    #[error("type required")]
    TypeRequired,
}

/// Check a launch against the field rules, reporting only the first one violated.
///
/// Identity, status and registration date are not looked at.
pub fn validate(launch: &Launch) -> Result<(), ValidationError> {
    if launch
        .description
        .as_deref()
        .is_none_or(|d| d.trim().is_empty())
    {
        return Err(ValidationError::InvalidDescription);
    }

    if launch.month.is_none_or(|m| !(1..=12).contains(&m)) {
        return Err(ValidationError::InvalidMonth);
    }

    // Four decimal digits, not a calendar check; negatives never qualify
    if launch.year.is_none_or(|y| !(1000..=9999).contains(&y)) {
        return Err(ValidationError::InvalidYear);
    }

    if launch.owner_id().is_none() {
        return Err(ValidationError::OwnerRequired);
    }

    if launch.amount.is_none_or(|a| !a.is_positive()) {
        return Err(ValidationError::InvalidAmount);
    }

    if launch.launch_type.is_none() {
        return Err(ValidationError::TypeRequired);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Amount, LaunchStatus, LaunchType, Owner};

    fn valid_launch() -> Launch {
        Launch::new(
            "Salary",
            1,
            2024,
            1,
            Amount::from_cents(250000),
            LaunchType::Income,
        )
    }

    #[test]
    fn test_valid_launch_passes() {
        assert_eq!(validate(&valid_launch()), Ok(()));
    }

    #[test]
    fn test_reports_first_violation_in_order() {
        let mut launch = Launch {
            description: Some(String::new()),
            month: Some(0),
            year: Some(0),
            owner: None,
            amount: Some(Amount::ZERO),
            launch_type: None,
            ..Launch::default()
        };
        assert_eq!(validate(&launch), Err(ValidationError::InvalidDescription));

        launch.description = Some("some description".into());
        assert_eq!(validate(&launch), Err(ValidationError::InvalidMonth));

        launch.month = Some(2);
        assert_eq!(validate(&launch), Err(ValidationError::InvalidYear));

        launch.year = Some(2022);
        assert_eq!(validate(&launch), Err(ValidationError::OwnerRequired));

        launch.owner = Some(Owner::new(2));
        assert_eq!(validate(&launch), Err(ValidationError::InvalidAmount));

        launch.amount = Some(Amount::from_cents(100));
        assert_eq!(validate(&launch), Err(ValidationError::TypeRequired));

        launch.launch_type = Some(LaunchType::Expense);
        assert_eq!(validate(&launch), Ok(()));
    }

    #[test]
    fn test_whitespace_description_is_invalid() {
        for text in ["", " ", "\t\n  "] {
            let mut launch = valid_launch();
            launch.description = Some(text.into());
            assert_eq!(validate(&launch), Err(ValidationError::InvalidDescription));
        }

        let mut launch = valid_launch();
        launch.description = None;
        assert_eq!(validate(&launch), Err(ValidationError::InvalidDescription));
    }

    #[test]
    fn test_month_bounds() {
        for month in [None, Some(0), Some(13), Some(100)] {
            let mut launch = valid_launch();
            launch.month = month;
            assert_eq!(validate(&launch), Err(ValidationError::InvalidMonth));
        }
        for month in 1..=12 {
            let mut launch = valid_launch();
            launch.month = Some(month);
            assert_eq!(validate(&launch), Ok(()));
        }
    }

    #[test]
    fn test_year_needs_four_digits() {
        for year in [None, Some(0), Some(999), Some(10000), Some(-2024), Some(-999)] {
            let mut launch = valid_launch();
            launch.year = year;
            assert_eq!(validate(&launch), Err(ValidationError::InvalidYear));
        }
        for year in [1000, 2022, 9999] {
            let mut launch = valid_launch();
            launch.year = Some(year);
            assert_eq!(validate(&launch), Ok(()));
        }
    }

    #[test]
    fn test_owner_needs_identity() {
        let mut launch = valid_launch();
        launch.owner = Some(Owner::default());
        assert_eq!(validate(&launch), Err(ValidationError::OwnerRequired));
    }

    #[test]
    fn test_amount_must_be_positive() {
        for amount in [None, Some(Amount::ZERO), Some(Amount::from_cents(-1))] {
            let mut launch = valid_launch();
            launch.amount = amount;
            assert_eq!(validate(&launch), Err(ValidationError::InvalidAmount));
        }
    }

    #[test]
    fn test_status_and_identity_are_ignored() {
        let launch = valid_launch()
            .with_id(42)
            .with_status(LaunchStatus::Cancelled);
        assert_eq!(validate(&launch), Ok(()));
    }

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::InvalidDescription.to_string(), "invalid description");
        assert_eq!(ValidationError::OwnerRequired.to_string(), "owner required");
        assert_eq!(ValidationError::TypeRequired.to_string(), "type required");
    }
}
