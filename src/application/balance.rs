use crate::domain::{Amount, LaunchType, UserId};
use crate::storage::LaunchStore;

use super::AppError;

/// Income minus expenses for a user, from two store-side sums.
///
/// A type without launches counts as zero. The result may be negative.
pub async fn compute_balance<S>(store: &S, user_id: UserId) -> Result<Amount, AppError>
where
    S: LaunchStore + ?Sized,
{
    let income = store
        .sum_amount_by_user_and_type(user_id, LaunchType::Income)
        .await?
        .unwrap_or(Amount::ZERO);
    let expense = store
        .sum_amount_by_user_and_type(user_id, LaunchType::Expense)
        .await?
        .unwrap_or(Amount::ZERO);

    Ok(income - expense)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use async_trait::async_trait;

    use super::*;
    use crate::domain::{Launch, LaunchFilter, LaunchId};

    /// Answers the two aggregate queries with fixed sums and nothing else.
    struct FixedSums {
        income: Option<Amount>,
        expense: Option<Amount>,
    }

    #[async_trait]
    impl LaunchStore for FixedSums {
        async fn create(&self, _launch: &Launch) -> Result<Launch> {
            unreachable!("balance never writes")
        }

        async fn update(&self, _launch: &Launch) -> Result<Launch> {
            unreachable!("balance never writes")
        }

        async fn delete(&self, _id: LaunchId) -> Result<()> {
            unreachable!("balance never writes")
        }

        async fn find_by_id(&self, _id: LaunchId) -> Result<Option<Launch>> {
            unreachable!("balance never loads rows")
        }

        async fn find_matching(&self, _filter: &LaunchFilter) -> Result<Vec<Launch>> {
            unreachable!("balance never loads rows")
        }

        async fn sum_amount_by_user_and_type(
            &self,
            _user_id: UserId,
            launch_type: LaunchType,
        ) -> Result<Option<Amount>> {
            Ok(match launch_type {
                LaunchType::Income => self.income,
                LaunchType::Expense => self.expense,
            })
        }
    }

    #[tokio::test]
    async fn test_income_minus_expense() {
        let store = FixedSums {
            income: Some(Amount::from_cents(10000)),
            expense: Some(Amount::from_cents(4000)),
        };
        let balance = compute_balance(&store, 1).await.unwrap();
        assert_eq!(balance, Amount::from_cents(6000));
    }

    #[tokio::test]
    async fn test_missing_sums_count_as_zero() {
        let store = FixedSums {
            income: None,
            expense: None,
        };
        assert_eq!(compute_balance(&store, 1).await.unwrap(), Amount::ZERO);

        let only_expenses = FixedSums {
            income: None,
            expense: Some(Amount::from_cents(2550)),
        };
        assert_eq!(
            compute_balance(&only_expenses, 1).await.unwrap(),
            Amount::from_cents(-2550)
        );
    }
}
