use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::domain::{
    Amount, Launch, LaunchFilter, LaunchId, LaunchStatus, LaunchType, NewUser, Owner, User,
    UserId,
};

use super::{LaunchStore, UserStore, MIGRATION_001_INITIAL};

const SELECT_LAUNCH: &str = r#"
    SELECT l.id, l.description, l.month, l.year, l.user_id, l.amount_cents, l.launch_type,
           l.status, l.registered_on,
           u.name AS user_name, u.email AS user_email, u.created_at AS user_created_at
    FROM launches l
    LEFT JOIN users u ON u.id = l.user_id
"#;

/// SQLite-backed store for users and launches.
pub struct Repository {
    pool: SqlitePool,
}

/// The columns of a launch row, extracted from a validated [`Launch`].
struct LaunchColumns<'a> {
    description: &'a str,
    month: u32,
    year: i32,
    user_id: UserId,
    amount_cents: i64,
    launch_type: &'static str,
    status: &'static str,
    registered_on: String,
}

impl<'a> LaunchColumns<'a> {
    fn from_launch(launch: &'a Launch) -> Result<Self> {
        Ok(Self {
            description: launch
                .description
                .as_deref()
                .context("Launch has no description")?,
            month: launch.month.context("Launch has no month")?,
            year: launch.year.context("Launch has no year")?,
            user_id: launch.owner_id().context("Launch has no owner")?,
            amount_cents: launch.amount.context("Launch has no amount")?.cents(),
            launch_type: launch.launch_type.context("Launch has no type")?.as_str(),
            status: launch.status.as_str(),
            registered_on: launch
                .registered_on
                .unwrap_or_else(|| Utc::now().date_naive())
                .to_string(),
        })
    }
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database.
    /// The file is created only when the URL carries `mode=rwc`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    async fn fetch_launch(conn: &mut SqliteConnection, id: LaunchId) -> Result<Option<Launch>> {
        let query = format!("{SELECT_LAUNCH} WHERE l.id = ?");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
            .context("Failed to fetch launch")?;

        row.as_ref().map(Self::row_to_launch).transpose()
    }

    fn row_to_launch(row: &SqliteRow) -> Result<Launch> {
        let user_id: UserId = row.get("user_id");
        let month: i64 = row.get("month");
        let amount_cents: i64 = row.get("amount_cents");
        let type_str: String = row.get("launch_type");
        let status_str: String = row.get("status");
        let registered_on_str: String = row.get("registered_on");
        let user_name: Option<String> = row.get("user_name");
        let user_email: Option<String> = row.get("user_email");
        let user_created_at: Option<String> = row.get("user_created_at");

        let owner = match (user_name, user_email, user_created_at) {
            (Some(name), Some(email), Some(created_at)) => Owner::resolved(User {
                id: user_id,
                name,
                email,
                created_at: parse_timestamp(&created_at)?,
            }),
            _ => Owner::new(user_id),
        };

        Ok(Launch {
            id: Some(row.get("id")),
            description: Some(row.get("description")),
            month: Some(u32::try_from(month).context("Invalid month")?),
            year: Some(row.get("year")),
            owner: Some(owner),
            amount: Some(Amount::from_cents(amount_cents)),
            launch_type: Some(
                LaunchType::from_str(&type_str)
                    .ok_or_else(|| anyhow::anyhow!("Invalid launch type: {}", type_str))?,
            ),
            status: LaunchStatus::from_str(&status_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid launch status: {}", status_str))?,
            registered_on: Some(
                NaiveDate::parse_from_str(&registered_on_str, "%Y-%m-%d")
                    .context("Invalid registered_on date")?,
            ),
        })
    }

    fn row_to_user(row: &SqliteRow) -> Result<User> {
        let created_at_str: String = row.get("created_at");
        Ok(User {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            created_at: parse_timestamp(&created_at_str)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .context("Invalid created_at timestamp")?
        .with_timezone(&Utc))
}

#[async_trait]
impl LaunchStore for Repository {
    async fn create(&self, launch: &Launch) -> Result<Launch> {
        let columns = LaunchColumns::from_launch(launch)?;
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let row = sqlx::query(
            r#"
            INSERT INTO launches (description, month, year, user_id, amount_cents, launch_type, status, registered_on)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(columns.description)
        .bind(columns.month)
        .bind(columns.year)
        .bind(columns.user_id)
        .bind(columns.amount_cents)
        .bind(columns.launch_type)
        .bind(columns.status)
        .bind(&columns.registered_on)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to save launch")?;

        let id: LaunchId = row.get("id");
        let stored = Self::fetch_launch(&mut *tx, id)
            .await?
            .context("Launch vanished after insert")?;
        tx.commit().await.context("Failed to commit launch")?;

        debug!(id, user_id = columns.user_id, "Inserted launch");
        Ok(stored)
    }

    async fn update(&self, launch: &Launch) -> Result<Launch> {
        let id = launch.id.context("Cannot update a launch without identity")?;
        let columns = LaunchColumns::from_launch(launch)?;
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        // registered_on is kept from the first insert
        sqlx::query(
            r#"
            INSERT INTO launches (id, description, month, year, user_id, amount_cents, launch_type, status, registered_on)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                description = excluded.description,
                month = excluded.month,
                year = excluded.year,
                user_id = excluded.user_id,
                amount_cents = excluded.amount_cents,
                launch_type = excluded.launch_type,
                status = excluded.status
            "#,
        )
        .bind(id)
        .bind(columns.description)
        .bind(columns.month)
        .bind(columns.year)
        .bind(columns.user_id)
        .bind(columns.amount_cents)
        .bind(columns.launch_type)
        .bind(columns.status)
        .bind(&columns.registered_on)
        .execute(&mut *tx)
        .await
        .context("Failed to update launch")?;

        let stored = Self::fetch_launch(&mut *tx, id)
            .await?
            .context("Launch vanished after update")?;
        tx.commit().await.context("Failed to commit launch")?;

        debug!(id, status = columns.status, "Updated launch");
        Ok(stored)
    }

    async fn delete(&self, id: LaunchId) -> Result<()> {
        let result = sqlx::query("DELETE FROM launches WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete launch")?;

        debug!(id, rows = result.rows_affected(), "Deleted launch");
        Ok(())
    }

    async fn find_by_id(&self, id: LaunchId) -> Result<Option<Launch>> {
        let mut conn = self.pool.acquire().await.context("Failed to acquire connection")?;
        Self::fetch_launch(&mut *conn, id).await
    }

    async fn find_matching(&self, filter: &LaunchFilter) -> Result<Vec<Launch>> {
        // Build query dynamically based on filters
        let mut query = format!("{SELECT_LAUNCH} WHERE 1=1");

        if filter.month.is_some() {
            query.push_str(" AND l.month = ?");
        }
        if filter.year.is_some() {
            query.push_str(" AND l.year = ?");
        }
        if filter.owner.is_some() {
            query.push_str(" AND l.user_id = ?");
        }
        if filter.launch_type.is_some() {
            query.push_str(" AND l.launch_type = ?");
        }
        if filter.status.is_some() {
            query.push_str(" AND l.status = ?");
        }

        query.push_str(" ORDER BY l.year, l.month, l.id");

        let mut sql_query = sqlx::query(&query);

        if let Some(month) = filter.month {
            sql_query = sql_query.bind(month);
        }
        if let Some(year) = filter.year {
            sql_query = sql_query.bind(year);
        }
        if let Some(owner) = filter.owner {
            sql_query = sql_query.bind(owner);
        }
        if let Some(launch_type) = filter.launch_type {
            sql_query = sql_query.bind(launch_type.as_str());
        }
        if let Some(status) = filter.status {
            sql_query = sql_query.bind(status.as_str());
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to search launches")?;

        // SQLite only folds ASCII case, so the description is matched here.
        let mut found = Vec::with_capacity(rows.len());
        for row in &rows {
            let launch = Self::row_to_launch(row)?;
            if filter.matches(&launch) {
                found.push(launch);
            }
        }

        debug!(count = found.len(), ?filter, "Searched launches");
        Ok(found)
    }

    async fn sum_amount_by_user_and_type(
        &self,
        user_id: UserId,
        launch_type: LaunchType,
    ) -> Result<Option<Amount>> {
        let row = sqlx::query(
            r#"
            SELECT SUM(amount_cents) as total
            FROM launches
            WHERE user_id = ? AND launch_type = ?
            "#,
        )
        .bind(user_id)
        .bind(launch_type.as_str())
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum launch amounts")?;

        let total: Option<i64> = row.get("total");
        Ok(total.map(Amount::from_cents))
    }
}

#[async_trait]
impl UserStore for Repository {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (name, email, created_at)
            VALUES (?, ?, ?)
            RETURNING id, name, email, created_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .context("Failed to save user")?;

        let stored = Self::row_to_user(&row)?;
        debug!(id = stored.id, "Inserted user");
        Ok(stored)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user")?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check email")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }
}
