use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    Amount, Launch, LaunchFilter, LaunchId, LaunchType, NewUser, Owner, User, UserId,
};

use super::{LaunchStore, UserStore};

#[derive(Default)]
struct Tables {
    launches: BTreeMap<LaunchId, Launch>,
    users: BTreeMap<UserId, User>,
    last_launch_id: LaunchId,
    last_user_id: UserId,
}

/// A process-local store, useful for embedding and tests.
///
/// Identities are assigned from 1 upwards and never reused.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))
    }
}

impl Tables {
    /// Attach the owner's user record when it is known.
    fn with_owner_snapshot(&self, mut launch: Launch) -> Launch {
        if let Some(user) = launch.owner_id().and_then(|id| self.users.get(&id)) {
            launch.owner = Some(Owner::resolved(user.clone()));
        }
        launch
    }

    fn store(&mut self, id: LaunchId, launch: &Launch) -> Launch {
        let mut stored = launch.clone();
        stored.id = Some(id);
        stored.registered_on = self
            .launches
            .get(&id)
            .and_then(|existing| existing.registered_on)
            .or(launch.registered_on)
            .or_else(|| Some(Utc::now().date_naive()));
        self.launches.insert(id, stored.clone());
        self.with_owner_snapshot(stored)
    }
}

#[async_trait]
impl LaunchStore for MemoryStore {
    async fn create(&self, launch: &Launch) -> Result<Launch> {
        let mut tables = self.tables()?;
        tables.last_launch_id += 1;
        let id = tables.last_launch_id;
        Ok(tables.store(id, launch))
    }

    async fn update(&self, launch: &Launch) -> Result<Launch> {
        let id = launch
            .id
            .ok_or_else(|| anyhow!("Cannot update a launch without identity"))?;
        let mut tables = self.tables()?;
        tables.last_launch_id = tables.last_launch_id.max(id);
        Ok(tables.store(id, launch))
    }

    async fn delete(&self, id: LaunchId) -> Result<()> {
        self.tables()?.launches.remove(&id);
        Ok(())
    }

    async fn find_by_id(&self, id: LaunchId) -> Result<Option<Launch>> {
        let tables = self.tables()?;
        Ok(tables
            .launches
            .get(&id)
            .cloned()
            .map(|l| tables.with_owner_snapshot(l)))
    }

    async fn find_matching(&self, filter: &LaunchFilter) -> Result<Vec<Launch>> {
        let tables = self.tables()?;
        let mut found: Vec<Launch> = tables
            .launches
            .values()
            .filter(|l| filter.matches(l))
            .cloned()
            .map(|l| tables.with_owner_snapshot(l))
            .collect();
        found.sort_by_key(|l| (l.year, l.month, l.id));
        Ok(found)
    }

    async fn sum_amount_by_user_and_type(
        &self,
        user_id: UserId,
        launch_type: LaunchType,
    ) -> Result<Option<Amount>> {
        let tables = self.tables()?;
        let mut amounts = tables
            .launches
            .values()
            .filter(|l| l.owner_id() == Some(user_id) && l.launch_type == Some(launch_type))
            .filter_map(|l| l.amount)
            .peekable();

        if amounts.peek().is_none() {
            return Ok(None);
        }
        let total = amounts
            .try_fold(Amount::ZERO, Amount::checked_add)
            .ok_or_else(|| anyhow!("Sum of {launch_type} amounts for user {user_id} overflows"))?;
        Ok(Some(total))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut tables = self.tables()?;
        tables.last_user_id += 1;
        let stored = User {
            id: tables.last_user_id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: Utc::now(),
        };
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.tables()?.users.get(&id).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.tables()?.users.values().any(|u| u.email == email))
    }
}
