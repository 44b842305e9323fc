//! [`MemoryStore`], a process-local [`SubscriptionStore`].
//!
//! Evaluates the overlap-sum in Rust via [`PeriodQuery::matches`]. Used as a
//! substitute backend in tests of the layers above the store.

use std::{
  collections::HashMap,
  sync::{Arc, RwLock},
};

use uuid::Uuid;

use crate::{
  Error, Result,
  store::{PeriodQuery, SubscriptionStore},
  subscription::Subscription,
};

/// Clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  rows: Arc<RwLock<HashMap<Uuid, Subscription>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl SubscriptionStore for MemoryStore {
  type Error = Error;

  async fn create(&self, subscription: &Subscription) -> Result<Uuid> {
    let mut rows = self.rows.write().map_err(|_| Error::Poisoned)?;
    if rows.contains_key(&subscription.id) {
      return Err(Error::Duplicate(subscription.id));
    }
    rows.insert(subscription.id, subscription.clone());
    Ok(subscription.id)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Subscription>> {
    let rows = self.rows.read().map_err(|_| Error::Poisoned)?;
    Ok(rows.get(&id).cloned())
  }

  async fn update(&self, subscription: &Subscription) -> Result<()> {
    let mut rows = self.rows.write().map_err(|_| Error::Poisoned)?;
    let row = rows
      .get_mut(&subscription.id)
      .ok_or(Error::NotFound(subscription.id))?;

    row.service_name = subscription.service_name.clone();
    row.price = subscription.price;
    row.start_date = subscription.start_date;
    row.end_date = subscription.end_date;
    row.updated_at = subscription.updated_at;
    Ok(())
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    let mut rows = self.rows.write().map_err(|_| Error::Poisoned)?;
    rows.remove(&id).map(|_| ()).ok_or(Error::NotFound(id))
  }

  async fn list(&self, user_id: Option<Uuid>) -> Result<Vec<Subscription>> {
    let rows = self.rows.read().map_err(|_| Error::Poisoned)?;
    let mut subs: Vec<Subscription> = rows
      .values()
      .filter(|s| user_id.is_none_or(|id| s.user_id == id))
      .cloned()
      .collect();
    subs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(subs)
  }

  async fn sum_for_period(&self, query: &PeriodQuery) -> Result<i64> {
    let rows = self.rows.read().map_err(|_| Error::Poisoned)?;
    rows
      .values()
      .filter(|s| query.matches(s))
      .try_fold(0i64, |acc, s| acc.checked_add(s.price))
      .ok_or(Error::Overflow)
  }
}
