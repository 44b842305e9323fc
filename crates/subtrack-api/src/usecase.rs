//! [`SubscriptionUsecase`]: the per-operation pipelines between the HTTP
//! handlers and a [`SubscriptionStore`].
//!
//! Every operation parses its textual inputs, applies the entity invariants,
//! performs a single store call and formats the result. Errors are mapped to
//! [`ApiError`] here so handlers stay one-liners.

use std::sync::Arc;

use chrono::Utc;
use subtrack_core::{
  Month, Subscription,
  store::{PeriodQuery, StoreError, SubscriptionStore},
  subscription::validate,
};
use uuid::Uuid;

use crate::{
  dto::{
    CreateSubscriptionRequest, CreateSubscriptionResponse, ListSubscriptionsResponse,
    SubscriptionResponse, SummaryParams, SummaryResponse, UpdateSubscriptionRequest,
  },
  error::ApiError,
};

pub struct SubscriptionUsecase<S> {
  store: Arc<S>,
}

impl<S> Clone for SubscriptionUsecase<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: SubscriptionStore> SubscriptionUsecase<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub async fn create(
    &self,
    req: CreateSubscriptionRequest,
  ) -> Result<CreateSubscriptionResponse, ApiError> {
    let user_id = parse_uuid("user_id", &req.user_id)?;
    let start_date = parse_month("start_date", &req.start_date)?;
    let end_date = req
      .end_date
      .as_deref()
      .map(|s| parse_month("end_date", s))
      .transpose()?;

    let now = Utc::now();
    let sub = Subscription::new(req.service_name, req.price, user_id, start_date, end_date, now);
    validate(&sub, now).map_err(|e| ApiError::BadRequest(format!("validation failed: {e}")))?;

    let id = self
      .store
      .create(&sub)
      .await
      .map_err(|e| store_error("failed to create subscription", sub.id, e))?;

    tracing::info!(%id, user_id = %sub.user_id, "subscription created");
    Ok(CreateSubscriptionResponse { id })
  }

  pub async fn get(&self, id: &str) -> Result<SubscriptionResponse, ApiError> {
    let id = parse_uuid("id", id)?;
    self.fetch(id, "failed to get subscription").await.map(Into::into)
  }

  /// Merge the supplied fields into the stored record, re-validate the
  /// result and write it back.
  pub async fn update(
    &self,
    id: &str,
    req: UpdateSubscriptionRequest,
  ) -> Result<SubscriptionResponse, ApiError> {
    let id = parse_uuid("id", id)?;
    let mut sub = self.fetch(id, "failed to get subscription").await?;

    if let Some(name) = req.service_name.filter(|s| !s.is_empty()) {
      sub.service_name = name;
    }
    if let Some(price) = req.price.filter(|p| *p > 0) {
      sub.price = price;
    }
    if let Some(start) = req.start_date.as_deref().filter(|s| !s.is_empty()) {
      sub.start_date = parse_month("start_date", start)?;
    }
    match req.end_date.as_deref() {
      None => {}
      Some("") => sub.end_date = None,
      Some(end) => sub.end_date = Some(parse_month("end_date", end)?),
    }

    let now = Utc::now();
    sub.updated_at = now;
    validate(&sub, now).map_err(|e| ApiError::BadRequest(format!("validation failed: {e}")))?;

    self
      .store
      .update(&sub)
      .await
      .map_err(|e| store_error("failed to update subscription", id, e))?;

    tracing::info!(%id, "subscription updated");
    Ok(sub.into())
  }

  pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
    let id = parse_uuid("id", id)?;
    self
      .store
      .delete(id)
      .await
      .map_err(|e| store_error("failed to delete subscription", id, e))?;

    tracing::info!(%id, "subscription deleted");
    Ok(())
  }

  pub async fn list(&self, user_id: Option<&str>) -> Result<ListSubscriptionsResponse, ApiError> {
    let user_id = match user_id.filter(|s| !s.is_empty()) {
      Some(raw) => parse_uuid("user_id", raw)?,
      None => Uuid::nil(),
    };
    // Nil is the "no user" value, same as in the validator.
    if user_id.is_nil() {
      return Err(ApiError::BadRequest("user_id is required".into()));
    }

    let subs = self.store.list(Some(user_id)).await.map_err(|e| ApiError::Store {
      context: "failed to list subscriptions",
      source:  Box::new(e),
    })?;

    let list: Vec<SubscriptionResponse> = subs.into_iter().map(Into::into).collect();
    Ok(ListSubscriptionsResponse { total: list.len(), list })
  }

  /// Total price of every subscription whose period overlaps the requested
  /// window.
  pub async fn sum(&self, params: SummaryParams) -> Result<SummaryResponse, ApiError> {
    let start = match non_empty(params.start_date.as_deref()) {
      Some(raw) => parse_month("start_date", raw)?,
      None => return Err(ApiError::BadRequest("start_date is required".into())),
    };
    let end = non_empty(params.end_date.as_deref())
      .map(|raw| parse_month("end_date", raw))
      .transpose()?;
    let user_id = non_empty(params.user_id.as_deref())
      .map(|raw| parse_uuid("user_id", raw))
      .transpose()?;

    let query = PeriodQuery::starting(start)
      .with_end(end)
      .with_user(user_id)
      .with_service(params.service_name);

    let total = self
      .store
      .sum_for_period(&query)
      .await
      .map_err(|e| ApiError::Store {
        context: "failed to calculate subscriptions total",
        source:  Box::new(e),
      })?;

    tracing::debug!(?query, total, "summary computed");
    Ok(SummaryResponse { total })
  }

  async fn fetch(&self, id: Uuid, context: &'static str) -> Result<Subscription, ApiError> {
    self
      .store
      .get(id)
      .await
      .map_err(|e| store_error(context, id, e))?
      .ok_or_else(|| not_found(id))
  }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn non_empty(s: Option<&str>) -> Option<&str> { s.filter(|s| !s.is_empty()) }

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|e| ApiError::BadRequest(format!("invalid {field}: {e}")))
}

fn parse_month(field: &str, raw: &str) -> Result<Month, ApiError> {
  Month::parse(raw).map_err(|e| ApiError::BadRequest(format!("invalid {field}: {e}")))
}

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("subscription {id} not found")) }

fn store_error<E: StoreError>(context: &'static str, id: Uuid, e: E) -> ApiError {
  if e.is_not_found() {
    not_found(id)
  } else {
    ApiError::Store { context, source: Box::new(e) }
  }
}

#[cfg(test)]
mod tests {
  use subtrack_core::memory::MemoryStore;

  use super::*;

  fn usecase() -> SubscriptionUsecase<MemoryStore> {
    SubscriptionUsecase::new(Arc::new(MemoryStore::new()))
  }

  fn create_req(user_id: Uuid, end: Option<&str>) -> CreateSubscriptionRequest {
    CreateSubscriptionRequest {
      service_name: "Yandex Plus".into(),
      price:        400,
      user_id:      user_id.to_string(),
      start_date:   "07-2024".into(),
      end_date:     end.map(Into::into),
    }
  }

  fn month(s: &str) -> Month { Month::parse(s).unwrap() }

  #[tokio::test]
  async fn create_then_get() {
    let uc = usecase();
    let user = Uuid::new_v4();
    let id = uc.create(create_req(user, Some("12-2024"))).await.unwrap().id;

    let got = uc.get(&id.to_string()).await.unwrap();
    assert_eq!(got.id, id);
    assert_eq!(got.user_id, user);
    assert_eq!(got.start_date, month("07-2024"));
    assert_eq!(got.end_date, Some(month("12-2024")));
  }

  #[tokio::test]
  async fn create_rejects_empty_end_date() {
    let uc = usecase();
    let err = uc.create(create_req(Uuid::new_v4(), Some(""))).await.unwrap_err();
    assert!(matches!(&err, ApiError::BadRequest(m) if m.starts_with("invalid end_date")));

    let id = uc.create(create_req(Uuid::new_v4(), None)).await.unwrap().id;
    assert_eq!(uc.get(&id.to_string()).await.unwrap().end_date, None);
  }

  #[tokio::test]
  async fn create_rejects_bad_input() {
    let uc = usecase();

    let mut req = create_req(Uuid::new_v4(), None);
    req.user_id = "not-a-uuid".into();
    let err = uc.create(req).await.unwrap_err();
    assert!(matches!(&err, ApiError::BadRequest(m) if m.starts_with("invalid user_id")));

    let mut req = create_req(Uuid::new_v4(), None);
    req.start_date = "2024-07".into();
    let err = uc.create(req).await.unwrap_err();
    assert!(matches!(&err, ApiError::BadRequest(m) if m.starts_with("invalid start_date")));

    let mut req = create_req(Uuid::new_v4(), None);
    req.price = 0;
    let err = uc.create(req).await.unwrap_err();
    assert!(
      matches!(&err, ApiError::BadRequest(m) if m == "validation failed: price must be greater than 0")
    );

    let req = create_req(Uuid::new_v4(), Some("01-2024"));
    let err = uc.create(req).await.unwrap_err();
    assert!(
      matches!(&err, ApiError::BadRequest(m) if m.ends_with("end_date cannot be before start_date"))
    );
  }

  #[tokio::test]
  async fn get_unknown_and_malformed_ids() {
    let uc = usecase();
    assert!(matches!(
      uc.get(&Uuid::new_v4().to_string()).await,
      Err(ApiError::NotFound(_))
    ));
    assert!(matches!(uc.get("42").await, Err(ApiError::BadRequest(_))));
  }

  #[tokio::test]
  async fn update_price_only_keeps_other_fields() {
    let uc = usecase();
    let id = uc.create(create_req(Uuid::new_v4(), Some("12-2024"))).await.unwrap().id;

    let req = UpdateSubscriptionRequest { price: Some(550), ..Default::default() };
    let updated = uc.update(&id.to_string(), req).await.unwrap();
    assert_eq!(updated.price, 550);
    assert_eq!(updated.service_name, "Yandex Plus");
    assert_eq!(updated.start_date, month("07-2024"));
    assert_eq!(updated.end_date, Some(month("12-2024")));

    assert_eq!(uc.get(&id.to_string()).await.unwrap(), updated);
  }

  #[tokio::test]
  async fn update_ignores_empty_and_non_positive_values() {
    let uc = usecase();
    let id = uc.create(create_req(Uuid::new_v4(), None)).await.unwrap().id;

    let req = UpdateSubscriptionRequest {
      service_name: Some(String::new()),
      price: Some(-3),
      start_date: Some(String::new()),
      ..Default::default()
    };
    let updated = uc.update(&id.to_string(), req).await.unwrap();
    assert_eq!(updated.service_name, "Yandex Plus");
    assert_eq!(updated.price, 400);
    assert_eq!(updated.start_date, month("07-2024"));
  }

  #[tokio::test]
  async fn update_end_date_set_clear_and_keep() {
    let uc = usecase();
    let id = uc.create(create_req(Uuid::new_v4(), None)).await.unwrap().id.to_string();

    let set = UpdateSubscriptionRequest { end_date: Some("09-2024".into()), ..Default::default() };
    assert_eq!(uc.update(&id, set).await.unwrap().end_date, Some(month("09-2024")));

    let untouched = UpdateSubscriptionRequest { price: Some(1), ..Default::default() };
    assert_eq!(uc.update(&id, untouched).await.unwrap().end_date, Some(month("09-2024")));

    let clear = UpdateSubscriptionRequest { end_date: Some(String::new()), ..Default::default() };
    assert_eq!(uc.update(&id, clear).await.unwrap().end_date, None);
  }

  #[tokio::test]
  async fn update_revalidates_merged_record() {
    let uc = usecase();
    let id = uc.create(create_req(Uuid::new_v4(), None)).await.unwrap().id.to_string();

    let req = UpdateSubscriptionRequest { end_date: Some("01-2024".into()), ..Default::default() };
    assert!(matches!(uc.update(&id, req).await, Err(ApiError::BadRequest(_))));
    assert_eq!(uc.get(&id).await.unwrap().end_date, None);
  }

  #[tokio::test]
  async fn update_and_delete_unknown_are_not_found() {
    let uc = usecase();
    let id = Uuid::new_v4().to_string();
    assert!(matches!(
      uc.update(&id, UpdateSubscriptionRequest::default()).await,
      Err(ApiError::NotFound(_))
    ));
    assert!(matches!(uc.delete(&id).await, Err(ApiError::NotFound(_))));
  }

  #[tokio::test]
  async fn delete_removes_subscription() {
    let uc = usecase();
    let id = uc.create(create_req(Uuid::new_v4(), None)).await.unwrap().id.to_string();
    uc.delete(&id).await.unwrap();
    assert!(matches!(uc.get(&id).await, Err(ApiError::NotFound(_))));
  }

  #[tokio::test]
  async fn list_requires_user_and_reports_total() {
    let uc = usecase();
    let user = Uuid::new_v4();
    uc.create(create_req(user, None)).await.unwrap();
    uc.create(create_req(user, None)).await.unwrap();
    uc.create(create_req(Uuid::new_v4(), None)).await.unwrap();

    let listed = uc.list(Some(&user.to_string())).await.unwrap();
    assert_eq!(listed.total, 2);
    assert!(listed.list.iter().all(|s| s.user_id == user));

    let empty = uc.list(Some(&Uuid::new_v4().to_string())).await.unwrap();
    assert_eq!(empty, ListSubscriptionsResponse { total: 0, list: vec![] });

    assert!(matches!(uc.list(None).await, Err(ApiError::BadRequest(m)) if m == "user_id is required"));
    assert!(matches!(uc.list(Some("")).await, Err(ApiError::BadRequest(_))));
    assert!(matches!(
      uc.list(Some(&Uuid::nil().to_string())).await,
      Err(ApiError::BadRequest(m)) if m == "user_id is required"
    ));
  }

  #[tokio::test]
  async fn sum_over_window() {
    let uc = usecase();
    let user = Uuid::new_v4();
    let mut req = create_req(user, Some("03-2024"));
    req.start_date = "01-2024".into();
    req.price = 100;
    uc.create(req).await.unwrap();

    let feb = SummaryParams {
      start_date: Some("02-2024".into()),
      end_date: Some("02-2024".into()),
      ..Default::default()
    };
    assert_eq!(uc.sum(feb).await.unwrap().total, 100);

    let from_april = SummaryParams {
      user_id: Some(user.to_string()),
      start_date: Some("04-2024".into()),
      end_date: Some(String::new()),
      ..Default::default()
    };
    assert_eq!(uc.sum(from_april).await.unwrap().total, 0);
  }

  #[tokio::test]
  async fn sum_requires_valid_start_date() {
    let uc = usecase();
    assert!(matches!(
      uc.sum(SummaryParams::default()).await,
      Err(ApiError::BadRequest(m)) if m == "start_date is required"
    ));

    let bad = SummaryParams { start_date: Some("13-2024".into()), ..Default::default() };
    assert!(matches!(uc.sum(bad).await, Err(ApiError::BadRequest(_))));

    let bad_user = SummaryParams {
      user_id: Some("nope".into()),
      start_date: Some("01-2024".into()),
      ..Default::default()
    };
    assert!(matches!(uc.sum(bad_user).await, Err(ApiError::BadRequest(_))));
  }
}
