use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::crawler::ProductUrl;
use crate::db::entity::{ product, tracking };
use crate::db::{ ConditionRepository, ProductRepository, TrackingRepository, UserRepository };
use crate::enums::Condition;
use crate::error::{ AppError, Result };
use crate::services::CatalogService;
use crate::utils::with_timeout;

/// Condition attached to every new member.
pub const DEFAULT_CONDITION: Condition = Condition::LessThan;

/// Track / untrack transitions.
///
/// Every multi-step transition undoes its earlier steps when a later one fails,
/// so a user is never left a member without a condition (or the reverse).
pub struct TrackingService {
    catalog: Arc<CatalogService>,
    users: UserRepository,
    products: ProductRepository,
    trackings: TrackingRepository,
    conditions: ConditionRepository,
    store_timeout: Duration,
}

impl TrackingService {
    pub fn new(
        catalog: Arc<CatalogService>,
        users: UserRepository,
        products: ProductRepository,
        trackings: TrackingRepository,
        conditions: ConditionRepository,
        store_timeout: Duration
    ) -> Self {
        Self {
            catalog,
            users,
            products,
            trackings,
            conditions,
            store_timeout,
        }
    }

    async fn store<T, F>(&self, what: &str, fut: F) -> Result<T> where F: Future<Output = Result<T>> {
        with_timeout(self.store_timeout, what, fut).await
    }

    /// Resolve the product behind `source_url` and subscribe `user_id` to it.
    pub async fn track(&self, user_id: Uuid, source_url: &str) -> Result<tracking::Model> {
        let url = ProductUrl::parse(source_url)?;

        if self.store("find user", self.users.find_by_id(user_id)).await?.is_none() {
            return Err(AppError::InvalidInput(format!("Unknown user: {}", user_id)));
        }

        let product = self.resolve_product(url).await?;

        let existing = self.store(
            "find tracking",
            self.trackings.find_by_external_id(url.item_id)
        ).await?;

        match existing {
            None => self.track_new(user_id, &product, source_url).await,
            Some(record) => self.track_existing(user_id, record, &product).await,
        }
    }

    async fn resolve_product(&self, url: ProductUrl) -> Result<product::Model> {
        let stored = self.store(
            "find product",
            self.products.find_by_external_id(url.item_id)
        ).await?;

        match stored {
            Some(product) => Ok(product),
            None => self.catalog.import_product(url).await,
        }
    }

    async fn track_new(
        &self,
        user_id: Uuid,
        product: &product::Model,
        source_url: &str
    ) -> Result<tracking::Model> {
        let created = self.store(
            "create tracking",
            self.trackings.create(product.external_id, Some(product.id), source_url.to_string())
        ).await;
        let record = match created {
            Ok(record) => record,
            Err(e) if e.is_unique_violation() => {
                // Lost the race to another first tracker; join their record
                let existing = self.store(
                    "find tracking",
                    self.trackings.find_by_external_id(product.external_id)
                ).await?;
                return match existing {
                    Some(record) => self.track_existing(user_id, record, product).await,
                    None => Err(e),
                };
            }
            Err(e) => {
                return Err(e);
            }
        };

        if let Err(e) = self.store("add member", self.trackings.add_member(record.id, user_id)).await {
            // A concurrent call for the same user already joined this record, keep it
            if e.is_unique_violation() {
                return Err(AppError::AlreadyTracking);
            }
            self.undo("delete tracking", record.id, self.trackings.delete(record.id)).await;
            return Err(e);
        }

        if
            let Err(e) = self.store(
                "insert condition",
                self.conditions.insert(record.id, user_id, DEFAULT_CONDITION)
            ).await
        {
            self.undo("remove member", record.id, async {
                self.trackings.remove_member(record.id, user_id).await.map(|_| ())
            }).await;
            self.undo("delete tracking", record.id, self.trackings.delete(record.id)).await;
            return Err(e);
        }

        tracing::info!(tracking_id = %record.id, %user_id, external_id = record.external_id, "tracking created");
        Ok(record)
    }

    async fn track_existing(
        &self,
        user_id: Uuid,
        record: tracking::Model,
        product: &product::Model
    ) -> Result<tracking::Model> {
        let record = if record.product_id.is_none() {
            self.store("attach product", self.trackings.attach_product(record, product.id)).await?
        } else {
            record
        };

        if !record.status {
            return Err(AppError::TrackingSuspended);
        }

        if self.store("check member", self.trackings.is_member(record.id, user_id)).await? {
            return Err(AppError::AlreadyTracking);
        }

        match self.store("add member", self.trackings.add_member(record.id, user_id)).await {
            Ok(_) => {}
            // A concurrent request for the same user got there first
            Err(e) if e.is_unique_violation() => {
                return Err(AppError::AlreadyTracking);
            }
            Err(e) => {
                return Err(e);
            }
        }

        if
            let Err(e) = self.store(
                "insert condition",
                self.conditions.insert(record.id, user_id, DEFAULT_CONDITION)
            ).await
        {
            self.undo("remove member", record.id, async {
                self.trackings.remove_member(record.id, user_id).await.map(|_| ())
            }).await;
            return Err(e);
        }

        tracing::info!(tracking_id = %record.id, %user_id, "member added to tracking");
        Ok(record)
    }

    /// Drop the user's membership and soft-deactivate their conditions.
    /// The record itself is kept even when it has no members left.
    pub async fn untrack(&self, user_id: Uuid, tracking_id: Uuid) -> Result<()> {
        self.store("find tracking", self.trackings.find_by_id(tracking_id)).await?.ok_or(
            AppError::TrackingNotFound
        )?;

        let removed = self.store(
            "remove member",
            self.trackings.remove_member(tracking_id, user_id)
        ).await?;
        if !removed {
            return Err(AppError::TrackingNotFound);
        }

        match
            self.store(
                "deactivate conditions",
                self.conditions.deactivate_for_member(tracking_id, user_id)
            ).await
        {
            Ok(count) => {
                tracing::info!(%tracking_id, %user_id, deactivated = count, "member removed from tracking");
                Ok(())
            }
            Err(e) => {
                self.undo("restore member", tracking_id, async {
                    self.trackings.add_member(tracking_id, user_id).await.map(|_| ())
                }).await;
                Err(e)
            }
        }
    }

    /// Flip the suspension flag. Suspended records reject new members.
    pub async fn set_status(&self, tracking_id: Uuid, active: bool) -> Result<tracking::Model> {
        let record = self.store("set status", self.trackings.set_status(tracking_id, active)).await?;
        tracing::info!(%tracking_id, active, "tracking status changed");
        Ok(record)
    }

    /// Run a compensating step. Its own failure is logged; the original error wins.
    async fn undo<F>(&self, what: &str, tracking_id: Uuid, fut: F) where F: Future<Output = Result<()>> {
        if let Err(e) = self.store(what, fut).await {
            tracing::error!(%tracking_id, step = what, error = %e, "rollback failed");
        }
    }
}
