//! Order Repository

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Order, OrderCreate};

const ORDER_TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a new order (coordinator only)
    pub async fn create(&self, data: OrderCreate) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(data).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        Ok(order)
    }

    /// Orders placed by a customer, newest first
    pub async fn find_by_customer(&self, customer: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE customer = $customer ORDER BY created_at DESC")
            .bind(("customer", customer.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Remove an order. Rollback path only, never an API operation
    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let _deleted: Option<Order> = self.base.db().delete(id.clone()).await?;
        Ok(())
    }

    /// Orders created at or after the given timestamp (reporting)
    pub async fn find_created_since(&self, since: i64) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE created_at >= $since ORDER BY created_at")
            .bind(("since", since))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Total order count (reporting)
    pub async fn count(&self) -> RepoResult<i64> {
        self.base.count_table(ORDER_TABLE).await
    }
}
