//! Medicine Repository

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use shared::util::now_millis;

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Medicine, MedicineCreate, MedicineUpdate};

const MEDICINE_TABLE: &str = "medicine";

#[derive(Clone)]
pub struct MedicineRepository {
    base: BaseRepository,
}

impl MedicineRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Storefront catalog: in stock and not expired
    pub async fn find_catalog(&self) -> RepoResult<Vec<Medicine>> {
        let medicines: Vec<Medicine> = self
            .base
            .db()
            .query("SELECT * FROM medicine WHERE stock > 0 AND expiry_date > $now ORDER BY name")
            .bind(("now", now_millis()))
            .await?
            .take(0)?;
        Ok(medicines)
    }

    /// All medicines owned by a supplier
    pub async fn find_by_supplier(&self, supplier: &RecordId) -> RepoResult<Vec<Medicine>> {
        let medicines: Vec<Medicine> = self
            .base
            .db()
            .query("SELECT * FROM medicine WHERE supplier = $supplier ORDER BY name")
            .bind(("supplier", supplier.to_string()))
            .await?
            .take(0)?;
        Ok(medicines)
    }

    /// Find medicine by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Medicine>> {
        let rid = parse_id(MEDICINE_TABLE, id)?;
        let medicine: Option<Medicine> = self.base.db().select(rid).await?;
        Ok(medicine)
    }

    /// Create a new medicine owned by the given supplier
    pub async fn create(&self, supplier: RecordId, data: MedicineCreate) -> RepoResult<Medicine> {
        if data.price <= 0.0 || !data.price.is_finite() {
            return Err(RepoError::Validation("price must be positive".into()));
        }
        if data.stock < 0 {
            return Err(RepoError::Validation("stock must be non-negative".into()));
        }

        let now = now_millis();
        let medicine = Medicine {
            id: None,
            name: data.name,
            description: data.description,
            price: data.price,
            stock: data.stock,
            manufacturer: data.manufacturer,
            category: data.category,
            requires_prescription: data.requires_prescription,
            supplier,
            expiry_date: data.expiry_date,
            created_at: now,
            updated_at: now,
        };

        let created: Option<Medicine> = self
            .base
            .db()
            .create(MEDICINE_TABLE)
            .content(medicine)
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create medicine".to_string()))
    }

    /// Update supplier-editable fields (stock / expiry_date)
    ///
    /// 归属校验由调用方完成；这里只负责字段更新。
    pub async fn update(&self, id: &str, data: MedicineUpdate) -> RepoResult<Medicine> {
        let rid = parse_id(MEDICINE_TABLE, id)?;

        if let Some(stock) = data.stock
            && stock < 0
        {
            return Err(RepoError::Validation("stock must be non-negative".into()));
        }

        // Build dynamic SET clauses with typed bindings
        let mut set_parts = vec!["updated_at = $updated_at"];
        if data.stock.is_some() {
            set_parts.push("stock = $stock");
        }
        if data.expiry_date.is_some() {
            set_parts.push("expiry_date = $expiry_date");
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));

        let mut query = self
            .base
            .db()
            .query(query_str)
            .bind(("thing", rid))
            .bind(("updated_at", now_millis()));
        if let Some(v) = data.stock {
            query = query.bind(("stock", v));
        }
        if let Some(v) = data.expiry_date {
            query = query.bind(("expiry_date", v));
        }

        let mut result = query.await?;
        let medicines: Vec<Medicine> = result.take(0)?;
        medicines
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Medicine {id} not found")))
    }

    /// Hard delete a medicine
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = parse_id(MEDICINE_TABLE, id)?;
        let deleted: Option<Medicine> = self.base.db().delete(rid).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Medicine {id} not found")));
        }
        Ok(())
    }

    /// All medicines (reporting)
    pub async fn find_all(&self) -> RepoResult<Vec<Medicine>> {
        let medicines: Vec<Medicine> = self.base.db().query("SELECT * FROM medicine").await?.take(0)?;
        Ok(medicines)
    }

    /// Total medicine count (reporting)
    pub async fn count(&self) -> RepoResult<i64> {
        self.base.count_table(MEDICINE_TABLE).await
    }
}
