//! Aggregation Reporter
//!
//! 管理端仪表盘的只读汇总：总量、近 6 个月销售额、药品分类分布。
//! 纯读路径，不持有任何不变式。

use chrono::{DateTime, Datelike, Months, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::repository::{
    MedicineRepository, OrderRepository, PrescriptionRepository, RepoResult, UserRepository,
};
use crate::orders::money::{to_decimal, to_f64};

/// Sales rollup for one calendar month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySales {
    /// Short month label ("Jan", "Feb", …)
    pub month: String,
    pub sales: f64,
}

/// Medicine count per category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub value: i64,
}

/// Admin dashboard aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_medicines: i64,
    pub total_orders: i64,
    pub total_prescriptions: i64,
    pub monthly_sales: Vec<MonthlySales>,
    pub medicine_categories: Vec<CategoryCount>,
}

/// Read-only rollups over users/medicines/orders/prescriptions
#[derive(Clone)]
pub struct StatsService {
    users: UserRepository,
    medicines: MedicineRepository,
    orders: OrderRepository,
    prescriptions: PrescriptionRepository,
}

impl StatsService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            medicines: MedicineRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            prescriptions: PrescriptionRepository::new(db),
        }
    }

    pub async fn admin_stats(&self) -> RepoResult<AdminStats> {
        let (total_users, total_medicines, total_orders, total_prescriptions) = futures::join!(
            self.users.count(),
            self.medicines.count(),
            self.orders.count(),
            self.prescriptions.count(),
        );

        let now = Utc::now();
        let six_months_ago = now
            .checked_sub_months(Months::new(6))
            .unwrap_or(now)
            .timestamp_millis();
        let recent_orders = self.orders.find_created_since(six_months_ago).await?;

        // 按 (年, 月) 归桶，再按近 6 个月的日历顺序输出
        let monthly_sales = (0..6)
            .rev()
            .map(|i| {
                let month_start = now.checked_sub_months(Months::new(i)).unwrap_or(now);
                let sales = recent_orders
                    .iter()
                    .filter(|o| {
                        let created: DateTime<Utc> =
                            DateTime::from_timestamp_millis(o.created_at).unwrap_or(now);
                        created.year() == month_start.year()
                            && created.month() == month_start.month()
                    })
                    .map(|o| to_decimal(o.total_amount))
                    .sum();
                MonthlySales {
                    month: month_start.format("%b").to_string(),
                    sales: to_f64(sales),
                }
            })
            .collect();

        let medicines = self.medicines.find_all().await?;
        let mut category_counts: std::collections::BTreeMap<String, i64> =
            std::collections::BTreeMap::new();
        for medicine in &medicines {
            *category_counts.entry(medicine.category.clone()).or_insert(0) += 1;
        }
        let medicine_categories = category_counts
            .into_iter()
            .map(|(name, value)| CategoryCount { name, value })
            .collect();

        Ok(AdminStats {
            total_users: total_users?,
            total_medicines: total_medicines?,
            total_orders: total_orders?,
            total_prescriptions: total_prescriptions?,
            monthly_sales,
            medicine_categories,
        })
    }
}
