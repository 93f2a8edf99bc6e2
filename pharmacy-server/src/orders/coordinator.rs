//! 订单事务协调器
//!
//! 唯一允许创建订单记录的入口。库存经 [`InventoryLedger`] 预留，
//! 处方经 [`PrescriptionLifecycle`] 消费；预留之后的任何失败都会在
//! 错误返回之前回补全部库存（必要时连同删除已落库的订单），
//! 调用方永远不会把部分提交当作成功观察到。

use std::sync::Arc;

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use thiserror::Error;

use shared::order::PlaceOrderInput;
use shared::util::now_millis;
use shared::{DeliveryMethod, OrderStatus};

use crate::db::models::{Order, OrderCreate, OrderItem};
use crate::db::repository::{MedicineRepository, OrderRepository, RepoError, parse_id};
use crate::inventory::{InventoryLedger, LedgerError, ReserveLine};
use crate::orders::money::{order_total, to_f64};
use crate::prescriptions::{LifecycleError, PrescriptionLifecycle};
use crate::utils::AppError;
use crate::utils::validation::{MAX_ADDRESS_LEN, MAX_QUANTITY, MAX_SHORT_TEXT_LEN};

/// Typed failure modes of the order commit
#[derive(Debug, Error)]
pub enum OrderCommitError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Medicine not found: {0}")]
    MedicineNotFound(String),

    #[error("Insufficient stock for {medicine}")]
    InsufficientStock { medicine: String },

    #[error("Prescription not found: {0}")]
    PrescriptionNotFound(String),

    #[error("Prescription already used: {0}")]
    PrescriptionConsumed(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<OrderCommitError> for AppError {
    fn from(err: OrderCommitError) -> Self {
        match err {
            OrderCommitError::Validation(msg) => AppError::Validation(msg),
            OrderCommitError::MedicineNotFound(msg) => AppError::NotFound(msg),
            OrderCommitError::InsufficientStock { medicine } => {
                AppError::InsufficientStock(medicine)
            }
            OrderCommitError::PrescriptionNotFound(msg) => AppError::NotFound(msg),
            OrderCommitError::PrescriptionConsumed(msg) => AppError::Conflict(msg),
            OrderCommitError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<RepoError> for OrderCommitError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(msg) => OrderCommitError::Validation(msg),
            other => OrderCommitError::Database(other.to_string()),
        }
    }
}

/// Orchestrates stock reservation + order persistence + prescription consumption
pub struct OrderCoordinator {
    medicines: MedicineRepository,
    orders: OrderRepository,
    ledger: Arc<InventoryLedger>,
    lifecycle: PrescriptionLifecycle,
}

impl OrderCoordinator {
    pub fn new(db: Surreal<Db>, ledger: Arc<InventoryLedger>) -> Self {
        Self {
            medicines: MedicineRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            ledger,
            lifecycle: PrescriptionLifecycle::new(db),
        }
    }

    /// Place an order as one all-or-nothing commit
    pub async fn place_order(
        &self,
        customer: RecordId,
        input: PlaceOrderInput,
    ) -> Result<Order, OrderCommitError> {
        // 1. Validate shape before touching any data
        validate_input(&input)?;

        // 2. Resolve and snapshot unit prices from current medicine records.
        //    价格在此一次性读取并写入订单，之后的药价变更不影响本单。
        let mut items: Vec<OrderItem> = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let rid = parse_id("medicine", &line.medicine)
                .map_err(|_| OrderCommitError::Validation(format!("Invalid medicine id: {}", line.medicine)))?;
            let medicine = self
                .medicines
                .find_by_id(&line.medicine)
                .await?
                .ok_or_else(|| OrderCommitError::MedicineNotFound(line.medicine.clone()))?;

            items.push(OrderItem {
                medicine: rid,
                name: medicine.name,
                quantity: line.quantity,
                price: medicine.price,
            });
        }

        // Prescription id parses before any stock mutation
        let prescription_id = match &input.prescription {
            Some(p) => Some(parse_id("prescription", p).map_err(|_| {
                OrderCommitError::Validation(format!("Invalid prescription id: {p}"))
            })?),
            None => None,
        };

        // 3. Reserve stock for the whole batch, all-or-nothing
        let reserve_lines: Vec<ReserveLine> = items
            .iter()
            .map(|i| ReserveLine {
                medicine: i.medicine.clone(),
                quantity: i.quantity,
            })
            .collect();

        self.ledger
            .check_and_reserve(&reserve_lines)
            .await
            .map_err(|e| self.map_ledger_error(e, &items))?;

        // 4. Server-computed total; client-declared amounts are never trusted
        let total_amount = to_f64(order_total(items.iter().map(|i| (i.price, i.quantity))));

        // 5. Collect orders are fulfilled at checkout; delivery stays pending
        let status = match input.delivery_method {
            DeliveryMethod::Collect => OrderStatus::Completed,
            DeliveryMethod::Delivery => OrderStatus::Pending,
        };

        // 6. Persist the order record
        let order = match self
            .orders
            .create(OrderCreate {
                customer,
                items,
                total_amount,
                status,
                delivery_method: input.delivery_method,
                address: input.address.clone(),
                phone: input.phone.clone(),
                prescription: prescription_id.clone(),
                created_at: now_millis(),
            })
            .await
        {
            Ok(order) => order,
            Err(e) => {
                self.release_quietly(&reserve_lines).await;
                return Err(e.into());
            }
        };

        // 7. Consume the prescription, if one was supplied
        if let Some(rid) = prescription_id
            && let Err(e) = self.lifecycle.consume_for_order(&rid).await
        {
            // 8. Full rollback: restock every reserved line, remove the order
            self.release_quietly(&reserve_lines).await;
            if let Some(order_id) = &order.id
                && let Err(del) = self.orders.delete(order_id).await
            {
                tracing::error!(order_id = %order_id, error = %del, "Failed to remove order during rollback");
            }

            return Err(match e {
                LifecycleError::NotFound(msg) => OrderCommitError::PrescriptionNotFound(msg),
                LifecycleError::InvalidState(msg) => OrderCommitError::PrescriptionConsumed(msg),
                other => OrderCommitError::Database(other.to_string()),
            });
        }

        tracing::info!(
            order_id = %order.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
            customer = %order.customer,
            total = order.total_amount,
            item_count = order.items.len(),
            "Order committed"
        );

        Ok(order)
    }

    /// Map a ledger failure to a commit error carrying the medicine display name
    fn map_ledger_error(&self, err: LedgerError, items: &[OrderItem]) -> OrderCommitError {
        let name_of = |rid: &RecordId| {
            items
                .iter()
                .find(|i| &i.medicine == rid)
                .map(|i| i.name.clone())
                .unwrap_or_else(|| rid.to_string())
        };
        match err {
            LedgerError::Insufficient { medicine } => OrderCommitError::InsufficientStock {
                medicine: name_of(&medicine),
            },
            LedgerError::NotFound { medicine } => {
                OrderCommitError::MedicineNotFound(medicine.to_string())
            }
            LedgerError::Database(msg) => OrderCommitError::Database(msg),
        }
    }

    /// Release with logging; rollback must never mask the original error
    async fn release_quietly(&self, lines: &[ReserveLine]) {
        if let Err(e) = self.ledger.release(lines).await {
            tracing::error!(error = %e, "Failed to release reserved stock during rollback");
        }
    }
}

/// Shape validation, rejected before any stock mutation
fn validate_input(input: &PlaceOrderInput) -> Result<(), OrderCommitError> {
    if input.items.is_empty() {
        return Err(OrderCommitError::Validation(
            "Order must contain at least one item".to_string(),
        ));
    }

    for line in &input.items {
        if line.quantity <= 0 {
            return Err(OrderCommitError::Validation(format!(
                "Quantity must be positive, got {}",
                line.quantity
            )));
        }
        if line.quantity > MAX_QUANTITY {
            return Err(OrderCommitError::Validation(format!(
                "Quantity exceeds maximum allowed ({MAX_QUANTITY}), got {}",
                line.quantity
            )));
        }
    }

    if input.phone.trim().is_empty() {
        return Err(OrderCommitError::Validation(
            "Phone must not be empty".to_string(),
        ));
    }
    if input.phone.len() > MAX_SHORT_TEXT_LEN {
        return Err(OrderCommitError::Validation("Phone is too long".to_string()));
    }

    if input.delivery_method == DeliveryMethod::Delivery {
        match &input.address {
            Some(addr) if !addr.trim().is_empty() => {
                if addr.len() > MAX_ADDRESS_LEN {
                    return Err(OrderCommitError::Validation(
                        "Address is too long".to_string(),
                    ));
                }
            }
            _ => {
                return Err(OrderCommitError::Validation(
                    "Address is required for delivery orders".to_string(),
                ));
            }
        }
    }

    Ok(())
}
