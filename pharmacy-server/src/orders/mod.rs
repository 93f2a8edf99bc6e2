//! Order Transaction Coordinator
//!
//! 系统核心：把库存扣减、订单落库、处方消费编排为一个
//! 全有或全无的提交单元。
//!
//! # Commit Flow
//!
//! ```text
//! place_order(input)
//!     ├─ 1. Validate shape (items, quantity, phone, address)
//!     ├─ 2. Snapshot unit prices from current medicine records
//!     ├─ 3. InventoryLedger::check_and_reserve (batch, all-or-nothing)
//!     ├─ 4. total = Σ(snapshot price × qty), server authoritative
//!     ├─ 5. Initial status (collect → completed, delivery → pending)
//!     ├─ 6. Persist order
//!     ├─ 7. Consume prescription (conditional, double-spend safe)
//!     └─ 8. On any failure after 3: release stock (+ delete order)
//! ```

pub mod coordinator;
pub mod money;

pub use coordinator::{OrderCommitError, OrderCoordinator};
