//! Inventory Ledger
//!
//! 库存数量的唯一归属方：所有 stock 扣减/回补都经由
//! [`InventoryLedger`]，下单路径之外不允许扣减库存。

pub mod ledger;

pub use ledger::{InventoryLedger, LedgerError, ReserveLine};
