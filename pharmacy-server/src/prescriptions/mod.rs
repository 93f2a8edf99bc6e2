//! Prescription Lifecycle
//!
//! 处方状态机：active → completed / active → expired，终态不可逆。

pub mod lifecycle;

pub use lifecycle::{LifecycleError, PrescriptionLifecycle};
