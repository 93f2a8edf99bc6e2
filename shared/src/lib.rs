//! Shared types for the pharmacy platform
//!
//! Wire-level types used by the server and any client binaries:
//! domain enums, request/response DTOs and time helpers.

pub mod order;
pub mod request;
pub mod response;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
pub use types::{DeliveryMethod, OrderStatus, PrescriptionStatus, Role, Timestamp};
