//! Database Models

// Serde helpers
pub mod serde_helpers;

// Identity
pub mod user;

// Inventory
pub mod medicine;

// Prescriptions
pub mod prescription;

// Orders
pub mod order;

// Re-exports
pub use medicine::{Medicine, MedicineCreate, MedicineId, MedicineUpdate};
pub use order::{Order, OrderCreate, OrderId, OrderItem};
pub use prescription::{Prescription, PrescriptionCreate, PrescriptionId, PrescriptionLine};
pub use user::{PatientSummary, User, UserCreate, UserId};
