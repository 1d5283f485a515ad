//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod fee;
pub mod payment;
pub mod student;

// Re-export specific types to avoid conflicts
pub use fee::{
    Column as FeeColumn, Entity as Fee, FeePolicy, FeeStatus, FeeType, Model as FeeModel,
};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel, PaymentMethod};
pub use student::{Column as StudentColumn, Entity as Student, Model as StudentModel};
