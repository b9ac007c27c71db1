//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod promotion;
pub mod system_state;

// Re-export specific types to avoid conflicts
pub use promotion::{
    Column as PromotionColumn, Entity as Promotion, Model as PromotionModel, PromotionKind,
};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
