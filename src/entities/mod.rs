//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod availability;
pub mod conversation;
pub mod order;
pub mod review;

// Re-export specific types to avoid conflicts
pub use availability::{
    AvailabilityKind, Column as AvailabilityColumn, Entity as Availability,
    Model as AvailabilityModel,
};
pub use conversation::{
    Column as ConversationColumn, ConversationKind, Entity as Conversation,
    Model as ConversationModel,
};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel, OrderStatus};
pub use review::{Column as ReviewColumn, Entity as Review, Model as ReviewModel};
