//! Domain layer: entity descriptors, columns, route policies and records.
//!
//! Nothing here touches the database or HTTP; the tables in
//! [`entity`] drive both statement building and route registration.

pub mod entity;
pub mod record;

pub use entity::{Column, DeleteReply, Entity, Lookup, ReadPolicy};
pub use record::{Record, RecordFields};
