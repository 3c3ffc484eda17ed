//! # directory-service
//!
//! Customer and seller record services over a bounded database connection
//! pool.
//!
//! Every request follows one pattern: acquire a pooled connection, run
//! exactly one parameterized statement, release the connection, then map
//! the outcome to an HTTP response. The two services differ only in the
//! [`domain::Entity`] they serve.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── RecordService (service/)
//!     │
//!     ├── ConnectionPool (persistence/)
//!     │
//!     └── MySQL / SQLite via sqlx
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod server;
pub mod service;
