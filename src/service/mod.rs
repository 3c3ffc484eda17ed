//! Service layer: the pooled request-handling pattern.
//!
//! [`RecordService`] checks a connection out, runs one statement, and
//! returns the connection before handing the result back to the handler.

pub mod record_service;

pub use record_service::RecordService;
