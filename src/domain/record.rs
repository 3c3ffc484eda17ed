//! Flat record shape shared by customers and sellers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Record {
    /// Auto-generated identifier.
    pub id: i64,
    /// First name.
    pub f_name: Option<String>,
    /// Last name.
    pub l_name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
}

impl Record {
    /// Assembles a record from its identifier and attribute values.
    #[must_use]
    pub fn new(id: i64, fields: RecordFields) -> Self {
        Self {
            id,
            f_name: fields.f_name,
            l_name: fields.l_name,
            email: fields.email,
            phone: fields.phone,
        }
    }
}

/// Attribute values sent in `POST` and `PUT` bodies.
///
/// Missing keys are stored as `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RecordFields {
    /// First name.
    pub f_name: Option<String>,
    /// Last name.
    pub l_name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
}

impl RecordFields {
    /// Values in [`super::Column::FIELDS`] order.
    #[must_use]
    pub fn values(&self) -> [Option<String>; 4] {
        [
            self.f_name.clone(),
            self.l_name.clone(),
            self.email.clone(),
            self.phone.clone(),
        ]
    }
}
