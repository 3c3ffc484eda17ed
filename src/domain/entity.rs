//! Entity descriptors and per-route read policies.
//!
//! Each service exposes one [`Entity`]. The entity fixes the table name,
//! the collection path segment, the lookup routes and how an empty or
//! non-empty row set is answered on each of them.

use std::fmt;

/// The record type served by one running service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// Rows of the `CUSTOMER` table under `/customers`.
    Customer,
    /// Rows of the `SELLER` table under `/sellers`.
    Seller,
}

impl Entity {
    /// Table holding this entity's rows.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Seller => "SELLER",
        }
    }

    /// Collection path segment (`customers`, `sellers`).
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Customer => "customers",
            Self::Seller => "sellers",
        }
    }

    /// Capitalized label used in response messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Seller => "Seller",
        }
    }

    /// Lower-case service name used in health texts and logs.
    #[must_use]
    pub const fn service_name(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Seller => "seller",
        }
    }

    /// Lookup routes served for this entity, in registration order.
    #[must_use]
    pub const fn lookups(self) -> &'static [Lookup] {
        match self {
            Self::Customer => CUSTOMER_LOOKUPS,
            Self::Seller => SELLER_LOOKUPS,
        }
    }

    /// How a successful delete is answered.
    #[must_use]
    pub const fn delete_reply(self) -> DeleteReply {
        match self {
            Self::Customer => DeleteReply::NoContent,
            Self::Seller => DeleteReply::SuccessFlag,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A column of the entity tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Auto-generated primary key.
    Id,
    /// First name.
    FirstName,
    /// Last name.
    LastName,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
}

impl Column {
    /// Attribute columns in insert/update order.
    pub const FIELDS: [Self; 4] = [Self::FirstName, Self::LastName, Self::Email, Self::Phone];

    /// SQL column name, also used as the route parameter name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FirstName => "f_name",
            Self::LastName => "l_name",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

/// Mapping from a row set to an HTTP answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Zero rows is "not found"; otherwise the first row alone.
    One,
    /// Always the full array, empty included.
    Many,
    /// Zero rows is "not found"; otherwise the full array.
    ManyOrNotFound,
}

/// How a successful delete is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReply {
    /// `204 No Content`.
    NoContent,
    /// `200` with `{ "success": true }`.
    SuccessFlag,
}

/// A `GET` route that filters the table by one or more columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    segment: Option<&'static str>,
    columns: &'static [Column],
    policy: ReadPolicy,
}

impl Lookup {
    const fn new(segment: Option<&'static str>, columns: &'static [Column], policy: ReadPolicy) -> Self {
        Self {
            segment,
            columns,
            policy,
        }
    }

    /// Columns compared for equality, in placeholder order.
    #[must_use]
    pub const fn columns(&self) -> &'static [Column] {
        self.columns
    }

    /// Read policy applied to the matched rows.
    #[must_use]
    pub const fn policy(&self) -> ReadPolicy {
        self.policy
    }

    /// Route path for `entity`, with one `{column}` parameter per column.
    #[must_use]
    pub fn route(&self, entity: Entity) -> String {
        let mut path = format!("/{}", entity.collection());
        if let Some(segment) = self.segment {
            path.push('/');
            path.push_str(segment);
        }
        for column in self.columns {
            path.push_str("/{");
            path.push_str(column.name());
            path.push('}');
        }
        path
    }
}

const CUSTOMER_LOOKUPS: &[Lookup] = &[
    Lookup::new(Some("id"), &[Column::Id], ReadPolicy::One),
    Lookup::new(Some("email"), &[Column::Email], ReadPolicy::One),
    Lookup::new(Some("phone"), &[Column::Phone], ReadPolicy::One),
    Lookup::new(Some("f_name"), &[Column::FirstName], ReadPolicy::One),
    Lookup::new(Some("l_name"), &[Column::LastName], ReadPolicy::One),
    Lookup::new(
        Some("name"),
        &[Column::FirstName, Column::LastName],
        ReadPolicy::One,
    ),
];

// Seller field lookups answer with arrays but still 404 on no match.
const SELLER_LOOKUPS: &[Lookup] = &[
    Lookup::new(None, &[Column::Id], ReadPolicy::One),
    Lookup::new(
        Some("first-name"),
        &[Column::FirstName],
        ReadPolicy::ManyOrNotFound,
    ),
    Lookup::new(
        Some("last-name"),
        &[Column::LastName],
        ReadPolicy::ManyOrNotFound,
    ),
    Lookup::new(Some("email"), &[Column::Email], ReadPolicy::ManyOrNotFound),
    Lookup::new(Some("phone"), &[Column::Phone], ReadPolicy::ManyOrNotFound),
];
