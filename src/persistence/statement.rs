//! Parameterized statements and write outcomes.
//!
//! Templates are assembled only from [`Entity`] and [`Column`] names; every
//! request-supplied value travels as a positional [`Param`].

use crate::domain::{Column, Entity, RecordFields};

/// A value bound to one `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// Integer value (identifiers).
    Int(i64),
    /// Text value; `None` binds SQL `NULL`.
    Text(Option<String>),
}

/// One SQL statement plus its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<Param>,
}

/// Result of an `INSERT`, `UPDATE` or `DELETE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOutcome {
    /// Rows matched by the statement.
    pub rows_affected: u64,
    /// Identifier generated by an insert, when the backend reports one.
    pub last_insert_id: Option<i64>,
}

const SELECT_COLUMNS: &str = "id, f_name, l_name, email, phone";

impl Statement {
    /// Wraps a template and its parameters.
    #[must_use]
    pub fn new(sql: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// The template text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// `SELECT` every row of the entity's table.
    #[must_use]
    pub fn select_all(entity: Entity) -> Self {
        Self::new(
            format!("SELECT {SELECT_COLUMNS} FROM {}", entity.table()),
            Vec::new(),
        )
    }

    /// `SELECT` rows whose `columns` equal `params`, pairwise.
    #[must_use]
    pub fn select_where(entity: Entity, columns: &[Column], params: Vec<Param>) -> Self {
        let predicate = columns
            .iter()
            .map(|c| format!("{} = ?", c.name()))
            .collect::<Vec<_>>()
            .join(" AND ");
        Self::new(
            format!(
                "SELECT {SELECT_COLUMNS} FROM {} WHERE {predicate}",
                entity.table()
            ),
            params,
        )
    }

    /// `INSERT` one row with the given attribute values.
    #[must_use]
    pub fn insert(entity: Entity, fields: &RecordFields) -> Self {
        let names = Column::FIELDS.map(Column::name).join(", ");
        Self::new(
            format!(
                "INSERT INTO {} ({names}) VALUES (?, ?, ?, ?)",
                entity.table()
            ),
            fields.values().into_iter().map(Param::Text).collect(),
        )
    }

    /// `UPDATE` every attribute of the row with identifier `id`.
    #[must_use]
    pub fn update(entity: Entity, id: i64, fields: &RecordFields) -> Self {
        let assignments = Column::FIELDS
            .map(|c| format!("{} = ?", c.name()))
            .join(", ");
        let mut params: Vec<Param> = fields.values().into_iter().map(Param::Text).collect();
        params.push(Param::Int(id));
        Self::new(
            format!("UPDATE {} SET {assignments} WHERE id = ?", entity.table()),
            params,
        )
    }

    /// `DELETE` the row with identifier `id`.
    #[must_use]
    pub fn delete(entity: Entity, id: i64) -> Self {
        Self::new(
            format!("DELETE FROM {} WHERE id = ?", entity.table()),
            vec![Param::Int(id)],
        )
    }
}
