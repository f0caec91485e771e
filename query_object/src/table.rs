//! Runtime table descriptor
//!
//! `Table` is the `Tabler` implementation produced by `#[derive(Table)]` and
//! by `TableBuilder` for tables that have no Rust record type.

use crate::errors::QueryError;
use crate::traits::{TableMetadata, Tabler};
use crate::validation::validate_identifier;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    fields: Vec<String>,
    primary_keys: Vec<String>,
}

impl Table {
    pub fn builder(name: &str) -> TableBuilder {
        TableBuilder::new(name)
    }

    /// Descriptor for a derived record type
    pub fn of<T: TableMetadata>() -> Result<Self, QueryError> {
        T::describe()
    }

    /// Build a descriptor from already ranked primary keys
    pub fn from_parts(
        name: &str,
        fields: &[&str],
        primary_keys: &[&str],
    ) -> Result<Self, QueryError> {
        let mut builder = TableBuilder::new(name);
        for field in fields {
            builder = builder.field(field);
        }
        for (rank, key) in primary_keys.iter().enumerate() {
            let rank = u8::try_from(rank + 1)
                .map_err(|_| QueryError::InvalidTable(format!("too many primary keys on {}", name)))?;
            builder = builder.primary_key(key, rank);
        }
        builder.build()
    }
}

impl Tabler for Table {
    fn table_name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> &[String] {
        &self.fields
    }

    fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }
}

/// Assembles a `Table`, checking names and key ranks on `build`.
///
/// ```ignore
/// let emp = Table::builder("emp")
///     .primary_key("id", 1)
///     .field("name")
///     .field("child")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    name: String,
    fields: Vec<String>,
    keys: BTreeMap<u8, String>,
    conflict: Option<(u8, String, String)>,
}

impl TableBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            ..Default::default()
        }
    }

    pub fn field(mut self, name: &str) -> Self {
        let name = name.to_lowercase();
        if !self.fields.contains(&name) {
            self.fields.push(name);
        }
        self
    }

    /// Declare a primary key column with its rank (1 sorts first). The
    /// column is added to the field list when it is not already there.
    pub fn primary_key(mut self, name: &str, rank: u8) -> Self {
        let name = name.to_lowercase();
        match self.keys.get(&rank) {
            Some(existing) if *existing != name => {
                if self.conflict.is_none() {
                    self.conflict = Some((rank, existing.clone(), name.clone()));
                }
            }
            _ => {
                self.keys.insert(rank, name.clone());
            }
        }
        self.field(&name)
    }

    pub fn build(self) -> Result<Table, QueryError> {
        if let Some((rank, existing, field)) = self.conflict {
            return Err(QueryError::PrimaryKeyConflict {
                rank,
                existing,
                field,
            });
        }

        validate_identifier(&self.name)?;
        if self.fields.is_empty() {
            return Err(QueryError::InvalidTable(format!(
                "table {} has no fields",
                self.name
            )));
        }
        for field in &self.fields {
            validate_identifier(field)?;
        }
        if self.keys.is_empty() {
            return Err(QueryError::InvalidTable(format!(
                "table {} has no primary key",
                self.name
            )));
        }

        let mut primary_keys: Vec<String> = Vec::with_capacity(self.keys.len());
        for key in self.keys.into_values() {
            if primary_keys.contains(&key) {
                return Err(QueryError::InvalidTable(format!(
                    "field {} is ranked twice on {}",
                    key, self.name
                )));
            }
            primary_keys.push(key);
        }

        Ok(Table {
            name: self.name,
            fields: self.fields,
            primary_keys,
        })
    }
}
