//! Parsing utilities for table and field attributes
//!
//! This module handles the parsing of `#[table]` and `#[pk]` attributes
//! and validation of table and column names.

use std::collections::BTreeMap;
use syn::{Attribute, Data, DeriveInput, Error, Fields, Ident, LitInt, LitStr, Result, Type};

/// Validate table name and return syn::Error for better proc macro error handling
pub fn validate_table_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid table name '{}': {}", name, e)))
}

/// Validate field name and return syn::Error for better proc macro error handling
pub fn validate_field_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid field name '{}': {}", name, e)))
}

/// Validation logic that mirrors query_object::validation
/// This ensures compile-time validation matches runtime validation
fn validate_identifier(name: &str) -> std::result::Result<(), String> {
    let first_char = name
        .chars()
        .next()
        .ok_or_else(|| "Name cannot be empty".to_string())?;

    // Check length (PostgreSQL limit)
    if name.len() > 63 {
        return Err(format!(
            "Name '{}' is too long: {} characters (max 63)",
            name,
            name.len()
        ));
    }

    // Check first character (must be letter or underscore)
    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(format!(
            "Name '{}' must start with a letter or underscore",
            name
        ));
    }

    // Check all characters (alphanumeric or underscore only)
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("Name '{}' contains invalid characters: only alphanumeric characters and underscores are allowed", name));
    }

    if is_reserved_keyword(name) {
        return Err(format!("Name '{}' is a reserved SQL keyword", name));
    }

    Ok(())
}

/// Same list as query_object::validation
fn is_reserved_keyword(name: &str) -> bool {
    const RESERVED_KEYWORDS: &[&str] = &[
        "ALL", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "COUNT", "CREATE", "DELETE", "DESC",
        "DISTINCT", "DROP", "ELSE", "END", "EXISTS", "FALSE", "FROM", "GROUP", "HAVING", "IN",
        "INSERT", "INTO", "IS", "JOIN", "LIKE", "LIMIT", "NOT", "NULL", "OFFSET", "ON", "OR",
        "ORDER", "OVER", "PARTITION", "RETURNING", "SELECT", "SET", "TABLE", "THEN", "TRUE",
        "UNION", "UPDATE", "VALUES", "WHEN", "WHERE", "WINDOW", "WITH",
    ];

    RESERVED_KEYWORDS.contains(&name.to_ascii_uppercase().as_str())
}

#[derive(Debug)]
pub struct ColumnInfo {
    pub ident: Ident,
    pub name: String,
    pub ty: Type,
}

#[derive(Debug)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    /// Key column names ordered by rank
    pub primary_keys: Vec<String>,
}

/// `#[table(name = "...")]`, defaulting to the lower-cased struct name
fn parse_table_name(input: &DeriveInput) -> Result<String> {
    let mut table_name = None;

    for attr in &input.attrs {
        if attr.path().is_ident("table") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    table_name = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported table attribute, expected `name = \"...\"`"))
                }
            })?;
        }
    }

    let name = table_name
        .unwrap_or_else(|| input.ident.to_string())
        .to_lowercase();
    validate_table_name_syn(&name, input.ident.span())?;
    Ok(name)
}

/// `#[pk(rank)]`
fn parse_pk_rank(attrs: &[Attribute]) -> Result<Option<u8>> {
    for attr in attrs {
        if attr.path().is_ident("pk") {
            let rank: LitInt = attr.parse_args()?;
            return rank.base10_parse::<u8>().map(Some);
        }
    }
    Ok(None)
}

pub fn parse_table(input: &DeriveInput) -> Result<TableInfo> {
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Table cannot be derived for generic structs",
        ));
    }

    let name = parse_table_name(input)?;

    let Data::Struct(data_struct) = &input.data else {
        return Err(Error::new_spanned(
            &input.ident,
            "Table can only be derived for structs",
        ));
    };
    let Fields::Named(fields_named) = &data_struct.fields else {
        return Err(Error::new_spanned(
            &input.ident,
            "Table can only be derived for structs with named fields",
        ));
    };

    let mut columns = Vec::new();
    let mut keys: BTreeMap<u8, String> = BTreeMap::new();

    for field in &fields_named.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new_spanned(field, "Field must have a name"))?;
        let column = ident.to_string().trim_start_matches("r#").to_lowercase();
        validate_field_name_syn(&column, ident.span())?;

        if let Some(rank) = parse_pk_rank(&field.attrs)? {
            if let Some(existing) = keys.get(&rank) {
                return Err(Error::new(
                    ident.span(),
                    format!(
                        "key number {} conflicts between field {} and {}",
                        rank, existing, column
                    ),
                ));
            }
            keys.insert(rank, column.clone());
        }

        columns.push(ColumnInfo {
            ident,
            name: column,
            ty: field.ty.clone(),
        });
    }

    if columns.is_empty() {
        return Err(Error::new_spanned(&input.ident, "struct doesn't have a field"));
    }
    if keys.is_empty() {
        return Err(Error::new_spanned(
            &input.ident,
            "struct doesn't have a primary key: mark one with #[pk(1)]",
        ));
    }

    Ok(TableInfo {
        name,
        columns,
        primary_keys: keys.into_values().collect(),
    })
}
