//! Procedural macros for table descriptors
//!
//! This crate provides the `Table` derive, which turns a struct into an
//! entity descriptor and a row destination.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod generation;
mod parsing;

use generation::{generate_scan_args_impl, generate_table_metadata_impl};
use parsing::parse_table;

/// Derive macro for the `TableMetadata` and `ScanArgs` traits
///
/// Every named field is a column, named after the lower-cased field.
/// `#[pk(n)]` marks a primary key column of rank `n` (1 sorts first).
/// The table name defaults to the lower-cased struct name.
///
/// ```rust,ignore
/// use pagehaus::prelude::*;
///
/// #[derive(Debug, Default, Table)]
/// #[table(name = "emp")]
/// pub struct Emp {
///     #[pk(1)]
///     pub id: String,
///     pub name: String,
///     pub child: i32,
///     pub joindate: DateTime<Utc>,
/// }
/// ```
///
/// Generated code refers to `query_object`, which the pagehaus prelude
/// brings into scope.
#[proc_macro_derive(Table, attributes(table, pk))]
pub fn derive_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let table_info = match parse_table(&input) {
        Ok(info) => info,
        Err(e) => return e.to_compile_error().into(),
    };

    let table_metadata_impl = generate_table_metadata_impl(name, &table_info);
    let scan_args_impl = generate_scan_args_impl(name, &table_info);

    let expanded = quote::quote! {
        #table_metadata_impl
        #scan_args_impl
    };

    TokenStream::from(expanded)
}
