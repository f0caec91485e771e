//! Code generation for `#[derive(Table)]`

use crate::parsing::TableInfo;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

/// `TableMetadata` with the descriptor as associated constants
pub fn generate_table_metadata_impl(name: &Ident, info: &TableInfo) -> TokenStream {
    let table_name = &info.name;
    let fields = info.columns.iter().map(|c| &c.name);
    let primary_keys = &info.primary_keys;

    quote! {
        impl query_object::TableMetadata for #name {
            const TABLE_NAME: &'static str = #table_name;
            const FIELDS: &'static [&'static str] = &[#(#fields),*];
            const PRIMARY_KEYS: &'static [&'static str] = &[#(#primary_keys),*];
        }
    }
}

/// `ScanArgs` backed by a registry built once per type.
///
/// Values are coerced into locals first and only assigned once every one
/// has converted, so a failed scan leaves the record as it was.
pub fn generate_scan_args_impl(name: &Ident, info: &TableInfo) -> TokenStream {
    let column_names = info.columns.iter().map(|c| &c.name);
    let field_count = info.columns.len();
    let locals: Vec<Ident> = (0..field_count)
        .map(|i| format_ident!("__scanned_{}", i))
        .collect();

    let declarations = info.columns.iter().zip(&locals).map(|(column, local)| {
        let ty = &column.ty;
        quote! {
            let mut #local: ::std::option::Option<#ty> = ::std::option::Option::None;
        }
    });
    let arms = info.columns.iter().zip(&locals).enumerate().map(|(slot, (column, local))| {
        let ty = &column.ty;
        quote! {
            #slot => {
                #local = ::std::option::Option::Some(
                    <#ty as query_object::FromSqlValue>::from_sql_value(value)?,
                );
            }
        }
    });
    let assignments = info.columns.iter().zip(&locals).map(|(column, local)| {
        let ident = &column.ident;
        quote! {
            if let ::std::option::Option::Some(value) = #local {
                self.#ident = value;
            }
        }
    });

    quote! {
        const _: () = {
            static REGISTRY: ::std::sync::OnceLock<query_object::FieldRegistry> =
                ::std::sync::OnceLock::new();

            fn registry() -> &'static query_object::FieldRegistry {
                REGISTRY.get_or_init(|| query_object::FieldRegistry::new(&[#(#column_names),*]))
            }

            impl query_object::ScanArgs for #name {
                fn field_count() -> usize {
                    registry().len()
                }

                fn scan_slots(columns: &[::std::string::String]) -> ::std::vec::Vec<::std::option::Option<usize>> {
                    registry().slots(columns)
                }

                fn scan_values(
                    &mut self,
                    values: &[(usize, &query_object::SqlValue)],
                ) -> ::std::result::Result<(), query_object::QueryError> {
                    #(#declarations)*
                    for &(slot, value) in values {
                        match slot {
                            #(#arms)*
                            other => return ::std::result::Result::Err(registry().out_of_range(other)),
                        }
                    }
                    #(#assignments)*
                    ::std::result::Result::Ok(())
                }
            }
        };
    }
}
