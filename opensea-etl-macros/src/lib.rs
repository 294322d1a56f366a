use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, FieldsNamed, parse_macro_input, punctuated::Punctuated, token::Comma};

/// Provide a column-for-field implementation of [`opensea_etl::load::sqlite::SqlMap`].
/// Take the following:
///
/// ```ignore
/// #[derive(SqlMap)]
/// struct MyRow {
///     field0: String,
///     field1: i64,
/// }
/// ```
///
/// Above is equivalent to below:
///
/// ```ignore
/// struct MyRow {
///     field0: String,
///     field1: i64,
/// }
///
/// impl opensea_etl::load::sqlite::SqlMap for MyRow {
///     fn sql_columns(&self) -> std::vec::Vec<&str> {
///         std::vec::Vec::from(["field0", "field1"])
///     }
///
///     fn sql_map(&self) -> std::vec::Vec<opensea_etl::SqlValue> {
///         std::vec::Vec::from([
///             opensea_etl::ToSqlValue::to_sql_value(&self.field0),
///             opensea_etl::ToSqlValue::to_sql_value(&self.field1),
///         ])
///     }
/// }
/// ```
///
/// Every field type must implement [`opensea_etl::ToSqlValue`].
#[proc_macro_derive(SqlMap)]
pub fn derive_sql_map(item: TokenStream) -> TokenStream {
    let body = parse_macro_input!(item as DeriveInput);

    // Extract the struct name.
    let struct_name = &body.ident;
    let (impl_generics, ty_generics, where_clause) = body.generics.split_for_impl();

    // Extract field names.
    let fields = match &body.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(FieldsNamed { named, .. }) => named,
            _ => {
                return syn::Error::new_spanned(
                    struct_name,
                    "SqlMap can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(struct_name, "SqlMap can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let column_names = column_names(fields);

    // Convert each field to an owned SQL value.
    let field_values = fields.iter().map(|field| {
        let field_name = &field.ident;
        quote! { opensea_etl::ToSqlValue::to_sql_value(&self.#field_name) }
    });

    // Return the implementation.
    quote! {
        impl #impl_generics opensea_etl::load::sqlite::SqlMap for #struct_name #ty_generics #where_clause {
            fn sql_columns(&self) -> std::vec::Vec<&str> {
                std::vec::Vec::from([#(#column_names),*])
            }

            fn sql_map(&self) -> std::vec::Vec<opensea_etl::SqlValue> {
                std::vec::Vec::from([#(#field_values),*])
            }
        }
    }
    .into()
}

/// Column names are the field identifiers, with any raw-identifier prefix stripped.
fn column_names(fields: &Punctuated<syn::Field, Comma>) -> Vec<proc_macro2::TokenStream> {
    fields
        .iter()
        .filter_map(|field| field.ident.as_ref())
        .map(|ident| {
            let name = ident.to_string();
            let name = name.trim_start_matches("r#");
            quote! { #name }
        })
        .collect()
}
