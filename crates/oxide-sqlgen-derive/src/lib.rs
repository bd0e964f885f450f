//! Derive macro for persistent entity metadata.
//!
//! This crate provides `#[derive(DbEntity)]`, which describes a struct to
//! `oxide-sqlgen`: its entity name, table and the columns its fields map to.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, GenericArgument, Lit, Meta,
    PathArguments, Type,
};

/// Derives `DbEntity` and `DescribeEntity` for a struct with named fields.
///
/// # Attributes
///
/// - `#[entity(name = "Name")]` - Entity name used by name lookups
///   (optional, defaults to the struct name)
/// - `#[entity(table = "TABLE")]` - Explicit table name (optional, derived
///   from the entity name by the configured naming strategy)
/// - `#[entity(schema = "schema")]` - Explicit schema name
///
/// # Field Attributes
///
/// - `#[column(id)]` - Marks the field as an identity column
/// - `#[column(name = "COLUMN")]` - Explicit column name (optional, derived
///   from the field name by the configured naming strategy)
/// - `#[column(skip)]` - Leaves the field unmapped
///
/// Fields of type `Option<T>` are nullable. The property type is inferred
/// from the field type; every mapped field must implement `ToSqlValue` and
/// `Clone`. Primitives that do not fit an `i64` (`u64`, `usize`, `i128`...)
/// and `char` are rejected; skip them or store a supported type.
#[proc_macro_derive(DbEntity, attributes(entity, column))]
pub fn derive_db_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_db_entity_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_db_entity_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let entity_attrs = parse_entity_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "DbEntity derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "DbEntity derive only supports structs",
            ));
        }
    };
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "DbEntity derive does not support generic structs",
        ));
    }

    let mut properties: Vec<PropertyInfo> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            continue;
        };
        let column_attrs = parse_column_attrs(&field.attrs)?;
        if column_attrs.skip {
            continue;
        }
        let (nullable, inner) = match option_inner(&field.ty) {
            Some(inner) => (true, inner),
            None => (false, &field.ty),
        };
        properties.push(PropertyInfo {
            property: field_name.to_string(),
            field_name,
            column_name: column_attrs.name,
            property_type: property_type(inner)?,
            nullable,
            id: column_attrs.id,
        });
    }

    let entity_name = entity_attrs
        .name
        .unwrap_or_else(|| struct_name.to_string());
    let table = optional_str(entity_attrs.table.as_deref());
    let schema = optional_str(entity_attrs.schema.as_deref());

    let schema_entries: Vec<TokenStream2> = properties
        .iter()
        .map(|info| {
            let property = &info.property;
            let column = optional_str(info.column_name.as_deref());
            let property_type = &info.property_type;
            let nullable = info.nullable;
            let id = info.id;
            quote! {
                ::oxide_sqlgen::entity::PropertySchema {
                    property: #property,
                    column: #column,
                    property_type: ::oxide_sqlgen::entity::PropertyType::#property_type,
                    nullable: #nullable,
                    id: #id,
                }
            }
        })
        .collect();

    let value_arms: Vec<TokenStream2> = properties
        .iter()
        .map(|info| {
            let property = &info.property;
            let field_name = &info.field_name;
            quote! {
                #property => ::core::option::Option::Some(
                    ::oxide_sqlgen::ToSqlValue::to_sql_value(
                        ::core::clone::Clone::clone(&self.#field_name),
                    ),
                ),
            }
        })
        .collect();

    let expanded = quote! {
        impl ::oxide_sqlgen::entity::DbEntity for #struct_name {
            fn entity_type(&self) -> ::oxide_sqlgen::entity::EntityType {
                ::oxide_sqlgen::entity::EntityType::of::<Self>()
            }

            fn property_value(
                &self,
                property: &str,
            ) -> ::core::option::Option<::oxide_sqlgen::SqlValue> {
                match property {
                    #(#value_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::oxide_sqlgen::entity::DescribeEntity for #struct_name {
            const SCHEMA: ::oxide_sqlgen::entity::EntitySchema =
                ::oxide_sqlgen::entity::EntitySchema {
                    name: #entity_name,
                    table: #table,
                    schema: #schema,
                    properties: &[#(#schema_entries),*],
                };
        }
    };

    Ok(expanded)
}

struct PropertyInfo {
    field_name: syn::Ident,
    property: String,
    column_name: Option<String>,
    property_type: syn::Ident,
    nullable: bool,
    id: bool,
}

#[derive(Default)]
struct EntityAttrs {
    name: Option<String>,
    table: Option<String>,
    schema: Option<String>,
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    id: bool,
    skip: bool,
}

fn parse_entity_attrs(attrs: &[Attribute]) -> syn::Result<EntityAttrs> {
    let mut result = EntityAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                result.name = Some(string_value(&meta)?);
            } else if meta.path.is_ident("table") {
                result.table = Some(string_value(&meta)?);
            } else if meta.path.is_ident("schema") {
                result.schema = Some(string_value(&meta)?);
            } else {
                return Err(meta.error("unsupported entity attribute"));
            }
            Ok(())
        })?;
    }
    Ok(result)
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("column") {
            continue;
        }
        // Handle empty attribute like #[column]
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                result.id = true;
            } else if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("name") {
                result.name = Some(string_value(&meta)?);
            } else {
                return Err(meta.error("unsupported column attribute"));
            }
            Ok(())
        })?;
    }
    Ok(result)
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = &value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(value, "expected a string literal"))
}

fn optional_str(value: Option<&str>) -> TokenStream2 {
    match value {
        Some(s) => quote! { ::core::option::Option::Some(#s) },
        None => quote! { ::core::option::Option::None },
    }
}

/// Returns `T` when `ty` is `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn property_type(ty: &Type) -> syn::Result<syn::Ident> {
    let name = match ty {
        Type::Path(path) => match path.path.segments.last() {
            Some(segment) => {
                let ident = segment.ident.to_string();
                match ident.as_str() {
                    "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" => "Integer",
                    "f32" | "f64" => "Float",
                    "bool" => "Boolean",
                    "String" => "Text",
                    "Vec" if is_byte_vec(&segment.arguments) => "Blob",
                    "u64" | "u128" | "i128" | "usize" | "isize" | "char" => {
                        return Err(syn::Error::new_spanned(
                            ty,
                            format!(
                                "unsupported field type `{ident}`: no SQL value conversion, \
                                 use a supported type or #[column(skip)]"
                            ),
                        ));
                    }
                    _ => "Other",
                }
            }
            None => "Other",
        },
        _ => "Other",
    };
    Ok(syn::Ident::new(name, proc_macro2::Span::call_site()))
}

fn is_byte_vec(arguments: &PathArguments) -> bool {
    let PathArguments::AngleBracketed(args) = arguments else {
        return false;
    };
    matches!(
        args.args.first(),
        Some(GenericArgument::Type(Type::Path(p))) if p.path.is_ident("u8")
    )
}
