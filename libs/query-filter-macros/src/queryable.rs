use heck::ToUpperCamelCase;
use proc_macro2::TokenStream;
use proc_macro_error2::{abort, emit_error};
use quote::quote;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Field, Fields, LitStr, Visibility};

/// Parsed `#[odata(...)]` options of one field.
#[derive(Default)]
struct FieldAttrs {
    column: Option<LitStr>,
    name: Option<LitStr>,
    nested: bool,
}

fn parse_field_attrs(field: &Field) -> FieldAttrs {
    let mut attrs = FieldAttrs::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("odata") {
            continue;
        }

        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().is_empty() {
                    emit_error!(lit, "column name must not be empty");
                }
                if attrs.column.replace(lit).is_some() {
                    emit_error!(meta.path, "duplicate `column` option");
                }
            } else if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().is_empty() {
                    emit_error!(lit, "field name must not be empty");
                }
                if attrs.name.replace(lit).is_some() {
                    emit_error!(meta.path, "duplicate `name` option");
                }
            } else if meta.path.is_ident("nested") {
                attrs.nested = true;
            } else {
                emit_error!(
                    meta.path,
                    "unknown #[odata] option; expected `column`, `name` or `nested`"
                );
            }
            Ok(())
        });

        if let Err(e) = result {
            emit_error!(attr.span(), "Failed to parse #[odata] attribute: {}", e);
        }
    }

    attrs
}

pub fn expand_derive_queryable(input: &DeriveInput) -> TokenStream {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => abort!(
                struct_name,
                "#[derive(Queryable)] requires a struct with named fields"
            ),
        },
        _ => abort!(
            struct_name,
            "#[derive(Queryable)] can only be applied to structs"
        ),
    };

    if let Some(param) = input.generics.params.first() {
        abort!(param, "#[derive(Queryable)] does not support generic structs");
    }

    let descriptors = fields.iter().map(|field| {
        let attrs = parse_field_attrs(field);
        let Some(ident) = field.ident.as_ref() else {
            abort!(field, "#[derive(Queryable)] requires named fields");
        };

        let name = attrs.name.map_or_else(
            || ident.unraw().to_string().to_upper_camel_case(),
            |lit| lit.value(),
        );
        let exported = matches!(field.vis, Visibility::Public(_));
        let column = attrs.column.map_or_else(
            || quote! { ::core::option::Option::None },
            |lit| quote! { ::core::option::Option::Some(#lit) },
        );
        let ty = &field.ty;
        let nested = if attrs.nested {
            quote! {
                ::core::option::Option::Some(
                    <#ty as ::query_filter::schema::Queryable>::descriptor
                        as fn() -> ::query_filter::schema::TypeDescriptor
                )
            }
        } else {
            quote! { ::core::option::Option::None }
        };

        quote! {
            ::query_filter::schema::FieldDescriptor {
                name: #name,
                exported: #exported,
                column: #column,
                nested: #nested,
            }
        }
    });

    let type_name = struct_name.to_string();

    quote! {
        impl ::query_filter::schema::Queryable for #struct_name {
            fn descriptor() -> ::query_filter::schema::TypeDescriptor {
                ::query_filter::schema::TypeDescriptor::Struct {
                    name: #type_name,
                    fields: ::std::vec![#(#descriptors),*],
                }
            }
        }
    }
}
