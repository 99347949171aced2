//! Derive macro implementation for Filterable.
//!
//! For `struct User` this generates:
//!
//! - `UserFilter`: one optional node per filterable field plus `and`/`or`
//!   groups, serialized under the field's wire name
//! - `UserField`: one variant per non-skipped field, used as an ordering key
//! - impls of `FilterNode` and `EntityFilter` for `UserFilter`
//! - impls of `Filterable` and `Entity` for `User`

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Error, Fields, Ident, Result, Type, ext::IdentExt, spanned::Spanned};

use super::attrs::{
    parse_container_attrs, parse_filter_attrs, parse_serde_field_attrs, parse_serde_rename_all,
};
use super::case::to_pascal_case;
use super::classify::{FieldKind, classify};

const RESERVED: &[&str] = &["and", "or"];

struct FieldSpec {
    ident: Ident,
    ty: Type,
    wire: String,
    variant: Ident,
    kind: FieldKind,
    rust_name: String,
}

impl FieldSpec {
    /// Type of the filter node for this field.
    fn node_type(&self) -> TokenStream {
        let ty = &self.ty;
        quote! { <#ty as ::apiquery::__private::Filterable>::Filter }
    }

    /// Stored type, boxed for nested entities.
    fn stored_type(&self) -> TokenStream {
        let node = self.node_type();
        if self.kind == FieldKind::Nested {
            quote! { ::std::boxed::Box<#node> }
        } else {
            node
        }
    }

    /// `Option<&Node>` view of the stored value.
    fn node_ref(&self) -> TokenStream {
        let ident = &self.ident;
        if self.kind == FieldKind::Nested {
            quote! { self.#ident.as_deref() }
        } else {
            quote! { self.#ident.as_ref() }
        }
    }
}

pub fn filterable_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let vis = &input.vis;

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Filterable cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Filterable only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Filterable can only be derived for structs",
            ));
        }
    };

    let container = parse_container_attrs(&input.attrs)?;
    let rename_all = match container.rename_all {
        Some(rule) => Some(rule),
        None => parse_serde_rename_all(&input.attrs)?,
    };

    let mut specs = Vec::new();
    let mut seen_wire = HashSet::new();
    let mut seen_variant = HashSet::new();

    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let filter_attr = parse_filter_attrs(&field.attrs)?;
        let serde_attr = parse_serde_field_attrs(&field.attrs)?;
        if filter_attr.skip || serde_attr.skip {
            continue;
        }

        let rust_name = ident.unraw().to_string();
        let wire = filter_attr
            .rename
            .or(serde_attr.rename)
            .unwrap_or_else(|| match rename_all {
                Some(rule) => rule.apply_to_field(&rust_name),
                None => rust_name.clone(),
            });

        if RESERVED.contains(&rust_name.as_str()) || RESERVED.contains(&wire.as_str()) {
            return Err(Error::new(
                ident.span(),
                "`and` and `or` are reserved for the filter's logical groups; \
                 rename the field or mark it #[filter(skip)]",
            ));
        }
        if !seen_wire.insert(wire.clone()) {
            return Err(Error::new(
                ident.span(),
                format!("duplicate filter field name \"{wire}\""),
            ));
        }

        let variant = format_ident!("{}", to_pascal_case(&rust_name), span = ident.span());
        if !seen_variant.insert(variant.to_string()) {
            return Err(Error::new(
                ident.span(),
                format!("field enum variant `{variant}` would be generated twice"),
            ));
        }

        // Flattened fields have no key of their own on the wire.
        let kind = if serde_attr.flatten {
            FieldKind::Excluded
        } else {
            classify(&field.ty)
        };

        specs.push(FieldSpec {
            ident,
            ty: field.ty.clone(),
            wire,
            variant,
            kind,
            rust_name,
        });
    }

    let filter_name = format_ident!("{}Filter", name);
    let field_name = format_ident!("{}Field", name);
    let filterable: Vec<&FieldSpec> = specs.iter().filter(|s| s.kind.is_filterable()).collect();

    let filter_struct = generate_filter_struct(name, vis, &filter_name, &filterable);
    let filter_impls = generate_filter_impls(name, &filter_name, &filterable);
    let field_enum = generate_field_enum(name, vis, &field_name, &specs);

    let wire_names: Vec<&str> = filterable.iter().map(|s| s.wire.as_str()).collect();

    Ok(quote! {
        #filter_struct
        #filter_impls
        #field_enum

        impl ::apiquery::__private::Filterable for #name {
            type Filter = #filter_name;

            fn matches(&self, filter: &#filter_name) -> bool {
                ::apiquery::__private::EntityFilter::evaluate(filter, self)
            }
        }

        impl ::apiquery::__private::Entity for #name {
            type Where = #filter_name;
            type Field = #field_name;

            const FILTER_FIELDS: &'static [&'static str] = &[#(#wire_names),*];
        }
    })
}

fn generate_filter_struct(
    name: &Ident,
    vis: &syn::Visibility,
    filter_name: &Ident,
    fields: &[&FieldSpec],
) -> TokenStream {
    let doc = format!("Filter expression over [`{name}`], generated by `#[derive(Filterable)]`.");

    let members = fields.iter().map(|spec| {
        let ident = &spec.ident;
        let wire = &spec.wire;
        let stored = spec.stored_type();
        let field_doc = format!("Constraint on `{wire}`.");
        quote! {
            #[doc = #field_doc]
            #[serde(rename = #wire, default, skip_serializing_if = "::std::option::Option::is_none")]
            pub #ident: ::std::option::Option<#stored>,
        }
    });

    let setters = fields.iter().map(|spec| {
        let ident = &spec.ident;
        let setter = format_ident!("with_{}", spec.rust_name);
        let node = spec.node_type();
        let value = if spec.kind == FieldKind::Nested {
            quote! { ::std::boxed::Box::new(node) }
        } else {
            quote! { node }
        };
        quote! {
            pub fn #setter(mut self, node: #node) -> Self {
                self.#ident = ::std::option::Option::Some(#value);
                self
            }
        }
    });

    quote! {
        #[doc = #doc]
        #[derive(
            Debug,
            Clone,
            Default,
            PartialEq,
            ::apiquery::__private::serde::Serialize,
            ::apiquery::__private::serde::Deserialize,
        )]
        #[serde(crate = "::apiquery::__private::serde")]
        #vis struct #filter_name {
            #(#members)*
            /// Every member must hold.
            #[serde(default, skip_serializing_if = "::std::vec::Vec::is_empty")]
            pub and: ::std::vec::Vec<#filter_name>,
            /// At least one member must hold, when non-empty.
            #[serde(default, skip_serializing_if = "::std::vec::Vec::is_empty")]
            pub or: ::std::vec::Vec<#filter_name>,
        }

        impl #filter_name {
            #(#setters)*
        }
    }
}

fn generate_filter_impls(name: &Ident, filter_name: &Ident, fields: &[&FieldSpec]) -> TokenStream {
    let empty_checks = fields.iter().map(|spec| {
        let node = spec.node_ref();
        quote! {
            #node.is_none_or(::apiquery::__private::FilterNode::is_empty) &&
        }
    });

    let validations = fields.iter().map(|spec| {
        let node = spec.node_ref();
        let wire = &spec.wire;
        quote! {
            if let ::std::option::Option::Some(node) = #node {
                ::apiquery::__private::FilterNode::validate(
                    node,
                    &::apiquery::__private::field_path(path, #wire),
                )?;
            }
        }
    });

    let evaluations = fields.iter().map(|spec| {
        let node = spec.node_ref();
        let ident = &spec.ident;
        quote! {
            #node.is_none_or(|node| ::apiquery::__private::Filterable::matches(&entity.#ident, node)) &&
        }
    });

    quote! {
        impl ::apiquery::__private::FilterNode for #filter_name {
            fn is_empty(&self) -> bool {
                #(#empty_checks)*
                self.and.iter().all(::apiquery::__private::FilterNode::is_empty)
                    && self.or.is_empty()
            }

            fn validate(
                &self,
                path: &str,
            ) -> ::std::result::Result<(), ::apiquery::__private::FilterError> {
                #(#validations)*
                for (index, member) in self.and.iter().enumerate() {
                    ::apiquery::__private::FilterNode::validate(
                        member,
                        &::apiquery::__private::field_path(path, &::std::format!("and[{index}]")),
                    )?;
                }
                for (index, member) in self.or.iter().enumerate() {
                    ::apiquery::__private::FilterNode::validate(
                        member,
                        &::apiquery::__private::field_path(path, &::std::format!("or[{index}]")),
                    )?;
                }
                ::std::result::Result::Ok(())
            }
        }

        impl ::apiquery::__private::EntityFilter for #filter_name {
            type Entity = #name;

            fn evaluate(&self, entity: &#name) -> bool {
                #(#evaluations)*
                self.and
                    .iter()
                    .all(|member| ::apiquery::__private::EntityFilter::evaluate(member, entity))
                    && (self.or.is_empty()
                        || self
                            .or
                            .iter()
                            .any(|member| ::apiquery::__private::EntityFilter::evaluate(member, entity)))
            }

            fn and_group_mut(&mut self) -> &mut ::std::vec::Vec<Self> {
                &mut self.and
            }

            fn or_group_mut(&mut self) -> &mut ::std::vec::Vec<Self> {
                &mut self.or
            }
        }
    }
}

fn generate_field_enum(
    name: &Ident,
    vis: &syn::Visibility,
    field_name: &Ident,
    fields: &[FieldSpec],
) -> TokenStream {
    let doc = format!("Fields of [`{name}`], by wire name. Used as ordering keys.");

    let variants: Vec<&Ident> = fields.iter().map(|s| &s.variant).collect();
    let wires: Vec<&str> = fields.iter().map(|s| s.wire.as_str()).collect();
    let variant_docs = wires.iter().map(|wire| format!("`{wire}`"));

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #vis enum #field_name {
            #(
                #[doc = #variant_docs]
                #variants,
            )*
        }

        impl #field_name {
            /// Every field, in declaration order.
            pub const ALL: &'static [#field_name] = &[#(#field_name::#variants),*];

            /// Wire name of the field.
            pub fn name(&self) -> &'static str {
                match *self {
                    #(#field_name::#variants => #wires,)*
                }
            }

            pub fn from_name(name: &str) -> ::std::option::Option<Self> {
                match name {
                    #(#wires => ::std::option::Option::Some(#field_name::#variants),)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::apiquery::__private::OrderKey for #field_name {
            fn key(&self) -> &str {
                self.name()
            }

            fn from_key(key: &str) -> ::std::option::Option<Self> {
                Self::from_name(key)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand(input: DeriveInput) -> Result<String> {
        filterable_derive_impl(input).map(|tokens| tokens.to_string())
    }

    #[test]
    fn test_generates_filter_and_field_enum() {
        let input: DeriveInput = parse_quote! {
            #[serde(rename_all = "camelCase")]
            pub struct User {
                display_name: String,
                age: Option<u32>,
                address: Address,
                orders: Vec<Order>,
                tags: Vec<String>,
                #[filter(skip)]
                secret: String,
            }
        };
        let out = expand(input).unwrap();

        assert!(out.contains("pub struct UserFilter"));
        assert!(out.contains("pub enum UserField"));
        assert!(out.contains("\"displayName\""));
        assert!(out.contains("DisplayName"));
        assert!(out.contains("with_display_name"));
        assert!(!out.contains("with_tags"));
        assert!(!out.contains("secret"));
        // Only the nested entity is boxed.
        assert_eq!(out.matches(":: std :: boxed :: Box <").count(), 1);
    }

    #[test]
    fn test_filter_fields_exclude_unfilterable_types() {
        let input: DeriveInput = parse_quote! {
            struct Item {
                id: Uuid,
                name: String,
            }
        };
        let out = expand(input).unwrap();
        assert!(out.contains("FILTER_FIELDS : & 'static [& 'static str] = & [\"name\"]"));
        // Still orderable.
        assert!(out.contains("Id"));
    }

    #[test]
    fn test_wire_name_precedence() {
        let input: DeriveInput = parse_quote! {
            #[serde(rename_all = "camelCase")]
            struct Row {
                #[serde(rename = "ROW_ID")]
                #[filter(rename = "rowId")]
                row_id: i64,
                #[serde(rename = "Label")]
                label: String,
                created_at: i64,
            }
        };
        let out = expand(input).unwrap();
        assert!(out.contains("\"rowId\""));
        assert!(!out.contains("\"ROW_ID\""));
        assert!(out.contains("\"Label\""));
        assert!(out.contains("\"createdAt\""));
    }

    #[test]
    fn test_rejects_reserved_field_names() {
        let input: DeriveInput = parse_quote! {
            struct Rule {
                and: bool,
            }
        };
        assert!(expand(input).is_err());

        let input: DeriveInput = parse_quote! {
            struct Rule {
                #[serde(rename = "or")]
                either: bool,
            }
        };
        assert!(expand(input).is_err());
    }

    #[test]
    fn test_rejects_unsupported_shapes() {
        let tuple: DeriveInput = parse_quote! { struct Pair(i32, i32); };
        assert!(expand(tuple).is_err());

        let generic: DeriveInput = parse_quote! { struct Page<T> { items: Vec<T> } };
        assert!(expand(generic).is_err());

        let enumeration: DeriveInput = parse_quote! { enum Status { Active } };
        assert!(expand(enumeration).is_err());
    }

    #[test]
    fn test_rejects_duplicate_wire_names() {
        let input: DeriveInput = parse_quote! {
            struct Clash {
                #[serde(rename = "name")]
                first: String,
                name: String,
            }
        };
        assert!(expand(input).is_err());
    }

    #[test]
    fn test_serde_skip_and_flatten() {
        let input: DeriveInput = parse_quote! {
            struct Doc {
                #[serde(skip)]
                cache: String,
                #[serde(flatten)]
                meta: Meta,
                title: String,
            }
        };
        let out = expand(input).unwrap();
        assert!(!out.contains("Cache"));
        assert!(!out.contains("with_meta"));
        assert!(out.contains("Meta ,"));
    }

    #[test]
    fn test_raw_identifiers() {
        let input: DeriveInput = parse_quote! {
            struct Token {
                r#type: String,
            }
        };
        let out = expand(input).unwrap();
        assert!(out.contains("\"type\""));
        assert!(out.contains("with_type"));
        assert!(out.contains("Type"));
    }
}
