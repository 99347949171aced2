//! Attribute parsing for the Filterable derive macro.
//!
//! Reads the `#[filter(...)]` attributes and the subset of `#[serde(...)]`
//! that decides wire names: `rename`, `rename_all`, `skip` and `flatten`.

use proc_macro2::TokenTree;
use syn::{
    Attribute, Error, Expr, ExprLit, Lit, LitStr, Meta, Result, Token,
    meta::ParseNestedMeta,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
};

use super::case::RenameRule;

/// Field-level `#[filter(...)]`.
#[derive(Debug, Clone, Default)]
pub struct FilterAttr {
    /// Leave the field out of the filter shape and the field enum.
    pub skip: bool,
    /// Wire name override.
    pub rename: Option<String>,
}

impl Parse for FilterAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FilterAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    attr.rename = Some(string_value(&nv.value, "rename")?);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown filter attribute. Expected: skip or rename = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Container-level `#[filter(...)]`.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttr {
    pub rename_all: Option<RenameRule>,
}

impl Parse for ContainerAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ContainerAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                    let rule = string_value(&nv.value, "rename_all")?;
                    attr.rename_all = Some(RenameRule::parse(&rule, nv.value.span())?);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown filter container attribute. Expected: rename_all = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// What `#[serde(...)]` says about one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerdeFieldAttr {
    pub rename: Option<String>,
    pub skip: bool,
    pub flatten: bool,
}

fn string_value(expr: &Expr, key: &str) -> Result<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        other => Err(Error::new(
            other.span(),
            format!("{key} must be a string literal"),
        )),
    }
}

/// Consume whatever follows a serde key we do not care about.
fn skip_meta_value(meta: &ParseNestedMeta) -> Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<Expr>()?;
    } else if !meta.input.is_empty() && !meta.input.peek(Token![,]) {
        meta.input.parse::<TokenTree>()?;
    }
    Ok(())
}

/// Read `rename = "..."` or the `serialize` half of
/// `rename(serialize = "...", deserialize = "...")`.
fn serde_rename_value(meta: &ParseNestedMeta) -> Result<Option<String>> {
    if meta.input.peek(Token![=]) {
        return Ok(Some(meta.value()?.parse::<LitStr>()?.value()));
    }

    let mut serialize = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("serialize") {
            serialize = Some(inner.value()?.parse::<LitStr>()?.value());
        } else {
            skip_meta_value(&inner)?;
        }
        Ok(())
    })?;
    Ok(serialize)
}

/// Extract the `#[filter(...)]` attribute of a field.
pub fn parse_filter_attrs(attrs: &[Attribute]) -> Result<FilterAttr> {
    for attr in attrs {
        if attr.path().is_ident("filter") {
            return attr.parse_args::<FilterAttr>();
        }
    }
    Ok(FilterAttr::default())
}

/// Extract the `#[filter(...)]` attribute of the struct.
pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttr> {
    for attr in attrs {
        if attr.path().is_ident("filter") {
            return attr.parse_args::<ContainerAttr>();
        }
    }
    Ok(ContainerAttr::default())
}

/// The struct's `#[serde(rename_all = "...")]`, if any.
pub fn parse_serde_rename_all(attrs: &[Attribute]) -> Result<Option<RenameRule>> {
    let mut rule = None;

    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if let Some(value) = serde_rename_value(&meta)? {
                    rule = Some(RenameRule::parse(&value, meta.path.span())?);
                }
            } else {
                skip_meta_value(&meta)?;
            }
            Ok(())
        })?;
    }

    Ok(rule)
}

pub fn parse_serde_field_attrs(attrs: &[Attribute]) -> Result<SerdeFieldAttr> {
    let mut parsed = SerdeFieldAttr::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if let Some(value) = serde_rename_value(&meta)? {
                    parsed.rename = Some(value);
                }
            } else if meta.path.is_ident("skip") {
                parsed.skip = true;
            } else if meta.path.is_ident("flatten") {
                parsed.flatten = true;
            } else {
                skip_meta_value(&meta)?;
            }
            Ok(())
        })?;
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn parse_filter(tokens: &str) -> Result<FilterAttr> {
        syn::parse_str::<FilterAttr>(tokens)
    }

    #[test]
    fn test_filter_skip() {
        let attr = parse_filter("skip").unwrap();
        assert!(attr.skip);
        assert!(attr.rename.is_none());
    }

    #[test]
    fn test_filter_rename() {
        let attr = parse_filter("rename = \"Email\"").unwrap();
        assert_eq!(attr.rename.as_deref(), Some("Email"));
    }

    #[test]
    fn test_filter_unknown_rejected() {
        assert!(parse_filter("sortable").is_err());
        assert!(parse_filter("rename = 3").is_err());
    }

    #[test]
    fn test_container_rename_all() {
        let attr = syn::parse_str::<ContainerAttr>("rename_all = \"PascalCase\"").unwrap();
        assert_eq!(attr.rename_all, Some(RenameRule::PascalCase));
        assert!(syn::parse_str::<ContainerAttr>("rename_all = \"Train-Case\"").is_err());
    }

    #[test]
    fn test_serde_field_attrs_ignore_unrelated_keys() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[serde(default, skip_serializing_if = "Option::is_none")]),
            parse_quote!(#[serde(rename = "userName", with = "some::module")]),
        ];
        let parsed = parse_serde_field_attrs(&attrs).unwrap();
        assert_eq!(parsed.rename.as_deref(), Some("userName"));
        assert!(!parsed.skip);
    }

    #[test]
    fn test_serde_split_rename_uses_serialize_name() {
        let attrs: Vec<Attribute> =
            vec![parse_quote!(#[serde(rename(serialize = "out", deserialize = "in"))])];
        let parsed = parse_serde_field_attrs(&attrs).unwrap();
        assert_eq!(parsed.rename.as_deref(), Some("out"));
    }

    #[test]
    fn test_serde_skip_and_flatten() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[serde(skip)]), parse_quote!(#[serde(flatten)])];
        let parsed = parse_serde_field_attrs(&attrs).unwrap();
        assert!(parsed.skip);
        assert!(parsed.flatten);
    }

    #[test]
    fn test_serde_container_rename_all() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[serde(deny_unknown_fields)]),
            parse_quote!(#[serde(rename_all = "camelCase", bound(serialize = "T: Serialize"))]),
        ];
        assert_eq!(parse_serde_rename_all(&attrs).unwrap(), Some(RenameRule::CamelCase));
    }
}
