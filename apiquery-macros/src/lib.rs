//! Procedural macros for apiquery.
//!
//! ## Derive Macros
//!
//! - [`Filterable`] - Generate the filter expression and field enum of an entity
//!
//! The generated code refers to `::apiquery::__private`, so the macro is meant
//! to be used through the `apiquery` crate's re-export.

mod filterable;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives the filter shape of an entity struct.
///
/// For `struct User` the macro generates `UserFilter`, `UserField` and the
/// `Filterable`/`Entity` impls tying them to `User`.
///
/// # Field Types
///
/// | Field type | Filter node |
/// |------------|-------------|
/// | `String` | `StringFilter` (eq, neq, contains, startsWith, endsWith, in, ...) |
/// | integers, floats | `NumericFilter<N>` (eq, neq, gt, gte, lt, lte, negations, in) |
/// | `bool` | `BooleanFilter` (eq, neq) |
/// | `DateTime<Tz>` | `DateTimeFilter`, compared as ISO-8601 instants |
/// | `Option<T>`, `Box<T>` | the node of `T`; an absent value only matches an empty node |
/// | `Vec<E>` of an entity | `CollectionFilter` (all, some, none, any) |
/// | any other plain type `E` | `EFilter`, nested and boxed; `E` must be `Filterable` |
///
/// Maps, sets, other collections, `Uuid`, `Value` and other opaque types get
/// no filter node. They still appear in the field enum and can be ordered by.
///
/// The derive sees only syntax, so it cannot tell a struct from an enum. A
/// field holding an enum or a foreign type that does not implement
/// `Filterable` fails to compile as a nested node; mark it `#[filter(skip)]`.
///
/// # Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `#[filter(skip)]` | Exclude the field from the filter and the field enum |
/// | `#[filter(rename = "...")]` | Wire name of the field |
/// | `#[filter(rename_all = "...")]` | Container rule, same names as serde's |
///
/// Without a `filter` attribute, serde's `rename`, `rename_all`, `skip` and
/// `flatten` decide the wire names, so filters line up with the entity's JSON.
/// Fields named `and` or `or` are rejected, as are generic and tuple structs.
///
/// # Example
///
/// ```ignore
/// use apiquery::prelude::*;
///
/// #[derive(Debug, Clone, Serialize, Deserialize, Filterable)]
/// #[serde(rename_all = "camelCase")]
/// struct Order {
///     order_number: String,
///     total: f64,
/// }
///
/// #[derive(Debug, Clone, Serialize, Deserialize, Filterable)]
/// #[serde(rename_all = "camelCase")]
/// struct Customer {
///     display_name: String,
///     orders: Vec<Order>,
///     #[filter(skip)]
///     internal_note: String,
/// }
///
/// let filter = CustomerFilter::default()
///     .with_display_name(StringFilter::default().contains("Ann"))
///     .with_orders(CollectionFilter::some(
///         OrderFilter::default().with_total(NumericFilter::default().gt(100.0)),
///     ));
///
/// assert_eq!(
///     serde_json::to_value(&filter)?,
///     serde_json::json!({
///         "displayName": {"contains": "Ann"},
///         "orders": {"some": {"total": {"gt": 100.0}}}
///     })
/// );
/// assert_eq!(CustomerField::DisplayName.name(), "displayName");
/// ```
#[proc_macro_derive(Filterable, attributes(filter))]
pub fn filterable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    filterable::filterable_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
