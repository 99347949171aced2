//! Traits tying an entity shape to its filter shape
//!
//! [`Filterable`] is the type-level mapping: every supported field type names
//! the filter node that constrains it. Primitives map to their operator set,
//! `Option`/`Box` forward to the wrapped type, `Vec` of an entity maps to a
//! collection quantifier, and entities map to the expression struct generated
//! by `#[derive(Filterable)]`. Types without an impl have no filter surface.

use std::fmt::Debug;

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::collection::CollectionFilter;
use super::error::FilterError;
use super::filters::{BooleanFilter, DateTimeFilter, DateTimeValue, NumericFilter, StringFilter};
use super::orderby::OrderKey;

/// One node of a filter tree.
pub trait FilterNode:
    Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// True when the node constrains nothing.
    fn is_empty(&self) -> bool;

    /// Reject combinations the remote API cannot interpret.
    ///
    /// `path` is the dotted location of this node, used in error messages.
    fn validate(&self, _path: &str) -> Result<(), FilterError> {
        Ok(())
    }
}

/// A value type with a filter surface.
pub trait Filterable {
    /// The node that constrains values of this type.
    type Filter: FilterNode;

    /// Evaluate `filter` against this value.
    fn matches(&self, filter: &Self::Filter) -> bool;
}

/// Filter expression generated for an entity.
pub trait EntityFilter: FilterNode {
    type Entity;

    /// Own field constraints AND every `and` member AND (if any) one `or` member.
    fn evaluate(&self, entity: &Self::Entity) -> bool;

    fn and_group_mut(&mut self) -> &mut Vec<Self>;

    fn or_group_mut(&mut self) -> &mut Vec<Self>;

    /// Append `other` to the `and` group.
    fn and(mut self, other: Self) -> Self {
        self.and_group_mut().push(other);
        self
    }

    /// Append `other` to the `or` group.
    fn or(mut self, other: Self) -> Self {
        self.or_group_mut().push(other);
        self
    }
}

/// A struct whose filter shape was derived with `#[derive(Filterable)]`.
pub trait Entity: Sized + 'static {
    /// The generated filter expression (`<Name>Filter`).
    type Where: EntityFilter<Entity = Self>;

    /// The generated field enum (`<Name>Field`), used for ordering.
    type Field: OrderKey + Copy;

    /// Wire names of the fields that carry a filter node, in declaration order.
    const FILTER_FIELDS: &'static [&'static str];
}

/// Dotted path of a child node, for validation messages.
pub fn field_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

/// Values the numeric and temporal operator sets compare.
pub trait Comparable:
    Debug + Clone + PartialOrd + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

macro_rules! numeric_filterable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Comparable for $ty {}

            impl Filterable for $ty {
                type Filter = NumericFilter<$ty>;

                fn matches(&self, filter: &Self::Filter) -> bool {
                    filter.evaluate(self)
                }
            }
        )*
    };
}

numeric_filterable!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl Filterable for String {
    type Filter = StringFilter;

    fn matches(&self, filter: &StringFilter) -> bool {
        filter.evaluate(self)
    }
}

impl Filterable for bool {
    type Filter = BooleanFilter;

    fn matches(&self, filter: &BooleanFilter) -> bool {
        filter.evaluate(*self)
    }
}

impl<Tz: TimeZone> Filterable for DateTime<Tz> {
    type Filter = DateTimeFilter;

    fn matches(&self, filter: &DateTimeFilter) -> bool {
        filter.evaluate(&DateTimeValue::from_datetime(self))
    }
}

/// An absent value only satisfies an empty node.
impl<V: Filterable> Filterable for Option<V> {
    type Filter = V::Filter;

    fn matches(&self, filter: &V::Filter) -> bool {
        match self {
            Some(value) => value.matches(filter),
            None => filter.is_empty(),
        }
    }
}

impl<V: Filterable + ?Sized> Filterable for Box<V> {
    type Filter = V::Filter;

    fn matches(&self, filter: &V::Filter) -> bool {
        (**self).matches(filter)
    }
}

impl<E: Entity> Filterable for Vec<E> {
    type Filter = CollectionFilter<E::Where>;

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.evaluate(self)
    }
}

/// Raw JSON filters, for callers without a typed entity (the CLI).
impl FilterNode for serde_json::Value {
    fn is_empty(&self) -> bool {
        match self {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use serde_json::json;

    #[test]
    fn test_optional_value_only_matches_empty_node() {
        let empty = StringFilter::default();
        let constrained = StringFilter::default().equals("x");

        assert!(None::<String>.matches(&empty));
        assert!(!None::<String>.matches(&constrained));
        assert!(Some("x".to_string()).matches(&constrained));
    }

    #[test]
    fn test_boxed_value_forwards() {
        let value: Box<i64> = Box::new(7);
        assert!(value.matches(&NumericFilter::default().gt(3)));
        assert!(!value.matches(&NumericFilter::default().lt(3)));
    }

    #[test]
    fn test_datetime_with_offset_compares_in_utc() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let utc = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();

        let filter = DateTimeFilter::default().equals(utc.into());
        assert!(local.matches(&filter));
    }

    #[test]
    fn test_raw_json_emptiness() {
        assert!(FilterNode::is_empty(&serde_json::Value::Null));
        assert!(FilterNode::is_empty(&json!({})));
        assert!(!FilterNode::is_empty(&json!({"name": {"eq": "a"}})));
    }

    #[test]
    fn test_field_path() {
        assert_eq!(field_path("", "name"), "name");
        assert_eq!(field_path("where.data[0]", "name"), "where.data[0].name");
    }
}
