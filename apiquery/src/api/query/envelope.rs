use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::builder::QueryBuilder;
use super::error::FilterError;
use super::filterable::{Entity, FilterNode};
use super::orderby::{OrderBy, OrderKey};
use super::response::ResponseFilter;

/// Default pagination shape. The envelope accepts any serializable type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pagination {
    #[serde(rename_all = "camelCase")]
    Page { page_index: u32, page_size: u32 },
    #[serde(rename_all = "camelCase")]
    Cursor { cursor: String, page_size: u32 },
}

impl Pagination {
    pub fn page(page_index: u32, page_size: u32) -> Self {
        Pagination::Page {
            page_index,
            page_size,
        }
    }

    pub fn cursor(cursor: impl Into<String>, page_size: u32) -> Self {
        Pagination::Cursor {
            cursor: cursor.into(),
            page_size,
        }
    }
}

/// Pagination + ordering + filter payload of a listing call.
///
/// Absent sections are omitted on the wire; with nothing set the envelope
/// serializes to `{}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "W: Serialize, K: OrderKey, P: Serialize",
    deserialize = "W: DeserializeOwned, K: OrderKey, P: DeserializeOwned"
))]
pub struct QueryEnvelope<W, K, P = Pagination> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pagination: Option<P>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order: Option<OrderBy<K>>,
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    where_: Option<W>,
}

/// Envelope for listing entities of type `T` through the standard response
/// filter.
pub type Query<T, P = Pagination> =
    QueryEnvelope<ResponseFilter<<T as Entity>::Where>, <T as Entity>::Field, P>;

impl<W, K, P> Default for QueryEnvelope<W, K, P> {
    fn default() -> Self {
        Self {
            pagination: None,
            order: None,
            where_: None,
        }
    }
}

impl<W: FilterNode, K: OrderKey> QueryEnvelope<W, K> {
    pub fn builder() -> QueryBuilder<W, K> {
        QueryBuilder::new()
    }
}

impl<W: FilterNode, K: OrderKey, P: Serialize> QueryEnvelope<W, K, P> {
    /// Assemble an envelope, dropping an empty ordering or filter.
    pub fn new(pagination: Option<P>, order: Option<OrderBy<K>>, where_: Option<W>) -> Self {
        Self {
            pagination,
            order: order.filter(|order| !order.is_empty()),
            where_: where_.filter(|filter| !filter.is_empty()),
        }
    }

    pub fn pagination(&self) -> Option<&P> {
        self.pagination.as_ref()
    }

    pub fn order(&self) -> Option<&OrderBy<K>> {
        self.order.as_ref()
    }

    pub fn filter(&self) -> Option<&W> {
        self.where_.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.pagination.is_none() && self.order.is_none() && self.where_.is_none()
    }

    /// Run filter validation over the `where` section.
    pub fn validate(&self) -> Result<(), FilterError> {
        match &self.where_ {
            Some(filter) => filter.validate("where"),
            None => Ok(()),
        }
    }

    /// Present sections as `pagination`/`order`/`where` query parameters,
    /// each holding compact JSON.
    pub fn to_query_pairs(&self) -> Result<Vec<(String, String)>, serde_json::Error> {
        let mut pairs = Vec::new();
        if let Some(pagination) = &self.pagination {
            pairs.push(("pagination".to_string(), serde_json::to_string(pagination)?));
        }
        if let Some(order) = &self.order {
            pairs.push(("order".to_string(), serde_json::to_string(order)?));
        }
        if let Some(filter) = &self.where_ {
            pairs.push(("where".to_string(), serde_json::to_string(filter)?));
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::{SortDirection, StringFilter};
    use serde_json::{Value, json};

    type RawEnvelope = QueryEnvelope<Value, String>;

    #[test]
    fn test_empty_envelope_serializes_to_empty_object() {
        let envelope = RawEnvelope::new(None, None, None);
        assert!(envelope.is_empty());
        assert_eq!(serde_json::to_value(&envelope).unwrap(), json!({}));
        assert!(envelope.to_query_pairs().unwrap().is_empty());
    }

    #[test]
    fn test_empty_sections_are_dropped() {
        let envelope = RawEnvelope::new(None, Some(OrderBy::new()), Some(json!({})));
        assert!(envelope.order().is_none());
        assert!(envelope.filter().is_none());
        assert_eq!(serde_json::to_value(&envelope).unwrap(), json!({}));
    }

    #[test]
    fn test_full_envelope() {
        let envelope = RawEnvelope::new(
            Some(Pagination::page(2, 50)),
            Some(OrderBy::new().then("createdAt".to_string(), SortDirection::Desc)),
            Some(json!({"name": {"eq": "x"}})),
        );

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "pagination": {"pageIndex": 2, "pageSize": 50},
                "order": {"createdAt": "DESC"},
                "where": {"name": {"eq": "x"}}
            })
        );
        assert_eq!(
            envelope.to_query_pairs().unwrap(),
            vec![
                ("pagination".to_string(), r#"{"pageIndex":2,"pageSize":50}"#.to_string()),
                ("order".to_string(), r#"{"createdAt":"DESC"}"#.to_string()),
                ("where".to_string(), r#"{"name":{"eq":"x"}}"#.to_string()),
            ]
        );
    }

    #[test]
    fn test_cursor_pagination_round_trips() {
        let cursor = Pagination::cursor("abc", 10);
        let wire = serde_json::to_value(&cursor).unwrap();
        assert_eq!(wire, json!({"cursor": "abc", "pageSize": 10}));
        assert_eq!(serde_json::from_value::<Pagination>(wire).unwrap(), cursor);
    }

    #[test]
    fn test_custom_pagination_type() {
        #[derive(Serialize)]
        struct Offset {
            skip: u32,
        }

        let envelope: QueryEnvelope<StringFilter, String, Offset> =
            QueryEnvelope::new(Some(Offset { skip: 5 }), None, None);
        assert_eq!(serde_json::to_value(&envelope).unwrap(), json!({"pagination": {"skip": 5}}));
    }
}
