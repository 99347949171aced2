use serde::Serialize;

use super::envelope::{Pagination, QueryEnvelope};
use super::filterable::FilterNode;
use super::orderby::{OrderBy, OrderKey, SortDirection};

/// Fluent construction of a [`QueryEnvelope`].
#[derive(Debug, Clone)]
pub struct QueryBuilder<W, K, P = Pagination> {
    pagination: Option<P>,
    order: OrderBy<K>,
    filter: Option<W>,
}

impl<W: FilterNode, K: OrderKey, P: Serialize> QueryBuilder<W, K, P> {
    pub fn new() -> Self {
        Self {
            pagination: None,
            order: OrderBy::default(),
            filter: None,
        }
    }

    pub fn pagination(mut self, pagination: P) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Append (or re-direct) one ordering field.
    pub fn order_by(mut self, field: K, direction: SortDirection) -> Self {
        self.order.set(field, direction);
        self
    }

    /// Replace the whole ordering.
    pub fn order(mut self, order: OrderBy<K>) -> Self {
        self.order = order;
        self
    }

    pub fn filter(mut self, filter: W) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn build(self) -> QueryEnvelope<W, K, P> {
        QueryEnvelope::new(self.pagination, Some(self.order), self.filter)
    }
}

impl<W: FilterNode, K: OrderKey> QueryBuilder<W, K> {
    pub fn page(self, page_index: u32, page_size: u32) -> Self {
        self.pagination(Pagination::page(page_index, page_size))
    }

    pub fn cursor(self, cursor: impl Into<String>, page_size: u32) -> Self {
        self.pagination(Pagination::cursor(cursor, page_size))
    }
}

impl<W: FilterNode, K: OrderKey, P: Serialize> Default for QueryBuilder<W, K, P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_builder_collects_sections() {
        let envelope = QueryEnvelope::<Value, String>::builder()
            .cursor("next", 20)
            .order_by("name".to_string(), SortDirection::Asc)
            .order_by("age".to_string(), SortDirection::Desc)
            .filter(json!({"active": {"eq": true}}))
            .build();

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "pagination": {"cursor": "next", "pageSize": 20},
                "order": {"name": "ASC", "age": "DESC"},
                "where": {"active": {"eq": true}}
            })
        );
    }

    #[test]
    fn test_builder_without_sections_is_empty() {
        let envelope = QueryBuilder::<Value, String>::new().build();
        assert!(envelope.is_empty());
    }
}
