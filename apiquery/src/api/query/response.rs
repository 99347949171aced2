use serde::{Deserialize, Serialize};

use super::collection::CollectionFilter;
use super::error::FilterError;
use super::filterable::{EntityFilter, FilterNode, field_path};
use super::filters::{BooleanFilter, NumericFilter, StringFilter};
use crate::api::models::ApiResponseData;

/// Filter over the standard response envelope of an entity `F::Entity`.
///
/// `data` is a list of quantifiers over the response's items; all of them
/// must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseFilter<F> {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<CollectionFilter<F>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_data: Option<Box<F>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<BooleanFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_success: Option<BooleanFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<StringFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<NumericFilter<i64>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub and: Vec<ResponseFilter<F>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub or: Vec<ResponseFilter<F>>,
}

impl<F> Default for ResponseFilter<F> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            single_data: None,
            is_error: None,
            is_success: None,
            message: None,
            total_count: None,
            and: Vec::new(),
            or: Vec::new(),
        }
    }
}

impl<F> ResponseFilter<F> {
    pub fn with_data(mut self, quantifier: CollectionFilter<F>) -> Self {
        self.data.push(quantifier);
        self
    }

    pub fn with_single_data(mut self, filter: F) -> Self {
        self.single_data = Some(Box::new(filter));
        self
    }

    pub fn with_is_error(mut self, filter: BooleanFilter) -> Self {
        self.is_error = Some(filter);
        self
    }

    pub fn with_is_success(mut self, filter: BooleanFilter) -> Self {
        self.is_success = Some(filter);
        self
    }

    pub fn with_message(mut self, filter: StringFilter) -> Self {
        self.message = Some(filter);
        self
    }

    pub fn with_total_count(mut self, filter: NumericFilter<i64>) -> Self {
        self.total_count = Some(filter);
        self
    }

    pub fn and(mut self, other: ResponseFilter<F>) -> Self {
        self.and.push(other);
        self
    }

    pub fn or(mut self, other: ResponseFilter<F>) -> Self {
        self.or.push(other);
        self
    }
}

impl<F: EntityFilter> ResponseFilter<F> {
    pub fn evaluate(&self, response: &ApiResponseData<F::Entity>) -> bool {
        let items = response.items();

        let own = self.data.iter().all(|q| q.evaluate(items))
            && self.single_data.as_ref().is_none_or(|f| match &response.single_data {
                Some(single) => f.evaluate(single),
                None => f.is_empty(),
            })
            && self.is_error.as_ref().is_none_or(|f| f.evaluate(response.is_error))
            && self.is_success.as_ref().is_none_or(|f| f.evaluate(response.is_success))
            && self.message.as_ref().is_none_or(|f| match &response.message {
                Some(message) => f.evaluate(message),
                None => f.is_empty(),
            })
            && self
                .total_count
                .as_ref()
                .is_none_or(|f| f.evaluate(&response.total_count));

        own && self.and.iter().all(|f| f.evaluate(response))
            && (self.or.is_empty() || self.or.iter().any(|f| f.evaluate(response)))
    }
}

impl<F: FilterNode> FilterNode for ResponseFilter<F> {
    fn is_empty(&self) -> bool {
        self.data.iter().all(FilterNode::is_empty)
            && self.single_data.as_ref().is_none_or(|f| f.is_empty())
            && self.is_error.is_none()
            && self.is_success.is_none()
            && self.message.is_none()
            && self.total_count.is_none()
            && self.and.iter().all(FilterNode::is_empty)
            && self.or.is_empty()
    }

    fn validate(&self, path: &str) -> Result<(), FilterError> {
        for (index, quantifier) in self.data.iter().enumerate() {
            quantifier.validate(&field_path(path, &format!("data[{index}]")))?;
        }
        if let Some(single) = &self.single_data {
            single.validate(&field_path(path, "singleData"))?;
        }
        for (index, member) in self.and.iter().enumerate() {
            member.validate(&field_path(path, &format!("and[{index}]")))?;
        }
        for (index, member) in self.or.iter().enumerate() {
            member.validate(&field_path(path, &format!("or[{index}]")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_default_is_empty_and_serializes_to_nothing() {
        let filter = ResponseFilter::<Value>::default();
        assert!(filter.is_empty());
        assert_eq!(serde_json::to_value(&filter).unwrap(), json!({}));
    }

    #[test]
    fn test_envelope_wire_keys() {
        let filter = ResponseFilter::<Value>::default()
            .with_is_success(BooleanFilter::default().equals(true))
            .with_total_count(NumericFilter::default().gt(0));

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"isSuccess": {"eq": true}, "totalCount": {"gt": 0}})
        );
    }

    #[test]
    fn test_validation_reports_nested_path() {
        let mut ambiguous = CollectionFilter::some(json!({}));
        ambiguous.none = Some(Box::new(json!({})));

        let filter = ResponseFilter::<Value>::default()
            .and(ResponseFilter::default().with_data(CollectionFilter::any(true)).with_data(ambiguous));

        match filter.validate("where") {
            Err(FilterError::AmbiguousQuantifier { path, .. }) => {
                assert_eq!(path, "where.and[0].data[1]")
            }
            other => panic!("expected ambiguity error, got {other:?}"),
        }
    }
}
