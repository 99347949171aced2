use serde::{Deserialize, Serialize};

use super::error::FilterError;
use super::filterable::{EntityFilter, FilterNode, field_path};

/// Quantifier over a collection-of-entities field.
///
/// `all`, `some` and `none` hold a filter expression over one element;
/// `any` tests for (non-)emptiness. Only one key should be set per node,
/// see [`FilterNode::validate`]; when several are set, all must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionFilter<F> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all: Option<Box<F>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub some: Option<Box<F>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub none: Option<Box<F>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any: Option<bool>,
}

impl<F> Default for CollectionFilter<F> {
    fn default() -> Self {
        Self {
            all: None,
            some: None,
            none: None,
            any: None,
        }
    }
}

impl<F> CollectionFilter<F> {
    /// Every element matches (vacuously true on an empty collection).
    pub fn all(filter: F) -> Self {
        Self {
            all: Some(Box::new(filter)),
            ..Self::default()
        }
    }

    /// At least one element matches.
    pub fn some(filter: F) -> Self {
        Self {
            some: Some(Box::new(filter)),
            ..Self::default()
        }
    }

    /// No element matches.
    pub fn none(filter: F) -> Self {
        Self {
            none: Some(Box::new(filter)),
            ..Self::default()
        }
    }

    /// `true`: the collection is non-empty. `false`: it is empty.
    pub fn any(non_empty: bool) -> Self {
        Self {
            any: Some(non_empty),
            ..Self::default()
        }
    }

    fn set_keys(&self) -> Vec<&'static str> {
        [
            ("all", self.all.is_some()),
            ("some", self.some.is_some()),
            ("none", self.none.is_some()),
            ("any", self.any.is_some()),
        ]
        .into_iter()
        .filter_map(|(key, set)| set.then_some(key))
        .collect()
    }
}

impl<F: EntityFilter> CollectionFilter<F> {
    pub fn evaluate(&self, items: &[F::Entity]) -> bool {
        self.all
            .as_ref()
            .is_none_or(|f| items.iter().all(|item| f.evaluate(item)))
            && self
                .some
                .as_ref()
                .is_none_or(|f| items.iter().any(|item| f.evaluate(item)))
            && self
                .none
                .as_ref()
                .is_none_or(|f| !items.iter().any(|item| f.evaluate(item)))
            && self.any.is_none_or(|non_empty| non_empty == !items.is_empty())
    }
}

impl<F: FilterNode> FilterNode for CollectionFilter<F> {
    fn is_empty(&self) -> bool {
        self.all.is_none() && self.some.is_none() && self.none.is_none() && self.any.is_none()
    }

    fn validate(&self, path: &str) -> Result<(), FilterError> {
        let keys = self.set_keys();
        if keys.len() > 1 {
            return Err(FilterError::AmbiguousQuantifier {
                path: path.to_string(),
                keys: keys.join(", "),
            });
        }

        for (key, child) in [("all", &self.all), ("some", &self.some), ("none", &self.none)] {
            if let Some(child) = child {
                child.validate(&field_path(path, key))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_single_quantifier_validates() {
        let filter = CollectionFilter::some(json!({"name": {"eq": "a"}}));
        assert!(filter.validate("where.data").is_ok());
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"some": {"name": {"eq": "a"}}})
        );
    }

    #[test]
    fn test_multiple_quantifiers_rejected_with_path() {
        let mut filter = CollectionFilter::all(json!({}));
        filter.any = Some(true);

        assert_eq!(
            filter.validate("where.data[0]"),
            Err(FilterError::AmbiguousQuantifier {
                path: "where.data[0]".into(),
                keys: "all, any".into(),
            })
        );
    }

    #[test]
    fn test_emptiness() {
        assert!(CollectionFilter::<Value>::default().is_empty());
        assert!(!CollectionFilter::<Value>::any(false).is_empty());
    }
}
