use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::FilterError;

/// Sort direction on the wire: `ASC` / `DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(FilterError::InvalidDirection {
                value: s.to_string(),
            }),
        }
    }
}

/// A field an ordering can name.
///
/// Implemented by every generated `<Name>Field` enum, and by `String` for
/// untyped callers.
pub trait OrderKey: fmt::Debug + Clone + PartialEq + Send + Sync + 'static {
    /// Wire name of the field.
    fn key(&self) -> &str;

    /// Inverse of [`OrderKey::key`]; `None` for names the entity does not have.
    fn from_key(key: &str) -> Option<Self>;
}

impl OrderKey for String {
    fn key(&self) -> &str {
        self
    }

    fn from_key(key: &str) -> Option<Self> {
        Some(key.to_string())
    }
}

/// Ordered field-to-direction mapping.
///
/// Serializes as a JSON object in insertion order. Setting a field that is
/// already present replaces its direction and keeps its position.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy<K> {
    entries: Vec<(K, SortDirection)>,
}

impl<K> Default for OrderBy<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: OrderKey> OrderBy<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(self, field: K) -> Self {
        self.then(field, SortDirection::Asc)
    }

    pub fn desc(self, field: K) -> Self {
        self.then(field, SortDirection::Desc)
    }

    pub fn then(mut self, field: K, direction: SortDirection) -> Self {
        self.set(field, direction);
        self
    }

    pub fn set(&mut self, field: K, direction: SortDirection) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == field) {
            Some(entry) => entry.1 = direction,
            None => self.entries.push((field, direction)),
        }
    }

    pub fn direction(&self, field: &K) -> Option<SortDirection> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == field)
            .map(|(_, direction)| *direction)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, SortDirection)> {
        self.entries.iter().map(|(field, direction)| (field, *direction))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K: OrderKey> FromIterator<(K, SortDirection)> for OrderBy<K> {
    fn from_iter<I: IntoIterator<Item = (K, SortDirection)>>(iter: I) -> Self {
        let mut order = OrderBy::new();
        for (field, direction) in iter {
            order.set(field, direction);
        }
        order
    }
}

impl<K: OrderKey> Serialize for OrderBy<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, direction) in &self.entries {
            map.serialize_entry(field.key(), direction)?;
        }
        map.end()
    }
}

impl<'de, K: OrderKey> Deserialize<'de> for OrderBy<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderVisitor<K>(PhantomData<K>);

        impl<'de, K: OrderKey> Visitor<'de> for OrderVisitor<K> {
            type Value = OrderBy<K>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of field names to ASC/DESC")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut order = OrderBy::new();
                while let Some((name, direction)) = access.next_entry::<String, SortDirection>()? {
                    let field = K::from_key(&name).ok_or_else(|| {
                        serde::de::Error::custom(FilterError::UnknownField { name })
                    })?;
                    order.set(field, direction);
                }
                Ok(order)
            }
        }

        deserializer.deserialize_map(OrderVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Column {
        Name,
        Age,
    }

    impl OrderKey for Column {
        fn key(&self) -> &str {
            match self {
                Column::Name => "name",
                Column::Age => "age",
            }
        }

        fn from_key(key: &str) -> Option<Self> {
            match key {
                "name" => Some(Column::Name),
                "age" => Some(Column::Age),
                _ => None,
            }
        }
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let order = OrderBy::new().desc(Column::Age).asc(Column::Name);
        let text = serde_json::to_string(&order).unwrap();
        assert_eq!(text, r#"{"age":"DESC","name":"ASC"}"#);
    }

    #[test]
    fn test_reset_keeps_position() {
        let order = OrderBy::new()
            .asc(Column::Name)
            .asc(Column::Age)
            .desc(Column::Name);

        assert_eq!(order.len(), 2);
        assert_eq!(order.direction(&Column::Name), Some(SortDirection::Desc));
        assert_eq!(
            serde_json::to_string(&order).unwrap(),
            r#"{"name":"DESC","age":"ASC"}"#
        );
    }

    #[test]
    fn test_deserialize_preserves_wire_order() {
        let order: OrderBy<Column> =
            serde_json::from_str(r#"{"age":"desc","name":"ASC"}"#).unwrap();
        let fields: Vec<_> = order.iter().map(|(field, _)| *field).collect();
        assert_eq!(fields, vec![Column::Age, Column::Name]);
    }

    #[test]
    fn test_deserialize_rejects_unknown_field() {
        let err = serde_json::from_value::<OrderBy<Column>>(json!({"height": "ASC"})).unwrap_err();
        assert!(err.to_string().contains("unknown field 'height'"));
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("Desc".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
