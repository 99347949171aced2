//! Operator sets for primitive fields
//!
//! Each set is a bag of optional operators. Set operators combine
//! conjunctively; a set with nothing set matches every value.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::FilterError;
use super::filterable::{Comparable, FilterNode};

/// Operators over string fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ncontains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_with: Option<String>,
    #[serde(rename = "nstartsWith", skip_serializing_if = "Option::is_none")]
    pub nstarts_with: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_with: Option<String>,
    #[serde(rename = "nendsWith", skip_serializing_if = "Option::is_none")]
    pub nends_with: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub in_: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nin: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub and: Vec<StringFilter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub or: Vec<StringFilter>,
}

impl StringFilter {
    pub fn equals(mut self, value: impl Into<String>) -> Self {
        self.eq = Some(value.into());
        self
    }

    pub fn not_equals(mut self, value: impl Into<String>) -> Self {
        self.neq = Some(value.into());
        self
    }

    pub fn contains(mut self, value: impl Into<String>) -> Self {
        self.contains = Some(value.into());
        self
    }

    pub fn not_contains(mut self, value: impl Into<String>) -> Self {
        self.ncontains = Some(value.into());
        self
    }

    pub fn starts_with(mut self, value: impl Into<String>) -> Self {
        self.starts_with = Some(value.into());
        self
    }

    pub fn not_starts_with(mut self, value: impl Into<String>) -> Self {
        self.nstarts_with = Some(value.into());
        self
    }

    pub fn ends_with(mut self, value: impl Into<String>) -> Self {
        self.ends_with = Some(value.into());
        self
    }

    pub fn not_ends_with(mut self, value: impl Into<String>) -> Self {
        self.nends_with = Some(value.into());
        self
    }

    pub fn is_in<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.in_ = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn not_in<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nin = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn and(mut self, other: StringFilter) -> Self {
        self.and.push(other);
        self
    }

    pub fn or(mut self, other: StringFilter) -> Self {
        self.or.push(other);
        self
    }

    /// Case-sensitive evaluation against `value`.
    pub fn evaluate(&self, value: &str) -> bool {
        let own = self.eq.as_deref().is_none_or(|v| value == v)
            && self.neq.as_deref().is_none_or(|v| value != v)
            && self.contains.as_deref().is_none_or(|v| value.contains(v))
            && self.ncontains.as_deref().is_none_or(|v| !value.contains(v))
            && self.starts_with.as_deref().is_none_or(|v| value.starts_with(v))
            && self.nstarts_with.as_deref().is_none_or(|v| !value.starts_with(v))
            && self.ends_with.as_deref().is_none_or(|v| value.ends_with(v))
            && self.nends_with.as_deref().is_none_or(|v| !value.ends_with(v))
            && self.in_.as_ref().is_none_or(|set| set.iter().any(|v| v == value))
            && self.nin.as_ref().is_none_or(|set| !set.iter().any(|v| v == value));

        own && self.and.iter().all(|f| f.evaluate(value))
            && (self.or.is_empty() || self.or.iter().any(|f| f.evaluate(value)))
    }
}

impl FilterNode for StringFilter {
    fn is_empty(&self) -> bool {
        *self == StringFilter::default()
    }
}

/// Operators over ordered values: numbers and date-times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparableFilter<V> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eq: Option<V>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neq: Option<V>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<V>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<V>,
    #[serde(alias = "it", skip_serializing_if = "Option::is_none")]
    pub lt: Option<V>,
    #[serde(alias = "ite", skip_serializing_if = "Option::is_none")]
    pub lte: Option<V>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ngt: Option<V>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ngte: Option<V>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nlt: Option<V>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nlte: Option<V>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub in_: Option<Vec<V>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nin: Option<Vec<V>>,
}

/// Operators over every integer and float width.
pub type NumericFilter<N> = ComparableFilter<N>;

/// Operators over date-times, compared in UTC.
pub type DateTimeFilter = ComparableFilter<DateTimeValue>;

impl<V> Default for ComparableFilter<V> {
    fn default() -> Self {
        Self {
            eq: None,
            neq: None,
            gt: None,
            gte: None,
            lt: None,
            lte: None,
            ngt: None,
            ngte: None,
            nlt: None,
            nlte: None,
            in_: None,
            nin: None,
        }
    }
}

impl<V: Comparable> ComparableFilter<V> {
    pub fn equals(mut self, value: V) -> Self {
        self.eq = Some(value);
        self
    }

    pub fn not_equals(mut self, value: V) -> Self {
        self.neq = Some(value);
        self
    }

    pub fn gt(mut self, value: V) -> Self {
        self.gt = Some(value);
        self
    }

    pub fn gte(mut self, value: V) -> Self {
        self.gte = Some(value);
        self
    }

    pub fn lt(mut self, value: V) -> Self {
        self.lt = Some(value);
        self
    }

    pub fn lte(mut self, value: V) -> Self {
        self.lte = Some(value);
        self
    }

    pub fn not_gt(mut self, value: V) -> Self {
        self.ngt = Some(value);
        self
    }

    pub fn not_gte(mut self, value: V) -> Self {
        self.ngte = Some(value);
        self
    }

    pub fn not_lt(mut self, value: V) -> Self {
        self.nlt = Some(value);
        self
    }

    pub fn not_lte(mut self, value: V) -> Self {
        self.nlte = Some(value);
        self
    }

    pub fn is_in(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.in_ = Some(values.into_iter().collect());
        self
    }

    pub fn not_in(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.nin = Some(values.into_iter().collect());
        self
    }

    pub fn evaluate(&self, value: &V) -> bool {
        self.eq.as_ref().is_none_or(|v| value == v)
            && self.neq.as_ref().is_none_or(|v| value != v)
            && self.gt.as_ref().is_none_or(|v| value > v)
            && self.gte.as_ref().is_none_or(|v| value >= v)
            && self.lt.as_ref().is_none_or(|v| value < v)
            && self.lte.as_ref().is_none_or(|v| value <= v)
            // Literal complements, not flipped bounds: NaN satisfies `ngt` but not `lte`.
            && self.ngt.as_ref().is_none_or(|v| !(value > v))
            && self.ngte.as_ref().is_none_or(|v| !(value >= v))
            && self.nlt.as_ref().is_none_or(|v| !(value < v))
            && self.nlte.as_ref().is_none_or(|v| !(value <= v))
            && self.in_.as_ref().is_none_or(|set| set.contains(value))
            && self.nin.as_ref().is_none_or(|set| !set.contains(value))
    }
}

impl<V: Comparable> FilterNode for ComparableFilter<V> {
    fn is_empty(&self) -> bool {
        *self == ComparableFilter::default()
    }
}

/// Operators over boolean fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eq: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neq: Option<bool>,
}

impl BooleanFilter {
    pub fn equals(mut self, value: bool) -> Self {
        self.eq = Some(value);
        self
    }

    pub fn not_equals(mut self, value: bool) -> Self {
        self.neq = Some(value);
        self
    }

    pub fn evaluate(&self, value: bool) -> bool {
        self.eq.is_none_or(|v| value == v) && self.neq.is_none_or(|v| value != v)
    }
}

impl FilterNode for BooleanFilter {
    fn is_empty(&self) -> bool {
        self.eq.is_none() && self.neq.is_none()
    }
}

/// A point in time as the remote API sees it: UTC, millisecond precision.
///
/// Built from a native `DateTime` or parsed from an ISO-8601 string; both
/// serialize to the same canonical form, e.g. `2024-05-01T10:00:00.000Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTimeValue(DateTime<Utc>);

impl DateTimeValue {
    pub fn from_datetime<Tz: TimeZone>(value: &DateTime<Tz>) -> Self {
        Self(value.with_timezone(&Utc).trunc_subsecs(3))
    }

    /// Accepts RFC 3339, a naive date-time (read as UTC) or a plain date
    /// (UTC midnight).
    pub fn parse(input: &str) -> Result<Self, FilterError> {
        let trimmed = input.trim();

        if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::from_datetime(&parsed));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(Self::from_datetime(&naive.and_utc()));
        }
        if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Ok(Self::from_datetime(&midnight.and_utc()));
        }

        Err(FilterError::InvalidDateTime {
            value: input.to_string(),
        })
    }

    pub fn to_iso_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl Comparable for DateTimeValue {}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateTimeValue {
    fn from(value: DateTime<Tz>) -> Self {
        Self::from_datetime(&value)
    }
}

impl FromStr for DateTimeValue {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for DateTimeValue {
    type Error = FilterError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for DateTimeValue {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl Serialize for DateTimeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso_string())
    }
}

impl<'de> Deserialize<'de> for DateTimeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
